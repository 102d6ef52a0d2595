//! MRT table dump version 2 structs
use crate::models::*;
use bitflags::bitflags;
use bytes::Bytes;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::net::{IpAddr, Ipv4Addr};

/// TableDump version 2 subtypes.
///
/// <https://www.iana.org/assignments/mrt/mrt.xhtml#subtype-codes>
#[derive(Debug, TryFromPrimitive, IntoPrimitive, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum TableDumpV2Type {
    PeerIndexTable = 1,
    RibIpv4Unicast = 2,
    RibIpv4Multicast = 3,
    RibIpv6Unicast = 4,
    RibIpv6Multicast = 5,
    RibGeneric = 6,
}

impl TableDumpV2Type {
    /// The unicast RIB subtype carrying prefixes of the given address family.
    pub const fn unicast_rib(afi: Afi) -> TableDumpV2Type {
        match afi {
            Afi::Ipv4 => TableDumpV2Type::RibIpv4Unicast,
            Afi::Ipv6 => TableDumpV2Type::RibIpv6Unicast,
        }
    }
}

/// AFI/SAFI-Specific RIB Subtypes.
///
/// ```text
///         0                   1                   2                   3
///         0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                         Sequence Number                       |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        | Prefix Length |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                        Prefix (variable)                      |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |         Entry Count           |  RIB Entries (variable)
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RibAfiEntries {
    pub rib_type: TableDumpV2Type,
    pub sequence_number: u32,
    pub prefix: NetworkPrefix,
    pub rib_entries: Vec<RibEntry>,
}

/// RIB entry.
///
/// ```text
///         0                   1                   2                   3
///         0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |         Peer Index            |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                         Originated Time                       |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |      Attribute Length         |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                    BGP Attributes... (variable)
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// `attributes` holds the already encoded attribute block; its length prefix is written by the
/// encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RibEntry {
    pub peer_index: u16,
    pub originated_time: u32,
    pub attributes: Bytes,
}

/// peer index table.
///
/// ```text
///    An initial PEER_INDEX_TABLE MRT record provides the BGP ID of the
///    collector, an OPTIONAL view name, and a list of indexed peers.
///    Following the PEER_INDEX_TABLE MRT record, a series of MRT records is
///    used to encode RIB table entries.
/// ```
///
/// Peers keep the order they were added in; a peer's position is the index RIB entries refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeerIndexTable {
    pub collector_bgp_id: Ipv4Addr,
    pub view_name: String,
    pub peers: Vec<Peer>,
}

impl Default for PeerIndexTable {
    fn default() -> Self {
        PeerIndexTable {
            collector_bgp_id: Ipv4Addr::UNSPECIFIED,
            view_name: "".to_string(),
            peers: vec![],
        }
    }
}

impl PeerIndexTable {
    pub fn new(collector_bgp_id: Ipv4Addr, view_name: impl Into<String>) -> Self {
        PeerIndexTable {
            collector_bgp_id,
            view_name: view_name.into(),
            peers: vec![],
        }
    }

    /// Appends a peer and returns its peer index. Peers sharing an address are kept apart.
    pub fn add_peer(&mut self, peer: Peer) -> usize {
        self.peers.push(peer);
        self.peers.len() - 1
    }

    pub fn get_peer_by_id(&self, peer_id: usize) -> Option<&Peer> {
        self.peers.get(peer_id)
    }
}

bitflags! {
    /// Peer Type field of a peer entry.
    ///
    /// ```text
    ///  0 1 2 3 4 5 6 7
    /// +-+-+-+-+-+-+-+-+
    /// | | | | | | |A|I|
    /// +-+-+-+-+-+-+-+-+
    ///
    /// Bit 6: Peer AS number size:  0 = 16 bits, 1 = 32 bits
    /// Bit 7: Peer IP Address family:  0 = IPv4,  1 = IPv6
    /// ```
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct PeerType: u8 {
        const AS_SIZE_32BIT = 0x2;
        const ADDRESS_FAMILY_IPV6 = 0x1;
    }
}

/// Peer struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Peer {
    pub peer_type: PeerType,
    pub peer_bgp_id: Ipv4Addr,
    pub peer_address: IpAddr,
    pub peer_asn: Asn,
}

impl Peer {
    pub fn new(peer_bgp_id: Ipv4Addr, peer_address: IpAddr, peer_asn: Asn) -> Self {
        let mut peer_type = PeerType::empty();

        if peer_asn.is_four_byte() {
            peer_type.insert(PeerType::AS_SIZE_32BIT);
        }

        if peer_address.is_ipv6() {
            peer_type.insert(PeerType::ADDRESS_FAMILY_IPV6);
        }

        Peer {
            peer_type,
            peer_bgp_id,
            peer_address,
            peer_asn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn create_peer() -> Peer {
        let bgp_id = Ipv4Addr::from_str("1.1.1.1").unwrap();
        let peer_address: IpAddr = Ipv4Addr::from_str("2.2.2.2").unwrap().into();
        Peer::new(bgp_id, peer_address, Asn::new_32bit(65000))
    }

    #[test]
    fn test_peer_new() {
        let peer = create_peer();
        assert_eq!(peer.peer_type, PeerType::AS_SIZE_32BIT);
        assert_eq!(peer.peer_bgp_id, Ipv4Addr::from_str("1.1.1.1").unwrap());
        assert_eq!(
            peer.peer_address,
            IpAddr::V4(Ipv4Addr::from_str("2.2.2.2").unwrap())
        );
        assert_eq!(peer.peer_asn, Asn::new_32bit(65000));

        let peer = Peer::new(
            Ipv4Addr::from_str("1.1.1.1").unwrap(),
            IpAddr::from_str("2001:db8::1").unwrap(),
            Asn::new_16bit(65000),
        );
        assert_eq!(peer.peer_type, PeerType::ADDRESS_FAMILY_IPV6);
    }

    #[test]
    fn test_default_peer_index_table() {
        let peer_index_table = PeerIndexTable::default();
        assert_eq!(peer_index_table.collector_bgp_id, Ipv4Addr::UNSPECIFIED);
        assert_eq!(peer_index_table.view_name, "".to_string());
        assert!(peer_index_table.peers.is_empty());
    }

    #[test]
    fn test_add_peer_keeps_order() {
        let mut table = PeerIndexTable::new(Ipv4Addr::new(10, 0, 0, 1), "view");
        let first = create_peer();
        let second = Peer::new(
            Ipv4Addr::new(3, 3, 3, 3),
            IpAddr::from_str("3.3.3.3").unwrap(),
            Asn::new_32bit(65001),
        );
        // same address as the second peer, different BGP ID and AS
        let third = Peer::new(
            Ipv4Addr::new(4, 4, 4, 4),
            IpAddr::from_str("3.3.3.3").unwrap(),
            Asn::new_32bit(65002),
        );
        assert_eq!(table.add_peer(first), 0);
        assert_eq!(table.add_peer(second), 1);
        assert_eq!(table.add_peer(third), 2);
        assert_eq!(table.peers, vec![first, second, third]);
        assert_eq!(table.get_peer_by_id(1), Some(&second));
        assert_eq!(table.get_peer_by_id(3), None);
    }

    #[test]
    fn test_peer_type_flags() {
        let mut peer_type = PeerType::empty();
        peer_type.insert(PeerType::AS_SIZE_32BIT);
        peer_type.insert(PeerType::ADDRESS_FAMILY_IPV6);
        assert_eq!(peer_type.bits(), 0x3);
        peer_type.remove(PeerType::AS_SIZE_32BIT);
        assert_eq!(peer_type, PeerType::ADDRESS_FAMILY_IPV6);
    }

    #[test]
    fn test_unicast_rib_type() {
        assert_eq!(
            TableDumpV2Type::unicast_rib(Afi::Ipv4),
            TableDumpV2Type::RibIpv4Unicast
        );
        assert_eq!(u16::from(TableDumpV2Type::unicast_rib(Afi::Ipv6)), 4);
        assert_eq!(u16::from(TableDumpV2Type::PeerIndexTable), 1);
    }
}
