use crate::encoder::MrtEncode;
use crate::error::GeneratorError;
use crate::models::*;
use bytes::{BufMut, Bytes, BytesMut};
use std::net::IpAddr;

impl PeerIndexTable {
    /// Encode the peer index table into bytes.
    ///
    /// Peers are written in the order they were added. Fails when the view name or the peer list
    /// does not fit its two-octet count field.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::net::Ipv4Addr;
    /// use bgpkit_routegen::models::{Asn, Peer, PeerIndexTable};
    ///
    /// let mut table = PeerIndexTable::new(Ipv4Addr::new(10, 0, 0, 1), "view");
    /// table.add_peer(Peer::new(
    ///     Ipv4Addr::new(10, 0, 0, 1),
    ///     "10.0.0.2".parse().unwrap(),
    ///     Asn::new_32bit(65001),
    /// ));
    /// let encoded = table.encode().unwrap();
    /// assert_eq!(encoded.len(), 4 + 2 + 4 + 2 + 13);
    /// ```
    pub fn encode(&self) -> Result<Bytes, GeneratorError> {
        let view_name = self.view_name.as_bytes();
        let view_name_len = u16::try_from(view_name.len())
            .map_err(|_| GeneratorError::ViewNameTooLong(view_name.len()))?;
        let peer_count = u16::try_from(self.peers.len())
            .map_err(|_| GeneratorError::TooManyPeers(self.peers.len()))?;

        let mut buf = BytesMut::with_capacity(8 + view_name.len() + 25 * self.peers.len());
        buf.put_u32(self.collector_bgp_id.into());
        buf.put_u16(view_name_len);
        buf.put_slice(view_name);
        buf.put_u16(peer_count);

        for peer in &self.peers {
            buf.put_u8(peer.peer_type.bits());
            buf.put_u32(peer.peer_bgp_id.into());
            match peer.peer_address {
                IpAddr::V4(ipv4) => buf.put_slice(&ipv4.octets()),
                IpAddr::V6(ipv6) => buf.put_slice(&ipv6.octets()),
            };
            match peer.peer_type.contains(PeerType::AS_SIZE_32BIT) {
                true => buf.put_u32(peer.peer_asn.to_u32()),
                false => buf.put_u16(peer.peer_asn.to_u32() as u16),
            };
        }

        Ok(buf.freeze())
    }
}

impl MrtEncode for PeerIndexTable {
    fn entry_type(&self) -> EntryType {
        EntryType::TABLE_DUMP_V2
    }

    fn entry_subtype(&self) -> u16 {
        TableDumpV2Type::PeerIndexTable.into()
    }

    fn encode(&self) -> Result<Bytes, GeneratorError> {
        PeerIndexTable::encode(self)
    }
}
