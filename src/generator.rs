/*!
Drives route generation across a list of route specifications.

A [RouteSpec] names a base network, the sub-prefix length to split it into, and the next hop to
announce the sub-prefixes with. [generate_updates] packs them into BGP UPDATE messages;
[generate_table_dump] writes a TABLE_DUMP_V2 file of one peer index table followed by one RIB
record per sub-prefix.

Route specifications are processed in order. The `max_routes` budget is shared across them, and
the root AS starts over from the configured AS path for every specification.
*/
use crate::encoder::{Clock, MrtWriter, RibGenerator, UpdatePacker, UpdateSummary};
use crate::error::GeneratorError;
use crate::models::*;
use ipnet::IpNet;
use itertools::Itertools;
use log::info;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

/// Log a progress line every this many routes.
pub const PROGRESS_INTERVAL: u64 = 10_000;

/// Root AS of the default AS path.
pub const DEFAULT_ROOT_AS: u32 = 20;

/// One `PREFIX SUBLEN NEXTHOP` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteSpec {
    pub prefix: IpNet,
    pub sub_len: u8,
    pub next_hop: IpAddr,
}

impl RouteSpec {
    /// Checks that prefix and next hop share an address family and that `sub_len` is usable.
    pub fn new(prefix: IpNet, sub_len: u8, next_hop: IpAddr) -> Result<RouteSpec, GeneratorError> {
        if Afi::from(prefix) != Afi::from(next_hop) {
            return Err(GeneratorError::AddressFamilyMismatch { prefix, next_hop });
        }
        // validates the length
        SubPrefixes::new(prefix, sub_len)?;
        Ok(RouteSpec {
            prefix,
            sub_len,
            next_hop,
        })
    }

    pub fn parse(prefix: &str, sub_len: &str, next_hop: &str) -> Result<RouteSpec, GeneratorError> {
        let sub_len = u8::from_str(sub_len.trim()).map_err(|e| GeneratorError::InvalidNumber {
            value: sub_len.to_string(),
            source: e,
        })?;
        RouteSpec::new(
            IpNet::from_str(prefix.trim())?,
            sub_len,
            IpAddr::from_str(next_hop.trim())?,
        )
    }

    /// Groups positional arguments into `PREFIX SUBLEN NEXTHOP` triples.
    ///
    /// ```rust
    /// use bgpkit_routegen::generator::RouteSpec;
    ///
    /// let specs = RouteSpec::parse_all(&["10.0.0.0/22", "24", "10.0.0.3"]).unwrap();
    /// assert_eq!(specs.len(), 1);
    /// assert_eq!(specs[0].sub_len, 24);
    ///
    /// assert!(RouteSpec::parse_all(&["10.0.0.0/22", "24"]).is_err());
    /// ```
    pub fn parse_all<S: AsRef<str>>(args: &[S]) -> Result<Vec<RouteSpec>, GeneratorError> {
        if args.len() % 3 != 0 {
            return Err(GeneratorError::IncompleteRouteSpec(args.len()));
        }
        args.iter()
            .map(AsRef::as_ref)
            .tuples()
            .map(|(prefix, sub_len, next_hop)| RouteSpec::parse(prefix, sub_len, next_hop))
            .collect()
    }

    /// Fresh iterator over the sub-prefixes this specification announces.
    pub fn sub_prefixes(&self) -> Result<SubPrefixes, GeneratorError> {
        SubPrefixes::new(self.prefix, self.sub_len)
    }
}

impl Display for RouteSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} /{} via {}", self.prefix, self.sub_len, self.next_hop)
    }
}

/// A peer of the peer index table, given as `bgpid,peerip,peeras`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeerSpec {
    pub bgp_id: Ipv4Addr,
    pub address: IpAddr,
    pub asn: Asn,
}

impl FromStr for PeerSpec {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((bgp_id, address, asn)) = s.split(',').map(str::trim).collect_tuple() else {
            return Err(GeneratorError::InvalidPeer(s.to_string()));
        };
        Ok(PeerSpec {
            bgp_id: Ipv4Addr::from_str(bgp_id)?,
            address: IpAddr::from_str(address)?,
            asn: Asn::from_str(asn).map_err(|e| GeneratorError::InvalidNumber {
                value: asn.to_string(),
                source: e,
            })?,
        })
    }
}

impl From<PeerSpec> for Peer {
    fn from(spec: PeerSpec) -> Self {
        // peers are always written with 4-octet AS numbers
        Peer::new(spec.bgp_id, spec.address, Asn::new_32bit(spec.asn.to_u32()))
    }
}

/// Settings shared by both output formats.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratorConfig {
    pub routes: Vec<RouteSpec>,
    pub as_path: AsPath,
    pub root_as: RootAsPolicy,
    /// Total number of prefixes to generate, across all route specifications.
    pub max_routes: u64,
    /// Most prefixes per UPDATE message. For table dumps, the number of consecutive RIB records
    /// sharing a root AS.
    pub max_pack: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            routes: vec![],
            as_path: AsPath::from_root(DEFAULT_ROOT_AS),
            root_as: RootAsPolicy::default(),
            max_routes: 0xFFFF_FFFF,
            max_pack: 0xFFFF,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.max_pack == 0 {
            return Err(GeneratorError::InvalidMaxPack);
        }
        Ok(())
    }
}

/// Settings for the table dump output only.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableDumpConfig {
    pub collector_bgp_id: Ipv4Addr,
    pub view_name: String,
    /// Every RIB entry refers to the first peer.
    pub peers: Vec<PeerSpec>,
    pub first_sequence_number: u32,
}

impl Default for TableDumpConfig {
    fn default() -> Self {
        TableDumpConfig {
            collector_bgp_id: Ipv4Addr::new(10, 0, 0, 1),
            view_name: "view".to_string(),
            peers: vec![],
            first_sequence_number: 0,
        }
    }
}

impl TableDumpConfig {
    /// Builds the peer index table, keeping the configured peer order.
    pub fn peer_index_table(&self) -> Result<PeerIndexTable, GeneratorError> {
        if self.peers.is_empty() {
            return Err(GeneratorError::NoPeers);
        }
        if self.peers.len() > u16::MAX as usize {
            return Err(GeneratorError::TooManyPeers(self.peers.len()));
        }
        let mut table = PeerIndexTable::new(self.collector_bgp_id, self.view_name.clone());
        for peer in &self.peers {
            table.add_peer(Peer::from(*peer));
        }
        Ok(table)
    }
}

/// Result of a table dump run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableDumpSummary {
    pub rib_entries: u64,
    /// Sequence number the next RIB record would have carried.
    pub next_sequence_number: u32,
}

fn limit_to_usize(limit: u64) -> usize {
    usize::try_from(limit).unwrap_or(usize::MAX)
}

/// Writes BGP UPDATE messages for every route specification to `out`.
pub fn generate_updates<W: Write + ?Sized>(
    out: &mut W,
    config: &GeneratorConfig,
) -> Result<UpdateSummary, GeneratorError> {
    config.validate()?;

    let mut remaining = config.max_routes;
    let mut summary = UpdateSummary::default();
    for route in &config.routes {
        if remaining == 0 {
            break;
        }
        let mut packer = UpdatePacker::new(
            config.as_path.clone(),
            route.next_hop,
            config.root_as,
            config.max_pack,
        )?;
        for prefix in route.sub_prefixes()?.take(limit_to_usize(remaining)) {
            packer.push(prefix, out)?;
            let total = summary.prefixes + packer.summary().prefixes;
            if total % PROGRESS_INTERVAL == 0 {
                info!("routes: {}", total);
            }
        }
        let route_summary = packer.finish(out)?;
        info!(
            "{}: {} updates with {} NLRI",
            route, route_summary.updates, route_summary.prefixes
        );
        remaining -= route_summary.prefixes;
        summary += route_summary;
    }
    out.flush()?;

    info!(
        "wrote {} BGP updates with {} total NLRI",
        summary.updates, summary.prefixes
    );
    Ok(summary)
}

/// Writes a TABLE_DUMP_V2 file to `out`: the peer index table, then one RIB record per
/// sub-prefix.
///
/// Sequence numbers continue across route specifications. Record timestamps and originated times
/// come from `clock`.
pub fn generate_table_dump<W: Write + ?Sized, C: Clock>(
    out: &mut W,
    config: &GeneratorConfig,
    table_dump: &TableDumpConfig,
    clock: C,
) -> Result<TableDumpSummary, GeneratorError> {
    config.validate()?;
    let peer_index_table = table_dump.peer_index_table()?;

    let mut writer = MrtWriter::with_clock(out, clock);
    writer.write(&peer_index_table)?;

    let mut remaining = config.max_routes;
    let mut summary = TableDumpSummary {
        rib_entries: 0,
        next_sequence_number: table_dump.first_sequence_number,
    };
    for route in &config.routes {
        if remaining == 0 {
            break;
        }
        let mut rib = RibGenerator::new(
            route.next_hop,
            config.as_path.clone(),
            config.root_as,
            config.max_pack,
        )?
        .with_sequence_number(summary.next_sequence_number)
        .with_route_count(summary.rib_entries);
        let written = rib.write_all(&mut writer, route.sub_prefixes()?, remaining)?;
        info!("{}: {} RIB entries", route, written);

        remaining -= written;
        summary.rib_entries += written;
        summary.next_sequence_number = rib.sequence_number();
    }
    writer.flush()?;

    info!(
        "wrote {} RIB entries, next sequence number {}",
        summary.rib_entries, summary.next_sequence_number
    );
    Ok(summary)
}
