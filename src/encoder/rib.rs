//! TABLE_DUMP_V2 RIB records.
use crate::encoder::{Clock, MrtEncode, MrtWriter, PathAttributes};
use crate::error::GeneratorError;
use crate::generator::PROGRESS_INTERVAL;
use crate::models::*;
use bytes::{BufMut, Bytes, BytesMut};
use log::{debug, info};
use std::io::Write;
use std::net::IpAddr;

impl RibAfiEntries {
    pub fn encode(&self) -> Result<Bytes, GeneratorError> {
        let entry_count =
            u16::try_from(self.rib_entries.len()).map_err(|_| GeneratorError::FieldOverflow {
                field: "RIB entry count",
                len: self.rib_entries.len(),
            })?;

        let mut bytes = BytesMut::new();
        bytes.put_u32(self.sequence_number);
        self.prefix.encode_into(&mut bytes);
        bytes.put_u16(entry_count);
        for entry in &self.rib_entries {
            entry.encode_into(&mut bytes)?;
        }
        Ok(bytes.freeze())
    }
}

impl MrtEncode for RibAfiEntries {
    fn entry_type(&self) -> EntryType {
        EntryType::TABLE_DUMP_V2
    }

    fn entry_subtype(&self) -> u16 {
        self.rib_type.into()
    }

    fn encode(&self) -> Result<Bytes, GeneratorError> {
        RibAfiEntries::encode(self)
    }
}

impl RibEntry {
    pub fn encode_into(&self, bytes: &mut BytesMut) -> Result<(), GeneratorError> {
        let attr_len =
            u16::try_from(self.attributes.len()).map_err(|_| GeneratorError::FieldOverflow {
                field: "RIB entry attributes",
                len: self.attributes.len(),
            })?;
        bytes.put_u16(self.peer_index);
        bytes.put_u32(self.originated_time);
        bytes.put_u16(attr_len);
        bytes.put_slice(&self.attributes);
        Ok(())
    }

    pub fn encode(&self) -> Result<Bytes, GeneratorError> {
        let mut bytes = BytesMut::with_capacity(8 + self.attributes.len());
        self.encode_into(&mut bytes)?;
        Ok(bytes.freeze())
    }
}

/// Turns a stream of prefixes into RIB records for one next hop.
///
/// Every record holds a single entry referring to one peer of the peer index table. Sequence
/// numbers count up from the starting value and wrap after `u32::MAX`.
///
/// With an incrementing [RootAsPolicy], the root AS rotates after every `max_pack` records, so
/// consecutive groups of `max_pack` prefixes share a path the same way they would share an UPDATE
/// message.
#[derive(Debug, Clone)]
pub struct RibGenerator {
    next_hop: IpAddr,
    rib_type: TableDumpV2Type,
    as_path: AsPath,
    policy: RootAsPolicy,
    max_pack: u32,
    peer_index: u16,
    sequence_number: u32,
    in_group: u32,
    routes: u64,
    attributes: Bytes,
}

impl RibGenerator {
    pub fn new(
        next_hop: IpAddr,
        as_path: AsPath,
        policy: RootAsPolicy,
        max_pack: u32,
    ) -> Result<RibGenerator, GeneratorError> {
        if max_pack == 0 {
            return Err(GeneratorError::InvalidMaxPack);
        }
        let attributes = PathAttributes::new(&as_path, next_hop).encode_standalone();
        Ok(RibGenerator {
            next_hop,
            rib_type: TableDumpV2Type::unicast_rib(Afi::from(next_hop)),
            as_path,
            policy,
            max_pack,
            peer_index: 0,
            sequence_number: 0,
            in_group: 0,
            routes: 0,
            attributes,
        })
    }

    /// Sets the first sequence number to hand out.
    pub fn with_sequence_number(mut self, sequence_number: u32) -> Self {
        self.sequence_number = sequence_number;
        self
    }

    /// Sets the peer index table position every entry refers to. Defaults to the first peer.
    pub fn with_peer_index(mut self, peer_index: u16) -> Self {
        self.peer_index = peer_index;
        self
    }

    /// Sets the number of routes already written by earlier generators, so progress logging
    /// counts across route specifications.
    pub fn with_route_count(mut self, routes: u64) -> Self {
        self.routes = routes;
        self
    }

    /// Routes written so far, including the count passed to [Self::with_route_count].
    pub fn route_count(&self) -> u64 {
        self.routes
    }

    /// Sequence number the next record will carry.
    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    /// Path the next record will carry.
    pub fn as_path(&self) -> &AsPath {
        &self.as_path
    }

    /// Builds the record for `prefix` and advances the generator state.
    ///
    /// Fails when the prefix is of another address family than the next hop.
    pub fn next_entry(
        &mut self,
        prefix: NetworkPrefix,
        originated_time: u32,
    ) -> Result<RibAfiEntries, GeneratorError> {
        if prefix.afi() != Afi::from(self.next_hop) {
            return Err(GeneratorError::AddressFamilyMismatch {
                prefix: prefix.prefix,
                next_hop: self.next_hop,
            });
        }

        let entries = RibAfiEntries {
            rib_type: self.rib_type,
            sequence_number: self.sequence_number,
            prefix,
            rib_entries: vec![RibEntry {
                peer_index: self.peer_index,
                originated_time,
                attributes: self.attributes.clone(),
            }],
        };

        self.sequence_number = self.sequence_number.wrapping_add(1);
        self.in_group += 1;
        if self.in_group >= self.max_pack {
            self.in_group = 0;
            if self.policy.increment {
                self.as_path = self.policy.rotate(self.as_path.clone());
                self.attributes =
                    PathAttributes::new(&self.as_path, self.next_hop).encode_standalone();
                debug!("root AS rotated to {}", self.as_path.root());
            }
        }

        Ok(entries)
    }

    /// Writes one record per prefix, stopping after `limit` records. Returns the number written.
    pub fn write_all<W, C, I>(
        &mut self,
        writer: &mut MrtWriter<W, C>,
        prefixes: I,
        limit: u64,
    ) -> Result<u64, GeneratorError>
    where
        W: Write,
        C: Clock,
        I: IntoIterator<Item = NetworkPrefix>,
    {
        let mut written = 0;
        for prefix in prefixes {
            if written >= limit {
                break;
            }
            let entries = self.next_entry(prefix, writer.now())?;
            writer.write(&entries)?;
            written += 1;
            self.routes += 1;
            if self.routes % PROGRESS_INTERVAL == 0 {
                info!("routes: {}", self.routes);
            }
        }
        Ok(written)
    }
}
