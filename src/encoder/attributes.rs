//! Path attribute block shared by generated UPDATE messages and RIB entries.
//!
//! Every generated route carries the same three attributes:
//! - ORIGIN, always IGP
//! - AS_PATH, one AS_SEQUENCE segment of 4-octet ASNs
//! - NEXT_HOP for IPv4, or MP_REACH_NLRI (AFI 2 / SAFI 1) for IPv6
//!
//! For IPv6 UPDATE messages the prefixes travel inside MP_REACH_NLRI, so its length is only known
//! once the NLRI block is complete. The builder keeps that attribute as a separate shell with a
//! zeroed length field, and [PathAttributes::encode_into] patches the field when the NLRI is
//! written after it.
use crate::error::GeneratorError;
use crate::models::*;
use bytes::{BufMut, Bytes, BytesMut};
use std::net::{IpAddr, Ipv4Addr};

const AS_PATH_AS_SEQUENCE: u8 = 2;

/// Flags, type and two-octet length of an extended-length attribute.
const MP_REACH_HEADER_LEN: usize = 4;

/// Encoded path attributes for one (AS path, next hop) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathAttributes {
    next_hop: IpAddr,
    /// ORIGIN, AS_PATH and, for IPv4, NEXT_HOP.
    attrs: Bytes,
    /// MP_REACH_NLRI with a zero length placeholder; IPv6 only.
    mp_reach: Option<Bytes>,
}

impl PathAttributes {
    pub fn new(as_path: &AsPath, next_hop: IpAddr) -> PathAttributes {
        let mut attrs = BytesMut::with_capacity(16 + 4 * as_path.len());
        encode_origin(Origin::IGP, &mut attrs);
        encode_as_path(as_path, &mut attrs);

        let mp_reach = match next_hop {
            IpAddr::V4(addr) => {
                encode_next_hop(&addr, &mut attrs);
                None
            }
            IpAddr::V6(_) => Some(encode_mp_reach_shell(&next_hop)),
        };

        PathAttributes {
            next_hop,
            attrs: attrs.freeze(),
            mp_reach,
        }
    }

    pub fn next_hop(&self) -> IpAddr {
        self.next_hop
    }

    /// Whether the prefixes have to be carried inside MP_REACH_NLRI.
    pub fn is_multiprotocol(&self) -> bool {
        self.mp_reach.is_some()
    }

    /// Bytes the attributes take in an UPDATE before any NLRI is added.
    pub fn len(&self) -> usize {
        self.attrs.len() + self.mp_reach.as_ref().map_or(0, |mp| mp.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// ORIGIN, AS_PATH and NEXT_HOP as they appear in an UPDATE.
    pub fn base_attributes(&self) -> &Bytes {
        &self.attrs
    }

    /// The MP_REACH_NLRI shell, length field still zero.
    pub fn mp_reach_shell(&self) -> Option<&Bytes> {
        self.mp_reach.as_ref()
    }

    /// Writes the attributes followed by the MP_REACH_NLRI shell carrying `nlri`, with the shell's
    /// length field patched to cover the NLRI.
    ///
    /// Only valid for multiprotocol attributes; IPv4 NLRI goes after the attribute block and is
    /// written by the UPDATE framing instead. Returns the number of bytes written.
    pub fn encode_into(&self, nlri: &[u8], buf: &mut BytesMut) -> Result<usize, GeneratorError> {
        let start = buf.len();
        buf.put_slice(&self.attrs);
        if let Some(shell) = &self.mp_reach {
            let mp_len = shell.len() - MP_REACH_HEADER_LEN + nlri.len();
            let mp_len = u16::try_from(mp_len).map_err(|_| GeneratorError::FieldOverflow {
                field: "MP_REACH_NLRI",
                len: mp_len,
            })?;
            let shell_start = buf.len();
            buf.put_slice(shell);
            buf[shell_start + 2..shell_start + 4].copy_from_slice(&mp_len.to_be_bytes());
            buf.put_slice(nlri);
        }
        Ok(buf.len() - start)
    }

    /// Encodes the attributes as a self-contained block, the form stored in TABLE_DUMP_V2 RIB
    /// entries.
    ///
    /// For IPv6 the MP_REACH_NLRI carries the next hop and no NLRI, which fits the one-octet
    /// length form.
    pub fn encode_standalone(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.len());
        buf.put_slice(&self.attrs);
        if self.mp_reach.is_some() {
            let mut value = BytesMut::with_capacity(21);
            encode_mp_reach_value(&self.next_hop, &mut value);
            put_attribute(AttrFlags::OPTIONAL, AttrType::MP_REACHABLE_NLRI, &value, &mut buf);
        }
        buf.freeze()
    }
}

/// Writes one attribute, switching to the two-octet length form when the value needs it.
fn put_attribute(flags: AttrFlags, attr_type: AttrType, value: &[u8], buf: &mut BytesMut) {
    match u8::try_from(value.len()) {
        Ok(len) => {
            buf.put_u8(flags.bits());
            buf.put_u8(attr_type.into());
            buf.put_u8(len);
        }
        Err(_) => {
            buf.put_u8((flags | AttrFlags::EXTENDED).bits());
            buf.put_u8(attr_type.into());
            // at most 2 + 4 * 255 for AS_PATH, the longest value generated here
            buf.put_u16(value.len() as u16);
        }
    }
    buf.put_slice(value);
}

fn encode_origin(origin: Origin, buf: &mut BytesMut) {
    put_attribute(AttrFlags::TRANSITIVE, AttrType::ORIGIN, &[u8::from(origin)], buf);
}

fn encode_as_path(path: &AsPath, buf: &mut BytesMut) {
    let mut value = BytesMut::with_capacity(2 + 4 * path.len());
    value.put_u8(AS_PATH_AS_SEQUENCE);
    // AsPath caps the length at 255
    value.put_u8(path.len() as u8);
    for asn in path.asns() {
        value.put_u32(asn.to_u32());
    }
    put_attribute(AttrFlags::TRANSITIVE, AttrType::AS_PATH, &value, buf);
}

fn encode_next_hop(addr: &Ipv4Addr, buf: &mut BytesMut) {
    put_attribute(AttrFlags::TRANSITIVE, AttrType::NEXT_HOP, &addr.octets(), buf);
}

/// AFI, SAFI, next hop length, next hop and a zero SNPA count.
fn encode_mp_reach_value(next_hop: &IpAddr, buf: &mut BytesMut) {
    buf.put_u16(Afi::from(*next_hop).into());
    buf.put_u8(Safi::Unicast.into());
    match next_hop {
        IpAddr::V4(n) => {
            buf.put_u8(4);
            buf.put_slice(&n.octets());
        }
        IpAddr::V6(n) => {
            buf.put_u8(16);
            buf.put_slice(&n.octets());
        }
    }
    buf.put_u8(0);
}

fn encode_mp_reach_shell(next_hop: &IpAddr) -> Bytes {
    let mut buf = BytesMut::with_capacity(MP_REACH_HEADER_LEN + 21);
    buf.put_u8((AttrFlags::OPTIONAL | AttrFlags::EXTENDED).bits());
    buf.put_u8(AttrType::MP_REACHABLE_NLRI.into());
    buf.put_u16(0);
    encode_mp_reach_value(next_hop, &mut buf);
    buf.freeze()
}
