//! BGP UPDATE framing and NLRI packing.
use crate::encoder::PathAttributes;
use crate::error::GeneratorError;
use crate::models::*;
use bytes::{BufMut, Bytes, BytesMut};
use log::debug;
use std::io::Write;
use std::net::IpAddr;

/// Marker, length, type, withdrawn routes length and total path attribute length.
pub const UPDATE_FIXED_LEN: usize = BGP_HEADER_LEN + 4;

/// One announce-only UPDATE message.
///
/// ```text
/// +-----------------------------------------------------+
/// |   Marker (16 octets), Length (2), Type (1)          |
/// +-----------------------------------------------------+
/// |   Withdrawn Routes Length (2 octets), always 0      |
/// +-----------------------------------------------------+
/// |   Total Path Attribute Length (2 octets)            |
/// +-----------------------------------------------------+
/// |   Path Attributes (variable)                        |
/// +-----------------------------------------------------+
/// |   Network Layer Reachability Information (variable) |
/// +-----------------------------------------------------+
/// ```
///
/// For IPv6 the NLRI block is carried inside MP_REACH_NLRI and the trailing NLRI field is empty.
#[derive(Debug, Clone, Copy)]
pub struct UpdateMessage<'a> {
    pub attributes: &'a PathAttributes,
    /// Encoded prefixes, back to back.
    pub nlri: &'a [u8],
}

impl UpdateMessage<'_> {
    pub fn encode(&self) -> Result<Bytes, GeneratorError> {
        let mut buf =
            BytesMut::with_capacity(UPDATE_FIXED_LEN + self.attributes.len() + self.nlri.len());
        buf.put_slice(&[0xFF; 16]);
        buf.put_u16(0); // length, patched below
        buf.put_u8(BgpMessageType::UPDATE.into());
        buf.put_u16(0); // withdrawn routes length
        buf.put_u16(0); // path attribute length, patched below

        let attr_len = if self.attributes.is_multiprotocol() {
            self.attributes.encode_into(self.nlri, &mut buf)?
        } else {
            buf.put_slice(self.attributes.base_attributes());
            let attr_len = self.attributes.base_attributes().len();
            buf.put_slice(self.nlri);
            attr_len
        };

        let total_len = buf.len();
        if total_len > BGP_MAX_MESSAGE_LEN {
            return Err(GeneratorError::MessageTooLarge(total_len));
        }
        // both fit in 16 bits once the total is under 4096
        buf[16..18].copy_from_slice(&(total_len as u16).to_be_bytes());
        buf[21..23].copy_from_slice(&(attr_len as u16).to_be_bytes());
        Ok(buf.freeze())
    }
}

/// Running totals of a packing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UpdateSummary {
    /// UPDATE messages written.
    pub updates: u64,
    /// Prefixes announced across all messages.
    pub prefixes: u64,
}

impl std::ops::AddAssign for UpdateSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.updates += rhs.updates;
        self.prefixes += rhs.prefixes;
    }
}

/// Packs prefixes sharing one next hop into as few UPDATE messages as the size limit and the
/// per-message prefix cap allow.
///
/// Prefixes are buffered until the next one would overflow the message or the batch already holds
/// `max_pack` prefixes. The pending message is then written out and, under an incrementing
/// [RootAsPolicy], the next message gets a rotated root AS.
///
/// ```rust
/// use bgpkit_routegen::encoder::UpdatePacker;
/// use bgpkit_routegen::models::{AsPath, RootAsPolicy, SubPrefixes};
///
/// let mut packer = UpdatePacker::new(
///     AsPath::from_sequence([20]).unwrap(),
///     "10.0.0.3".parse().unwrap(),
///     RootAsPolicy::default(),
///     2,
/// )
/// .unwrap();
/// let mut out = Vec::new();
/// for prefix in SubPrefixes::new("10.0.0.0/22".parse().unwrap(), 24).unwrap() {
///     packer.push(prefix, &mut out).unwrap();
/// }
/// let summary = packer.finish(&mut out).unwrap();
/// assert_eq!(summary.updates, 2);
/// assert_eq!(summary.prefixes, 4);
/// ```
#[derive(Debug, Clone)]
pub struct UpdatePacker {
    next_hop: IpAddr,
    as_path: AsPath,
    policy: RootAsPolicy,
    max_pack: u32,
    attributes: PathAttributes,
    nlri: BytesMut,
    batch: u32,
    summary: UpdateSummary,
}

impl UpdatePacker {
    pub fn new(
        as_path: AsPath,
        next_hop: IpAddr,
        policy: RootAsPolicy,
        max_pack: u32,
    ) -> Result<UpdatePacker, GeneratorError> {
        if max_pack == 0 {
            return Err(GeneratorError::InvalidMaxPack);
        }
        let attributes = PathAttributes::new(&as_path, next_hop);
        Ok(UpdatePacker {
            next_hop,
            as_path,
            policy,
            max_pack,
            attributes,
            nlri: BytesMut::with_capacity(BGP_MAX_MESSAGE_LEN),
            batch: 0,
            summary: UpdateSummary::default(),
        })
    }

    /// Bytes available for NLRI in one message with the current attributes.
    pub fn budget(&self) -> usize {
        BGP_MAX_MESSAGE_LEN.saturating_sub(UPDATE_FIXED_LEN + self.attributes.len())
    }

    /// Path the pending message will carry.
    pub fn as_path(&self) -> &AsPath {
        &self.as_path
    }

    /// Totals so far, counting buffered prefixes but not the pending message.
    pub fn summary(&self) -> UpdateSummary {
        self.summary
    }

    /// Adds one prefix, writing out the pending message first if the prefix does not fit it.
    pub fn push<W: Write + ?Sized>(
        &mut self,
        prefix: NetworkPrefix,
        out: &mut W,
    ) -> Result<(), GeneratorError> {
        if prefix.afi() != Afi::from(self.next_hop) {
            return Err(GeneratorError::AddressFamilyMismatch {
                prefix: prefix.prefix,
                next_hop: self.next_hop,
            });
        }

        let encoded_len = prefix.encoded_len();
        if self.nlri.len() + encoded_len > self.budget() || self.batch >= self.max_pack {
            self.flush(out)?;
        }
        // still too large for an empty message
        if encoded_len > self.budget() {
            return Err(GeneratorError::OversizedPrefix {
                prefix: prefix.prefix,
                encoded_len,
                budget: self.budget(),
            });
        }

        prefix.encode_into(&mut self.nlri);
        self.batch += 1;
        self.summary.prefixes += 1;
        Ok(())
    }

    /// Writes out the pending message, if any, and rotates the root AS for the next one.
    pub fn flush<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<(), GeneratorError> {
        if self.batch == 0 {
            return Ok(());
        }

        let message = UpdateMessage {
            attributes: &self.attributes,
            nlri: &self.nlri,
        }
        .encode()?;
        out.write_all(&message)?;
        debug!(
            "UPDATE #{}: {} bytes, {} prefixes, root AS {}",
            self.summary.updates,
            message.len(),
            self.batch,
            self.as_path.root()
        );
        self.summary.updates += 1;
        self.nlri.clear();
        self.batch = 0;

        if self.policy.increment {
            self.as_path = self.policy.rotate(self.as_path.clone());
            self.attributes = PathAttributes::new(&self.as_path, self.next_hop);
        }
        Ok(())
    }

    /// Writes out the trailing partial message and returns the totals.
    pub fn finish<W: Write + ?Sized>(
        mut self,
        out: &mut W,
    ) -> Result<UpdateSummary, GeneratorError> {
        self.flush(out)?;
        Ok(self.summary)
    }
}
