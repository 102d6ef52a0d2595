//! BGP messages and relevant structs.

pub mod aspath;
pub mod attributes;

pub use aspath::*;
pub use attributes::*;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Maximum size of a BGP message, header included.
///
/// <https://datatracker.ietf.org/doc/html/rfc4271#section-4.1>
pub const BGP_MAX_MESSAGE_LEN: usize = 4096;

/// Marker, length and type.
pub const BGP_HEADER_LEN: usize = 19;

#[derive(Debug, TryFromPrimitive, IntoPrimitive, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BgpMessageType {
    OPEN = 1,
    UPDATE = 2,
    NOTIFICATION = 3,
    KEEPALIVE = 4,
}
