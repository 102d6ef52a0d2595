//! This module implements the wire encoders for generated routes.
//!
//! - [UpdatePacker] packs prefixes into BGP UPDATE messages
//! - [RibGenerator] turns prefixes into TABLE_DUMP_V2 RIB records
//! - [MrtWriter] frames MRT records onto an output stream
//!
//! [PathAttributes] is shared by both output formats.

mod attributes;
mod mrt;
mod peer_index;
mod rib;
mod update;

pub use attributes::PathAttributes;
pub use mrt::{Clock, FixedClock, MrtEncode, MrtWriter, SystemClock};
pub use rib::RibGenerator;
pub use update::{UpdateMessage, UpdatePacker, UpdateSummary, UPDATE_FIXED_LEN};
