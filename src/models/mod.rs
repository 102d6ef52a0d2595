/*!
`models` module defines the structs for BGP and MRT data this crate generates.

- [network]: address families, AS numbers, prefixes and sub-prefix iteration
- [bgp]: AS paths, path attribute constants, BGP message types
- [mrt]: MRT common header and TABLE_DUMP_V2 peer index / RIB structures
*/

pub mod bgp;
pub mod mrt;
pub mod network;

pub use bgp::*;
pub use mrt::*;
pub use network::*;
