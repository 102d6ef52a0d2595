/*!
`bgpkit-routegen` generates synthetic BGP routing data for exercising BGP speakers and route
collectors.

Two outputs are supported:
- a stream of BGP UPDATE messages, ready to be replayed over an established BGP session;
- an MRT TABLE_DUMP_V2 file with a peer index table and one RIB record per generated prefix.

Routes are described by `PREFIX SUBLEN NEXTHOP` triples: every sub-prefix of length `SUBLEN` inside
`PREFIX` is announced via `NEXTHOP`. IPv6 routes are carried in MP_REACH_NLRI.

# Examples

## Generate UPDATE messages

```rust
use bgpkit_routegen::generator::{generate_updates, GeneratorConfig, RouteSpec};

let config = GeneratorConfig {
    routes: RouteSpec::parse_all(&["10.0.0.0/16", "24", "10.0.0.3"]).unwrap(),
    max_pack: 100,
    ..Default::default()
};
let mut out = Vec::new();
let summary = generate_updates(&mut out, &config).unwrap();
assert_eq!(summary.prefixes, 256);
assert_eq!(summary.updates, 3);
```

## Generate a table dump

```rust
use bgpkit_routegen::encoder::FixedClock;
use bgpkit_routegen::generator::*;

let config = GeneratorConfig {
    routes: RouteSpec::parse_all(&["2001:db8::/32", "40", "2001:db8::1"]).unwrap(),
    ..Default::default()
};
let table_dump = TableDumpConfig {
    peers: vec!["10.0.0.1,10.0.0.2,65001".parse().unwrap()],
    ..Default::default()
};
let mut out = Vec::new();
let summary = generate_table_dump(&mut out, &config, &table_dump, FixedClock(0)).unwrap();
assert_eq!(summary.rib_entries, 256);
```

# Supported RFCs

- [RFC 4271](https://datatracker.ietf.org/doc/html/rfc4271): A Border Gateway Protocol 4 (BGP-4)
- [RFC 4760](https://datatracker.ietf.org/doc/html/rfc4760): Multiprotocol Extensions for BGP-4
- [RFC 6793](https://datatracker.ietf.org/doc/html/rfc6793): BGP Support for Four-Octet Autonomous System (AS) Number Space
- [RFC 6396](https://datatracker.ietf.org/doc/html/rfc6396): Multi-Threaded Routing Toolkit (MRT) Routing Information Export Format
*/

pub mod encoder;
pub mod error;
pub mod generator;
pub mod models;

pub use error::{ErrorCategory, GeneratorError};
pub use generator::{
    generate_table_dump, generate_updates, GeneratorConfig, PeerSpec, RouteSpec, TableDumpConfig,
};
