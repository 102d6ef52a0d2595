#[cfg(test)]
mod tests {
    use bgpkit_routegen::encoder::FixedClock;
    use bgpkit_routegen::generator::*;
    use bgpkit_routegen::models::{AsPath, RootAsPolicy};
    use bytes::{Buf, Bytes};
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    #[derive(Debug)]
    struct Peer {
        peer_type: u8,
        bgp_id: Ipv4Addr,
        address: IpAddr,
        asn: u32,
    }

    #[derive(Debug)]
    struct Rib {
        subtype: u16,
        sequence_number: u32,
        prefix_len: u8,
        prefix: Vec<u8>,
        peer_index: u16,
        originated_time: u32,
        attributes: Bytes,
    }

    #[derive(Debug, Default)]
    struct TableDump {
        timestamps: Vec<u32>,
        collector_id: Option<Ipv4Addr>,
        view_name: String,
        peers: Vec<Peer>,
        ribs: Vec<Rib>,
    }

    fn decode_table_dump(mut data: Bytes) -> TableDump {
        let mut dump = TableDump::default();
        while data.has_remaining() {
            let timestamp = data.get_u32();
            assert_eq!(data.get_u16(), 13, "TABLE_DUMP_V2");
            let subtype = data.get_u16();
            let length = data.get_u32() as usize;
            let mut body = data.split_to(length);
            dump.timestamps.push(timestamp);

            match subtype {
                1 => {
                    dump.collector_id = Some(Ipv4Addr::from(body.get_u32()));
                    let name_len = body.get_u16() as usize;
                    dump.view_name = String::from_utf8(body.split_to(name_len).to_vec()).unwrap();
                    let peer_count = body.get_u16();
                    for _ in 0..peer_count {
                        let peer_type = body.get_u8();
                        let bgp_id = Ipv4Addr::from(body.get_u32());
                        let address = match peer_type & 0x1 {
                            0 => IpAddr::V4(Ipv4Addr::from(body.get_u32())),
                            _ => IpAddr::V6(Ipv6Addr::from(body.get_u128())),
                        };
                        let asn = match peer_type & 0x2 {
                            0 => body.get_u16() as u32,
                            _ => body.get_u32(),
                        };
                        dump.peers.push(Peer {
                            peer_type,
                            bgp_id,
                            address,
                            asn,
                        });
                    }
                }
                2 | 4 => {
                    let sequence_number = body.get_u32();
                    let prefix_len = body.get_u8();
                    let prefix = body.split_to(prefix_len.div_ceil(8) as usize).to_vec();
                    assert_eq!(body.get_u16(), 1, "entry count");
                    let peer_index = body.get_u16();
                    let originated_time = body.get_u32();
                    let attr_len = body.get_u16() as usize;
                    let attributes = body.split_to(attr_len);
                    dump.ribs.push(Rib {
                        subtype,
                        sequence_number,
                        prefix_len,
                        prefix,
                        peer_index,
                        originated_time,
                        attributes,
                    });
                }
                other => panic!("unexpected subtype {}", other),
            }
            assert!(!body.has_remaining(), "trailing bytes in record");
        }
        dump
    }

    #[derive(Debug)]
    struct Update {
        length: usize,
        attributes: Bytes,
        nlri: Bytes,
    }

    fn decode_updates(mut data: Bytes) -> Vec<Update> {
        let mut updates = vec![];
        while data.has_remaining() {
            let length = u16::from_be_bytes([data[16], data[17]]) as usize;
            let mut msg = data.split_to(length);
            assert_eq!(msg.split_to(16).as_ref(), &[0xff; 16]);
            assert_eq!(msg.get_u16() as usize, length);
            assert_eq!(msg.get_u8(), 2, "UPDATE");
            assert_eq!(msg.get_u16(), 0, "withdrawn routes length");
            let attr_len = msg.get_u16() as usize;
            let attributes = msg.split_to(attr_len);
            updates.push(Update {
                length,
                attributes,
                nlri: msg,
            });
        }
        updates
    }

    /// Splits an attribute block into (flags, type, value).
    fn split_attributes(mut attrs: Bytes) -> Vec<(u8, u8, Bytes)> {
        let mut out = vec![];
        while attrs.has_remaining() {
            let flags = attrs.get_u8();
            let attr_type = attrs.get_u8();
            let len = match flags & 0x10 {
                0 => attrs.get_u8() as usize,
                _ => attrs.get_u16() as usize,
            };
            out.push((flags, attr_type, attrs.split_to(len)));
        }
        out
    }

    fn count_nlri(mut nlri: Bytes) -> usize {
        let mut count = 0;
        while nlri.has_remaining() {
            let len = nlri.get_u8();
            nlri.advance(len.div_ceil(8) as usize);
            count += 1;
        }
        count
    }

    fn root_as(attrs: &Bytes) -> u32 {
        let (_, _, as_path) = split_attributes(attrs.clone())
            .into_iter()
            .find(|(_, t, _)| *t == 2)
            .unwrap();
        let n = as_path.len();
        u32::from_be_bytes([as_path[n - 4], as_path[n - 3], as_path[n - 2], as_path[n - 1]])
    }

    fn routes(args: &[&str]) -> GeneratorConfig {
        GeneratorConfig {
            routes: RouteSpec::parse_all(args).unwrap(),
            ..Default::default()
        }
    }

    fn single_peer() -> TableDumpConfig {
        TableDumpConfig {
            peers: vec!["10.0.0.1,10.0.0.2,65001".parse().unwrap()],
            ..Default::default()
        }
    }

    #[test]
    fn test_table_dump_round_trip() {
        let config = routes(&["10.1.0.0/24", "24", "10.0.0.3"]);
        let mut out = vec![];
        let summary =
            generate_table_dump(&mut out, &config, &single_peer(), FixedClock(1700000000)).unwrap();
        assert_eq!(summary.rib_entries, 1);
        assert_eq!(summary.next_sequence_number, 1);

        let dump = decode_table_dump(Bytes::from(out));
        assert_eq!(dump.collector_id, Some(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(dump.view_name, "view");
        assert_eq!(dump.peers.len(), 1);
        let peer = &dump.peers[0];
        assert_eq!(peer.peer_type, 0x2);
        assert_eq!(peer.bgp_id, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(peer.address, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)));
        assert_eq!(peer.asn, 65001);

        assert_eq!(dump.ribs.len(), 1);
        let rib = &dump.ribs[0];
        assert_eq!(rib.subtype, 2);
        assert_eq!(rib.sequence_number, 0);
        assert_eq!(rib.prefix_len, 24);
        assert_eq!(rib.prefix, vec![0x0a, 0x01, 0x00]);
        assert_eq!(rib.peer_index, 0);
        assert_eq!(rib.originated_time, 1700000000);
        assert!(dump.timestamps.iter().all(|t| *t == 1700000000));

        let attrs = split_attributes(rib.attributes.clone());
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs[0], (0x40, 1, Bytes::from_static(&[0])));
        assert_eq!(
            attrs[1],
            (0x40, 2, Bytes::from_static(&[2, 1, 0, 0, 0, 20]))
        );
        assert_eq!(attrs[2], (0x40, 3, Bytes::from_static(&[10, 0, 0, 3])));
    }

    #[test]
    fn test_table_dump_ipv6() {
        let config = routes(&["2001:db8::/46", "48", "2001:db8::1"]);
        let table_dump = TableDumpConfig {
            peers: vec![
                "10.0.0.1,10.0.0.2,65001".parse().unwrap(),
                "10.0.0.9,2001:db8::2,4200000000".parse().unwrap(),
            ],
            ..Default::default()
        };
        let mut out = vec![];
        generate_table_dump(&mut out, &config, &table_dump, FixedClock(0)).unwrap();
        let dump = decode_table_dump(Bytes::from(out));

        assert_eq!(dump.peers.len(), 2);
        assert_eq!(dump.peers[1].peer_type, 0x3);
        assert_eq!(dump.peers[1].asn, 4200000000);

        assert_eq!(dump.ribs.len(), 4);
        for (i, rib) in dump.ribs.iter().enumerate() {
            assert_eq!(rib.subtype, 4);
            assert_eq!(rib.prefix_len, 48);
            assert_eq!(rib.prefix[..4], [0x20, 0x01, 0x0d, 0xb8]);
            assert_eq!(rib.prefix[5], i as u8);
            let attrs = split_attributes(rib.attributes.clone());
            let (flags, attr_type, mp) = &attrs[2];
            assert_eq!((*flags, *attr_type), (0x80, 14));
            assert_eq!(mp.len(), 21);
            assert_eq!(&mp[..4], &[0, 2, 1, 16]);
        }
    }

    #[test]
    fn test_sequence_numbers_continue_and_wrap() {
        let config = routes(&[
            "10.0.0.0/23",
            "25",
            "10.0.0.3",
            "10.1.0.0/24",
            "25",
            "10.0.0.3",
        ]);
        let table_dump = TableDumpConfig {
            first_sequence_number: u32::MAX - 3,
            ..single_peer()
        };
        let mut out = vec![];
        generate_table_dump(&mut out, &config, &table_dump, FixedClock(0)).unwrap();
        let seqs: Vec<u32> = decode_table_dump(Bytes::from(out))
            .ribs
            .iter()
            .map(|r| r.sequence_number)
            .collect();
        assert_eq!(
            seqs,
            vec![u32::MAX - 3, u32::MAX - 2, u32::MAX - 1, u32::MAX, 0, 1]
        );
    }

    #[test]
    fn test_table_dump_root_as_groups() {
        let mut config = routes(&["10.0.0.0/24", "27", "10.0.0.3"]);
        config.as_path = "65001,100".parse().unwrap();
        config.root_as = RootAsPolicy::new(true, 102);
        config.max_pack = 3;
        let mut out = vec![];
        generate_table_dump(&mut out, &config, &single_peer(), FixedClock(0)).unwrap();
        let roots: Vec<u32> = decode_table_dump(Bytes::from(out))
            .ribs
            .iter()
            .map(|r| root_as(&r.attributes))
            .collect();
        assert_eq!(roots, vec![100, 100, 100, 101, 101, 101, 0, 0]);
    }

    #[test]
    fn test_update_properties() {
        for (args, max_pack) in [
            (["10.0.0.0/12", "24", "10.0.0.3"], 0xFFFF),
            (["10.0.0.0/16", "30", "10.0.0.3"], 500),
            (["2001:db8::/32", "48", "2001:db8::1"], 0xFFFF),
            (["2001:db8::/40", "56", "2001:db8::1"], 7),
        ] {
            let mut config = routes(&args);
            config.max_pack = max_pack;
            config.as_path = AsPath::from_sequence(vec![64512; 40]).unwrap();
            let mut out = vec![];
            let summary = generate_updates(&mut out, &config).unwrap();
            let total_len = out.len();

            let updates = decode_updates(Bytes::from(out));
            assert_eq!(updates.len() as u64, summary.updates);
            assert_eq!(
                updates.iter().map(|u| u.length).sum::<usize>(),
                total_len
            );

            let mut prefixes = 0;
            for update in &updates {
                assert!(update.length <= 4096);
                let nlri = if args[2].contains(':') {
                    assert!(update.nlri.is_empty());
                    let attrs = split_attributes(update.attributes.clone());
                    let (flags, attr_type, mp) = attrs.last().unwrap().clone();
                    assert_eq!((flags, attr_type), (0x90, 14));
                    // afi, safi, next hop length, next hop, snpa count
                    mp.slice(5 + 16..)
                } else {
                    update.nlri.clone()
                };
                let count = count_nlri(nlri);
                assert!(count as u32 <= max_pack);
                prefixes += count;
            }
            assert_eq!(prefixes as u64, summary.prefixes);
        }
    }

    #[test]
    fn test_update_ipv6_mp_length() {
        let config = routes(&["2001:db8::/32", "33", "2001:db8::1"]);
        let mut out = vec![];
        generate_updates(&mut out, &config).unwrap();
        let updates = decode_updates(Bytes::from(out));
        assert_eq!(updates.len(), 1);

        let attrs = split_attributes(updates[0].attributes.clone());
        let (_, _, mp) = &attrs[2];
        let nlri_len = 2 * (1 + 5);
        assert_eq!(mp.len(), 5 + 16 + nlri_len);
        assert_eq!(
            &mp[21..],
            &[33, 0x20, 0x01, 0x0d, 0xb8, 0x00, 33, 0x20, 0x01, 0x0d, 0xb8, 0x80]
        );
    }

    #[test]
    fn test_update_root_as_rotation() {
        let mut config = routes(&["10.0.0.0/24", "28", "10.0.0.3"]);
        config.as_path = "65001,4294967294".parse().unwrap();
        config.root_as = RootAsPolicy::new(true, 0);
        config.max_pack = 4;
        let mut out = vec![];
        generate_updates(&mut out, &config).unwrap();
        let roots: Vec<u32> = decode_updates(Bytes::from(out))
            .iter()
            .map(|u| root_as(&u.attributes))
            .collect();
        assert_eq!(roots, vec![4294967294, 4294967295, 0, 1]);
    }

    #[test]
    fn test_update_root_as_resets_per_route() {
        let mut config = routes(&[
            "10.0.0.0/24",
            "25",
            "10.0.0.3",
            "10.1.0.0/24",
            "25",
            "10.0.0.3",
        ]);
        config.root_as = RootAsPolicy::new(true, 1000);
        config.max_pack = 1;
        let mut out = vec![];
        generate_updates(&mut out, &config).unwrap();
        let roots: Vec<u32> = decode_updates(Bytes::from(out))
            .iter()
            .map(|u| root_as(&u.attributes))
            .collect();
        assert_eq!(roots, vec![20, 21, 20, 21]);
    }

    #[test]
    fn test_idempotent_output() {
        let mut config = routes(&[
            "10.0.0.0/20",
            "24",
            "10.0.0.3",
            "2001:db8::/44",
            "48",
            "2001:db8::1",
        ]);
        config.root_as = RootAsPolicy::new(true, 0);
        config.max_pack = 5;

        let run = || {
            let mut updates = vec![];
            generate_updates(&mut updates, &config).unwrap();
            let mut dump = vec![];
            generate_table_dump(&mut dump, &config, &single_peer(), FixedClock(42)).unwrap();
            (updates, dump)
        };
        assert_eq!(run(), run());
    }
}
