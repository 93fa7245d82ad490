// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! A Map/SrvInfo packet followed by a Map/Path packet whose `userid.sid`
//! matches yields two emitted identity objects, and the store resolves
//! both afterwards.

use xrootd_monitor::{events::Event, mapper::StreamMapper, store::Store, wire::decode_record};

use crate::integration_tests::common::{map_body, packet, path_payload, srvinfo_payload};

#[test]
fn srvinfo_then_path_yield_two_identities() {
    let store = std::sync::Arc::new(Store::new(std::time::Duration::from_secs(30)));
    let mapper = StreamMapper::new(store.clone());

    let srv_body = map_body(3, 42, &srvinfo_payload(1094));
    let srv_packet = packet(b'=', 0, 1, &srv_body);
    let header = xrootd_monitor::wire::Header::parse(&srv_packet[..8]).unwrap();
    let record = decode_record(header.code, &srv_packet[8..], 8).unwrap();
    let events = mapper.map_packet(&xrootd_monitor::wire::Packet { header, record });
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], Event::Server(_)));

    let path_body = map_body(7, 42, &path_payload("/data/a"));
    let path_packet = packet(b'd', 1, 1, &path_body);
    let header = xrootd_monitor::wire::Header::parse(&path_packet[..8]).unwrap();
    let record = decode_record(header.code, &path_packet[8..], 8).unwrap();
    let events = mapper.map_packet(&xrootd_monitor::wire::Packet { header, record });
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], Event::Access(_)));

    assert!(store.get_server(1, 42).is_ok());
    assert!(store.get_access(1, 7).is_ok());
}
