// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Two back-to-back SrvInfo records with the same `(host, port)` but
//! different `sid` cause the first `ServerInfo` to be scheduled for
//! eviction; a Fstat referencing the old `sid` within `clean_delay` still
//! resolves.

use std::time::{Duration, Instant};

use xrootd_monitor::{
    mapper::StreamMapper,
    store::Store,
    wire::{fstat::FstatPacket, map::MapRecord},
};

use crate::integration_tests::common::{file_tod, map_body, srvinfo_payload};

#[test]
fn old_sid_still_resolves_before_clean_delay() {
    let store = std::sync::Arc::new(Store::new(Duration::from_secs(30)));
    let mapper = StreamMapper::new(store.clone());

    let mk_map_event = |record: MapRecord| {
        mapper.map_packet(&xrootd_monitor::wire::Packet {
            header: xrootd_monitor::wire::Header { code: b'=', pseq: 0, plen: 0, stod: 1 },
            record: xrootd_monitor::wire::Record::Map(record),
        })
    };

    mk_map_event(MapRecord::decode(b'=', &map_body(3, 42, &srvinfo_payload(1094)), 0).unwrap());
    // Same host:port (both baked into `srvinfo_payload`/`map_body`), new sid: a restart.
    mk_map_event(MapRecord::decode(b'=', &map_body(4, 43, &srvinfo_payload(1094)), 0).unwrap());

    assert!(store.get_server(1, 42).is_ok(), "old sid still resolvable, deletion only scheduled");
    assert!(store.get_server(1, 43).is_ok());

    let body = file_tod(42, 0, 1);
    let fstat_packet = FstatPacket::decode(&body, 0).unwrap();
    assert!(
        store.get_server(1, fstat_packet.tod.sid).is_ok(),
        "Fstat referencing the old sid resolves within clean_delay"
    );

    store.evict_ready(Instant::now() + Duration::from_secs(31));
    assert!(store.get_server(1, 42).is_err(), "old sid evicted after clean_delay");
    assert!(store.get_server(1, 43).is_ok(), "current sid unaffected");
}
