// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! A minimal Fstat packet containing `FileTOD` + `FileOPN(hasLFN)` +
//! `FileCLS` for the same `fileid` emits one `FstatWindow` with
//! `[Open, Close]`, and leaves no access entry pending once `clean_delay`
//! has elapsed.

use std::time::{Duration, Instant};

use xrootd_monitor::{
    events::{fstat, Event},
    mapper::StreamMapper,
    store::Store,
    wire::{fstat::FstatPacket, map::MapRecord},
};

use crate::integration_tests::common::{file_cls, file_opn_lfn, file_tod, map_body, srvinfo_payload};

#[test]
fn open_close_window_then_eviction() {
    let store = std::sync::Arc::new(Store::new(Duration::from_secs(30)));
    let mapper = StreamMapper::new(store.clone());

    // Step 0: a prior SrvInfo establishes sid=42 as a known server.
    let srv = MapRecord::decode(b'=', &map_body(3, 42, &srvinfo_payload(1094)), 0).unwrap();
    mapper.map_packet(&xrootd_monitor::wire::Packet {
        header: xrootd_monitor::wire::Header {
            code: b'=',
            pseq: 0,
            plen: 0,
            stod: 1,
        },
        record: xrootd_monitor::wire::Record::Map(srv),
    });

    let mut body = file_tod(42, 10, 20);
    body.extend_from_slice(&file_opn_lfn(7, 1024, 0, "/data/a"));
    body.extend_from_slice(&file_cls(7, 10, 0, 20));
    let fstat_packet = FstatPacket::decode(&body, 0).unwrap();

    let events = mapper.map_packet(&xrootd_monitor::wire::Packet {
        header: xrootd_monitor::wire::Header {
            code: b'f',
            pseq: 0,
            plen: 0,
            stod: 1,
        },
        record: xrootd_monitor::wire::Record::Fstat(fstat_packet),
    });

    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::Fstat(window) => {
            assert_eq!(window.start, 10);
            assert_eq!(window.end, 20);
            assert_eq!(window.records.len(), 2);
            assert!(matches!(window.records[0], fstat::Record::Open(_)));
            assert!(matches!(window.records[1], fstat::Record::Close(_)));
        }
        other => panic!("expected Fstat event, got {other:?}"),
    }

    assert!(store.get_access(1, 7).is_err(), "Close already freed the access entry");
    store.evict_ready(Instant::now() + Duration::from_secs(31));
    assert!(store.get_access(1, 7).is_err(), "still gone after clean_delay");
}
