// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! `ServerIdent, WindowMark(t=100), Redirect, Redirect,
//! WindowMark(prev_duration=60)` emits one `RedirWindow(start=100, end=160)`
//! with two redirects.

use std::time::Duration;

use xrootd_monitor::{
    events::Event,
    mapper::StreamMapper,
    store::Store,
    wire::{burr::BurrRecord, map::MapRecord},
};

use crate::integration_tests::common::{authinfo_payload, burr, map_body, srvinfo_payload};

#[test]
fn two_redirects_in_one_window() {
    let store = std::sync::Arc::new(Store::new(Duration::from_secs(30)));
    let mapper = StreamMapper::new(store.clone());

    let mk_map_event = |code: u8, record: MapRecord| {
        mapper.map_packet(&xrootd_monitor::wire::Packet {
            header: xrootd_monitor::wire::Header { code, pseq: 0, plen: 0, stod: 1 },
            record: xrootd_monitor::wire::Record::Map(record),
        })
    };

    // A server instance (sid=99) and a client (dictid=5) bound through it.
    mk_map_event(b'=', MapRecord::decode(b'=', &map_body(3, 99, &srvinfo_payload(1094)), 0).unwrap());
    mk_map_event(b'u', MapRecord::decode(b'u', &map_body(5, 99, authinfo_payload()), 0).unwrap());

    let mut body = burr::server_ident(99);
    body.extend(burr::window_mark(100, 0));
    body.extend(burr::redirect(1094, 5, "other1.example.org", "/data/x"));
    body.extend(burr::redirect(1094, 5, "other2.example.org", "/data/y"));
    body.extend(burr::window_mark(160, 60));
    let burr_record = BurrRecord::decode(&body, 0).unwrap();

    let events = mapper.map_packet(&xrootd_monitor::wire::Packet {
        header: xrootd_monitor::wire::Header { code: b'r', pseq: 0, plen: 0, stod: 1 },
        record: xrootd_monitor::wire::Record::Burr(burr_record),
    });

    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::Redir(window) => {
            assert_eq!(window.start, 100);
            assert_eq!(window.end, 160);
            assert_eq!(window.records.len(), 2);
        }
        other => panic!("expected Redir event, got {other:?}"),
    }
}
