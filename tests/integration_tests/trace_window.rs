// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! A Buff packet `Window(start=10, sid=S), Open, ReadWrite(+1024), Close,
//! Window(end=20)` with `S` resolvable emits one
//! `TraceWindow(start=10, end=20, [Open, ReadWrite, Close])`.

use std::time::Duration;

use xrootd_monitor::{
    events::{trace, Event},
    mapper::StreamMapper,
    store::Store,
    wire::{buff::BuffPacket, map::MapRecord},
};

use crate::integration_tests::common::{buff, map_body, path_payload, srvinfo_payload};

#[test]
fn open_readwrite_close_in_one_window() {
    let store = std::sync::Arc::new(Store::new(Duration::from_secs(30)));
    let mapper = StreamMapper::new(store.clone());

    let mk_map_event = |code: u8, record: MapRecord| {
        mapper.map_packet(&xrootd_monitor::wire::Packet {
            header: xrootd_monitor::wire::Header { code, pseq: 0, plen: 0, stod: 1 },
            record: xrootd_monitor::wire::Record::Map(record),
        })
    };

    mk_map_event(b'=', MapRecord::decode(b'=', &map_body(3, 50, &srvinfo_payload(1094)), 0).unwrap());
    mk_map_event(b'd', MapRecord::decode(b'd', &map_body(7, 50, &path_payload("/data/a")), 0).unwrap());

    let mut body = buff::window(50, 0, 10).to_vec();
    body.extend_from_slice(&buff::open(7, 2048));
    body.extend_from_slice(&buff::read_write(1024, 7));
    body.extend_from_slice(&buff::close(7, 1024, 0));
    body.extend_from_slice(&buff::window(50, 20, 0));
    let buff_packet = BuffPacket::decode(&body, 0).unwrap();

    let events = mapper.map_packet(&xrootd_monitor::wire::Packet {
        header: xrootd_monitor::wire::Header { code: b't', pseq: 0, plen: 0, stod: 1 },
        record: xrootd_monitor::wire::Record::Buff(buff_packet),
    });

    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::Trace(window) => {
            assert_eq!(window.start, 10);
            assert_eq!(window.end, 20);
            assert_eq!(window.records.len(), 3);
            assert!(matches!(window.records[0], trace::Record::Open(_)));
            match &window.records[1] {
                trace::Record::ReadWrite(rw) => {
                    assert_eq!(rw.read, 1024);
                    assert_eq!(rw.write, 0);
                }
                other => panic!("expected ReadWrite, got {other:?}"),
            }
            assert!(matches!(window.records[2], trace::Record::Close(_)));
        }
        other => panic!("expected Trace event, got {other:?}"),
    }
}
