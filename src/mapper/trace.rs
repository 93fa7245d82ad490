// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::{
    events::{
        trace::{Close, Disconnect, Open, ReadWrite, Record, TraceWindow},
        Event,
    },
    store::Store,
    wire::buff::{BuffPacket, DiscFlags, TraceItem},
};

/// Grounded on
/// `original_source/xrootdlib/streams/XrdXrootdMon/trace.py::digest_packet`,
/// with `ReadWrite` conversion added (see `events::trace` for why this
/// departs from the original's dispatch table).
/// A single Buff packet can contain several `Window`-delimited groups, so
/// this yields zero or more `TraceWindow` events rather than at most one.
pub fn digest(store: &Store, stod: i32, packet: &BuffPacket) -> Vec<Event> {
    let mut iter = packet.records.iter();
    let mut this_window = match iter.next() {
        Some(TraceItem::Window(w)) => *w,
        // wire::buff::BuffPacket::decode already guarantees the first
        // record is a Window; anything else here is unreachable.
        _ => return Vec::new(),
    };
    let server = match store.get_server(stod, this_window.sid) {
        Ok(server) => server,
        Err(_) => return Vec::new(),
    };

    let mut windows = Vec::new();
    let mut records = Vec::new();
    for item in iter {
        match item {
            TraceItem::Window(w) => {
                if !records.is_empty() {
                    windows.push(Event::Trace(TraceWindow {
                        server: server.clone(),
                        start: this_window.start,
                        end: w.end,
                        records: std::mem::take(&mut records),
                    }));
                }
                this_window = *w;
            }
            TraceItem::Disc(disc) => {
                if let Ok(client) = store.get_user(stod, disc.dictid) {
                    store.free_user(stod, disc.dictid);
                    records.push(Record::Disconnect(Disconnect {
                        client,
                        duration: disc.buflen,
                        forced: disc.flags.contains(DiscFlags::FORCED),
                    }));
                }
            }
            TraceItem::Open(open) => {
                if let Ok(access) = store.get_access(stod, open.dictid) {
                    records.push(Record::Open(Open {
                        lfn: access.path.clone(),
                        access,
                        filesize: open.filesize as i64,
                    }));
                }
            }
            TraceItem::Close(close) => {
                if let Ok(access) = store.get_access(stod, close.dictid) {
                    store.free_access(stod, close.dictid);
                    records.push(Record::Close(Close {
                        lfn: access.path.clone(),
                        access,
                        rtot: close.rtot,
                        wtot: close.wtot,
                    }));
                }
            }
            TraceItem::ReadWrite(rw) => {
                if let Ok(access) = store.get_access(stod, rw.dictid) {
                    let (read, write) = if rw.is_write() {
                        (0, i64::from(-rw.buflen))
                    } else {
                        (i64::from(rw.buflen), 0)
                    };
                    records.push(Record::ReadWrite(ReadWrite {
                        lfn: access.path.clone(),
                        access,
                        read,
                        write,
                    }));
                }
            }
            // Not in the original's dispatch table either: decoded for
            // completeness, no event comes out of them.
            TraceItem::AppId(_) | TraceItem::ReadU(_) | TraceItem::ReadV(_) => {}
        }
    }
    windows
}
