// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::{
    events::{
        redir::{Record, RedirWindow, Redirection},
        Event,
    },
    store::Store,
    wire::burr::{BurrItem, BurrRecord},
};

/// Grounded on
/// `original_source/xrootdlib/streams/XrdXrootdMon/redir.py::digest_packet`.
pub fn digest(store: &Store, stod: i32, packet: &BurrRecord) -> Vec<Event> {
    let server = match store.get_server(stod, packet.sid.sid) {
        Ok(server) => server,
        Err(_) => return Vec::new(),
    };
    let mut iter = packet.records.iter();
    let mut this_window = match iter.next() {
        Some(BurrItem::WindowMark(w)) => *w,
        // wire::burr::BurrRecord::decode already guarantees the first
        // post-sid record is a WindowMark.
        _ => return Vec::new(),
    };

    let mut windows = Vec::new();
    let mut records = Vec::new();
    for item in iter {
        match item {
            BurrItem::WindowMark(w) => {
                if !records.is_empty() {
                    windows.push(Event::Redir(RedirWindow {
                        server: server.clone(),
                        start: this_window.timestamp,
                        end: this_window.timestamp + w.prev_duration,
                        records: std::mem::take(&mut records),
                    }));
                }
                this_window = *w;
            }
            BurrItem::Redirect(redirect) => {
                if let Ok(client) = store.get_user(stod, redirect.dictid) {
                    records.push(Record::Redirection(Redirection {
                        kind: redirect.kind,
                        target: redirect.target.clone(),
                        port: redirect.port,
                        client,
                        path: redirect.path.clone(),
                    }));
                }
            }
        }
    }
    windows
}
