// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::{
    events::{
        fstat::{Close, Disconnect, FstatWindow, Open, Record, Transfer},
        Event,
    },
    store::Store,
    wire::fstat::{FileOpnFlags, FstatItem, FstatPacket},
};

/// Grounded on
/// `original_source/xrootdlib/streams/XrdXrootdMon/fstat.py::digest_packet`:
/// drop the whole window if the server lookup misses, skip individual
/// records on a correlation miss, drop the window if nothing survives.
pub fn digest(store: &Store, stod: i32, packet: &FstatPacket) -> Option<Event> {
    let server = store.get_server(stod, packet.tod.sid).ok()?;
    let mut records = Vec::new();
    for item in &packet.records {
        match item {
            FstatItem::Dsc(dsc) => {
                if let Ok(client) = store.get_user(stod, dsc.dictid) {
                    store.free_user(stod, dsc.dictid);
                    records.push(Record::Disconnect(Disconnect { client }));
                }
            }
            FstatItem::Opn(opn) => {
                let readwrite = opn.flags.contains(FileOpnFlags::HAS_RW);
                let access = match &opn.lfn {
                    Some(lfn) => Some(store.set_access(&server, opn.fileid, opn.user, lfn.clone())),
                    None => store.get_access(stod, opn.fileid).ok(),
                };
                if let Some(access) = access {
                    let lfn = opn.lfn.clone().unwrap_or_else(|| access.path.clone());
                    records.push(Record::Open(Open {
                        access,
                        lfn,
                        readwrite,
                        filesize: opn.filesize,
                    }));
                }
            }
            FstatItem::Cls(cls) => {
                if let Ok(access) = store.get_access(stod, cls.fileid) {
                    store.free_access(stod, cls.fileid);
                    records.push(Record::Close(Close {
                        lfn: access.path.clone(),
                        access,
                        read: cls.read,
                        readv: cls.readv,
                        write: cls.write,
                        ops: cls.ops,
                        ssq: cls.ssq,
                    }));
                }
            }
            FstatItem::Xfr(xfr) => {
                if let Ok(access) = store.get_access(stod, xfr.fileid) {
                    store.free_access(stod, xfr.fileid);
                    records.push(Record::Transfer(Transfer {
                        lfn: access.path.clone(),
                        access,
                        read: xfr.read,
                        readv: xfr.readv,
                        write: xfr.write,
                    }));
                }
            }
        }
    }
    if records.is_empty() {
        return None;
    }
    Some(Event::Fstat(FstatWindow {
        server,
        start: packet.tod.start,
        end: packet.tod.end,
        records,
    }))
}
