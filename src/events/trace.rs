// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Grounded field-for-field on
//! `original_source/xrootdlib/streams/XrdXrootdMon/trace.py`, with one
//! deliberate departure: the original's `convert_record_dispatch` has no
//! entry for `ReadWrite` (an unhandled record there hits the `assert
//! isinstance(..., WindowStruct)` in `digest_packet` instead), but this
//! crate's conversion table does cover it — `AppId`/`ReadU`/`ReadV` remain
//! unconverted, as in the original.

use crate::store::{PathAccessInfo, ServerInfo, UserInfo};

/// A client disconnected from the server.
#[derive(Debug, Clone)]
pub struct Disconnect {
    pub client: UserInfo,
    pub duration: i32,
    pub forced: bool,
}

/// A client opened a file, resolved by the access dictid a prior Map `Path`
/// record already bound.
#[derive(Debug, Clone)]
pub struct Open {
    pub access: PathAccessInfo,
    pub lfn: Vec<u8>,
    pub filesize: i64,
}

/// A client closed a file.
#[derive(Debug, Clone)]
pub struct Close {
    pub access: PathAccessInfo,
    pub lfn: Vec<u8>,
    pub rtot: u64,
    pub wtot: u64,
}

/// A buffered read or write, split by the sign of the wire record's
/// `buflen` (negative is a write, positive a read — `wire::buff::ReadWrite`
/// packs both into one tagged record).
#[derive(Debug, Clone)]
pub struct ReadWrite {
    pub access: PathAccessInfo,
    pub lfn: Vec<u8>,
    pub read: i64,
    pub write: i64,
}

#[derive(Debug, Clone)]
pub enum Record {
    Disconnect(Disconnect),
    Open(Open),
    Close(Close),
    ReadWrite(ReadWrite),
}

/// One of possibly several sequences of events a single Buff packet yields,
/// one per `Window`-delimited group (a Buff packet can carry more than one
/// window mark).
#[derive(Debug, Clone)]
pub struct TraceWindow {
    pub server: ServerInfo,
    pub start: i32,
    pub end: i32,
    pub records: Vec<Record>,
}
