// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Grounded field-for-field on
//! `original_source/xrootdlib/streams/XrdXrootdMon/fstat.py`.

use crate::{
    store::{PathAccessInfo, ServerInfo, UserInfo},
    wire::fstat::{StatOps, StatSsq},
};

/// A client disconnected from the server.
#[derive(Debug, Clone)]
pub struct Disconnect {
    pub client: UserInfo,
}

/// A client opened a file. `access` always resolves by `fileid` — either
/// freshly synthesized from an inline dictid (see
/// `Store::set_access`/DESIGN.md) or looked up from a prior Map `Path`
/// record.
#[derive(Debug, Clone)]
pub struct Open {
    pub access: PathAccessInfo,
    pub lfn: Vec<u8>,
    pub readwrite: bool,
    pub filesize: i64,
}

/// A client closed a file.
#[derive(Debug, Clone)]
pub struct Close {
    pub access: PathAccessInfo,
    pub lfn: Vec<u8>,
    pub read: i64,
    pub readv: i64,
    pub write: i64,
    pub ops: Option<StatOps>,
    pub ssq: Option<StatSsq>,
}

/// A client transferred (read/wrote) data on an already-open file.
#[derive(Debug, Clone)]
pub struct Transfer {
    pub access: PathAccessInfo,
    pub lfn: Vec<u8>,
    pub read: i64,
    pub readv: i64,
    pub write: i64,
}

#[derive(Debug, Clone)]
pub enum Record {
    Disconnect(Disconnect),
    Open(Open),
    Close(Close),
    Transfer(Transfer),
}

/// Sequence of Open/Close/Disconnect/Transfer events observed in one fstat
/// packet's time window.
#[derive(Debug, Clone)]
pub struct FstatWindow {
    pub server: ServerInfo,
    pub start: i32,
    pub end: i32,
    pub records: Vec<Record>,
}
