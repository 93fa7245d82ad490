// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Grounded field-for-field on
//! `original_source/xrootdlib/streams/XrdXrootdMon/redir.py`.

use crate::{
    store::{ServerInfo, UserInfo},
    wire::burr::RedirKind,
};

/// A redirect decision handed to a client.
#[derive(Debug, Clone)]
pub struct Redirection {
    pub kind: RedirKind,
    pub target: Vec<u8>,
    pub port: u16,
    pub client: UserInfo,
    pub path: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum Record {
    Redirection(Redirection),
}

/// One of possibly several redirect-event sequences a single Burr packet
/// yields, one per `WindowMark`-delimited group.
#[derive(Debug, Clone)]
pub struct RedirWindow {
    pub server: ServerInfo,
    pub start: i32,
    pub end: i32,
    pub records: Vec<Record>,
}
