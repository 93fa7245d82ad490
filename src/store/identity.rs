// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::wire::{cgi::UserId, map::AuthInfo};

/// A stream-of-day and server-instance-id pair, the correlation key shared
/// by every identity table.
pub type Stod = i32;

/// Identity of the xrootd instance that sent reports for a given `stod`.
/// Stored by value wherever a `UserInfo`/`PathAccessInfo` needs one — see
/// DESIGN.md on the cyclic-ownership Open Question.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub protocol: Vec<u8>,
    pub user: Vec<u8>,
    pub pid: u32,
    pub sid: u64,
    pub host: Vec<u8>,
    pub program: Vec<u8>,
    pub version: Vec<u8>,
    pub instance: Vec<u8>,
    pub port: u16,
    pub site: Vec<u8>,
    pub stod: Stod,
}

impl ServerInfo {
    pub fn new(user_id: &UserId, srv: &crate::wire::map::SrvInfo, stod: Stod) -> Self {
        Self {
            protocol: user_id.prot.clone(),
            user: user_id.user.clone(),
            pid: user_id.pid,
            sid: user_id.sid,
            host: user_id.host.clone(),
            program: srv.pgm.clone(),
            version: srv.ver.clone(),
            instance: srv.inst.clone(),
            port: srv.port,
            site: srv.site.clone(),
            stod,
        }
    }
}

/// A user authenticated against a correlated server.
#[derive(Debug, Clone)]
pub struct UserInfo {
    pub client: UserId,
    pub server: ServerInfo,
    pub auth: Option<AuthInfo>,
}

/// Metadata of a client accessing a path on a server. `client`/`auth` may be
/// absent when monitoring settings didn't capture them.
#[derive(Debug, Clone)]
pub struct PathAccessInfo {
    pub client: Option<UserId>,
    pub server: ServerInfo,
    pub path: Vec<u8>,
    pub auth: Option<AuthInfo>,
}
