// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The correlation store: identity tables keyed by `(stod, id)`, fed by Map
//! records and consulted by the stream mapper. Grounded on
//! `original_source/xrootdlib/streams/XrdXrootdMon/map.py::MapInfoStore`.

pub mod eviction;
pub mod identity;

use std::{
    collections::VecDeque,
    sync::Mutex,
    time::{Duration, Instant},
};

use dashmap::DashMap;

pub use identity::{PathAccessInfo, ServerInfo, Stod, UserInfo};

use crate::{
    error::{EntityKind, MapInfoError},
    wire::{
        cgi::UserId,
        map::{MapPayload, MapRecord},
    },
};

/// What a Map record produced once fed to the store — the resulting
/// identity object, or nothing for payload kinds that are decoded but
/// don't mutate correlation state.
pub enum MapOutcome {
    Server(ServerInfo),
    User(UserInfo),
    Access(PathAccessInfo),
    None,
}

#[derive(Debug, Clone, Copy)]
enum Deletion {
    Server(Stod, u64),
    User(Stod, u32),
    Access(Stod, u32),
}

/// The correlation store. Foreground lookups and inserts go through
/// `dashmap::DashMap` so the mapper and the background eviction task never
/// need an external lock.
pub struct Store {
    servers: DashMap<(Stod, u64), ServerInfo>,
    users: DashMap<(Stod, u32), UserInfo>,
    accesses: DashMap<(Stod, u32), PathAccessInfo>,
    host_port_index: DashMap<(Vec<u8>, u16), (Stod, u64)>,
    deletions: Mutex<VecDeque<(Instant, Deletion)>>,
    clean_delay: Duration,
}

impl Store {
    pub fn new(clean_delay: Duration) -> Self {
        Self {
            servers: DashMap::new(),
            users: DashMap::new(),
            accesses: DashMap::new(),
            host_port_index: DashMap::new(),
            deletions: Mutex::new(VecDeque::new()),
            clean_delay,
        }
    }

    /// Feeds a Map record to the store, returning the identity object it
    /// produced (if any).
    pub fn ingest_map(&self, stod: Stod, record: &MapRecord) -> MapOutcome {
        match &record.payload {
            MapPayload::SrvInfo(srv) => {
                MapOutcome::Server(self.ingest_server(stod, &record.userid, srv))
            }
            MapPayload::AuthInfo(auth) => {
                match self.ingest_auth(stod, record.dictid, &record.userid, auth.clone()) {
                    Ok(user) => MapOutcome::User(user),
                    Err(_) => MapOutcome::None,
                }
            }
            MapPayload::Path(path) => {
                match self.ingest_path(stod, record.dictid, &record.userid, path.path.clone()) {
                    Ok(access) => MapOutcome::Access(access),
                    Err(_) => MapOutcome::None,
                }
            }
            MapPayload::AppInfo(_) | MapPayload::PrgInfo(_) | MapPayload::XfrInfo(_) => {
                MapOutcome::None
            }
        }
    }

    fn ingest_server(
        &self,
        stod: Stod,
        user_id: &UserId,
        srv: &crate::wire::map::SrvInfo,
    ) -> ServerInfo {
        let instance_id = (user_id.host.clone(), srv.port);
        if let Some(old_key) = self.host_port_index.get(&instance_id).map(|e| *e.value()) {
            self.schedule_deletion(Deletion::Server(old_key.0, old_key.1));
        }
        let info = ServerInfo::new(user_id, srv, stod);
        self.host_port_index.insert(instance_id, (stod, user_id.sid));
        self.servers.insert((stod, user_id.sid), info.clone());
        info
    }

    fn ingest_auth(
        &self,
        stod: Stod,
        dictid: u32,
        user_id: &UserId,
        auth: crate::wire::map::AuthInfo,
    ) -> Result<UserInfo, MapInfoError> {
        let server = self.get_server(stod, user_id.sid)?;
        let info = UserInfo {
            client: user_id.clone(),
            server,
            auth: Some(auth),
        };
        self.users.insert((stod, dictid), info.clone());
        Ok(info)
    }

    fn ingest_path(
        &self,
        stod: Stod,
        dictid: u32,
        user_id: &UserId,
        path: Vec<u8>,
    ) -> Result<PathAccessInfo, MapInfoError> {
        let server = self.get_server(stod, user_id.sid)?;
        let info = PathAccessInfo {
            client: Some(user_id.clone()),
            server,
            path,
            auth: None,
        };
        self.accesses.insert((stod, dictid), info.clone());
        Ok(info)
    }

    pub fn get_server(&self, stod: Stod, sid: u64) -> Result<ServerInfo, MapInfoError> {
        self.servers
            .get(&(stod, sid))
            .map(|e| e.value().clone())
            .ok_or(MapInfoError::new(EntityKind::Server, stod, sid))
    }

    pub fn get_user(&self, stod: Stod, dictid: u32) -> Result<UserInfo, MapInfoError> {
        self.users
            .get(&(stod, dictid))
            .map(|e| e.value().clone())
            .ok_or(MapInfoError::new(EntityKind::User, stod, dictid as u64))
    }

    pub fn free_user(&self, stod: Stod, dictid: u32) {
        self.schedule_deletion(Deletion::User(stod, dictid));
    }

    /// Synthesizes a path access entry from raw references — used by the
    /// `FileOPN`-with-inline-LFN mapper path (see DESIGN.md for why this
    /// doesn't just call `get_user` the way the original does).
    pub fn set_access(
        &self,
        server: &ServerInfo,
        dictid: u32,
        userid: Option<u32>,
        path: Vec<u8>,
    ) -> PathAccessInfo {
        let (client, auth) = match userid.and_then(|id| self.get_user(server.stod, id).ok()) {
            Some(user) => (Some(user.client), user.auth),
            None => (None, None),
        };
        let info = PathAccessInfo {
            client,
            server: server.clone(),
            path,
            auth,
        };
        self.accesses.insert((server.stod, dictid), info.clone());
        info
    }

    pub fn get_access(&self, stod: Stod, dictid: u32) -> Result<PathAccessInfo, MapInfoError> {
        self.accesses
            .get(&(stod, dictid))
            .map(|e| e.value().clone())
            .ok_or(MapInfoError::new(EntityKind::Access, stod, dictid as u64))
    }

    pub fn free_access(&self, stod: Stod, dictid: u32) {
        self.schedule_deletion(Deletion::Access(stod, dictid));
    }

    fn schedule_deletion(&self, deletion: Deletion) {
        let at = Instant::now() + self.clean_delay;
        self.deletions
            .lock()
            .expect("deletion queue mutex poisoned")
            .push_back((at, deletion));
    }

    /// Removes every deletion scheduled at or before `now`. Exposed as a
    /// plain method (rather than hidden behind a background thread) so unit
    /// tests can drive eviction deterministically — see DESIGN.md.
    pub fn evict_ready(&self, now: Instant) {
        let mut queue = self.deletions.lock().expect("deletion queue mutex poisoned");
        while let Some((at, _)) = queue.front() {
            if *at > now {
                break;
            }
            let (_, deletion) = queue.pop_front().expect("checked non-empty");
            match deletion {
                Deletion::Server(stod, sid) => {
                    self.servers.remove(&(stod, sid));
                }
                Deletion::User(stod, dictid) => {
                    self.users.remove(&(stod, dictid));
                }
                Deletion::Access(stod, dictid) => {
                    self.accesses.remove(&(stod, dictid));
                }
            }
        }
    }
}
