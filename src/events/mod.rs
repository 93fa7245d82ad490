// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Ephemeral, correlated events — what [`crate::mapper::StreamMapper`]
//! produces from a decoded [`crate::wire::Packet`]. Grounded on the
//! `*Window`/`digest_packet` family in
//! `original_source/xrootdlib/streams/XrdXrootdMon/{fstat,trace,redir,map}.py`:
//! each stream family keeps its own event shapes rather than sharing one
//! padded-with-`Option` struct, since e.g. trace's `Disconnect` carries
//! `duration`/`forced` that fstat's doesn't.

pub mod fstat;
pub mod plugin;
pub mod redir;
pub mod trace;

use clap::ValueEnum;
use enum_dispatch::enum_dispatch;

use crate::store::{PathAccessInfo, ServerInfo, UserInfo};

/// Selects which event kinds `xrdmon-pp` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Selector {
    Packet,
    Redir,
    Fstat,
    Fstats,
    Traces,
    Server,
    Plugin,
}

#[enum_dispatch]
pub trait EventKind {
    fn selector(&self) -> Selector;
}

impl EventKind for ServerInfo {
    fn selector(&self) -> Selector {
        Selector::Server
    }
}
impl EventKind for UserInfo {
    fn selector(&self) -> Selector {
        Selector::Server
    }
}
impl EventKind for PathAccessInfo {
    fn selector(&self) -> Selector {
        Selector::Server
    }
}
impl EventKind for fstat::FstatWindow {
    fn selector(&self) -> Selector {
        Selector::Fstat
    }
}
impl EventKind for trace::TraceWindow {
    fn selector(&self) -> Selector {
        Selector::Traces
    }
}
impl EventKind for redir::RedirWindow {
    fn selector(&self) -> Selector {
        Selector::Redir
    }
}
impl EventKind for plugin::PluginEvent {
    fn selector(&self) -> Selector {
        Selector::Plugin
    }
}

/// Everything a packet can turn into once correlated. A Map packet yields
/// zero or one identity event (`Server`/`User`/`Access`); the other four
/// families yield at most one window per packet, each carrying its own
/// `records` list of per-item events.
#[enum_dispatch(EventKind)]
#[derive(Debug, Clone)]
pub enum Event {
    Server(ServerInfo),
    User(UserInfo),
    Access(PathAccessInfo),
    Fstat(fstat::FstatWindow),
    Trace(trace::TraceWindow),
    Redir(redir::RedirWindow),
    Plugin(plugin::PluginEvent),
}
