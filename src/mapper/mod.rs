// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Turns a decoded [`Packet`] into zero or more correlated [`Event`]s,
//! consulting and mutating a [`Store`] as it goes. Grounded on the
//! `digest_packet` family across
//! `original_source/xrootdlib/streams/XrdXrootdMon/{map,fstat,trace,redir}.py`.
//! Pure sync dispatch — nothing here touches I/O.

pub mod fstat;
pub mod map;
pub mod plugin;
pub mod redir;
pub mod trace;

use std::sync::Arc;

use crate::{
    events::Event,
    store::Store,
    wire::{Packet, Record as WireRecord},
};

pub struct StreamMapper {
    store: Arc<Store>,
}

impl StreamMapper {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn map_packet(&self, packet: &Packet) -> Vec<Event> {
        let stod = packet.header.stod;
        match &packet.record {
            WireRecord::Map(record) => map::digest(&self.store, stod, record)
                .into_iter()
                .collect(),
            WireRecord::Fstat(record) => fstat::digest(&self.store, stod, record)
                .into_iter()
                .collect(),
            WireRecord::Buff(record) => trace::digest(&self.store, stod, record),
            WireRecord::Burr(record) => redir::digest(&self.store, stod, record),
            WireRecord::Plugin(record) => vec![plugin::digest(record)],
        }
    }
}
