// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Plugin (g-stream) records carry no server/user identifier to correlate
//! against (see `wire::plugin`'s doc comment — this family postdates
//! `original_source/` entirely), so the mapper passes the decoded packet
//! through unchanged.

use crate::wire::plugin::PluginPacket;

#[derive(Debug, Clone)]
pub struct PluginEvent {
    pub packet: PluginPacket,
}

impl From<PluginPacket> for PluginEvent {
    fn from(packet: PluginPacket) -> Self {
        Self { packet }
    }
}
