// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::{events::Event, wire::plugin::PluginPacket};

/// Plugin records carry nothing to correlate against; this exists only to
/// keep the per-family dispatch in `StreamMapper::map_packet` uniform.
pub fn digest(packet: &PluginPacket) -> Event {
    Event::Plugin(packet.clone().into())
}
