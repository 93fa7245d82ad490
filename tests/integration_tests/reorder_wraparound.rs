// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! A stream of 16 packets with `pseq = [8, 9, …, 15, 0, 1, …, 7]` delivers
//! in sender order `[0,1,…,15]`.
//!
//! The reorder algorithm only guarantees sorted output when a stream's
//! out-of-order distance is `<= W-1`; this stream's distance is 8 (packet
//! `0` arrives 8 slots late), so it needs `W=9` — see DESIGN.md for the
//! reasoning behind that window size.

use xrootd_monitor::{framer::PacketFramer, reorder::ReorderBuffer};

use crate::integration_tests::common::{packet, plugin_body, MemorySource};

#[tokio::test]
async fn sixteen_packet_wraparound_delivers_in_order() {
    let arrival: Vec<u8> = (8..16).chain(0..8).collect();
    let body = plugin_body();
    let packets = arrival
        .iter()
        .map(|&pseq| packet(b'g', pseq, 1, &body))
        .collect();

    let source = MemorySource::new(packets);
    let framer = PacketFramer::new(source);
    let mut reorder = ReorderBuffer::new(framer, 9);

    let mut delivered = Vec::new();
    while let Some(p) = reorder.next().await.unwrap() {
        delivered.push(p.header.pseq);
    }

    assert_eq!(delivered, (0..16).collect::<Vec<u8>>());
}
