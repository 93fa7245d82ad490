// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::cmp::Ordering;

use crate::{
    error::DecodeError,
    framer::{ByteSource, PacketFramer},
    wire::Packet,
};

/// A wrap-aware 8-bit packet sequence number. Two sequence numbers are
/// compared as if laid out on a ring: a value just past the wrap point
/// (`< 64`) is considered greater than one just before it (`>= 191`), and
/// vice versa, so reordering stays correct across the 255->0 rollover.
///
/// Grounded on
/// `original_source/xrootdlib/streams/XrdXrootdMon/utility.py::PSeq`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PSeq(pub u8);

impl PSeq {
    fn is_greater(self, other: Self) -> bool {
        let (a, b) = (self.0, other.0);
        if a < 64 && b >= 191 {
            true
        } else if b < 64 && a >= 191 {
            false
        } else {
            a > b
        }
    }
}

impl PartialOrd for PSeq {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PSeq {
    fn cmp(&self, other: &Self) -> Ordering {
        if self == other {
            Ordering::Equal
        } else if self.is_greater(*other) {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    }
}

/// Bounded reordering window over a [`PacketFramer`]. Pre-fills up to `W`
/// packets, then on every call emits the one with the smallest sequence
/// number and admits one fresh packet to take its place; on exhaustion it
/// drains whatever remains in ascending order.
pub struct ReorderBuffer<S> {
    framer: PacketFramer<S>,
    window: usize,
    buffer: Vec<Packet>,
    exhausted: bool,
}

impl<S: ByteSource> ReorderBuffer<S> {
    /// `window` must satisfy `1 <= window < 128`.
    pub fn new(framer: PacketFramer<S>, window: usize) -> Self {
        assert!((1..128).contains(&window), "reorder window out of range");
        Self {
            framer,
            window,
            buffer: Vec::with_capacity(window),
            exhausted: false,
        }
    }

    pub async fn next(&mut self) -> Result<Option<Packet>, DecodeError> {
        while self.buffer.len() < self.window && !self.exhausted {
            match self.framer.next_packet().await? {
                Some(packet) => self.buffer.push(packet),
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }
        if self.buffer.is_empty() {
            return Ok(None);
        }
        let idx = self
            .buffer
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| PSeq(a.header.pseq).cmp(&PSeq(b.header.pseq)))
            .map(|(idx, _)| idx)
            .expect("buffer non-empty");
        Ok(Some(self.buffer.remove(idx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_around_255_to_0() {
        assert_eq!(PSeq(255).cmp(&PSeq(0)), Ordering::Less);
        assert_eq!(PSeq(0).cmp(&PSeq(1)), Ordering::Less);
        assert_eq!(PSeq(1).cmp(&PSeq(255)), Ordering::Greater);
    }

    #[test]
    fn ascending_order_is_wrap_aware() {
        let mut values = [PSeq(1), PSeq(255), PSeq(0)];
        values.sort();
        assert_eq!(values, [PSeq(255), PSeq(0), PSeq(1)]);
    }
}
