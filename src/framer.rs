// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use bytes::Bytes;

use crate::{
    error::DecodeError,
    wire::{decode_record, Header, Packet, HEADER_LEN},
};

/// Anything that can supply raw bytes for the framer to slice packets out
/// of. A short read (fewer bytes than requested, including zero) signals
/// clean exhaustion of the source — it is never itself an error.
///
/// Reads a fixed header then a declared-length remainder off a single
/// connection, the same shape as any length-prefixed framing loop.
pub trait ByteSource {
    async fn read(&mut self, n: usize) -> std::io::Result<Bytes>;
}

/// Reads length-prefixed packets off a [`ByteSource`], one at a time.
pub struct PacketFramer<S> {
    source: S,
}

impl<S: ByteSource> PacketFramer<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Returns the next packet, `Ok(None)` once the source is exhausted, or
    /// `Err` if a record could not be decoded — fatal and non-recoverable,
    /// since a decode failure means the byte stream has lost sync.
    pub async fn next_packet(&mut self) -> Result<Option<Packet>, DecodeError> {
        let header_bytes = self.source.read(HEADER_LEN).await?;
        if header_bytes.len() < HEADER_LEN {
            return Ok(None);
        }
        let header = Header::parse(&header_bytes)?;
        if (header.plen as usize) < HEADER_LEN {
            return Err(DecodeError::LengthMismatch {
                offset: 0,
                family: "header",
                expected: HEADER_LEN,
                actual: header.plen as usize,
            });
        }
        let body_len = header.plen as usize - HEADER_LEN;
        let body = self.source.read(body_len).await?;
        if body.len() < body_len {
            return Ok(None);
        }
        let record = decode_record(header.code, &body, HEADER_LEN)?;
        Ok(Some(Packet { header, record }))
    }
}
