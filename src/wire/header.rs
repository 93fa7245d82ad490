// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use zerocopy::{BigEndian, FromBytes, Immutable, IntoBytes, KnownLayout, I32, U16};

use crate::error::DecodeError;

pub const HEADER_LEN: usize = 8;

/// Fixed 8-byte on-the-wire header shared by every record family.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct RawHeader {
    code: u8,
    pseq: u8,
    plen: U16<BigEndian>,
    stod: I32<BigEndian>,
}

/// Decoded header: record family tag, wrap-around packet sequence number,
/// declared total packet length (header included), and the server's start
///-of-day timestamp (the correlation epoch for this stream).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub code: u8,
    pub pseq: u8,
    pub plen: u16,
    pub stod: i32,
}

impl Header {
    pub fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        let raw = RawHeader::read_from_bytes(bytes).map_err(|_| DecodeError::LengthMismatch {
            offset: 0,
            family: "header",
            expected: HEADER_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self {
            code: raw.code,
            pseq: raw.pseq,
            plen: raw.plen.get(),
            stod: raw.stod.get(),
        })
    }
}
