// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use thiserror::Error;

/// A record or packet could not be decoded from its declared byte layout.
///
/// Every variant carries the offset of the record within the packet body so
/// a caller logging the error can point at the offending bytes.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("io error while reading from byte source: {0}")]
    Io(#[from] std::io::Error),

    #[error("offset {offset}: unknown record code 0x{code:02x}")]
    UnknownRecordCode { offset: usize, code: u8 },

    #[error("offset {offset}: unknown {family} tag 0x{tag:02x}")]
    UnknownTag {
        offset: usize,
        family: &'static str,
        tag: u8,
    },

    #[error(
        "offset {offset}: {family} length mismatch: expected {expected}, got {actual}"
    )]
    LengthMismatch {
        offset: usize,
        family: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("offset {offset}: first {family} record must be {expected}")]
    UnexpectedFirstRecord {
        offset: usize,
        family: &'static str,
        expected: &'static str,
    },

    #[error("offset {offset}: last {family} record must be {expected}")]
    DanglingRecords {
        offset: usize,
        family: &'static str,
        expected: &'static str,
    },

    #[error("offset {offset}: malformed user id")]
    MalformedUserId { offset: usize },

    #[error("offset {offset}: malformed cgi payload")]
    MalformedCgi { offset: usize },
}

/// The kind of correlation entity a [`MapInfoError`] failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Server,
    User,
    Access,
}

/// A correlation lookup against the [`crate::store::Store`] missed.
///
/// This is always recovered locally by the caller (drop the record, or drop
/// the whole packet for a packet-level lookup) and never propagates past the
/// mapper.
#[derive(Debug, Error, Clone, Copy)]
#[error("{kind:?} not found for stod={stod} id={id}")]
pub struct MapInfoError {
    pub kind: EntityKind,
    pub stod: i32,
    pub id: u64,
}

impl MapInfoError {
    pub fn new(kind: EntityKind, stod: i32, id: u64) -> Self {
        Self { kind, stod, id }
    }
}
