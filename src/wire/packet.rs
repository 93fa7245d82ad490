// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::{
    error::DecodeError,
    wire::{
        buff::BuffPacket, burr::BurrRecord, fstat::FstatPacket, header::Header, map::MapRecord,
        plugin::PluginPacket,
    },
};

/// One decoded record, tagged by which of the five stream families produced
/// it.
#[derive(Debug, Clone)]
pub enum Record {
    Map(MapRecord),
    Burr(BurrRecord),
    Fstat(FstatPacket),
    Buff(BuffPacket),
    Plugin(PluginPacket),
}

/// A fully framed and decoded monitoring packet.
#[derive(Debug, Clone)]
pub struct Packet {
    pub header: Header,
    pub record: Record,
}

/// Dispatches on the header's `code` byte to the right family decoder, per
/// the original's `record_dispath` table
/// (`structs/XrdXrootdMon/__init__.py::Packet.from_stream`).
pub fn decode_record(code: u8, body: &[u8], offset: usize) -> Result<Record, DecodeError> {
    match code {
        b'=' | b'd' | b'i' | b'p' | b'u' | b'x' => {
            Ok(Record::Map(MapRecord::decode(code, body, offset)?))
        }
        b'r' => Ok(Record::Burr(BurrRecord::decode(body, offset)?)),
        b'f' => Ok(Record::Fstat(FstatPacket::decode(body, offset)?)),
        b't' => Ok(Record::Buff(BuffPacket::decode(body, offset)?)),
        b'g' => Ok(Record::Plugin(PluginPacket::decode(body, offset)?)),
        other => Err(DecodeError::UnknownRecordCode { offset, code: other }),
    }
}
