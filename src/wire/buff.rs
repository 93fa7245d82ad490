// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use bitflags::bitflags;

use crate::{error::DecodeError, wire::fstat::SID_MASK};

pub const TRACE_SIZE: usize = 16;

pub mod tag {
    pub const OPEN: u8 = 0x80;
    pub const READV: u8 = 0x90;
    pub const READU: u8 = 0x91;
    pub const APPID: u8 = 0xa0;
    pub const CLOSE: u8 = 0xc0;
    pub const DISC: u8 = 0xd0;
    pub const WINDOW: u8 = 0xe0;
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DiscFlags: u8 {
        const FORCED = 0x01;
        const BOUNDP = 0x02;
    }
}

fn be_i32(buf: &[u8], off: usize) -> i32 {
    i32::from_be_bytes(buf[off..off + 4].try_into().expect("checked length"))
}
fn be_u32(buf: &[u8], off: usize) -> u32 {
    u32::from_be_bytes(buf[off..off + 4].try_into().expect("checked length"))
}
fn be_i64(buf: &[u8], off: usize) -> i64 {
    i64::from_be_bytes(buf[off..off + 8].try_into().expect("checked length"))
}
fn be_u48(buf: &[u8], off: usize) -> u64 {
    let mut padded = [0u8; 8];
    padded[2..8].copy_from_slice(&buf[off..off + 6]);
    u64::from_be_bytes(padded)
}
fn be_u56(buf: &[u8], off: usize) -> u64 {
    let mut padded = [0u8; 8];
    padded[1..8].copy_from_slice(&buf[off..off + 7]);
    u64::from_be_bytes(padded)
}

/// An application-supplied identifier tag (`XROOTD_MON_APPID`).
#[derive(Debug, Clone)]
pub struct AppId {
    pub appid: Vec<u8>,
}

/// A file was closed; `rtot`/`wtot` are byte-shifted totals.
#[derive(Debug, Clone, Copy)]
pub struct Close {
    pub rtot: u64,
    pub wtot: u64,
    pub dictid: u32,
}

/// A client disconnected.
#[derive(Debug, Clone, Copy)]
pub struct Disc {
    pub flags: DiscFlags,
    pub buflen: i32,
    pub dictid: u32,
}

/// A file was opened.
#[derive(Debug, Clone, Copy)]
pub struct Open {
    pub filesize: u64,
    pub dictid: u32,
}

/// A vectored/unbuffered read event (`READV`/`READU`). Currently unsupported
/// downstream: decoded here for completeness, dropped by the mapper.
#[derive(Debug, Clone, Copy)]
pub struct Read {
    pub readid: u8,
    pub count: u16,
    pub buflen: i32,
    pub dictid: u32,
}

/// A buffered read or write; `buflen`'s sign distinguishes the two.
#[derive(Debug, Clone, Copy)]
pub struct ReadWrite {
    pub val: u64,
    pub buflen: i32,
    pub dictid: u32,
}

impl ReadWrite {
    pub fn is_write(&self) -> bool {
        self.buflen < 0
    }
}

/// Closes the current group and opens the next one.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub sid: u64,
    pub end: i32,
    pub start: i32,
}

#[derive(Debug, Clone)]
pub enum TraceItem {
    AppId(AppId),
    Close(Close),
    Disc(Disc),
    Open(Open),
    ReadU(Read),
    ReadV(Read),
    ReadWrite(ReadWrite),
    Window(Window),
}

fn decode_one(buf: &[u8], offset: usize) -> Result<TraceItem, DecodeError> {
    if buf.len() < TRACE_SIZE {
        return Err(DecodeError::LengthMismatch {
            offset,
            family: "trace",
            expected: TRACE_SIZE,
            actual: buf.len(),
        });
    }
    let tag_byte = buf[0];
    if tag_byte & 0x80 == 0 {
        return Ok(TraceItem::ReadWrite(ReadWrite {
            val: be_i64(buf, 0) as u64,
            buflen: be_i32(buf, 8),
            dictid: be_u32(buf, 12),
        }));
    }
    match tag_byte & 0xf0 {
        tag::OPEN => Ok(TraceItem::Open(Open {
            filesize: be_u56(buf, 1),
            dictid: be_u32(buf, 12),
        })),
        0x90 => {
            let read = Read {
                readid: buf[1],
                count: u16::from_be_bytes([buf[2], buf[3]]),
                buflen: be_i32(buf, 8),
                dictid: be_u32(buf, 12),
            };
            if tag_byte == tag::READU {
                Ok(TraceItem::ReadU(read))
            } else {
                Ok(TraceItem::ReadV(read))
            }
        }
        tag::APPID => Ok(TraceItem::AppId(AppId {
            appid: buf[4..16].to_vec(),
        })),
        tag::CLOSE => {
            let rtot_shift = buf[1];
            let wtot_shift = buf[2];
            let rtot_raw = be_u32(buf, 4) as u64;
            let wtot_raw = be_u32(buf, 8) as u64;
            Ok(TraceItem::Close(Close {
                rtot: rtot_raw << rtot_shift,
                wtot: wtot_raw << wtot_shift,
                dictid: be_u32(buf, 12),
            }))
        }
        tag::DISC => Ok(TraceItem::Disc(Disc {
            flags: DiscFlags::from_bits_truncate(buf[1]),
            buflen: be_i32(buf, 8),
            dictid: be_u32(buf, 12),
        })),
        tag::WINDOW => Ok(TraceItem::Window(Window {
            sid: be_u48(buf, 2) & SID_MASK,
            end: be_i32(buf, 8),
            start: be_i32(buf, 12),
        })),
        other => Err(DecodeError::UnknownTag {
            offset,
            family: "trace",
            tag: other,
        }),
    }
}

/// A decoded Buff (trace) packet body: a flat sequence of fixed 16-byte
/// records, `[Window, (other)*]+`. The first and last records must both be
/// `Window` — see DESIGN.md on trailing/leading structural checks.
#[derive(Debug, Clone)]
pub struct BuffPacket {
    pub records: Vec<TraceItem>,
}

impl BuffPacket {
    pub fn decode(body: &[u8], offset: usize) -> Result<Self, DecodeError> {
        if body.len() % TRACE_SIZE != 0 {
            return Err(DecodeError::LengthMismatch {
                offset,
                family: "trace",
                expected: (body.len() / TRACE_SIZE) * TRACE_SIZE,
                actual: body.len(),
            });
        }
        let mut records = Vec::with_capacity(body.len() / TRACE_SIZE);
        for (i, chunk) in body.chunks_exact(TRACE_SIZE).enumerate() {
            records.push(decode_one(chunk, offset + i * TRACE_SIZE)?);
        }
        match records.first() {
            Some(TraceItem::Window(_)) => {}
            _ => {
                return Err(DecodeError::UnexpectedFirstRecord {
                    offset,
                    family: "trace",
                    expected: "Window",
                })
            }
        }
        match records.last() {
            Some(TraceItem::Window(_)) => {}
            _ => {
                return Err(DecodeError::DanglingRecords {
                    offset,
                    family: "trace",
                    expected: "Window",
                })
            }
        }
        Ok(Self { records })
    }
}
