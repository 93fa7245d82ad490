// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use bitflags::bitflags;

use crate::error::DecodeError;

/// Mask applied to `FileTOD.sid` / trace `Window.sid`, clearing the high
/// bits the sender reserves for future use so correlation keys agree with
/// the ones `SrvInfo`/`UserId` assign.
pub const SID_MASK: u64 = 0x0000_FFFF_FFFF_FFFF;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileOpnFlags: u8 {
        const HAS_LFN = 0x01;
        const HAS_RW  = 0x02;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileClsFlags: u8 {
        const HAS_OPS = 0x02;
        const HAS_SSQ = 0x04;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileDscFlags: u8 {
        const FORCED = 0x01;
    }
}

fn be_i16(buf: &[u8], off: usize) -> i16 {
    i16::from_be_bytes([buf[off], buf[off + 1]])
}
fn be_i32(buf: &[u8], off: usize) -> i32 {
    i32::from_be_bytes(buf[off..off + 4].try_into().expect("checked length"))
}
fn be_i64(buf: &[u8], off: usize) -> i64 {
    i64::from_be_bytes(buf[off..off + 8].try_into().expect("checked length"))
}
fn be_u32(buf: &[u8], off: usize) -> u32 {
    u32::from_be_bytes(buf[off..off + 4].try_into().expect("checked length"))
}

fn require_len(buf: &[u8], expected: usize, offset: usize) -> Result<(), DecodeError> {
    if buf.len() < expected {
        return Err(DecodeError::LengthMismatch {
            offset,
            family: "fstat",
            expected,
            actual: buf.len(),
        });
    }
    Ok(())
}

/// Opens the packet: server instance, trace window, and record counts.
#[derive(Debug, Clone, Copy)]
pub struct FileTOD {
    pub flags: u8,
    pub records_xfr: i16,
    pub records_total: i16,
    pub start: i32,
    pub end: i32,
    pub sid: u64,
}

impl FileTOD {
    pub const LEN: usize = 24;

    fn decode(buf: &[u8], offset: usize) -> Result<Self, DecodeError> {
        require_len(buf, Self::LEN, offset)?;
        if buf[0] != 2 {
            return Err(DecodeError::UnexpectedFirstRecord {
                offset,
                family: "fstat",
                expected: "FileTOD",
            });
        }
        let sid_raw = be_i64(buf, 16) as u64;
        Ok(Self {
            flags: buf[1],
            records_xfr: be_i16(buf, 4),
            records_total: be_i16(buf, 6),
            start: be_i32(buf, 8),
            end: be_i32(buf, 12),
            sid: sid_raw & SID_MASK,
        })
    }
}

/// A client disconnected.
#[derive(Debug, Clone, Copy)]
pub struct FileDSC {
    pub flags: FileDscFlags,
    pub dictid: u32,
}

impl FileDSC {
    pub const LEN: usize = 8;

    fn decode(buf: &[u8], offset: usize) -> Result<Self, DecodeError> {
        require_len(buf, Self::LEN, offset)?;
        Ok(Self {
            flags: FileDscFlags::from_bits_truncate(buf[1]),
            dictid: be_u32(buf, 4),
        })
    }
}

/// A client opened a file.
#[derive(Debug, Clone)]
pub struct FileOPN {
    pub flags: FileOpnFlags,
    pub fileid: u32,
    pub filesize: i64,
    /// `Some` only when the record carries an inline client reference
    /// (`hasLFN` set and the embedded dictid is non-zero).
    pub user: Option<u32>,
    /// `Some` only when `hasLFN` is set.
    pub lfn: Option<Vec<u8>>,
}

impl FileOPN {
    const STATIC_LEN: usize = 16;

    fn decode(buf: &[u8], offset: usize) -> Result<Self, DecodeError> {
        require_len(buf, Self::STATIC_LEN, offset)?;
        let flags = FileOpnFlags::from_bits_truncate(buf[1]);
        let rec_size = be_i16(buf, 2) as usize;
        let fileid = be_u32(buf, 4);
        let filesize = be_i64(buf, 8);
        let (user, lfn) = if flags.contains(FileOpnFlags::HAS_LFN) {
            require_len(buf, Self::STATIC_LEN + 4, offset)?;
            let raw_user = be_u32(buf, Self::STATIC_LEN);
            require_len(buf, rec_size, offset)?;
            let lfn_bytes = &buf[Self::STATIC_LEN + 4..rec_size];
            let lfn_bytes = lfn_bytes
                .split(|&b| b == 0)
                .next()
                .unwrap_or(lfn_bytes)
                .to_vec();
            // A present-but-zero dictid is normalized to "no user" (see
            // DESIGN.md: Open Question #1).
            let user = if raw_user > 0 { Some(raw_user) } else { None };
            (user, Some(lfn_bytes))
        } else {
            (None, None)
        };
        Ok(Self {
            flags,
            fileid,
            filesize,
            user,
            lfn,
        })
    }
}

/// Per-operation statistics embedded in `FileCLS` when `hasOPS` is set.
#[derive(Debug, Clone, Copy)]
pub struct StatOps {
    pub read: i32,
    pub readv: i32,
    pub write: i32,
    pub rsmin: i16,
    pub rsmax: i16,
    pub rsegs: i64,
    pub rdmin: i32,
    pub rdmax: i32,
    pub rvmin: i32,
    pub rvmax: i32,
    pub wrmin: i32,
    pub wrmax: i32,
}

impl StatOps {
    pub const LEN: usize = 48;

    fn decode(buf: &[u8], offset: usize) -> Result<Self, DecodeError> {
        require_len(buf, Self::LEN, offset)?;
        Ok(Self {
            read: be_i32(buf, 0),
            readv: be_i32(buf, 4),
            write: be_i32(buf, 8),
            rsmin: be_i16(buf, 12),
            rsmax: be_i16(buf, 14),
            rsegs: be_i64(buf, 16),
            rdmin: be_i32(buf, 24),
            rdmax: be_i32(buf, 28),
            rvmin: be_i32(buf, 32),
            rvmax: be_i32(buf, 36),
            wrmin: be_i32(buf, 40),
            wrmax: be_i32(buf, 44),
        })
    }
}

/// Block-size-squared sums embedded in `FileCLS` when `hasSSQ` is set.
#[derive(Debug, Clone, Copy)]
pub struct StatSsq {
    pub read: i64,
    pub readv: i64,
    pub rsegs: i64,
    pub write: i64,
}

impl StatSsq {
    pub const LEN: usize = 32;

    fn decode(buf: &[u8], offset: usize) -> Result<Self, DecodeError> {
        require_len(buf, Self::LEN, offset)?;
        Ok(Self {
            read: be_i64(buf, 0),
            readv: be_i64(buf, 8),
            rsegs: be_i64(buf, 16),
            write: be_i64(buf, 24),
        })
    }
}

/// A client closed a file.
#[derive(Debug, Clone)]
pub struct FileCLS {
    pub fileid: u32,
    pub read: i64,
    pub readv: i64,
    pub write: i64,
    pub ops: Option<StatOps>,
    pub ssq: Option<StatSsq>,
}

impl FileCLS {
    const STATIC_LEN: usize = 32;

    fn decode(buf: &[u8], offset: usize) -> Result<Self, DecodeError> {
        require_len(buf, Self::STATIC_LEN, offset)?;
        let flags = FileClsFlags::from_bits_truncate(buf[1]);
        let fileid = be_u32(buf, 4);
        let read = be_i64(buf, 8);
        let readv = be_i64(buf, 16);
        let write = be_i64(buf, 24);
        let mut tail = &buf[Self::STATIC_LEN..];
        let ops = if flags.contains(FileClsFlags::HAS_OPS) {
            let ops = StatOps::decode(tail, offset)?;
            tail = &tail[StatOps::LEN..];
            Some(ops)
        } else {
            None
        };
        // SSQ is only meaningful alongside OPS (see original's accounting:
        // block-size-squared sums describe the same operations OPS counts).
        let ssq = if flags.contains(FileClsFlags::HAS_SSQ) {
            Some(StatSsq::decode(tail, offset)?)
        } else {
            None
        };
        Ok(Self {
            fileid,
            read,
            readv,
            write,
            ops,
            ssq,
        })
    }
}

/// A client transferred (read/wrote) a file; emitted in addition to `FileCLS`
/// on some servers so periodic transfer totals are visible without closing.
#[derive(Debug, Clone, Copy)]
pub struct FileXFR {
    pub fileid: u32,
    pub read: i64,
    pub readv: i64,
    pub write: i64,
}

impl FileXFR {
    const LEN: usize = 32;

    fn decode(buf: &[u8], offset: usize) -> Result<Self, DecodeError> {
        require_len(buf, Self::LEN, offset)?;
        Ok(Self {
            fileid: be_u32(buf, 4),
            read: be_i64(buf, 8),
            readv: be_i64(buf, 16),
            write: be_i64(buf, 24),
        })
    }
}

#[derive(Debug, Clone)]
pub enum FstatItem {
    Dsc(FileDSC),
    Opn(FileOPN),
    Cls(FileCLS),
    Xfr(FileXFR),
}

/// A decoded Fstat packet: the opening `FileTOD` plus every subsequent
/// record, in wire order.
#[derive(Debug, Clone)]
pub struct FstatPacket {
    pub tod: FileTOD,
    pub records: Vec<FstatItem>,
}

impl FstatPacket {
    pub fn decode(body: &[u8], offset: usize) -> Result<Self, DecodeError> {
        require_len(body, FileTOD::LEN, offset)?;
        let tod = FileTOD::decode(&body[..FileTOD::LEN], offset)?;
        let mut records = Vec::new();
        let mut pos = FileTOD::LEN;
        while pos < body.len() {
            let rec = &body[pos..];
            require_len(rec, 4, offset + pos)?;
            let rec_type = rec[0];
            let rec_size = be_i16(rec, 2) as usize;
            require_len(rec, rec_size, offset + pos)?;
            let rec_bytes = &rec[..rec_size];
            let item = match rec_type {
                0 => FstatItem::Cls(FileCLS::decode(rec_bytes, offset + pos)?),
                1 => FstatItem::Opn(FileOPN::decode(rec_bytes, offset + pos)?),
                3 => FstatItem::Xfr(FileXFR::decode(rec_bytes, offset + pos)?),
                4 => FstatItem::Dsc(FileDSC::decode(rec_bytes, offset + pos)?),
                other => {
                    return Err(DecodeError::UnknownTag {
                        offset: offset + pos,
                        family: "fstat",
                        tag: other,
                    })
                }
            };
            records.push(item);
            pos += rec_size;
        }
        Ok(Self { tod, records })
    }
}
