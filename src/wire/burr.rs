// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::error::DecodeError;

/// Redirect/ServerIdent/WindowMark tag bytes. `REDIRECT`/`REDLOCAL`/`REDSID`
/// all carry the high bit; `REDTIME` does not — this is what lets the
/// decoder tell a `WindowMark` apart from a `Redirect`/`ServerIdent` using
/// only `byte & 0x80`. The exact values are this implementation's own
/// encoding: the retrieved reference sources
/// only cover the stream-layer semantics (`redir.py`), not this wire struct,
/// see DESIGN.md.
pub mod tag {
    pub const REDIRECT: u8 = 0x80;
    pub const REDLOCAL: u8 = 0x90;
    pub const REDSID: u8 = 0xa0;
    pub const REDTIME: u8 = 0x00;
}

/// Identifies the server instance that produced the rest of this packet's
/// redirect records. Always the first record in a Burr packet.
#[derive(Debug, Clone, Copy)]
pub struct ServerIdent {
    pub sid: u64,
}

/// A redirect decision: `kind` distinguishes a cmsd-initiated redirect
/// (`REDIRECT`) from an xrootd-initiated one (`REDLOCAL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirKind {
    Cmsd,
    Xrootd,
}

#[derive(Debug, Clone)]
pub struct Redirect {
    pub kind: RedirKind,
    pub port: u16,
    pub dictid: u32,
    pub target: Vec<u8>,
    pub path: Vec<u8>,
}

/// Closes the current redirect group and opens the next one.
#[derive(Debug, Clone, Copy)]
pub struct WindowMark {
    pub timestamp: i32,
    pub prev_duration: i32,
}

#[derive(Debug, Clone)]
pub enum BurrItem {
    Redirect(Redirect),
    WindowMark(WindowMark),
}

/// A decoded Burr (redirect) packet: the leading `ServerIdent` plus a
/// `[WindowMark, Redirect*]+` sequence. The sequence after `sid` must both
/// start and end with a `WindowMark`.
#[derive(Debug, Clone)]
pub struct BurrRecord {
    pub sid: ServerIdent,
    pub records: Vec<BurrItem>,
}

fn decode_window_mark(buf: &[u8], offset: usize) -> Result<WindowMark, DecodeError> {
    if buf.len() < 12 {
        return Err(DecodeError::LengthMismatch {
            offset,
            family: "burr",
            expected: 12,
            actual: buf.len(),
        });
    }
    Ok(WindowMark {
        timestamp: i32::from_be_bytes(buf[4..8].try_into().expect("checked length")),
        prev_duration: i32::from_be_bytes(buf[8..12].try_into().expect("checked length")),
    })
}

fn decode_server_ident(buf: &[u8], offset: usize) -> Result<ServerIdent, DecodeError> {
    if buf.len() < 8 {
        return Err(DecodeError::LengthMismatch {
            offset,
            family: "burr",
            expected: 8,
            actual: buf.len(),
        });
    }
    Ok(ServerIdent {
        sid: u32::from_be_bytes(buf[4..8].try_into().expect("checked length")) as u64,
    })
}

fn decode_redirect(kind: RedirKind, buf: &[u8], offset: usize) -> Result<(Redirect, usize), DecodeError> {
    if buf.len() < 8 {
        return Err(DecodeError::LengthMismatch {
            offset,
            family: "burr",
            expected: 8,
            actual: buf.len(),
        });
    }
    let port = u16::from_be_bytes([buf[2], buf[3]]);
    let dictid = u32::from_be_bytes(buf[4..8].try_into().expect("checked length"));
    let tail = &buf[8..];
    let target_end = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or(DecodeError::LengthMismatch {
            offset,
            family: "burr",
            expected: tail.len() + 1,
            actual: tail.len(),
        })?;
    let target = tail[..target_end].to_vec();
    let path_buf = &tail[target_end + 1..];
    let path_end = path_buf
        .iter()
        .position(|&b| b == 0)
        .ok_or(DecodeError::LengthMismatch {
            offset,
            family: "burr",
            expected: path_buf.len() + 1,
            actual: path_buf.len(),
        })?;
    let path = path_buf[..path_end].to_vec();
    let consumed = 8 + target_end + 1 + path_end + 1;
    Ok((
        Redirect {
            kind,
            port,
            dictid,
            target,
            path,
        },
        consumed,
    ))
}

impl BurrRecord {
    pub fn decode(body: &[u8], offset: usize) -> Result<Self, DecodeError> {
        if body.is_empty() || body[0] != tag::REDSID {
            return Err(DecodeError::UnexpectedFirstRecord {
                offset,
                family: "burr",
                expected: "ServerIdent",
            });
        }
        let sid = decode_server_ident(body, offset)?;
        let mut pos = 8;
        let mut records = Vec::new();
        while pos < body.len() {
            let rec = &body[pos..];
            let tag_byte = rec[0];
            match tag_byte {
                tag::REDTIME => {
                    let wm = decode_window_mark(rec, offset + pos)?;
                    records.push(BurrItem::WindowMark(wm));
                    pos += 12;
                }
                tag::REDIRECT | tag::REDLOCAL => {
                    let kind = if tag_byte == tag::REDIRECT {
                        RedirKind::Cmsd
                    } else {
                        RedirKind::Xrootd
                    };
                    let (redirect, consumed) = decode_redirect(kind, rec, offset + pos)?;
                    records.push(BurrItem::Redirect(redirect));
                    pos += consumed;
                }
                other => {
                    return Err(DecodeError::UnknownTag {
                        offset: offset + pos,
                        family: "burr",
                        tag: other,
                    })
                }
            }
        }
        match records.first() {
            Some(BurrItem::WindowMark(_)) => {}
            _ => {
                return Err(DecodeError::UnexpectedFirstRecord {
                    offset,
                    family: "burr",
                    expected: "WindowMark",
                })
            }
        }
        match records.last() {
            Some(BurrItem::WindowMark(_)) => {}
            _ => {
                return Err(DecodeError::DanglingRecords {
                    offset,
                    family: "burr",
                    expected: "WindowMark",
                })
            }
        }
        Ok(Self { sid, records })
    }
}
