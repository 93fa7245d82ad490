// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::collections::HashMap;

use crate::error::DecodeError;

/// Parses a `&key=value&key=value` CGI-style payload into raw byte slices.
///
/// A leading `&` is tolerated and stripped, matching the sender's habit of
/// prefixing every CGI blob with it. Keys without a following `=value` are
/// rejected; values are not percent-decoded (none of the fields we consume
/// need it).
pub fn parse_cgi(data: &[u8], offset: usize) -> Result<HashMap<&[u8], &[u8]>, DecodeError> {
    let mut map = HashMap::new();
    let data = data.strip_prefix(b"&").unwrap_or(data);
    if data.is_empty() {
        return Ok(map);
    }
    for kv in data.split(|&b| b == b'&') {
        if kv.is_empty() {
            continue;
        }
        let mut parts = kv.splitn(2, |&b| b == b'=');
        let key = parts.next().ok_or(DecodeError::MalformedCgi { offset })?;
        let value = parts.next().ok_or(DecodeError::MalformedCgi { offset })?;
        map.insert(key, value);
    }
    Ok(map)
}

/// Splits `buf` at the last occurrence of `sep`, the byte before it excluded.
fn rsplit_once(buf: &[u8], sep: u8) -> Option<(&[u8], &[u8])> {
    let pos = buf.iter().rposition(|&b| b == sep)?;
    Some((&buf[..pos], &buf[pos + 1..]))
}

fn parse_ascii_u32(buf: &[u8], offset: usize) -> Result<u32, DecodeError> {
    std::str::from_utf8(buf)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(DecodeError::MalformedUserId { offset })
}

/// The client identity string embedded in every Map record:
/// `protocol/user.pid:sid@host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId {
    pub prot: Vec<u8>,
    pub user: Vec<u8>,
    pub pid: u32,
    pub sid: u64,
    pub host: Vec<u8>,
}

impl UserId {
    /// Parses `protocol/user.pid:sid@host`, splitting from the right so
    /// that a `user` name containing `/` or `.` does not confuse the split.
    pub fn parse(buf: &[u8], offset: usize) -> Result<Self, DecodeError> {
        let err = || DecodeError::MalformedUserId { offset };
        let (rest, host) = rsplit_once(buf, b'@').ok_or_else(err)?;
        let (rest, sid) = rsplit_once(rest, b':').ok_or_else(err)?;
        let (rest, pid) = rsplit_once(rest, b'.').ok_or_else(err)?;
        let (prot, user) = rsplit_once(rest, b'/').ok_or_else(err)?;
        Ok(Self {
            prot: prot.to_vec(),
            user: user.to_vec(),
            pid: parse_ascii_u32(pid, offset)?,
            sid: u64::from(parse_ascii_u32(sid, offset)?),
            host: host.to_vec(),
        })
    }
}
