// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use enum_dispatch::enum_dispatch;

use crate::{
    error::DecodeError,
    wire::cgi::{parse_cgi, UserId},
};

fn cgi_field<'a>(
    map: &std::collections::HashMap<&'a [u8], &'a [u8]>,
    key: &'static str,
    offset: usize,
) -> Result<&'a [u8], DecodeError> {
    map.get(key.as_bytes())
        .copied()
        .ok_or(DecodeError::MalformedCgi { offset })
}

fn parse_ascii_i64(buf: &[u8], offset: usize) -> Result<i64, DecodeError> {
    std::str::from_utf8(buf)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(DecodeError::MalformedCgi { offset })
}

fn parse_ascii_u16(buf: &[u8], offset: usize) -> Result<u16, DecodeError> {
    std::str::from_utf8(buf)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(DecodeError::MalformedCgi { offset })
}

/// `*/srvinfo`: identity of the xrootd instance sending reports.
#[derive(Debug, Clone)]
pub struct SrvInfo {
    pub pgm: Vec<u8>,
    pub ver: Vec<u8>,
    pub inst: Vec<u8>,
    pub port: u16,
    pub site: Vec<u8>,
}

impl SrvInfo {
    fn decode(buf: &[u8], offset: usize) -> Result<Self, DecodeError> {
        let cgi = parse_cgi(buf, offset)?;
        Ok(Self {
            pgm: cgi_field(&cgi, "pgm", offset)?.to_vec(),
            ver: cgi_field(&cgi, "ver", offset)?.to_vec(),
            inst: cgi_field(&cgi, "inst", offset)?.to_vec(),
            port: parse_ascii_u16(cgi_field(&cgi, "port", offset)?, offset)?,
            site: cgi_field(&cgi, "site", offset)?.to_vec(),
        })
    }
}

/// `*/path`: full path name of a file being opened.
#[derive(Debug, Clone)]
pub struct Path {
    pub path: Vec<u8>,
}

/// `*/appinfo`: un-interpreted application-supplied information.
#[derive(Debug, Clone)]
pub struct AppInfo {
    pub appinfo: Vec<u8>,
}

/// `*/prginfo`: description of the purging of a file.
#[derive(Debug, Clone)]
pub struct PrgInfo {
    pub xfn: Vec<u8>,
    pub tod: i64,
    pub sz: i64,
    pub at: i64,
    pub ct: i64,
    pub mt: i64,
    pub fname: Vec<u8>,
}

impl PrgInfo {
    fn decode(buf: &[u8], offset: usize) -> Result<Self, DecodeError> {
        let pos = buf
            .iter()
            .position(|&b| b == b'\n')
            .ok_or(DecodeError::MalformedCgi { offset })?;
        let xfn = buf[..pos].to_vec();
        let cgi = parse_cgi(&buf[pos + 1..], offset)?;
        Ok(Self {
            xfn,
            tod: parse_ascii_i64(cgi_field(&cgi, "tod", offset)?, offset)?,
            sz: parse_ascii_i64(cgi_field(&cgi, "sz", offset)?, offset)?,
            at: parse_ascii_i64(cgi_field(&cgi, "at", offset)?, offset)?,
            ct: parse_ascii_i64(cgi_field(&cgi, "ct", offset)?, offset)?,
            mt: parse_ascii_i64(cgi_field(&cgi, "mt", offset)?, offset)?,
            fname: cgi_field(&cgi, "fn", offset)?.to_vec(),
        })
    }
}

/// `*/xfrinfo`: description of the transfer of a file.
#[derive(Debug, Clone)]
pub struct XfrInfo {
    pub lfn: Vec<u8>,
    pub tod: i64,
    pub sz: i64,
    pub tm: i64,
    pub op: Vec<u8>,
    pub rc: i64,
    pub pd: Option<Vec<u8>>,
}

impl XfrInfo {
    fn decode(buf: &[u8], offset: usize) -> Result<Self, DecodeError> {
        let pos = buf
            .iter()
            .position(|&b| b == b'\n')
            .ok_or(DecodeError::MalformedCgi { offset })?;
        let lfn = buf[..pos].to_vec();
        let cgi = parse_cgi(&buf[pos + 1..], offset)?;
        Ok(Self {
            lfn,
            tod: parse_ascii_i64(cgi_field(&cgi, "tod", offset)?, offset)?,
            sz: parse_ascii_i64(cgi_field(&cgi, "sz", offset)?, offset)?,
            tm: parse_ascii_i64(cgi_field(&cgi, "tm", offset)?, offset)?,
            op: cgi_field(&cgi, "op", offset)?.to_vec(),
            rc: parse_ascii_i64(cgi_field(&cgi, "rc", offset)?, offset)?,
            pd: cgi.get(b"pd".as_slice()).map(|v| v.to_vec()),
        })
    }
}

/// `*/authinfo`: describes the authentication state of a user. Every field
/// is optional — the sender only emits the ones a given security protocol
/// populated.
#[derive(Debug, Clone, Default)]
pub struct AuthInfo {
    pub p: Option<Vec<u8>>,
    pub n: Option<Vec<u8>>,
    pub h: Option<Vec<u8>>,
    pub o: Option<Vec<u8>>,
    pub r: Option<Vec<u8>>,
    pub g: Option<Vec<u8>>,
    pub m: Option<Vec<u8>>,
    pub x: Option<Vec<u8>>,
    pub y: Option<Vec<u8>>,
}

impl AuthInfo {
    fn decode(buf: &[u8], offset: usize) -> Result<Self, DecodeError> {
        let cgi = parse_cgi(buf, offset)?;
        let get = |key: &str| cgi.get(key.as_bytes()).map(|v| v.to_vec());
        Ok(Self {
            p: get("p"),
            n: get("n"),
            h: get("h"),
            o: get("o"),
            r: get("r"),
            g: get("g"),
            m: get("m"),
            x: get("x"),
            y: get("y"),
        })
    }
}

#[enum_dispatch]
pub trait MapPayloadKind {
    /// Short tag for logging/printing, e.g. `"srvinfo"`.
    fn kind_name(&self) -> &'static str;
}

impl MapPayloadKind for SrvInfo {
    fn kind_name(&self) -> &'static str {
        "srvinfo"
    }
}
impl MapPayloadKind for Path {
    fn kind_name(&self) -> &'static str {
        "path"
    }
}
impl MapPayloadKind for AppInfo {
    fn kind_name(&self) -> &'static str {
        "appinfo"
    }
}
impl MapPayloadKind for PrgInfo {
    fn kind_name(&self) -> &'static str {
        "prginfo"
    }
}
impl MapPayloadKind for AuthInfo {
    fn kind_name(&self) -> &'static str {
        "authinfo"
    }
}
impl MapPayloadKind for XfrInfo {
    fn kind_name(&self) -> &'static str {
        "xfrinfo"
    }
}

#[enum_dispatch(MapPayloadKind)]
#[derive(Debug, Clone)]
pub enum MapPayload {
    SrvInfo(SrvInfo),
    Path(Path),
    AppInfo(AppInfo),
    PrgInfo(PrgInfo),
    AuthInfo(AuthInfo),
    XfrInfo(XfrInfo),
}

/// A fully decoded Map record: `dictid`, the client's [`UserId`], and the
/// family-specific payload selected by the record code.
#[derive(Debug, Clone)]
pub struct MapRecord {
    pub dictid: u32,
    pub userid: UserId,
    pub payload: MapPayload,
}

impl MapRecord {
    pub fn decode(code: u8, body: &[u8], offset: usize) -> Result<Self, DecodeError> {
        if body.len() < 4 {
            return Err(DecodeError::LengthMismatch {
                offset,
                family: "map",
                expected: 4,
                actual: body.len(),
            });
        }
        let dictid = u32::from_be_bytes(body[0..4].try_into().expect("checked length"));
        let rest = &body[4..];
        let pos = rest
            .iter()
            .position(|&b| b == b'\n')
            .ok_or(DecodeError::MalformedUserId { offset })?;
        let userid = UserId::parse(&rest[..pos], offset)?;
        let payload_buf = &rest[pos + 1..];
        let payload = match code {
            b'=' => MapPayload::SrvInfo(SrvInfo::decode(payload_buf, offset)?),
            b'd' => MapPayload::Path(Path {
                path: payload_buf.to_vec(),
            }),
            b'i' => MapPayload::AppInfo(AppInfo {
                appinfo: payload_buf.to_vec(),
            }),
            b'p' => MapPayload::PrgInfo(PrgInfo::decode(payload_buf, offset)?),
            b'u' => MapPayload::AuthInfo(AuthInfo::decode(payload_buf, offset)?),
            b'x' => MapPayload::XfrInfo(XfrInfo::decode(payload_buf, offset)?),
            other => return Err(DecodeError::UnknownRecordCode { offset, code: other }),
        };
        Ok(Self {
            dictid,
            userid,
            payload,
        })
    }
}
