// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::collections::HashMap;

use crate::error::DecodeError;

/// The plugin that produced a g-stream record, carried in the top byte of
/// the header's provider field. No reference source in `original_source/`
/// covers this family (it postdates that implementation) — values are this
/// crate's own encoding, see DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginProvider {
    Ccm,
    Pfc,
    Tcm,
}

impl PluginProvider {
    fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Self::Ccm),
            2 => Some(Self::Pfc),
            3 => Some(Self::Tcm),
            _ => None,
        }
    }
}

/// One newline-delimited line of a plugin payload, tokenized the same way
/// `AuthInfo` is (`k=v&k=v`) since the wire format gives no other structure
/// to go on for this family.
#[derive(Debug, Clone)]
pub struct PluginLine {
    pub fields: HashMap<Vec<u8>, Vec<u8>>,
}

fn decode_line(buf: &[u8], offset: usize) -> Result<PluginLine, DecodeError> {
    let cgi = crate::wire::cgi::parse_cgi(buf, offset)?;
    Ok(PluginLine {
        fields: cgi
            .into_iter()
            .map(|(k, v)| (k.to_vec(), v.to_vec()))
            .collect(),
    })
}

/// A decoded Plugin (g-stream) packet: a time window, the originating
/// plugin, and its newline-delimited lines.
#[derive(Debug, Clone)]
pub struct PluginPacket {
    pub t_beg: i32,
    pub t_end: i32,
    pub provider: PluginProvider,
    pub lines: Vec<PluginLine>,
}

impl PluginPacket {
    const STATIC_LEN: usize = 16;

    pub fn decode(body: &[u8], offset: usize) -> Result<Self, DecodeError> {
        if body.len() < Self::STATIC_LEN {
            return Err(DecodeError::LengthMismatch {
                offset,
                family: "plugin",
                expected: Self::STATIC_LEN,
                actual: body.len(),
            });
        }
        let t_beg = i32::from_be_bytes(body[0..4].try_into().expect("checked length"));
        let t_end = i32::from_be_bytes(body[4..8].try_into().expect("checked length"));
        let provider_id = u64::from_be_bytes(body[8..16].try_into().expect("checked length"));
        let provider_byte = ((provider_id >> 56) & 0xff) as u8;
        let provider = PluginProvider::from_u8(provider_byte).ok_or(DecodeError::UnknownTag {
            offset,
            family: "plugin",
            tag: provider_byte,
        })?;
        let text = &body[Self::STATIC_LEN..];
        let text = text.split(|&b| b == 0).next().unwrap_or(text);
        let lines = text
            .split(|&b| b == b'\n')
            .filter(|line| !line.is_empty())
            .map(|line| decode_line(line, offset + Self::STATIC_LEN))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            t_beg,
            t_end,
            provider,
            lines,
        })
    }
}
