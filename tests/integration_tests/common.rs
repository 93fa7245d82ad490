// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Byte-fixture builders and an in-memory [`ByteSource`] shared by the
//! end-to-end scenario tests. Centralizes config loading and connection
//! setup for every scenario file the way a dedicated integration-test
//! harness file would; here there is no live target to connect to, so this
//! centralizes wire-byte construction instead.

use std::collections::VecDeque;

use bytes::Bytes;
use xrootd_monitor::{
    framer::ByteSource,
    wire::{fstat::FileTOD, HEADER_LEN},
};

/// Feeds pre-built packet bytes to a [`xrootd_monitor::framer::PacketFramer`]
/// from an in-memory queue, one chunk per `read` call boundary crossed.
pub struct MemorySource {
    chunks: VecDeque<Bytes>,
}

impl MemorySource {
    pub fn new(packets: Vec<Vec<u8>>) -> Self {
        Self {
            chunks: packets.into_iter().map(Bytes::from).collect(),
        }
    }
}

impl ByteSource for MemorySource {
    async fn read(&mut self, n: usize) -> std::io::Result<Bytes> {
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            match self.chunks.front_mut() {
                Some(chunk) => {
                    let take = (n - out.len()).min(chunk.len());
                    out.extend_from_slice(&chunk[..take]);
                    *chunk = chunk.slice(take..);
                    if chunk.is_empty() {
                        self.chunks.pop_front();
                    }
                }
                None => break,
            }
        }
        Ok(Bytes::from(out))
    }
}

/// Wraps a decoded record `body` in the shared 8-byte header: `code`,
/// `pseq`, `plen` (header included), `stod`.
pub fn packet(code: u8, pseq: u8, stod: i32, body: &[u8]) -> Vec<u8> {
    let plen = (HEADER_LEN + body.len()) as u16;
    let mut out = vec![code, pseq];
    out.extend_from_slice(&plen.to_be_bytes());
    out.extend_from_slice(&stod.to_be_bytes());
    out.extend_from_slice(body);
    out
}

/// `dictid` + `protocol/user.pid:sid@host` + CGI payload, the shape every
/// Map record body shares (`wire::map::MapRecord::decode`).
pub fn map_body(dictid: u32, sid: u64, payload: &[u8]) -> Vec<u8> {
    let mut body = dictid.to_be_bytes().to_vec();
    body.extend_from_slice(format!("xrootd/alice.1.1:{sid}@host.example.org").as_bytes());
    body.push(b'\n');
    body.extend_from_slice(payload);
    body
}

pub fn srvinfo_payload(port: u16) -> Vec<u8> {
    format!("pgm=xrootd&ver=5.6.0&inst=prod&port={port}&site=T2_DE").into_bytes()
}

pub fn authinfo_payload() -> &'static [u8] {
    b"p=krb5"
}

pub fn path_payload(path: &str) -> Vec<u8> {
    path.as_bytes().to_vec()
}

/// `FileTOD` bytes (`wire::fstat::FileTOD`), the mandatory first record of
/// every Fstat packet.
pub fn file_tod(sid: u64, start: i32, end: i32) -> Vec<u8> {
    assert_eq!(FileTOD::LEN, 24);
    let mut b = vec![2u8, 0, 0, 0, 0, 1, 0, 0];
    b.extend_from_slice(&start.to_be_bytes());
    b.extend_from_slice(&end.to_be_bytes());
    b.extend_from_slice(&(sid as i64).to_be_bytes());
    b
}

/// `FileOPN` without an inline LFN (static 16-byte form).
pub fn file_opn(fileid: u32, filesize: i64) -> Vec<u8> {
    let mut b = vec![1u8, 0, 0, 16];
    b.extend_from_slice(&fileid.to_be_bytes());
    b.extend_from_slice(&filesize.to_be_bytes());
    b
}

/// `FileOPN` with `hasLFN` set: static 16 bytes, then a 4-byte inline
/// dictid (0 means "no user"), then the nul-terminated LFN.
pub fn file_opn_lfn(fileid: u32, filesize: i64, user: u32, lfn: &str) -> Vec<u8> {
    let mut lfn_bytes = lfn.as_bytes().to_vec();
    lfn_bytes.push(0);
    let rec_size = 16 + 4 + lfn_bytes.len();
    let mut b = vec![1u8, 0x01];
    b.extend_from_slice(&(rec_size as i16).to_be_bytes());
    b.extend_from_slice(&fileid.to_be_bytes());
    b.extend_from_slice(&filesize.to_be_bytes());
    b.extend_from_slice(&user.to_be_bytes());
    b.extend_from_slice(&lfn_bytes);
    b
}

/// `FileCLS` without `OPS`/`SSQ` (static 32-byte form).
pub fn file_cls(fileid: u32, read: i64, readv: i64, write: i64) -> Vec<u8> {
    let mut b = vec![0u8, 0, 0, 32];
    b.extend_from_slice(&fileid.to_be_bytes());
    b.extend_from_slice(&read.to_be_bytes());
    b.extend_from_slice(&readv.to_be_bytes());
    b.extend_from_slice(&write.to_be_bytes());
    b
}

pub mod burr {
    use xrootd_monitor::wire::burr::tag;

    pub fn server_ident(sid: u32) -> Vec<u8> {
        let mut b = vec![tag::REDSID, 0, 0, 0];
        b.extend_from_slice(&sid.to_be_bytes());
        b
    }

    pub fn window_mark(timestamp: i32, prev_duration: i32) -> Vec<u8> {
        let mut b = vec![tag::REDTIME, 0, 0, 0];
        b.extend_from_slice(&timestamp.to_be_bytes());
        b.extend_from_slice(&prev_duration.to_be_bytes());
        b
    }

    pub fn redirect(port: u16, dictid: u32, target: &str, path: &str) -> Vec<u8> {
        let mut b = vec![tag::REDIRECT, 0];
        b.extend_from_slice(&port.to_be_bytes());
        b.extend_from_slice(&dictid.to_be_bytes());
        b.extend_from_slice(target.as_bytes());
        b.push(0);
        b.extend_from_slice(path.as_bytes());
        b.push(0);
        b
    }
}

pub mod buff {
    use xrootd_monitor::wire::buff::tag;

    pub fn window(sid: u64, end: i32, start: i32) -> [u8; 16] {
        let mut b = [0u8; 16];
        b[0] = tag::WINDOW;
        b[2..8].copy_from_slice(&sid.to_be_bytes()[2..8]);
        b[8..12].copy_from_slice(&end.to_be_bytes());
        b[12..16].copy_from_slice(&start.to_be_bytes());
        b
    }

    pub fn open(dictid: u32, filesize: u64) -> [u8; 16] {
        let mut b = [0u8; 16];
        b[0] = tag::OPEN;
        b[1..8].copy_from_slice(&filesize.to_be_bytes()[1..8]);
        b[12..16].copy_from_slice(&dictid.to_be_bytes());
        b
    }

    pub fn read_write(buflen: i32, dictid: u32) -> [u8; 16] {
        let mut b = [0u8; 16];
        b[0..8].copy_from_slice(&(buflen.unsigned_abs() as i64).to_be_bytes());
        b[8..12].copy_from_slice(&buflen.to_be_bytes());
        b[12..16].copy_from_slice(&dictid.to_be_bytes());
        b
    }

    pub fn close(dictid: u32, rtot: u32, wtot: u32) -> [u8; 16] {
        let mut b = [0u8; 16];
        b[0] = tag::CLOSE;
        b[4..8].copy_from_slice(&rtot.to_be_bytes());
        b[8..12].copy_from_slice(&wtot.to_be_bytes());
        b[12..16].copy_from_slice(&dictid.to_be_bytes());
        b
    }
}

/// Minimal Plugin (g-stream) packet body: static header, no lines. Used by
/// the reorder scenario, where only `pseq` ordering matters.
pub fn plugin_body() -> Vec<u8> {
    let mut body = 1i32.to_be_bytes().to_vec();
    body.extend_from_slice(&2i32.to_be_bytes());
    body.extend_from_slice(&(1u64 << 56).to_be_bytes());
    body
}
