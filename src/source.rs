// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use bytes::{Bytes, BytesMut};
use tokio::{fs::File, io::AsyncReadExt, net::UdpSocket};

use crate::framer::ByteSource;

/// A monitoring dump captured to disk. Reads are filled in a loop so a
/// short underlying read (common for files on some filesystems) doesn't
/// look like exhaustion prematurely; true EOF is the only thing that
/// produces a short `read()`.
pub struct FileSource {
    inner: File,
}

impl FileSource {
    pub async fn open(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        Ok(Self {
            inner: File::open(path).await?,
        })
    }
}

impl ByteSource for FileSource {
    async fn read(&mut self, n: usize) -> std::io::Result<Bytes> {
        let mut buf = BytesMut::zeroed(n);
        let mut filled = 0;
        while filled < n {
            let read = self.inner.read(&mut buf[filled..]).await?;
            if read == 0 {
                break;
            }
            filled += read;
        }
        buf.truncate(filled);
        Ok(buf.freeze())
    }
}

/// A live `xrd.monitor` UDP stream. Packets are at most 64 KiB; each `recv`
/// yields exactly one datagram.
pub struct UdpSource {
    socket: UdpSocket,
    recv_buf: BytesMut,
}

const UDP_RECV_CAPACITY: usize = 64 * 1024;

impl UdpSource {
    pub async fn bind(addr: impl tokio::net::ToSocketAddrs) -> std::io::Result<Self> {
        Ok(Self {
            socket: UdpSocket::bind(addr).await?,
            recv_buf: BytesMut::new(),
        })
    }
}

impl ByteSource for UdpSource {
    async fn read(&mut self, n: usize) -> std::io::Result<Bytes> {
        if self.recv_buf.len() < n {
            let mut datagram = BytesMut::zeroed(UDP_RECV_CAPACITY);
            let len = self.socket.recv(&mut datagram).await?;
            datagram.truncate(len);
            self.recv_buf.extend_from_slice(&datagram);
        }
        let take = n.min(self.recv_buf.len());
        Ok(self.recv_buf.split_to(take).freeze())
    }
}
