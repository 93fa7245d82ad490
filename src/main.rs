// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tokio::net::lookup_host;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use xrootd_monitor::{
    cfg::{cli::Cli, logger::init_logger},
    events::{fstat, redir, trace, Event, EventKind, Selector},
    framer::PacketFramer,
    mapper::StreamMapper,
    reorder::ReorderBuffer,
    source::{FileSource, UdpSource},
    store::{PathAccessInfo, ServerInfo, Store},
};

fn lossy(bytes: &[u8]) -> std::borrow::Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

fn site_id(server: &ServerInfo) -> String {
    format!(
        "{} via {}@{}:{}",
        lossy(&server.site),
        lossy(&server.instance),
        lossy(&server.host),
        server.port
    )
}

fn pretty_user(user: &xrootd_monitor::wire::cgi::UserId) -> String {
    format!(
        "{}@{}({}) [{}]",
        lossy(&user.user),
        lossy(&user.host),
        user.pid,
        lossy(&user.prot)
    )
}

fn pretty_access(access: &PathAccessInfo) -> String {
    match &access.client {
        Some(client) => pretty_user(client),
        None => "<no client>".to_string(),
    }
}

/// Whether `event` should be printed at all. An `Fstat` window carries both
/// open/close/disconnect records and `Transfer` stat-counter records, so it
/// passes if either the `fstat` or `fstats` selector is active; everything
/// else just checks its own single selector.
fn wants_event(cli: &Cli, event: &Event) -> bool {
    match event {
        Event::Fstat(_) => cli.wants(Selector::Fstat) || cli.wants(Selector::Fstats),
        other => cli.wants(other.selector()),
    }
}

/// Renders one [`Event`] as a human-readable block, mirroring
/// `original_source/.../examples/XrdXrootdMon/pretty_print.py`'s
/// `print_server`/`print_redir`/`print_fstat` formatters.
fn print_text(cli: &Cli, event: &Event) {
    match event {
        Event::Server(server) => println!("Server {}", site_id(server)),
        Event::User(user) => println!("User   {} on {}", pretty_user(&user.client), site_id(&user.server)),
        Event::Access(access) => println!(
            "Access {} -> {}",
            pretty_access(access),
            lossy(&access.path)
        ),
        Event::Fstat(window) => {
            println!(
                "FStat: {} [{}-{}]",
                site_id(&window.server),
                window.start,
                window.end
            );
            for (idx, record) in window.records.iter().enumerate() {
                match record {
                    fstat::Record::Disconnect(d) => {
                        println!("  {idx:3}: Disconnect {}", pretty_user(&d.client.client))
                    }
                    fstat::Record::Open(o) => println!(
                        "  {idx:3}: Open       {} {}",
                        lossy(&o.lfn),
                        pretty_access(&o.access)
                    ),
                    fstat::Record::Close(c) => println!(
                        "  {idx:3}: Close      {} {}",
                        lossy(&c.lfn),
                        pretty_access(&c.access)
                    ),
                    fstat::Record::Transfer(t) => {
                        if cli.wants(Selector::Fstats) {
                            println!(
                                "  {idx:3}: Transfer   {} read={} readv={} write={}",
                                lossy(&t.lfn),
                                t.read,
                                t.readv,
                                t.write
                            );
                        }
                    }
                }
            }
        }
        Event::Trace(window) => {
            println!(
                "Trace: {} [{}-{}]",
                site_id(&window.server),
                window.start,
                window.end
            );
            for (idx, record) in window.records.iter().enumerate() {
                match record {
                    trace::Record::Disconnect(d) => {
                        println!("  {idx:3}: Disconnect {}", pretty_user(&d.client.client))
                    }
                    trace::Record::Open(o) => {
                        println!("  {idx:3}: Open       {}", lossy(&o.lfn))
                    }
                    trace::Record::Close(c) => {
                        println!("  {idx:3}: Close      {}", lossy(&c.lfn))
                    }
                    trace::Record::ReadWrite(rw) => println!(
                        "  {idx:3}: ReadWrite  {} read={} write={}",
                        lossy(&rw.lfn),
                        rw.read,
                        rw.write
                    ),
                }
            }
        }
        Event::Redir(window) => {
            println!(
                "Redir: {} [{}-{}]",
                site_id(&window.server),
                window.start,
                window.end
            );
            for (idx, record) in window.records.iter().enumerate() {
                let redir::Record::Redirection(r) = record;
                println!(
                    "  {idx:3}: {:?} {}:{}/{}",
                    r.kind,
                    lossy(&r.target),
                    r.port,
                    lossy(&r.path)
                );
                println!("       {}", pretty_user(&r.client));
            }
        }
        Event::Plugin(plugin) => {
            println!(
                "Plugin: {:?} [{}-{}] ({} lines)",
                plugin.packet.provider,
                plugin.packet.t_beg,
                plugin.packet.t_end,
                plugin.packet.lines.len()
            );
        }
    }
}

/// Renders one [`Event`] as a JSON object for `--json` mode.
fn print_json(event: &Event) {
    let value = match event {
        Event::Server(server) => json!({"kind": "server", "site": site_id(server)}),
        Event::User(user) => json!({
            "kind": "user",
            "user": pretty_user(&user.client),
            "server": site_id(&user.server),
        }),
        Event::Access(access) => json!({
            "kind": "access",
            "client": pretty_access(access),
            "path": lossy(&access.path),
        }),
        Event::Fstat(window) => json!({
            "kind": "fstat",
            "server": site_id(&window.server),
            "start": window.start,
            "end": window.end,
            "records": window.records.len(),
        }),
        Event::Trace(window) => json!({
            "kind": "trace",
            "server": site_id(&window.server),
            "start": window.start,
            "end": window.end,
            "records": window.records.len(),
        }),
        Event::Redir(window) => json!({
            "kind": "redir",
            "server": site_id(&window.server),
            "start": window.start,
            "end": window.end,
            "records": window.records.len(),
        }),
        Event::Plugin(plugin) => json!({
            "kind": "plugin",
            "provider": format!("{:?}", plugin.packet.provider),
            "lines": plugin.packet.lines.len(),
        }),
    };
    println!("{value}");
}

async fn open_source(spec: &str) -> Result<SourceKind> {
    if tokio::fs::metadata(spec).await.is_ok() {
        return Ok(SourceKind::File(FileSource::open(spec).await.with_context(
            || format!("failed to open monitoring dump {spec}"),
        )?));
    }
    let mut addrs = lookup_host(spec)
        .await
        .with_context(|| format!("{spec} is neither a readable file nor a host:port"))?;
    let addr = addrs
        .next()
        .with_context(|| format!("{spec} resolved to no addresses"))?;
    Ok(SourceKind::Udp(
        UdpSource::bind(addr)
            .await
            .with_context(|| format!("failed to bind UDP socket on {addr}"))?,
    ))
}

enum SourceKind {
    File(FileSource),
    Udp(UdpSource),
}

impl xrootd_monitor::framer::ByteSource for SourceKind {
    async fn read(&mut self, n: usize) -> std::io::Result<bytes::Bytes> {
        match self {
            SourceKind::File(s) => s.read(n).await,
            SourceKind::Udp(s) => s.read(n).await,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logger(cli.verbose, cli.json)?;

    let source = open_source(&cli.source).await?;
    let framer = PacketFramer::new(source);
    let mut reorder = ReorderBuffer::new(framer, cli.window);

    let store = Arc::new(Store::new(Duration::from_secs(cli.clean_delay_secs)));
    let mapper = StreamMapper::new(Arc::clone(&store));
    let cancel = CancellationToken::new();
    let evictor = tokio::spawn(xrootd_monitor::store::eviction::run_evictor(
        Arc::clone(&store),
        Duration::from_secs(cli.clean_delay_secs),
        cancel.clone(),
    ));

    let mut packet_count: u64 = 0;
    loop {
        let packet = tokio::select! {
            packet = reorder.next() => packet,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                break;
            }
        };
        let packet = match packet {
            Ok(Some(packet)) => packet,
            Ok(None) => {
                info!("source exhausted");
                break;
            }
            Err(err) => {
                warn!(error = %err, "fatal decode error, stopping");
                cancel.cancel();
                let _ = evictor.await;
                return Err(err).context("packet stream decode failed");
            }
        };
        packet_count += 1;
        if cli.wants(Selector::Packet) {
            println!("Packet {:3} [{:6}]", packet.header.pseq, packet_count);
        }
        for event in mapper.map_packet(&packet) {
            if !wants_event(&cli, &event) {
                continue;
            }
            if cli.json {
                print_json(&event);
            } else {
                print_text(&cli, &event);
            }
        }
    }

    cancel.cancel();
    let _ = evictor.await;
    Ok(())
}
