// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global `tracing` subscriber. Logs always go to stderr —
/// stdout is reserved for decoded event output — at a level derived from
/// `-v` repeats, overridable with `RUST_LOG`.
///
/// No config file — this crate's CLI is flag-only, see DESIGN.md — no
/// distributed span-correlation layer, no log file rotation.
/// `tracing-subscriber`'s built-in JSON formatter covers `--json` output.
pub fn init_logger(verbosity: u8, json: bool) -> Result<WorkerGuard> {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("failed to build log level filter")?;

    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    let builder = fmt::Subscriber::builder()
        .with_writer(writer)
        .with_env_filter(env_filter)
        .with_ansi(false);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(guard)
}
