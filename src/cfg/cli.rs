// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use clap::Parser;

use crate::events::Selector;

/// Decodes and correlates an `xrd.monitor` detailed monitoring stream.
///
/// Grounded on `examples/ThomasHabets-rustradio/examples/tone.rs`'s
/// `#[derive(clap::Parser)]` idiom and
/// `original_source/.../examples/XrdXrootdMon/pretty_print.py`'s argparse
/// CLI shape (`SOURCE` positional, repeatable stream selectors).
#[derive(Debug, Parser)]
#[command(name = "xrdmon-pp", version, about)]
pub struct Cli {
    /// Either a path to a captured dump, or `host:port` to listen on UDP.
    pub source: String,

    /// Which event kinds to print. Repeatable; defaults to everything.
    #[arg(long = "select", value_enum)]
    pub select: Vec<Selector>,

    /// Print events as newline-delimited JSON instead of human-readable text.
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity; repeatable (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Packet reordering window size. Must be in `1..128`.
    #[arg(long, default_value_t = 8)]
    pub window: usize,

    /// Seconds a correlation entry is kept after it's freed, before
    /// eviction.
    #[arg(long = "clean-delay", default_value_t = 30)]
    pub clean_delay_secs: u64,
}

impl Cli {
    /// Whether `selector` should be printed — an empty `--select` list
    /// means "everything".
    pub fn wants(&self, selector: Selector) -> bool {
        self.select.is_empty() || self.select.contains(&selector)
    }
}
