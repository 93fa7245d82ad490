// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Background eviction. The Python `MapInfoStoreCleaner` this is modeled on
//! runs as a dedicated thread waking up every `clean_delay` to drain a
//! swapped-out deletion queue. Here the queue lives inside [`Store`] itself,
//! so the task only has to tick the clock.

use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::Store;

/// Runs until `cancel` fires, calling [`Store::evict_ready`] once per
/// `interval`. Intended to be spawned with `tokio::spawn` alongside the
/// packet pipeline and stopped by cancelling the same token the main loop
/// shuts down on, the same `CancellationToken`-gated shutdown idiom used by
/// every other background task in this crate.
pub async fn run_evictor(store: Arc<Store>, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                store.evict_ready(std::time::Instant::now());
                debug!("ran deferred-deletion sweep");
            }
            _ = cancel.cancelled() => {
                debug!("evictor cancelled");
                return;
            }
        }
    }
}
