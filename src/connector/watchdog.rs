// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic reconnection.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::protocol::Transport;

use super::DeviceConnector;

/// Restarts a connector that is no longer running.
///
/// Every interval the watchdog checks [`DeviceConnector::is_running`] and
/// starts it if it is not. The first check happens one interval after
/// spawning, since the owner starts the connector itself. A connector shut
/// down with [`DeviceConnector::stop`] is left alone until it is started
/// again. A configuration error ends the watchdog because retrying cannot
/// fix it.
///
/// # Examples
///
/// ```no_run
/// use mpower_lib::{ConnectionConfig, DeviceConnector, Watchdog};
///
/// #[tokio::main]
/// async fn main() -> mpower_lib::Result<()> {
///     let connector = DeviceConnector::ssh(ConnectionConfig::new("192.168.1.20", "ubnt", "ubnt"));
///     connector.start().await?;
///
///     let watchdog = Watchdog::spawn(connector.clone(), Watchdog::DEFAULT_INTERVAL);
///     // ...
///     watchdog.stop().await;
///     connector.stop().await;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Watchdog {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Watchdog {
    /// Default time between two checks.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

    /// Spawns the watchdog task. A zero `interval` falls back to
    /// [`DEFAULT_INTERVAL`](Self::DEFAULT_INTERVAL).
    #[must_use]
    pub fn spawn<T: Transport>(connector: DeviceConnector<T>, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            Self::DEFAULT_INTERVAL
        } else {
            interval
        };
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    () = cancelled.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                if connector.is_running() || connector.is_stopped() {
                    continue;
                }

                tracing::info!(
                    connector_id = %connector.id(),
                    host = %connector.config().host(),
                    "Connector not running, restarting"
                );
                match connector.restart().await {
                    Ok(state) => {
                        tracing::debug!(connector_id = %connector.id(), %state, "Restart attempt finished");
                    }
                    Err(e) => {
                        tracing::error!(
                            connector_id = %connector.id(),
                            error = %e,
                            "Configuration cannot be used, stopping watchdog"
                        );
                        break;
                    }
                }
            }

            tracing::debug!(connector_id = %connector.id(), "Watchdog stopped");
        });

        Self {
            token,
            handle: Some(handle),
        }
    }

    /// Returns true once the watchdog task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stops the watchdog and waits for its task. A restart in progress
    /// completes first.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            tracing::warn!(error = %e, "Watchdog ended abnormally");
        }
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
