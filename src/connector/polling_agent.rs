// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Background telemetry polling.

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::protocol::Transport;

use super::device_connector::Inner;

/// Polls a connector on a fixed interval until stopped.
///
/// The first poll happens one interval after spawning. The task only holds
/// a weak reference, so dropping every connector handle ends it as well.
#[derive(Debug)]
pub(crate) struct PollingAgent {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PollingAgent {
    pub(super) fn spawn<T: Transport>(connector: Weak<Inner<T>>, interval: Duration) -> Self {
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

                let Some(inner) = connector.upgrade() else {
                    break;
                };
                inner.tick().await;
            }

            if let Some(inner) = connector.upgrade() {
                tracing::debug!(connector_id = %inner.id(), "Polling agent stopped");
            }
        });

        Self {
            token,
            handle: Some(handle),
        }
    }

    /// Cancels the loop and waits for the task to finish. A poll in flight
    /// completes first.
    pub(crate) async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            tracing::warn!(error = %e, "Polling agent ended abnormally");
        }
    }
}

impl Drop for PollingAgent {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
