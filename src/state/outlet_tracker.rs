// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rate-limited forwarding of outlet readings.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use super::OutletState;
use crate::types::OutletIndex;

/// A reading that passed the tracker, stamped with the time it was accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct OutletUpdate {
    /// The accepted reading.
    pub state: OutletState,
    /// When the reading was accepted.
    pub last_update: DateTime<Utc>,
}

/// Decides which readings are worth forwarding to channel consumers.
///
/// The connector reports every outlet on every poll. Most of these readings
/// are identical to the previous ones, so a reading is only forwarded when
/// it differs from the last forwarded reading of that outlet *and* the
/// refresh interval has passed since that outlet was last updated.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use mpower_lib::state::{OutletState, OutletTracker};
/// use mpower_lib::types::OutletIndex;
///
/// let mut tracker = OutletTracker::new(Duration::from_secs(10));
/// let reading = OutletState {
///     outlet: OutletIndex::one(),
///     power_watts: 3.2,
///     voltage_volts: 229.8,
///     energy_watt_hours: 12.0,
///     is_on: true,
/// };
///
/// assert!(tracker.apply(reading.clone()).is_some());
/// // Same reading again: nothing to forward.
/// assert!(tracker.apply(reading).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct OutletTracker {
    refresh: TimeDelta,
    outlets: HashMap<OutletIndex, OutletUpdate>,
}

impl OutletTracker {
    /// Creates a tracker that forwards at most one update per outlet per
    /// `refresh`.
    #[must_use]
    pub fn new(refresh: Duration) -> Self {
        Self {
            refresh: TimeDelta::from_std(refresh).unwrap_or(TimeDelta::MAX),
            outlets: HashMap::new(),
        }
    }

    /// Applies a reading taken now. See [`apply_at`](Self::apply_at).
    pub fn apply(&mut self, state: OutletState) -> Option<OutletUpdate> {
        self.apply_at(state, Utc::now())
    }

    /// Applies a reading taken at `now`.
    ///
    /// Returns the update to forward, or `None` if the reading is redundant
    /// or arrived too soon after the previous update.
    pub fn apply_at(&mut self, state: OutletState, now: DateTime<Utc>) -> Option<OutletUpdate> {
        if let Some(previous) = self.outlets.get(&state.outlet) {
            let elapsed = now.signed_duration_since(previous.last_update);
            if elapsed <= self.refresh || previous.state == state {
                return None;
            }
        }

        let update = OutletUpdate {
            state,
            last_update: now,
        };
        self.outlets.insert(update.state.outlet, update.clone());
        Some(update)
    }

    /// Returns the last forwarded update of `outlet`.
    #[must_use]
    pub fn last(&self, outlet: OutletIndex) -> Option<&OutletUpdate> {
        self.outlets.get(&outlet)
    }

    /// Forgets every outlet, e.g. after the device was replaced.
    pub fn clear(&mut self) {
        self.outlets.clear();
    }
}
