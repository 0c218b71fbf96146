// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for connector events.
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry storing and dispatching callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::state::{ConnectorState, OutletState};

/// Unique identifier for a subscription.
///
/// Returned when registering a callback and used to unsubscribe later.
/// IDs are unique within a connector's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a new subscription ID with the given value.
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Type alias for telemetry callbacks.
type TelemetryCallback = Arc<dyn Fn(&OutletState) + Send + Sync>;

/// Type alias for device info callbacks (receives the firmware version).
type DeviceInfoCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Type alias for connector state callbacks.
type StateChangedCallback = Arc<dyn Fn(ConnectorState) + Send + Sync>;

/// Registry for connector callbacks.
///
/// Thread-safe through `parking_lot::RwLock`. Callbacks are cloned out of
/// the lock before being invoked, so a callback may itself subscribe or
/// unsubscribe.
pub struct CallbackRegistry {
    /// Counter for generating unique subscription IDs.
    next_id: AtomicU64,
    /// Per-outlet telemetry callbacks.
    telemetry_callbacks: RwLock<HashMap<SubscriptionId, TelemetryCallback>>,
    /// Firmware callbacks, fired once per successful connect.
    device_info_callbacks: RwLock<HashMap<SubscriptionId, DeviceInfoCallback>>,
    /// Lifecycle callbacks.
    state_changed_callbacks: RwLock<HashMap<SubscriptionId, StateChangedCallback>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            telemetry_callbacks: RwLock::new(HashMap::new()),
            device_info_callbacks: RwLock::new(HashMap::new()),
            state_changed_callbacks: RwLock::new(HashMap::new()),
        }
    }

    /// Generates a new unique subscription ID.
    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration methods
    // =========================================================================

    /// Registers a callback receiving each outlet reading.
    pub fn on_telemetry<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&OutletState) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.telemetry_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback receiving the firmware version after connecting.
    pub fn on_device_info<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.device_info_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback receiving every connector state transition.
    pub fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(ConnectorState) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.state_changed_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    // =========================================================================
    // Unsubscription
    // =========================================================================

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.telemetry_callbacks.write().remove(&id).is_some()
            || self.device_info_callbacks.write().remove(&id).is_some()
            || self.state_changed_callbacks.write().remove(&id).is_some()
    }

    /// Clears all callbacks.
    pub fn clear(&self) {
        self.telemetry_callbacks.write().clear();
        self.device_info_callbacks.write().clear();
        self.state_changed_callbacks.write().clear();
    }

    // =========================================================================
    // Dispatch methods
    // =========================================================================

    /// Dispatches one outlet reading.
    pub fn dispatch_telemetry(&self, state: &OutletState) {
        let callbacks: Vec<_> = self.telemetry_callbacks.read().values().cloned().collect();
        for callback in callbacks {
            callback(state);
        }
    }

    /// Dispatches the firmware version.
    pub fn dispatch_device_info(&self, firmware: &str) {
        let callbacks: Vec<_> = self
            .device_info_callbacks
            .read()
            .values()
            .cloned()
            .collect();
        for callback in callbacks {
            callback(firmware);
        }
    }

    /// Dispatches a connector state transition.
    pub fn dispatch_state_changed(&self, state: ConnectorState) {
        let callbacks: Vec<_> = self
            .state_changed_callbacks
            .read()
            .values()
            .cloned()
            .collect();
        for callback in callbacks {
            callback(state);
        }
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.telemetry_callbacks.read().len()
            + self.device_info_callbacks.read().len()
            + self.state_changed_callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}
