// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-outlet telemetry and per-session device description.

use serde::{Deserialize, Serialize};

use crate::types::{OutletIndex, PowerState};

/// Telemetry of one outlet, as read in a single poll.
///
/// Equality is structural: two readings with identical values compare
/// equal, which lets consumers drop redundant updates.
///
/// # Examples
///
/// ```
/// use mpower_lib::state::OutletState;
/// use mpower_lib::types::{OutletIndex, PowerState};
///
/// let state = OutletState {
///     outlet: OutletIndex::one(),
///     power_watts: 12.5,
///     voltage_volts: 230.1,
///     energy_watt_hours: 1500.0,
///     is_on: true,
/// };
/// assert_eq!(state.power_state(), PowerState::On);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutletState {
    /// The outlet this reading belongs to.
    pub outlet: OutletIndex,
    /// Active power in Watts.
    pub power_watts: f64,
    /// RMS voltage in Volts.
    pub voltage_volts: f64,
    /// Accumulated energy in Watt hours.
    pub energy_watt_hours: f64,
    /// Whether the relay is closed.
    pub is_on: bool,
}

impl OutletState {
    /// Returns the relay state.
    #[must_use]
    pub fn power_state(&self) -> PowerState {
        PowerState::from(self.is_on)
    }
}

/// Description of the connected device, fetched once per session.
///
/// `outlet_count` is between 0 and [`OutletIndex::MAX`]. A device reporting
/// more outlets is refused when connecting, since outlets are addressed as
/// [`OutletIndex`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Number of outlets reported by the device.
    pub outlet_count: u8,
    /// Content of the firmware version file.
    pub firmware_version: String,
}

impl DeviceInfo {
    /// Returns true if `outlet` exists on this device.
    #[must_use]
    pub fn has_outlet(&self, outlet: OutletIndex) -> bool {
        outlet.value() <= self.outlet_count
    }
}
