// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device and connector state types.
//!
//! - [`OutletState`] is one telemetry reading of one outlet.
//! - [`DeviceInfo`] describes the device behind the current session.
//! - [`ConnectorState`] is the connector lifecycle.
//! - [`OutletTracker`] filters readings down to the ones worth forwarding.

mod connector_state;
mod outlet_state;
mod outlet_tracker;

pub use connector_state::ConnectorState;
pub use outlet_state::{DeviceInfo, OutletState};
pub use outlet_tracker::{OutletTracker, OutletUpdate};
