// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for connector events.
//!
//! A host framework learns about the device exclusively through callbacks:
//!
//! - telemetry, once per outlet per successful poll, in outlet order
//! - device info (firmware version), once per successful connect
//! - connector state transitions
//!
//! # Usage
//!
//! ```no_run
//! use mpower_lib::{ConnectionConfig, DeviceConnector};
//!
//! # fn example() {
//! let connector = DeviceConnector::ssh(ConnectionConfig::new("192.168.1.20", "ubnt", "ubnt"));
//!
//! let sub_id = connector.on_telemetry(|state| {
//!     println!("outlet {} draws {} W", state.outlet, state.power_watts);
//! });
//!
//! // Later, unsubscribe
//! connector.unsubscribe(sub_id);
//! # }
//! ```

mod callback;

pub use callback::{CallbackRegistry, SubscriptionId};
