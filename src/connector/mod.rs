// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device connector and its background tasks.
//!
//! | Type | Role |
//! |------|------|
//! | [`DeviceConnector`] | Session lifecycle, introspection, polling, switching |
//! | [`Watchdog`] | Restarts a connector that stopped running |
//! | [`ConnectorId`] | Identifies a connector in logs |
//!
//! The connector spawns its own polling task on every successful
//! [`start`](DeviceConnector::start) and stops it again on
//! [`stop`](DeviceConnector::stop). The watchdog is optional and owned by
//! the caller.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──start()──► Connecting ──ok──► Connected
//!                        │                 │ session lost / stop()
//!                        └──failure──► Disconnected ◄┘
//!                                          │
//!                                     start() again
//! ```

mod connector_id;
mod device_connector;
mod polling_agent;
mod watchdog;

pub use connector_id::ConnectorId;
pub use device_connector::DeviceConnector;
pub use watchdog::Watchdog;
