// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connector lifecycle state.

use std::fmt;

/// Lifecycle state of a device connector.
///
/// `Idle → Connecting → Connected → Disconnected`. `Disconnected` is left
/// again by the next `start()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectorState {
    /// Never started.
    Idle,
    /// Session is being opened and the device introspected.
    Connecting,
    /// Session is up and the polling agent runs.
    Connected,
    /// Session is gone, either stopped or lost.
    Disconnected,
}

impl ConnectorState {
    /// Returns true if the device is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns true if `start()` may open a new session from this state.
    #[must_use]
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Disconnected)
    }
}

impl fmt::Display for ConnectorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        };
        f.write_str(name)
    }
}
