// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device introspection commands.

use super::Command;

/// Queries run once per session to describe the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCommand {
    /// Reads the `feature_power` line of the board description.
    OutletCount,
    /// Reads the firmware version file.
    Firmware,
}

impl Command for StatusCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::OutletCount => "outlet-count",
            Self::Firmware => "firmware",
        }
    }

    fn to_shell_command(&self) -> String {
        match self {
            Self::OutletCount => "cat /etc/board.inc | grep feature_power".to_string(),
            Self::Firmware => "cat /etc/version".to_string(),
        }
    }
}
