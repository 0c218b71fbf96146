// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Relay switching.

use super::{Command, PROC_POWER};
use crate::types::{OutletIndex, PowerState};

/// Command to switch the relay of one outlet.
///
/// # Examples
///
/// ```
/// use mpower_lib::command::{Command, PowerCommand};
/// use mpower_lib::types::{OutletIndex, PowerState};
///
/// let off = PowerCommand::new(OutletIndex::new(3).unwrap(), PowerState::Off);
/// assert_eq!(off.to_shell_command(), "echo 0 > /proc/power/relay3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerCommand {
    outlet: OutletIndex,
    state: PowerState,
}

impl PowerCommand {
    /// Creates a command setting `outlet` to `state`.
    #[must_use]
    pub const fn new(outlet: OutletIndex, state: PowerState) -> Self {
        Self { outlet, state }
    }

    /// Returns the targeted outlet.
    #[must_use]
    pub const fn outlet(&self) -> OutletIndex {
        self.outlet
    }

    /// Returns the requested state.
    #[must_use]
    pub const fn state(&self) -> PowerState {
        self.state
    }
}

impl Command for PowerCommand {
    fn name(&self) -> &'static str {
        "relay"
    }

    fn to_shell_command(&self) -> String {
        format!(
            "echo {} > {PROC_POWER}/relay{}",
            self.state.as_num(),
            self.outlet
        )
    }
}
