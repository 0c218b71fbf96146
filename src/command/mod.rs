// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `mPower` shell command definitions.
//!
//! The device exposes its relays and meters as files under `/proc/power`.
//! Every command here renders to a single shell line that is run on its own
//! SSH exec channel.
//!
//! # Available Commands
//!
//! | Command Type | Purpose | Shell line |
//! |-------------|---------|---------|
//! | [`StatusCommand::OutletCount`] | Number of outlets | `cat /etc/board.inc \| grep feature_power` |
//! | [`StatusCommand::Firmware`] | Firmware version | `cat /etc/version` |
//! | [`EnergyCommand::EnableMetering`] | Turn on energy metering | `echo 1 > /proc/power/enabled1;...` |
//! | [`EnergyCommand::Read`] | Read telemetry | `cat /proc/power/active_pwr1 ...` |
//! | [`PowerCommand`] | Switch a relay | `echo 1 > /proc/power/relay2` |
//!
//! # Examples
//!
//! ```
//! use mpower_lib::command::{Command, PowerCommand};
//! use mpower_lib::types::{OutletIndex, PowerState};
//!
//! let cmd = PowerCommand::new(OutletIndex::new(2).unwrap(), PowerState::On);
//! assert_eq!(cmd.to_shell_command(), "echo 1 > /proc/power/relay2");
//! ```

mod energy;
mod power;
mod status;

pub use energy::EnergyCommand;
pub use power::PowerCommand;
pub use status::StatusCommand;

/// Directory holding the relay and meter files.
pub(crate) const PROC_POWER: &str = "/proc/power";

/// A command that can be run on an `mPower` device.
pub trait Command {
    /// Returns a short name used in log lines.
    fn name(&self) -> &'static str;

    /// Returns the full shell line to execute.
    fn to_shell_command(&self) -> String;
}
