// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Energy metering commands.

use std::fmt::Write as _;

use super::{Command, PROC_POWER};
use crate::types::OutletIndex;

/// Files read per outlet, in the order the telemetry parser expects them.
const TELEMETRY_FILES: [&str; 4] = ["active_pwr", "v_rms", "energy_sum", "relay"];

/// Energy metering commands covering every outlet of the device.
///
/// # Examples
///
/// ```
/// use mpower_lib::command::{Command, EnergyCommand};
///
/// let enable = EnergyCommand::EnableMetering { outlet_count: 2 };
/// assert_eq!(
///     enable.to_shell_command(),
///     "echo 1 > /proc/power/enabled1;echo 1 > /proc/power/enabled2;"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyCommand {
    /// Switch on the energy meter of every outlet.
    EnableMetering {
        /// Number of outlets on the device.
        outlet_count: u8,
    },
    /// Read power, voltage, energy and relay state of every outlet.
    ///
    /// The response carries four lines per outlet, outlets in ascending
    /// order.
    Read {
        /// Number of outlets on the device.
        outlet_count: u8,
    },
}

impl Command for EnergyCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::EnableMetering { .. } => "enable-metering",
            Self::Read { .. } => "telemetry",
        }
    }

    fn to_shell_command(&self) -> String {
        let mut line = String::new();
        match self {
            Self::EnableMetering { outlet_count } => {
                for outlet in OutletIndex::range(*outlet_count) {
                    let _ = write!(line, "echo 1 > {PROC_POWER}/enabled{outlet};");
                }
            }
            // A bare `cat` would block on stdin.
            Self::Read { outlet_count: 0 } => line.push_str("cat /dev/null"),
            Self::Read { outlet_count } => {
                line.push_str("cat");
                for outlet in OutletIndex::range(*outlet_count) {
                    for file in TELEMETRY_FILES {
                        let _ = write!(line, " {PROC_POWER}/{file}{outlet}");
                    }
                }
            }
        }
        line
    }
}
