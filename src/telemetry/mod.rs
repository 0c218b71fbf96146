// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telemetry response parsing.
//!
//! A telemetry poll reads four files per outlet, so the response is a plain
//! list of lines grouped by four, outlets in ascending order:
//!
//! ```text
//! <active power W>
//! <rms voltage V>
//! <energy Wh>
//! <relay flag>
//! ...repeated for every outlet
//! ```
//!
//! # Examples
//!
//! ```
//! use mpower_lib::telemetry::parse_telemetry;
//!
//! let states = parse_telemetry("10.0\n120.0\n500.0\n1\n0.0\n119.8\n100.0\n0", 2).unwrap();
//! assert_eq!(states.len(), 2);
//! assert!(states[0].is_on);
//! assert!(!states[1].is_on);
//! ```

mod field;

use crate::error::ParseError;
use crate::state::OutletState;
use crate::types::OutletIndex;

/// Number of response lines per outlet.
pub const LINES_PER_OUTLET: usize = 4;

/// Parses a telemetry response for a device with `outlet_count` outlets.
///
/// Blank or whitespace-only responses mean "no data" and yield an empty
/// list. Trailing blank lines are ignored.
///
/// # Errors
///
/// Returns `ParseError::LineCount` if the response does not carry exactly
/// four lines per outlet, and `ParseError::InvalidValue` if a line cannot
/// be decoded. No partial result is returned.
pub fn parse_telemetry(response: &str, outlet_count: u8) -> Result<Vec<OutletState>, ParseError> {
    if response.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut lines: Vec<&str> = response.split('\n').map(str::trim).collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    let expected = usize::from(outlet_count) * LINES_PER_OUTLET;
    if lines.len() != expected {
        return Err(ParseError::LineCount {
            expected,
            actual: lines.len(),
        });
    }

    lines
        .chunks_exact(LINES_PER_OUTLET)
        .zip(OutletIndex::range(outlet_count))
        .map(|(group, outlet)| parse_outlet(outlet, group))
        .collect()
}

fn parse_outlet(outlet: OutletIndex, group: &[&str]) -> Result<OutletState, ParseError> {
    let [power, voltage, energy, relay] = group else {
        return Err(ParseError::UnexpectedFormat(format!(
            "outlet {outlet} has {} lines",
            group.len()
        )));
    };

    Ok(OutletState {
        outlet,
        power_watts: field::decimal(outlet, "power", power)?,
        voltage_volts: field::decimal(outlet, "voltage", voltage)?,
        energy_watt_hours: field::decimal(outlet, "energy", energy)?,
        is_on: field::flag(outlet, "relay", relay)?,
    })
}
