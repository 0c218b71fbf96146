// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoding of single telemetry lines.

use crate::error::ParseError;
use crate::types::{OutletIndex, PowerState};

/// Decodes a decimal reading. Non-finite values are rejected.
pub(super) fn decimal(
    outlet: OutletIndex,
    field: &'static str,
    line: &str,
) -> Result<f64, ParseError> {
    line.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| invalid(outlet, field, line))
}

/// Decodes the relay flag. Any truthy value means ON.
pub(super) fn flag(outlet: OutletIndex, field: &'static str, line: &str) -> Result<bool, ParseError> {
    if let Ok(state) = line.parse::<PowerState>() {
        return Ok(state.is_on());
    }
    match line.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value != 0.0),
        _ => Err(invalid(outlet, field, line)),
    }
}

fn invalid(outlet: OutletIndex, field: &'static str, line: &str) -> ParseError {
    ParseError::InvalidValue {
        outlet: outlet.value(),
        field,
        value: line.to_string(),
    }
}
