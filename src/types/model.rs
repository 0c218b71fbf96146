// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device model names.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// An `mPower` model name such as `P3E` or `P6U`.
///
/// The second character encodes the number of outlets. That number is only
/// a hint: the count read from the device after connecting always wins.
///
/// # Examples
///
/// ```
/// use mpower_lib::types::DeviceModel;
///
/// let model: DeviceModel = "P3E".parse().unwrap();
/// assert_eq!(model.outlet_hint(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceModel {
    name: String,
    outlet_hint: u8,
}

impl DeviceModel {
    /// Returns the model name as given.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the outlet count encoded in the name.
    #[must_use]
    pub fn outlet_hint(&self) -> u8 {
        self.outlet_hint
    }
}

impl FromStr for DeviceModel {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let outlet_hint = name
            .chars()
            .nth(1)
            .and_then(|c| c.to_digit(10))
            .and_then(|d| u8::try_from(d).ok())
            .filter(|d| *d > 0)
            .ok_or_else(|| ValueError::InvalidModel(s.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            outlet_hint,
        })
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
