// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outlet count and firmware responses.

use crate::error::ParseError;

/// Extracts the outlet count from the `feature_power` line of
/// `/etc/board.inc`.
///
/// The value sits after the last `=` and before the last `;`, e.g.
/// `$feature_power=3;`.
///
/// # Errors
///
/// Returns `ParseError::UnexpectedFormat` if no integer can be found.
///
/// # Examples
///
/// ```
/// use mpower_lib::response::parse_outlet_count;
///
/// assert_eq!(parse_outlet_count("$feature_power=6;\n").unwrap(), 6);
/// assert!(parse_outlet_count("").is_err());
/// ```
pub fn parse_outlet_count(output: &str) -> Result<u8, ParseError> {
    let after_eq = output
        .rfind('=')
        .map(|pos| &output[pos + 1..])
        .ok_or_else(|| ParseError::UnexpectedFormat(format!("no outlet count in {output:?}")))?;
    let value = after_eq
        .rfind(';')
        .map_or(after_eq, |pos| &after_eq[..pos])
        .trim();

    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::UnexpectedFormat(format!(
            "outlet count is not a number: {value:?}"
        )));
    }

    value
        .parse()
        .map_err(|_| ParseError::UnexpectedFormat(format!("outlet count out of range: {value}")))
}

/// Normalises the content of `/etc/version`.
///
/// # Examples
///
/// ```
/// use mpower_lib::response::parse_firmware;
///
/// assert_eq!(parse_firmware("MF.v2.1.11\n"), "MF.v2.1.11");
/// ```
#[must_use]
pub fn parse_firmware(output: &str) -> String {
    output.trim().to_string()
}
