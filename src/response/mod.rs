// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parsing of device introspection responses.
//!
//! Telemetry responses are handled by [`crate::telemetry`]; this module
//! covers the one-shot queries made right after connecting.

mod status;

pub use status::{parse_firmware, parse_outlet_count};
