// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for `mPower` device control.
//!
//! Each type ensures values are within their valid ranges at construction
//! time.
//!
//! # Types
//!
//! - [`PowerState`] - On/Off relay state
//! - [`OutletIndex`] - 1-based outlet index (1-8)
//! - [`DeviceModel`] - Model name carrying an outlet count hint

mod model;
mod power;

pub use model::DeviceModel;
pub use power::{OutletIndex, PowerState};
