// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `mPower` Lib - A Rust library to monitor and switch Ubiquiti `mPower`
//! power strips.
//!
//! `mPower` devices expose their relays and energy meters as files under
//! `/proc/power`. This library logs in over SSH, reads those files on a fixed
//! interval and writes to them to switch outlets.
//!
//! # Supported Features
//!
//! - **Telemetry**: active power, RMS voltage, accumulated energy and relay
//!   state for every outlet, delivered through callbacks
//! - **Power control**: switch a single outlet on or off
//! - **Introspection**: outlet count and firmware version, read once per
//!   session
//! - **Recovery**: an optional watchdog restarting lost connections
//!
//! # Supported Models
//!
//! Any `mPower` variant with one to eight outlets (`P1E`, `P3E`, `P6E`, `P8U`,
//! ...). The outlet count is always read from the device.
//!
//! # Quick Start
//!
//! ```no_run
//! use mpower_lib::{ConnectionConfig, DeviceConnector, PowerState, Watchdog};
//!
//! #[tokio::main]
//! async fn main() -> mpower_lib::Result<()> {
//!     let config = ConnectionConfig::new("192.168.1.20", "ubnt", "ubnt")
//!         .with_poll_interval(std::time::Duration::from_secs(5));
//!     let connector = DeviceConnector::ssh(config);
//!
//!     connector.on_device_info(|firmware| println!("firmware {firmware}"));
//!     connector.on_telemetry(|state| {
//!         println!(
//!             "outlet {}: {} W, {} V, {} Wh, {}",
//!             state.outlet,
//!             state.power_watts,
//!             state.voltage_volts,
//!             state.energy_watt_hours,
//!             state.power_state()
//!         );
//!     });
//!
//!     connector.start().await?;
//!     let watchdog = Watchdog::spawn(connector.clone(), Watchdog::DEFAULT_INTERVAL);
//!
//!     connector.send(1, PowerState::On).await;
//!
//!     watchdog.stop().await;
//!     connector.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration from a host framework
//!
//! ```
//! use mpower_lib::DeviceConfig;
//!
//! let config = DeviceConfig::from_json(
//!     r#"{"host":"192.168.1.20","username":"ubnt","password":"ubnt","refresh":10000,"model":"P6E"}"#,
//! )?
//! .into_connection_config()?;
//!
//! assert_eq!(config.model().map(|m| m.outlet_hint()), Some(6));
//! # Ok::<(), mpower_lib::ConfigurationError>(())
//! ```

pub mod command;
pub mod config;
pub mod connector;
pub mod error;
pub mod protocol;
pub mod response;
pub mod state;
pub mod subscription;
pub mod telemetry;
pub mod types;

pub use command::{Command, EnergyCommand, PowerCommand, StatusCommand};
pub use config::{ConnectionConfig, DeviceConfig};
pub use connector::{ConnectorId, DeviceConnector, Watchdog};
pub use error::{ConfigurationError, Error, ParseError, Result, TransportError, ValueError};
#[cfg(feature = "ssh")]
pub use protocol::SshTransport;
pub use protocol::{ShellSession, Transport};
pub use state::{ConnectorState, DeviceInfo, OutletState, OutletTracker, OutletUpdate};
pub use subscription::{CallbackRegistry, SubscriptionId};
pub use telemetry::parse_telemetry;
pub use types::{DeviceModel, OutletIndex, PowerState};
