// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connector configuration.
//!
//! [`ConnectionConfig`] is what the connector runs on. [`DeviceConfig`] is
//! the loosely typed form a host framework stores for a device; it converts
//! into a validated [`ConnectionConfig`].

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigurationError;
use crate::types::DeviceModel;

// ============================================================================
// ConnectionConfig
// ============================================================================

/// Connection parameters of one `mPower` device.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use mpower_lib::ConnectionConfig;
///
/// let config = ConnectionConfig::new("192.168.1.20", "ubnt", "ubnt")
///     .with_poll_interval(Duration::from_secs(5))
///     .with_connect_timeout(Duration::from_secs(3));
///
/// assert_eq!(config.port(), 22);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct ConnectionConfig {
    host: String,
    port: u16,
    username: String,
    password: String,
    poll_interval: Duration,
    connect_timeout: Duration,
    keepalive_interval: Duration,
    keepalive_max: usize,
    model: Option<DeviceModel>,
}

impl ConnectionConfig {
    /// Default SSH port.
    pub const DEFAULT_PORT: u16 = 22;
    /// Default interval between telemetry polls.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
    /// Default time allowed to open and authenticate a session.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
    /// Default interval between keep-alive probes.
    pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(60);
    /// Default number of unanswered keep-alives before the session is dead.
    pub const DEFAULT_KEEPALIVE_MAX: usize = 10;

    /// Creates a configuration with default timings.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            username: username.into(),
            password: password.into(),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            keepalive_interval: Self::DEFAULT_KEEPALIVE_INTERVAL,
            keepalive_max: Self::DEFAULT_KEEPALIVE_MAX,
            model: None,
        }
    }

    /// Sets a custom SSH port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the telemetry poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the keep-alive probing.
    #[must_use]
    pub fn with_keepalive(mut self, interval: Duration, max_missed: usize) -> Self {
        self.keepalive_interval = interval;
        self.keepalive_max = max_missed;
        self
    }

    /// Sets the model the device is expected to be.
    #[must_use]
    pub fn with_model(mut self, model: DeviceModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the keep-alive interval.
    #[must_use]
    pub fn keepalive_interval(&self) -> Duration {
        self.keepalive_interval
    }

    /// Returns how many keep-alives may go unanswered.
    #[must_use]
    pub fn keepalive_max(&self) -> usize {
        self.keepalive_max
    }

    /// Returns the expected model, if configured.
    #[must_use]
    pub fn model(&self) -> Option<&DeviceModel> {
        self.model.as_ref()
    }

    /// Checks that the configuration can be used to connect.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` for a blank host, blank credentials or a
    /// zero poll interval.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.host.trim().is_empty() {
            return Err(ConfigurationError::MissingHost);
        }
        if self.username.trim().is_empty() || self.password.trim().is_empty() {
            return Err(ConfigurationError::MissingCredentials);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigurationError::InvalidPollInterval);
        }
        Ok(())
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("poll_interval", &self.poll_interval)
            .field("connect_timeout", &self.connect_timeout)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// DeviceConfig
// ============================================================================

/// Device configuration as stored by a host framework.
///
/// Field names and units follow the framework properties: `refresh` is in
/// milliseconds and a zero or missing value falls back to the default poll
/// interval.
///
/// # Examples
///
/// ```
/// use mpower_lib::DeviceConfig;
///
/// let config = DeviceConfig::from_json(
///     r#"{"host":"192.168.1.20","username":"ubnt","password":"secret","refresh":5000}"#,
/// )
/// .unwrap();
///
/// let connection = config.into_connection_config().unwrap();
/// assert_eq!(connection.poll_interval().as_secs(), 5);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Hostname or IP address.
    pub host: String,
    /// SSH port, 22 if absent.
    pub port: Option<u16>,
    /// SSH user.
    pub username: String,
    /// SSH password.
    pub password: String,
    /// Poll interval in milliseconds.
    pub refresh: u64,
    /// Model name such as `P3E`.
    pub model: Option<String>,
}

impl DeviceConfig {
    /// Reads a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::Invalid` if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(json).map_err(|e| ConfigurationError::Invalid(e.to_string()))
    }

    /// Validates and converts into a [`ConnectionConfig`].
    ///
    /// An unparseable model name is ignored, because the model only ever
    /// serves as a hint.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if host or credentials are missing.
    pub fn into_connection_config(self) -> Result<ConnectionConfig, ConfigurationError> {
        let mut config = ConnectionConfig::new(self.host, self.username, self.password);
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if self.refresh > 0 {
            config = config.with_poll_interval(Duration::from_millis(self.refresh));
        }
        if let Some(model) = self.model.as_deref() {
            match model.parse::<DeviceModel>() {
                Ok(model) => config = config.with_model(model),
                Err(e) => tracing::debug!(error = %e, "Ignoring model hint"),
            }
        }
        config.validate()?;
        Ok(config)
    }
}
