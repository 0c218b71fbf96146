// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `mPower` library.
//!
//! Operational failures (a dead SSH session, a garbled poll response) are
//! absorbed by the connector and only logged. Configuration problems are the
//! one class of error that crosses the public boundary, because retrying
//! cannot fix them.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking to the device.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Error occurred while parsing a device response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The connector configuration is unusable.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// An invalid power state string was provided.
    #[error("invalid power state: {0}")]
    InvalidPowerState(String),

    /// A model name does not follow the `P<digit>...` pattern.
    #[error("invalid device model: {0}")]
    InvalidModel(String),
}

/// Errors related to the SSH session and its exec channels.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The SSH layer reported an error.
    #[cfg(feature = "ssh")]
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// No session exists or the session has been closed.
    #[error("session is not connected")]
    NotConnected,

    /// The TCP connection or SSH handshake failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The device rejected the credentials.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Connecting took longer than the configured timeout.
    #[error("connect timed out after {0} ms")]
    Timeout(u64),

    /// An exec channel could not be opened or broke mid-command.
    #[error("channel failed: {0}")]
    ChannelFailed(String),
}

/// Errors related to parsing device responses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The telemetry response does not carry four lines per outlet.
    #[error("expected {expected} telemetry lines, got {actual}")]
    LineCount {
        /// Number of lines required for the outlet count.
        expected: usize,
        /// Number of lines received.
        actual: usize,
    },

    /// Failed to parse a specific value.
    #[error("failed to parse {field} of outlet {outlet}: {value:?}")]
    InvalidValue {
        /// The outlet the line belongs to.
        outlet: u8,
        /// The field that failed to parse.
        field: &'static str,
        /// The offending text.
        value: String,
    },

    /// Unexpected response format.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// Errors in the connector configuration. These are never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// No host was configured.
    #[error("host is required")]
    MissingHost,

    /// Username or password is blank.
    #[error("username and password are required")]
    MissingCredentials,

    /// The poll interval must be greater than zero.
    #[error("poll interval must be greater than zero")]
    InvalidPollInterval,

    /// The configuration document could not be read.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
