// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote shell access to `mPower` devices.
//!
//! The device is driven entirely through shell commands over SSH. Two traits
//! separate the connector from the SSH implementation:
//!
//! - [`Transport`] opens and authenticates a session
//! - [`ShellSession`] runs one command per exec channel on that session
//!
//! [`RemoteCommandExecutor`] sits on top of a session and guarantees that at
//! most one exec channel is open at a time.
//!
//! # Implementations
//!
//! - [`SshTransport`]: `russh` based client (feature `ssh`, enabled by default)

mod executor;
#[cfg(feature = "ssh")]
mod ssh;

pub use executor::RemoteCommandExecutor;
#[cfg(feature = "ssh")]
pub use ssh::{SshSession, SshTransport};

use std::future::Future;

use crate::config::ConnectionConfig;
use crate::error::TransportError;

/// Output of a remote command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    output: String,
}

impl CommandResponse {
    /// Creates a new command response with the given output.
    #[must_use]
    pub fn new(output: String) -> Self {
        Self { output }
    }

    /// Returns everything the command wrote to stdout.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }
}

/// Opens authenticated sessions to a device.
pub trait Transport: Send + Sync + 'static {
    /// The session type produced by this transport.
    type Session: ShellSession;

    /// Connects and authenticates using `config`.
    ///
    /// The connector bounds this call with the configured connect timeout.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the connection or authentication fails.
    fn connect(
        &self,
        config: &ConnectionConfig,
    ) -> impl Future<Output = Result<Self::Session, TransportError>> + Send;
}

/// An authenticated remote shell session.
pub trait ShellSession: Send + Sync + 'static {
    /// Runs `command` on a fresh exec channel and returns its stdout once
    /// the channel has closed. The channel is closed before returning.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the channel cannot be opened or breaks.
    fn exec(&self, command: &str) -> impl Future<Output = Result<String, TransportError>> + Send;

    /// Returns true while the session is alive.
    fn is_connected(&self) -> bool;

    /// Closes the session. Errors are logged, not returned.
    fn disconnect(&self) -> impl Future<Output = ()> + Send;
}
