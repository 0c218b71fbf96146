// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serialised command execution on a shell session.

use tokio::sync::Mutex;

use crate::command::Command;
use crate::error::TransportError;
use crate::protocol::{CommandResponse, ShellSession};

/// Runs commands on a session one at a time.
///
/// Some SSH servers on embedded devices reject a second exec channel while
/// one is open, so every caller goes through the same lock. The executor
/// never retries and never looks at what a command means.
///
/// # Examples
///
/// ```ignore
/// let executor = RemoteCommandExecutor::new();
/// let response = executor.send_command(&session, &StatusCommand::Firmware).await?;
/// println!("firmware: {}", response.output().trim());
/// ```
#[derive(Debug, Default)]
pub struct RemoteCommandExecutor {
    channel: Mutex<()>,
}

impl RemoteCommandExecutor {
    /// Creates a new executor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a raw shell line on `session`.
    ///
    /// Waits for any command already running on this executor to finish
    /// first.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::NotConnected` if the session is down, or the
    /// session's error if the exec channel fails.
    pub async fn execute<S: ShellSession>(
        &self,
        session: &S,
        command: &str,
    ) -> Result<CommandResponse, TransportError> {
        let _channel = self.channel.lock().await;

        if !session.is_connected() {
            return Err(TransportError::NotConnected);
        }

        tracing::debug!(command = %command, "Executing remote command");
        let output = session.exec(command).await?;
        tracing::debug!(output = %output.trim_end(), "Remote command finished");

        Ok(CommandResponse::new(output))
    }

    /// Runs a typed command on `session`.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn send_command<S, C>(
        &self,
        session: &S,
        command: &C,
    ) -> Result<CommandResponse, TransportError>
    where
        S: ShellSession,
        C: Command + Sync,
    {
        tracing::trace!(command = command.name(), "Sending command");
        self.execute(session, &command.to_shell_command()).await
    }
}
