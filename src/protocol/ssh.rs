// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! SSH transport based on `russh`.

use std::sync::Arc;

use async_trait::async_trait;
use russh::client::{self, Handle};
use russh::{ChannelMsg, Disconnect};
use russh_keys::key::PublicKey;

use crate::config::ConnectionConfig;
use crate::error::TransportError;
use crate::protocol::{ShellSession, Transport};

/// Client handler accepting the device host key.
///
/// `mPower` devices generate their host key on first boot and are usually
/// reached by IP address, so there is nothing to pin the key against.
#[derive(Debug)]
pub struct DeviceHandler;

#[async_trait]
impl client::Handler for DeviceHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        tracing::debug!(
            fingerprint = %server_public_key.fingerprint(),
            "Accepting device host key"
        );
        Ok(true)
    }
}

/// Opens password-authenticated SSH sessions.
///
/// # Examples
///
/// ```no_run
/// use mpower_lib::protocol::{ShellSession, SshTransport, Transport};
/// use mpower_lib::ConnectionConfig;
///
/// # async fn example() -> mpower_lib::Result<()> {
/// let config = ConnectionConfig::new("192.168.1.20", "ubnt", "ubnt");
/// let session = SshTransport::new().connect(&config).await?;
/// println!("{}", session.exec("cat /etc/version").await?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SshTransport;

impl SshTransport {
    /// Creates a new SSH transport.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn client_config(config: &ConnectionConfig) -> client::Config {
        client::Config {
            inactivity_timeout: None,
            keepalive_interval: Some(config.keepalive_interval()),
            keepalive_max: config.keepalive_max(),
            ..Default::default()
        }
    }
}

impl Transport for SshTransport {
    type Session = SshSession;

    async fn connect(&self, config: &ConnectionConfig) -> Result<SshSession, TransportError> {
        let ssh_config = Arc::new(Self::client_config(config));
        let address = (config.host().to_string(), config.port());

        tracing::debug!(host = %config.host(), port = config.port(), "Opening SSH session");

        let mut handle = client::connect(ssh_config, address, DeviceHandler)
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        let authenticated = handle
            .authenticate_password(config.username(), config.password())
            .await?;
        if !authenticated {
            let _ = handle
                .disconnect(Disconnect::ByApplication, "authentication failed", "en")
                .await;
            return Err(TransportError::AuthenticationFailed);
        }

        Ok(SshSession { handle })
    }
}

/// An authenticated SSH session to an `mPower` device.
pub struct SshSession {
    handle: Handle<DeviceHandler>,
}

impl ShellSession for SshSession {
    async fn exec(&self, command: &str) -> Result<String, TransportError> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| TransportError::ChannelFailed(e.to_string()))?;
        channel.exec(true, command).await?;

        let mut output = Vec::new();
        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => output.extend_from_slice(data),
                ChannelMsg::ExitStatus { exit_status } if exit_status != 0 => {
                    tracing::debug!(exit_status, "Remote command exited with failure");
                }
                ChannelMsg::Close => break,
                _ => {}
            }
        }
        // The server may already have closed its side.
        let _ = channel.close().await;

        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    fn is_connected(&self) -> bool {
        !self.handle.is_closed()
    }

    async fn disconnect(&self) {
        if let Err(e) = self
            .handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
        {
            tracing::debug!(error = %e, "SSH disconnect failed");
        }
    }
}

impl std::fmt::Debug for SshSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshSession")
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}
