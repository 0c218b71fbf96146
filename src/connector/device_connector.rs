// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The device connector state machine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::command::{EnergyCommand, PowerCommand, StatusCommand};
use crate::config::ConnectionConfig;
use crate::error::{ConfigurationError, Error, ParseError, TransportError};
use crate::protocol::{RemoteCommandExecutor, ShellSession, Transport};
use crate::response::{parse_firmware, parse_outlet_count};
use crate::state::{ConnectorState, DeviceInfo, OutletState};
use crate::subscription::{CallbackRegistry, SubscriptionId};
use crate::telemetry::parse_telemetry;
use crate::types::{OutletIndex, PowerState};

use super::ConnectorId;
use super::polling_agent::PollingAgent;

/// Connector for one `mPower` power strip.
///
/// Owns the SSH session, introspects the device once per session, runs the
/// polling agent and switches relays. Cloning is cheap; all clones share the
/// same session and callbacks.
///
/// Transport and parse failures never surface as errors. They are logged,
/// the connector moves to [`ConnectorState::Disconnected`] where relevant,
/// and recovery is left to the next [`start`](Self::start), typically from a
/// [`Watchdog`](super::Watchdog).
///
/// # Examples
///
/// ```no_run
/// use mpower_lib::{ConnectionConfig, DeviceConnector, PowerState};
///
/// #[tokio::main]
/// async fn main() -> mpower_lib::Result<()> {
///     let connector = DeviceConnector::ssh(ConnectionConfig::new("192.168.1.20", "ubnt", "ubnt"));
///
///     connector.on_telemetry(|state| {
///         println!("outlet {}: {} W, {} V", state.outlet, state.power_watts, state.voltage_volts);
///     });
///
///     connector.start().await?;
///     connector.send(2, PowerState::Off).await;
///     connector.stop().await;
///     Ok(())
/// }
/// ```
pub struct DeviceConnector<T: Transport> {
    inner: Arc<Inner<T>>,
}

/// State shared between the connector handles and the polling agent.
pub(super) struct Inner<T: Transport> {
    id: ConnectorId,
    config: ConnectionConfig,
    transport: T,
    callbacks: CallbackRegistry,
    executor: RemoteCommandExecutor,
    state: RwLock<ConnectorState>,
    session: RwLock<Option<Arc<T::Session>>>,
    device_info: RwLock<Option<DeviceInfo>>,
    agent: Mutex<Option<PollingAgent>>,
    /// Set by `stop()`, cleared by `start()`. Recovery leaves such a
    /// connector alone.
    stopped: AtomicBool,
    /// Serialises `start()` and `stop()`.
    lifecycle: tokio::sync::Mutex<()>,
    /// Held for the duration of a poll.
    poll_guard: tokio::sync::Mutex<()>,
}

#[cfg(feature = "ssh")]
impl DeviceConnector<crate::protocol::SshTransport> {
    /// Creates a connector talking SSH to the device.
    #[must_use]
    pub fn ssh(config: ConnectionConfig) -> Self {
        Self::new(crate::protocol::SshTransport::new(), config)
    }
}

impl<T: Transport> DeviceConnector<T> {
    /// Creates an idle connector. Nothing is opened until
    /// [`start`](Self::start).
    #[must_use]
    pub fn new(transport: T, config: ConnectionConfig) -> Self {
        Self::with_id(ConnectorId::new(), transport, config)
    }

    /// Creates an idle connector with a known identifier.
    #[must_use]
    pub fn with_id(id: ConnectorId, transport: T, config: ConnectionConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                id,
                config,
                transport,
                callbacks: CallbackRegistry::new(),
                executor: RemoteCommandExecutor::new(),
                state: RwLock::new(ConnectorState::Idle),
                session: RwLock::new(None),
                device_info: RwLock::new(None),
                agent: Mutex::new(None),
                stopped: AtomicBool::new(false),
                lifecycle: tokio::sync::Mutex::new(()),
                poll_guard: tokio::sync::Mutex::new(()),
            }),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the connector identifier.
    #[must_use]
    pub fn id(&self) -> ConnectorId {
        self.inner.id
    }

    /// Returns the connection configuration.
    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    /// Returns the current state.
    ///
    /// A connector whose session died since the last poll already reports
    /// [`ConnectorState::Disconnected`].
    #[must_use]
    pub fn state(&self) -> ConnectorState {
        self.inner.state()
    }

    /// Returns the outlet count and firmware of the current session.
    #[must_use]
    pub fn device_info(&self) -> Option<DeviceInfo> {
        self.inner.device_info.read().clone()
    }

    /// Returns true while connecting, or while connected with a live session.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    /// Returns true if the connector was stopped with [`stop`](Self::stop)
    /// and not started again since.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Connects to the device and starts polling.
    ///
    /// Does nothing if the connector is already running. Otherwise any
    /// leftover session is dropped, a new one is opened within the
    /// configured connect timeout, the outlet count and firmware are read,
    /// energy metering is enabled on every outlet and the polling agent is
    /// started.
    ///
    /// Returns the state the connector ended up in. A failed connection is
    /// logged and yields [`ConnectorState::Disconnected`]; it is not retried.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is unusable. This
    /// is never fixed by retrying.
    pub async fn start(&self) -> Result<ConnectorState, ConfigurationError> {
        self.launch(true).await
    }

    /// Starts the connector unless it was stopped on purpose. Used by the
    /// watchdog; the check happens under the lifecycle lock so a concurrent
    /// `stop()` always wins.
    pub(super) async fn restart(&self) -> Result<ConnectorState, ConfigurationError> {
        self.launch(false).await
    }

    async fn launch(&self, explicit: bool) -> Result<ConnectorState, ConfigurationError> {
        let inner = &self.inner;
        inner.config.validate()?;

        let _lifecycle = inner.lifecycle.lock().await;
        if explicit {
            inner.stopped.store(false, Ordering::SeqCst);
        } else if inner.stopped.load(Ordering::SeqCst) {
            tracing::debug!(connector_id = %inner.id, "Connector stopped on purpose, not restarting");
            return Ok(inner.state());
        }
        if inner.is_running() {
            tracing::debug!(connector_id = %inner.id, "Connector already running");
            return Ok(inner.state());
        }

        inner.teardown().await;
        inner.set_state(ConnectorState::Connecting);

        match inner.connect().await {
            Ok(info) => {
                tracing::info!(
                    connector_id = %inner.id,
                    host = %inner.config.host(),
                    outlets = info.outlet_count,
                    firmware = %info.firmware_version,
                    "Connected to mPower device"
                );
                let firmware = info.firmware_version.clone();
                *inner.device_info.write() = Some(info);
                inner.callbacks.dispatch_device_info(&firmware);
                inner.set_state(ConnectorState::Connected);

                let agent = PollingAgent::spawn(Arc::downgrade(inner), inner.config.poll_interval());
                *inner.agent.lock() = Some(agent);
            }
            Err(e) => {
                tracing::error!(
                    connector_id = %inner.id,
                    host = %inner.config.host(),
                    error = %e,
                    "Failed to connect to mPower device"
                );
                inner.teardown().await;
                inner.set_state(ConnectorState::Disconnected);
            }
        }

        Ok(inner.state())
    }

    /// Stops polling and closes the session.
    ///
    /// A [`Watchdog`](super::Watchdog) will not restart the connector until
    /// [`start`](Self::start) is called again. Safe to call at any time and
    /// any number of times.
    pub async fn stop(&self) {
        let inner = &self.inner;
        let _lifecycle = inner.lifecycle.lock().await;

        inner.stopped.store(true, Ordering::SeqCst);
        inner.teardown().await;
        if inner.stored_state() != ConnectorState::Idle {
            inner.set_state(ConnectorState::Disconnected);
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Reads telemetry once and dispatches one reading per outlet.
    ///
    /// Does nothing unless the connector is running. Skipped if another poll
    /// is still in flight.
    pub async fn poll(&self) {
        self.inner.poll().await;
    }

    /// Switches the relay of `outlet` (1-based).
    ///
    /// Does nothing unless the connector is running. Outlets the device does
    /// not have are rejected with a warning.
    pub async fn send(&self, outlet: u8, state: PowerState) {
        let inner = &self.inner;
        if !inner.is_running() {
            tracing::debug!(connector_id = %inner.id, outlet, "Not running, ignoring switch command");
            return;
        }

        let Some(outlet_count) = inner.outlet_count() else {
            tracing::warn!(connector_id = %inner.id, outlet, "Outlet count unknown, ignoring switch command");
            return;
        };
        let index = match OutletIndex::new(outlet) {
            Ok(index) if index.value() <= outlet_count => index,
            _ => {
                tracing::warn!(
                    connector_id = %inner.id,
                    outlet,
                    outlet_count,
                    "Outlet out of range, ignoring switch command"
                );
                return;
            }
        };

        let Some(session) = inner.current_session() else {
            return;
        };
        let command = PowerCommand::new(index, state);
        if let Err(e) = inner.executor.send_command(&*session, &command).await {
            tracing::warn!(
                connector_id = %inner.id,
                outlet = %command.outlet(),
                state = %command.state(),
                error = %e,
                "Failed to switch outlet"
            );
        }
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Registers a callback receiving each outlet reading of every
    /// successful poll, in outlet order.
    pub fn on_telemetry<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&OutletState) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_telemetry(callback)
    }

    /// Registers a callback receiving the firmware version after each
    /// successful connect.
    pub fn on_device_info<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_device_info(callback)
    }

    /// Registers a callback receiving every state transition.
    pub fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(ConnectorState) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_state_changed(callback)
    }

    /// Removes a callback. Returns true if it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.callbacks.unsubscribe(id)
    }
}

impl<T: Transport> Clone for DeviceConnector<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> std::fmt::Debug for DeviceConnector<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceConnector")
            .field("id", &self.inner.id)
            .field("host", &self.inner.config.host())
            .field("state", &self.inner.state())
            .field("callbacks", &self.inner.callbacks)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Shared state
// ============================================================================

impl<T: Transport> Inner<T> {
    pub(super) fn id(&self) -> ConnectorId {
        self.id
    }

    fn stored_state(&self) -> ConnectorState {
        *self.state.read()
    }

    fn state(&self) -> ConnectorState {
        let state = self.stored_state();
        if state == ConnectorState::Connected && !self.session_alive() {
            ConnectorState::Disconnected
        } else {
            state
        }
    }

    pub(super) fn is_running(&self) -> bool {
        match self.stored_state() {
            ConnectorState::Connecting => true,
            ConnectorState::Connected => self.session_alive(),
            ConnectorState::Idle | ConnectorState::Disconnected => false,
        }
    }

    fn session_alive(&self) -> bool {
        self.session
            .read()
            .as_ref()
            .is_some_and(|session| session.is_connected())
    }

    fn current_session(&self) -> Option<Arc<T::Session>> {
        self.session.read().clone()
    }

    fn outlet_count(&self) -> Option<u8> {
        self.device_info.read().as_ref().map(|info| info.outlet_count)
    }

    fn take_agent(&self) -> Option<PollingAgent> {
        self.agent.lock().take()
    }

    fn take_session(&self) -> Option<Arc<T::Session>> {
        self.session.write().take()
    }

    fn set_state(&self, new: ConnectorState) {
        let old = std::mem::replace(&mut *self.state.write(), new);
        if old != new {
            tracing::debug!(connector_id = %self.id, from = %old, to = %new, "Connector state changed");
            self.callbacks.dispatch_state_changed(new);
        }
    }

    /// Opens a session and introspects the device, all within the connect
    /// timeout. A session left behind by a timeout is closed by `teardown`.
    async fn connect(&self) -> Result<DeviceInfo, Error> {
        let timeout = self.config.connect_timeout();
        tracing::debug!(
            connector_id = %self.id,
            host = %self.config.host(),
            port = self.config.port(),
            "Connecting"
        );

        tokio::time::timeout(timeout, self.open_and_introspect())
            .await
            .map_err(|_| {
                TransportError::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
            })?
    }

    async fn open_and_introspect(&self) -> Result<DeviceInfo, Error> {
        let session = self.transport.connect(&self.config).await?;
        let session = Arc::new(session);
        *self.session.write() = Some(Arc::clone(&session));

        let response = self
            .executor
            .send_command(&*session, &StatusCommand::OutletCount)
            .await?;
        let outlet_count = parse_outlet_count(response.output())?;
        if outlet_count > OutletIndex::MAX {
            return Err(ParseError::UnexpectedFormat(format!(
                "device reports {outlet_count} outlets, at most {} are supported",
                OutletIndex::MAX
            ))
            .into());
        }

        let response = self
            .executor
            .send_command(&*session, &StatusCommand::Firmware)
            .await?;
        let firmware_version = parse_firmware(response.output());

        if outlet_count > 0 {
            self.executor
                .send_command(&*session, &EnergyCommand::EnableMetering { outlet_count })
                .await?;
        }

        if let Some(model) = self.config.model()
            && model.outlet_hint() != outlet_count
        {
            tracing::warn!(
                connector_id = %self.id,
                model = %model,
                expected = model.outlet_hint(),
                actual = outlet_count,
                "Configured model does not match the device outlet count"
            );
        }

        Ok(DeviceInfo {
            outlet_count,
            firmware_version,
        })
    }

    /// Stops the agent, then closes and forgets the session.
    async fn teardown(&self) {
        if let Some(agent) = self.take_agent() {
            agent.stop().await;
        }

        *self.device_info.write() = None;
        if let Some(session) = self.take_session()
            && session.is_connected()
        {
            session.disconnect().await;
            tracing::info!(
                connector_id = %self.id,
                host = %self.config.host(),
                "Closed session to mPower device"
            );
        }
    }

    pub(super) async fn poll(&self) {
        if !self.is_running() {
            return;
        }
        let Ok(_poll) = self.poll_guard.try_lock() else {
            tracing::debug!(connector_id = %self.id, "Previous poll still running, skipping");
            return;
        };
        let (Some(session), Some(outlet_count)) = (self.current_session(), self.outlet_count())
        else {
            return;
        };
        if outlet_count == 0 {
            return;
        }

        let command = EnergyCommand::Read { outlet_count };
        let response = match self.executor.send_command(&*session, &command).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(connector_id = %self.id, error = %e, "Telemetry read failed");
                return;
            }
        };

        match parse_telemetry(response.output(), outlet_count) {
            Ok(states) => {
                tracing::trace!(connector_id = %self.id, outlets = states.len(), "Telemetry received");
                for state in &states {
                    self.callbacks.dispatch_telemetry(state);
                }
            }
            Err(e) => {
                tracing::warn!(connector_id = %self.id, error = %e, "Discarding malformed telemetry");
            }
        }
    }

    /// Polls if running. A session found dead is reported once as
    /// `Disconnected`; reconnecting is left to `start()`.
    pub(super) async fn tick(&self) {
        if self.is_running() {
            self.poll().await;
        } else if self.stored_state() == ConnectorState::Connected {
            tracing::warn!(
                connector_id = %self.id,
                host = %self.config.host(),
                "Session to mPower device lost"
            );
            self.set_state(ConnectorState::Disconnected);
        }
    }
}
