// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the device connector using a scripted in-memory
//! device.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use mpower_lib::types::OutletIndex;
use mpower_lib::{
    ConfigurationError, ConnectionConfig, ConnectorState, DeviceConnector, OutletState,
    OutletTracker, PowerState, ShellSession, Transport, TransportError, Watchdog,
};

// ============================================================================
// Fake device
// ============================================================================

const FIRMWARE: &str = "MF.v2.1.11-mpower.160108.1022";
const TWO_OUTLET_TELEMETRY: &str = "10.0\n120.0\n500.0\n1\n0.0\n119.8\n100.0\n0\n";

/// A scripted `mPower` answering the shell lines the connector sends.
struct FakeDevice {
    board: Mutex<String>,
    telemetry: Mutex<String>,
    exec_delay: Mutex<Duration>,
    commands: Mutex<Vec<String>>,
    alive: AtomicBool,
    refuse_connect: AtomicBool,
    hang_connect: AtomicBool,
    connects: AtomicUsize,
    open_channels: AtomicUsize,
    max_open_channels: AtomicUsize,
}

impl FakeDevice {
    fn with_outlets(outlets: u8, telemetry: &str) -> Arc<Self> {
        Arc::new(Self {
            board: Mutex::new(format!("$feature_power={outlets};\n")),
            telemetry: Mutex::new(telemetry.to_string()),
            exec_delay: Mutex::new(Duration::ZERO),
            commands: Mutex::new(Vec::new()),
            alive: AtomicBool::new(false),
            refuse_connect: AtomicBool::new(false),
            hang_connect: AtomicBool::new(false),
            connects: AtomicUsize::new(0),
            open_channels: AtomicUsize::new(0),
            max_open_channels: AtomicUsize::new(0),
        })
    }

    fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }

    fn count_commands(&self, prefix: &str) -> usize {
        self.commands
            .lock()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn drop_session(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    fn answer(&self, command: &str) -> String {
        if command.starts_with("cat /etc/board.inc") {
            self.board.lock().clone()
        } else if command == "cat /etc/version" {
            format!("{FIRMWARE}\n")
        } else if command.starts_with("cat /proc/power/") {
            self.telemetry.lock().clone()
        } else {
            String::new()
        }
    }
}

struct FakeTransport {
    device: Arc<FakeDevice>,
}

struct FakeSession {
    device: Arc<FakeDevice>,
}

impl Transport for FakeTransport {
    type Session = FakeSession;

    async fn connect(&self, _config: &ConnectionConfig) -> Result<FakeSession, TransportError> {
        if self.device.hang_connect.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.device.refuse_connect.load(Ordering::SeqCst) {
            return Err(TransportError::ConnectionFailed(
                "connection refused".to_string(),
            ));
        }
        self.device.connects.fetch_add(1, Ordering::SeqCst);
        self.device.alive.store(true, Ordering::SeqCst);
        Ok(FakeSession {
            device: Arc::clone(&self.device),
        })
    }
}

impl ShellSession for FakeSession {
    async fn exec(&self, command: &str) -> Result<String, TransportError> {
        let device = &self.device;
        device.commands.lock().push(command.to_string());

        let open = device.open_channels.fetch_add(1, Ordering::SeqCst) + 1;
        device.max_open_channels.fetch_max(open, Ordering::SeqCst);
        let delay = *device.exec_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        device.open_channels.fetch_sub(1, Ordering::SeqCst);

        Ok(device.answer(command))
    }

    fn is_connected(&self) -> bool {
        self.device.alive.load(Ordering::SeqCst)
    }

    async fn disconnect(&self) {
        self.device.alive.store(false, Ordering::SeqCst);
    }
}

fn config() -> ConnectionConfig {
    ConnectionConfig::new("192.168.1.20", "ubnt", "ubnt")
        .with_poll_interval(Duration::from_secs(3600))
}

fn connector(device: &Arc<FakeDevice>, config: ConnectionConfig) -> DeviceConnector<FakeTransport> {
    DeviceConnector::new(
        FakeTransport {
            device: Arc::clone(device),
        },
        config,
    )
}

fn collect_telemetry(connector: &DeviceConnector<FakeTransport>) -> Arc<Mutex<Vec<OutletState>>> {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    connector.on_telemetry(move |state| sink.lock().push(state.clone()));
    received
}

fn collect_states(connector: &DeviceConnector<FakeTransport>) -> Arc<Mutex<Vec<ConnectorState>>> {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    connector.on_state_changed(move |state| sink.lock().push(state));
    received
}

fn outlet(index: u8, power: f64, voltage: f64, energy: f64, is_on: bool) -> OutletState {
    OutletState {
        outlet: OutletIndex::new(index).unwrap(),
        power_watts: power,
        voltage_volts: voltage,
        energy_watt_hours: energy,
        is_on,
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn start_introspects_device() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, config());
        let firmware = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&firmware);
        connector.on_device_info(move |version| sink.lock().push(version.to_string()));
        let states = collect_states(&connector);

        let state = connector.start().await.unwrap();

        assert_eq!(state, ConnectorState::Connected);
        assert!(connector.is_running());
        assert_eq!(*firmware.lock(), vec![FIRMWARE.to_string()]);
        assert_eq!(
            *states.lock(),
            vec![ConnectorState::Connecting, ConnectorState::Connected]
        );

        let info = connector.device_info().unwrap();
        assert_eq!(info.outlet_count, 2);
        assert_eq!(info.firmware_version, FIRMWARE);

        assert_eq!(
            device.commands(),
            vec![
                "cat /etc/board.inc | grep feature_power".to_string(),
                "cat /etc/version".to_string(),
                "echo 1 > /proc/power/enabled1;echo 1 > /proc/power/enabled2;".to_string(),
            ]
        );

        connector.stop().await;
    }

    #[tokio::test]
    async fn start_on_running_connector_is_noop() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, config());

        connector.start().await.unwrap();
        let state = connector.start().await.unwrap();

        assert_eq!(state, ConnectorState::Connected);
        assert_eq!(device.connects.load(Ordering::SeqCst), 1);
        connector.stop().await;
    }

    #[tokio::test]
    async fn stop_then_start_refetches_outlet_count() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, config());

        connector.start().await.unwrap();
        connector.stop().await;

        assert!(!connector.is_running());
        assert_eq!(connector.state(), ConnectorState::Disconnected);
        assert!(connector.device_info().is_none());
        assert!(!device.alive.load(Ordering::SeqCst));

        *device.board.lock() = "$feature_power=3;\n".to_string();
        let state = connector.start().await.unwrap();

        assert_eq!(state, ConnectorState::Connected);
        assert_eq!(device.connects.load(Ordering::SeqCst), 2);
        assert_eq!(device.count_commands("cat /etc/board.inc"), 2);
        assert_eq!(connector.device_info().unwrap().outlet_count, 3);
        connector.stop().await;
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, config());
        let states = collect_states(&connector);

        connector.stop().await;
        assert_eq!(connector.state(), ConnectorState::Idle);

        connector.start().await.unwrap();
        connector.stop().await;
        connector.stop().await;

        assert_eq!(connector.state(), ConnectorState::Disconnected);
        assert_eq!(
            *states.lock(),
            vec![
                ConnectorState::Connecting,
                ConnectorState::Connected,
                ConnectorState::Disconnected,
            ]
        );
    }

    #[tokio::test]
    async fn start_rejects_missing_host() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, ConnectionConfig::new("", "ubnt", "ubnt"));

        let result = connector.start().await;

        assert_eq!(result, Err(ConfigurationError::MissingHost));
        assert_eq!(connector.state(), ConnectorState::Idle);
        assert_eq!(device.connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn start_rejects_missing_credentials() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, ConnectionConfig::new("10.0.0.2", "ubnt", ""));

        assert_eq!(
            connector.start().await,
            Err(ConfigurationError::MissingCredentials)
        );
    }

    #[tokio::test]
    async fn refused_connection_ends_disconnected() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        device.refuse_connect.store(true, Ordering::SeqCst);
        let connector = connector(&device, config());
        let states = collect_states(&connector);

        let state = connector.start().await.unwrap();

        assert_eq!(state, ConnectorState::Disconnected);
        assert!(!connector.is_running());
        assert!(connector.device_info().is_none());
        assert_eq!(
            *states.lock(),
            vec![ConnectorState::Connecting, ConnectorState::Disconnected]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_connect_times_out() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        device.hang_connect.store(true, Ordering::SeqCst);
        let connector = connector(
            &device,
            config().with_connect_timeout(Duration::from_secs(2)),
        );

        let state = connector.start().await.unwrap();

        assert_eq!(state, ConnectorState::Disconnected);
        assert_eq!(device.connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_introspection_times_out() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        *device.exec_delay.lock() = Duration::from_secs(600);
        let connector = connector(
            &device,
            config().with_connect_timeout(Duration::from_secs(2)),
        );

        let begin = tokio::time::Instant::now();
        let state = connector.start().await.unwrap();

        assert_eq!(state, ConnectorState::Disconnected);
        assert!(begin.elapsed() <= Duration::from_secs(2));
        assert!(!device.alive.load(Ordering::SeqCst));
        assert!(connector.device_info().is_none());
    }

    #[tokio::test]
    async fn device_without_outlets_connects() {
        let device = FakeDevice::with_outlets(0, "");
        let connector = connector(&device, config());

        assert_eq!(connector.start().await.unwrap(), ConnectorState::Connected);
        assert_eq!(connector.device_info().unwrap().outlet_count, 0);
        assert_eq!(device.count_commands("echo 1 > /proc/power/enabled"), 0);
        connector.stop().await;
    }

    #[tokio::test]
    async fn start_clears_explicit_stop() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, config());
        assert!(!connector.is_stopped());

        connector.start().await.unwrap();
        connector.stop().await;
        assert!(connector.is_stopped());

        connector.start().await.unwrap();
        assert!(!connector.is_stopped());
        connector.stop().await;
    }

    #[tokio::test]
    async fn unreadable_outlet_count_closes_session() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        *device.board.lock() = "feature_power=;\n".to_string();
        let connector = connector(&device, config());

        let state = connector.start().await.unwrap();

        assert_eq!(state, ConnectorState::Disconnected);
        assert!(!device.alive.load(Ordering::SeqCst));
        assert_eq!(device.count_commands("cat /etc/version"), 0);
    }

    #[tokio::test]
    async fn too_many_outlets_closes_session() {
        let device = FakeDevice::with_outlets(9, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, config());

        assert_eq!(
            connector.start().await.unwrap(),
            ConnectorState::Disconnected
        );
        assert!(!device.alive.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn model_mismatch_keeps_live_count() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, config().with_model("P6E".parse().unwrap()));

        connector.start().await.unwrap();

        assert_eq!(connector.device_info().unwrap().outlet_count, 2);
        connector.stop().await;
    }

    #[tokio::test]
    async fn lost_session_reports_disconnected() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, config());
        connector.start().await.unwrap();

        device.drop_session();

        assert!(!connector.is_running());
        assert_eq!(connector.state(), ConnectorState::Disconnected);
        connector.stop().await;
    }
}

// ============================================================================
// Telemetry and switching
// ============================================================================

mod commands {
    use super::*;

    #[tokio::test]
    async fn poll_dispatches_outlets_in_order() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, config());
        let received = collect_telemetry(&connector);
        connector.start().await.unwrap();

        connector.poll().await;

        assert_eq!(
            *received.lock(),
            vec![
                outlet(1, 10.0, 120.0, 500.0, true),
                outlet(2, 0.0, 119.8, 100.0, false),
            ]
        );
        assert_eq!(
            device.commands().last().map(String::as_str),
            Some(
                "cat /proc/power/active_pwr1 /proc/power/v_rms1 /proc/power/energy_sum1 \
                 /proc/power/relay1 /proc/power/active_pwr2 /proc/power/v_rms2 \
                 /proc/power/energy_sum2 /proc/power/relay2"
            )
        );
        connector.stop().await;
    }

    #[tokio::test]
    async fn poll_and_send_do_nothing_when_not_running() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, config());
        let received = collect_telemetry(&connector);

        connector.poll().await;
        connector.send(1, PowerState::On).await;

        assert!(device.commands().is_empty());
        assert!(received.lock().is_empty());

        connector.start().await.unwrap();
        connector.stop().await;
        let issued = device.commands().len();

        connector.poll().await;
        connector.send(1, PowerState::On).await;

        assert_eq!(device.commands().len(), issued);
        assert!(received.lock().is_empty());
    }

    #[tokio::test]
    async fn poll_after_session_loss_does_nothing() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, config());
        let received = collect_telemetry(&connector);
        connector.start().await.unwrap();
        let issued = device.commands().len();

        device.drop_session();
        connector.poll().await;

        assert_eq!(device.commands().len(), issued);
        assert!(received.lock().is_empty());
        connector.stop().await;
    }

    #[tokio::test]
    async fn malformed_telemetry_emits_nothing() {
        let device = FakeDevice::with_outlets(2, "1.0\n2.0\n3.0\n1\n");
        let connector = connector(&device, config());
        let received = collect_telemetry(&connector);
        connector.start().await.unwrap();

        connector.poll().await;
        *device.telemetry.lock() = "1.0\nabc\n3.0\n1\n0.0\n0.0\n0.0\n0\n".to_string();
        connector.poll().await;

        assert!(received.lock().is_empty());
        assert!(connector.is_running());
        connector.stop().await;
    }

    #[tokio::test]
    async fn blank_telemetry_emits_nothing() {
        let device = FakeDevice::with_outlets(2, "  \n");
        let connector = connector(&device, config());
        let received = collect_telemetry(&connector);
        connector.start().await.unwrap();

        connector.poll().await;

        assert!(received.lock().is_empty());
        connector.stop().await;
    }

    #[tokio::test]
    async fn send_switches_relay() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, config());
        connector.start().await.unwrap();

        connector.send(2, PowerState::Off).await;
        connector.send(1, PowerState::On).await;

        let commands = device.commands();
        assert_eq!(
            &commands[commands.len() - 2..],
            ["echo 0 > /proc/power/relay2", "echo 1 > /proc/power/relay1"]
        );
        connector.stop().await;
    }

    #[tokio::test]
    async fn send_rejects_missing_outlets() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, config());
        connector.start().await.unwrap();
        let issued = device.commands().len();

        connector.send(0, PowerState::On).await;
        connector.send(3, PowerState::On).await;
        connector.send(9, PowerState::Off).await;

        assert_eq!(device.commands().len(), issued);
        connector.stop().await;
    }

    #[tokio::test]
    async fn poll_without_outlets_issues_no_read() {
        let device = FakeDevice::with_outlets(0, "");
        let connector = connector(&device, config());
        let received = collect_telemetry(&connector);
        connector.start().await.unwrap();
        let issued = device.commands().len();

        connector.poll().await;

        assert_eq!(device.commands().len(), issued);
        assert!(!device.commands().iter().any(|c| c.trim() == "cat"));
        assert!(received.lock().is_empty());

        connector.send(1, PowerState::On).await;
        assert_eq!(device.commands().len(), issued);
        connector.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_poll_is_skipped() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, config());
        let received = collect_telemetry(&connector);
        connector.start().await.unwrap();
        *device.exec_delay.lock() = Duration::from_secs(5);

        let first = connector.clone();
        let second = connector.clone();
        tokio::join!(first.poll(), second.poll());

        assert_eq!(device.count_commands("cat /proc/power/"), 1);
        assert_eq!(received.lock().len(), 2);

        connector.poll().await;
        assert_eq!(device.count_commands("cat /proc/power/"), 2);
        connector.stop().await;
    }

    #[tokio::test]
    async fn tracker_forwards_only_changes() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, config());
        let tracker = Arc::new(Mutex::new(OutletTracker::new(Duration::ZERO)));
        let forwarded = Arc::new(AtomicUsize::new(0));
        {
            let tracker = Arc::clone(&tracker);
            let forwarded = Arc::clone(&forwarded);
            connector.on_telemetry(move |state| {
                if tracker.lock().apply(state.clone()).is_some() {
                    forwarded.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
        connector.start().await.unwrap();

        connector.poll().await;
        connector.poll().await;
        assert_eq!(forwarded.load(Ordering::SeqCst), 2);

        *device.telemetry.lock() = "10.0\n120.0\n500.0\n1\n0.0\n119.8\n100.0\n1\n".to_string();
        tokio::time::sleep(Duration::from_millis(5)).await;
        connector.poll().await;

        assert_eq!(forwarded.load(Ordering::SeqCst), 3);
        let last = tracker.lock().last(OutletIndex::new(2).unwrap()).cloned();
        assert!(last.unwrap().state.is_on);
        connector.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_commands_never_overlap() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, config());
        connector.start().await.unwrap();
        *device.exec_delay.lock() = Duration::from_millis(20);

        let mut tasks = Vec::new();
        for i in 0..4u8 {
            let polling = connector.clone();
            tasks.push(tokio::spawn(async move { polling.poll().await }));
            let switching = connector.clone();
            let state = PowerState::from(i % 2 == 0);
            tasks.push(tokio::spawn(async move { switching.send(1, state).await }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(device.max_open_channels.load(Ordering::SeqCst), 1);
        assert_eq!(device.count_commands("echo 1 > /proc/power/relay1"), 2);
        assert_eq!(device.count_commands("echo 0 > /proc/power/relay1"), 2);
        connector.stop().await;
    }
}

// ============================================================================
// Background tasks
// ============================================================================

mod background {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn polling_agent_polls_on_interval() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(
            &device,
            config().with_poll_interval(Duration::from_secs(10)),
        );
        let received = collect_telemetry(&connector);
        connector.start().await.unwrap();

        tokio::time::sleep(Duration::from_secs(25)).await;

        assert_eq!(device.count_commands("cat /proc/power/"), 2);
        assert_eq!(received.lock().len(), 4);

        connector.stop().await;
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(device.count_commands("cat /proc/power/"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn polling_agent_reports_lost_session_without_reconnecting() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(
            &device,
            config().with_poll_interval(Duration::from_secs(10)),
        );
        let states = collect_states(&connector);
        connector.start().await.unwrap();

        device.drop_session();
        tokio::time::sleep(Duration::from_secs(25)).await;

        assert_eq!(
            *states.lock(),
            vec![
                ConnectorState::Connecting,
                ConnectorState::Connected,
                ConnectorState::Disconnected,
            ]
        );
        assert_eq!(device.connects.load(Ordering::SeqCst), 1);
        connector.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn watchdog_restarts_lost_connection() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, config());
        connector.start().await.unwrap();
        let watchdog = Watchdog::spawn(connector.clone(), Watchdog::DEFAULT_INTERVAL);

        device.drop_session();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(device.connects.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(device.connects.load(Ordering::SeqCst), 2);
        assert!(connector.is_running());
        assert_eq!(device.count_commands("cat /etc/board.inc"), 2);

        watchdog.stop().await;
        connector.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn watchdog_leaves_running_connector_alone() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, config());
        connector.start().await.unwrap();
        let watchdog = Watchdog::spawn(connector.clone(), Duration::from_secs(5));

        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(device.connects.load(Ordering::SeqCst), 1);
        assert!(!watchdog.is_finished());
        watchdog.stop().await;
        connector.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn watchdog_respects_explicit_stop() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, config());
        connector.start().await.unwrap();
        let watchdog = Watchdog::spawn(connector.clone(), Watchdog::DEFAULT_INTERVAL);

        connector.stop().await;
        tokio::time::sleep(Duration::from_secs(61)).await;

        assert_eq!(device.connects.load(Ordering::SeqCst), 1);
        assert!(!connector.is_running());
        assert_eq!(connector.state(), ConnectorState::Disconnected);
        assert!(!watchdog.is_finished());

        connector.start().await.unwrap();
        device.drop_session();
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(device.connects.load(Ordering::SeqCst), 3);
        assert!(connector.is_running());

        watchdog.stop().await;
        connector.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn watchdog_stops_on_configuration_error() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        let connector = connector(&device, ConnectionConfig::new("10.0.0.2", "", ""));
        let watchdog = Watchdog::spawn(connector.clone(), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;

        assert!(watchdog.is_finished());
        assert_eq!(device.connects.load(Ordering::SeqCst), 0);
        watchdog.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn watchdog_keeps_retrying_refused_connections() {
        let device = FakeDevice::with_outlets(2, TWO_OUTLET_TELEMETRY);
        device.refuse_connect.store(true, Ordering::SeqCst);
        let connector = connector(&device, config());
        let states = collect_states(&connector);
        let watchdog = Watchdog::spawn(connector.clone(), Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(
            states
                .lock()
                .iter()
                .filter(|s| **s == ConnectorState::Connecting)
                .count(),
            3
        );

        device.refuse_connect.store(false, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(connector.is_running());

        watchdog.stop().await;
        connector.stop().await;
    }
}
