/// Notification socket driver
///
/// `NotificationSocket` is the public handle. All state lives in a single
/// driver task that feeds commands, transport events and the retry timer
/// into the `ReconnectMachine` and performs the effects it returns. Callers
/// never block and never see connection errors.
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::machine::{ConnectionId, ConnectionState, Effect, Event, ReconnectMachine};
use super::transport::{EventSender, Transport, TransportEvent, TransportHandle};
use crate::alert::AlertSink;
use crate::config::SocketConfig;
use crate::credentials::CredentialSource;
use crate::metrics;
use crate::models::Notification;
use crate::store::NotificationStore;

type LiveHandle = Arc<Mutex<Option<Box<dyn TransportHandle>>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Connect,
    Disconnect,
}

/// Collaborators the socket needs
#[derive(Clone)]
pub struct SocketDeps {
    pub transport: Arc<dyn Transport>,
    pub credentials: Arc<dyn CredentialSource>,
    pub alerts: Arc<dyn AlertSink>,
}

pub struct NotificationSocket {
    commands: mpsc::UnboundedSender<Command>,
    live: LiveHandle,
    state: watch::Receiver<ConnectionState>,
    task: JoinHandle<()>,
}

impl NotificationSocket {
    /// Spawn the driver task on the current tokio runtime. Starts Idle.
    pub fn spawn(config: SocketConfig, deps: SocketDeps, store: NotificationStore) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);
        let live: LiveHandle = Arc::new(Mutex::new(None));

        let driver = Driver {
            machine: ReconnectMachine::new(config.reconnect.clone()),
            config,
            deps,
            store,
            live: live.clone(),
            state_tx,
            commands: command_rx,
            events: event_rx,
            event_tx,
            retry_deadline: None,
        };

        Self {
            commands: command_tx,
            live,
            state: state_rx,
            task: tokio::spawn(driver.run()),
        }
    }

    /// Start connecting unless a connection or attempt already exists.
    pub fn connect(&self) {
        self.send(Command::Connect);
    }

    /// Close the connection on purpose and cancel any pending reconnect.
    pub fn disconnect(&self) {
        self.send(Command::Disconnect);
    }

    /// Live transport status, read at call time
    pub fn is_connected(&self) -> bool {
        self.live
            .lock()
            .as_ref()
            .is_some_and(|handle| handle.is_open())
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Disconnect and wait for the driver task to finish
    pub async fn shutdown(self) {
        self.send(Command::Disconnect);
        drop(self.commands);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "notification socket driver ended abnormally");
        }
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::debug!(?command, "notification socket driver is gone");
        }
    }
}

impl std::fmt::Debug for NotificationSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationSocket")
            .field("state", &self.state())
            .field("is_connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

struct Driver {
    machine: ReconnectMachine,
    config: SocketConfig,
    deps: SocketDeps,
    store: NotificationStore,
    live: LiveHandle,
    state_tx: watch::Sender<ConnectionState>,
    commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedReceiver<(ConnectionId, TransportEvent)>,
    event_tx: mpsc::UnboundedSender<(ConnectionId, TransportEvent)>,
    /// At most one pending reconnect
    retry_deadline: Option<Instant>,
}

impl Driver {
    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Connect) => {
                        let token = self.deps.credentials.token();
                        let has_credential = token.is_some();
                        self.apply(Event::ConnectRequested { has_credential }, token);
                    }
                    Some(Command::Disconnect) => self.apply(Event::DisconnectRequested, None),
                    None => {
                        self.apply(Event::DisconnectRequested, None);
                        break;
                    }
                },
                Some((id, event)) = self.events.recv() => self.on_transport_event(id, event),
                () = retry_due(self.retry_deadline) => {
                    self.retry_deadline = None;
                    let token = self.deps.credentials.token();
                    let has_credential = token.is_some();
                    self.apply(Event::RetryTimerFired { has_credential }, token);
                }
            }
        }
        tracing::debug!("notification socket driver stopped");
    }

    fn on_transport_event(&mut self, id: ConnectionId, event: TransportEvent) {
        match event {
            TransportEvent::Opened => {
                if self.machine.current() == Some(id) {
                    tracing::info!(connection_id = %id, "✅ notification socket connected");
                }
                self.apply(Event::TransportOpened(id), None);
            }
            TransportEvent::Message(text) => {
                if self.machine.current() == Some(id) {
                    self.on_message(id, &text);
                }
            }
            TransportEvent::Failed(reason) => {
                if self.machine.current() == Some(id) {
                    tracing::warn!(connection_id = %id, %reason, "⚠️ notification socket connection issue");
                }
                self.apply(Event::TransportFailed(id), None);
            }
            TransportEvent::Closed => {
                if self.machine.current() == Some(id) {
                    tracing::info!(connection_id = %id, "⚠️ notification socket disconnected");
                }
                self.apply(Event::TransportClosed(id), None);
            }
        }
    }

    fn on_message(&self, id: ConnectionId, text: &str) {
        match Notification::from_json(text) {
            Ok(notification) => {
                metrics::record_message(true);
                tracing::debug!(connection_id = %id, notification_id = notification.id, "notification received");
                self.deps.alerts.notify(&notification);
                self.store.add_notification(notification);
            }
            Err(e) => {
                metrics::record_message(false);
                tracing::error!(connection_id = %id, error = %e, "failed to parse notification");
            }
        }
    }

    fn apply(&mut self, event: Event, token: Option<String>) {
        for effect in self.machine.handle(event) {
            match effect {
                Effect::OpenTransport(id) => {
                    let Some(token) = token.as_deref() else {
                        continue;
                    };
                    tracing::info!(
                        connection_id = %id,
                        url = %self.config.redacted_url(),
                        "connecting notification socket"
                    );
                    let handle = self.deps.transport.open(
                        self.config.endpoint_url(token),
                        EventSender::new(id, self.event_tx.clone()),
                    );
                    if let Some(mut stale) = self.live.lock().replace(handle) {
                        stale.close();
                    }
                }
                Effect::CloseTransport => {
                    if let Some(mut handle) = self.live.lock().take() {
                        handle.close();
                    }
                }
                Effect::ReleaseTransport => {
                    self.live.lock().take();
                }
                Effect::ScheduleRetry { delay, attempt } => {
                    let delay_ms = saturating_millis(delay);
                    tracing::info!(
                        delay_ms,
                        attempt,
                        max_attempts = self.machine.policy().max_attempts,
                        "🔄 reconnecting in {}ms (attempt {}/{})",
                        delay_ms,
                        attempt,
                        self.machine.policy().max_attempts
                    );
                    metrics::record_reconnect_scheduled();
                    self.retry_deadline = Some(Instant::now() + delay);
                }
                Effect::CancelRetry => {
                    tracing::debug!("pending reconnect cancelled");
                    self.retry_deadline = None;
                }
                Effect::PublishConnected(connected) => {
                    metrics::set_connected(connected);
                    self.store.set_connected(connected);
                }
                Effect::CredentialMissing => {
                    tracing::warn!("no session token found for notification socket");
                }
                Effect::RetriesExhausted { attempts } => {
                    tracing::error!(attempts, "❌ max notification socket reconnection attempts reached");
                }
            }
        }

        let state = self.machine.state();
        self.state_tx.send_if_modified(|current| {
            let changed = *current != state;
            *current = state;
            changed
        });
    }
}

async fn retry_due(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn saturating_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}
