/// Reconnect state machine for the notification socket
///
/// Pure transition logic: `handle` takes one event and returns the side
/// effects the driver must perform, in order. No I/O and no timers live here.
use std::fmt;
use std::time::Duration;

use resilience::BackoffConfig;

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No connection and no attempt in flight (disconnected)
    #[default]
    Idle,
    Connecting,
    Connected,
}

/// Identifies one transport connection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Explicit `connect()` call
    ConnectRequested { has_credential: bool },
    /// The pending reconnect delay elapsed
    RetryTimerFired { has_credential: bool },
    TransportOpened(ConnectionId),
    /// Transport reported an error; a close follows
    TransportFailed(ConnectionId),
    TransportClosed(ConnectionId),
    /// Explicit `disconnect()` call
    DisconnectRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    OpenTransport(ConnectionId),
    /// Close the live transport on purpose
    CloseTransport,
    /// Drop the handle of a transport that is already gone
    ReleaseTransport,
    ScheduleRetry { delay: Duration, attempt: u32 },
    CancelRetry,
    PublishConnected(bool),
    CredentialMissing,
    RetriesExhausted { attempts: u32 },
}

#[derive(Debug)]
pub struct ReconnectMachine {
    policy: BackoffConfig,
    state: ConnectionState,
    /// Retries made since the last successful open
    attempts: u32,
    intentional_disconnect: bool,
    retry_pending: bool,
    current: Option<ConnectionId>,
    next_id: u64,
}

impl ReconnectMachine {
    pub fn new(policy: BackoffConfig) -> Self {
        Self {
            policy,
            state: ConnectionState::Idle,
            attempts: 0,
            intentional_disconnect: false,
            retry_pending: false,
            current: None,
            next_id: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn retry_pending(&self) -> bool {
        self.retry_pending
    }

    /// Connection whose events are currently accepted
    pub fn current(&self) -> Option<ConnectionId> {
        self.current
    }

    pub fn policy(&self) -> &BackoffConfig {
        &self.policy
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        let mut effects = Vec::new();

        match event {
            Event::ConnectRequested { has_credential } => {
                if self.current.is_some() {
                    return effects;
                }
                if self.retry_pending {
                    self.retry_pending = false;
                    effects.push(Effect::CancelRetry);
                }
                self.intentional_disconnect = false;
                self.begin_connect(has_credential, &mut effects);
            }

            Event::RetryTimerFired { has_credential } => {
                if !self.retry_pending || self.current.is_some() {
                    return effects;
                }
                self.retry_pending = false;
                self.attempts += 1;
                self.begin_connect(has_credential, &mut effects);
            }

            Event::TransportOpened(id) => {
                if self.current != Some(id) {
                    return effects;
                }
                self.state = ConnectionState::Connected;
                self.attempts = 0;
                effects.push(Effect::PublishConnected(true));
            }

            Event::TransportFailed(id) => {
                if self.current != Some(id) {
                    return effects;
                }
                effects.push(Effect::PublishConnected(false));
            }

            Event::TransportClosed(id) => {
                if self.current != Some(id) {
                    return effects;
                }
                self.current = None;
                self.state = ConnectionState::Idle;
                effects.push(Effect::ReleaseTransport);
                effects.push(Effect::PublishConnected(false));

                if self.intentional_disconnect {
                    return effects;
                }
                if self.policy.allows(self.attempts) {
                    self.retry_pending = true;
                    effects.push(Effect::ScheduleRetry {
                        delay: self.policy.delay_for(self.attempts),
                        attempt: self.attempts + 1,
                    });
                } else {
                    effects.push(Effect::RetriesExhausted {
                        attempts: self.attempts,
                    });
                }
            }

            Event::DisconnectRequested => {
                self.intentional_disconnect = true;
                if self.retry_pending {
                    self.retry_pending = false;
                    effects.push(Effect::CancelRetry);
                }
                if self.current.take().is_some() {
                    effects.push(Effect::CloseTransport);
                }
                self.state = ConnectionState::Idle;
                effects.push(Effect::PublishConnected(false));
            }
        }

        effects
    }

    fn begin_connect(&mut self, has_credential: bool, effects: &mut Vec<Effect>) {
        if !has_credential {
            effects.push(Effect::CredentialMissing);
            return;
        }
        self.next_id += 1;
        let id = ConnectionId(self.next_id);
        self.current = Some(id);
        self.state = ConnectionState::Connecting;
        effects.push(Effect::OpenTransport(id));
    }
}
