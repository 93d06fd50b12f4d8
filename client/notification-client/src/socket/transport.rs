/// Transport abstraction for the notification socket
///
/// A transport opens one connection per call and reports its lifecycle as
/// `TransportEvent`s tagged with the connection id. The driver owns the
/// receiving end of the channel, so the state machine never sees callbacks.
use tokio::sync::mpsc;

use super::machine::ConnectionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    /// One text frame
    Message(String),
    /// Error reported by the transport; `Closed` follows
    Failed(String),
    Closed,
}

/// Sending half handed to a transport for one connection
#[derive(Debug, Clone)]
pub struct EventSender {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<(ConnectionId, TransportEvent)>,
}

impl EventSender {
    pub fn new(id: ConnectionId, tx: mpsc::UnboundedSender<(ConnectionId, TransportEvent)>) -> Self {
        Self { id, tx }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns `false` once the driver has gone away
    pub fn send(&self, event: TransportEvent) -> bool {
        self.tx.send((self.id, event)).is_ok()
    }
}

/// Live handle to one connection
pub trait TransportHandle: Send {
    /// Close the connection. Safe to call more than once.
    fn close(&mut self);

    /// Whether the underlying connection is open right now
    fn is_open(&self) -> bool;
}

pub trait Transport: Send + Sync {
    /// Start connecting to `url`. Must not block; progress is reported on `events`.
    fn open(&self, url: String, events: EventSender) -> Box<dyn TransportHandle>;
}
