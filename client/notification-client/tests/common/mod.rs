//! Shared fakes for socket tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use notification_client::config::SocketConfig;
use notification_client::socket::{
    ConnectionState, EventSender, NotificationSocket, SocketDeps, Transport, TransportEvent,
    TransportHandle,
};
use notification_client::{AlertSink, Notification, NotificationStore, StaticCredential};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// One connection opened through the fake transport
#[derive(Debug, Clone)]
pub struct FakeConnection {
    pub url: String,
    pub opened_at: Instant,
    events: EventSender,
    open: Arc<AtomicBool>,
    closed_by_client: Arc<AtomicBool>,
}

impl FakeConnection {
    /// Server accepted the handshake
    pub fn accept(&self) {
        self.open.store(true, Ordering::SeqCst);
        self.events.send(TransportEvent::Opened);
    }

    /// Connection lost without the client asking
    pub fn drop_remote(&self) {
        self.open.store(false, Ordering::SeqCst);
        self.events.send(TransportEvent::Closed);
    }

    /// Transport error followed by close
    pub fn fail(&self, reason: &str) {
        self.open.store(false, Ordering::SeqCst);
        self.events.send(TransportEvent::Failed(reason.to_string()));
        self.events.send(TransportEvent::Closed);
    }

    pub fn push(&self, text: &str) {
        self.events.send(TransportEvent::Message(text.to_string()));
    }

    /// Underlying connection dies; no event reaches the driver yet
    pub fn die_silently(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    pub fn closed_by_client(&self) -> bool {
        self.closed_by_client.load(Ordering::SeqCst)
    }
}

pub struct FakeTransport {
    opened: mpsc::UnboundedSender<FakeConnection>,
}

impl FakeTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FakeConnection>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { opened: tx }, rx)
    }
}

struct FakeHandle {
    open: Arc<AtomicBool>,
    closed_by_client: Arc<AtomicBool>,
}

impl TransportHandle for FakeHandle {
    fn close(&mut self) {
        self.open.store(false, Ordering::SeqCst);
        self.closed_by_client.store(true, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

impl Transport for FakeTransport {
    fn open(&self, url: String, events: EventSender) -> Box<dyn TransportHandle> {
        let open = Arc::new(AtomicBool::new(false));
        let closed_by_client = Arc::new(AtomicBool::new(false));
        let _ = self.opened.send(FakeConnection {
            url,
            opened_at: Instant::now(),
            events,
            open: open.clone(),
            closed_by_client: closed_by_client.clone(),
        });
        Box::new(FakeHandle {
            open,
            closed_by_client,
        })
    }
}

#[derive(Default)]
pub struct RecordingAlerts {
    pub seen: Mutex<Vec<i64>>,
}

impl AlertSink for RecordingAlerts {
    fn notify(&self, notification: &Notification) {
        self.seen.lock().push(notification.id);
    }
}

pub struct Harness {
    pub socket: NotificationSocket,
    pub store: NotificationStore,
    pub opened: mpsc::UnboundedReceiver<FakeConnection>,
    pub credentials: Arc<StaticCredential>,
    pub alerts: Arc<RecordingAlerts>,
}

impl Harness {
    pub fn start(token: Option<&str>) -> Self {
        let (transport, opened) = FakeTransport::new();
        let credentials = Arc::new(StaticCredential::new(token.map(str::to_string)));
        let alerts = Arc::new(RecordingAlerts::default());
        let store = NotificationStore::new();

        let deps = SocketDeps {
            transport: Arc::new(transport),
            credentials: credentials.clone(),
            alerts: alerts.clone(),
        };
        let config = SocketConfig::for_api_url("http://localhost:8080/api/v1");
        let socket = NotificationSocket::spawn(config, deps, store.clone());

        Self {
            socket,
            store,
            opened,
            credentials,
            alerts,
        }
    }

    /// Next connection attempt, waiting on virtual time
    pub async fn next_open(&mut self) -> FakeConnection {
        tokio::time::timeout(Duration::from_secs(600), self.opened.recv())
            .await
            .expect("no connection attempt")
            .expect("transport dropped")
    }

    /// Whether another attempt shows up within `window`
    pub async fn opens_within(&mut self, window: Duration) -> bool {
        opens_within(&mut self.opened, window).await
    }

    pub async fn wait_state(&self, want: ConnectionState) {
        let mut rx = self.socket.watch_state();
        tokio::time::timeout(Duration::from_secs(600), rx.wait_for(|s| *s == want))
            .await
            .expect("state not reached")
            .expect("driver gone");
    }

    pub async fn wait_store<F>(&self, predicate: F)
    where
        F: Fn(&notification_client::NotificationState) -> bool,
    {
        let mut rx = self.store.subscribe();
        tokio::time::timeout(Duration::from_secs(600), rx.wait_for(|s| predicate(s)))
            .await
            .expect("store condition not reached")
            .expect("store gone");
    }
}

/// Whether a connection attempt arrives within `window`. A closed channel
/// means the driver is gone, not that it opened anything.
pub async fn opens_within(
    opened: &mut mpsc::UnboundedReceiver<FakeConnection>,
    window: Duration,
) -> bool {
    matches!(
        tokio::time::timeout(window, opened.recv()).await,
        Ok(Some(_))
    )
}

pub fn notification_json(id: i64) -> String {
    Notification {
        id,
        title: "New session request".to_string(),
        message: "Someone wants to learn Rust".to_string(),
        is_read: false,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
    }
    .to_json()
    .unwrap()
}
