/// Reconnecting notification socket
///
/// Architecture:
/// 1. ReconnectMachine: pure state machine (Idle / Connecting / Connected)
/// 2. NotificationSocket: driver task executing the machine's effects
/// 3. Transport: pluggable connection layer reporting typed events
/// 4. WsTransport: tokio-tungstenite implementation

pub mod client;
pub mod machine;
pub mod transport;
pub mod ws;

pub use client::{NotificationSocket, SocketDeps};
pub use machine::{ConnectionId, ConnectionState, Effect, Event, ReconnectMachine};
pub use transport::{EventSender, Transport, TransportEvent, TransportHandle};
pub use ws::WsTransport;
