/// WebSocket transport backed by tokio-tungstenite
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use resilience::with_timeout;
use tokio::sync::oneshot;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::transport::{EventSender, Transport, TransportEvent, TransportHandle};

#[derive(Debug, Clone)]
pub struct WsTransport {
    connect_timeout: Duration,
}

impl WsTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl Transport for WsTransport {
    fn open(&self, url: String, events: EventSender) -> Box<dyn TransportHandle> {
        let open = Arc::new(AtomicBool::new(false));
        let (close_tx, close_rx) = oneshot::channel();

        tokio::spawn(run_connection(
            url,
            self.connect_timeout,
            events,
            open.clone(),
            close_rx,
        ));

        Box::new(WsHandle {
            open,
            close: Some(close_tx),
        })
    }
}

struct WsHandle {
    open: Arc<AtomicBool>,
    close: Option<oneshot::Sender<()>>,
}

impl TransportHandle for WsHandle {
    fn close(&mut self) {
        if let Some(tx) = self.close.take() {
            let _ = tx.send(());
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

/// Dropping the handle closes the connection too: the task sees the
/// oneshot sender go away.
async fn run_connection(
    url: String,
    connect_timeout: Duration,
    events: EventSender,
    open: Arc<AtomicBool>,
    mut close_rx: oneshot::Receiver<()>,
) {
    let connection_id = events.id();

    let handshake = tokio::select! {
        result = with_timeout(connect_timeout, connect_async(url.as_str())) => result,
        _ = &mut close_rx => {
            tracing::debug!(%connection_id, "connection closed before handshake completed");
            return;
        }
    };

    let mut ws = match handshake {
        Ok(Ok((ws, _response))) => ws,
        Ok(Err(e)) => {
            events.send(TransportEvent::Failed(e.to_string()));
            events.send(TransportEvent::Closed);
            return;
        }
        Err(e) => {
            events.send(TransportEvent::Failed(e.to_string()));
            events.send(TransportEvent::Closed);
            return;
        }
    };

    open.store(true, Ordering::Release);
    if !events.send(TransportEvent::Opened) {
        let _ = ws.close(None).await;
        open.store(false, Ordering::Release);
        return;
    }

    loop {
        tokio::select! {
            frame = ws.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    events.send(TransportEvent::Message(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                    Ok(text) => {
                        events.send(TransportEvent::Message(text.to_owned()));
                    }
                    Err(_) => {
                        tracing::debug!(%connection_id, len = data.len(), "ignoring non UTF-8 binary frame");
                    }
                },
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(%connection_id, ?frame, "server closed notification socket");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    open.store(false, Ordering::Release);
                    events.send(TransportEvent::Failed(e.to_string()));
                    break;
                }
                None => break,
            },
            _ = &mut close_rx => {
                open.store(false, Ordering::Release);
                if let Err(e) = ws.close(None).await {
                    tracing::debug!(%connection_id, error = %e, "close handshake failed");
                }
                events.send(TransportEvent::Closed);
                return;
            }
        }
    }

    open.store(false, Ordering::Release);
    events.send(TransportEvent::Closed);
}
