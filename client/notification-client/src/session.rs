//! Per-session ownership of the notification store and socket
//!
//! A session is created when a user session begins and ended when it ends.
//! Nothing outlives it: ending disconnects the socket on purpose, stops its
//! driver and empties the store.

use std::sync::Arc;

use crate::api::NotificationApi;
use crate::config::SocketConfig;
use crate::services::NotificationService;
use crate::socket::{NotificationSocket, SocketDeps};
use crate::store::NotificationStore;

pub struct NotificationSession {
    store: NotificationStore,
    socket: NotificationSocket,
    service: Option<NotificationService>,
}

impl NotificationSession {
    /// Create a fresh store, spawn the socket driver and start connecting
    pub fn start(config: SocketConfig, deps: SocketDeps) -> Self {
        let store = NotificationStore::new();
        let socket = NotificationSocket::spawn(config, deps, store.clone());
        socket.connect();
        tracing::info!("notification session started");

        Self {
            store,
            socket,
            service: None,
        }
    }

    /// Attach the REST client used for loading and user actions
    pub fn with_api(mut self, api: Arc<dyn NotificationApi>) -> Self {
        self.service = Some(NotificationService::new(api, self.store.clone()));
        self
    }

    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    pub fn socket(&self) -> &NotificationSocket {
        &self.socket
    }

    pub fn service(&self) -> Option<&NotificationService> {
        self.service.as_ref()
    }

    pub async fn end(self) {
        self.socket.shutdown().await;
        self.store.clear_all();
        tracing::info!("notification session ended");
    }
}
