use std::sync::Arc;

use crate::api::NotificationApi;
use crate::error::Result;
use crate::models::NotificationPage;
use crate::store::NotificationStore;

/// Notification operations that involve the server
///
/// User actions go to the server first; the store only changes when the
/// server accepted them.
#[derive(Clone)]
pub struct NotificationService {
    api: Arc<dyn NotificationApi>,
    store: NotificationStore,
}

impl NotificationService {
    pub fn new(api: Arc<dyn NotificationApi>, store: NotificationStore) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    /// Replace the store's list and unread count with one server page
    pub async fn load(&self, limit: u32, offset: u32) -> Result<NotificationPage> {
        self.store.set_loading(true);
        let result = self.api.list(limit, offset).await;
        self.store.set_loading(false);

        let page = result?;
        tracing::info!(
            count = page.notifications.len(),
            total = page.total,
            unread = page.unread_count,
            "notifications loaded"
        );
        self.store.set_notifications(page.notifications.clone());
        self.store.set_unread_count(page.unread_count);
        Ok(page)
    }

    pub async fn refresh_unread_count(&self) -> Result<u64> {
        let count = self.api.unread_count().await?;
        self.store.set_unread_count(count);
        Ok(count)
    }

    pub async fn mark_as_read(&self, id: i64) -> Result<()> {
        self.api.mark_as_read(id).await?;
        self.store.mark_as_read(id);
        Ok(())
    }

    pub async fn mark_all_as_read(&self) -> Result<()> {
        self.api.mark_all_as_read().await?;
        self.store.mark_all_as_read();
        Ok(())
    }

    pub async fn remove(&self, id: i64) -> Result<()> {
        self.api.delete(id).await?;
        if self.store.remove_notification(id).is_none() {
            tracing::debug!(notification_id = id, "deleted notification was not in the local list");
        }
        Ok(())
    }
}
