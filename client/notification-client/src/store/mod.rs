/// Client-side notification store
///
/// The single point of mutation for the notification list, the unread
/// counter and the connectivity/loading flags. Every session constructs its
/// own store; handles are cheap to clone and share the same state.
///
/// State lives in a `watch` channel so views can `subscribe()` and be woken
/// on change. Mutations that change nothing do not wake subscribers.
use std::sync::Arc;

use tokio::sync::watch;

use crate::models::Notification;

/// Snapshot of everything the store holds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationState {
    /// Most recent first
    pub notifications: Vec<Notification>,
    pub unread_count: u64,
    pub is_connected: bool,
    pub is_loading: bool,
}

#[derive(Clone)]
pub struct NotificationStore {
    state: Arc<watch::Sender<NotificationState>>,
}

impl NotificationStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(NotificationState::default());
        Self {
            state: Arc::new(tx),
        }
    }

    /// Receive a wake-up on every effective change
    pub fn subscribe(&self) -> watch::Receiver<NotificationState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> NotificationState {
        self.state.borrow().clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state.borrow().notifications.clone()
    }

    pub fn get(&self, id: i64) -> Option<Notification> {
        self.state
            .borrow()
            .notifications
            .iter()
            .find(|n| n.id == id)
            .cloned()
    }

    pub fn unread_count(&self) -> u64 {
        self.state.borrow().unread_count
    }

    pub fn is_connected(&self) -> bool {
        self.state.borrow().is_connected
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Prepend a freshly received notification; it always counts as unread.
    pub fn add_notification(&self, notification: Notification) {
        self.state.send_modify(|state| {
            state.notifications.insert(0, notification);
            state.unread_count += 1;
        });
    }

    /// Remove the first entry with `id`, adjusting the unread counter if it
    /// was still unread.
    pub fn remove_notification(&self, id: i64) -> Option<Notification> {
        let mut removed = None;
        self.state.send_if_modified(|state| {
            let Some(pos) = state.notifications.iter().position(|n| n.id == id) else {
                return false;
            };
            let notification = state.notifications.remove(pos);
            if !notification.is_read {
                state.unread_count = state.unread_count.saturating_sub(1);
            }
            removed = Some(notification);
            true
        });
        removed
    }

    /// Flip one entry to read. Returns `false` when nothing changed.
    pub fn mark_as_read(&self, id: i64) -> bool {
        self.state.send_if_modified(|state| {
            match state
                .notifications
                .iter_mut()
                .find(|n| n.id == id && !n.is_read)
            {
                Some(notification) => {
                    notification.is_read = true;
                    state.unread_count = state.unread_count.saturating_sub(1);
                    true
                }
                None => false,
            }
        })
    }

    pub fn mark_all_as_read(&self) {
        self.state.send_modify(|state| {
            for notification in &mut state.notifications {
                notification.is_read = true;
            }
            state.unread_count = 0;
        });
    }

    /// Overwrite the list; the unread counter is left to `set_unread_count`.
    pub fn set_notifications(&self, notifications: Vec<Notification>) {
        self.state.send_modify(|state| {
            state.notifications = notifications;
        });
    }

    pub fn set_unread_count(&self, count: u64) {
        self.state.send_if_modified(|state| {
            let changed = state.unread_count != count;
            state.unread_count = count;
            changed
        });
    }

    pub fn set_connected(&self, connected: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.is_connected != connected;
            state.is_connected = connected;
            changed
        });
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.is_loading != loading;
            state.is_loading = loading;
            changed
        });
    }

    /// Reset to the empty, disconnected state
    pub fn clear_all(&self) {
        self.state.send_modify(|state| {
            *state = NotificationState::default();
        });
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NotificationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("NotificationStore")
            .field("notifications", &state.notifications.len())
            .field("unread_count", &state.unread_count)
            .field("is_connected", &state.is_connected)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn notification(id: i64, is_read: bool) -> Notification {
        Notification {
            id,
            title: format!("title {id}"),
            message: format!("message {id}"),
            is_read,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_prepends() {
        let store = NotificationStore::new();
        store.add_notification(notification(1, false));
        store.add_notification(notification(2, false));

        let ids: Vec<i64> = store.notifications().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(store.unread_count(), 2);
    }

    #[test]
    fn test_mark_unknown_id_is_noop() {
        let store = NotificationStore::new();
        store.add_notification(notification(1, false));
        assert!(!store.mark_as_read(99));
        assert_eq!(store.unread_count(), 1);
    }

    #[test]
    fn test_mark_as_read_floors_at_zero() {
        let store = NotificationStore::new();
        store.set_notifications(vec![notification(1, false)]);
        store.set_unread_count(0);

        assert!(store.mark_as_read(1));
        assert_eq!(store.unread_count(), 0);
        assert!(store.get(1).unwrap().is_read);
    }

    #[test]
    fn test_remove_unread_adjusts_count() {
        let store = NotificationStore::new();
        store.add_notification(notification(1, false));
        store.add_notification(notification(2, false));

        let removed = store.remove_notification(1).unwrap();
        assert_eq!(removed.id, 1);
        assert_eq!(store.unread_count(), 1);
        assert!(store.get(1).is_none());
    }

    #[test]
    fn test_remove_read_keeps_count() {
        let store = NotificationStore::new();
        store.add_notification(notification(1, false));
        store.add_notification(notification(2, false));
        store.mark_as_read(2);

        store.remove_notification(2);
        assert_eq!(store.unread_count(), 1);
    }

    #[test]
    fn test_remove_missing_returns_none() {
        let store = NotificationStore::new();
        assert!(store.remove_notification(5).is_none());
    }

    #[test]
    fn test_clear_all_resets_flags() {
        let store = NotificationStore::new();
        store.add_notification(notification(1, false));
        store.set_connected(true);
        store.set_loading(true);

        store.clear_all();
        assert_eq!(store.snapshot(), NotificationState::default());
    }

    #[test]
    fn test_clones_share_state() {
        let store = NotificationStore::new();
        let other = store.clone();
        other.add_notification(notification(3, false));
        assert_eq!(store.unread_count(), 1);
    }

    #[tokio::test]
    async fn test_noop_does_not_wake_subscribers() {
        let store = NotificationStore::new();
        store.add_notification(notification(1, true));
        let mut rx = store.subscribe();

        // already read
        store.mark_as_read(1);
        assert!(!rx.has_changed().unwrap());

        store.set_connected(true);
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        store.set_connected(true);
        assert!(!rx.has_changed().unwrap());
    }
}
