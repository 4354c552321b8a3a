//! In-memory registry of open widget views.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use super::view::{ConversationView, ViewHandle};
use crate::config::UiConfig;

/// Thread-safe store of conversation views, keyed by view id.
#[derive(Debug, Clone)]
pub struct ViewStore {
    inner: Arc<ViewStoreInner>,
}

#[derive(Debug)]
struct ViewStoreInner {
    views: RwLock<HashMap<Uuid, ViewHandle>>,
    ui: UiConfig,
}

impl Default for ViewStore {
    fn default() -> Self {
        Self::new(UiConfig::default())
    }
}

impl ViewStore {
    /// Create an empty store whose views use the strings in `ui`.
    #[must_use]
    pub fn new(ui: UiConfig) -> Self {
        Self {
            inner: Arc::new(ViewStoreInner {
                views: RwLock::new(HashMap::new()),
                ui,
            }),
        }
    }

    /// Create a new empty view and return its handle.
    #[must_use]
    pub fn create(&self) -> ViewHandle {
        let id = Uuid::new_v4();
        let handle = ViewHandle::new(id, ConversationView::new(&self.inner.ui));
        self.inner
            .views
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, handle.clone());
        handle
    }

    /// Get a view by id, marking it as active.
    #[must_use]
    pub fn get(&self, id: &Uuid) -> Option<ViewHandle> {
        let handle = self
            .inner
            .views
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()?;
        handle.touch();
        Some(handle)
    }

    /// Remove a view. Returns whether it existed.
    pub fn remove(&self, id: &Uuid) -> bool {
        self.inner
            .views
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }

    /// Get the number of open views.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .views
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if there are no views.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove views that have been inactive longer than the timeout.
    ///
    /// Returns the number of views removed.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = self
            .inner
            .views
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|_, view| !view.is_expired_with_timeout(timeout));
        before - guard.len()
    }

    /// Spawn a task that evicts idle views every `every`.
    pub fn spawn_sweeper(&self, idle_timeout: Duration, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every.max(Duration::from_secs(1)));
            loop {
                interval.tick().await;
                let removed = store.cleanup_expired_with_timeout(idle_timeout);
                if removed > 0 {
                    debug!(
                        name: "view.evicted",
                        removed,
                        open_views = store.len(),
                        "Evicted idle conversation views"
                    );
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_store() {
        let store = ViewStore::default();
        assert!(store.is_empty());

        let view = store.create();
        assert_eq!(store.len(), 1);

        let retrieved = store.get(&view.id()).unwrap();
        assert_eq!(retrieved.id(), view.id());

        assert!(store.remove(&view.id()));
        assert!(!store.remove(&view.id()));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_handles_share_state() {
        let store = ViewStore::default();
        let view = store.create();

        view.begin("hello").await.unwrap();

        let same = store.get(&view.id()).unwrap();
        let count = same.inspect(|v| v.messages().len()).await;
        assert_eq!(count, 1);
        assert!(same.inspect(ConversationView::is_typing).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_views_expire() {
        let store = ViewStore::default();
        let idle = store.create();
        let busy = store.create();

        tokio::time::advance(Duration::from_secs(20 * 60)).await;
        let _ = store.get(&busy.id());
        tokio::time::advance(Duration::from_secs(15 * 60)).await;

        let removed = store.cleanup_expired_with_timeout(Duration::from_secs(30 * 60));
        assert_eq!(removed, 1);
        assert!(store.get(&idle.id()).is_none());
        assert!(store.get(&busy.id()).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_abandoned_views() {
        let store = ViewStore::default();
        for _ in 0..100 {
            let _ = store.create();
        }
        assert_eq!(store.len(), 100);

        let sweeper = store.spawn_sweeper(Duration::from_secs(60), Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(75)).await;

        assert!(store.is_empty());
        sweeper.abort();
    }

    #[test]
    fn test_views_use_store_strings() {
        let ui = UiConfig {
            error_prefix: "Oops: ".to_string(),
            ..UiConfig::default()
        };
        let store = ViewStore::new(ui);
        let first = store.create();
        let second = store.create();
        assert_ne!(first.id(), second.id());
        assert_eq!(store.len(), 2);
    }
}
