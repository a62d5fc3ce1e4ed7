//! Keeps a `CatalogTree` in sync with the change feed.
//!
//! Lifecycle: subscribe, load the snapshot, then apply feed messages one at a time
//! on a single task. A `Resync` message or a lagged receiver reloads the snapshot.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::core::config::RealtimeConfig;
use crate::core::error::Result;
use crate::features::storefront::models::CatalogTree;
use crate::modules::realtime::{ChangeFeed, FeedMessage};
use crate::modules::store::CatalogStore;

pub struct RealtimeReconciler;

impl RealtimeReconciler {
    /// Subscribe to `feed`, load the initial snapshot and start applying changes.
    ///
    /// Subscribing happens before the snapshot is read, so changes committed in
    /// between are replayed on top of it rather than lost.
    pub async fn start(
        store: Arc<dyn CatalogStore>,
        feed: &ChangeFeed,
        config: &RealtimeConfig,
    ) -> Result<ReconcilerHandle> {
        let receiver = feed.subscribe();
        let tree = CatalogTree::from_snapshot(store.snapshot().await?);

        info!(
            "Reconciler started with {} categories and {} apps",
            tree.categories().len(),
            tree.app_count()
        );

        let (state_tx, state_rx) = watch::channel(tree);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run(
            store,
            receiver,
            state_tx,
            shutdown_rx,
            config.clone(),
        ));

        Ok(ReconcilerHandle {
            state: state_rx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }
}

/// Owner of a running reconciler. Dropping it stops the task.
pub struct ReconcilerHandle {
    state: watch::Receiver<CatalogTree>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ReconcilerHandle {
    /// The current tree. Cheap: nodes are shared, not copied.
    pub fn snapshot(&self) -> CatalogTree {
        self.state.borrow().clone()
    }

    /// Watch for tree replacements
    pub fn subscribe(&self) -> watch::Receiver<CatalogTree> {
        self.state.clone()
    }

    /// Stop applying changes and wait for the task to finish.
    ///
    /// Once this returns the tree can no longer change.
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Reconciler task ended abnormally: {}", e);
            }
        }
        info!("Reconciler stopped");
    }
}

impl Drop for ReconcilerHandle {
    fn drop(&mut self) {
        // Dropping the sender resolves the task's shutdown branch
        self.shutdown.take();
    }
}

async fn run(
    store: Arc<dyn CatalogStore>,
    mut receiver: broadcast::Receiver<FeedMessage>,
    state: watch::Sender<CatalogTree>,
    mut shutdown: oneshot::Receiver<()>,
    config: RealtimeConfig,
) {
    loop {
        let message = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            message = receiver.recv() => message,
        };

        let needs_resync = match message {
            Ok(FeedMessage::Change(event)) => {
                let entity = event.entity_id();
                if !state.send_if_modified(|tree| tree.apply(event)) {
                    debug!("Change for {} left the tree unchanged", entity);
                }
                false
            }
            Ok(FeedMessage::Resync) => {
                info!("Feed requested a resync");
                true
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Reconciler lagged behind the feed by {} messages", skipped);
                true
            }
            Err(RecvError::Closed) => {
                info!("Change feed closed");
                break;
            }
        };

        if needs_resync {
            let reloaded = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                tree = reload_snapshot(store.as_ref(), &config) => tree,
            };
            if let Some(tree) = reloaded {
                state.send_replace(tree);
            }
        }
    }
}

/// Read a fresh snapshot, retrying with doubling backoff. `None` keeps the current tree.
async fn reload_snapshot(store: &dyn CatalogStore, config: &RealtimeConfig) -> Option<CatalogTree> {
    let mut delay = config.resync_backoff;

    for attempt in 1..=config.resync_attempts {
        match store.snapshot().await {
            Ok(snapshot) => {
                let tree = CatalogTree::from_snapshot(snapshot);
                info!(
                    "Resynced catalog: {} categories, {} apps",
                    tree.categories().len(),
                    tree.app_count()
                );
                return Some(tree);
            }
            Err(e) => {
                warn!(
                    "Snapshot reload attempt {}/{} failed: {}",
                    attempt, config.resync_attempts, e
                );
                if attempt < config.resync_attempts {
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                }
            }
        }
    }

    error!("Giving up on snapshot reload, keeping the current tree");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::apps::models::NewApp;
    use crate::features::categories::models::NewCategory;
    use crate::modules::realtime::{Change, ChangeEvent, EntityKey};
    use crate::modules::store::MemoryCatalogStore;
    use crate::shared::test_helpers::sample_app;
    use std::time::Duration;
    use uuid::Uuid;

    fn fast_config() -> RealtimeConfig {
        RealtimeConfig {
            resync_backoff: Duration::from_millis(5),
            resync_attempts: 3,
            ..RealtimeConfig::default()
        }
    }

    async fn wait_for<F>(handle: &ReconcilerHandle, predicate: F) -> CatalogTree
    where
        F: Fn(&CatalogTree) -> bool,
    {
        let mut rx = handle.subscribe();
        let tree = tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|t| predicate(t)))
            .await
            .expect("timed out waiting for reconciler")
            .expect("reconciler stopped")
            .clone();
        tree
    }

    async fn seed_category(store: &MemoryCatalogStore, name: &str) -> Uuid {
        store
            .insert_category(NewCategory {
                name: name.to_string(),
                slug: name.to_lowercase(),
                display_order: 0,
            })
            .await
            .unwrap()
            .id
    }

    fn new_app(category_id: Uuid, title: &str) -> NewApp {
        NewApp {
            title: title.to_string(),
            creator: "Studio".to_string(),
            price: "Free".to_string(),
            description: None,
            category_id,
            display_order: 0,
            image_url: "https://cdn.example.com/card.png".to_string(),
            product_image_url: None,
            download_url: None,
            badge_text: None,
        }
    }

    #[tokio::test]
    async fn test_applies_store_changes() {
        let feed = ChangeFeed::new(16);
        let store = Arc::new(MemoryCatalogStore::with_feed(feed.clone()));
        let tools = seed_category(&store, "Tools").await;
        let first = store.insert_app(new_app(tools, "X")).await.unwrap();

        let handle = RealtimeReconciler::start(store.clone(), &feed, &fast_config())
            .await
            .unwrap();
        assert_eq!(handle.snapshot().app_count(), 1);

        let second = store.insert_app(new_app(tools, "Y")).await.unwrap();
        store.delete_app(first.id).await.unwrap();

        let tree = wait_for(&handle, |t| t.app(first.id).is_none()).await;
        let node = tree.category(tools).unwrap();
        assert_eq!(node.apps.len(), 1);
        assert_eq!(node.apps[0].id, second.id);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_cascade_delete_removes_category() {
        let feed = ChangeFeed::new(16);
        let store = Arc::new(MemoryCatalogStore::with_feed(feed.clone()));
        let tools = seed_category(&store, "Tools").await;
        store.insert_app(new_app(tools, "X")).await.unwrap();

        let handle = RealtimeReconciler::start(store.clone(), &feed, &fast_config())
            .await
            .unwrap();
        store.delete_category(tools).await.unwrap();

        let tree = wait_for(&handle, |t| t.categories().is_empty()).await;
        assert_eq!(tree.app_count(), 0);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_resync_reloads_snapshot() {
        let feed = ChangeFeed::new(16);
        // Writes through this store are not published, as if notifications were lost
        let store = Arc::new(MemoryCatalogStore::new());
        let tools = seed_category(&store, "Tools").await;

        let handle = RealtimeReconciler::start(store.clone(), &feed, &fast_config())
            .await
            .unwrap();
        let app = store.insert_app(new_app(tools, "Missed")).await.unwrap();
        assert!(handle.snapshot().app(app.id).is_none());

        feed.request_resync();
        let tree = wait_for(&handle, |t| t.app(app.id).is_some()).await;
        assert_eq!(tree.app_count(), 1);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_resync_keeps_previous_tree() {
        let feed = ChangeFeed::new(16);
        let store = Arc::new(MemoryCatalogStore::new());
        let tools = seed_category(&store, "Tools").await;

        let handle = RealtimeReconciler::start(store.clone(), &feed, &fast_config())
            .await
            .unwrap();
        store.set_unavailable(true);
        feed.request_resync();

        // Still applies changes once the reload gives up
        let app = sample_app(tools, "Live", 0);
        feed.publish(ChangeEvent::App(Change::Insert(app.clone())));
        let tree = wait_for(&handle, |t| t.app(app.id).is_some()).await;
        assert!(tree.category(tools).is_some());
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_no_changes_after_shutdown() {
        let feed = ChangeFeed::new(16);
        let store = Arc::new(MemoryCatalogStore::new());
        let tools = seed_category(&store, "Tools").await;

        let handle = RealtimeReconciler::start(store.clone(), &feed, &fast_config())
            .await
            .unwrap();
        let watcher = handle.subscribe();
        handle.shutdown().await;

        feed.publish(ChangeEvent::App(Change::Insert(sample_app(tools, "Late", 0))));
        feed.publish(ChangeEvent::Category(Change::Delete(EntityKey { id: tools })));
        tokio::task::yield_now().await;

        assert_eq!(watcher.borrow().app_count(), 0);
        assert!(watcher.borrow().category(tools).is_some());
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_start_fails_when_store_unavailable() {
        let feed = ChangeFeed::new(4);
        let store = Arc::new(MemoryCatalogStore::new());
        store.set_unavailable(true);

        let result = RealtimeReconciler::start(store, &feed, &fast_config()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_lagged_receiver_resyncs() {
        let feed = ChangeFeed::new(1);
        let store = Arc::new(MemoryCatalogStore::with_feed(feed.clone()));
        let tools = seed_category(&store, "Tools").await;

        let handle = RealtimeReconciler::start(store.clone(), &feed, &fast_config())
            .await
            .unwrap();

        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(store.insert_app(new_app(tools, &format!("App {i}"))).await.unwrap().id);
        }

        let tree = wait_for(&handle, |t| ids.iter().all(|id| t.app(*id).is_some())).await;
        assert_eq!(tree.app_count(), 5);
        handle.shutdown().await;
    }
}
