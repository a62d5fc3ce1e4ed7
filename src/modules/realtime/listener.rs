use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::events::decode;
use super::feed::ChangeFeed;
use crate::modules::store::CatalogStore;
use crate::shared::constants::CATALOG_CHANNEL;

/// Bridges Postgres NOTIFY to the in-process `ChangeFeed`.
///
/// Notifications only name the changed row, which is read back through the
/// store before it is published. Every successful LISTEN, the first one
/// included, is followed by a `Resync`: anything committed before it was
/// established was never delivered.
pub struct PgChangeListener {
    pool: PgPool,
    store: Arc<dyn CatalogStore>,
    feed: ChangeFeed,
    retry_delay: Duration,
}

impl PgChangeListener {
    pub fn new(
        pool: PgPool,
        store: Arc<dyn CatalogStore>,
        feed: ChangeFeed,
        retry_delay: Duration,
    ) -> Self {
        Self {
            pool,
            store,
            feed,
            retry_delay,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        loop {
            let mut listener = match self.connect().await {
                Ok(listener) => listener,
                Err(e) => {
                    warn!(
                        "Failed to subscribe to '{}': {}. Retrying in {:?}",
                        CATALOG_CHANNEL, e, self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    continue;
                }
            };

            info!(
                "Listening for catalog changes on '{}', requesting resync",
                CATALOG_CHANNEL
            );
            self.feed.request_resync();

            loop {
                match listener.try_recv().await {
                    Ok(Some(notification)) => self.dispatch(notification.payload()).await,
                    Ok(None) => {
                        warn!("Connection for '{}' was lost", CATALOG_CHANNEL);
                        break;
                    }
                    Err(e) => {
                        warn!("Error receiving on '{}': {}", CATALOG_CHANNEL, e);
                        break;
                    }
                }
            }

            tokio::time::sleep(self.retry_delay).await;
        }
    }

    async fn connect(&self) -> Result<PgListener, sqlx::Error> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(CATALOG_CHANNEL).await?;
        Ok(listener)
    }

    async fn dispatch(&self, payload: &str) {
        let notice = match decode(payload) {
            Ok(notice) => notice,
            Err(e) => {
                warn!("Skipping undecodable change notification: {}", e);
                return;
            }
        };

        match notice.resolve(self.store.as_ref()).await {
            Ok(Some(event)) => {
                let receivers = self.feed.publish(event);
                debug!(receivers, "Dispatched catalog change");
            }
            Ok(None) => debug!("Row {} is already gone, waiting for its delete", notice.id),
            Err(e) => {
                // The change is lost to subscribers unless they reload
                warn!("Failed to read changed row {}: {}. Requesting resync", notice.id, e);
                self.feed.request_resync();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::apps::models::NewApp;
    use crate::features::categories::models::NewCategory;
    use crate::modules::realtime::{Change, ChangeEvent, FeedMessage};
    use crate::modules::store::PgCatalogStore;
    use crate::shared::test_helpers::test_pg_pool;
    use tokio::sync::broadcast;

    async fn next_message(rx: &mut broadcast::Receiver<FeedMessage>) -> FeedMessage {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for the feed")
            .expect("feed closed")
    }

    #[tokio::test]
    #[ignore = "needs a Postgres database in TEST_DATABASE_URL"]
    async fn test_first_listen_requests_resync() {
        let pool = test_pg_pool().await;
        let store: Arc<dyn CatalogStore> = Arc::new(PgCatalogStore::new(pool.clone()));
        let feed = ChangeFeed::new(64);
        let mut rx = feed.subscribe();

        let task = PgChangeListener::new(pool, store, feed, Duration::from_millis(50)).spawn();

        assert_eq!(next_message(&mut rx).await, FeedMessage::Resync);
        task.abort();
    }

    #[tokio::test]
    #[ignore = "needs a Postgres database in TEST_DATABASE_URL"]
    async fn test_large_rows_reach_the_feed() {
        let pool = test_pg_pool().await;
        let store: Arc<dyn CatalogStore> = Arc::new(PgCatalogStore::new(pool.clone()));
        let feed = ChangeFeed::new(64);
        let mut rx = feed.subscribe();

        let task = PgChangeListener::new(pool, store.clone(), feed, Duration::from_millis(50))
            .spawn();
        assert_eq!(next_message(&mut rx).await, FeedMessage::Resync);

        let category = store
            .insert_category(NewCategory {
                name: "Large Rows".to_string(),
                slug: "large-rows".to_string(),
                display_order: 0,
            })
            .await
            .unwrap();
        let app = store
            .insert_app(NewApp {
                title: "Verbose".to_string(),
                creator: "Studio".to_string(),
                price: "Free".to_string(),
                description: Some("d".repeat(9000)),
                category_id: category.id,
                display_order: 0,
                image_url: "https://cdn.example.com/verbose.png".to_string(),
                product_image_url: None,
                download_url: Some("https://files.example.com/verbose.zip".to_string()),
                badge_text: None,
            })
            .await
            .unwrap();

        // Other tests share the database; skip their traffic
        let received = loop {
            if let FeedMessage::Change(ChangeEvent::App(Change::Insert(record))) =
                next_message(&mut rx).await
            {
                if record.id == app.id {
                    break record;
                }
            }
        };
        assert_eq!(received.description.as_deref().map(str::len), Some(9000));

        store.delete_category(category.id).await.unwrap();
        task.abort();
    }
}
