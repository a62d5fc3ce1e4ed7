use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{CatalogCounts, CatalogStore};
use crate::core::error::{AppError, Result};
use crate::features::apps::models::{App, AppPatch, AppWithCategory, NewApp};
use crate::features::categories::models::{Category, CategoryPatch, CategoryWithApps, NewCategory};
use crate::modules::realtime::{Change, ChangeEvent, ChangeFeed, EntityKey};

#[derive(Default)]
struct State {
    categories: Vec<Category>,
    apps: Vec<App>,
}

/// In-memory `CatalogStore` for tests.
///
/// When built with a feed it publishes the same events the database triggers would.
#[derive(Default)]
pub struct MemoryCatalogStore {
    state: Mutex<State>,
    feed: Option<ChangeFeed>,
    failing_ids: Mutex<HashSet<Uuid>>,
    unavailable: AtomicBool,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(feed: ChangeFeed) -> Self {
        Self {
            feed: Some(feed),
            ..Self::default()
        }
    }

    /// Make every mutation touching `id` fail with a database error
    pub fn fail_writes_for(&self, id: Uuid) {
        self.failing_ids.lock().unwrap().insert(id);
    }

    /// Make every call fail, as if the database were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn check_writable(&self, id: Uuid) -> Result<()> {
        self.check_available()?;
        if self.failing_ids.lock().unwrap().contains(&id) {
            return Err(AppError::Database(sqlx::Error::RowNotFound));
        }
        Ok(())
    }

    fn emit(&self, event: ChangeEvent) {
        if let Some(feed) = &self.feed {
            feed.publish(event);
        }
    }

    fn with_category_name(state: &State, app: &App) -> AppWithCategory {
        AppWithCategory {
            category_name: state
                .categories
                .iter()
                .find(|c| c.id == app.category_id)
                .map(|c| c.name.clone()),
            app: app.clone(),
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.check_available()?;
        let mut categories = self.state.lock().unwrap().categories.clone();
        categories.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(categories)
    }

    async fn snapshot(&self) -> Result<Vec<CategoryWithApps>> {
        let categories = self.list_categories().await?;
        let state = self.state.lock().unwrap();

        Ok(categories
            .into_iter()
            .map(|category| {
                let mut apps: Vec<App> = state
                    .apps
                    .iter()
                    .filter(|a| a.category_id == category.id)
                    .cloned()
                    .collect();
                apps.sort_by_key(|a| a.display_order);
                CategoryWithApps { category, apps }
            })
            .collect())
    }

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_category(&self, new: NewCategory) -> Result<Category> {
        self.check_available()?;
        let category = Category {
            id: Uuid::new_v4(),
            name: new.name,
            slug: new.slug,
            display_order: new.display_order,
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().categories.push(category.clone());
        self.emit(ChangeEvent::Category(Change::Insert(category.clone())));
        Ok(category)
    }

    async fn update_category(&self, id: Uuid, patch: CategoryPatch) -> Result<Option<Category>> {
        self.check_writable(id)?;
        let updated = {
            let mut state = self.state.lock().unwrap();
            let Some(category) = state.categories.iter_mut().find(|c| c.id == id) else {
                return Ok(None);
            };
            if let Some(name) = patch.name {
                category.name = name;
            }
            category.clone()
        };
        self.emit(ChangeEvent::Category(Change::Update(updated.clone())));
        Ok(Some(updated))
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool> {
        self.check_writable(id)?;
        let removed_apps = {
            let mut state = self.state.lock().unwrap();
            let before = state.categories.len();
            state.categories.retain(|c| c.id != id);
            if state.categories.len() == before {
                return Ok(false);
            }
            let (removed, kept): (Vec<App>, Vec<App>) =
                state.apps.drain(..).partition(|a| a.category_id == id);
            state.apps = kept;
            removed
        };

        // Cascade deletes fire their own row triggers first
        for app in removed_apps {
            self.emit(ChangeEvent::App(Change::Delete(EntityKey { id: app.id })));
        }
        self.emit(ChangeEvent::Category(Change::Delete(EntityKey { id })));
        Ok(true)
    }

    async fn set_category_order(&self, id: Uuid, display_order: i32) -> Result<bool> {
        self.check_writable(id)?;
        let updated = {
            let mut state = self.state.lock().unwrap();
            let Some(category) = state.categories.iter_mut().find(|c| c.id == id) else {
                return Ok(false);
            };
            category.display_order = display_order;
            category.clone()
        };
        self.emit(ChangeEvent::Category(Change::Update(updated)));
        Ok(true)
    }

    async fn next_category_order(&self) -> Result<i32> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .categories
            .iter()
            .map(|c| c.display_order + 1)
            .max()
            .unwrap_or(0))
    }

    async fn list_apps(&self, category_id: Option<Uuid>) -> Result<Vec<AppWithCategory>> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        let mut apps: Vec<AppWithCategory> = state
            .apps
            .iter()
            .filter(|a| category_id.is_none_or(|id| a.category_id == id))
            .map(|a| Self::with_category_name(&state, a))
            .collect();
        apps.sort_by_key(|a| a.app.display_order);
        Ok(apps)
    }

    async fn get_app(&self, id: Uuid) -> Result<Option<AppWithCategory>> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .apps
            .iter()
            .find(|a| a.id == id)
            .map(|a| Self::with_category_name(&state, a)))
    }

    async fn insert_app(&self, new: NewApp) -> Result<App> {
        self.check_writable(new.category_id)?;
        let app = {
            let mut state = self.state.lock().unwrap();
            if !state.categories.iter().any(|c| c.id == new.category_id) {
                // Foreign key violation in the real schema
                return Err(AppError::Database(sqlx::Error::RowNotFound));
            }
            let app = App {
                id: Uuid::new_v4(),
                title: new.title,
                creator: new.creator,
                price: new.price,
                description: new.description,
                category_id: new.category_id,
                display_order: new.display_order,
                image_url: new.image_url,
                product_image_url: new.product_image_url,
                download_url: new.download_url,
                downloads: 0,
                badge_text: new.badge_text,
                created_at: Utc::now(),
            };
            state.apps.push(app.clone());
            app
        };
        self.emit(ChangeEvent::App(Change::Insert(app.clone())));
        Ok(app)
    }

    async fn update_app(&self, id: Uuid, patch: AppPatch) -> Result<Option<App>> {
        self.check_writable(id)?;
        let updated = {
            let mut state = self.state.lock().unwrap();
            let Some(app) = state.apps.iter_mut().find(|a| a.id == id) else {
                return Ok(None);
            };
            patch.apply_to(app);
            app.clone()
        };
        self.emit(ChangeEvent::App(Change::Update(updated.clone())));
        Ok(Some(updated))
    }

    async fn delete_app(&self, id: Uuid) -> Result<bool> {
        self.check_writable(id)?;
        let removed = {
            let mut state = self.state.lock().unwrap();
            let before = state.apps.len();
            state.apps.retain(|a| a.id != id);
            state.apps.len() != before
        };
        if removed {
            self.emit(ChangeEvent::App(Change::Delete(EntityKey { id })));
        }
        Ok(removed)
    }

    async fn set_app_order(&self, id: Uuid, display_order: i32) -> Result<bool> {
        self.check_writable(id)?;
        let updated = {
            let mut state = self.state.lock().unwrap();
            let Some(app) = state.apps.iter_mut().find(|a| a.id == id) else {
                return Ok(false);
            };
            app.display_order = display_order;
            app.clone()
        };
        self.emit(ChangeEvent::App(Change::Update(updated)));
        Ok(true)
    }

    async fn next_app_order(&self, category_id: Uuid) -> Result<i32> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .apps
            .iter()
            .filter(|a| a.category_id == category_id)
            .map(|a| a.display_order + 1)
            .max()
            .unwrap_or(0))
    }

    async fn increment_downloads(&self, id: Uuid) -> Result<()> {
        self.check_writable(id)?;
        let updated = {
            let mut state = self.state.lock().unwrap();
            let Some(app) = state.apps.iter_mut().find(|a| a.id == id) else {
                return Ok(());
            };
            app.downloads += 1;
            app.clone()
        };
        self.emit(ChangeEvent::App(Change::Update(updated)));
        Ok(())
    }

    async fn counts(&self) -> Result<CatalogCounts> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(CatalogCounts {
            apps: state.apps.len() as i64,
            categories: state.categories.len() as i64,
        })
    }
}
