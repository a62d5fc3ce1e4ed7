//! In-memory categories → apps tree kept current by change events.
//!
//! Nodes are shared behind `Arc`; applying an event clones only the nodes it touches,
//! so a tree handed out earlier never observes later changes.

use std::sync::Arc;

use uuid::Uuid;

use crate::features::apps::models::App;
use crate::features::categories::models::{Category, CategoryWithApps};
use crate::modules::realtime::{Change, ChangeEvent};

/// A category and the apps currently indexed under it (insertion order, unsorted)
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryNode {
    pub category: Category,
    pub apps: Vec<App>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogTree {
    categories: Vec<Arc<CategoryNode>>,
}

impl CatalogTree {
    pub fn from_snapshot(snapshot: Vec<CategoryWithApps>) -> Self {
        Self {
            categories: snapshot
                .into_iter()
                .map(|entry| {
                    Arc::new(CategoryNode {
                        category: entry.category,
                        apps: entry.apps,
                    })
                })
                .collect(),
        }
    }

    pub fn categories(&self) -> &[Arc<CategoryNode>] {
        &self.categories
    }

    pub fn category(&self, id: Uuid) -> Option<&CategoryNode> {
        self.categories
            .iter()
            .find(|node| node.category.id == id)
            .map(Arc::as_ref)
    }

    pub fn app(&self, id: Uuid) -> Option<&App> {
        self.locate_app(id)
            .map(|(node, index)| &self.categories[node].apps[index])
    }

    pub fn app_count(&self) -> usize {
        self.categories.iter().map(|node| node.apps.len()).sum()
    }

    fn category_index(&self, id: Uuid) -> Option<usize> {
        self.categories
            .iter()
            .position(|node| node.category.id == id)
    }

    fn locate_app(&self, id: Uuid) -> Option<(usize, usize)> {
        self.categories.iter().enumerate().find_map(|(node, entry)| {
            entry
                .apps
                .iter()
                .position(|app| app.id == id)
                .map(|index| (node, index))
        })
    }

    /// Apply one change. Returns whether the tree changed.
    pub fn apply(&mut self, event: ChangeEvent) -> bool {
        match event {
            ChangeEvent::Category(change) => self.apply_category(change),
            ChangeEvent::App(change) => self.apply_app(change),
        }
    }

    fn apply_category(&mut self, change: Change<Category>) -> bool {
        match change {
            Change::Insert(category) | Change::Update(category) => {
                match self.category_index(category.id) {
                    Some(index) => {
                        if self.categories[index].category == category {
                            return false;
                        }
                        Arc::make_mut(&mut self.categories[index]).category = category;
                    }
                    None => self.categories.push(Arc::new(CategoryNode {
                        category,
                        apps: Vec::new(),
                    })),
                }
                true
            }
            Change::Delete(key) => match self.category_index(key.id) {
                Some(index) => {
                    self.categories.remove(index);
                    true
                }
                None => false,
            },
        }
    }

    fn apply_app(&mut self, change: Change<App>) -> bool {
        match change {
            Change::Insert(app) | Change::Update(app) => self.upsert_app(app),
            Change::Delete(key) => match self.locate_app(key.id) {
                Some((node, index)) => {
                    Arc::make_mut(&mut self.categories[node]).apps.remove(index);
                    true
                }
                None => false,
            },
        }
    }

    fn upsert_app(&mut self, app: App) -> bool {
        let target = self.category_index(app.category_id);

        match self.locate_app(app.id) {
            Some((node, index)) if Some(node) == target => {
                if self.categories[node].apps[index] == app {
                    return false;
                }
                Arc::make_mut(&mut self.categories[node]).apps[index] = app;
                true
            }
            Some((node, index)) => {
                // Moved to another category, or to one we do not know
                Arc::make_mut(&mut self.categories[node]).apps.remove(index);
                if let Some(target) = target {
                    Arc::make_mut(&mut self.categories[target]).apps.push(app);
                } else {
                    tracing::debug!(
                        "App {} moved to unknown category {}, dropped",
                        app.id,
                        app.category_id
                    );
                }
                true
            }
            None => match target {
                Some(target) => {
                    Arc::make_mut(&mut self.categories[target]).apps.push(app);
                    true
                }
                None => {
                    tracing::debug!(
                        "App {} references unknown category {}, dropped",
                        app.id,
                        app.category_id
                    );
                    false
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::realtime::EntityKey;
    use crate::shared::test_helpers::{sample_app, sample_category};

    fn tree_with(category: &Category, apps: Vec<App>) -> CatalogTree {
        CatalogTree::from_snapshot(vec![CategoryWithApps {
            category: category.clone(),
            apps,
        }])
    }

    fn app_ids(tree: &CatalogTree, category: Uuid) -> Vec<Uuid> {
        tree.category(category)
            .map(|node| node.apps.iter().map(|a| a.id).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_insert_then_delete_scenario() {
        let c1 = sample_category("Tools", 0);
        let a1 = sample_app(c1.id, "X", 0);
        let a2 = sample_app(c1.id, "Y", 1);
        let mut tree = tree_with(&c1, vec![a1.clone()]);

        assert!(tree.apply(ChangeEvent::App(Change::Insert(a2.clone()))));
        assert!(tree.apply(ChangeEvent::App(Change::Delete(EntityKey { id: a1.id }))));

        let node = tree.category(c1.id).unwrap();
        assert_eq!(node.apps, vec![a2]);
    }

    #[test]
    fn test_update_and_delete_are_idempotent() {
        let c1 = sample_category("Tools", 0);
        let a1 = sample_app(c1.id, "X", 0);
        let a2 = sample_app(c1.id, "Y", 1);
        let mut tree = tree_with(&c1, vec![a1.clone(), a2.clone()]);

        let mut renamed = a1.clone();
        renamed.title = "X2".to_string();
        let update = ChangeEvent::App(Change::Update(renamed));
        let delete = ChangeEvent::App(Change::Delete(EntityKey { id: a2.id }));

        let mut once = tree.clone();
        once.apply(update.clone());
        once.apply(delete.clone());

        tree.apply(update.clone());
        tree.apply(update);
        tree.apply(delete.clone());
        assert!(!tree.apply(delete));

        assert_eq!(tree, once);
    }

    #[test]
    fn test_update_in_place_keeps_position() {
        let c1 = sample_category("Tools", 0);
        let a1 = sample_app(c1.id, "X", 0);
        let a2 = sample_app(c1.id, "Y", 1);
        let mut tree = tree_with(&c1, vec![a1.clone(), a2.clone()]);

        let mut reordered = a1.clone();
        reordered.display_order = 9;
        tree.apply(ChangeEvent::App(Change::Update(reordered)));

        assert_eq!(app_ids(&tree, c1.id), vec![a1.id, a2.id]);
        assert_eq!(tree.app(a1.id).unwrap().display_order, 9);
    }

    #[test]
    fn test_orphan_insert_is_dropped() {
        let c1 = sample_category("Tools", 0);
        let a1 = sample_app(c1.id, "X", 0);
        let mut tree = tree_with(&c1, vec![a1.clone()]);
        let before = tree.clone();

        let orphan = sample_app(Uuid::new_v4(), "Lost", 0);
        assert!(!tree.apply(ChangeEvent::App(Change::Insert(orphan.clone()))));

        assert_eq!(tree, before);
        assert!(tree.app(orphan.id).is_none());
    }

    #[test]
    fn test_category_move_indexes_app_once() {
        let x = sample_category("X", 0);
        let y = sample_category("Y", 1);
        let a = sample_app(x.id, "App", 0);
        let mut tree = CatalogTree::from_snapshot(vec![
            CategoryWithApps {
                category: x.clone(),
                apps: vec![a.clone()],
            },
            CategoryWithApps {
                category: y.clone(),
                apps: vec![],
            },
        ]);

        let mut moved = a.clone();
        moved.category_id = y.id;
        moved.title = "Moved".to_string();
        let event = ChangeEvent::App(Change::Update(moved));
        tree.apply(event.clone());
        tree.apply(event);

        assert!(app_ids(&tree, x.id).is_empty());
        assert_eq!(app_ids(&tree, y.id), vec![a.id]);
        assert_eq!(tree.app(a.id).unwrap().title, "Moved");
        assert_eq!(tree.app_count(), 1);
    }

    #[test]
    fn test_move_to_unknown_category_unindexes_app() {
        let x = sample_category("X", 0);
        let a = sample_app(x.id, "App", 0);
        let mut tree = tree_with(&x, vec![a.clone()]);

        let mut moved = a.clone();
        moved.category_id = Uuid::new_v4();
        assert!(tree.apply(ChangeEvent::App(Change::Update(moved))));
        assert_eq!(tree.app_count(), 0);
    }

    #[test]
    fn test_insert_replay_is_upsert() {
        let c1 = sample_category("Tools", 0);
        let a1 = sample_app(c1.id, "X", 0);
        let mut tree = tree_with(&c1, vec![a1.clone()]);

        assert!(!tree.apply(ChangeEvent::App(Change::Insert(a1.clone()))));
        assert_eq!(app_ids(&tree, c1.id), vec![a1.id]);
    }

    #[test]
    fn test_category_update_keeps_apps() {
        let c1 = sample_category("Tools", 0);
        let a1 = sample_app(c1.id, "X", 0);
        let mut tree = tree_with(&c1, vec![a1.clone()]);

        let mut renamed = c1.clone();
        renamed.name = "Utilities".to_string();
        tree.apply(ChangeEvent::Category(Change::Update(renamed)));

        let node = tree.category(c1.id).unwrap();
        assert_eq!(node.category.name, "Utilities");
        assert_eq!(node.apps, vec![a1]);
    }

    #[test]
    fn test_category_insert_and_delete() {
        let c1 = sample_category("Tools", 0);
        let a1 = sample_app(c1.id, "X", 0);
        let mut tree = tree_with(&c1, vec![a1.clone()]);

        let c2 = sample_category("Games", 1);
        tree.apply(ChangeEvent::Category(Change::Insert(c2.clone())));
        assert!(tree.category(c2.id).unwrap().apps.is_empty());

        tree.apply(ChangeEvent::Category(Change::Delete(EntityKey { id: c1.id })));
        assert!(tree.category(c1.id).is_none());
        assert!(tree.app(a1.id).is_none());
        assert_eq!(tree.categories().len(), 1);
    }

    #[test]
    fn test_earlier_trees_are_not_mutated() {
        let x = sample_category("X", 0);
        let y = sample_category("Y", 1);
        let a = sample_app(x.id, "App", 0);
        let mut tree = CatalogTree::from_snapshot(vec![
            CategoryWithApps {
                category: x.clone(),
                apps: vec![a.clone()],
            },
            CategoryWithApps {
                category: y.clone(),
                apps: vec![],
            },
        ]);
        let before = tree.clone();

        tree.apply(ChangeEvent::App(Change::Delete(EntityKey { id: a.id })));

        assert_eq!(before.app_count(), 1);
        assert_eq!(tree.app_count(), 0);
        // The untouched node is still shared
        assert!(Arc::ptr_eq(&before.categories()[1], &tree.categories()[1]));
    }
}
