//! Ordered collections and drag-and-drop reordering.
//!
//! Shared by the two ordering scopes: all categories, and the apps of one category.
//! A completed drag renumbers the whole scope to the dense sequence `0..N-1` and
//! persists every item, one independent update per item.

mod collection;
mod persistence;

pub mod dtos;

pub use collection::OrderUpdate;
pub use persistence::{
    delete_within, move_within, persist_order, AppScope, CategoryScope, PersistReport,
};
