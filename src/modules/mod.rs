//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the catalog store, the realtime change feed and image storage.

pub mod realtime;
pub mod storage;
pub mod store;
