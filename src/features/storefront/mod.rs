//! Public storefront: the live catalog tree, app details and the change stream.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/storefront?q=` | Categories with apps, optionally filtered |
//! | GET | `/api/apps/{id}` | App detail |
//! | GET | `/api/realtime` | WebSocket of catalog changes |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{RealtimeReconciler, StorefrontService};
