//! Realtime change feed
//!
//! Database triggers announce changed row keys on a Postgres NOTIFY channel.
//! `PgChangeListener` reads each row back into a typed `ChangeEvent` and
//! fans them out through a `ChangeFeed` to the storefront reconciler and to
//! websocket clients.

mod events;
mod feed;
mod listener;

pub use events::{Change, ChangeEvent};
#[cfg(test)]
pub use events::EntityKey;
pub use feed::{ChangeFeed, FeedMessage};
pub use listener::PgChangeListener;
