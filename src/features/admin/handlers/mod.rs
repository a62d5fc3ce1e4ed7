pub mod admin_handlers;

pub use admin_handlers::{__path_get_stats, get_stats};
