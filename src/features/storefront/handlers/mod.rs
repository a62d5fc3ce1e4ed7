pub mod realtime_handler;
pub mod storefront_handler;

pub use realtime_handler::{__path_realtime, realtime};
pub use storefront_handler::{__path_get_app, __path_get_storefront, get_app, get_storefront};
