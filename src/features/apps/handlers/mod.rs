pub mod app_handler;

pub use app_handler::{
    __path_create_app, __path_delete_app, __path_list_apps, __path_move_app, __path_reorder_apps,
    __path_update_app, create_app, delete_app, list_apps, move_app, reorder_apps, update_app,
};
