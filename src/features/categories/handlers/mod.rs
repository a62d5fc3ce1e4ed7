pub mod category_handler;

pub use category_handler::{
    __path_create_category, __path_delete_category, __path_list_categories,
    __path_move_category, __path_reorder_categories, __path_update_category, create_category,
    delete_category, list_categories, move_category, reorder_categories, update_category,
};
