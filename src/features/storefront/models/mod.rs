pub mod catalog_tree;

pub use catalog_tree::CatalogTree;
