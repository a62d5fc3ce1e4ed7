pub mod admin;
pub mod apps;
pub mod categories;
pub mod downloads;
pub mod ordering;
pub mod storefront;
