mod category;

pub use category::{Category, CategoryPatch, CategoryWithApps, NewCategory};
