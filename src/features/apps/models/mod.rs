mod app;

pub use app::{App, AppPatch, AppWithCategory, NewApp};
