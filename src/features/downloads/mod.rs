//! Masked downloads: `GET /api/download/{id}` counts the download and hands out the
//! file; `GET /api/apps/{id}/size` reports how big it is.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::DownloadService;
