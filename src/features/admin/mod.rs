//! Admin panel API under `/api/admin`, gated by HTTP Basic credentials.
//!
//! Category and app management live in their own features; this module owns the
//! dashboard and assembles the gated router.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::AdminService;
