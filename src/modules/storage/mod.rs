//! Object storage for uploaded images
//!
//! `ImageStorage` is what the admin features depend on; `MinIOClient` implements
//! it for MinIO or any S3-compatible service.

mod minio_client;
mod sigv4;

pub use minio_client::MinIOClient;

use async_trait::async_trait;

use crate::core::error::Result;

#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Store `data` under `folder/filename` and return its public URL
    async fn upload(
        &self,
        folder: &str,
        filename: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String>;
}
