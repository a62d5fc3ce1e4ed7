use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use reqwest::Client;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::config::{DownloadConfig, DownloadMode};
use crate::core::error::{AppError, Result};
use crate::features::downloads::models::{attachment_disposition, parse_content_range_total};
use crate::modules::store::CatalogStore;

/// A resolved download: where the bytes live and what to call them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub app_id: Uuid,
    pub title: String,
    pub url: String,
}

/// Resolves app downloads, counts them and talks to the download sources
pub struct DownloadService {
    store: Arc<dyn CatalogStore>,
    client: Client,
    config: DownloadConfig,
}

impl DownloadService {
    pub fn new(store: Arc<dyn CatalogStore>, config: DownloadConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            store,
            client,
            config,
        })
    }

    pub fn mode(&self) -> DownloadMode {
        self.config.mode
    }

    /// Look up the app's download URL. Unknown apps and apps without a URL are not found.
    pub async fn resolve(&self, id: Uuid) -> Result<DownloadTarget> {
        let entry = self
            .store
            .get_app(id)
            .await?
            .ok_or_else(|| AppError::NotFound("App not found".to_string()))?;

        let url = entry
            .app
            .download_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AppError::NotFound("Download URL not configured".to_string()))?;

        Ok(DownloadTarget {
            app_id: id,
            title: entry.app.title,
            url,
        })
    }

    /// Resolve and count a download. Counting runs in the background and never
    /// delays or fails the download itself.
    pub async fn start(&self, id: Uuid) -> Result<DownloadTarget> {
        let target = self.resolve(id).await?;

        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(e) = store.increment_downloads(id).await {
                warn!("Failed to increment downloads for {}: {}", id, e);
            }
        });

        Ok(target)
    }

    /// Stream the source through this server as an attachment
    pub async fn proxy(&self, target: &DownloadTarget) -> Result<Response> {
        let upstream = self.client.get(&target.url).send().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Download source unreachable: {}", e))
        })?;

        if !upstream.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Download source responded with {}",
                upstream.status()
            )));
        }

        let content_type = upstream
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let content_length = upstream
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut builder = Response::builder()
            .status(StatusCode::OK)
            .header(
                header::CONTENT_DISPOSITION,
                attachment_disposition(&target.title, &content_type),
            )
            .header(header::CONTENT_TYPE, content_type);
        if let Some(length) = content_length {
            builder = builder.header(header::CONTENT_LENGTH, length);
        }

        builder
            .body(Body::from_stream(upstream.bytes_stream()))
            .map_err(|e| AppError::Internal(format!("Failed to build download response: {}", e)))
    }

    /// Size of the app's download in bytes.
    ///
    /// Unknown apps are not found; an app without a URL or a source that does not
    /// report a size gives `None`.
    pub async fn file_size(&self, id: Uuid) -> Result<Option<u64>> {
        let entry = self
            .store
            .get_app(id)
            .await?
            .ok_or_else(|| AppError::NotFound("App not found".to_string()))?;

        match entry.app.download_url.filter(|url| !url.is_empty()) {
            Some(url) => Ok(self.probe_size(&url).await),
            None => Ok(None),
        }
    }

    /// `HEAD` for `Content-Length`, then a one-byte range request for the
    /// `Content-Range` total. Never fails.
    pub async fn probe_size(&self, url: &str) -> Option<u64> {
        match self
            .client
            .head(url)
            .timeout(self.config.probe_timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                if let Some(length) = header_u64(&response, header::CONTENT_LENGTH) {
                    return Some(length);
                }
                debug!("HEAD {} returned no content-length", url);
            }
            Ok(response) => debug!("HEAD {} returned {}", url, response.status()),
            Err(e) => debug!("HEAD {} failed: {}", url, e),
        }

        match self
            .client
            .get(url)
            .header(header::RANGE, "bytes=0-0")
            .timeout(self.config.probe_timeout)
            .send()
            .await
        {
            Ok(response) => {
                let total = response
                    .headers()
                    .get(header::CONTENT_RANGE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_content_range_total);

                // A source ignoring the range answers 200 with the full length
                total.or_else(|| {
                    (response.status() == StatusCode::OK)
                        .then(|| header_u64(&response, header::CONTENT_LENGTH))
                        .flatten()
                })
            }
            Err(e) => {
                warn!("Failed to probe size of {}: {}", url, e);
                None
            }
        }
    }
}

fn header_u64(response: &reqwest::Response, name: header::HeaderName) -> Option<u64> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|length| *length > 0)
}
