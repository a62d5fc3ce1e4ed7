use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub swagger: SwaggerConfig,
    pub admin: AdminConfig,
    pub minio: MinIOConfig,
    pub download: DownloadConfig,
    pub realtime: RealtimeConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Credentials guarding the `/api/admin` routes
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

/// MinIO/S3 storage configuration for image uploads
#[derive(Debug, Clone)]
pub struct MinIOConfig {
    /// MinIO/S3 endpoint URL
    pub endpoint: String,
    /// Endpoint used when building public image URLs (defaults to endpoint)
    pub public_endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    /// Prefix readable without credentials (e.g., "public")
    pub public_prefix: String,
}

/// How the download endpoint hands the file to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    /// 307 redirect to the source URL
    Redirect,
    /// Stream the source bytes through this server
    Proxy,
}

#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub mode: DownloadMode,
    pub probe_timeout: Duration,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    pub feed_capacity: usize,
    pub resync_backoff: Duration,
    pub resync_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            admin: AdminConfig::from_env()?,
            minio: MinIOConfig::from_env()?,
            download: DownloadConfig::from_env()?,
            realtime: RealtimeConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 25 * 1024 * 1024; // 25MB, two images per form

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Apps Store API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Storefront and admin API for the apps store".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl AdminConfig {
    pub fn from_env() -> Result<Self, String> {
        let username = env::var("ADMIN_USERNAME")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "ADMIN_USERNAME environment variable is required".to_string())?;

        let password = env::var("ADMIN_PASSWORD")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "ADMIN_PASSWORD environment variable is required".to_string())?;

        Ok(Self { username, password })
    }

    /// Returns credentials in "username:password" format
    pub fn credentials(&self) -> String {
        format!("{}:{}", self.username, self.password)
    }
}

impl MinIOConfig {
    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        let public_endpoint =
            env::var("MINIO_PUBLIC_ENDPOINT").unwrap_or_else(|_| endpoint.clone());

        let access_key = env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let secret_key = env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let bucket = env::var("MINIO_BUCKET").unwrap_or_else(|_| "appstore-images".to_string());

        let region = env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        let public_prefix =
            env::var("MINIO_PUBLIC_PREFIX").unwrap_or_else(|_| "public".to_string());

        Ok(Self {
            endpoint,
            public_endpoint,
            access_key,
            secret_key,
            bucket,
            region,
            public_prefix,
        })
    }
}

impl DownloadMode {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "redirect" => Ok(Self::Redirect),
            "proxy" => Ok(Self::Proxy),
            other => Err(format!(
                "DOWNLOAD_MODE must be 'redirect' or 'proxy', got '{}'",
                other
            )),
        }
    }
}

impl DownloadConfig {
    const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;
    pub const DEFAULT_USER_AGENT: &'static str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    pub fn from_env() -> Result<Self, String> {
        let mode = DownloadMode::parse(
            &env::var("DOWNLOAD_MODE").unwrap_or_else(|_| "redirect".to_string()),
        )?;

        let probe_timeout_secs = env::var("DOWNLOAD_PROBE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_PROBE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DOWNLOAD_PROBE_TIMEOUT_SECS must be a valid number".to_string())?;

        let user_agent = env::var("DOWNLOAD_USER_AGENT")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_USER_AGENT.to_string());

        Ok(Self {
            mode,
            probe_timeout: Duration::from_secs(probe_timeout_secs),
            user_agent,
        })
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            mode: DownloadMode::Redirect,
            probe_timeout: Duration::from_secs(Self::DEFAULT_PROBE_TIMEOUT_SECS),
            user_agent: Self::DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl RealtimeConfig {
    const DEFAULT_FEED_CAPACITY: usize = 256;
    const DEFAULT_RESYNC_BACKOFF_MS: u64 = 500;
    const DEFAULT_RESYNC_ATTEMPTS: u32 = 5;

    pub fn from_env() -> Result<Self, String> {
        let feed_capacity = env::var("REALTIME_FEED_CAPACITY")
            .unwrap_or_else(|_| Self::DEFAULT_FEED_CAPACITY.to_string())
            .parse::<usize>()
            .map_err(|_| "REALTIME_FEED_CAPACITY must be a valid number".to_string())?;

        if feed_capacity == 0 {
            return Err("REALTIME_FEED_CAPACITY must be greater than zero".to_string());
        }

        let resync_backoff_ms = env::var("REALTIME_RESYNC_BACKOFF_MS")
            .unwrap_or_else(|_| Self::DEFAULT_RESYNC_BACKOFF_MS.to_string())
            .parse::<u64>()
            .map_err(|_| "REALTIME_RESYNC_BACKOFF_MS must be a valid number".to_string())?;

        let resync_attempts = env::var("REALTIME_RESYNC_ATTEMPTS")
            .unwrap_or_else(|_| Self::DEFAULT_RESYNC_ATTEMPTS.to_string())
            .parse::<u32>()
            .map_err(|_| "REALTIME_RESYNC_ATTEMPTS must be a valid number".to_string())?;

        Ok(Self {
            feed_capacity,
            resync_backoff: Duration::from_millis(resync_backoff_ms),
            resync_attempts,
        })
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            feed_capacity: Self::DEFAULT_FEED_CAPACITY,
            resync_backoff: Duration::from_millis(Self::DEFAULT_RESYNC_BACKOFF_MS),
            resync_attempts: Self::DEFAULT_RESYNC_ATTEMPTS,
        }
    }
}
