/// Maximum accepted size for a single uploaded image (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Image MIME types accepted by the admin upload forms
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Folder (under the public prefix) holding app card and product images
pub const APP_IMAGES_FOLDER: &str = "apps";

/// Fallback attachment name when an app title has no usable characters
pub const DEFAULT_DOWNLOAD_NAME: &str = "download";

// =============================================================================
// REALTIME
// =============================================================================

/// NOTIFY channel the catalog triggers publish on (see migrations)
pub const CATALOG_CHANNEL: &str = "catalog_changes";

/// Table name carried by category change notifications
pub const TABLE_CATEGORIES: &str = "categories";

/// Table name carried by app change notifications
pub const TABLE_APPS: &str = "apps";
