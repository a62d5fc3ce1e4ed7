//! Naming and sizing helpers for files served by the download endpoint

use crate::shared::constants::DEFAULT_DOWNLOAD_NAME;
use crate::shared::validation::attachment_basename;

/// File extension (with dot) for a source MIME type; empty when unknown
pub fn extension_for_mime(content_type: &str) -> &'static str {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "application/zip" | "application/x-zip-compressed" => ".zip",
        "application/vnd.rar" | "application/x-rar-compressed" => ".rar",
        "application/x-7z-compressed" => ".7z",
        "application/x-tar" => ".tar",
        "application/gzip" | "application/x-gzip" => ".gz",
        "application/pdf" => ".pdf",
        "application/x-msdownload"
        | "application/x-msdos-program"
        | "application/vnd.microsoft.portable-executable" => ".exe",
        "image/jpeg" => ".jpg",
        "image/png" => ".png",
        "video/mp4" => ".mp4",
        _ => "",
    }
}

/// `Content-Disposition` for a proxied download named after the app
pub fn attachment_disposition(title: &str, content_type: &str) -> String {
    let extension = extension_for_mime(content_type);
    let basename =
        attachment_basename(title).unwrap_or_else(|| DEFAULT_DOWNLOAD_NAME.to_string());

    let display_name = match title.trim() {
        "" => DEFAULT_DOWNLOAD_NAME,
        trimmed => trimmed,
    };

    format!(
        "attachment; filename=\"{}{}\"; filename*=UTF-8''{}{}",
        basename,
        extension,
        urlencoding::encode(display_name),
        extension
    )
}

/// Total length from a `Content-Range` value such as `bytes 0-0/1234`
pub fn parse_content_range_total(value: &str) -> Option<u64> {
    let (unit, range) = value.trim().split_once(' ')?;
    if !unit.eq_ignore_ascii_case("bytes") {
        return None;
    }
    let (_, total) = range.split_once('/')?;
    total.trim().parse().ok()
}

/// Human size hint: gigabytes with two decimals from 1 GB, whole megabytes below
pub fn format_size(bytes: u64) -> String {
    const MB: f64 = 1024.0 * 1024.0;
    const GB: f64 = MB * 1024.0;

    let bytes = bytes as f64;
    if bytes >= GB {
        format!("{:.2} GB", bytes / GB)
    } else {
        format!("{:.0} MB", bytes / MB)
    }
}
