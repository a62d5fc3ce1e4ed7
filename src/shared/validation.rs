use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Runs of characters that are not lowercase alphanumerics, collapsed to one `-` in slugs
    /// - "Photo & Video" -> "photo-video"
    pub static ref SLUG_SEPARATOR_REGEX: Regex = Regex::new(r"[^a-z0-9]+").unwrap();

    /// Characters stripped from uploaded file names before they reach object storage
    /// - "My Photo (1).png" -> "MyPhoto1.png"
    pub static ref UNSAFE_FILENAME_REGEX: Regex = Regex::new(r"[^a-zA-Z0-9.-]").unwrap();

    /// Characters not allowed in a `Content-Disposition` filename built from an app title
    pub static ref UNSAFE_ATTACHMENT_REGEX: Regex = Regex::new(r"[^A-Za-z0-9._-]+").unwrap();
}

/// Derive a URL-safe slug from a display name.
///
/// Computed once when a category is created; renames keep the original slug.
pub fn slugify(name: &str) -> String {
    SLUG_SEPARATOR_REGEX
        .replace_all(&name.to_lowercase(), "-")
        .into_owned()
}

/// Build the object name for an upload: `{unix_millis}-{sanitized original name}`
pub fn stored_filename(original: &str, unix_millis: i64) -> String {
    let sanitized = UNSAFE_FILENAME_REGEX.replace_all(original, "");
    format!("{}-{}", unix_millis, sanitized)
}

/// Turn an app title into a safe attachment base name (no extension)
pub fn attachment_basename(title: &str) -> Option<String> {
    let cleaned = UNSAFE_ATTACHMENT_REGEX.replace_all(title.trim(), "_");
    let cleaned = cleaned.trim_matches(|c| c == '_' || c == '.');
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("Photo & Video"), "photo-video");
        assert_eq!(slugify("Tools"), "tools");
        assert_eq!(slugify("3D  Design"), "3d-design");
    }

    #[test]
    fn test_slugify_keeps_edge_separators() {
        // Leading and trailing runs are replaced, not trimmed
        assert_eq!(slugify(" Tools!"), "-tools-");
    }

    #[test]
    fn test_stored_filename() {
        assert_eq!(
            stored_filename("My Photo (1).png", 1700000000000),
            "1700000000000-MyPhoto1.png"
        );
        assert_eq!(stored_filename("a-b.c", 5), "5-a-b.c");
    }

    #[test]
    fn test_attachment_basename() {
        assert_eq!(
            attachment_basename("Adobe Photoshop 2024").as_deref(),
            Some("Adobe_Photoshop_2024")
        );
        assert_eq!(attachment_basename("  Lightroom: Classic  ").as_deref(), Some("Lightroom_Classic"));
        assert_eq!(attachment_basename("???"), None);
    }
}
