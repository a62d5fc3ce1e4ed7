pub mod attachment;

pub use attachment::{attachment_disposition, format_size, parse_content_range_total};
