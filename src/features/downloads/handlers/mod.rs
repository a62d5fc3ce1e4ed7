pub mod download_handler;

pub use download_handler::{__path_download, __path_get_file_size, download, get_file_size};
