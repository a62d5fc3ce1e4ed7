use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::downloads::models::format_size;

/// Size of an app's download, when the source reports it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileSizeDto {
    pub id: Uuid,
    /// Bytes; null when the source did not say
    pub size: Option<u64>,
    #[schema(example = "150 MB")]
    pub size_label: Option<String>,
}

impl FileSizeDto {
    pub fn new(id: Uuid, size: Option<u64>) -> Self {
        Self {
            id,
            size,
            size_label: size.filter(|s| *s > 0).map(format_size),
        }
    }
}
