use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{OrderUpdate, PersistReport};

/// Batch of positions for one ordering scope
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReorderRequestDto {
    #[validate(length(min = 1, message = "items must not be empty"), nested)]
    pub items: Vec<OrderUpdate>,
}

/// Drop the item onto `target_id`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MoveRequestDto {
    /// Absent when the item was released outside the list; nothing moves
    pub target_id: Option<Uuid>,
}

/// Resulting order of the whole scope and how its persistence went
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MoveResultDto {
    pub order: Vec<OrderUpdate>,
    pub report: PersistReport,
}
