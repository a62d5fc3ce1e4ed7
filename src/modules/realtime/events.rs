use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::apps::models::App;
use crate::features::categories::models::Category;
use crate::modules::store::CatalogStore;
use crate::shared::constants::{TABLE_APPS, TABLE_CATEGORIES};

/// Identity of a deleted row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityKey {
    pub id: Uuid,
}

/// One row-level change for a single table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum Change<T> {
    Insert(T),
    Update(T),
    Delete(EntityKey),
}

/// A change tagged by the table it happened in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "table", content = "change", rename_all = "snake_case")]
pub enum ChangeEvent {
    Category(Change<Category>),
    App(Change<App>),
}

impl ChangeEvent {
    /// Id of the row the event is about
    pub fn entity_id(&self) -> Uuid {
        match self {
            ChangeEvent::Category(change) => change_id(change, |c| c.id),
            ChangeEvent::App(change) => change_id(change, |a| a.id),
        }
    }
}

fn change_id<T>(change: &Change<T>, id: impl Fn(&T) -> Uuid) -> Uuid {
    match change {
        Change::Insert(record) | Change::Update(record) => id(record),
        Change::Delete(key) => key.id,
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid notification payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown table '{0}'")]
    UnknownTable(String),

    #[error("unknown event type '{0}'")]
    UnknownEventType(String),
}

/// Notification payload as emitted by the `notify_catalog_change` trigger
#[derive(Debug, Deserialize)]
struct RawNotice {
    table: String,
    #[serde(rename = "type")]
    event_type: String,
    id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogTable {
    Categories,
    Apps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    fn parse(raw: &str) -> std::result::Result<Self, DecodeError> {
        match raw.to_ascii_uppercase().as_str() {
            "INSERT" => Ok(Self::Insert),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            _ => Err(DecodeError::UnknownEventType(raw.to_string())),
        }
    }

    fn wrap<T>(self, record: T) -> Change<T> {
        match self {
            Self::Insert => Change::Insert(record),
            _ => Change::Update(record),
        }
    }
}

/// A validated notification: which row changed and how, without its contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeNotice {
    pub table: CatalogTable,
    pub kind: ChangeKind,
    pub id: Uuid,
}

impl ChangeNotice {
    /// Read the row an insert or update refers to and build the event.
    ///
    /// Deletes need no read. `None` means the row is already gone; the delete
    /// notification for it is still to come.
    pub async fn resolve(&self, store: &dyn CatalogStore) -> Result<Option<ChangeEvent>> {
        if self.kind == ChangeKind::Delete {
            let key = EntityKey { id: self.id };
            return Ok(Some(match self.table {
                CatalogTable::Categories => ChangeEvent::Category(Change::Delete(key)),
                CatalogTable::Apps => ChangeEvent::App(Change::Delete(key)),
            }));
        }

        Ok(match self.table {
            CatalogTable::Categories => store
                .get_category(self.id)
                .await?
                .map(|category| ChangeEvent::Category(self.kind.wrap(category))),
            CatalogTable::Apps => store
                .get_app(self.id)
                .await?
                .map(|entry| ChangeEvent::App(self.kind.wrap(entry.app))),
        })
    }
}

/// Decode and validate one raw notification payload
pub fn decode(payload: &str) -> std::result::Result<ChangeNotice, DecodeError> {
    let raw: RawNotice = serde_json::from_str(payload)?;
    let kind = ChangeKind::parse(&raw.event_type)?;

    let table = match raw.table.as_str() {
        TABLE_CATEGORIES => CatalogTable::Categories,
        TABLE_APPS => CatalogTable::Apps,
        other => return Err(DecodeError::UnknownTable(other.to_string())),
    };

    Ok(ChangeNotice {
        table,
        kind,
        id: raw.id,
    })
}
