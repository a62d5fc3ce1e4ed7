use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::persistence::{persist_order, OrderStore, PersistReport};
use crate::core::error::Result;
use crate::features::apps::models::App;
use crate::features::categories::models::Category;

/// Anything that sorts by a stored `display_order`
pub trait Positioned {
    fn position_id(&self) -> Uuid;
    fn display_order(&self) -> i32;
    fn set_display_order(&mut self, display_order: i32);
}

impl Positioned for Category {
    fn position_id(&self) -> Uuid {
        self.id
    }

    fn display_order(&self) -> i32 {
        self.display_order
    }

    fn set_display_order(&mut self, display_order: i32) {
        self.display_order = display_order;
    }
}

impl Positioned for App {
    fn position_id(&self) -> Uuid {
        self.id
    }

    fn display_order(&self) -> i32 {
        self.display_order
    }

    fn set_display_order(&mut self, display_order: i32) {
        self.display_order = display_order;
    }
}

/// One `{id, display_order}` pair of a persisted ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct OrderUpdate {
    pub id: Uuid,
    #[validate(range(min = 0, message = "display_order must not be negative"))]
    pub display_order: i32,
}

/// Drag gesture state of one list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { source: Uuid },
    DraggingOver { source: Uuid, target: Uuid },
}

impl DragState {
    fn source(&self) -> Option<Uuid> {
        match *self {
            DragState::Idle => None,
            DragState::Dragging { source } | DragState::DraggingOver { source, .. } => {
                Some(source)
            }
        }
    }
}

/// A flat list sharing one ordering scope, driven by drag gestures.
///
/// Local order changes are applied immediately; persistence happens afterwards
/// and never rolls the local order back.
#[derive(Debug, Clone)]
pub struct OrderedCollection<T> {
    items: Vec<T>,
    drag: DragState,
}

impl<T: Positioned> OrderedCollection<T> {
    /// Items are sorted by `display_order`; ties keep their given order
    pub fn new(mut items: Vec<T>) -> Self {
        items.sort_by_key(|item| item.display_order());
        Self {
            items,
            drag: DragState::Idle,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// The item being dragged is shown de-emphasized
    pub fn is_dimmed(&self, id: Uuid) -> bool {
        self.drag.source() == Some(id)
    }

    /// The current drop target is highlighted
    pub fn is_highlighted(&self, id: Uuid) -> bool {
        matches!(self.drag, DragState::DraggingOver { target, .. } if target == id)
    }

    fn index_of(&self, id: Uuid) -> Option<usize> {
        self.items.iter().position(|item| item.position_id() == id)
    }

    /// Start dragging `id`. Unknown ids leave the state unchanged.
    pub fn begin_drag(&mut self, id: Uuid) -> bool {
        if self.index_of(id).is_none() {
            return false;
        }
        self.drag = DragState::Dragging { source: id };
        true
    }

    /// Pointer crossed over `id`. Hovering the source itself keeps the current target.
    pub fn hover(&mut self, id: Uuid) {
        let Some(source) = self.drag.source() else {
            return;
        };
        if id == source || self.index_of(id).is_none() {
            return;
        }
        self.drag = DragState::DraggingOver { source, target: id };
    }

    /// Pointer left the list without dropping: forget the target, keep dragging
    pub fn leave(&mut self) {
        if let DragState::DraggingOver { source, .. } = self.drag {
            self.drag = DragState::Dragging { source };
        }
    }

    /// Finish the gesture.
    ///
    /// With a distinct target, the source is removed and reinserted at the
    /// target's index, then every item is renumbered `0..N-1`. Returns the full
    /// set of updates to persist, or `None` when nothing moved.
    pub fn end_drag(&mut self) -> Option<Vec<OrderUpdate>> {
        let DragState::DraggingOver { source, target } = std::mem::take(&mut self.drag) else {
            return None;
        };

        let from = self.index_of(source)?;
        let to = self.index_of(target)?;

        let moved = self.items.remove(from);
        self.items.insert(to, moved);

        for (index, item) in self.items.iter_mut().enumerate() {
            item.set_display_order(i32::try_from(index).unwrap_or(i32::MAX));
        }

        Some(self.order_updates())
    }

    /// Current `{id, display_order}` pairs in list order
    pub fn order_updates(&self) -> Vec<OrderUpdate> {
        self.items
            .iter()
            .map(|item| OrderUpdate {
                id: item.position_id(),
                display_order: item.display_order(),
            })
            .collect()
    }

    /// Remove an item locally. Remaining items keep their `display_order` (gaps are fine).
    pub fn remove(&mut self, id: Uuid) -> Option<T> {
        let index = self.index_of(id)?;
        match self.drag {
            DragState::Dragging { source } if source == id => self.drag = DragState::Idle,
            DragState::DraggingOver { source, target } if source == id || target == id => {
                self.drag = DragState::Idle
            }
            _ => {}
        }
        Some(self.items.remove(index))
    }

    /// `end_drag`, then persist the whole scope. `None` if the drag was a no-op.
    pub async fn finish_drag(&mut self, store: &dyn OrderStore) -> Option<PersistReport> {
        let updates = self.end_drag()?;
        Some(persist_order(store, &updates).await)
    }

    /// Remove locally, then delete in the store.
    ///
    /// The local removal stands even if the store call fails.
    pub async fn delete(&mut self, id: Uuid, store: &dyn OrderStore) -> Result<Option<T>> {
        let Some(item) = self.remove(id) else {
            return Ok(None);
        };
        store.remove(id).await?;
        Ok(Some(item))
    }
}
