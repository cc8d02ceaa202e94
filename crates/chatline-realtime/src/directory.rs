//! Room directory backed by the store collaborator.

use std::sync::Arc;

use chatline_core::result::AppResult;
use chatline_core::traits::ChatStore;
use chatline_core::types::{RoomId, RoomRoster};

/// Resolves a room to its members and display name.
#[derive(Debug, Clone)]
pub struct RoomDirectory {
    store: Arc<dyn ChatStore>,
}

impl RoomDirectory {
    /// Creates a directory over `store`.
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self { store }
    }

    /// Members and display name of `room_id`, or `None` if the room is gone.
    pub async fn lookup(&self, room_id: RoomId) -> AppResult<Option<RoomRoster>> {
        self.store.get_room_members(room_id).await
    }
}
