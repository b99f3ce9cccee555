use sqlx::PgPool;

use crate::store::events::EventStore;
use crate::store::patch::PatchEngine;
use crate::store::queue::QueueStore;

/// Shared handler state. Stores receive their pool handle here, at
/// construction; nothing reaches for a global connection.
#[derive(Clone)]
pub struct AppState {
    pub events: EventStore,
    pub queue: QueueStore,
    pub patch: PatchEngine,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            events: EventStore::new(pool.clone()),
            queue: QueueStore::new(pool.clone()),
            patch: PatchEngine::new(pool),
        }
    }
}
