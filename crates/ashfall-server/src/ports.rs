//! Boundaries between a zone thread and the outside world.

use std::collections::HashMap;
use std::sync::Mutex;

use ashfall_core::state::CharacterSnapshot;
use ashfall_core::types::{CharacterId, ZoneId};
use ashfall_sim::TickOutput;

/// Receives every tick's output. Called on the zone thread, so
/// implementations must hand the batch off without blocking.
pub trait Broadcaster: Send + Sync {
    fn broadcast(&self, zone: ZoneId, output: &TickOutput);
}

/// Broadcaster for a host with no transport attached: logs event counts.
#[derive(Debug, Default)]
pub struct LogBroadcaster;

impl Broadcaster for LogBroadcaster {
    fn broadcast(&self, zone: ZoneId, output: &TickOutput) {
        if !output.events.is_empty() {
            tracing::trace!(
                zone,
                tick = output.tick,
                events = output.events.len(),
                entities = output.snapshot.entities.len(),
                "tick"
            );
        }
    }
}

/// Durable storage for characters. Only the save worker and the join path
/// touch it, never the tick.
pub trait CharacterStore: Send + Sync {
    fn load(&self, character_id: CharacterId) -> Option<CharacterSnapshot>;
    fn save(&self, character: &CharacterSnapshot);
}

/// Process-local store for tests and the default binary.
#[derive(Debug, Default)]
pub struct MemoryCharacterStore {
    characters: Mutex<HashMap<CharacterId, CharacterSnapshot>>,
}

impl MemoryCharacterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.characters.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CharacterStore for MemoryCharacterStore {
    fn load(&self, character_id: CharacterId) -> Option<CharacterSnapshot> {
        self.characters
            .lock()
            .ok()
            .and_then(|characters| characters.get(&character_id).cloned())
    }

    fn save(&self, character: &CharacterSnapshot) {
        if let Ok(mut characters) = self.characters.lock() {
            characters.insert(character.character_id, character.clone());
        }
    }
}
