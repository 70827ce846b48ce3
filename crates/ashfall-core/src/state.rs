//! Snapshot types crossing the simulation boundary: the per-tick sync feed
//! and the persisted character shape.

use serde::{Deserialize, Serialize};

use crate::components::BaseAttributes;
use crate::enums::{AiMode, EntityKind};
use crate::types::{CharacterId, NetId, Position, SimTime, ZoneId};

/// Routine state sync for a zone, built after every tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneSnapshot {
    pub zone: ZoneId,
    pub time: SimTime,
    /// Sorted by net id.
    pub entities: Vec<EntityView>,
}

/// One replicated entity in the sync feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub net_id: NetId,
    pub kind: EntityKind,
    pub position: Position,
    pub yaw: f32,
    pub hp: f32,
    pub hp_max: f32,
    pub level: u32,
    pub ai_mode: Option<AiMode>,
    pub dead: bool,
}

/// The shape exchanged with the persistence layer on join, leave and autosave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSnapshot {
    pub character_id: CharacterId,
    pub zone: ZoneId,
    pub position: Position,
    pub level: u32,
    pub xp: u64,
    pub stat_points: u32,
    pub attributes: BaseAttributes,
    pub hp: f32,
    pub mp: f32,
}

impl CharacterSnapshot {
    /// A fresh level-1 character with default attributes. Vitals of zero mean
    /// "start full" when the character joins.
    pub fn new_character(character_id: CharacterId, zone: ZoneId, position: Position) -> Self {
        Self {
            character_id,
            zone,
            position,
            level: 1,
            xp: 0,
            stat_points: 0,
            attributes: BaseAttributes::default(),
            hp: 0.0,
            mp: 0.0,
        }
    }
}
