//! Discrete events emitted by the simulation for replication.
//!
//! Every id in an event is a net id. Routine position/health sync goes
//! through [`crate::state::ZoneSnapshot`] instead.

use serde::{Deserialize, Serialize};

use crate::enums::{EntityKind, RemovalReason};
use crate::types::NetId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// A hit landed.
    Damage {
        attacker: NetId,
        target: NetId,
        amount: u32,
        is_crit: bool,
        remaining_hp: f32,
    },
    /// Health reached zero. `killer` is the last entity to land a hit.
    Death {
        entity: NetId,
        killer: Option<NetId>,
    },
    /// A player came back at the respawn point.
    Respawn { entity: NetId, x: f32, z: f32 },
    /// XP was credited, whether or not it caused a level-up.
    XpGain {
        entity: NetId,
        amount: u64,
        total_xp: u64,
        xp_to_level: u64,
    },
    LevelUp {
        entity: NetId,
        new_level: u32,
        stat_points: u32,
        hp_max: f32,
        mp_max: f32,
    },
    /// An entity the client has not seen before entered the world.
    EntityAppeared {
        net_id: NetId,
        kind: EntityKind,
        x: f32,
        z: f32,
    },
    EntityRemoved {
        net_id: NetId,
        reason: RemovalReason,
    },
    /// Loot went into a player's inventory. Inventory itself lives outside
    /// the simulation.
    LootPickedUp { entity: NetId, item_id: u32 },
}
