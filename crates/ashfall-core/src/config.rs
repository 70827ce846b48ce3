//! Per-zone configuration: world layout, lifecycle timings and combat tuning.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::types::{Position, ZoneId};

/// Balance knobs for damage resolution. Defaults come from [`crate::constants`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub min_damage: u32,
    pub variance_min: f32,
    pub variance_max: f32,
    pub crit_multiplier: u32,
    pub crit_chance_cap: f32,
    pub defense_constant: f32,
    pub death_xp_penalty_rate: f64,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            min_damage: MIN_DAMAGE,
            variance_min: DAMAGE_VARIANCE_MIN,
            variance_max: DAMAGE_VARIANCE_MAX,
            crit_multiplier: CRIT_MULTIPLIER,
            crit_chance_cap: CRIT_CHANCE_CAP,
            defense_constant: DEFENSE_CONSTANT,
            death_xp_penalty_rate: DEATH_XP_PENALTY_RATE,
        }
    }
}

/// A monster placement in the zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub type_id: u32,
    pub origin: Position,
    /// Seconds between the corpse being removed and the next spawn.
    pub respawn_delay: f32,
}

/// Everything a zone needs besides the shared definition tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    pub zone_id: ZoneId,
    /// RNG seed. Same seed and same inputs give the same simulation.
    pub seed: u64,
    /// Where dead players come back.
    pub respawn_point: Position,
    pub player_respawn_delay: f32,
    pub monster_corpse_secs: f32,
    pub loot_despawn_secs: f32,
    pub spawn_points: Vec<SpawnPoint>,
    pub tuning: CombatTuning,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            zone_id: 1,
            seed: 42,
            respawn_point: Position::default(),
            player_respawn_delay: PLAYER_RESPAWN_DELAY,
            monster_corpse_secs: MONSTER_CORPSE_SECS,
            loot_despawn_secs: LOOT_DESPAWN_SECS,
            spawn_points: Vec::new(),
            tuning: CombatTuning::default(),
        }
    }
}
