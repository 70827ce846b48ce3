//! Static definition tables: monster types and the XP curve.
//!
//! Loaded once at startup and shared read-only by every zone.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_LEVEL, STAT_POINTS_PER_LEVEL, UNREACHABLE_XP};
use crate::error::DefinitionError;

fn default_crit_chance() -> f32 {
    0.05
}

fn default_attack_range() -> f32 {
    2.0
}

fn default_stat_points() -> u32 {
    STAT_POINTS_PER_LEVEL
}

fn default_max_level() -> u32 {
    MAX_LEVEL
}

/// One roll on a monster's loot table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub item_id: u32,
    /// Drop probability in `[0, 1]`.
    pub chance: f64,
}

/// A monster type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterDefinition {
    pub type_id: u32,
    pub name: String,
    pub level: u32,
    pub hp: f32,
    #[serde(default)]
    pub hp_regen: f32,
    pub attack: f32,
    pub defense: f32,
    /// Attacks per second.
    pub attack_speed: f32,
    #[serde(default = "default_crit_chance")]
    pub crit_chance: f32,
    /// Chase and return speed (m/s).
    pub move_speed: f32,
    #[serde(default = "default_attack_range")]
    pub attack_range: f32,
    pub aggro_range: f32,
    pub leash_range: f32,
    /// Set for ranged attackers.
    #[serde(default)]
    pub projectile_speed: Option<f32>,
    pub xp_reward: u64,
    #[serde(default)]
    pub loot: Vec<LootEntry>,
}

/// On-disk shape of the definition tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionFile {
    pub monsters: Vec<MonsterDefinition>,
    /// `xp_table[i]` is the XP needed to go from level `i + 1` to `i + 2`.
    pub xp_table: Vec<u64>,
    #[serde(default = "default_stat_points")]
    pub stat_points_per_level: u32,
    #[serde(default = "default_max_level")]
    pub max_level: u32,
}

/// Validated, indexed definition tables.
#[derive(Debug, Clone)]
pub struct DefinitionTable {
    monsters: HashMap<u32, MonsterDefinition>,
    xp_table: Vec<u64>,
    stat_points_per_level: u32,
    max_level: u32,
}

impl DefinitionTable {
    /// Validate and index a parsed definition file.
    pub fn from_file(file: DefinitionFile) -> Result<Self, DefinitionError> {
        if file.xp_table.is_empty() {
            return Err(DefinitionError::EmptyXpTable);
        }
        if file.max_level == 0 {
            return Err(DefinitionError::InvalidMaxLevel);
        }

        let mut monsters = HashMap::with_capacity(file.monsters.len());
        for def in file.monsters {
            validate_monster(&def)?;
            let type_id = def.type_id;
            if monsters.insert(type_id, def).is_some() {
                return Err(DefinitionError::DuplicateMonster(type_id));
            }
        }

        Ok(Self {
            monsters,
            xp_table: file.xp_table,
            stat_points_per_level: file.stat_points_per_level,
            max_level: file.max_level,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, DefinitionError> {
        let file: DefinitionFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    /// Read and validate a JSON definition file.
    pub fn load(path: &Path) -> Result<Self, DefinitionError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Built-in tables used when no definition file is configured.
    pub fn builtin() -> Self {
        let monsters = builtin_monsters()
            .into_iter()
            .map(|def| (def.type_id, def))
            .collect();
        Self {
            monsters,
            xp_table: builtin_xp_table(),
            stat_points_per_level: STAT_POINTS_PER_LEVEL,
            max_level: MAX_LEVEL,
        }
    }

    pub fn monster(&self, type_id: u32) -> Option<&MonsterDefinition> {
        self.monsters.get(&type_id)
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    pub fn stat_points_per_level(&self) -> u32 {
        self.stat_points_per_level
    }

    /// XP needed to leave `level`. Past the end of the table, or at the level
    /// cap, the requirement is [`UNREACHABLE_XP`].
    pub fn xp_to_level(&self, level: u32) -> u64 {
        if level == 0 || level >= self.max_level {
            return UNREACHABLE_XP;
        }
        self.xp_table
            .get(level as usize - 1)
            .copied()
            .unwrap_or(UNREACHABLE_XP)
    }

    /// Requirement the death penalty is measured against. Capped characters
    /// use the last defined step instead of the unreachable sentinel.
    pub fn penalty_basis(&self, level: u32) -> u64 {
        match self.xp_to_level(level) {
            UNREACHABLE_XP => self.xp_table.last().copied().unwrap_or(0),
            requirement => requirement,
        }
    }
}

fn validate_monster(def: &MonsterDefinition) -> Result<(), DefinitionError> {
    let invalid = |reason: &str| DefinitionError::InvalidMonster {
        type_id: def.type_id,
        reason: reason.to_string(),
    };

    if def.hp.is_nan() || def.hp <= 0.0 {
        return Err(invalid("hp must be positive"));
    }
    if def.attack < 0.0 || def.defense < 0.0 || def.attack_speed < 0.0 {
        return Err(invalid("combat stats must not be negative"));
    }
    if def.move_speed < 0.0 || def.attack_range <= 0.0 {
        return Err(invalid("speeds and attack range must be positive"));
    }
    if def.aggro_range < 0.0 || def.leash_range < def.aggro_range {
        return Err(invalid("leash range must cover the aggro range"));
    }
    if matches!(def.projectile_speed, Some(speed) if speed <= 0.0) {
        return Err(invalid("projectile speed must be positive"));
    }
    if def.loot.iter().any(|e| !(0.0..=1.0).contains(&e.chance)) {
        return Err(invalid("loot chance must be within [0, 1]"));
    }
    Ok(())
}

/// `round(100 * level^1.5)` for every level below the cap.
fn builtin_xp_table() -> Vec<u64> {
    (1..MAX_LEVEL)
        .map(|level| (100.0 * (level as f64).powf(1.5)).round() as u64)
        .collect()
}

fn builtin_monsters() -> Vec<MonsterDefinition> {
    vec![
        MonsterDefinition {
            type_id: 1,
            name: "Forest Wolf".into(),
            level: 2,
            hp: 80.0,
            hp_regen: 0.5,
            attack: 12.0,
            defense: 5.0,
            attack_speed: 1.2,
            crit_chance: 0.05,
            move_speed: 4.5,
            attack_range: 2.0,
            aggro_range: 10.0,
            leash_range: 25.0,
            projectile_speed: None,
            xp_reward: 40,
            loot: vec![LootEntry {
                item_id: 1001,
                chance: 0.5,
            }],
        },
        MonsterDefinition {
            type_id: 2,
            name: "Goblin Archer".into(),
            level: 4,
            hp: 110.0,
            hp_regen: 0.5,
            attack: 16.0,
            defense: 8.0,
            attack_speed: 0.8,
            crit_chance: 0.1,
            move_speed: 3.5,
            attack_range: 12.0,
            aggro_range: 14.0,
            leash_range: 30.0,
            projectile_speed: Some(14.0),
            xp_reward: 75,
            loot: vec![
                LootEntry {
                    item_id: 1002,
                    chance: 0.35,
                },
                LootEntry {
                    item_id: 2001,
                    chance: 0.05,
                },
            ],
        },
        MonsterDefinition {
            type_id: 3,
            name: "Cave Troll".into(),
            level: 8,
            hp: 420.0,
            hp_regen: 2.0,
            attack: 38.0,
            defense: 30.0,
            attack_speed: 0.6,
            crit_chance: 0.05,
            move_speed: 3.0,
            attack_range: 3.0,
            aggro_range: 8.0,
            leash_range: 20.0,
            projectile_speed: None,
            xp_reward: 260,
            loot: vec![LootEntry {
                item_id: 3001,
                chance: 0.8,
            }],
        },
    ]
}
