//! ECS components for hecs entities.
//!
//! Components are plain data structs with no game logic. Systems own the logic.
//! Components that point at other entities hold `hecs::Entity` handles and are
//! therefore not serialized; the network layer sees net ids instead.

use hecs::Entity;
use serde::{Deserialize, Serialize};

use crate::constants::BASE_ATTRIBUTE_VALUE;
use crate::enums::AiMode;
use crate::types::{CharacterId, NetId, Position, SessionId};

/// Marks an entity as a player character.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Player {
    pub character_id: CharacterId,
}

/// Marks an entity as a monster of a given definition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Monster {
    pub type_id: u32,
}

/// Network identity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NetworkIdentity {
    pub net_id: NetId,
    /// Owning session for player characters, `None` for world-owned entities.
    pub session: Option<SessionId>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
    /// HP regenerated per second.
    pub regen: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Mana {
    pub current: f32,
    pub max: f32,
    /// MP regenerated per second.
    pub regen: f32,
}

/// Combat-relevant stats. For players the derived fields are recomputed from
/// [`BaseAttributes`] on level-up; monsters take them from their definition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CombatStats {
    pub level: u32,
    pub attack_power: f32,
    pub defense: f32,
    /// Attacks per second.
    pub attack_speed: f32,
    /// Probability in `[0, crit cap]`.
    pub crit_chance: f32,
    pub move_speed: f32,
    /// XP accumulated toward the next level.
    pub xp: u64,
    /// Unspent attribute points.
    pub stat_points: u32,
}

/// Player base attributes, the inputs to derived stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseAttributes {
    pub strength: u32,
    pub dexterity: u32,
    pub intelligence: u32,
    pub vitality: u32,
}

impl Default for BaseAttributes {
    fn default() -> Self {
        Self {
            strength: BASE_ATTRIBUTE_VALUE,
            dexterity: BASE_ATTRIBUTE_VALUE,
            intelligence: BASE_ATTRIBUTE_VALUE,
            vitality: BASE_ATTRIBUTE_VALUE,
        }
    }
}

/// Currently selected target.
#[derive(Debug, Clone, Copy, Default)]
pub struct Target(pub Option<Entity>);

/// Auto-attack intent.
#[derive(Debug, Clone, Copy)]
pub struct AutoAttack {
    pub active: bool,
    /// Seconds until the next swing may land. Only ticks while in range.
    pub cooldown: f32,
    /// Reach in meters.
    pub range: f32,
    /// Ranged attackers fire a homing projectile at this speed instead of
    /// hitting instantly.
    pub projectile_speed: Option<f32>,
}

/// Cooldown for the bolt skill.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SkillCooldown {
    pub remaining: f32,
}

/// XP inbox. Filled by kill rewards, drained by the progression system.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PendingXp(pub u64);

/// Tag: health reached zero and the death was processed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Dead;

/// Monster brain state plus the per-instance parameters the FSM needs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AiState {
    pub mode: AiMode,
    /// Spawn origin; the leash is measured from here.
    pub home: Position,
    pub aggro_range: f32,
    pub leash_range: f32,
    pub chase_speed: f32,
}

/// In-flight homing projectile.
#[derive(Debug, Clone, Copy)]
pub struct Projectile {
    pub owner: Entity,
    /// Kept so the hit still replicates after the owner is gone.
    pub owner_net: NetId,
    pub target: Entity,
    /// Damage resolved at cast time.
    pub damage: u32,
    pub is_crit: bool,
    pub speed: f32,
    /// Seconds left before the projectile fizzles.
    pub lifetime: f32,
}

/// Item lying on the ground.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LootDrop {
    pub item_id: u32,
    pub despawn_timer: f32,
}

/// A static monster placement. Persists across its monster's lifecycle.
#[derive(Debug, Clone, Copy)]
pub struct Spawner {
    pub type_id: u32,
    pub origin: Position,
    pub respawn_delay: f32,
    pub respawn_timer: f32,
    /// The live (or corpse) monster, if any.
    pub spawned: Option<Entity>,
}
