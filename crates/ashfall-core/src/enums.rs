//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Monster behavior state. A monster always carries exactly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiMode {
    /// Standing at home, scanning for targets.
    #[default]
    Idle,
    /// Moving toward an acquired target.
    Chase,
    /// In range and swinging.
    Attack,
    /// Walking back to the spawn origin; ignores aggro.
    Return,
}

/// What an entity is, as far as the network layer is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Monster,
    Projectile,
    Loot,
}

/// Why an entity left the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalReason {
    /// Corpse timer elapsed.
    CorpseExpired,
    /// Projectile hit its target.
    ProjectileImpact,
    /// Projectile ran out of lifetime or lost its target.
    ProjectileExpired,
    /// Loot timer elapsed.
    LootExpired,
    /// Loot was picked up by a player.
    LootPickedUp,
    /// The owning session left the zone.
    SessionLeft,
}
