//! ECS systems that operate on the zone world each tick.
//!
//! Systems are free functions over `&mut World` plus whatever engine-owned
//! state they need. They never return errors: a reference that went stale is
//! re-validated and skipped.

pub mod auto_attack;
pub mod death;
pub mod loot;
pub mod monster_ai;
pub mod movement;
pub mod progression;
pub mod projectile;
pub mod regen;
pub mod respawn;
pub mod snapshot;
pub mod spawner;
