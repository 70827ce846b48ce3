//! Snapshot system: builds the routine sync feed from ECS state.
//!
//! Read-only. Entities appear in net id order so two identical worlds always
//! serialize identically.

use hecs::World;

use ashfall_core::components::{
    AiState, CombatStats, Dead, Health, LootDrop, Monster, NetworkIdentity, Player, Projectile,
};
use ashfall_core::enums::EntityKind;
use ashfall_core::state::{EntityView, ZoneSnapshot};
use ashfall_core::types::{Position, Rotation, SimTime, ZoneId};

pub fn build_snapshot(world: &World, zone: ZoneId, time: SimTime) -> ZoneSnapshot {
    let mut query = world.query::<(
        &NetworkIdentity,
        &Position,
        Option<&Rotation>,
        Option<&Health>,
        Option<&CombatStats>,
        Option<&AiState>,
        Option<&Dead>,
        Option<&Player>,
        Option<&Monster>,
        Option<&Projectile>,
        Option<&LootDrop>,
    )>();

    let mut entities: Vec<EntityView> = Vec::new();
    for (_entity, components) in query.iter() {
        let (identity, pos, rotation, health, stats, ai, dead, player, monster, projectile, loot) =
            components;
        let kind = if player.is_some() {
            EntityKind::Player
        } else if monster.is_some() {
            EntityKind::Monster
        } else if projectile.is_some() {
            EntityKind::Projectile
        } else if loot.is_some() {
            EntityKind::Loot
        } else {
            continue;
        };

        entities.push(EntityView {
            net_id: identity.net_id,
            kind,
            position: *pos,
            yaw: rotation.map(|r| r.yaw).unwrap_or(0.0),
            hp: health.map(|h| h.current).unwrap_or(0.0),
            hp_max: health.map(|h| h.max).unwrap_or(0.0),
            level: stats.map(|s| s.level).unwrap_or(0),
            ai_mode: ai.map(|a| a.mode),
            dead: dead.is_some(),
        });
    }

    entities.sort_unstable_by_key(|view| view.net_id);

    ZoneSnapshot {
        zone,
        time,
        entities,
    }
}
