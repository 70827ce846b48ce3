//! Respawn system: clears monster corpses and brings dead players back.
//!
//! Timers live in `ZoneState::respawn_timers` and are created the first time
//! a dead entity is seen.

use hecs::{Entity, World};

use ashfall_core::components::{
    AutoAttack, Dead, Health, Mana, Monster, NetworkIdentity, Player, Spawner, Target,
};
use ashfall_core::config::ZoneConfig;
use ashfall_core::enums::RemovalReason;
use ashfall_core::events::SimEvent;
use ashfall_core::types::{Position, Velocity};

use crate::zone_state::{DespawnBuffer, ZoneState};

enum Corpse {
    Monster,
    Player,
}

pub fn run(
    world: &mut World,
    config: &ZoneConfig,
    state: &mut ZoneState,
    dt: f32,
    despawn_buffer: &mut DespawnBuffer,
    events: &mut Vec<SimEvent>,
) {
    despawn_buffer.clear();
    let dead: Vec<(Entity, Corpse)> = world
        .query::<(&Dead, Option<&Monster>, Option<&Player>)>()
        .iter()
        .filter_map(|(entity, (_, monster, player))| match (monster, player) {
            (Some(_), _) => Some((entity, Corpse::Monster)),
            (None, Some(_)) => Some((entity, Corpse::Player)),
            (None, None) => None,
        })
        .collect();

    for (entity, kind) in dead {
        let duration = match kind {
            Corpse::Monster => config.monster_corpse_secs,
            Corpse::Player => config.player_respawn_delay,
        };
        let timer = state.respawn_timers.entry(entity).or_insert(duration);
        *timer -= dt;
        if *timer > 0.0 {
            continue;
        }
        state.respawn_timers.remove(&entity);

        match kind {
            Corpse::Monster => {
                release_spawner(world, state, entity);
                despawn_buffer.push((entity, RemovalReason::CorpseExpired));
            }
            Corpse::Player => revive_player(world, config, entity, events),
        }
    }

    state.flush(world, despawn_buffer, events);
}

/// Hand the corpse's spawner back its respawn countdown.
fn release_spawner(world: &mut World, state: &mut ZoneState, corpse: Entity) {
    if let Some(spawner_entity) = state.spawner_of.remove(&corpse) {
        if let Ok(mut spawner) = world.get::<&mut Spawner>(spawner_entity) {
            spawner.spawned = None;
            spawner.respawn_timer = spawner.respawn_delay;
        }
    }
}

fn revive_player(
    world: &mut World,
    config: &ZoneConfig,
    entity: Entity,
    events: &mut Vec<SimEvent>,
) {
    let _ = world.remove_one::<Dead>(entity);

    let spot = config.respawn_point;
    if let Ok(mut pos) = world.get::<&mut Position>(entity) {
        *pos = spot;
    }
    if let Ok(mut vel) = world.get::<&mut Velocity>(entity) {
        *vel = Velocity::zero();
    }
    if let Ok(mut health) = world.get::<&mut Health>(entity) {
        health.current = health.max;
    }
    if let Ok(mut mana) = world.get::<&mut Mana>(entity) {
        mana.current = mana.max;
    }
    if let Ok(mut attack) = world.get::<&mut AutoAttack>(entity) {
        attack.active = false;
    }
    if let Ok(mut target) = world.get::<&mut Target>(entity) {
        target.0 = None;
    }

    if let Ok(identity) = world.get::<&NetworkIdentity>(entity) {
        tracing::debug!(net_id = identity.net_id, "player respawned");
        events.push(SimEvent::Respawn {
            entity: identity.net_id,
            x: spot.x,
            z: spot.z,
        });
    }
}
