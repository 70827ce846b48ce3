//! Spawner system: brings monsters back once their respawn delay has run out.

use hecs::{Entity, World};

use ashfall_core::components::Spawner;
use ashfall_core::definitions::DefinitionTable;
use ashfall_core::events::SimEvent;

use crate::world_setup;
use crate::zone_state::ZoneState;

/// Tick every empty spawner and spawn monsters for the ones that are due.
/// Returns the new monster entities.
pub fn run(
    world: &mut World,
    definitions: &DefinitionTable,
    state: &mut ZoneState,
    dt: f32,
    events: &mut Vec<SimEvent>,
) -> Vec<Entity> {
    let mut due: Vec<Entity> = Vec::new();
    for (entity, spawner) in world.query_mut::<&mut Spawner>() {
        if spawner.spawned.is_some() {
            continue;
        }
        spawner.respawn_timer -= dt;
        if spawner.respawn_timer <= 0.0 {
            due.push(entity);
        }
    }

    let mut spawned = Vec::with_capacity(due.len());
    for spawner_entity in due {
        let (type_id, origin) = match world.get::<&Spawner>(spawner_entity) {
            Ok(spawner) => (spawner.type_id, spawner.origin),
            Err(_) => continue,
        };

        let Some(def) = definitions.monster(type_id) else {
            // The engine warns once at startup; retry on the normal cadence.
            if let Ok(mut spawner) = world.get::<&mut Spawner>(spawner_entity) {
                spawner.respawn_timer = spawner.respawn_delay;
            }
            tracing::debug!(type_id, "spawner references unknown monster type, skipping");
            continue;
        };

        let monster = world_setup::spawn_monster(world, state, def, origin, events);
        if let Ok(mut spawner) = world.get::<&mut Spawner>(spawner_entity) {
            spawner.spawned = Some(monster);
        }
        state.spawner_of.insert(monster, spawner_entity);
        tracing::debug!(type_id, name = %def.name, "monster spawned");
        spawned.push(monster);
    }
    spawned
}
