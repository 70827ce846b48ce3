//! Death system: tags entities whose health reached zero and settles the
//! consequences of the kill.
//!
//! Idempotent through the `Dead` tag. A monster death credits XP to its
//! killer and rolls its loot table; a player death costs XP.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use ashfall_core::components::{
    AutoAttack, CombatStats, Dead, Health, Monster, NetworkIdentity, PendingXp, Player, Target,
};
use ashfall_core::config::ZoneConfig;
use ashfall_core::definitions::DefinitionTable;
use ashfall_core::events::SimEvent;
use ashfall_core::formulas::calculate_xp_penalty_with_rate;
use ashfall_core::types::{NetId, Position, Velocity};

use crate::world_setup;
use crate::zone_state::ZoneState;

/// Process every fresh death. Returns the entities that died this tick.
pub fn run(
    world: &mut World,
    definitions: &DefinitionTable,
    config: &ZoneConfig,
    state: &mut ZoneState,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<SimEvent>,
) -> Vec<Entity> {
    let fallen: Vec<(Entity, NetId)> = world
        .query::<(&Health, &NetworkIdentity, Option<&Dead>)>()
        .iter()
        .filter(|(_, (health, _, dead))| health.current <= 0.0 && dead.is_none())
        .map(|(entity, (_, identity, _))| (entity, identity.net_id))
        .collect();

    for &(entity, net_id) in &fallen {
        let _ = world.insert_one(entity, Dead);
        if let Ok(mut vel) = world.get::<&mut Velocity>(entity) {
            *vel = Velocity::zero();
        }
        if let Ok(mut attack) = world.get::<&mut AutoAttack>(entity) {
            attack.active = false;
        }
        if let Ok(mut target) = world.get::<&mut Target>(entity) {
            target.0 = None;
        }

        let killer = state.last_attackers.remove(&entity);
        let killer_net = killer.and_then(|k| {
            world
                .get::<&NetworkIdentity>(k)
                .ok()
                .map(|identity| identity.net_id)
        });
        events.push(SimEvent::Death {
            entity: net_id,
            killer: killer_net,
        });
        tracing::debug!(net_id, killer = ?killer_net, "entity died");

        let monster_type = world.get::<&Monster>(entity).ok().map(|m| m.type_id);
        if let Some(type_id) = monster_type {
            reward_kill(world, definitions, config, state, rng, entity, type_id, killer, events);
        } else if world.get::<&Player>(entity).is_ok() {
            apply_death_penalty(world, definitions, config, entity);
        }
    }

    fallen.into_iter().map(|(entity, _)| entity).collect()
}

#[allow(clippy::too_many_arguments)]
fn reward_kill(
    world: &mut World,
    definitions: &DefinitionTable,
    config: &ZoneConfig,
    state: &mut ZoneState,
    rng: &mut ChaCha8Rng,
    corpse: Entity,
    type_id: u32,
    killer: Option<Entity>,
    events: &mut Vec<SimEvent>,
) {
    let Some(def) = definitions.monster(type_id) else {
        return;
    };

    if let Some(killer) = killer {
        let eligible =
            world.get::<&CombatStats>(killer).is_ok() && world.get::<&Dead>(killer).is_err();
        if eligible {
            let queued = match world.get::<&mut PendingXp>(killer) {
                Ok(mut inbox) => {
                    inbox.0 = inbox.0.saturating_add(def.xp_reward);
                    true
                }
                Err(_) => false,
            };
            if !queued {
                let _ = world.insert_one(killer, PendingXp(def.xp_reward));
            }
        }
    }

    let Ok(at) = world.get::<&Position>(corpse).map(|p| *p) else {
        return;
    };
    for entry in &def.loot {
        if rng.gen::<f64>() < entry.chance {
            world_setup::spawn_loot(
                world,
                state,
                entry.item_id,
                at,
                config.loot_despawn_secs,
                events,
            );
        }
    }
}

fn apply_death_penalty(
    world: &mut World,
    definitions: &DefinitionTable,
    config: &ZoneConfig,
    entity: Entity,
) {
    if let Ok(mut stats) = world.get::<&mut CombatStats>(entity) {
        let basis = definitions.penalty_basis(stats.level);
        stats.xp =
            calculate_xp_penalty_with_rate(stats.xp, basis, config.tuning.death_xp_penalty_rate);
    }
}
