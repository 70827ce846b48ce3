//! Player command handling.
//!
//! Commands are applied at the tick boundary before any system runs. Each one
//! is validated against the current world (session known, player alive,
//! target valid, range and cooldown satisfied) and silently dropped if it
//! fails; the client learns the outcome from the next snapshot.

use glam::Vec2;
use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use ashfall_core::commands::PlayerCommand;
use ashfall_core::components::{
    AutoAttack, CombatStats, Dead, LootDrop, Mana, NetworkIdentity, SkillCooldown, Target,
};
use ashfall_core::config::CombatTuning;
use ashfall_core::constants::*;
use ashfall_core::enums::RemovalReason;
use ashfall_core::events::SimEvent;
use ashfall_core::formulas::{calculate_physical_damage, roll_crit};
use ashfall_core::types::{NetId, Position, Velocity};

use crate::systems::auto_attack::is_valid_target;
use crate::systems::loot;
use crate::world_setup::{self, Launch};
use crate::zone_state::ZoneState;

/// Apply one player command.
pub fn apply(
    world: &mut World,
    state: &mut ZoneState,
    rng: &mut ChaCha8Rng,
    tuning: &CombatTuning,
    command: &PlayerCommand,
    events: &mut Vec<SimEvent>,
) {
    let session = command.session();
    let Some(player) = state.net.session_entity(session) else {
        tracing::debug!(session, "dropping command from unknown session");
        return;
    };

    if let PlayerCommand::StopAttack { .. } = command {
        if let Ok(mut attack) = world.get::<&mut AutoAttack>(player) {
            attack.active = false;
        }
        return;
    }

    if world.get::<&Dead>(player).is_ok() {
        return;
    }

    match *command {
        PlayerCommand::Move {
            move_x, move_z, ..
        } => set_move_intent(world, player, move_x, move_z),
        PlayerCommand::SelectTarget { net_id, .. } => {
            if let Some(target) = resolve_target(world, state, player, net_id) {
                if let Ok(mut current) = world.get::<&mut Target>(player) {
                    current.0 = Some(target);
                }
            }
        }
        PlayerCommand::RequestAttack { net_id, .. } => {
            if let Some(target) = resolve_target(world, state, player, net_id) {
                if let Ok(mut current) = world.get::<&mut Target>(player) {
                    current.0 = Some(target);
                }
                if let Ok(mut attack) = world.get::<&mut AutoAttack>(player) {
                    attack.active = true;
                }
            }
        }
        PlayerCommand::CastBolt { net_id, .. } => {
            cast_bolt(world, state, rng, tuning, player, net_id, events)
        }
        PlayerCommand::PickupLoot { net_id, .. } => {
            pickup_loot(world, state, player, net_id, events)
        }
        PlayerCommand::StopAttack { .. } => {}
    }
}

/// Clamp the input vector to unit length and scale by move speed.
fn set_move_intent(world: &mut World, player: Entity, move_x: f32, move_z: f32) {
    let mut direction = Vec2::new(move_x, move_z);
    if !direction.is_finite() {
        direction = Vec2::ZERO;
    }
    if direction.length_squared() > 1.0 {
        direction = direction.normalize();
    }

    let speed = world
        .get::<&CombatStats>(player)
        .map(|stats| stats.move_speed)
        .unwrap_or(0.0);
    if let Ok(mut vel) = world.get::<&mut Velocity>(player) {
        *vel = Velocity::planar(direction * speed);
    }
}

/// A living entity with health that is not the player itself.
fn resolve_target(
    world: &World,
    state: &ZoneState,
    player: Entity,
    net_id: NetId,
) -> Option<Entity> {
    let target = state.net.resolve(net_id)?;
    (target != player && is_valid_target(world, target)).then_some(target)
}

fn cast_bolt(
    world: &mut World,
    state: &mut ZoneState,
    rng: &mut ChaCha8Rng,
    tuning: &CombatTuning,
    caster: Entity,
    net_id: NetId,
    events: &mut Vec<SimEvent>,
) {
    let Some(target) = resolve_target(world, state, caster, net_id) else {
        return;
    };
    let (Ok(from), Ok(to)) = (
        world.get::<&Position>(caster).map(|p| *p),
        world.get::<&Position>(target).map(|p| *p),
    ) else {
        return;
    };
    if from.distance_sq_to(&to) > BOLT_RANGE * BOLT_RANGE {
        tracing::debug!(net_id, "bolt target out of range");
        return;
    }

    let ready = world
        .get::<&SkillCooldown>(caster)
        .map(|cd| cd.remaining <= 0.0)
        .unwrap_or(false);
    let affordable = world
        .get::<&Mana>(caster)
        .map(|mana| mana.current >= BOLT_MANA_COST)
        .unwrap_or(false);
    if !ready || !affordable {
        return;
    }

    let Ok((caster_net, stats)) = world
        .query_one_mut::<(&NetworkIdentity, &CombatStats)>(caster)
        .map(|(identity, stats)| (identity.net_id, *stats))
    else {
        return;
    };
    if let Ok(mut mana) = world.get::<&mut Mana>(caster) {
        mana.current -= BOLT_MANA_COST;
    }
    if let Ok(mut cd) = world.get::<&mut SkillCooldown>(caster) {
        cd.remaining = BOLT_COOLDOWN_SECS;
    }

    let defense = world
        .get::<&CombatStats>(target)
        .map(|s| s.defense)
        .unwrap_or(0.0);
    let is_crit = roll_crit(rng, stats.crit_chance, tuning);
    let damage = calculate_physical_damage(
        rng,
        stats.attack_power * BOLT_POWER_SCALE,
        defense,
        is_crit,
        tuning,
    );

    world_setup::spawn_projectile(
        world,
        state,
        Launch {
            owner: caster,
            owner_net: caster_net,
            target,
            origin: from,
            damage,
            is_crit,
            speed: BOLT_SPEED,
        },
        events,
    );
}

fn pickup_loot(
    world: &mut World,
    state: &mut ZoneState,
    player: Entity,
    net_id: NetId,
    events: &mut Vec<SimEvent>,
) {
    let Some(drop) = state.net.resolve(net_id) else {
        return;
    };
    if world.get::<&LootDrop>(drop).is_err() {
        return;
    }
    let (Ok(reach_from), Ok(drop_at)) = (
        world.get::<&Position>(player).map(|p| *p),
        world.get::<&Position>(drop).map(|p| *p),
    ) else {
        return;
    };
    if reach_from.distance_sq_to(&drop_at) > LOOT_PICKUP_RANGE * LOOT_PICKUP_RANGE {
        tracing::debug!(net_id, "loot out of reach");
        return;
    }

    let Ok(player_net) = world
        .get::<&NetworkIdentity>(player)
        .map(|identity| identity.net_id)
    else {
        return;
    };
    if let Some(item_id) =
        loot::remove_drop(world, state, drop, RemovalReason::LootPickedUp, events)
    {
        events.push(SimEvent::LootPickedUp {
            entity: player_net,
            item_id,
        });
    }
}
