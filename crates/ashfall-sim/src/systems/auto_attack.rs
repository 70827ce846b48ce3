//! Auto-attack system and the shared damage path.
//!
//! Swing cooldowns only tick while the target is in reach. Melee swings land
//! immediately; attackers with a projectile speed launch a homing projectile
//! that carries the damage rolled here.

use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use ashfall_core::components::{
    AutoAttack, CombatStats, Dead, Health, NetworkIdentity, SkillCooldown, Target,
};
use ashfall_core::config::CombatTuning;
use ashfall_core::events::SimEvent;
use ashfall_core::formulas::{attack_cooldown, calculate_physical_damage, roll_crit};
use ashfall_core::types::{NetId, Position, Rotation};

use crate::world_setup::{self, Launch};
use crate::zone_state::ZoneState;

/// One resolved hit, ready to be applied.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub attacker: Entity,
    pub attacker_net: NetId,
    pub target: Entity,
    pub amount: u32,
    pub is_crit: bool,
}

/// Subtract a hit from the target's health (floored at zero), remember the
/// attacker for kill credit if the target was still standing and emit
/// `Damage`.
///
/// Returns `false` if the target has no health to damage.
pub fn apply_damage(
    world: &mut World,
    state: &mut ZoneState,
    hit: Hit,
    events: &mut Vec<SimEvent>,
) -> bool {
    let (was_standing, remaining_hp) = match world.get::<&mut Health>(hit.target) {
        Ok(mut health) => {
            let was_standing = health.current > 0.0;
            health.current = (health.current - hit.amount as f32).max(0.0);
            (was_standing, health.current)
        }
        Err(_) => return false,
    };
    let Ok(target_net) = world
        .get::<&NetworkIdentity>(hit.target)
        .map(|identity| identity.net_id)
    else {
        return false;
    };

    // Credit stays with whoever took the target to zero.
    let target_alive = was_standing && world.get::<&Dead>(hit.target).is_err();
    if target_alive && world.contains(hit.attacker) {
        state.last_attackers.insert(hit.target, hit.attacker);
    }
    events.push(SimEvent::Damage {
        attacker: hit.attacker_net,
        target: target_net,
        amount: hit.amount,
        is_crit: hit.is_crit,
        remaining_hp,
    });
    true
}

/// A target worth swinging at: exists, has health left and is not yet
/// tagged dead.
pub fn is_valid_target(world: &World, target: Entity) -> bool {
    let standing = world
        .get::<&Health>(target)
        .map(|health| health.current > 0.0)
        .unwrap_or(false);
    standing && world.get::<&Dead>(target).is_err()
}

/// Turn auto-attack off and drop the target.
pub fn disengage(world: &mut World, entity: Entity) {
    if let Ok(mut attack) = world.get::<&mut AutoAttack>(entity) {
        attack.active = false;
    }
    if let Ok(mut target) = world.get::<&mut Target>(entity) {
        target.0 = None;
    }
}

struct Attacker {
    entity: Entity,
    net_id: NetId,
    target: Option<Entity>,
    attack: AutoAttack,
    position: Position,
    stats: CombatStats,
}

/// Run auto-attacks for every living attacker with auto-attack enabled.
/// Also counts down skill cooldowns.
pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    tuning: &CombatTuning,
    state: &mut ZoneState,
    dt: f32,
    events: &mut Vec<SimEvent>,
) {
    for (_entity, cooldown) in world.query_mut::<&mut SkillCooldown>() {
        cooldown.remaining = (cooldown.remaining - dt).max(0.0);
    }

    let attackers: Vec<Attacker> = {
        let mut query = world.query::<(
            &AutoAttack,
            &Target,
            &Position,
            &CombatStats,
            &NetworkIdentity,
            Option<&Dead>,
        )>();
        query
            .iter()
            .filter(|(_, (attack, _, _, _, _, dead))| attack.active && dead.is_none())
            .map(|(entity, (attack, target, pos, stats, identity, _))| Attacker {
                entity,
                net_id: identity.net_id,
                target: target.0,
                attack: *attack,
                position: *pos,
                stats: *stats,
            })
            .collect()
    };

    for attacker in attackers {
        let Some(target) = attacker.target.filter(|t| is_valid_target(world, *t)) else {
            disengage(world, attacker.entity);
            continue;
        };
        let Ok(target_pos) = world.get::<&Position>(target).map(|pos| *pos) else {
            disengage(world, attacker.entity);
            continue;
        };

        let range = attacker.attack.range;
        if attacker.position.distance_sq_to(&target_pos) > range * range {
            continue;
        }

        let remaining = attacker.attack.cooldown - dt;
        let swings = remaining <= 0.0;
        let next_cooldown = if swings {
            attack_cooldown(attacker.stats.attack_speed)
        } else {
            remaining
        };
        if let Ok(mut attack) = world.get::<&mut AutoAttack>(attacker.entity) {
            attack.cooldown = next_cooldown;
        }
        if !swings {
            continue;
        }

        if let (Ok(mut rotation), Some(yaw)) = (
            world.get::<&mut Rotation>(attacker.entity),
            attacker.position.yaw_to(&target_pos),
        ) {
            rotation.yaw = yaw;
        }

        let defense = world
            .get::<&CombatStats>(target)
            .map(|stats| stats.defense)
            .unwrap_or(0.0);
        let is_crit = roll_crit(rng, attacker.stats.crit_chance, tuning);
        let damage =
            calculate_physical_damage(rng, attacker.stats.attack_power, defense, is_crit, tuning);

        match attacker.attack.projectile_speed {
            Some(speed) => {
                world_setup::spawn_projectile(
                    world,
                    state,
                    Launch {
                        owner: attacker.entity,
                        owner_net: attacker.net_id,
                        target,
                        origin: attacker.position,
                        damage,
                        is_crit,
                        speed,
                    },
                    events,
                );
            }
            None => {
                apply_damage(
                    world,
                    state,
                    Hit {
                        attacker: attacker.entity,
                        attacker_net: attacker.net_id,
                        target,
                        amount: damage,
                        is_crit,
                    },
                    events,
                );
            }
        }
    }
}
