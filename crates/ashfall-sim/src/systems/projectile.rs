//! Homing projectile system.
//!
//! Projectiles chase their target's current position. Arrival resolves the
//! damage rolled at launch exactly once; a target that died in flight still
//! takes the hit. Running out of lifetime or losing the target entirely
//! removes the projectile without damage.

use hecs::{Entity, World};

use ashfall_core::components::{Dead, Projectile};
use ashfall_core::constants::PROJECTILE_HIT_RADIUS;
use ashfall_core::enums::RemovalReason;
use ashfall_core::events::SimEvent;
use ashfall_core::types::Position;

use crate::systems::auto_attack::{apply_damage, Hit};
use crate::zone_state::{DespawnBuffer, ZoneState};

enum Outcome {
    Fly(Position, f32),
    Impact,
    Fizzle,
}

/// Advance every projectile. Returns how many were removed this tick.
pub fn run(
    world: &mut World,
    state: &mut ZoneState,
    dt: f32,
    despawn_buffer: &mut DespawnBuffer,
    events: &mut Vec<SimEvent>,
) -> usize {
    despawn_buffer.clear();

    let flights: Vec<(Entity, Projectile, Position)> = world
        .query::<(&Projectile, &Position)>()
        .iter()
        .map(|(entity, (projectile, pos))| (entity, *projectile, *pos))
        .collect();

    for (entity, projectile, pos) in flights {
        let target_pos = world.get::<&Position>(projectile.target).map(|p| *p);
        let target_dead = world.get::<&Dead>(projectile.target).is_ok();

        let outcome = match target_pos {
            Err(_) => Outcome::Fizzle,
            Ok(_) if target_dead => Outcome::Impact,
            Ok(target_pos) => {
                let next = pos.step_toward(&target_pos, projectile.speed * dt);
                let lifetime = projectile.lifetime - dt;
                if next.distance_sq_to(&target_pos) < PROJECTILE_HIT_RADIUS * PROJECTILE_HIT_RADIUS
                {
                    Outcome::Impact
                } else if lifetime <= 0.0 {
                    Outcome::Fizzle
                } else {
                    Outcome::Fly(next, lifetime)
                }
            }
        };

        match outcome {
            Outcome::Fly(next, lifetime) => {
                if let Ok((pos, flight)) =
                    world.query_one_mut::<(&mut Position, &mut Projectile)>(entity)
                {
                    *pos = next;
                    flight.lifetime = lifetime;
                }
            }
            Outcome::Impact => {
                apply_damage(
                    world,
                    state,
                    Hit {
                        attacker: projectile.owner,
                        attacker_net: projectile.owner_net,
                        target: projectile.target,
                        amount: projectile.damage,
                        is_crit: projectile.is_crit,
                    },
                    events,
                );
                despawn_buffer.push((entity, RemovalReason::ProjectileImpact));
            }
            Outcome::Fizzle => {
                despawn_buffer.push((entity, RemovalReason::ProjectileExpired));
            }
        }
    }

    state.flush(world, despawn_buffer, events)
}
