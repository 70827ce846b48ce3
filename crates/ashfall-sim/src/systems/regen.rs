//! Health and mana regeneration.

use hecs::World;

use ashfall_core::components::{Dead, Health, Mana};

/// Every living entity regains `regen * dt` of each pool, capped at max.
///
/// Health at zero is left alone: the death system runs after this one and
/// must still see the killing blow.
pub fn run(world: &mut World, dt: f32) {
    for (_entity, (health, dead)) in world.query_mut::<(&mut Health, Option<&Dead>)>() {
        if dead.is_none() && health.current > 0.0 {
            health.current = (health.current + health.regen * dt).min(health.max);
        }
    }
    for (_entity, (mana, dead)) in world.query_mut::<(&mut Mana, Option<&Dead>)>() {
        if dead.is_none() {
            mana.current = (mana.current + mana.regen * dt).min(mana.max).max(0.0);
        }
    }
}
