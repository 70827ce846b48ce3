//! Kinematic integration system.
//!
//! Updates Position from Velocity each tick: position += velocity * dt.
//! Heading follows the direction of travel.

use hecs::World;

use ashfall_core::components::Dead;
use ashfall_core::types::{Position, Rotation, Velocity};

/// Run kinematic integration for every living entity with Position + Velocity.
pub fn run(world: &mut World, dt: f32) {
    for (_entity, (pos, vel, rotation, dead)) in world.query_mut::<(
        &mut Position,
        &Velocity,
        Option<&mut Rotation>,
        Option<&Dead>,
    )>() {
        if dead.is_some() {
            continue;
        }
        pos.x += vel.x * dt;
        pos.y += vel.y * dt;
        pos.z += vel.z * dt;

        if let (Some(rotation), Some(yaw)) = (rotation, vel.yaw()) {
            rotation.yaw = yaw;
        }
    }
}
