//! Loot lifetime and the single removal path for drops.

use hecs::{Entity, World};

use ashfall_core::components::LootDrop;
use ashfall_core::enums::RemovalReason;
use ashfall_core::events::SimEvent;

use crate::zone_state::{DespawnBuffer, ZoneState};

/// Remove a loot drop, whether it expired or was picked up.
/// Returns the dropped item id, or `None` if `entity` is not a loot drop.
pub fn remove_drop(
    world: &mut World,
    state: &mut ZoneState,
    entity: Entity,
    reason: RemovalReason,
    events: &mut Vec<SimEvent>,
) -> Option<u32> {
    let item_id = world.get::<&LootDrop>(entity).ok().map(|drop| drop.item_id)?;
    state.despawn(world, entity, reason, events);
    Some(item_id)
}

/// Count down every drop and remove the expired ones. Returns how many expired.
pub fn run(
    world: &mut World,
    state: &mut ZoneState,
    dt: f32,
    despawn_buffer: &mut DespawnBuffer,
    events: &mut Vec<SimEvent>,
) -> usize {
    despawn_buffer.clear();
    for (entity, drop) in world.query_mut::<&mut LootDrop>() {
        drop.despawn_timer -= dt;
        if drop.despawn_timer <= 0.0 {
            despawn_buffer.push((entity, RemovalReason::LootExpired));
        }
    }

    state.flush(world, despawn_buffer, events)
}
