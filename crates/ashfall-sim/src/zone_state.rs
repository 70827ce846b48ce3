//! Zone-wide bookkeeping that does not belong on any single entity.
//!
//! Owned by [`crate::ZoneEngine`] and lent `&mut` to the systems that need it.
//! Every map is keyed by `hecs::Entity`; hecs bumps the generation when an id
//! is recycled, so a stale key can never alias a new entity.

use std::collections::HashMap;

use hecs::{Entity, World};

use ashfall_core::components::NetworkIdentity;
use ashfall_core::enums::RemovalReason;
use ashfall_core::events::SimEvent;

use crate::index::NetIndex;

/// Removals queued during a system pass, applied once the pass is done.
/// Owned by the engine and reused every tick.
pub type DespawnBuffer = Vec<(Entity, RemovalReason)>;

#[derive(Debug, Default)]
pub struct ZoneState {
    pub net: NetIndex,
    /// Victim -> last entity that landed a hit on it.
    pub last_attackers: HashMap<Entity, Entity>,
    /// Dead entity -> seconds until corpse removal (monsters) or respawn (players).
    pub respawn_timers: HashMap<Entity, f32>,
    /// Monster -> the spawner that owns it.
    pub spawner_of: HashMap<Entity, Entity>,
}

impl ZoneState {
    /// Drop every map entry that mentions `entity`.
    pub fn forget(&mut self, entity: Entity) {
        self.last_attackers.remove(&entity);
        self.last_attackers.retain(|_, attacker| *attacker != entity);
        self.respawn_timers.remove(&entity);
        self.spawner_of.remove(&entity);
    }

    /// Remove `entity` from the world and from every index, then announce it.
    ///
    /// Every removal path in the zone goes through here. Returns `false` if
    /// the entity was already gone.
    pub fn despawn(
        &mut self,
        world: &mut World,
        entity: Entity,
        reason: RemovalReason,
        events: &mut Vec<SimEvent>,
    ) -> bool {
        let net_id = world
            .get::<&NetworkIdentity>(entity)
            .ok()
            .map(|identity| identity.net_id);

        if world.despawn(entity).is_err() {
            return false;
        }
        self.forget(entity);

        if let Some(net_id) = net_id {
            self.net.release(net_id);
            events.push(SimEvent::EntityRemoved { net_id, reason });
        }
        true
    }

    /// Despawn everything queued in `buffer`, leaving it empty for reuse.
    /// Returns how many entities were removed.
    pub fn flush(
        &mut self,
        world: &mut World,
        buffer: &mut DespawnBuffer,
        events: &mut Vec<SimEvent>,
    ) -> usize {
        let mut removed = 0;
        for (entity, reason) in buffer.drain(..) {
            if self.despawn(world, entity, reason, events) {
                removed += 1;
            }
        }
        removed
    }
}
