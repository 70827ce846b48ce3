//! Net id allocation and lookup tables from wire ids to hecs entities.

use std::collections::HashMap;

use hecs::Entity;

use ashfall_core::types::{NetId, SessionId};

/// Maps net ids and sessions to live entities.
///
/// Net ids are handed out from a monotonically increasing counter and never
/// reused within a zone, so a client can never confuse a respawned monster
/// with the one it replaced. The counter does not wrap: once `NetId::MAX` is
/// reached it is logged and handed out again.
#[derive(Debug)]
pub struct NetIndex {
    next_net_id: NetId,
    by_net: HashMap<NetId, Entity>,
    by_session: HashMap<SessionId, Entity>,
}

impl Default for NetIndex {
    fn default() -> Self {
        Self {
            next_net_id: 1,
            by_net: HashMap::new(),
            by_session: HashMap::new(),
        }
    }
}

impl NetIndex {
    /// An index whose next allocation is `next_net_id`.
    #[cfg(test)]
    pub(crate) fn starting_at(next_net_id: NetId) -> Self {
        Self {
            next_net_id,
            ..Self::default()
        }
    }

    /// Reserve a fresh net id. Bind it with [`NetIndex::bind`] once the entity
    /// carrying it has been spawned.
    ///
    /// The counter saturates at `NetId::MAX` instead of wrapping onto ids
    /// that may still be live.
    pub fn allocate(&mut self) -> NetId {
        let net_id = self.next_net_id;
        match self.next_net_id.checked_add(1) {
            Some(next) => self.next_net_id = next,
            None => tracing::error!(net_id, "net id space exhausted, reusing the last id"),
        }
        net_id
    }

    pub fn bind(&mut self, net_id: NetId, entity: Entity) {
        self.by_net.insert(net_id, entity);
    }

    pub fn resolve(&self, net_id: NetId) -> Option<Entity> {
        self.by_net.get(&net_id).copied()
    }

    pub fn release(&mut self, net_id: NetId) {
        self.by_net.remove(&net_id);
    }

    pub fn bind_session(&mut self, session: SessionId, entity: Entity) {
        self.by_session.insert(session, entity);
    }

    pub fn unbind_session(&mut self, session: SessionId) -> Option<Entity> {
        self.by_session.remove(&session)
    }

    pub fn session_entity(&self, session: SessionId) -> Option<Entity> {
        self.by_session.get(&session).copied()
    }

    pub fn has_session(&self, session: SessionId) -> bool {
        self.by_session.contains_key(&session)
    }

    pub fn session_count(&self) -> usize {
        self.by_session.len()
    }

    /// Number of live net ids.
    pub fn len(&self) -> usize {
        self.by_net.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_net.is_empty()
    }
}
