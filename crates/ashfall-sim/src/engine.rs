//! Zone engine: the tick driver for one zone.
//!
//! `ZoneEngine` owns the hecs world, the zone bookkeeping and the seeded RNG.
//! It buffers player commands, applies them at the tick boundary, runs every
//! system in a fixed order and returns the tick's events with a sync
//! snapshot. Headless and deterministic: the same seed and the same inputs
//! produce the same outputs.

use std::collections::VecDeque;
use std::sync::Arc;

use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use ashfall_core::commands::PlayerCommand;
use ashfall_core::components::{
    BaseAttributes, CombatStats, Health, Mana, NetworkIdentity, Player,
};
use ashfall_core::config::ZoneConfig;
use ashfall_core::constants::DT;
use ashfall_core::definitions::DefinitionTable;
use ashfall_core::enums::RemovalReason;
use ashfall_core::error::SessionError;
use ashfall_core::events::SimEvent;
use ashfall_core::state::{CharacterSnapshot, ZoneSnapshot};
use ashfall_core::types::{NetId, Position, SessionId, SimTime, ZoneId};

use crate::input;
use crate::systems;
use crate::systems::monster_ai::Candidates;
use crate::world_setup;
use crate::zone_state::{DespawnBuffer, ZoneState};

/// Everything one tick produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickOutput {
    /// Tick number after advancing.
    pub tick: u64,
    pub events: Vec<SimEvent>,
    pub snapshot: ZoneSnapshot,
}

/// The simulation for one zone.
pub struct ZoneEngine {
    config: ZoneConfig,
    definitions: Arc<DefinitionTable>,
    world: World,
    time: SimTime,
    rng: ChaCha8Rng,
    state: ZoneState,
    command_queue: VecDeque<PlayerCommand>,
    events: Vec<SimEvent>,
    candidates: Candidates,
    despawn_buffer: DespawnBuffer,
}

impl ZoneEngine {
    /// Create a zone and place its spawners. Monsters appear on the first tick.
    pub fn new(config: ZoneConfig, definitions: Arc<DefinitionTable>) -> Self {
        let mut world = World::new();
        for point in &config.spawn_points {
            if definitions.monster(point.type_id).is_none() {
                tracing::warn!(
                    zone = config.zone_id,
                    type_id = point.type_id,
                    "spawn point references unknown monster type"
                );
            }
            world_setup::spawn_spawner(&mut world, point);
        }

        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            definitions,
            world,
            time: SimTime::default(),
            state: ZoneState::default(),
            command_queue: VecDeque::new(),
            events: Vec::new(),
            candidates: Vec::new(),
            despawn_buffer: Vec::new(),
        }
    }

    /// Place a character in the zone. Its `EntityAppeared` event is reported
    /// with the next tick.
    pub fn join(
        &mut self,
        session: SessionId,
        character: &CharacterSnapshot,
    ) -> Result<NetId, SessionError> {
        if self.state.net.has_session(session) {
            return Err(SessionError::AlreadyJoined(session));
        }
        let entity = world_setup::spawn_player(
            &mut self.world,
            &mut self.state,
            session,
            character,
            &self.definitions,
            &self.config.tuning,
            &mut self.events,
        );
        let net_id = self
            .world
            .get::<&NetworkIdentity>(entity)
            .map(|identity| identity.net_id)
            .unwrap_or_default();
        tracing::info!(
            zone = self.config.zone_id,
            session,
            character_id = character.character_id,
            net_id,
            "character joined"
        );
        Ok(net_id)
    }

    /// Remove a session's character and return its final snapshot.
    ///
    /// The entity and every map entry that mentions it are gone before the
    /// next tick. Commands still queued for the session are dropped then.
    pub fn leave(&mut self, session: SessionId) -> Result<CharacterSnapshot, SessionError> {
        let snapshot = self
            .character_snapshot(session)
            .ok_or(SessionError::UnknownSession(session))?;
        if let Some(entity) = self.state.net.unbind_session(session) {
            self.state.despawn(
                &mut self.world,
                entity,
                RemovalReason::SessionLeft,
                &mut self.events,
            );
        }
        tracing::info!(zone = self.config.zone_id, session, "character left");
        Ok(snapshot)
    }

    /// Current persisted shape of a session's character.
    pub fn character_snapshot(&self, session: SessionId) -> Option<CharacterSnapshot> {
        let entity = self.state.net.session_entity(session)?;
        let player = *self.world.get::<&Player>(entity).ok()?;
        let position = *self.world.get::<&Position>(entity).ok()?;
        let stats = *self.world.get::<&CombatStats>(entity).ok()?;
        let attributes = self
            .world
            .get::<&BaseAttributes>(entity)
            .map(|a| *a)
            .unwrap_or_default();
        let hp = self
            .world
            .get::<&Health>(entity)
            .map(|h| h.current)
            .unwrap_or(0.0);
        let mp = self
            .world
            .get::<&Mana>(entity)
            .map(|m| m.current)
            .unwrap_or(0.0);

        Some(CharacterSnapshot {
            character_id: player.character_id,
            zone: self.config.zone_id,
            position,
            level: stats.level,
            xp: stats.xp,
            stat_points: stats.stat_points,
            attributes,
            hp,
            mp,
        })
    }

    /// Snapshots of every character in the zone, for autosave.
    pub fn character_snapshots(&self) -> Vec<CharacterSnapshot> {
        let mut sessions: Vec<SessionId> = self
            .world
            .query::<(&Player, &NetworkIdentity)>()
            .iter()
            .filter_map(|(_, (_, identity))| identity.session)
            .collect();
        sessions.sort_unstable();
        sessions
            .into_iter()
            .filter_map(|session| self.character_snapshot(session))
            .collect()
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the zone by one tick.
    pub fn tick(&mut self) -> TickOutput {
        self.process_commands();
        self.run_systems();
        self.time.advance();

        // Draining keeps the accumulator's capacity for the next tick.
        TickOutput {
            tick: self.time.tick,
            events: self.events.drain(..).collect(),
            snapshot: systems::snapshot::build_snapshot(
                &self.world,
                self.config.zone_id,
                self.time,
            ),
        }
    }

    pub fn zone_id(&self) -> ZoneId {
        self.config.zone_id
    }

    pub fn config(&self) -> &ZoneConfig {
        &self.config
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Zone bookkeeping, read-only.
    pub fn state(&self) -> &ZoneState {
        &self.state
    }

    pub fn player_count(&self) -> usize {
        self.state.net.session_count()
    }

    /// Net id of a session's character.
    pub fn session_net_id(&self, session: SessionId) -> Option<NetId> {
        let entity = self.state.net.session_entity(session)?;
        self.world
            .get::<&NetworkIdentity>(entity)
            .ok()
            .map(|identity| identity.net_id)
    }

    /// Entity of a session's character.
    pub fn session_entity(&self, session: SessionId) -> Option<hecs::Entity> {
        self.state.net.session_entity(session)
    }

    /// Mutable world access for tests that need to stage a situation.
    #[cfg(test)]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Launch a projectile directly (for testing).
    #[cfg(test)]
    pub fn spawn_test_projectile(&mut self, launch: world_setup::Launch) -> hecs::Entity {
        world_setup::spawn_projectile(&mut self.world, &mut self.state, launch, &mut self.events)
    }

    /// Drop loot on the ground directly (for testing).
    #[cfg(test)]
    pub fn spawn_test_loot(&mut self, item_id: u32, at: Position) -> hecs::Entity {
        world_setup::spawn_loot(
            &mut self.world,
            &mut self.state,
            item_id,
            at,
            self.config.loot_despawn_secs,
            &mut self.events,
        )
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            input::apply(
                &mut self.world,
                &mut self.state,
                &mut self.rng,
                &self.config.tuning,
                &command,
                &mut self.events,
            );
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        // 1. Spawners
        let spawned = systems::spawner::run(
            &mut self.world,
            &self.definitions,
            &mut self.state,
            DT,
            &mut self.events,
        );
        // 2. Monster AI
        systems::monster_ai::run(&mut self.world, DT, &mut self.candidates);
        // 3. Movement integration
        systems::movement::run(&mut self.world, DT);
        // 4. Auto-attack (and skill cooldowns)
        systems::auto_attack::run(
            &mut self.world,
            &mut self.rng,
            &self.config.tuning,
            &mut self.state,
            DT,
            &mut self.events,
        );
        // 5. Projectiles
        let resolved = systems::projectile::run(
            &mut self.world,
            &mut self.state,
            DT,
            &mut self.despawn_buffer,
            &mut self.events,
        );
        // 6. Regeneration
        systems::regen::run(&mut self.world, DT);
        // 7. Death
        let fallen = systems::death::run(
            &mut self.world,
            &self.definitions,
            &self.config,
            &mut self.state,
            &mut self.rng,
            &mut self.events,
        );
        // 8. Respawn / corpse removal
        systems::respawn::run(
            &mut self.world,
            &self.config,
            &mut self.state,
            DT,
            &mut self.despawn_buffer,
            &mut self.events,
        );
        // 9. XP and level-up
        systems::progression::run(
            &mut self.world,
            &self.definitions,
            &self.config.tuning,
            &mut self.events,
        );
        // 10. Loot despawn
        let expired_loot = systems::loot::run(
            &mut self.world,
            &mut self.state,
            DT,
            &mut self.despawn_buffer,
            &mut self.events,
        );

        if !spawned.is_empty() || resolved > 0 || !fallen.is_empty() || expired_loot > 0 {
            tracing::trace!(
                zone = self.config.zone_id,
                tick = self.time.tick,
                spawned = spawned.len(),
                projectiles_resolved = resolved,
                deaths = fallen.len(),
                loot_expired = expired_loot,
                replicated = self.state.net.len(),
                "tick summary"
            );
        }
    }
}
