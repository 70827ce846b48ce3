//! The set of running zones and the save worker behind them.

use std::collections::BTreeMap;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use ashfall_core::commands::PlayerCommand;
use ashfall_core::definitions::DefinitionTable;
use ashfall_core::state::CharacterSnapshot;
use ashfall_core::types::{CharacterId, NetId, Position, SessionId, ZoneId};
use ashfall_sim::ZoneEngine;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::persistence::SaveWorker;
use crate::ports::{Broadcaster, CharacterStore};
use crate::zone_loop::{self, ZoneCommand, ZoneLoop};

struct ZoneHandle {
    tx: mpsc::Sender<ZoneCommand>,
    thread: JoinHandle<()>,
    respawn_point: Position,
}

/// Owns every zone thread. Calls block only until the zone thread replies,
/// which happens at its next tick boundary.
pub struct ZoneHost {
    zones: BTreeMap<ZoneId, ZoneHandle>,
    store: Arc<dyn CharacterStore>,
    saves: SaveWorker,
}

impl ZoneHost {
    /// Start the save worker and one thread per configured zone.
    pub fn start(
        config: &ServerConfig,
        definitions: Arc<DefinitionTable>,
        broadcaster: Arc<dyn Broadcaster>,
        store: Arc<dyn CharacterStore>,
    ) -> Result<Self, ServerError> {
        let saves = SaveWorker::spawn(Arc::clone(&store))?;
        let mut host = Self {
            zones: BTreeMap::new(),
            store,
            saves,
        };

        for zone_config in &config.zones {
            if host.zones.contains_key(&zone_config.zone_id) {
                host.shutdown();
                return Err(ServerError::DuplicateZone(zone_config.zone_id));
            }
            let respawn_point = zone_config.respawn_point;
            let engine = ZoneEngine::new(zone_config.clone(), Arc::clone(&definitions));
            let zone_loop = ZoneLoop::new(
                engine,
                Arc::clone(&broadcaster),
                host.saves.sender(),
                config.autosave_interval_ticks,
            );
            match zone_loop::spawn_zone_loop(zone_loop) {
                Ok((tx, thread)) => {
                    host.zones.insert(
                        zone_config.zone_id,
                        ZoneHandle {
                            tx,
                            thread,
                            respawn_point,
                        },
                    );
                }
                Err(err) => {
                    host.shutdown();
                    return Err(err);
                }
            }
        }

        tracing::info!(zones = host.zones.len(), "zone host started");
        Ok(host)
    }

    pub fn zone_ids(&self) -> Vec<ZoneId> {
        self.zones.keys().copied().collect()
    }

    /// Load a character (or create a fresh one at the zone's respawn point)
    /// and place it in the zone.
    pub fn join(
        &self,
        zone: ZoneId,
        session: SessionId,
        character_id: CharacterId,
    ) -> Result<NetId, ServerError> {
        let handle = self.zone(zone)?;
        let character = match self.store.load(character_id) {
            Some(saved) if saved.zone == zone => saved,
            Some(saved) => CharacterSnapshot {
                zone,
                position: handle.respawn_point,
                ..saved
            },
            None => CharacterSnapshot::new_character(character_id, zone, handle.respawn_point),
        };

        let (reply, response) = mpsc::channel();
        handle
            .tx
            .send(ZoneCommand::Join {
                session,
                character,
                reply,
            })
            .map_err(|_| ServerError::ZoneClosed(zone))?;
        let net_id = response.recv().map_err(|_| ServerError::ZoneClosed(zone))??;
        Ok(net_id)
    }

    /// Remove a session's character. The returned snapshot has also been
    /// queued for saving.
    pub fn leave(
        &self,
        zone: ZoneId,
        session: SessionId,
    ) -> Result<CharacterSnapshot, ServerError> {
        let handle = self.zone(zone)?;
        let (reply, response) = mpsc::channel();
        handle
            .tx
            .send(ZoneCommand::Leave { session, reply })
            .map_err(|_| ServerError::ZoneClosed(zone))?;
        let character = response.recv().map_err(|_| ServerError::ZoneClosed(zone))??;
        Ok(character)
    }

    /// Forward a gameplay command. It applies at the zone's next tick.
    pub fn send(&self, zone: ZoneId, command: PlayerCommand) -> Result<(), ServerError> {
        self.zone(zone)?
            .tx
            .send(ZoneCommand::Player(command))
            .map_err(|_| ServerError::ZoneClosed(zone))
    }

    /// Stop every zone, then wait for the final saves to land.
    pub fn shutdown(self) {
        for handle in self.zones.values() {
            let _ = handle.tx.send(ZoneCommand::Shutdown);
        }
        for (zone, handle) in self.zones {
            drop(handle.tx);
            if handle.thread.join().is_err() {
                tracing::error!(zone, "zone thread panicked");
            }
        }
        self.saves.finish();
        tracing::info!("zone host stopped");
    }

    fn zone(&self, zone: ZoneId) -> Result<&ZoneHandle, ServerError> {
        self.zones.get(&zone).ok_or(ServerError::UnknownZone(zone))
    }
}
