//! Zone thread: runs one `ZoneEngine` at the fixed tick rate.
//!
//! The engine is created by the host and moved into the thread. Commands
//! arrive over `mpsc` and are drained at the tick boundary. Tick output goes
//! to the broadcaster and characters are saved through the save worker, so
//! the tick never waits on I/O.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use ashfall_core::commands::PlayerCommand;
use ashfall_core::constants::TICK_RATE;
use ashfall_core::error::SessionError;
use ashfall_core::state::CharacterSnapshot;
use ashfall_core::types::{NetId, SessionId};
use ashfall_sim::ZoneEngine;

use crate::error::ServerError;
use crate::persistence::{SaveReason, SaveRequest};
use crate::ports::Broadcaster;

/// Nominal duration of one tick.
pub const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Messages from the session layer to a zone thread.
#[derive(Debug)]
pub enum ZoneCommand {
    /// Place a character. The reply carries its net id.
    Join {
        session: SessionId,
        character: CharacterSnapshot,
        reply: mpsc::Sender<Result<NetId, SessionError>>,
    },
    /// Remove a session's character. The reply carries its final snapshot,
    /// which is also queued for saving.
    Leave {
        session: SessionId,
        reply: mpsc::Sender<Result<CharacterSnapshot, SessionError>>,
    },
    /// A gameplay command for the next tick.
    Player(PlayerCommand),
    /// Save everyone and stop the thread.
    Shutdown,
}

/// A zone engine plus the ports its thread talks to.
pub struct ZoneLoop {
    engine: ZoneEngine,
    broadcaster: Arc<dyn Broadcaster>,
    saves: mpsc::Sender<SaveRequest>,
    autosave_interval_ticks: u64,
}

impl ZoneLoop {
    pub fn new(
        engine: ZoneEngine,
        broadcaster: Arc<dyn Broadcaster>,
        saves: mpsc::Sender<SaveRequest>,
        autosave_interval_ticks: u64,
    ) -> Self {
        Self {
            engine,
            broadcaster,
            saves,
            autosave_interval_ticks,
        }
    }

    /// Apply everything waiting in the channel. Returns `false` once the
    /// loop should stop.
    pub fn drain(&mut self, rx: &mpsc::Receiver<ZoneCommand>) -> bool {
        loop {
            match rx.try_recv() {
                Ok(command) => {
                    if !self.handle(command) {
                        return false;
                    }
                }
                Err(mpsc::TryRecvError::Empty) => return true,
                Err(mpsc::TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn handle(&mut self, command: ZoneCommand) -> bool {
        match command {
            ZoneCommand::Join {
                session,
                character,
                reply,
            } => {
                let result = self.engine.join(session, &character);
                if let Err(err) = &result {
                    tracing::warn!(zone = self.engine.zone_id(), %err, "join rejected");
                }
                let _ = reply.send(result);
            }
            ZoneCommand::Leave { session, reply } => {
                let result = self.engine.leave(session);
                if let Ok(character) = &result {
                    self.save(SaveReason::Leave, vec![character.clone()]);
                }
                let _ = reply.send(result);
            }
            ZoneCommand::Player(command) => self.engine.queue_command(command),
            ZoneCommand::Shutdown => return false,
        }
        true
    }

    /// Advance one tick, publish it and autosave when due.
    pub fn step(&mut self) {
        let output = self.engine.tick();
        self.broadcaster.broadcast(self.engine.zone_id(), &output);

        let interval = self.autosave_interval_ticks;
        if interval > 0 && output.tick % interval == 0 {
            let characters = self.engine.character_snapshots();
            if !characters.is_empty() {
                self.save(SaveReason::Autosave, characters);
            }
        }
    }

    /// Final save of every character still in the zone.
    pub fn shutdown(&mut self) {
        let characters = self.engine.character_snapshots();
        tracing::info!(
            zone = self.engine.zone_id(),
            tick = self.engine.time().tick,
            characters = characters.len(),
            "zone stopping"
        );
        if !characters.is_empty() {
            self.save(SaveReason::Shutdown, characters);
        }
    }

    pub fn engine(&self) -> &ZoneEngine {
        &self.engine
    }

    fn save(&self, reason: SaveReason, characters: Vec<CharacterSnapshot>) {
        let request = SaveRequest {
            zone: self.engine.zone_id(),
            reason,
            characters,
        };
        if self.saves.send(request).is_err() {
            tracing::warn!(zone = self.engine.zone_id(), ?reason, "save worker is gone");
        }
    }

    /// Run until `Shutdown` or until every sender is dropped.
    ///
    /// Overruns drift: a late tick starts late, and if the loop falls more
    /// than two ticks behind the schedule is re-based instead of bursting.
    pub fn run(mut self, rx: mpsc::Receiver<ZoneCommand>) {
        tracing::info!(zone = self.engine.zone_id(), "zone started");
        let mut next_tick_time = Instant::now();

        while self.drain(&rx) {
            self.step();

            next_tick_time += TICK_DURATION;
            let now = Instant::now();
            if next_tick_time > now {
                std::thread::sleep(next_tick_time - now);
            } else if now - next_tick_time > TICK_DURATION * 2 {
                tracing::debug!(zone = self.engine.zone_id(), "tick overrun, re-basing");
                next_tick_time = now;
            }
        }

        self.shutdown();
    }
}

/// Move a zone loop onto its own named thread.
pub fn spawn_zone_loop(
    zone_loop: ZoneLoop,
) -> Result<(mpsc::Sender<ZoneCommand>, JoinHandle<()>), ServerError> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<ZoneCommand>();
    let name = format!("ashfall-zone-{}", zone_loop.engine.zone_id());

    let thread = std::thread::Builder::new()
        .name(name.clone())
        .spawn(move || zone_loop.run(cmd_rx))
        .map_err(|source| ServerError::ThreadSpawn { name, source })?;

    Ok((cmd_tx, thread))
}
