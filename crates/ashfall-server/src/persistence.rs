//! Background save worker.
//!
//! Zone threads never touch the store directly. They send `SaveRequest`s
//! down a channel and move on; the worker writes them in arrival order.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use ashfall_core::state::CharacterSnapshot;
use ashfall_core::types::ZoneId;

use crate::error::ServerError;
use crate::ports::CharacterStore;

/// Why a batch of characters is being saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveReason {
    Autosave,
    Leave,
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub zone: ZoneId,
    pub reason: SaveReason,
    pub characters: Vec<CharacterSnapshot>,
}

/// Handle to the save thread. Dropping every sender stops it.
pub struct SaveWorker {
    tx: mpsc::Sender<SaveRequest>,
    thread: JoinHandle<()>,
}

impl SaveWorker {
    pub fn spawn(store: Arc<dyn CharacterStore>) -> Result<Self, ServerError> {
        let (tx, rx) = mpsc::channel::<SaveRequest>();
        let name = "ashfall-save-worker".to_string();
        let thread = std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || run_save_worker(rx, store.as_ref()))
            .map_err(|source| ServerError::ThreadSpawn { name, source })?;
        Ok(Self { tx, thread })
    }

    /// A sender for a zone thread.
    pub fn sender(&self) -> mpsc::Sender<SaveRequest> {
        self.tx.clone()
    }

    /// Wait for queued saves to finish. Zone threads holding senders must
    /// have exited first or this blocks until they do.
    pub fn finish(self) {
        drop(self.tx);
        if self.thread.join().is_err() {
            tracing::error!("save worker panicked");
        }
    }
}

fn run_save_worker(rx: mpsc::Receiver<SaveRequest>, store: &dyn CharacterStore) {
    while let Ok(request) = rx.recv() {
        for character in &request.characters {
            store.save(character);
        }
        tracing::debug!(
            zone = request.zone,
            reason = ?request.reason,
            count = request.characters.len(),
            "saved characters"
        );
    }
}
