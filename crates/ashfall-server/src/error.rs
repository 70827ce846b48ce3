//! Host-level errors. Everything here is either fatal at startup or reported
//! back to the caller of a [`crate::host::ZoneHost`] method.

use std::path::PathBuf;

use thiserror::Error;

use ashfall_core::error::{DefinitionError, SessionError};
use ashfall_core::types::ZoneId;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("zone {0} is configured more than once")]
    DuplicateZone(ZoneId),

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("no zone with id {0}")]
    UnknownZone(ZoneId),

    #[error("failed to spawn thread {name}: {source}")]
    ThreadSpawn {
        name: String,
        source: std::io::Error,
    },

    #[error("zone {0} is no longer running")]
    ZoneClosed(ZoneId),
}
