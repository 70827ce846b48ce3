//! Error types for startup-time loading and session management.
//!
//! Nothing in the per-tick path returns these; systems skip bad references
//! instead of failing.

use thiserror::Error;

use crate::types::SessionId;

/// Definition tables failed to load or validate. Fatal at startup.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("failed to read definitions: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse definitions: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("monster type {0} is defined more than once")]
    DuplicateMonster(u32),

    #[error("monster type {type_id}: {reason}")]
    InvalidMonster { type_id: u32, reason: String },

    #[error("xp table is empty")]
    EmptyXpTable,

    #[error("max level must be at least 1")]
    InvalidMaxLevel,
}

/// Join/leave requests that do not match the zone's session table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session {0} already has a character in this zone")]
    AlreadyJoined(SessionId),

    #[error("session {0} is not in this zone")]
    UnknownSession(SessionId),
}
