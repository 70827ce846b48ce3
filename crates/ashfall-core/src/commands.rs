//! Player commands sent from the session layer to a zone.
//!
//! Commands are buffered and applied at the next tick boundary; systems only
//! ever see their effects through components.

use serde::{Deserialize, Serialize};

use crate::types::{NetId, SessionId};

/// All possible player actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    /// Movement intent. The vector is clamped to unit length and scaled by
    /// the character's move speed.
    Move {
        session: SessionId,
        move_x: f32,
        move_z: f32,
    },
    /// Select a target without attacking it.
    SelectTarget { session: SessionId, net_id: NetId },
    /// Select a target and start auto-attacking it.
    RequestAttack { session: SessionId, net_id: NetId },
    /// Stop auto-attacking (target stays selected).
    StopAttack { session: SessionId },
    /// Cast a homing bolt at a target.
    CastBolt { session: SessionId, net_id: NetId },
    /// Pick up a loot drop in reach.
    PickupLoot { session: SessionId, net_id: NetId },
}

impl PlayerCommand {
    /// Session the command was issued by.
    pub fn session(&self) -> SessionId {
        match *self {
            PlayerCommand::Move { session, .. }
            | PlayerCommand::SelectTarget { session, .. }
            | PlayerCommand::RequestAttack { session, .. }
            | PlayerCommand::StopAttack { session }
            | PlayerCommand::CastBolt { session, .. }
            | PlayerCommand::PickupLoot { session, .. } => session,
        }
    }
}
