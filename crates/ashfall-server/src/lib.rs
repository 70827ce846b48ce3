//! Host process for Ashfall zones.
//!
//! Each zone runs its `ZoneEngine` on a dedicated thread. Session traffic
//! reaches a zone as `ZoneCommand`s over a channel; tick output goes out
//! through a [`ports::Broadcaster`] and character saves go to a background
//! save worker backed by a [`ports::CharacterStore`].

pub mod config;
pub mod error;
pub mod host;
pub mod persistence;
pub mod ports;
pub mod zone_loop;

pub use ashfall_sim as sim;
