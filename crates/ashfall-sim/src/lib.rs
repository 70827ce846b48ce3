//! Zone simulation engine for Ashfall.
//!
//! Owns the hecs ECS world, runs systems at a fixed tick rate,
//! and produces events plus a sync snapshot every tick.

pub mod engine;
pub mod index;
pub mod input;
pub mod systems;
pub mod world_setup;
pub mod zone_state;

pub use ashfall_core as core;
pub use engine::{TickOutput, ZoneEngine};

#[cfg(test)]
mod tests;
