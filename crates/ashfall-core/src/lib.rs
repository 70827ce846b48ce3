//! Core types and definitions for the Ashfall zone simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, commands, events, snapshots, configuration, definition tables
//! and the pure combat formulas. It has no runtime dependency.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod definitions;
pub mod enums;
pub mod error;
pub mod events;
pub mod formulas;
pub mod state;
pub mod types;
