//! Monster AI for Ashfall.
//!
//! Implements the Idle/Chase/Attack/Return state machine and aggro target
//! selection as pure functions over plain data.

pub mod fsm;
pub mod targeting;

pub use ashfall_core as core;
