//! Fundamental geometric and simulation types.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Identifier used for network replication. Distinct from the hecs entity.
pub type NetId = u32;

/// Identifier of a connected client session, assigned by the transport layer.
pub type SessionId = u64;

/// Identifier of a zone (one simulation instance).
pub type ZoneId = u32;

/// Identifier of a persisted character.
pub type CharacterId = u64;

/// World-space position in meters. The ground plane is X/Z, Y is up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// World-space velocity in meters per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Facing on the ground plane, radians. 0 faces +Z.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub yaw: f32,
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Position on the ground plane.
    pub fn ground(x: f32, z: f32) -> Self {
        Self { x, y: 0.0, z }
    }

    /// Projection onto the X/Z plane.
    pub fn xz(&self) -> Vec2 {
        Vec2::new(self.x, self.z)
    }

    /// Squared planar distance. Used for every range check so no `sqrt` is needed.
    pub fn distance_sq_to(&self, other: &Position) -> f32 {
        self.xz().distance_squared(other.xz())
    }

    /// Planar distance.
    pub fn distance_to(&self, other: &Position) -> f32 {
        self.xz().distance(other.xz())
    }

    /// Yaw that faces `other`. Returns `None` when both points coincide.
    pub fn yaw_to(&self, other: &Position) -> Option<f32> {
        let delta = other.xz() - self.xz();
        if delta.length_squared() <= f32::EPSILON {
            return None;
        }
        Some(delta.x.atan2(delta.y))
    }

    /// Move toward `other` on the ground plane by at most `max_step`.
    /// Never overshoots.
    pub fn step_toward(&self, other: &Position, max_step: f32) -> Position {
        let from = self.xz();
        let delta = other.xz() - from;
        let dist = delta.length();
        if dist <= max_step || dist <= f32::EPSILON {
            return Position::new(other.x, self.y, other.z);
        }
        let next = from + delta / dist * max_step;
        Position::new(next.x, self.y, next.y)
    }
}

impl Velocity {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Planar velocity from a ground-plane vector.
    pub fn planar(v: Vec2) -> Self {
        Self {
            x: v.x,
            y: 0.0,
            z: v.y,
        }
    }

    /// Planar speed magnitude (m/s).
    pub fn speed(&self) -> f32 {
        Vec2::new(self.x, self.z).length()
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Heading of the planar component, if moving.
    pub fn yaw(&self) -> Option<f32> {
        if self.x.abs() <= f32::EPSILON && self.z.abs() <= f32::EPSILON {
            return None;
        }
        Some(self.x.atan2(self.z))
    }
}

impl SimTime {
    /// Seconds per tick at the fixed tick rate.
    pub fn dt(&self) -> f64 {
        1.0 / crate::constants::TICK_RATE as f64
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs += self.dt();
    }
}
