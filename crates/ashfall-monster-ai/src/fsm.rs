//! Monster behavior finite state machine.
//!
//! Pure functions that compute mode transitions, steering and intent changes
//! for one monster from a snapshot of its situation. No ECS dependency.
//! Every range test compares squared distances.

use glam::Vec2;

use ashfall_core::components::AiState;
use ashfall_core::constants::{ATTACK_HYSTERESIS, RETURN_ARRIVE_RADIUS};
use ashfall_core::enums::AiMode;
use ashfall_core::types::{Position, Velocity};

/// A chasing monster aims to stop this far into its attack range, so the
/// next tick finds the target strictly inside it.
const CHASE_STOP_FRACTION: f32 = 0.8;

/// Per-monster tuning the FSM reads.
#[derive(Debug, Clone, Copy)]
pub struct MonsterBehavior {
    pub aggro_range: f32,
    pub leash_range: f32,
    pub chase_speed: f32,
    pub attack_range: f32,
}

impl MonsterBehavior {
    pub fn from_state(ai: &AiState, attack_range: f32) -> Self {
        Self {
            aggro_range: ai.aggro_range,
            leash_range: ai.leash_range,
            chase_speed: ai.chase_speed,
            attack_range,
        }
    }
}

/// What the monster knows about its target this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetStatus {
    /// No target. In `Idle` this means nobody is inside aggro range.
    None,
    /// Had a target but it is gone or dead.
    Lost,
    /// Live target at this position. In `Idle` this is the acquisition
    /// candidate chosen by [`crate::targeting::select_nearest`].
    Live(Position),
}

/// Input to the FSM for a single monster.
#[derive(Debug, Clone, Copy)]
pub struct MonsterContext {
    pub mode: AiMode,
    pub position: Position,
    pub home: Position,
    pub target: TargetStatus,
    pub behavior: MonsterBehavior,
    pub dt: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetAction {
    Keep,
    /// Lock onto the `Idle` candidate.
    Acquire,
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackToggle {
    Keep,
    Enable,
    Disable,
}

/// Output from the FSM.
#[derive(Debug, Clone, Copy)]
pub struct MonsterUpdate {
    pub new_mode: AiMode,
    pub velocity: Velocity,
    /// Yaw to face, when the monster should turn.
    pub facing: Option<f32>,
    pub target: TargetAction,
    pub auto_attack: AttackToggle,
    pub full_heal: bool,
    pub mode_changed: bool,
}

impl MonsterUpdate {
    fn stay(mode: AiMode) -> Self {
        Self {
            new_mode: mode,
            velocity: Velocity::zero(),
            facing: None,
            target: TargetAction::Keep,
            auto_attack: AttackToggle::Keep,
            full_heal: false,
            mode_changed: false,
        }
    }

    fn transition(from: AiMode, to: AiMode) -> Self {
        Self {
            new_mode: to,
            mode_changed: from != to,
            ..Self::stay(to)
        }
    }

    fn begin_return(from: AiMode) -> Self {
        Self {
            auto_attack: AttackToggle::Disable,
            ..Self::transition(from, AiMode::Return)
        }
    }
}

/// Evaluate the FSM for one monster.
pub fn evaluate(ctx: &MonsterContext) -> MonsterUpdate {
    match ctx.mode {
        AiMode::Idle => evaluate_idle(ctx),
        AiMode::Chase => evaluate_chase(ctx),
        AiMode::Attack => evaluate_attack(ctx),
        AiMode::Return => evaluate_return(ctx),
    }
}

fn evaluate_idle(ctx: &MonsterContext) -> MonsterUpdate {
    match ctx.target {
        TargetStatus::Live(_) => MonsterUpdate {
            target: TargetAction::Acquire,
            ..MonsterUpdate::transition(AiMode::Idle, AiMode::Chase)
        },
        TargetStatus::None | TargetStatus::Lost => MonsterUpdate::stay(AiMode::Idle),
    }
}

fn evaluate_chase(ctx: &MonsterContext) -> MonsterUpdate {
    let target = match ctx.target {
        TargetStatus::Live(pos) => pos,
        TargetStatus::None | TargetStatus::Lost => return MonsterUpdate::begin_return(ctx.mode),
    };

    let leash_sq = ctx.behavior.leash_range * ctx.behavior.leash_range;
    if ctx.position.distance_sq_to(&ctx.home) > leash_sq
        || target.distance_sq_to(&ctx.home) > leash_sq
    {
        return MonsterUpdate::begin_return(ctx.mode);
    }

    let range = ctx.behavior.attack_range;
    let dist_sq = ctx.position.distance_sq_to(&target);
    if dist_sq <= range * range {
        return MonsterUpdate {
            facing: ctx.position.yaw_to(&target),
            auto_attack: AttackToggle::Enable,
            ..MonsterUpdate::transition(ctx.mode, AiMode::Attack)
        };
    }

    let remaining = dist_sq.sqrt() - range * CHASE_STOP_FRACTION;
    MonsterUpdate {
        velocity: steer(&ctx.position, &target, ctx.behavior.chase_speed, remaining, ctx.dt),
        facing: ctx.position.yaw_to(&target),
        ..MonsterUpdate::stay(ctx.mode)
    }
}

fn evaluate_attack(ctx: &MonsterContext) -> MonsterUpdate {
    let target = match ctx.target {
        TargetStatus::Live(pos) => pos,
        TargetStatus::None | TargetStatus::Lost => return MonsterUpdate::begin_return(ctx.mode),
    };

    let release = ctx.behavior.attack_range * ATTACK_HYSTERESIS;
    if ctx.position.distance_sq_to(&target) > release * release {
        return MonsterUpdate {
            auto_attack: AttackToggle::Disable,
            ..MonsterUpdate::transition(ctx.mode, AiMode::Chase)
        };
    }

    MonsterUpdate {
        facing: ctx.position.yaw_to(&target),
        ..MonsterUpdate::stay(ctx.mode)
    }
}

fn evaluate_return(ctx: &MonsterContext) -> MonsterUpdate {
    let dist_sq = ctx.position.distance_sq_to(&ctx.home);
    if dist_sq <= RETURN_ARRIVE_RADIUS * RETURN_ARRIVE_RADIUS {
        return MonsterUpdate {
            target: TargetAction::Clear,
            auto_attack: AttackToggle::Disable,
            full_heal: true,
            ..MonsterUpdate::transition(ctx.mode, AiMode::Idle)
        };
    }

    MonsterUpdate {
        velocity: steer(
            &ctx.position,
            &ctx.home,
            ctx.behavior.chase_speed,
            dist_sq.sqrt(),
            ctx.dt,
        ),
        facing: ctx.position.yaw_to(&ctx.home),
        ..MonsterUpdate::stay(ctx.mode)
    }
}

/// Velocity toward `to` at `speed`, reduced so one tick covers at most
/// `max_travel` meters.
fn steer(from: &Position, to: &Position, speed: f32, max_travel: f32, dt: f32) -> Velocity {
    let delta: Vec2 = to.xz() - from.xz();
    let dist = delta.length();
    if dist <= f32::EPSILON || max_travel <= 0.0 {
        return Velocity::zero();
    }
    let capped = if dt > 0.0 {
        speed.min(max_travel / dt)
    } else {
        speed
    };
    Velocity::planar(delta / dist * capped)
}
