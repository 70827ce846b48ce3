//! Monster AI system: runs the FSM for every living monster.
//!
//! Calls the pure FSM from ashfall-monster-ai and writes the resulting mode,
//! steering, target and auto-attack changes back to components.

use hecs::{Entity, World};

use ashfall_core::components::{
    AiState, AutoAttack, Dead, Health, Monster, NetworkIdentity, Target,
};
use ashfall_core::enums::AiMode;
use ashfall_core::types::{NetId, Position, Rotation, Velocity};

use ashfall_monster_ai::fsm::{
    evaluate, AttackToggle, MonsterBehavior, MonsterContext, MonsterUpdate, TargetAction,
    TargetStatus,
};
use ashfall_monster_ai::targeting::select_nearest;

use crate::systems::auto_attack::is_valid_target;

/// Aggro candidates, ordered by net id so ties resolve the same way every run.
pub type Candidates = Vec<((NetId, Entity), Position)>;

/// Collect every living, non-monster entity with health.
fn collect_candidates(world: &World, candidates: &mut Candidates) {
    candidates.clear();
    let mut query = world.query::<(
        &NetworkIdentity,
        &Position,
        &Health,
        Option<&Monster>,
        Option<&Dead>,
    )>();
    for (entity, (identity, pos, health, monster, dead)) in query.iter() {
        if monster.is_some() || dead.is_some() || health.current <= 0.0 {
            continue;
        }
        candidates.push(((identity.net_id, entity), *pos));
    }
    candidates.sort_unstable_by_key(|((net_id, _), _)| *net_id);
}

/// Where the current target stands, if it is still a valid one.
fn target_status(world: &World, target: Option<Entity>) -> TargetStatus {
    let Some(entity) = target else {
        return TargetStatus::None;
    };
    if !is_valid_target(world, entity) {
        return TargetStatus::Lost;
    }
    match world.get::<&Position>(entity) {
        Ok(pos) => TargetStatus::Live(*pos),
        Err(_) => TargetStatus::Lost,
    }
}

/// Run the monster AI: evaluate the FSM for each living monster, apply updates.
pub fn run(world: &mut World, dt: f32, candidates: &mut Candidates) {
    collect_candidates(world, candidates);

    // Buffer updates to keep hecs borrows short.
    let mut updates: Vec<(Entity, MonsterUpdate, Option<Entity>)> = Vec::new();
    {
        let mut query = world.query::<(
            &Monster,
            &AiState,
            &Position,
            &Target,
            &AutoAttack,
            Option<&Dead>,
        )>();
        for (entity, (_monster, ai, pos, target, attack, dead)) in query.iter() {
            if dead.is_some() {
                continue;
            }

            let mut candidate = None;
            let status = if ai.mode == AiMode::Idle {
                match select_nearest(pos, ai.aggro_range, candidates.as_slice()) {
                    Some(((_, found), found_pos)) => {
                        candidate = Some(found);
                        TargetStatus::Live(found_pos)
                    }
                    None => TargetStatus::None,
                }
            } else {
                target_status(world, target.0)
            };

            let ctx = MonsterContext {
                mode: ai.mode,
                position: *pos,
                home: ai.home,
                target: status,
                behavior: MonsterBehavior::from_state(ai, attack.range),
                dt,
            };
            updates.push((entity, evaluate(&ctx), candidate));
        }
    }

    for (entity, update, candidate) in updates {
        if update.mode_changed {
            tracing::debug!(?entity, mode = ?update.new_mode, "monster changed mode");
        }
        if let Ok(mut ai) = world.get::<&mut AiState>(entity) {
            ai.mode = update.new_mode;
        }
        if let Ok(mut vel) = world.get::<&mut Velocity>(entity) {
            *vel = update.velocity;
        }
        if let Some(yaw) = update.facing {
            if let Ok(mut rotation) = world.get::<&mut Rotation>(entity) {
                rotation.yaw = yaw;
            }
        }
        match update.target {
            TargetAction::Keep => {}
            TargetAction::Acquire => {
                if let Ok(mut target) = world.get::<&mut Target>(entity) {
                    target.0 = candidate;
                }
            }
            TargetAction::Clear => {
                if let Ok(mut target) = world.get::<&mut Target>(entity) {
                    target.0 = None;
                }
            }
        }
        match update.auto_attack {
            AttackToggle::Keep => {}
            AttackToggle::Enable => {
                if let Ok(mut attack) = world.get::<&mut AutoAttack>(entity) {
                    attack.active = true;
                }
            }
            AttackToggle::Disable => {
                if let Ok(mut attack) = world.get::<&mut AutoAttack>(entity) {
                    attack.active = false;
                }
            }
        }
        if update.full_heal {
            if let Ok(mut health) = world.get::<&mut Health>(entity) {
                health.current = health.max;
            }
        }
    }
}
