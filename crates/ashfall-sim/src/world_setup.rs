//! Entity spawn factories.
//!
//! Every replicated entity gets a fresh net id here and is announced with an
//! `EntityAppeared` event.

use hecs::{Entity, World};

use ashfall_core::components::*;
use ashfall_core::config::{CombatTuning, SpawnPoint};
use ashfall_core::constants::*;
use ashfall_core::definitions::{DefinitionTable, MonsterDefinition};
use ashfall_core::enums::{AiMode, EntityKind};
use ashfall_core::events::SimEvent;
use ashfall_core::formulas::derive_stats;
use ashfall_core::state::CharacterSnapshot;
use ashfall_core::types::{NetId, Position, Rotation, SessionId, Velocity};

use crate::zone_state::ZoneState;

fn announce(events: &mut Vec<SimEvent>, net_id: NetId, kind: EntityKind, pos: &Position) {
    events.push(SimEvent::EntityAppeared {
        net_id,
        kind,
        x: pos.x,
        z: pos.z,
    });
}

/// Place a spawner. Its timer starts expired so the first tick spawns.
pub fn spawn_spawner(world: &mut World, point: &SpawnPoint) -> Entity {
    world.spawn((Spawner {
        type_id: point.type_id,
        origin: point.origin,
        respawn_delay: point.respawn_delay,
        respawn_timer: 0.0,
        spawned: None,
    },))
}

/// Spawn a monster of type `def` at `origin` in `Idle`.
pub fn spawn_monster(
    world: &mut World,
    state: &mut ZoneState,
    def: &MonsterDefinition,
    origin: Position,
    events: &mut Vec<SimEvent>,
) -> Entity {
    let net_id = state.net.allocate();

    let stats = CombatStats {
        level: def.level,
        attack_power: def.attack,
        defense: def.defense,
        attack_speed: def.attack_speed,
        crit_chance: def.crit_chance,
        move_speed: def.move_speed,
        xp: 0,
        stat_points: 0,
    };
    let ai = AiState {
        mode: AiMode::Idle,
        home: origin,
        aggro_range: def.aggro_range,
        leash_range: def.leash_range,
        chase_speed: def.move_speed,
    };
    let attack = AutoAttack {
        active: false,
        cooldown: 0.0,
        range: def.attack_range,
        projectile_speed: def.projectile_speed,
    };

    let entity = world.spawn((
        Monster {
            type_id: def.type_id,
        },
        origin,
        Rotation::default(),
        Velocity::zero(),
        NetworkIdentity {
            net_id,
            session: None,
        },
        Health {
            current: def.hp,
            max: def.hp,
            regen: def.hp_regen,
        },
        stats,
        Target::default(),
        attack,
        ai,
    ));
    state.net.bind(net_id, entity);
    announce(events, net_id, EntityKind::Monster, &origin);
    entity
}

/// Spawn a player character from its persisted snapshot.
///
/// Level is clamped into `[1, max_level]`. Vitals of zero or less start full,
/// everything else is clamped to the derived maximum.
pub fn spawn_player(
    world: &mut World,
    state: &mut ZoneState,
    session: SessionId,
    snapshot: &CharacterSnapshot,
    definitions: &DefinitionTable,
    tuning: &CombatTuning,
    events: &mut Vec<SimEvent>,
) -> Entity {
    let net_id = state.net.allocate();
    let level = snapshot.level.clamp(1, definitions.max_level());
    let derived = derive_stats(&snapshot.attributes, level, tuning);

    let start_vital = |saved: f32, max: f32| {
        if saved > 0.0 {
            saved.min(max)
        } else {
            max
        }
    };

    let entity = world.spawn((
        Player {
            character_id: snapshot.character_id,
        },
        snapshot.position,
        Rotation::default(),
        Velocity::zero(),
        NetworkIdentity {
            net_id,
            session: Some(session),
        },
        Health {
            current: start_vital(snapshot.hp, derived.hp_max),
            max: derived.hp_max,
            regen: PLAYER_HP_REGEN,
        },
        Mana {
            current: start_vital(snapshot.mp, derived.mp_max),
            max: derived.mp_max,
            regen: PLAYER_MP_REGEN,
        },
        CombatStats {
            level,
            attack_power: derived.attack_power,
            defense: derived.defense,
            attack_speed: derived.attack_speed,
            crit_chance: derived.crit_chance,
            move_speed: derived.move_speed,
            xp: snapshot.xp,
            stat_points: snapshot.stat_points,
        },
        snapshot.attributes,
        Target::default(),
        AutoAttack {
            active: false,
            cooldown: 0.0,
            range: PLAYER_ATTACK_RANGE,
            projectile_speed: None,
        },
        SkillCooldown::default(),
    ));
    state.net.bind(net_id, entity);
    state.net.bind_session(session, entity);
    announce(events, net_id, EntityKind::Player, &snapshot.position);
    entity
}

/// Everything a homing projectile carries at launch.
#[derive(Debug, Clone, Copy)]
pub struct Launch {
    pub owner: Entity,
    pub owner_net: NetId,
    pub target: Entity,
    pub origin: Position,
    pub damage: u32,
    pub is_crit: bool,
    pub speed: f32,
}

pub fn spawn_projectile(
    world: &mut World,
    state: &mut ZoneState,
    launch: Launch,
    events: &mut Vec<SimEvent>,
) -> Entity {
    let net_id = state.net.allocate();
    let entity = world.spawn((
        launch.origin,
        NetworkIdentity {
            net_id,
            session: None,
        },
        Projectile {
            owner: launch.owner,
            owner_net: launch.owner_net,
            target: launch.target,
            damage: launch.damage,
            is_crit: launch.is_crit,
            speed: launch.speed,
            lifetime: PROJECTILE_LIFETIME_SECS,
        },
    ));
    state.net.bind(net_id, entity);
    announce(events, net_id, EntityKind::Projectile, &launch.origin);
    entity
}

pub fn spawn_loot(
    world: &mut World,
    state: &mut ZoneState,
    item_id: u32,
    at: Position,
    despawn_secs: f32,
    events: &mut Vec<SimEvent>,
) -> Entity {
    let net_id = state.net.allocate();
    let entity = world.spawn((
        at,
        NetworkIdentity {
            net_id,
            session: None,
        },
        LootDrop {
            item_id,
            despawn_timer: despawn_secs,
        },
    ));
    state.net.bind(net_id, entity);
    announce(events, net_id, EntityKind::Loot, &at);
    entity
}
