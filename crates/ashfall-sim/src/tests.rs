//! Tests for the zone engine: combat, AI, lifecycle, progression and input.

use std::collections::HashSet;
use std::sync::Arc;

use ashfall_core::commands::PlayerCommand;
use ashfall_core::components::*;
use ashfall_core::config::{SpawnPoint, ZoneConfig};
use ashfall_core::constants::*;
use ashfall_core::definitions::DefinitionTable;
use ashfall_core::enums::{AiMode, EntityKind, RemovalReason};
use ashfall_core::error::SessionError;
use ashfall_core::events::SimEvent;
use ashfall_core::formulas::{apply_xp, derive_stats};
use ashfall_core::state::CharacterSnapshot;
use ashfall_core::types::{NetId, Position, Velocity};

use crate::engine::{TickOutput, ZoneEngine};
use crate::index::NetIndex;
use crate::world_setup::Launch;

// ---- Helpers ----

fn zone_with(config: ZoneConfig) -> ZoneEngine {
    ZoneEngine::new(config, Arc::new(DefinitionTable::builtin()))
}

fn zone(seed: u64, spawn_points: Vec<SpawnPoint>) -> ZoneEngine {
    zone_with(ZoneConfig {
        seed,
        spawn_points,
        ..Default::default()
    })
}

fn spawn_point(type_id: u32, x: f32, z: f32) -> SpawnPoint {
    SpawnPoint {
        type_id,
        origin: Position::ground(x, z),
        respawn_delay: 2.0,
    }
}

fn hero(id: u64, x: f32, z: f32) -> CharacterSnapshot {
    CharacterSnapshot::new_character(id, 1, Position::ground(x, z))
}

fn monster_entity(engine: &ZoneEngine) -> hecs::Entity {
    let mut query = engine.world().query::<&Monster>();
    let entity = query.iter().map(|(entity, _)| entity).next();
    entity.expect("a monster should have spawned")
}

fn monster_net_ids(out: &TickOutput) -> Vec<NetId> {
    out.snapshot
        .entities
        .iter()
        .filter(|view| view.kind == EntityKind::Monster)
        .map(|view| view.net_id)
        .collect()
}

fn ai_mode(engine: &ZoneEngine, entity: hecs::Entity) -> AiMode {
    engine.world().get::<&AiState>(entity).unwrap().mode
}

fn set_health(engine: &mut ZoneEngine, entity: hecs::Entity, current: f32) {
    engine
        .world_mut()
        .get::<&mut Health>(entity)
        .unwrap()
        .current = current;
}

/// Three monster types around two players who attack the first two monsters.
fn skirmish(seed: u64) -> ZoneEngine {
    let mut engine = zone(
        seed,
        vec![
            spawn_point(1, 0.0, 0.0),
            spawn_point(2, 8.0, 0.0),
            spawn_point(3, 0.0, 8.0),
        ],
    );
    engine.join(1, &hero(1, 2.0, 0.0)).unwrap();
    engine.join(2, &hero(2, 4.0, 2.0)).unwrap();

    let first = engine.tick();
    let monsters = monster_net_ids(&first);
    assert_eq!(monsters.len(), 3, "all three spawners should fire on tick 1");
    engine.queue_command(PlayerCommand::RequestAttack {
        session: 1,
        net_id: monsters[0],
    });
    engine.queue_command(PlayerCommand::RequestAttack {
        session: 2,
        net_id: monsters[1],
    });
    engine
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let mut engine_a = skirmish(12345);
    let mut engine_b = skirmish(12345);

    for _ in 0..400 {
        let out_a = engine_a.tick();
        let out_b = engine_b.tick();
        let json_a = serde_json::to_string(&out_a).unwrap();
        let json_b = serde_json::to_string(&out_b).unwrap();
        assert_eq!(json_a, json_b, "Tick outputs diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut engine_a = skirmish(111);
    let mut engine_b = skirmish(222);

    let mut diverged = false;
    for _ in 0..400 {
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        if json_a != json_b {
            diverged = true;
            break;
        }
    }
    assert!(diverged, "Different seeds should produce divergent damage rolls");
}

// ---- Invariants ----

#[test]
fn test_health_stays_in_bounds_and_deaths_fire_once() {
    let mut engine = skirmish(7);
    let mut dead: HashSet<NetId> = HashSet::new();
    let mut deaths = 0;

    for _ in 0..1200 {
        let out = engine.tick();

        for (_entity, health) in engine.world().query::<&Health>().iter() {
            assert!(
                health.current >= 0.0 && health.current <= health.max,
                "Health {} out of [0, {}] at tick {}",
                health.current,
                health.max,
                out.tick
            );
        }

        for event in &out.events {
            match event {
                SimEvent::Death { entity, .. } => {
                    deaths += 1;
                    assert!(dead.insert(*entity), "Entity {entity} died twice");
                }
                SimEvent::Respawn { entity, .. } => {
                    dead.remove(entity);
                }
                SimEvent::EntityRemoved { net_id, .. } => {
                    dead.remove(net_id);
                }
                _ => {}
            }
        }

        for (_entity, (attack, target, _dead)) in engine
            .world()
            .query::<(&AutoAttack, &Target, &Dead)>()
            .iter()
        {
            assert!(!attack.active, "Dead entity still auto-attacking");
            assert!(target.0.is_none(), "Dead entity still has a target");
        }
    }
    assert!(deaths > 0, "A 60 second skirmish should kill something");
}

// ---- Spawner ----

#[test]
fn test_spawner_spawns_idle_monster_on_first_tick() {
    let mut engine = zone(1, vec![spawn_point(1, 5.0, 5.0)]);
    let out = engine.tick();

    let appeared: Vec<_> = out
        .events
        .iter()
        .filter(|e| matches!(e, SimEvent::EntityAppeared { kind: EntityKind::Monster, .. }))
        .collect();
    assert_eq!(appeared.len(), 1);

    let wolf = monster_entity(&engine);
    assert_eq!(ai_mode(&engine, wolf), AiMode::Idle);
    let pos = *engine.world().get::<&Position>(wolf).unwrap();
    assert_eq!(pos, Position::ground(5.0, 5.0));
    let health = *engine.world().get::<&Health>(wolf).unwrap();
    assert_eq!(health.current, health.max);
}

#[test]
fn test_spawner_with_unknown_type_is_skipped() {
    let mut engine = zone(1, vec![spawn_point(999, 0.0, 0.0)]);
    for _ in 0..10 {
        let out = engine.tick();
        assert!(out.snapshot.entities.is_empty());
    }

    // A failed spawn waits out the respawn delay before trying again.
    let timer = {
        let mut query = engine.world().query::<&Spawner>();
        let timer = query.iter().map(|(_, spawner)| spawner.respawn_timer).next();
        timer.unwrap()
    };
    assert!(
        timer > 1.0,
        "timer should have been reset to the 2s delay, got {timer}"
    );
}

#[test]
fn test_kill_credits_xp_and_spawner_lifecycle_completes() {
    let mut engine = zone(3, vec![spawn_point(1, 0.0, 0.0)]);
    engine.join(1, &hero(1, 1.0, 0.0)).unwrap();
    let player_net = engine.session_net_id(1).unwrap();

    let first = engine.tick();
    let wolf_net = monster_net_ids(&first)[0];
    engine.queue_command(PlayerCommand::RequestAttack {
        session: 1,
        net_id: wolf_net,
    });

    let mut death_tick = None;
    let mut removed_tick = None;
    let mut respawn_tick = None;
    let mut xp_gained = None;

    for _ in 0..400 {
        let out = engine.tick();
        for event in &out.events {
            match event {
                SimEvent::Death { entity, killer } if *entity == wolf_net => {
                    assert_eq!(*killer, Some(player_net), "player landed the last hit");
                    death_tick = Some(out.tick);
                }
                SimEvent::XpGain { entity, amount, .. } if *entity == player_net => {
                    xp_gained = Some(*amount);
                }
                SimEvent::EntityRemoved {
                    net_id,
                    reason: RemovalReason::CorpseExpired,
                } if *net_id == wolf_net => {
                    removed_tick = Some(out.tick);
                }
                SimEvent::EntityAppeared {
                    net_id,
                    kind: EntityKind::Monster,
                    ..
                } => {
                    assert_ne!(*net_id, wolf_net, "respawned monster needs a fresh net id");
                    respawn_tick = Some(out.tick);
                }
                _ => {}
            }
        }
        if respawn_tick.is_some() {
            break;
        }
    }

    let death_tick = death_tick.expect("player should kill the wolf");
    let removed_tick = removed_tick.expect("corpse should be removed");
    let respawn_tick = respawn_tick.expect("spawner should bring the wolf back");
    assert_eq!(xp_gained, Some(40), "wolf is worth 40 XP");

    let corpse_ticks = removed_tick - death_tick;
    assert!(
        (58..=61).contains(&corpse_ticks),
        "Corpse should linger ~3s, lingered {corpse_ticks} ticks"
    );
    let delay_ticks = respawn_tick - removed_tick;
    assert!(
        (39..=41).contains(&delay_ticks),
        "Respawn delay should be ~2s, was {delay_ticks} ticks"
    );

    let player = engine.session_entity(1).unwrap();
    assert!(engine.world().get::<&Dead>(player).is_err());
}

// ---- Monster AI ----

#[test]
fn test_monster_aggro_chase_then_attack() {
    let mut engine = zone(1, vec![spawn_point(1, 0.0, 0.0)]);
    engine.join(1, &hero(1, 5.0, 0.0)).unwrap();
    let player = engine.session_entity(1).unwrap();

    engine.tick();
    let wolf = monster_entity(&engine);
    assert_eq!(ai_mode(&engine, wolf), AiMode::Chase);
    assert_eq!(engine.world().get::<&Target>(wolf).unwrap().0, Some(player));

    let mut attacking = false;
    for _ in 0..60 {
        engine.tick();
        if ai_mode(&engine, wolf) == AiMode::Attack {
            attacking = true;
            break;
        }
    }
    assert!(attacking, "Wolf should close in and attack");
    assert!(engine.world().get::<&AutoAttack>(wolf).unwrap().active);
    let pos = *engine.world().get::<&Position>(wolf).unwrap();
    assert!(
        pos.distance_to(&Position::ground(5.0, 0.0)) <= 2.0 + 1e-3,
        "Wolf should stop inside its attack range"
    );
}

#[test]
fn test_monster_ignores_players_outside_aggro() {
    let mut engine = zone(1, vec![spawn_point(1, 0.0, 0.0)]);
    engine.join(1, &hero(1, 15.0, 0.0)).unwrap();
    for _ in 0..20 {
        engine.tick();
    }
    let wolf = monster_entity(&engine);
    assert_eq!(ai_mode(&engine, wolf), AiMode::Idle);
}

#[test]
fn test_aggro_tie_prefers_lowest_net_id() {
    let mut engine = zone(1, vec![spawn_point(1, 0.0, 0.0)]);
    engine.join(1, &hero(1, 3.0, 0.0)).unwrap();
    engine.join(2, &hero(2, -3.0, 0.0)).unwrap();
    assert!(engine.session_net_id(1).unwrap() < engine.session_net_id(2).unwrap());

    engine.tick();
    let wolf = monster_entity(&engine);
    assert_eq!(
        engine.world().get::<&Target>(wolf).unwrap().0,
        engine.session_entity(1)
    );
}

#[test]
fn test_monster_leashes_when_target_flees() {
    let mut engine = zone(1, vec![spawn_point(1, 0.0, 0.0)]);
    engine.join(1, &hero(1, 5.0, 0.0)).unwrap();
    let player = engine.session_entity(1).unwrap();

    for _ in 0..10 {
        engine.tick();
    }
    let wolf = monster_entity(&engine);
    assert_ne!(ai_mode(&engine, wolf), AiMode::Idle);

    // Teleport the player well past the leash.
    *engine.world_mut().get::<&mut Position>(player).unwrap() = Position::ground(40.0, 0.0);

    let mut returned = false;
    for _ in 0..5 {
        engine.tick();
        if ai_mode(&engine, wolf) == AiMode::Return {
            returned = true;
            break;
        }
    }
    assert!(returned, "Wolf should give up once the target leaves the leash");
    assert!(!engine.world().get::<&AutoAttack>(wolf).unwrap().active);
}

#[test]
fn test_return_home_heals_and_idles() {
    let mut engine = zone(1, vec![spawn_point(1, 0.0, 0.0)]);
    engine.tick();
    let wolf = monster_entity(&engine);

    {
        let world = engine.world_mut();
        *world.get::<&mut Position>(wolf).unwrap() = Position::ground(10.0, 0.0);
        world.get::<&mut AiState>(wolf).unwrap().mode = AiMode::Return;
    }
    set_health(&mut engine, wolf, 10.0);

    let mut idle = false;
    for _ in 0..200 {
        engine.tick();
        if ai_mode(&engine, wolf) == AiMode::Idle {
            idle = true;
            break;
        }
    }
    assert!(idle, "Wolf should walk home");

    let health = *engine.world().get::<&Health>(wolf).unwrap();
    assert_eq!(health.current, health.max, "Arriving home restores full health");
    assert!(engine.world().get::<&Target>(wolf).unwrap().0.is_none());
    let pos = *engine.world().get::<&Position>(wolf).unwrap();
    assert!(pos.distance_to(&Position::ground(0.0, 0.0)) <= RETURN_ARRIVE_RADIUS);
}

#[test]
fn test_ranged_monster_fires_projectiles() {
    let mut engine = zone(5, vec![spawn_point(2, 0.0, 0.0)]);
    engine.join(1, &hero(1, 8.0, 0.0)).unwrap();
    let player_net = engine.session_net_id(1).unwrap();

    let first = engine.tick();
    let goblin_net = monster_net_ids(&first)[0];

    let mut launched = false;
    let mut hit = false;
    for _ in 0..80 {
        let out = engine.tick();
        for event in &out.events {
            match event {
                SimEvent::EntityAppeared {
                    kind: EntityKind::Projectile,
                    ..
                } => launched = true,
                SimEvent::Damage {
                    attacker, target, ..
                } if *attacker == goblin_net && *target == player_net => hit = true,
                _ => {}
            }
        }
    }
    assert!(launched, "Goblin archer should shoot instead of closing to melee");
    assert!(hit, "Arrow should land on the player");
}

// ---- Auto-attack ----

/// `(attacker, remaining_hp)` for every hit on `target` in one tick.
fn hits_on(out: &TickOutput, target: NetId) -> Vec<(NetId, f32)> {
    out.events
        .iter()
        .filter_map(|e| match e {
            SimEvent::Damage {
                attacker,
                target: hit,
                remaining_hp,
                ..
            } if *hit == target => Some((*attacker, *remaining_hp)),
            _ => None,
        })
        .collect()
}

/// Two heroes standing 10m apart; hero 1 auto-attacks hero 2.
fn sparring_pair() -> (ZoneEngine, hecs::Entity, NetId, NetId) {
    let mut engine = zone(1, vec![]);
    engine.join(1, &hero(1, 0.0, 0.0)).unwrap();
    engine.join(2, &hero(2, 10.0, 0.0)).unwrap();
    engine.tick();

    let attacker = engine.session_entity(1).unwrap();
    let attacker_net = engine.session_net_id(1).unwrap();
    let target_net = engine.session_net_id(2).unwrap();
    engine.queue_command(PlayerCommand::RequestAttack {
        session: 1,
        net_id: target_net,
    });
    (engine, attacker, attacker_net, target_net)
}

#[test]
fn test_finishing_blow_keeps_kill_credit_when_two_players_swing() {
    let mut engine = zone(5, vec![spawn_point(1, 0.0, 0.0)]);
    engine.join(1, &hero(1, 1.0, 0.0)).unwrap();
    engine.join(2, &hero(2, -1.0, 0.0)).unwrap();
    let heroes = [
        engine.session_net_id(1).unwrap(),
        engine.session_net_id(2).unwrap(),
    ];

    let first = engine.tick();
    let wolf_net = monster_net_ids(&first)[0];
    let wolf = monster_entity(&engine);
    set_health(&mut engine, wolf, 1.0);
    for session in [1, 2] {
        engine.queue_command(PlayerCommand::RequestAttack {
            session,
            net_id: wolf_net,
        });
    }

    let out = engine.tick();
    let hits = hits_on(&out, wolf_net);
    assert_eq!(hits.len(), 1, "a downed wolf takes no second swing: {hits:?}");
    let (finisher, remaining) = hits[0];
    assert_eq!(remaining, 0.0);
    assert!(heroes.contains(&finisher));

    let killer = out.events.iter().find_map(|e| match e {
        SimEvent::Death { entity, killer } if *entity == wolf_net => Some(*killer),
        _ => None,
    });
    assert_eq!(killer, Some(Some(finisher)), "credit goes to the finishing blow");

    let xp: Vec<(NetId, u64)> = out
        .events
        .iter()
        .filter_map(|e| match e {
            SimEvent::XpGain { entity, amount, .. } => Some((*entity, *amount)),
            _ => None,
        })
        .collect();
    assert_eq!(xp, vec![(finisher, 40)]);
}

#[test]
fn test_attack_cooldown_holds_while_target_out_of_reach() {
    let (mut engine, attacker, attacker_net, target_net) = sparring_pair();
    engine.tick();
    engine
        .world_mut()
        .get::<&mut AutoAttack>(attacker)
        .unwrap()
        .cooldown = 0.5;

    for _ in 0..20 {
        let out = engine.tick();
        assert!(hits_on(&out, target_net).is_empty(), "target is 10m away");
    }
    let attack = *engine.world().get::<&AutoAttack>(attacker).unwrap();
    assert!(attack.active);
    assert_eq!(attack.cooldown, 0.5, "cooldown must not tick out of range");

    let target = engine.session_entity(2).unwrap();
    *engine.world_mut().get::<&mut Position>(target).unwrap() = Position::ground(1.5, 0.0);

    let mut swing_after = None;
    for ticks in 1..=30 {
        let out = engine.tick();
        if hits_on(&out, target_net)
            .iter()
            .any(|(from, _)| *from == attacker_net)
        {
            swing_after = Some(ticks);
            break;
        }
    }
    let swing_after = swing_after.expect("swing should land once in reach");
    assert!(
        (10..=11).contains(&swing_after),
        "0.5s of cooldown is ~10 ticks, got {swing_after}"
    );
}

#[test]
fn test_zero_attack_speed_uses_fallback_cooldown() {
    let (mut engine, attacker, attacker_net, target_net) = sparring_pair();
    let target = engine.session_entity(2).unwrap();
    *engine.world_mut().get::<&mut Position>(target).unwrap() = Position::ground(1.5, 0.0);
    engine
        .world_mut()
        .get::<&mut CombatStats>(attacker)
        .unwrap()
        .attack_speed = 0.0;

    let out = engine.tick();
    assert_eq!(hits_on(&out, target_net).len(), 1, "first swing lands at once");
    let cooldown = engine.world().get::<&AutoAttack>(attacker).unwrap().cooldown;
    assert!(
        (cooldown - FALLBACK_ATTACK_COOLDOWN).abs() < 1e-6,
        "zero attack speed should reset to the fallback, got {cooldown}"
    );

    let mut next_swing = None;
    for ticks in 1..=40 {
        let out = engine.tick();
        if hits_on(&out, target_net)
            .iter()
            .any(|(from, _)| *from == attacker_net)
        {
            next_swing = Some(ticks);
            break;
        }
    }
    let next_swing = next_swing.expect("second swing");
    assert!((20..=21).contains(&next_swing), "got {next_swing}");
}

// ---- Projectiles ----

fn duel() -> (ZoneEngine, Launch, NetId) {
    let mut engine = zone(1, vec![]);
    engine.join(1, &hero(1, 0.0, 0.0)).unwrap();
    engine.join(2, &hero(2, 10.0, 0.0)).unwrap();
    let launch = Launch {
        owner: engine.session_entity(1).unwrap(),
        owner_net: engine.session_net_id(1).unwrap(),
        target: engine.session_entity(2).unwrap(),
        origin: Position::ground(0.0, 0.0),
        damage: 7,
        is_crit: false,
        speed: 10.0,
    };
    let target_net = engine.session_net_id(2).unwrap();
    (engine, launch, target_net)
}

#[test]
fn test_projectile_arrives_after_one_second() {
    let (mut engine, launch, target_net) = duel();
    engine.spawn_test_projectile(launch);

    let mut hit_tick = None;
    for _ in 0..40 {
        let out = engine.tick();
        let hit = out.events.iter().any(|e| {
            matches!(e, SimEvent::Damage { target, amount: 7, .. } if *target == target_net)
        });
        if hit {
            assert!(out.events.iter().any(|e| matches!(
                e,
                SimEvent::EntityRemoved {
                    reason: RemovalReason::ProjectileImpact,
                    ..
                }
            )));
            hit_tick = Some(out.tick);
            break;
        }
    }
    let hit_tick = hit_tick.expect("projectile should land");
    let secs = hit_tick as f32 * DT;
    assert!(
        (secs - 1.0).abs() <= DT + 1e-4,
        "Speed 10 over 10m should land at ~1.0s, landed at {secs}s"
    );
}

#[test]
fn test_projectile_hits_target_that_died_in_flight() {
    let (mut engine, launch, target_net) = duel();
    engine.spawn_test_projectile(launch);
    set_health(&mut engine, launch.target, 0.0);

    let first = engine.tick();
    assert!(first
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::Death { entity, .. } if *entity == target_net)));

    let second = engine.tick();
    let damage: Vec<_> = second
        .events
        .iter()
        .filter_map(|e| match e {
            SimEvent::Damage {
                target,
                remaining_hp,
                ..
            } if *target == target_net => Some(*remaining_hp),
            _ => None,
        })
        .collect();
    assert_eq!(damage, vec![0.0], "Exactly one hit, clamped at zero");
    assert!(!second
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::Death { .. })));
}

#[test]
fn test_projectile_without_target_fizzles() {
    let (mut engine, launch, _) = duel();
    engine.spawn_test_projectile(launch);
    engine.tick();
    engine.leave(2).unwrap();

    let out = engine.tick();
    assert!(!out.events.iter().any(|e| matches!(e, SimEvent::Damage { .. })));
    assert!(out.events.iter().any(|e| matches!(
        e,
        SimEvent::EntityRemoved {
            reason: RemovalReason::ProjectileExpired,
            ..
        }
    )));
}

#[test]
fn test_projectile_expires_after_lifetime() {
    let (mut engine, launch, _) = duel();
    engine.spawn_test_projectile(Launch {
        speed: 0.1,
        ..launch
    });

    let mut expired_tick = None;
    for _ in 0..120 {
        let out = engine.tick();
        if out.events.iter().any(|e| matches!(
            e,
            SimEvent::EntityRemoved {
                reason: RemovalReason::ProjectileExpired,
                ..
            }
        )) {
            expired_tick = Some(out.tick);
            break;
        }
    }
    let ticks = expired_tick.expect("slow projectile should fizzle");
    assert!((99..=101).contains(&ticks), "Lifetime should be ~5s, was {ticks} ticks");
}

// ---- Player death & respawn ----

#[test]
fn test_player_respawns_after_delay_with_full_vitals() {
    let mut engine = zone_with(ZoneConfig {
        respawn_point: Position::ground(50.0, -20.0),
        ..Default::default()
    });
    engine.join(1, &hero(1, 3.0, 3.0)).unwrap();
    let player = engine.session_entity(1).unwrap();
    let player_net = engine.session_net_id(1).unwrap();
    engine.tick();

    set_health(&mut engine, player, 0.0);
    engine.world_mut().get::<&mut Mana>(player).unwrap().current = 1.0;

    let mut death_tick = None;
    let mut respawn_tick = None;
    for _ in 0..200 {
        let out = engine.tick();
        for event in &out.events {
            match event {
                SimEvent::Death { entity, killer } if *entity == player_net => {
                    assert!(killer.is_none());
                    death_tick = Some(out.tick);
                }
                SimEvent::Respawn { entity, x, z } if *entity == player_net => {
                    assert_eq!((*x, *z), (50.0, -20.0));
                    respawn_tick = Some(out.tick);
                }
                _ => {}
            }
        }
        if respawn_tick.is_some() {
            break;
        }
    }

    let waited = respawn_tick.unwrap() - death_tick.unwrap();
    let expected = (PLAYER_RESPAWN_DELAY / DT).round() as u64;
    assert!(
        waited + 1 >= expected && waited <= expected + 1,
        "Respawn should take {expected} ticks +/- 1, took {waited}"
    );

    let world = engine.world();
    assert!(world.get::<&Dead>(player).is_err());
    let health = *world.get::<&Health>(player).unwrap();
    let mana = *world.get::<&Mana>(player).unwrap();
    assert_eq!(health.current, health.max);
    assert_eq!(mana.current, mana.max);
    assert_eq!(
        *world.get::<&Position>(player).unwrap(),
        Position::ground(50.0, -20.0)
    );
}

#[test]
fn test_player_death_costs_xp() {
    let mut engine = zone(1, vec![]);
    let mut character = hero(1, 0.0, 0.0);
    character.xp = 50;
    engine.join(1, &character).unwrap();
    let player = engine.session_entity(1).unwrap();

    set_health(&mut engine, player, 0.0);
    engine.tick();

    // Level 1 needs 100 XP; 5% of that is lost.
    assert_eq!(engine.character_snapshot(1).unwrap().xp, 45);
}

// ---- Progression ----

#[test]
fn test_pending_xp_levels_up_and_rederives_stats() {
    let mut engine = zone(1, vec![]);
    engine.join(1, &hero(1, 0.0, 0.0)).unwrap();
    let player = engine.session_entity(1).unwrap();
    let player_net = engine.session_net_id(1).unwrap();
    set_health(&mut engine, player, 20.0);
    engine.world_mut().insert_one(player, PendingXp(5_000)).unwrap();

    let out = engine.tick();

    let table = DefinitionTable::builtin();
    let expected = apply_xp(1, 0, 5_000, &table);
    let derived = derive_stats(&BaseAttributes::default(), expected.level, &Default::default());

    assert!(out.events.contains(&SimEvent::XpGain {
        entity: player_net,
        amount: 5_000,
        total_xp: expected.xp,
        xp_to_level: table.xp_to_level(expected.level),
    }));
    assert!(out.events.contains(&SimEvent::LevelUp {
        entity: player_net,
        new_level: expected.level,
        stat_points: expected.stat_points_awarded,
        hp_max: derived.hp_max,
        mp_max: derived.mp_max,
    }));

    let world = engine.world();
    assert!(world.get::<&PendingXp>(player).is_err(), "Inbox is consumed");
    let health = *world.get::<&Health>(player).unwrap();
    assert_eq!(health.max, derived.hp_max);
    assert_eq!(health.current, health.max, "Level-up is a full heal");
    let stats = *world.get::<&CombatStats>(player).unwrap();
    assert_eq!(stats.attack_power, derived.attack_power);
}

#[test]
fn test_net_ids_are_monotonic_and_do_not_wrap() {
    let mut index = NetIndex::default();
    assert_eq!(index.allocate(), 1);
    assert_eq!(index.allocate(), 2);

    let mut index = NetIndex::starting_at(NetId::MAX - 1);
    assert_eq!(index.allocate(), NetId::MAX - 1);
    assert_eq!(index.allocate(), NetId::MAX);
    assert_eq!(index.allocate(), NetId::MAX, "exhausted counter must not wrap to 1");
}

// ---- Sessions ----

#[test]
fn test_join_twice_is_rejected() {
    let mut engine = zone(1, vec![]);
    engine.join(5, &hero(5, 0.0, 0.0)).unwrap();
    assert_eq!(
        engine.join(5, &hero(5, 0.0, 0.0)),
        Err(SessionError::AlreadyJoined(5))
    );
    assert_eq!(engine.player_count(), 1);
}

#[test]
fn test_join_restores_saved_vitals() {
    let mut engine = zone(1, vec![]);
    let mut character = hero(9, 0.0, 0.0);
    character.hp = 42.0;
    character.level = 3;
    engine.join(1, &character).unwrap();

    let snapshot = engine.character_snapshot(1).unwrap();
    assert_eq!(snapshot.character_id, 9);
    assert_eq!(snapshot.level, 3);
    assert_eq!(snapshot.hp, 42.0);
    let full_mp = derive_stats(&BaseAttributes::default(), 3, &Default::default()).mp_max;
    assert_eq!(snapshot.mp, full_mp, "Zero mana means start full");
}

#[test]
fn test_leave_removes_every_reference() {
    let mut engine = zone(2, vec![spawn_point(1, 0.0, 0.0)]);
    engine.join(1, &hero(77, 1.0, 0.0)).unwrap();
    let player = engine.session_entity(1).unwrap();
    let player_net = engine.session_net_id(1).unwrap();

    let first = engine.tick();
    engine.queue_command(PlayerCommand::RequestAttack {
        session: 1,
        net_id: monster_net_ids(&first)[0],
    });
    for _ in 0..10 {
        engine.tick();
    }
    assert!(engine.state().last_attackers.values().any(|e| *e == player));

    let saved = engine.leave(1).unwrap();
    assert_eq!(saved.character_id, 77);
    assert_eq!(engine.leave(1), Err(SessionError::UnknownSession(1)));

    let state = engine.state();
    assert!(!engine.world().contains(player));
    assert!(state.net.resolve(player_net).is_none());
    assert!(engine.session_entity(1).is_none());
    assert!(!state.last_attackers.contains_key(&player));
    assert!(!state.last_attackers.values().any(|e| *e == player));
    assert!(!state.respawn_timers.contains_key(&player));

    let out = engine.tick();
    assert!(out.events.contains(&SimEvent::EntityRemoved {
        net_id: player_net,
        reason: RemovalReason::SessionLeft,
    }));
    assert!(out.snapshot.entities.iter().all(|v| v.net_id != player_net));

    // The wolf loses its target and goes home without tripping over the gap.
    for _ in 0..100 {
        engine.tick();
    }
    let wolf = monster_entity(&engine);
    assert_eq!(ai_mode(&engine, wolf), AiMode::Idle);
}

// ---- Input ----

#[test]
fn test_move_clamps_to_unit_and_scales_by_speed() {
    let mut engine = zone(1, vec![]);
    engine.join(1, &hero(1, 0.0, 0.0)).unwrap();
    let player = engine.session_entity(1).unwrap();
    engine.queue_command(PlayerCommand::Move {
        session: 1,
        move_x: 3.0,
        move_z: 4.0,
    });
    engine.tick();

    let world = engine.world();
    let speed = world.get::<&CombatStats>(player).unwrap().move_speed;
    let vel = *world.get::<&Velocity>(player).unwrap();
    assert!((vel.speed() - speed).abs() < 1e-4);
    let pos = *world.get::<&Position>(player).unwrap();
    assert!((pos.x - 0.6 * speed * DT).abs() < 1e-4);
    assert!((pos.z - 0.8 * speed * DT).abs() < 1e-4);
}

#[test]
fn test_dead_player_commands_are_ignored() {
    let mut engine = zone(1, vec![]);
    engine.join(1, &hero(1, 0.0, 0.0)).unwrap();
    let player = engine.session_entity(1).unwrap();
    set_health(&mut engine, player, 0.0);
    engine.tick();

    engine.queue_command(PlayerCommand::Move {
        session: 1,
        move_x: 1.0,
        move_z: 0.0,
    });
    engine.tick();

    let world = engine.world();
    assert!(world.get::<&Velocity>(player).unwrap().is_zero());
    assert_eq!(*world.get::<&Position>(player).unwrap(), Position::ground(0.0, 0.0));
}

#[test]
fn test_unknown_session_command_is_dropped() {
    let mut engine = zone(1, vec![]);
    engine.queue_command(PlayerCommand::Move {
        session: 404,
        move_x: 1.0,
        move_z: 0.0,
    });
    let out = engine.tick();
    assert!(out.events.is_empty());
}

#[test]
fn test_cast_bolt_spends_mana_and_respects_cooldown() {
    let (mut engine, _, _) = duel();
    let caster = engine.session_entity(1).unwrap();
    let target_net = engine.session_net_id(2).unwrap();
    *engine.world_mut().get::<&mut Position>(caster).unwrap() = Position::ground(5.0, 0.0);

    let cast = PlayerCommand::CastBolt {
        session: 1,
        net_id: target_net,
    };
    engine.queue_commands([cast.clone(), cast]);
    let out = engine.tick();

    let launched = out
        .events
        .iter()
        .filter(|e| matches!(e, SimEvent::EntityAppeared { kind: EntityKind::Projectile, .. }))
        .count();
    assert_eq!(launched, 1, "Second cast is still on cooldown");

    let mana = *engine.world().get::<&Mana>(caster).unwrap();
    assert!(mana.current < mana.max - BOLT_MANA_COST + 1.0);
    let cooldown = engine.world().get::<&SkillCooldown>(caster).unwrap().remaining;
    assert!(cooldown > 0.0);
}

#[test]
fn test_cast_bolt_out_of_range_is_rejected() {
    let (mut engine, _, _) = duel();
    let target = engine.session_entity(2).unwrap();
    let target_net = engine.session_net_id(2).unwrap();
    *engine.world_mut().get::<&mut Position>(target).unwrap() =
        Position::ground(BOLT_RANGE + 5.0, 0.0);

    engine.queue_command(PlayerCommand::CastBolt {
        session: 1,
        net_id: target_net,
    });
    let out = engine.tick();
    assert!(!out.events.iter().any(|e| matches!(
        e,
        SimEvent::EntityAppeared {
            kind: EntityKind::Projectile,
            ..
        }
    )));
    let caster = engine.session_entity(1).unwrap();
    let mana = *engine.world().get::<&Mana>(caster).unwrap();
    assert_eq!(mana.current, mana.max);
}

// ---- Loot ----

#[test]
fn test_pickup_in_reach_removes_drop() {
    let mut engine = zone(1, vec![]);
    engine.join(1, &hero(1, 0.0, 0.0)).unwrap();
    let player_net = engine.session_net_id(1).unwrap();
    let near = engine.spawn_test_loot(1001, Position::ground(2.0, 0.0));
    let far = engine.spawn_test_loot(1002, Position::ground(10.0, 0.0));
    let first = engine.tick();
    let loot_ids: Vec<NetId> = first
        .snapshot
        .entities
        .iter()
        .filter(|v| v.kind == EntityKind::Loot)
        .map(|v| v.net_id)
        .collect();
    assert_eq!(loot_ids.len(), 2);

    for net_id in &loot_ids {
        engine.queue_command(PlayerCommand::PickupLoot {
            session: 1,
            net_id: *net_id,
        });
    }
    let out = engine.tick();
    assert!(out.events.contains(&SimEvent::LootPickedUp {
        entity: player_net,
        item_id: 1001,
    }));
    assert!(!out
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::LootPickedUp { item_id: 1002, .. })));
    assert!(!engine.world().contains(near));
    assert!(engine.world().contains(far));
}

#[test]
fn test_loot_despawns_after_timer() {
    let mut engine = zone_with(ZoneConfig {
        loot_despawn_secs: 1.0,
        ..Default::default()
    });
    engine.spawn_test_loot(3001, Position::ground(0.0, 0.0));

    let mut expired_tick = None;
    for _ in 0..40 {
        let out = engine.tick();
        if out.events.iter().any(|e| matches!(
            e,
            SimEvent::EntityRemoved {
                reason: RemovalReason::LootExpired,
                ..
            }
        )) {
            expired_tick = Some(out.tick);
            break;
        }
    }
    let ticks = expired_tick.expect("loot should expire");
    assert!((19..=21).contains(&ticks), "Loot should last ~1s, lasted {ticks} ticks");
}

// ---- Snapshot ----

#[test]
fn test_snapshot_is_sorted_and_typed() {
    let mut engine = skirmish(9);
    let out = engine.tick();
    let ids: Vec<NetId> = out.snapshot.entities.iter().map(|v| v.net_id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);

    let players = out
        .snapshot
        .entities
        .iter()
        .filter(|v| v.kind == EntityKind::Player)
        .count();
    assert_eq!(players, 2);
    assert!(out
        .snapshot
        .entities
        .iter()
        .filter(|v| v.kind == EntityKind::Monster)
        .all(|v| v.ai_mode.is_some()));
}
