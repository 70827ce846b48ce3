//! XP and level-up system.
//!
//! Drains each `PendingXp` inbox, rolls over as many levels as the XP pays
//! for, and re-derives player stats on level-up.

use hecs::{Entity, World};

use ashfall_core::components::{
    BaseAttributes, CombatStats, Dead, Health, Mana, NetworkIdentity, PendingXp,
};
use ashfall_core::config::CombatTuning;
use ashfall_core::definitions::DefinitionTable;
use ashfall_core::events::SimEvent;
use ashfall_core::formulas::{apply_xp, derive_stats};

pub fn run(
    world: &mut World,
    definitions: &DefinitionTable,
    tuning: &CombatTuning,
    events: &mut Vec<SimEvent>,
) {
    let inboxes: Vec<(Entity, u64)> = world
        .query::<&PendingXp>()
        .iter()
        .map(|(entity, pending)| (entity, pending.0))
        .collect();

    for (entity, amount) in inboxes {
        let _ = world.remove_one::<PendingXp>(entity);

        let Ok(net_id) = world
            .get::<&NetworkIdentity>(entity)
            .map(|identity| identity.net_id)
        else {
            continue;
        };
        let attributes = world.get::<&BaseAttributes>(entity).ok().map(|a| *a);
        let alive = world.get::<&Dead>(entity).is_err();

        let Ok(mut stats) = world.get::<&mut CombatStats>(entity) else {
            continue;
        };
        let progress = apply_xp(stats.level, stats.xp, amount, definitions);
        stats.level = progress.level;
        stats.xp = progress.xp;
        stats.stat_points = stats.stat_points.saturating_add(progress.stat_points_awarded);

        events.push(SimEvent::XpGain {
            entity: net_id,
            amount,
            total_xp: stats.xp,
            xp_to_level: definitions.xp_to_level(stats.level),
        });
        if progress.levels_gained == 0 {
            continue;
        }

        let derived = attributes.map(|attrs| derive_stats(&attrs, stats.level, tuning));
        if let Some(derived) = derived {
            stats.attack_power = derived.attack_power;
            stats.defense = derived.defense;
            stats.attack_speed = derived.attack_speed;
            stats.crit_chance = derived.crit_chance;
            stats.move_speed = derived.move_speed;
        }
        let (new_level, stat_points) = (stats.level, stats.stat_points);
        drop(stats);

        let mut hp_max = 0.0;
        if let Ok(mut health) = world.get::<&mut Health>(entity) {
            if let Some(derived) = derived {
                health.max = derived.hp_max;
            }
            if alive {
                health.current = health.max;
            }
            hp_max = health.max;
        }
        let mut mp_max = 0.0;
        if let Ok(mut mana) = world.get::<&mut Mana>(entity) {
            if let Some(derived) = derived {
                mana.max = derived.mp_max;
            }
            if alive {
                mana.current = mana.max;
            }
            mp_max = mana.max;
        }

        tracing::debug!(net_id, new_level, "level up");
        events.push(SimEvent::LevelUp {
            entity: net_id,
            new_level,
            stat_points,
            hp_max,
            mp_max,
        });
    }
}
