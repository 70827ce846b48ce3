//! Pure combat and progression math.
//!
//! Everything random takes the RNG as a parameter so a seeded stream replays
//! bit-for-bit.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::BaseAttributes;
use crate::config::CombatTuning;
use crate::constants::{DEATH_XP_PENALTY_RATE, FALLBACK_ATTACK_COOLDOWN, UNREACHABLE_XP};
use crate::definitions::DefinitionTable;

/// Resolve one physical hit.
///
/// ```text
/// reduction = defense / (defense + defense_constant)
/// base      = attack_power * (1 - reduction)
/// damage    = round(base * uniform(variance_min, variance_max))
/// crit      => damage *= crit_multiplier
/// damage    = max(damage, min_damage)
/// ```
///
/// The variance roll is always drawn, crit or not, so the RNG stream
/// advances the same way for both outcomes.
pub fn calculate_physical_damage<R: Rng + ?Sized>(
    rng: &mut R,
    attack_power: f32,
    defense: f32,
    is_crit: bool,
    tuning: &CombatTuning,
) -> u32 {
    let defense = defense.max(0.0);
    let denominator = defense + tuning.defense_constant;
    let reduction = if denominator > 0.0 {
        defense / denominator
    } else {
        0.0
    };
    let base = attack_power.max(0.0) * (1.0 - reduction);

    let variance = if tuning.variance_max > tuning.variance_min {
        rng.gen_range(tuning.variance_min..tuning.variance_max)
    } else {
        tuning.variance_min
    };

    let mut damage = (base * variance).round() as u32;
    if is_crit {
        damage = damage.saturating_mul(tuning.crit_multiplier);
    }
    damage.max(tuning.min_damage)
}

/// Roll a critical hit with probability `crit_chance`, clamped to the cap.
pub fn roll_crit<R: Rng + ?Sized>(rng: &mut R, crit_chance: f32, tuning: &CombatTuning) -> bool {
    let chance = crit_chance.min(tuning.crit_chance_cap).max(0.0) as f64;
    rng.gen::<f64>() < chance
}

/// Seconds between swings for a given attack speed. Non-positive speeds fall
/// back to a fixed cooldown instead of dividing by zero.
pub fn attack_cooldown(attack_speed: f32) -> f32 {
    if attack_speed > 0.0 {
        1.0 / attack_speed
    } else {
        FALLBACK_ATTACK_COOLDOWN
    }
}

/// XP left after a death: lose `rate` of the level requirement, floored at zero.
pub fn calculate_xp_penalty_with_rate(current_xp: u64, xp_to_level: u64, rate: f64) -> u64 {
    let loss = (xp_to_level as f64 * rate).floor() as u64;
    current_xp.saturating_sub(loss)
}

/// [`calculate_xp_penalty_with_rate`] at the default 5% rate.
pub fn calculate_xp_penalty(current_xp: u64, xp_to_level: u64) -> u64 {
    calculate_xp_penalty_with_rate(current_xp, xp_to_level, DEATH_XP_PENALTY_RATE)
}

/// Stats that follow from attributes and level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub hp_max: f32,
    pub mp_max: f32,
    pub attack_power: f32,
    pub defense: f32,
    pub attack_speed: f32,
    pub crit_chance: f32,
    pub move_speed: f32,
}

/// Derive combat stats from base attributes and level.
pub fn derive_stats(attrs: &BaseAttributes, level: u32, tuning: &CombatTuning) -> DerivedStats {
    let level = level.max(1) as f32;
    let strength = attrs.strength as f32;
    let dexterity = attrs.dexterity as f32;
    let intelligence = attrs.intelligence as f32;
    let vitality = attrs.vitality as f32;

    DerivedStats {
        hp_max: 100.0 + vitality * 10.0 + level * 20.0,
        mp_max: 50.0 + intelligence * 8.0 + level * 10.0,
        attack_power: 10.0 + strength * 2.0 + level * 3.0,
        defense: 5.0 + vitality + level * 2.0,
        attack_speed: 1.0 + dexterity * 0.01,
        crit_chance: (0.05 + dexterity * 0.002).min(tuning.crit_chance_cap),
        move_speed: (5.0 + dexterity * 0.02).min(8.0),
    }
}

/// Result of crediting XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    pub level: u32,
    pub xp: u64,
    pub levels_gained: u32,
    pub stat_points_awarded: u32,
}

/// Credit `amount` XP and roll over as many levels as it pays for.
pub fn apply_xp(level: u32, xp: u64, amount: u64, table: &DefinitionTable) -> LevelProgress {
    let mut progress = LevelProgress {
        level,
        xp: xp.saturating_add(amount),
        levels_gained: 0,
        stat_points_awarded: 0,
    };

    while progress.level < table.max_level() {
        let requirement = table.xp_to_level(progress.level);
        if requirement == UNREACHABLE_XP || progress.xp < requirement {
            break;
        }
        progress.xp -= requirement;
        progress.level += 1;
        progress.levels_gained += 1;
        progress.stat_points_awarded += table.stat_points_per_level();
    }

    progress
}
