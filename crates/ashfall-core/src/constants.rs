//! Simulation constants and tuning defaults.
//!
//! Balance values that designers tweak per zone (damage variance, crit cap, ...)
//! are only *defaults* here; the live values come from [`crate::config::CombatTuning`].

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 20;

/// Seconds per tick.
pub const DT: f32 = 1.0 / TICK_RATE as f32;

// --- Damage ---

/// Floor applied to every resolved hit.
pub const MIN_DAMAGE: u32 = 1;

/// Lower bound of the uniform damage variance roll.
pub const DAMAGE_VARIANCE_MIN: f32 = 0.85;

/// Upper bound of the uniform damage variance roll.
pub const DAMAGE_VARIANCE_MAX: f32 = 1.15;

/// Multiplier applied to critical hits.
pub const CRIT_MULTIPLIER: u32 = 2;

/// Crit chance never exceeds this, whatever the attributes say.
pub const CRIT_CHANCE_CAP: f32 = 0.5;

/// `reduction = defense / (defense + DEFENSE_CONSTANT)`.
pub const DEFENSE_CONSTANT: f32 = 100.0;

/// Cooldown used when an attacker's attack speed is zero or negative.
pub const FALLBACK_ATTACK_COOLDOWN: f32 = 1.0;

// --- Monster AI ---

/// Attack state only drops back to chase once the target is beyond
/// `attack_range * ATTACK_HYSTERESIS`.
pub const ATTACK_HYSTERESIS: f32 = 1.5;

/// Distance from home at which a returning monster counts as arrived.
pub const RETURN_ARRIVE_RADIUS: f32 = 1.0;

// --- Projectiles ---

/// Distance at which a homing projectile counts as arrived.
pub const PROJECTILE_HIT_RADIUS: f32 = 0.5;

/// Seconds a projectile may fly before it fizzles.
pub const PROJECTILE_LIFETIME_SECS: f32 = 5.0;

// --- Lifecycle ---

/// Seconds a monster corpse lingers before removal.
pub const MONSTER_CORPSE_SECS: f32 = 3.0;

/// Seconds between a player's death and respawn.
pub const PLAYER_RESPAWN_DELAY: f32 = 5.0;

/// Seconds a loot drop stays on the ground.
pub const LOOT_DESPAWN_SECS: f32 = 60.0;

/// Maximum distance for picking up loot.
pub const LOOT_PICKUP_RANGE: f32 = 3.0;

// --- Progression ---

/// Hard level ceiling.
pub const MAX_LEVEL: u32 = 50;

/// Stat points awarded per level gained.
pub const STAT_POINTS_PER_LEVEL: u32 = 5;

/// XP requirement used past the end of the XP table.
pub const UNREACHABLE_XP: u64 = u64::MAX;

/// Fraction of the current level's requirement lost on death.
pub const DEATH_XP_PENALTY_RATE: f64 = 0.05;

// --- Player defaults ---

/// Melee reach of an unarmed player.
pub const PLAYER_ATTACK_RANGE: f32 = 2.5;

/// Starting value for every base attribute.
pub const BASE_ATTRIBUTE_VALUE: u32 = 10;

/// Health regenerated per second by players.
pub const PLAYER_HP_REGEN: f32 = 1.0;

/// Mana regenerated per second by players.
pub const PLAYER_MP_REGEN: f32 = 2.0;

// --- Bolt skill ---

/// Mana cost of a bolt cast.
pub const BOLT_MANA_COST: f32 = 10.0;

/// Maximum cast range of a bolt.
pub const BOLT_RANGE: f32 = 20.0;

/// Seconds between bolt casts.
pub const BOLT_COOLDOWN_SECS: f32 = 1.5;

/// Bolt flight speed (m/s).
pub const BOLT_SPEED: f32 = 15.0;

/// Bolt damage as a multiple of attack power, before mitigation.
pub const BOLT_POWER_SCALE: f32 = 1.2;
