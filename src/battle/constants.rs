//! Battle Constants
//!
//! Centralized location for magic numbers used throughout the battle system.
//! This makes it easier to tune balance and ensures consistency.

// ============================================================================
// Action Cadence
// ============================================================================

/// Minimum real-time gap between any two AI-driven actions, across all
/// combatants. Serializes visible actions so two combatants never act in
/// the same instant.
pub const GLOBAL_ACTION_STAGGER: f32 = 1.0;

/// Fallback wait between decisions when an archetype profile doesn't say
/// otherwise.
pub const DEFAULT_ACTION_INTERVAL: f32 = 3.0;

// ============================================================================
// Deferral Wait Penalties
// ============================================================================
//
// Deferring is a normal outcome, not an error. Each cause lengthens the
// combatant's current wait by a fixed amount before the next attempt.

/// Added when the combatant has less than one energy bar (no candidates
/// are even enumerated).
pub const LOW_ENERGY_WAIT_PENALTY: f32 = 0.5;

/// Added when no (ability, target) candidates exist at all.
pub const NO_CANDIDATES_WAIT_PENALTY: f32 = 1.0;

/// Added when candidates exist but none scores above zero.
pub const NO_WORTHWHILE_WAIT_PENALTY: f32 = 0.5;

/// Added when the chosen action can't currently be performed and is
/// parked in the pending slot instead.
pub const UNAFFORDABLE_WAIT_PENALTY: f32 = 0.5;

// ============================================================================
// Selection
// ============================================================================

/// Number of top-scored candidates entered into the weighted-random draw.
pub const TOP_CANDIDATE_POOL: usize = 3;

/// Bias applied to a candidate's value when it is stored as the pending
/// action, so marginally better fresh candidates don't displace it.
pub const PENDING_VALUE_BOOST: f32 = 1.2;

// ============================================================================
// Battle Math
// ============================================================================

/// Damage multiplier while the attacker has the offense-up status.
pub const OFFENSE_UP_MULTIPLIER: f32 = 1.25;

/// Damage multiplier while the attacker has the offense-down status.
pub const OFFENSE_DOWN_MULTIPLIER: f32 = 0.75;

/// Expected-value multiplier the AI applies to a blind attacker's damage.
pub const BLIND_EXPECTATION_MULTIPLIER: f32 = 0.5;

/// Chance for a blind attacker's effect to miss outright at execution.
pub const BLIND_MISS_CHANCE: f32 = 0.5;

/// Elemental multiplier when attacking into a weakness.
pub const ELEMENT_STRONG_MULTIPLIER: f32 = 1.5;

/// Elemental multiplier when attacking into a resistance.
pub const ELEMENT_WEAK_MULTIPLIER: f32 = 0.5;

/// Executed damage and healing rolls vary by up to this fraction in
/// either direction.
pub const MAGNITUDE_VARIANCE: f32 = 0.1;

/// Magnitude multiplier for abilities performed charged (full energy
/// drained on use).
pub const CHARGE_MAGNITUDE_MULTIPLIER: f32 = 1.5;

/// How long a stunning effect locks the target out of acting, in seconds.
pub const STUN_DURATION: f32 = 2.0;
