//! Component Definitions for the Battle Simulation
//!
//! This module contains the ECS components, resources, and data structures
//! used during a battle: combatants and their formation positions, the
//! seeded RNG, and the shared battle clock that serializes AI actions.

use bevy::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::abilities::{AbilityType, Element, TargetShape};
use super::constants::DEFAULT_ACTION_INTERVAL;

// ============================================================================
// Resources
// ============================================================================

/// Seeded random number generator for deterministic battle simulation.
///
/// When a seed is provided (e.g., via headless config), the same seed will
/// always produce the same battle outcome. Without a seed, uses system entropy.
#[derive(Resource)]
pub struct GameRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl GameRng {
    /// Create a new GameRng with a specific seed for deterministic behavior
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Create a new GameRng with random entropy (non-deterministic)
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Generate a random f32 in the range [0.0, 1.0)
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Generate a random f32 in the given range
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.random_f32() * (max - min)
    }

    /// Generate a uniform random integer in [0, upper).
    ///
    /// `upper` must be positive; the weighted-selection caller guards
    /// against degenerate totals before drawing.
    pub fn random_below(&mut self, upper: i32) -> i32 {
        self.rng.gen_range(0..upper)
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// The shared battle clock.
///
/// `time_of_last_action` is the cross-combatant stagger stamp: every
/// selector reads it to decide readiness and writes it when an action
/// executes. It lives in an explicit resource rather than a static so the
/// scheduler can be driven and inspected from tests.
#[derive(Resource, Default)]
pub struct BattleClock {
    /// Seconds since the battle began
    pub elapsed: f32,
    /// When the most recent AI action, by anyone, executed
    pub time_of_last_action: f32,
}

impl BattleClock {
    /// Record that an action just executed.
    pub fn stamp_action(&mut self) {
        self.time_of_last_action = self.elapsed;
    }
}

// ============================================================================
// Formation
// ============================================================================

/// Which party a combatant fights for.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Side::Left => "Left",
            Side::Right => "Right",
        }
    }
}

/// Front or back rank within a party.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum Row {
    #[default]
    Front,
    Back,
}

/// A combatant's place in the battle formation. Rows gate melee reach;
/// lines (columns) shape piercing abilities.
#[derive(Component, Clone, Copy, Debug)]
pub struct FieldPosition {
    pub side: Side,
    pub row: Row,
    pub line: u8,
}

// ============================================================================
// Archetypes & AI Tuning
// ============================================================================

/// How the AI biases target choice with respect to party health extremes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum FocusPriority {
    /// Pile onto whoever is weakest
    LowestHealth,
    /// Spread attention across the middle of the pack
    WellRounded,
    /// Go for the biggest threat standing
    HighestHealth,
}

/// Per-archetype AI tuning consumed by the action selector.
#[derive(Clone, Copy, Debug)]
pub struct AiProfile {
    /// Seconds between decision attempts once an action lands
    pub action_interval: f32,
    /// Target shape this AI favors (+bonus in the value modifier)
    pub preferred_shape: TargetShape,
    /// Health-extreme bias for target choice
    pub focus: FocusPriority,
}

impl Default for AiProfile {
    fn default() -> Self {
        Self {
            action_interval: DEFAULT_ACTION_INTERVAL,
            preferred_shape: TargetShape::Single,
            focus: FocusPriority::LowestHealth,
        }
    }
}

/// Available combatant archetypes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Archetype {
    Vanguard,
    Sentinel,
    Arcanist,
    Cleric,
    Shadowblade,
    Warden,
}

impl Archetype {
    /// Get all available archetypes
    pub fn all() -> &'static [Archetype] {
        &[
            Archetype::Vanguard,
            Archetype::Sentinel,
            Archetype::Arcanist,
            Archetype::Cleric,
            Archetype::Shadowblade,
            Archetype::Warden,
        ]
    }

    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Archetype::Vanguard => "Vanguard",
            Archetype::Sentinel => "Sentinel",
            Archetype::Arcanist => "Arcanist",
            Archetype::Cleric => "Cleric",
            Archetype::Shadowblade => "Shadowblade",
            Archetype::Warden => "Warden",
        }
    }

    /// Get a short description
    pub fn description(&self) -> &'static str {
        match self {
            Archetype::Vanguard => "Front-line weapon master",
            Archetype::Sentinel => "Barrier-bearing defender",
            Archetype::Arcanist => "Elemental artillery",
            Archetype::Cleric => "Healer and reviver",
            Archetype::Shadowblade => "Hidden assassin",
            Archetype::Warden => "Sharp-eyed skirmisher",
        }
    }

    /// The abilities this archetype brings into battle.
    pub fn equipped_abilities(&self) -> &'static [AbilityType] {
        match self {
            Archetype::Vanguard => &[
                AbilityType::Strike,
                AbilityType::CrescentSweep,
                AbilityType::Skewer,
            ],
            Archetype::Sentinel => &[
                AbilityType::Strike,
                AbilityType::ShieldBash,
                AbilityType::GroundSlam,
            ],
            Archetype::Arcanist => &[
                AbilityType::Emberbolt,
                AbilityType::Flamewave,
                AbilityType::Permafrost,
                AbilityType::Starfall,
            ],
            Archetype::Cleric => &[
                AbilityType::Mend,
                AbilityType::Prayer,
                AbilityType::Rekindle,
                AbilityType::Smite,
            ],
            Archetype::Shadowblade => &[
                AbilityType::Shadowstab,
                AbilityType::ThousandCuts,
                AbilityType::DeathMark,
            ],
            Archetype::Warden => &[
                AbilityType::PiercingShot,
                AbilityType::Volley,
                AbilityType::Longshot,
            ],
        }
    }

    /// The AI tuning this archetype fights with.
    pub fn profile(&self) -> AiProfile {
        match self {
            Archetype::Vanguard => AiProfile {
                action_interval: 3.0,
                preferred_shape: TargetShape::SameRow,
                focus: FocusPriority::LowestHealth,
            },
            Archetype::Sentinel => AiProfile {
                action_interval: 3.5,
                preferred_shape: TargetShape::Single,
                focus: FocusPriority::HighestHealth,
            },
            Archetype::Arcanist => AiProfile {
                action_interval: 3.0,
                preferred_shape: TargetShape::SameLine,
                focus: FocusPriority::WellRounded,
            },
            Archetype::Cleric => AiProfile {
                action_interval: 2.5,
                preferred_shape: TargetShape::Single,
                focus: FocusPriority::LowestHealth,
            },
            Archetype::Shadowblade => AiProfile {
                action_interval: 2.0,
                preferred_shape: TargetShape::Single,
                focus: FocusPriority::LowestHealth,
            },
            Archetype::Warden => AiProfile {
                action_interval: 3.0,
                preferred_shape: TargetShape::SameLine,
                focus: FocusPriority::HighestHealth,
            },
        }
    }
}

// ============================================================================
// Combat Components
// ============================================================================

/// Core combatant component containing all combat state and stats.
#[derive(Component, Clone)]
pub struct Combatant {
    /// Party this combatant fights for
    pub side: Side,
    /// Slot index within the party (stable; used for log identity)
    pub slot: u8,
    /// Combatant archetype (stats, abilities, AI tuning)
    pub archetype: Archetype,
    /// Maximum health points
    pub max_health: i32,
    /// Current health points (combatant falls when this reaches 0)
    pub current_health: i32,
    /// Whole energy bars currently banked
    pub energy_bars: u32,
    /// Ceiling on banked energy bars
    pub max_energy_bars: u32,
    /// Fractional progress toward the next bar (0.0..1.0)
    pub charge_progress: f32,
    /// Bars gained per second
    pub energy_rate: f32,
    /// Offensive potency fed into the damage formula
    pub attack: i32,
    /// Flat damage reduction applied by the damage formula
    pub resilience: i32,
    /// Elemental affinity (resists its own element, weak to its counter)
    pub affinity: Element,
    /// Expendable shield points, consumed before barrier and health
    pub shield_points: i32,
    /// Expendable barrier points, consumed after shields, before health
    pub barrier_points: i32,
    /// Attacker status: halves expected and actual damage output
    pub blind: bool,
    /// Attacker status: amplifies damage output
    pub offense_up: bool,
    /// Attacker status: dampens damage output
    pub offense_down: bool,
    /// Perception trait: this combatant can target hidden enemies
    pub hawkeye: bool,
    /// Concealed from enemies without the hawkeye trait; dropped on acting
    pub hidden: bool,
    /// Seconds of stun remaining (0 = free to act)
    pub stun_remaining: f32,
    /// Total damage this combatant has dealt
    pub damage_dealt: i32,
    /// Total damage this combatant has taken
    pub damage_taken: i32,
    /// Total healing this combatant has done
    pub healing_done: i32,
}

impl Combatant {
    /// Create a new combatant with archetype-specific stats.
    pub fn new(side: Side, slot: u8, archetype: Archetype) -> Self {
        // Archetype stat table:
        // (max_health, max_bars, starting_bars, energy_rate, attack,
        //  resilience, affinity, shield, barrier, hawkeye, hidden)
        let (max_health, max_bars, starting_bars, energy_rate, attack, resilience, affinity, shield, barrier, hawkeye, hidden) =
            match archetype {
                Archetype::Vanguard => (320, 4, 2, 0.50, 42, 14, Element::None, 0, 0, false, false),
                Archetype::Sentinel => (380, 3, 2, 0.40, 30, 22, Element::Terra, 40, 40, false, false),
                Archetype::Arcanist => (230, 5, 2, 0.60, 48, 8, Element::Flame, 0, 0, false, false),
                Archetype::Cleric => (250, 4, 2, 0.50, 34, 10, Element::Radiant, 0, 20, false, false),
                Archetype::Shadowblade => (240, 5, 2, 0.70, 46, 9, Element::Umbral, 0, 0, false, true),
                Archetype::Warden => (260, 4, 2, 0.55, 40, 11, Element::Gale, 0, 0, true, false),
            };

        Self {
            side,
            slot,
            archetype,
            max_health,
            current_health: max_health,
            energy_bars: starting_bars,
            max_energy_bars: max_bars,
            charge_progress: 0.0,
            energy_rate,
            attack,
            resilience,
            affinity,
            shield_points: shield,
            barrier_points: barrier,
            blind: false,
            offense_up: false,
            offense_down: false,
            hawkeye,
            hidden,
            stun_remaining: 0.0,
            damage_dealt: 0,
            damage_taken: 0,
            healing_done: 0,
        }
    }

    /// Check if this combatant is alive (health > 0).
    pub fn is_alive(&self) -> bool {
        self.current_health > 0
    }

    /// Check if this combatant is currently stunned.
    pub fn is_stunned(&self) -> bool {
        self.stun_remaining > 0.0
    }

    /// Validate that all combatant invariants hold.
    ///
    /// In debug builds, this panics on invariant violations.
    /// In release builds, this is a no-op.
    #[inline]
    pub fn debug_validate(&self) {
        debug_assert!(
            self.current_health >= 0,
            "Combatant health cannot be negative: {}",
            self.current_health
        );
        debug_assert!(
            self.current_health <= self.max_health,
            "Combatant health ({}) cannot exceed max_health ({})",
            self.current_health,
            self.max_health
        );
        debug_assert!(
            self.energy_bars <= self.max_energy_bars,
            "Combatant energy ({}) cannot exceed max bars ({})",
            self.energy_bars,
            self.max_energy_bars
        );
        debug_assert!(
            self.max_health > 0,
            "Combatant max_health must be positive: {}",
            self.max_health
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // GameRng Tests
    // =========================================================================

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let seed = 42;
        let mut rng1 = GameRng::from_seed(seed);
        let mut rng2 = GameRng::from_seed(seed);

        // Both RNGs should produce identical sequences
        for _ in 0..100 {
            assert_eq!(rng1.random_f32(), rng2.random_f32());
        }
    }

    #[test]
    fn test_different_seeds_produce_different_results() {
        let mut rng1 = GameRng::from_seed(1);
        let mut rng2 = GameRng::from_seed(2);

        // Different seeds should produce different first values
        assert_ne!(rng1.random_f32(), rng2.random_f32());
    }

    #[test]
    fn test_random_below_stays_in_range() {
        let mut rng = GameRng::from_seed(123);

        for _ in 0..100 {
            let value = rng.random_below(80);
            assert!(value >= 0, "Value {} should be >= 0", value);
            assert!(value < 80, "Value {} should be < 80", value);
        }
    }

    #[test]
    fn test_seeded_rng_stores_seed() {
        let seed = 12345;
        let rng = GameRng::from_seed(seed);
        assert_eq!(rng.seed, Some(seed));
    }

    #[test]
    fn test_entropy_rng_has_no_seed() {
        let rng = GameRng::from_entropy();
        assert!(rng.seed.is_none());
    }

    // =========================================================================
    // Combatant Tests
    // =========================================================================

    #[test]
    fn test_new_combatant_is_alive_at_full_health() {
        for archetype in Archetype::all() {
            let c = Combatant::new(Side::Left, 0, *archetype);
            assert!(c.is_alive());
            assert_eq!(c.current_health, c.max_health);
            assert!(c.energy_bars <= c.max_energy_bars);
            c.debug_validate();
        }
    }

    #[test]
    fn test_shadowblade_starts_hidden() {
        let c = Combatant::new(Side::Left, 0, Archetype::Shadowblade);
        assert!(c.hidden);

        let v = Combatant::new(Side::Left, 1, Archetype::Vanguard);
        assert!(!v.hidden);
    }

    #[test]
    fn test_warden_has_hawkeye() {
        let w = Combatant::new(Side::Right, 0, Archetype::Warden);
        assert!(w.hawkeye);

        let s = Combatant::new(Side::Right, 1, Archetype::Sentinel);
        assert!(!s.hawkeye);
    }

    #[test]
    fn test_every_archetype_has_abilities_and_profile() {
        for archetype in Archetype::all() {
            assert!(
                !archetype.equipped_abilities().is_empty(),
                "{} has no abilities",
                archetype.name()
            );
            assert!(archetype.profile().action_interval > 0.0);
        }
    }

    // =========================================================================
    // BattleClock Tests
    // =========================================================================

    #[test]
    fn test_clock_stamp_records_elapsed() {
        let mut clock = BattleClock::default();
        clock.elapsed = 7.5;
        clock.stamp_action();
        assert_eq!(clock.time_of_last_action, 7.5);
    }
}
