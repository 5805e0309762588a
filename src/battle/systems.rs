//! Battle Systems API
//!
//! This module provides a stable API for the battle simulation systems.
//! External consumers (the headless runner, tests) should import from
//! here rather than directly from internal modules, allowing internal
//! refactoring without breaking them.
//!
//! ## System Phases
//!
//! Battle systems run in three ordered phases each tick:
//!
//! 1. **Upkeep** - clock advance, energy regeneration, stun decay,
//!    selector cadence timers
//! 2. **Decision** - selector wiring checks, the action selector itself,
//!    and execution of whatever it queued
//! 3. **Resolution** - event relays and anything that reacts to the
//!    tick's outcomes (the headless runner hooks battle-end detection
//!    after this phase)

use bevy::prelude::*;

use crate::combat::events::{
    AbilityUsedEvent, CombatantDownedEvent, CombatantRevivedEvent, DamageDealtEvent,
    HealingDoneEvent,
};
use crate::combat::relay_battle_events;

// Re-export the combat systems from internal modules
// This provides a stable API - internal renames only require updating these re-exports

// === Phase 1: Upkeep ===
pub use super::combat_core::advance_battle_clock;
pub use super::combat_core::regenerate_energy;
pub use super::combat_core::tick_selector_timers;
pub use super::combat_core::update_stuns;

// === Phase 2: Decision ===
pub use super::combat_ai::decide_actions;
pub use super::combat_ai::initialize_selectors;
pub use super::executor::process_ability_uses;

// === Utilities ===
pub use super::utils::combatant_id;

// === Components and Resources ===
pub use super::combat_ai::ActionSelector;
pub use super::components::{
    Archetype, BattleClock, Combatant, FieldPosition, GameRng, Row, Side,
};

/// System set labels for battle system ordering.
///
/// Use these to ensure proper ordering when adding custom systems that
/// interact with the battle loop.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum BattleSystemPhase {
    /// Phase 1: timers, energy regeneration, stun decay
    Upkeep,
    /// Phase 2: action selection and execution
    Decision,
    /// Phase 3: event relays, battle-end reactions
    Resolution,
}

/// Configures the ordering between battle system phases.
///
/// Call this once during app setup before adding battle systems.
pub fn configure_battle_system_ordering(app: &mut App) {
    app.configure_sets(
        Update,
        (
            BattleSystemPhase::Upkeep,
            BattleSystemPhase::Decision,
            BattleSystemPhase::Resolution,
        )
            .chain(),
    );
}

/// Adds core battle simulation systems and events to the app.
///
/// These are the systems needed for the battle loop to function.
///
/// # Arguments
/// * `app` - The Bevy App to add systems to
/// * `run_condition` - A run condition (e.g., `|| true` for headless mode)
pub fn add_core_battle_systems<M>(app: &mut App, run_condition: impl Condition<M> + Clone)
where
    M: 'static,
{
    // Battle events
    app.add_event::<AbilityUsedEvent>()
        .add_event::<DamageDealtEvent>()
        .add_event::<HealingDoneEvent>()
        .add_event::<CombatantDownedEvent>()
        .add_event::<CombatantRevivedEvent>();

    // Phase 1: Upkeep
    app.add_systems(
        Update,
        (
            advance_battle_clock,
            regenerate_energy,
            update_stuns,
            tick_selector_timers,
        )
            .chain()
            .in_set(BattleSystemPhase::Upkeep)
            .run_if(run_condition.clone()),
    );

    // Phase 2: Decision
    // The flush between decide_actions and process_ability_uses makes the
    // queued AbilityUsePending entities visible to the executor in the
    // same tick
    app.add_systems(
        Update,
        (
            initialize_selectors,
            decide_actions,
            apply_deferred,
            process_ability_uses,
        )
            .chain()
            .in_set(BattleSystemPhase::Decision)
            .run_if(run_condition.clone()),
    );

    // Phase 3: Resolution
    app.add_systems(
        Update,
        relay_battle_events
            .in_set(BattleSystemPhase::Resolution)
            .run_if(run_condition),
    );
}
