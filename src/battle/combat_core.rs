//! Battle Upkeep Systems
//!
//! Per-tick bookkeeping that runs before any decisions: the shared clock,
//! energy regeneration, stun decay, and the selectors' own cadence timers.

use bevy::prelude::*;

use crate::combat::log::CombatLog;

use super::combat_ai::ActionSelector;
use super::components::{BattleClock, Combatant};

/// Advance the shared battle clock and keep the combat log's timestamp in
/// step with it.
pub fn advance_battle_clock(
    time: Res<Time>,
    mut clock: ResMut<BattleClock>,
    mut combat_log: ResMut<CombatLog>,
) {
    clock.elapsed += time.delta_secs();
    combat_log.battle_time = clock.elapsed;
}

/// Charge energy bars over time.
///
/// Fractional progress accumulates continuously and converts into whole
/// bars; at the cap, leftover progress is discarded so a spender starts
/// its next bar from zero.
pub fn regenerate_energy(time: Res<Time>, mut combatants: Query<&mut Combatant>) {
    let dt = time.delta_secs();

    for mut combatant in combatants.iter_mut() {
        if !combatant.is_alive() {
            continue;
        }

        if combatant.energy_bars >= combatant.max_energy_bars {
            combatant.charge_progress = 0.0;
            continue;
        }

        let gained = combatant.energy_rate * dt;
        combatant.charge_progress += gained;
        while combatant.charge_progress >= 1.0 && combatant.energy_bars < combatant.max_energy_bars
        {
            combatant.charge_progress -= 1.0;
            combatant.energy_bars += 1;
        }
        if combatant.energy_bars >= combatant.max_energy_bars {
            combatant.charge_progress = 0.0;
        }
    }
}

/// Wear down stun timers.
pub fn update_stuns(time: Res<Time>, mut combatants: Query<&mut Combatant>) {
    let dt = time.delta_secs();

    for mut combatant in combatants.iter_mut() {
        if combatant.stun_remaining > 0.0 {
            combatant.stun_remaining = (combatant.stun_remaining - dt).max(0.0);
        }
    }
}

/// Advance each living, unstunned combatant's time-since-last-action.
///
/// Stunned combatants don't accrue readiness; their cadence resumes where
/// it left off once the stun wears away.
pub fn tick_selector_timers(
    time: Res<Time>,
    mut selectors: Query<(&Combatant, &mut ActionSelector)>,
) {
    let dt = time.delta_secs();

    for (combatant, mut selector) in selectors.iter_mut() {
        if combatant.is_alive() && !combatant.is_stunned() {
            selector.time_since_last_action += dt;
        }
    }
}
