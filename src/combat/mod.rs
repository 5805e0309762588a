//! Combat records
//!
//! The structured combat log and the events the executor emits while
//! applying abilities. The simulation itself lives in `crate::battle`;
//! this module only records and relays what happened.

use bevy::prelude::*;

pub mod events;
pub mod log;

use events::{CombatantDownedEvent, CombatantRevivedEvent};

/// Mirror lifecycle events into the tracing output.
///
/// Damage and healing are chatty enough that the executor logs them
/// directly; deaths and revivals are rare and worth surfacing here even
/// for consumers that never open the combat log.
pub fn relay_battle_events(
    mut downed: EventReader<CombatantDownedEvent>,
    mut revived: EventReader<CombatantRevivedEvent>,
) {
    for event in downed.read() {
        info!("Combatant {:?} has fallen", event.victim);
    }
    for event in revived.read() {
        info!(
            "Combatant {:?} returned to the fight by {:?}",
            event.target, event.reviver
        );
    }
}
