//! Combat events
//!
//! Defines the events the executor emits while applying abilities, for
//! consumers that react to battle outcomes without re-reading the log.

use bevy::prelude::*;

/// Event fired when an ability is used
#[derive(Event)]
pub struct AbilityUsedEvent {
    /// Entity using the ability
    pub actor: Entity,
    /// Primary target of the ability (if any)
    pub target: Option<Entity>,
    /// Name of the ability
    pub ability_name: String,
}

/// Event fired when damage lands
#[derive(Event)]
pub struct DamageDealtEvent {
    /// Entity dealing the damage
    pub source: Entity,
    /// Entity receiving the damage
    pub target: Entity,
    /// Damage that reached health, after shield and barrier soak
    pub amount: i32,
    /// Name of the ability that caused the damage
    pub ability_name: String,
}

/// Event fired when healing lands
#[derive(Event)]
pub struct HealingDoneEvent {
    /// Entity doing the healing
    pub source: Entity,
    /// Entity receiving the healing
    pub target: Entity,
    /// Amount healed (actual, not overheal)
    pub amount: i32,
    /// Name of the healing ability
    pub ability_name: String,
}

/// Event fired when a combatant falls
#[derive(Event)]
pub struct CombatantDownedEvent {
    /// Entity that died
    pub victim: Entity,
    /// Entity that dealt the killing blow (if attributable)
    pub killer: Option<Entity>,
}

/// Event fired when a fallen combatant is returned to the fight
#[derive(Event)]
pub struct CombatantRevivedEvent {
    /// Entity that was revived
    pub target: Entity,
    /// Entity that performed the revival
    pub reviver: Entity,
}
