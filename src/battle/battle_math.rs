//! Battle Math
//!
//! Pure damage and heal formulas. The action selector calls the
//! `estimate_*` variants to score candidates (expected values, no RNG);
//! the executor calls the `roll_*` variants to apply real effects
//! (variance, miss chances).
//!
//! Nothing here mutates combat state.

use super::abilities::{EffectKind, Element};
use super::ability_config::EffectConfig;
use super::components::{Combatant, GameRng};
use super::constants::{
    BLIND_EXPECTATION_MULTIPLIER, BLIND_MISS_CHANCE, ELEMENT_STRONG_MULTIPLIER,
    ELEMENT_WEAK_MULTIPLIER, MAGNITUDE_VARIANCE, OFFENSE_DOWN_MULTIPLIER, OFFENSE_UP_MULTIPLIER,
};
use super::party::CombatantInfo;

/// Elemental wheel: each element is amplified against its counter and
/// resisted by its own kind.
///
/// Flame melts Frost, Frost stills Gale, Gale scours Terra, Terra
/// smothers Flame; Radiant and Umbral burn each other.
pub fn element_multiplier(attacking: Element, affinity: Element) -> f32 {
    if attacking == Element::None || affinity == Element::None {
        return 1.0;
    }
    if attacking == affinity {
        return ELEMENT_WEAK_MULTIPLIER;
    }

    let strong_against = matches!(
        (attacking, affinity),
        (Element::Flame, Element::Frost)
            | (Element::Frost, Element::Gale)
            | (Element::Gale, Element::Terra)
            | (Element::Terra, Element::Flame)
            | (Element::Radiant, Element::Umbral)
            | (Element::Umbral, Element::Radiant)
    );

    if strong_against {
        ELEMENT_STRONG_MULTIPLIER
    } else {
        1.0
    }
}

/// Offense status multiplier for an attacker (buff and debuff can coexist
/// and partially cancel).
fn offense_multiplier(offense_up: bool, offense_down: bool) -> f32 {
    let mut mult = 1.0;
    if offense_up {
        mult *= OFFENSE_UP_MULTIPLIER;
    }
    if offense_down {
        mult *= OFFENSE_DOWN_MULTIPLIER;
    }
    mult
}

/// Pre-mitigation magnitude shared by the estimate and roll paths.
fn base_damage(
    effect: &EffectConfig,
    attacker_attack: i32,
    element_mult: f32,
    offense_mult: f32,
    target_max_health: i32,
    target_current_health: i32,
    target_resilience: i32,
) -> f32 {
    let raw = match effect.kind {
        EffectKind::RawDamage => (effect.value + attacker_attack - target_resilience).max(1) as f32,
        EffectKind::PercentDamage => (target_max_health * effect.value / 100).max(1) as f32,
        // An instant kill is worth exactly what's left of the target
        EffectKind::InstantDeath => target_current_health as f32,
        _ => 0.0,
    };

    raw * element_mult * offense_mult
}

/// Expected damage of one effect against one target, as the AI values it:
/// element and offense statuses applied, blind halved, shield and barrier
/// soak subtracted unless bypassed. Never negative.
pub fn estimate_damage(
    effect: &EffectConfig,
    element: Element,
    attacker: &CombatantInfo,
    target: &CombatantInfo,
) -> i32 {
    let mut amount = base_damage(
        effect,
        attacker.attack,
        element_multiplier(element, target.affinity),
        offense_multiplier(attacker.offense_up, attacker.offense_down),
        target.max_health,
        target.current_health,
        target.resilience,
    );

    if attacker.blind {
        amount *= BLIND_EXPECTATION_MULTIPLIER;
    }

    // Soak reduces how much of the hit reaches health
    if !effect.bypass_shields {
        amount -= target.shield_points as f32;
    }
    if !effect.bypass_barrier {
        amount -= target.barrier_points as f32;
    }

    (amount as i32).max(0)
}

/// Expected healing of one effect on one target: capped by missing
/// health; resurrection is worth the health it would restore and nothing
/// on the living.
pub fn estimate_heal(effect: &EffectConfig, target: &CombatantInfo) -> i32 {
    let missing = target.max_health - target.current_health;
    match effect.kind {
        EffectKind::RawHeal => {
            if target.alive {
                effect.value.min(missing).max(0)
            } else {
                0
            }
        }
        EffectKind::PercentHeal => {
            if target.alive {
                (target.max_health * effect.value / 100).min(missing).max(0)
            } else {
                0
            }
        }
        EffectKind::Resurrect => {
            if target.alive {
                0
            } else {
                (target.max_health * effect.value / 100).max(1)
            }
        }
        _ => 0,
    }
}

/// Outcome of one executed offensive effect, before shield/barrier soak.
pub struct DamageRoll {
    /// Pre-mitigation amount (0 on a miss)
    pub amount: i32,
    /// The attacker was blind and the effect went wide
    pub missed: bool,
}

/// Roll one offensive effect for real. Variance is applied to the
/// pre-mitigation amount; the executor owns soak ordering because it
/// mutates the target's shield and barrier pools.
pub fn roll_damage(
    effect: &EffectConfig,
    element: Element,
    is_charged: bool,
    charge_multiplier: f32,
    attacker: &Combatant,
    target: &Combatant,
    rng: &mut GameRng,
) -> DamageRoll {
    if attacker.blind && rng.random_f32() < BLIND_MISS_CHANCE {
        return DamageRoll {
            amount: 0,
            missed: true,
        };
    }

    let mut amount = base_damage(
        effect,
        attacker.attack,
        element_multiplier(element, target.affinity),
        offense_multiplier(attacker.offense_up, attacker.offense_down),
        target.max_health,
        target.current_health,
        target.resilience,
    );

    // Instant death ignores variance; anything else wobbles a little
    if effect.kind != EffectKind::InstantDeath {
        amount *= rng.random_range(1.0 - MAGNITUDE_VARIANCE, 1.0 + MAGNITUDE_VARIANCE);
    }
    if is_charged {
        amount *= charge_multiplier;
    }

    DamageRoll {
        amount: (amount as i32).max(0),
        missed: false,
    }
}

/// Roll one restorative effect for real. Returns the amount to apply;
/// the executor clamps to missing health when applying.
pub fn roll_heal(
    effect: &EffectConfig,
    is_charged: bool,
    charge_multiplier: f32,
    target: &Combatant,
    rng: &mut GameRng,
) -> i32 {
    let mut amount = match effect.kind {
        EffectKind::RawHeal => effect.value as f32,
        EffectKind::PercentHeal | EffectKind::Resurrect => {
            (target.max_health * effect.value / 100) as f32
        }
        _ => 0.0,
    };

    if effect.kind != EffectKind::Resurrect {
        amount *= rng.random_range(1.0 - MAGNITUDE_VARIANCE, 1.0 + MAGNITUDE_VARIANCE);
    }
    if is_charged {
        amount *= charge_multiplier;
    }

    (amount as i32).max(0)
}
