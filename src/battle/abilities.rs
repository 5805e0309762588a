//! Ability System - Types and Enums
//!
//! This module contains ability-related types and enums.
//! Actual ability definitions are loaded from `assets/config/abilities.ron`
//! via the `ability_config` module.

use serde::{Deserialize, Serialize};

/// Elements carried by abilities and combatant affinities. Attacking into
/// a weakness amplifies damage; attacking into a matching affinity is
/// resisted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Element {
    /// No element (can't be amplified or resisted)
    None,
    Flame,
    Frost,
    Gale,
    Terra,
    Radiant,
    Umbral,
}

/// The area an ability covers once a primary target is chosen.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TargetShape {
    /// Only the primary target
    Single,
    /// Everyone in the primary target's row
    SameRow,
    /// Everyone in the primary target's line (column)
    SameLine,
    /// The primary target's entire party
    WholeParty,
}

/// What a single ability effect does to each affected target.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum EffectKind {
    /// Flat damage scaled by attacker and target stats
    RawDamage,
    /// Damage as a percentage of the target's maximum health
    PercentDamage,
    /// Reduces the target to zero health outright
    InstantDeath,
    /// Flat healing
    RawHeal,
    /// Healing as a percentage of the target's maximum health
    PercentHeal,
    /// Returns a dead target to life with a fraction of maximum health
    Resurrect,
}

impl EffectKind {
    /// True for effects routed through the damage formula.
    pub fn is_offensive(&self) -> bool {
        matches!(
            self,
            EffectKind::RawDamage | EffectKind::PercentDamage | EffectKind::InstantDeath
        )
    }

    /// True for effects routed through the heal formula.
    pub fn is_restorative(&self) -> bool {
        matches!(
            self,
            EffectKind::RawHeal | EffectKind::PercentHeal | EffectKind::Resurrect
        )
    }
}

/// Enum representing available abilities.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum AbilityType {
    // Vanguard abilities
    Strike,
    CrescentSweep, // Row-wide melee arc
    Skewer,        // Line-piercing thrust
    // Sentinel abilities
    ShieldBash, // Single-target hit that stuns
    GroundSlam, // Party-wide tremor
    // Arcanist abilities
    Emberbolt,
    Flamewave,  // Row-wide fire wash
    Permafrost, // Line-freezing bolt, stuns
    Starfall,   // Charged party-wide barrage
    // Cleric abilities
    Mend,
    Prayer,   // Party-wide percent heal
    Rekindle, // Resurrect a fallen ally
    Smite,
    // Shadowblade abilities
    Shadowstab,   // Slips past shields
    ThousandCuts, // Line-wide flurry
    DeathMark,    // Charged assassination
    // Warden abilities
    PiercingShot, // Punches through barriers
    Volley,       // Row-wide arrow rain
    Longshot,     // Line-piercing arrow
}
