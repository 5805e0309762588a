//! Data-Driven Ability Configuration
//!
//! This module provides data-driven ability definitions loaded from RON config files.
//! Instead of hardcoding ability stats in Rust, abilities are defined in `assets/config/abilities.ron`.
//!
//! ## Benefits
//! - Balance changes don't require recompilation
//! - Easier to review and modify ability values
//! - Validates all abilities exist at startup
//!
//! ## Usage
//! ```ignore
//! fn my_system(abilities: Res<AbilityDefinitions>) {
//!     let def = abilities.get(&AbilityType::Emberbolt).unwrap();
//!     println!("Emberbolt energy cost: {}", def.energy_cost);
//! }
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::abilities::{AbilityType, EffectKind, Element, TargetShape};

/// A single effect an ability applies to each affected target.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EffectConfig {
    /// What the effect does
    pub kind: EffectKind,
    /// Effect magnitude (meaning depends on kind)
    /// - RawDamage / RawHeal: flat base amount
    /// - PercentDamage / PercentHeal / Resurrect: percentage of the
    ///   target's maximum health
    /// - InstantDeath: unused
    pub value: i32,
    /// Ignore the target's shield points
    #[serde(default)]
    pub bypass_shields: bool,
    /// Ignore the target's barrier points
    #[serde(default)]
    pub bypass_barrier: bool,
    /// Stun the target on hit
    #[serde(default)]
    pub stun: bool,
}

fn default_element_none() -> Element {
    Element::None
}

/// Complete ability configuration loaded from RON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AbilityConfig {
    /// Display name of the ability
    pub name: String,

    // === Targeting ===
    /// Area covered once the primary target is chosen
    pub target_shape: TargetShape,
    /// Targets the performer's own party instead of the opposing one
    #[serde(default)]
    pub targets_allies: bool,
    /// Reaches the back row even while the front row stands
    #[serde(default)]
    pub ranged: bool,
    /// May be aimed at dead targets (resurrection)
    #[serde(default)]
    pub can_target_dead: bool,

    // === Cost ===
    /// Energy bars consumed per use (at least 1)
    pub energy_cost: u32,
    /// Usable only at full energy; drains every bar and lands amplified
    #[serde(default)]
    pub requires_charge: bool,

    // === Effects ===
    /// Element applied to all of this ability's effects
    #[serde(default = "default_element_none")]
    pub element: Element,
    /// Effects applied, in order, to every affected target
    pub effects: Vec<EffectConfig>,
}

impl AbilityConfig {
    /// Returns true if any effect routes through the damage formula
    pub fn is_offensive(&self) -> bool {
        self.effects.iter().any(|e| e.kind.is_offensive())
    }

    /// Returns true if any effect routes through the heal formula
    pub fn is_restorative(&self) -> bool {
        self.effects.iter().any(|e| e.kind.is_restorative())
    }

    /// Check whether a combatant with the given energy state can perform
    /// this ability right now. Cost and charge gating only; target
    /// validity is resolved elsewhere.
    pub fn performable_with(&self, energy_bars: u32, max_energy_bars: u32) -> bool {
        if energy_bars < self.energy_cost {
            return false;
        }
        if self.requires_charge && energy_bars < max_energy_bars {
            return false;
        }
        true
    }
}

/// Root structure for the abilities.ron file
#[derive(Debug, Serialize, Deserialize)]
pub struct AbilitiesConfig {
    pub abilities: HashMap<AbilityType, AbilityConfig>,
}

/// Resource containing all ability definitions.
///
/// Loaded from `assets/config/abilities.ron` at startup.
/// Access via `Res<AbilityDefinitions>` in systems.
#[derive(Resource)]
pub struct AbilityDefinitions {
    definitions: HashMap<AbilityType, AbilityConfig>,
}

impl Default for AbilityDefinitions {
    /// Load ability definitions from the default config file.
    /// Panics if the file cannot be loaded - use for tests only.
    fn default() -> Self {
        load_ability_definitions()
            .expect("Failed to load ability definitions in Default impl")
    }
}

impl AbilityDefinitions {
    /// Create from a loaded config
    pub fn new(config: AbilitiesConfig) -> Self {
        Self {
            definitions: config.abilities,
        }
    }

    /// Get the configuration for an ability type
    pub fn get(&self, ability: &AbilityType) -> Option<&AbilityConfig> {
        self.definitions.get(ability)
    }

    /// Get the configuration for an ability type, panicking if not found.
    /// Use this when you know the ability must exist (validated at startup).
    pub fn get_unchecked(&self, ability: &AbilityType) -> &AbilityConfig {
        self.definitions.get(ability)
            .unwrap_or_else(|| panic!("Ability {:?} not found in definitions", ability))
    }

    /// Check if all expected ability types are defined
    pub fn validate(&self) -> Result<(), Vec<AbilityType>> {
        let expected_abilities = [
            AbilityType::Strike,
            AbilityType::CrescentSweep,
            AbilityType::Skewer,
            AbilityType::ShieldBash,
            AbilityType::GroundSlam,
            AbilityType::Emberbolt,
            AbilityType::Flamewave,
            AbilityType::Permafrost,
            AbilityType::Starfall,
            AbilityType::Mend,
            AbilityType::Prayer,
            AbilityType::Rekindle,
            AbilityType::Smite,
            AbilityType::Shadowstab,
            AbilityType::ThousandCuts,
            AbilityType::DeathMark,
            AbilityType::PiercingShot,
            AbilityType::Volley,
            AbilityType::Longshot,
        ];

        let missing: Vec<AbilityType> = expected_abilities
            .into_iter()
            .filter(|ability| !self.definitions.contains_key(ability))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }

    /// Get all ability types that are defined
    pub fn ability_types(&self) -> impl Iterator<Item = &AbilityType> {
        self.definitions.keys()
    }
}

/// Load ability definitions from assets/config/abilities.ron
pub fn load_ability_definitions() -> Result<AbilityDefinitions, String> {
    let config_path = "assets/config/abilities.ron";

    let contents = std::fs::read_to_string(config_path)
        .map_err(|e| format!("Failed to read {}: {}", config_path, e))?;

    let config: AbilitiesConfig = ron::from_str(&contents)
        .map_err(|e| format!("Failed to parse {}: {}", config_path, e))?;

    let definitions = AbilityDefinitions::new(config);

    // Validate all expected abilities are defined
    definitions.validate()
        .map_err(|missing| format!(
            "Missing ability definitions: {:?}",
            missing
        ))?;

    // An ability that costs nothing would never be gated by energy and
    // would break the selector's resource arithmetic
    for ability in definitions.ability_types() {
        let def = definitions.get_unchecked(ability);
        if def.energy_cost < 1 {
            return Err(format!("{:?} must cost at least one energy bar", ability));
        }
        if def.effects.is_empty() {
            return Err(format!("{:?} has no effects", ability));
        }
    }

    info!("Loaded {} ability definitions from {}", definitions.definitions.len(), config_path);

    Ok(definitions)
}

/// Bevy plugin for ability configuration loading
pub struct AbilityConfigPlugin;

impl Plugin for AbilityConfigPlugin {
    fn build(&self, app: &mut App) {
        // Load ability definitions at startup
        match load_ability_definitions() {
            Ok(definitions) => {
                app.insert_resource(definitions);
            }
            Err(e) => {
                // Config must be valid for the battle to mean anything
                panic!("Failed to load ability definitions: {}", e);
            }
        }
    }
}
