//! Combat logging
//!
//! Records all battle events for post-battle analysis. Entries carry both
//! a human-readable message and structured data, so the log can answer
//! aggregate questions (damage by ability, killing blows, survival) and
//! be saved as JSON alongside battle metadata.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier for a combatant in the log, e.g. "Left Vanguard 0".
pub type CombatantId = String;

/// Types of combat log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatLogEventType {
    /// Damage dealt
    Damage,
    /// Healing done (including resurrection)
    Healing,
    /// Ability used
    AbilityUsed,
    /// Combatant died
    Death,
    /// Battle event (start, end, misses, etc.)
    BattleEvent,
}

/// Structured payload attached to log entries that carry one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StructuredEventData {
    Damage {
        source: CombatantId,
        target: CombatantId,
        ability: String,
        amount: i32,
        killing_blow: bool,
    },
    Healing {
        source: CombatantId,
        target: CombatantId,
        ability: String,
        amount: i32,
    },
    AbilityUsed {
        actor: CombatantId,
        ability: String,
        target: Option<CombatantId>,
    },
    Death {
        victim: CombatantId,
        killer: Option<CombatantId>,
    },
    None,
}

/// A single entry in the combat log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatLogEntry {
    /// Timestamp in battle time (seconds since battle start)
    pub timestamp: f32,
    /// The type of event
    pub event_type: CombatLogEventType,
    /// Structured payload for aggregation queries
    pub data: StructuredEventData,
    /// Human-readable description of the event
    pub message: String,
}

/// The combat log resource storing all events
#[derive(Resource, Default)]
pub struct CombatLog {
    /// All log entries in chronological order
    pub entries: Vec<CombatLogEntry>,
    /// Current battle time
    pub battle_time: f32,
    /// Every combatant that entered the battle
    registered: Vec<CombatantId>,
}

impl CombatLog {
    /// Clear the log for a new battle
    pub fn clear(&mut self) {
        self.entries.clear();
        self.battle_time = 0.0;
        self.registered.clear();
    }

    /// Register a combatant so it appears in queries even if it never
    /// shows up in an event
    pub fn register_combatant(&mut self, id: CombatantId) {
        if !self.registered.contains(&id) {
            self.registered.push(id);
        }
    }

    /// Add a new entry with no structured payload
    pub fn log(&mut self, event_type: CombatLogEventType, message: String) {
        self.push(event_type, StructuredEventData::None, message);
    }

    /// Add a battle event (start, end, misses)
    pub fn log_battle_event(&mut self, message: String) {
        self.push(
            CombatLogEventType::BattleEvent,
            StructuredEventData::None,
            message,
        );
    }

    /// Add a damage entry
    pub fn log_damage(
        &mut self,
        source: CombatantId,
        target: CombatantId,
        ability: String,
        amount: i32,
        killing_blow: bool,
        message: String,
    ) {
        self.push(
            CombatLogEventType::Damage,
            StructuredEventData::Damage {
                source,
                target,
                ability,
                amount,
                killing_blow,
            },
            message,
        );
    }

    /// Add a healing entry
    pub fn log_healing(
        &mut self,
        source: CombatantId,
        target: CombatantId,
        ability: String,
        amount: i32,
        message: String,
    ) {
        self.push(
            CombatLogEventType::Healing,
            StructuredEventData::Healing {
                source,
                target,
                ability,
                amount,
            },
            message,
        );
    }

    /// Add an ability-use entry
    pub fn log_ability_use(
        &mut self,
        actor: CombatantId,
        ability: String,
        target: Option<CombatantId>,
        message: String,
    ) {
        self.push(
            CombatLogEventType::AbilityUsed,
            StructuredEventData::AbilityUsed {
                actor,
                ability,
                target,
            },
            message,
        );
    }

    /// Add a death entry
    pub fn log_death(
        &mut self,
        victim: CombatantId,
        killer: Option<CombatantId>,
        message: String,
    ) {
        self.push(
            CombatLogEventType::Death,
            StructuredEventData::Death { victim, killer },
            message,
        );
    }

    fn push(&mut self, event_type: CombatLogEventType, data: StructuredEventData, message: String) {
        self.entries.push(CombatLogEntry {
            timestamp: self.battle_time,
            event_type,
            data,
            message,
        });
    }

    // ========================================================================
    // Query API
    // ========================================================================

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: CombatLogEventType) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Get only HP-changing events (damage and healing)
    pub fn hp_changes_only(&self) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    e.event_type,
                    CombatLogEventType::Damage | CombatLogEventType::Healing
                )
            })
            .collect()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&CombatLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Total damage dealt per ability by one combatant
    pub fn damage_by_ability(&self, id: &str) -> HashMap<String, i32> {
        let mut totals = HashMap::new();
        for entry in &self.entries {
            if let StructuredEventData::Damage {
                source,
                ability,
                amount,
                ..
            } = &entry.data
            {
                if source == id {
                    *totals.entry(ability.clone()).or_insert(0) += amount;
                }
            }
        }
        totals
    }

    /// Total healing done per ability by one combatant
    pub fn healing_by_ability(&self, id: &str) -> HashMap<String, i32> {
        let mut totals = HashMap::new();
        for entry in &self.entries {
            if let StructuredEventData::Healing {
                source,
                ability,
                amount,
                ..
            } = &entry.data
            {
                if source == id {
                    *totals.entry(ability.clone()).or_insert(0) += amount;
                }
            }
        }
        totals
    }

    /// Total damage one combatant dealt
    pub fn total_damage_dealt(&self, id: &str) -> i32 {
        self.damage_by_ability(id).values().sum()
    }

    /// Total damage one combatant received
    pub fn total_damage_taken(&self, id: &str) -> i32 {
        self.entries
            .iter()
            .filter_map(|entry| match &entry.data {
                StructuredEventData::Damage { target, amount, .. } if target == id => Some(amount),
                _ => None,
            })
            .sum()
    }

    /// Total healing one combatant did
    pub fn total_healing_done(&self, id: &str) -> i32 {
        self.healing_by_ability(id).values().sum()
    }

    /// Number of killing blows one combatant landed
    pub fn killing_blows(&self, id: &str) -> usize {
        self.entries
            .iter()
            .filter(|entry| {
                matches!(
                    &entry.data,
                    StructuredEventData::Damage { source, killing_blow, .. }
                        if source == id && *killing_blow
                )
            })
            .count()
    }

    /// Whether a combatant ended the battle standing. A death entry marks
    /// them fallen; any later healing on them is a revival.
    pub fn combatant_survived(&self, id: &str) -> bool {
        let mut alive = true;
        for entry in &self.entries {
            match &entry.data {
                StructuredEventData::Death { victim, .. } if victim == id => alive = false,
                StructuredEventData::Healing { target, .. } if target == id && !alive => {
                    alive = true;
                }
                _ => {}
            }
        }
        alive
    }

    /// Every combatant the log knows about (registration order first)
    pub fn all_combatants(&self) -> Vec<CombatantId> {
        let mut ids = self.registered.clone();
        for entry in &self.entries {
            let mentioned: Vec<&CombatantId> = match &entry.data {
                StructuredEventData::Damage { source, target, .. } => vec![source, target],
                StructuredEventData::Healing { source, target, .. } => vec![source, target],
                StructuredEventData::AbilityUsed { actor, .. } => vec![actor],
                StructuredEventData::Death { victim, .. } => vec![victim],
                StructuredEventData::None => vec![],
            };
            for id in mentioned {
                if !ids.contains(id) {
                    ids.push(id.clone());
                }
            }
        }
        ids
    }

    /// Every ability use by one combatant, as (timestamp, ability name)
    pub fn ability_uses_for(&self, id: &str) -> Vec<(f32, &str)> {
        self.entries
            .iter()
            .filter_map(|entry| match &entry.data {
                StructuredEventData::AbilityUsed { actor, ability, .. } if actor == id => {
                    Some((entry.timestamp, ability.as_str()))
                }
                _ => None,
            })
            .collect()
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Save the log and battle metadata as JSON.
    ///
    /// Returns the path written. With no output path, a name derived from
    /// the battle duration lands in the working directory.
    pub fn save_to_file(
        &self,
        metadata: &BattleMetadata,
        output_path: Option<&str>,
    ) -> Result<String, String> {
        let record = BattleRecord {
            metadata: metadata.clone(),
            entries: self.entries.clone(),
        };

        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| format!("Failed to serialize battle log: {}", e))?;

        let filename = match output_path {
            Some(path) => path.to_string(),
            None => format!("battle_log_{:.0}s.json", metadata.duration_secs),
        };

        std::fs::write(&filename, json)
            .map_err(|e| format!("Failed to write {}: {}", filename, e))?;

        Ok(filename)
    }
}

/// Final per-combatant statistics stored with the saved log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantMetadata {
    pub id: CombatantId,
    pub archetype: String,
    pub max_health: i32,
    pub final_health: i32,
    pub damage_dealt: i32,
    pub damage_taken: i32,
    pub healing_done: i32,
}

/// Battle-level metadata stored with the saved log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleMetadata {
    /// Winning side name, or None for a draw
    pub winner: Option<String>,
    /// Battle duration in seconds
    pub duration_secs: f32,
    /// Random seed used (if deterministic)
    pub random_seed: Option<u64>,
    pub left_party: Vec<CombatantMetadata>,
    pub right_party: Vec<CombatantMetadata>,
}

/// The full on-disk record: metadata plus every log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BattleRecord {
    metadata: BattleMetadata,
    entries: Vec<CombatLogEntry>,
}
