//! JSON configuration parsing for headless battles
//!
//! Parses JSON battle configurations and converts them into the spawn
//! plan the runner consumes.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::battle::components::{Archetype, Row};

/// Headless battle configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessBattleConfig {
    /// Left party composition (1-4 archetype names)
    pub left_party: Vec<String>,
    /// Right party composition (1-4 archetype names)
    pub right_party: Vec<String>,
    /// Optional per-slot rows for the left party ("Front" or "Back");
    /// missing slots default to front for the first two, back after
    #[serde(default)]
    pub left_rows: Vec<String>,
    /// Optional per-slot rows for the right party
    #[serde(default)]
    pub right_rows: Vec<String>,
    /// Maximum battle duration in seconds (default: 300)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Random seed for deterministic battle reproduction
    /// If provided, the battle will use a seeded RNG for reproducible results
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Custom output path for the battle log (optional)
    #[serde(default)]
    pub output_path: Option<String>,
}

fn default_max_duration() -> f32 {
    300.0
}

/// One party's spawn plan: archetype and row per slot.
pub type PartyPlan = Vec<(Archetype, Row)>;

impl HeadlessBattleConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: HeadlessBattleConfig = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse JSON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        // Validate party sizes
        if self.left_party.is_empty() || self.left_party.len() > 4 {
            return Err("left_party must have 1-4 members".to_string());
        }
        if self.right_party.is_empty() || self.right_party.len() > 4 {
            return Err("right_party must have 1-4 members".to_string());
        }

        // Validate archetype names
        for name in self.left_party.iter().chain(self.right_party.iter()) {
            Self::parse_archetype(name)?;
        }

        // Validate row names
        for name in self.left_rows.iter().chain(self.right_rows.iter()) {
            Self::parse_row(name)?;
        }
        if self.left_rows.len() > self.left_party.len() {
            return Err("left_rows has more entries than left_party".to_string());
        }
        if self.right_rows.len() > self.right_party.len() {
            return Err("right_rows has more entries than right_party".to_string());
        }

        // Validate max duration
        if self.max_duration_secs <= 0.0 {
            return Err("max_duration_secs must be positive".to_string());
        }

        Ok(())
    }

    /// Parse an archetype name string into Archetype
    fn parse_archetype(name: &str) -> Result<Archetype, String> {
        match name {
            "Vanguard" => Ok(Archetype::Vanguard),
            "Sentinel" => Ok(Archetype::Sentinel),
            "Arcanist" => Ok(Archetype::Arcanist),
            "Cleric" => Ok(Archetype::Cleric),
            "Shadowblade" => Ok(Archetype::Shadowblade),
            "Warden" => Ok(Archetype::Warden),
            _ => Err(format!(
                "Unknown archetype: '{}'. Valid archetypes: Vanguard, Sentinel, Arcanist, Cleric, Shadowblade, Warden",
                name
            )),
        }
    }

    /// Parse a row name string into Row
    fn parse_row(name: &str) -> Result<Row, String> {
        match name {
            "Front" => Ok(Row::Front),
            "Back" => Ok(Row::Back),
            _ => Err(format!("Unknown row: '{}'. Valid rows: Front, Back", name)),
        }
    }

    /// Default row for a slot with no explicit assignment: the first two
    /// slots hold the line, later slots hang back.
    fn default_row(slot: usize) -> Row {
        if slot < 2 {
            Row::Front
        } else {
            Row::Back
        }
    }

    fn party_plan(members: &[String], rows: &[String]) -> Result<PartyPlan, String> {
        members
            .iter()
            .enumerate()
            .map(|(slot, name)| {
                let archetype = Self::parse_archetype(name)?;
                let row = match rows.get(slot) {
                    Some(row_name) => Self::parse_row(row_name)?,
                    None => Self::default_row(slot),
                };
                Ok((archetype, row))
            })
            .collect()
    }

    /// Convert to the spawn plans the runner consumes
    pub fn to_party_plans(&self) -> Result<(PartyPlan, PartyPlan), String> {
        let left = Self::party_plan(&self.left_party, &self.left_rows)?;
        let right = Self::party_plan(&self.right_party, &self.right_rows)?;
        Ok((left, right))
    }
}
