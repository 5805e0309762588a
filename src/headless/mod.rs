//! Headless battle mode
//!
//! This module provides functionality to run battles without any
//! graphical output, suitable for automated testing and batch analysis.
//!
//! ## Usage
//!
//! ```bash
//! # Run a headless battle
//! cargo run --release -- battle_config.json
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "left_party": ["Vanguard", "Cleric"],
//!   "right_party": ["Arcanist", "Shadowblade"],
//!   "max_duration_secs": 120,
//!   "random_seed": 42
//! }
//! ```

pub mod config;
pub mod runner;

pub use config::HeadlessBattleConfig;
pub use runner::{run_headless_battle, BattleResult, CombatantResult};
