//! Headless battle execution
//!
//! Runs battles without any graphical output, suitable for automated testing.

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use std::time::Duration;

use crate::battle::ability_config::AbilityConfigPlugin;
use crate::battle::systems::{
    self, combatant_id, ActionSelector, BattleClock, Combatant, FieldPosition, GameRng, Side,
};
use crate::combat::log::{BattleMetadata, CombatLog, CombatantMetadata};

use super::config::{HeadlessBattleConfig, PartyPlan};

/// Result of a completed headless battle
///
/// This struct provides programmatic access to battle results for testing and analysis.
#[derive(Debug, Clone)]
pub struct BattleResult {
    /// The winning side, or None for a draw
    pub winner: Option<Side>,
    /// Total battle duration in seconds
    pub battle_time: f32,
    /// Combatant statistics from the battle
    pub left_party: Vec<CombatantResult>,
    /// Combatant statistics from the battle
    pub right_party: Vec<CombatantResult>,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
}

/// Statistics for a single combatant after the battle
#[derive(Debug, Clone)]
pub struct CombatantResult {
    /// Archetype name (e.g., "Vanguard", "Cleric")
    pub archetype: String,
    /// Maximum health
    pub max_health: i32,
    /// Health remaining at battle end (0 if dead)
    pub final_health: i32,
    /// Whether this combatant survived
    pub survived: bool,
    /// Total damage dealt during the battle
    pub damage_dealt: i32,
    /// Total damage taken during the battle
    pub damage_taken: i32,
    /// Total healing done during the battle
    pub healing_done: i32,
}

/// Resource tracking headless battle state
#[derive(Resource)]
pub struct HeadlessBattleState {
    /// Maximum battle duration before declaring a draw
    pub max_duration: f32,
    /// Custom output path for the battle log
    pub output_path: Option<String>,
    /// Whether the battle has completed
    pub battle_complete: bool,
    /// Random seed for deterministic simulation (if provided)
    pub random_seed: Option<u64>,
    /// Battle result (populated when the battle completes)
    pub result: Option<BattleResult>,
}

/// The spawn plans derived from the validated config.
#[derive(Resource)]
pub struct BattlePlan {
    pub left: PartyPlan,
    pub right: PartyPlan,
}

/// Plugin for headless battle execution
pub struct HeadlessPlugin {
    pub config: HeadlessBattleConfig,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        let (left, right) = self
            .config
            .to_party_plans()
            .expect("Invalid battle configuration");

        app.insert_resource(BattlePlan { left, right })
            .insert_resource(HeadlessBattleState {
                max_duration: self.config.max_duration_secs,
                output_path: self.config.output_path.clone(),
                battle_complete: false,
                random_seed: self.config.random_seed,
                result: None,
            })
            .init_resource::<CombatLog>()
            .init_resource::<BattleClock>();

        // Configure battle system phase ordering
        systems::configure_battle_system_ordering(app);

        // Add core battle systems using the shared API (always run in headless mode)
        systems::add_core_battle_systems(app, || true);

        // Add headless-specific systems after battle resolution
        app.add_systems(Startup, headless_setup_battle).add_systems(
            Update,
            headless_check_battle_end.after(systems::BattleSystemPhase::Resolution),
        );
        app.add_systems(PostUpdate, headless_exit_on_complete);
    }
}

/// Setup system for a headless battle
fn headless_setup_battle(
    mut commands: Commands,
    plan: Res<BattlePlan>,
    headless_state: Res<HeadlessBattleState>,
    mut combat_log: ResMut<CombatLog>,
) {
    // Clear and initialize the combat log
    combat_log.clear();
    combat_log.log_battle_event("Battle started (headless mode)".to_string());

    // Initialize GameRng with seed if provided (deterministic mode)
    let game_rng = match headless_state.random_seed {
        Some(seed) => {
            info!("Using deterministic RNG with seed: {}", seed);
            GameRng::from_seed(seed)
        }
        None => {
            info!("Using non-deterministic RNG (no seed provided)");
            GameRng::from_entropy()
        }
    };
    commands.insert_resource(game_rng);

    for (side, party) in [(Side::Left, &plan.left), (Side::Right, &plan.right)] {
        for (slot, (archetype, row)) in party.iter().enumerate() {
            let combatant = Combatant::new(side, slot as u8, *archetype);
            combat_log.register_combatant(combatant_id(&combatant));

            let profile = archetype.profile();
            commands.spawn((
                combatant,
                FieldPosition {
                    side,
                    row: *row,
                    line: slot as u8,
                },
                ActionSelector::new(profile),
            ));
        }
    }

    info!(
        "Headless battle setup complete: Left ({} members) vs Right ({} members)",
        plan.left.len(),
        plan.right.len()
    );
}

/// Check if the battle has ended (one or both parties eliminated, or timeout)
fn headless_check_battle_end(
    combatants: Query<&Combatant>,
    clock: Res<BattleClock>,
    combat_log: ResMut<CombatLog>,
    mut headless_state: ResMut<HeadlessBattleState>,
) {
    if headless_state.battle_complete {
        return;
    }

    // Check for timeout first
    if clock.elapsed >= headless_state.max_duration {
        info!(
            "Battle timed out after {:.1}s - declaring DRAW",
            clock.elapsed
        );
        finish_battle(None, &combatants, &clock, combat_log, &mut headless_state);
        return;
    }

    // Check party survival
    let left_alive = combatants
        .iter()
        .any(|c| c.side == Side::Left && c.is_alive());
    let right_alive = combatants
        .iter()
        .any(|c| c.side == Side::Right && c.is_alive());

    if !left_alive || !right_alive {
        let winner = if !left_alive && !right_alive {
            info!("Battle ended in a DRAW (both parties eliminated simultaneously)!");
            None
        } else if left_alive {
            info!("Battle ended! Left party wins!");
            Some(Side::Left)
        } else {
            info!("Battle ended! Right party wins!");
            Some(Side::Right)
        };

        finish_battle(winner, &combatants, &clock, combat_log, &mut headless_state);
    }
}

/// Build the result, save the log, and mark the battle complete.
fn finish_battle(
    winner: Option<Side>,
    combatants: &Query<&Combatant>,
    clock: &BattleClock,
    mut combat_log: ResMut<CombatLog>,
    headless_state: &mut HeadlessBattleState,
) {
    combat_log.log_battle_event(match winner {
        Some(side) => format!("{} party wins", side.name()),
        None => "Battle ends in a draw".to_string(),
    });

    let result = build_battle_result(combatants, winner, clock, headless_state);
    save_battle_log(combatants, &combat_log, winner, clock, headless_state);
    headless_state.result = Some(result);
    headless_state.battle_complete = true;
}

/// Build the BattleResult from current combatant state
fn build_battle_result(
    combatants: &Query<&Combatant>,
    winner: Option<Side>,
    clock: &BattleClock,
    headless_state: &HeadlessBattleState,
) -> BattleResult {
    let mut left_party = Vec::new();
    let mut right_party = Vec::new();

    let mut sorted: Vec<&Combatant> = combatants.iter().collect();
    sorted.sort_by_key(|c| (c.side as u8, c.slot));

    for combatant in sorted {
        let result = CombatantResult {
            archetype: combatant.archetype.name().to_string(),
            max_health: combatant.max_health,
            final_health: combatant.current_health,
            survived: combatant.is_alive(),
            damage_dealt: combatant.damage_dealt,
            damage_taken: combatant.damage_taken,
            healing_done: combatant.healing_done,
        };

        if combatant.side == Side::Left {
            left_party.push(result);
        } else {
            right_party.push(result);
        }
    }

    BattleResult {
        winner,
        battle_time: clock.elapsed,
        left_party,
        right_party,
        random_seed: headless_state.random_seed,
    }
}

/// Save the combat log to a file
fn save_battle_log(
    combatants: &Query<&Combatant>,
    combat_log: &CombatLog,
    winner: Option<Side>,
    clock: &BattleClock,
    headless_state: &HeadlessBattleState,
) {
    let mut left_metadata = Vec::new();
    let mut right_metadata = Vec::new();

    let mut sorted: Vec<&Combatant> = combatants.iter().collect();
    sorted.sort_by_key(|c| (c.side as u8, c.slot));

    for combatant in sorted {
        let metadata = CombatantMetadata {
            id: combatant_id(combatant),
            archetype: combatant.archetype.name().to_string(),
            max_health: combatant.max_health,
            final_health: combatant.current_health,
            damage_dealt: combatant.damage_dealt,
            damage_taken: combatant.damage_taken,
            healing_done: combatant.healing_done,
        };

        if combatant.side == Side::Left {
            left_metadata.push(metadata);
        } else {
            right_metadata.push(metadata);
        }
    }

    let battle_metadata = BattleMetadata {
        winner: winner.map(|side| side.name().to_string()),
        duration_secs: clock.elapsed,
        random_seed: headless_state.random_seed,
        left_party: left_metadata,
        right_party: right_metadata,
    };

    match combat_log.save_to_file(&battle_metadata, headless_state.output_path.as_deref()) {
        Ok(filename) => {
            println!("Battle complete. Log saved to: {}", filename);
        }
        Err(e) => {
            eprintln!("Failed to save battle log: {}", e);
        }
    }
}

/// Exit the app when the battle is complete
fn headless_exit_on_complete(
    headless_state: Res<HeadlessBattleState>,
    mut exit: EventWriter<AppExit>,
) {
    if headless_state.battle_complete {
        exit.send(AppExit::Success);
    }
}

/// Run a headless battle with the given configuration
pub fn run_headless_battle(config: HeadlessBattleConfig) -> Result<(), String> {
    println!("Starting headless battle simulation...");
    println!("  Left party: {:?}", config.left_party);
    println!("  Right party: {:?}", config.right_party);
    println!("  Max duration: {:.0}s", config.max_duration_secs);

    config.validate()?;

    App::new()
        // Minimal plugins - no window, no rendering
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
        )
        // Load ability definitions from config
        .add_plugins(AbilityConfigPlugin)
        // Our headless battle plugin
        .add_plugins(HeadlessPlugin { config })
        .run();

    Ok(())
}
