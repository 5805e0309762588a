//! Unit tests for combat log query and aggregation methods
//!
//! These tests verify that the CombatLog correctly:
//! - Aggregates damage and healing by ability
//! - Counts killing blows
//! - Tracks survival through deaths and revivals
//! - Produces well-formed saved records

use regex::Regex;
use squadsim::combat::log::{BattleMetadata, CombatLog, CombatLogEventType};

fn create_test_log() -> CombatLog {
    CombatLog::default()
}

fn log_hit(log: &mut CombatLog, source: &str, target: &str, ability: &str, amount: i32, kill: bool) {
    log.log_damage(
        source.to_string(),
        target.to_string(),
        ability.to_string(),
        amount,
        kill,
        format!(
            "{}'s {} hits {} for {} damage",
            source, ability, target, amount
        ),
    );
}

fn log_heal(log: &mut CombatLog, source: &str, target: &str, ability: &str, amount: i32) {
    log.log_healing(
        source.to_string(),
        target.to_string(),
        ability.to_string(),
        amount,
        format!("{}'s {} heals {} for {}", source, ability, target, amount),
    );
}

// =============================================================================
// Damage Aggregation Tests
// =============================================================================

#[test]
fn test_damage_by_ability_empty_log() {
    let log = create_test_log();
    let damage = log.damage_by_ability("Left Vanguard 0");
    assert!(damage.is_empty(), "Empty log should return empty damage map");
}

#[test]
fn test_damage_by_ability_single_source() {
    let mut log = create_test_log();

    log_hit(&mut log, "Left Vanguard 0", "Right Arcanist 0", "Strike", 50, false);
    log_hit(&mut log, "Left Vanguard 0", "Right Arcanist 0", "Strike", 45, false);
    log_hit(&mut log, "Left Vanguard 0", "Right Arcanist 0", "Skewer", 20, false);

    let damage = log.damage_by_ability("Left Vanguard 0");

    assert_eq!(damage.len(), 2, "Should have 2 different abilities");
    assert_eq!(damage.get("Strike"), Some(&95), "Strike should total 95 damage");
    assert_eq!(damage.get("Skewer"), Some(&20), "Skewer should be 20 damage");
}

#[test]
fn test_damage_by_ability_multiple_sources() {
    let mut log = create_test_log();

    log_hit(&mut log, "Left Vanguard 0", "Right Arcanist 0", "Strike", 50, false);
    log_hit(&mut log, "Right Vanguard 0", "Left Arcanist 0", "Strike", 60, false);

    let left_damage = log.damage_by_ability("Left Vanguard 0");
    let right_damage = log.damage_by_ability("Right Vanguard 0");

    assert_eq!(left_damage.get("Strike"), Some(&50));
    assert_eq!(right_damage.get("Strike"), Some(&60));
}

#[test]
fn test_total_damage_dealt_and_taken() {
    let mut log = create_test_log();

    log_hit(&mut log, "Left Vanguard 0", "Right Arcanist 0", "Strike", 50, false);
    log_hit(&mut log, "Left Vanguard 0", "Right Arcanist 0", "Skewer", 20, false);
    log_hit(&mut log, "Left Vanguard 0", "Right Cleric 1", "Strike", 30, false);
    log_hit(&mut log, "Left Shadowblade 1", "Right Arcanist 0", "Shadowstab", 80, false);

    assert_eq!(log.total_damage_dealt("Left Vanguard 0"), 100);
    assert_eq!(log.total_damage_taken("Right Arcanist 0"), 150);
}

// =============================================================================
// Healing Aggregation Tests
// =============================================================================

#[test]
fn test_healing_by_ability() {
    let mut log = create_test_log();

    log_heal(&mut log, "Left Cleric 1", "Left Vanguard 0", "Mend", 50);
    log_heal(&mut log, "Left Cleric 1", "Left Vanguard 0", "Mend", 45);
    log_heal(&mut log, "Left Cleric 1", "Left Cleric 1", "Mend", 30);

    let healing = log.healing_by_ability("Left Cleric 1");
    assert_eq!(healing.get("Mend"), Some(&125));
}

#[test]
fn test_total_healing_done() {
    let mut log = create_test_log();

    log_heal(&mut log, "Left Cleric 1", "Left Vanguard 0", "Mend", 50);
    log_heal(&mut log, "Left Cleric 1", "Left Cleric 1", "Prayer", 30);

    assert_eq!(log.total_healing_done("Left Cleric 1"), 80);
}

// =============================================================================
// Killing Blow Tests
// =============================================================================

#[test]
fn test_killing_blows_none() {
    let mut log = create_test_log();
    log_hit(&mut log, "Left Vanguard 0", "Right Arcanist 0", "Strike", 50, false);
    assert_eq!(log.killing_blows("Left Vanguard 0"), 0);
}

#[test]
fn test_killing_blows_counted() {
    let mut log = create_test_log();

    log_hit(&mut log, "Left Vanguard 0", "Right Arcanist 0", "Strike", 50, false);
    log_hit(&mut log, "Left Vanguard 0", "Right Arcanist 0", "Strike", 100, true);
    log_hit(&mut log, "Left Vanguard 0", "Right Cleric 1", "Skewer", 20, true);

    assert_eq!(log.killing_blows("Left Vanguard 0"), 2);
}

#[test]
fn test_killing_blows_per_combatant() {
    let mut log = create_test_log();

    log_hit(&mut log, "Left Vanguard 0", "Right Arcanist 0", "Strike", 100, true);
    log_hit(&mut log, "Left Shadowblade 1", "Right Cleric 1", "Shadowstab", 150, true);
    log_hit(&mut log, "Left Shadowblade 1", "Right Warden 2", "Shadowstab", 80, true);

    assert_eq!(log.killing_blows("Left Vanguard 0"), 1);
    assert_eq!(log.killing_blows("Left Shadowblade 1"), 2);
    assert_eq!(log.killing_blows("Right Arcanist 0"), 0);
}

// =============================================================================
// Survival/Death Tests
// =============================================================================

#[test]
fn test_combatant_survived_no_deaths() {
    let mut log = create_test_log();
    log_hit(&mut log, "Left Vanguard 0", "Right Arcanist 0", "Strike", 50, false);

    assert!(log.combatant_survived("Left Vanguard 0"));
    assert!(log.combatant_survived("Right Arcanist 0"));
}

#[test]
fn test_combatant_survived_with_death() {
    let mut log = create_test_log();

    log.log_death(
        "Right Arcanist 0".to_string(),
        Some("Left Vanguard 0".to_string()),
        "Right Arcanist 0 has fallen".to_string(),
    );

    assert!(log.combatant_survived("Left Vanguard 0"), "Killer should survive");
    assert!(
        !log.combatant_survived("Right Arcanist 0"),
        "Dead combatant should not survive"
    );
}

#[test]
fn test_revival_restores_survival() {
    let mut log = create_test_log();

    log.log_death(
        "Left Vanguard 0".to_string(),
        Some("Right Arcanist 0".to_string()),
        "Left Vanguard 0 has fallen".to_string(),
    );
    assert!(!log.combatant_survived("Left Vanguard 0"));

    // Rekindle brings them back
    log_heal(&mut log, "Left Cleric 1", "Left Vanguard 0", "Rekindle", 128);
    assert!(log.combatant_survived("Left Vanguard 0"));
}

// =============================================================================
// All Combatants Tests
// =============================================================================

#[test]
fn test_all_combatants_from_registration() {
    let mut log = create_test_log();

    log.register_combatant("Left Vanguard 0".to_string());
    log.register_combatant("Left Cleric 1".to_string());
    log.register_combatant("Right Arcanist 0".to_string());

    let combatants = log.all_combatants();
    assert_eq!(combatants.len(), 3);
    assert!(combatants.contains(&"Left Vanguard 0".to_string()));
    assert!(combatants.contains(&"Left Cleric 1".to_string()));
    assert!(combatants.contains(&"Right Arcanist 0".to_string()));
}

#[test]
fn test_all_combatants_no_duplicates() {
    let mut log = create_test_log();

    log.register_combatant("Left Vanguard 0".to_string());
    log.register_combatant("Left Vanguard 0".to_string()); // Duplicate

    let combatants = log.all_combatants();
    assert_eq!(combatants.len(), 1);
}

#[test]
fn test_all_combatants_includes_event_participants() {
    let mut log = create_test_log();

    log.register_combatant("Left Vanguard 0".to_string());
    log_hit(&mut log, "Left Vanguard 0", "Right Arcanist 0", "Strike", 50, false);

    let combatants = log.all_combatants();
    assert_eq!(combatants.len(), 2);
    assert!(combatants.contains(&"Right Arcanist 0".to_string()));
}

// =============================================================================
// Ability Use Timeline Tests
// =============================================================================

#[test]
fn test_ability_uses_for_combatant() {
    let mut log = create_test_log();
    log.battle_time = 5.0;

    log.log_ability_use(
        "Left Arcanist 0".to_string(),
        "Emberbolt".to_string(),
        Some("Right Vanguard 0".to_string()),
        "Left Arcanist 0 uses Emberbolt".to_string(),
    );

    log.battle_time = 8.0;
    log.log_ability_use(
        "Left Arcanist 0".to_string(),
        "Flamewave".to_string(),
        None,
        "Left Arcanist 0 uses Flamewave".to_string(),
    );

    let uses = log.ability_uses_for("Left Arcanist 0");
    assert_eq!(uses.len(), 2);
    assert_eq!(uses[0], (5.0, "Emberbolt"));
    assert_eq!(uses[1], (8.0, "Flamewave"));
}

// =============================================================================
// Filter Tests
// =============================================================================

#[test]
fn test_filter_by_type() {
    let mut log = create_test_log();

    log.log_battle_event("Battle started".to_string());
    log_hit(&mut log, "Left Vanguard 0", "Right Arcanist 0", "Strike", 50, false);
    log_heal(&mut log, "Left Cleric 1", "Left Vanguard 0", "Mend", 30);

    assert_eq!(log.filter_by_type(CombatLogEventType::Damage).len(), 1);
    assert_eq!(log.filter_by_type(CombatLogEventType::Healing).len(), 1);
    assert_eq!(log.filter_by_type(CombatLogEventType::BattleEvent).len(), 1);
}

#[test]
fn test_hp_changes_only() {
    let mut log = create_test_log();

    log.log_battle_event("Battle started".to_string());
    log_hit(&mut log, "Left Vanguard 0", "Right Arcanist 0", "Strike", 50, false);
    log_heal(&mut log, "Left Cleric 1", "Left Vanguard 0", "Mend", 30);
    log.log_ability_use(
        "Left Cleric 1".to_string(),
        "Mend".to_string(),
        None,
        "Left Cleric 1 uses Mend".to_string(),
    );

    let hp_changes = log.hp_changes_only();
    assert_eq!(hp_changes.len(), 2, "Should only include damage and healing events");
}

#[test]
fn test_recent_entries() {
    let mut log = create_test_log();

    for i in 0..10 {
        log.log_battle_event(format!("Event {}", i));
    }

    let recent = log.recent(3);
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].message, "Event 7");
    assert_eq!(recent[1].message, "Event 8");
    assert_eq!(recent[2].message, "Event 9");
}

// =============================================================================
// Message Shape & Persistence Tests
// =============================================================================

#[test]
fn test_damage_messages_are_well_formed() {
    let mut log = create_test_log();
    log_hit(&mut log, "Left Vanguard 0", "Right Arcanist 0", "Strike", 50, false);
    log_hit(&mut log, "Left Shadowblade 1", "Right Cleric 1", "Shadowstab", 73, true);

    let pattern = Regex::new(r"^.+'s .+ hits .+ for \d+ damage$").unwrap();
    for entry in log.filter_by_type(CombatLogEventType::Damage) {
        assert!(
            pattern.is_match(&entry.message),
            "malformed damage message: {}",
            entry.message
        );
    }
}

#[test]
fn test_save_to_file_writes_parseable_json() {
    let mut log = create_test_log();
    log.register_combatant("Left Vanguard 0".to_string());
    log_hit(&mut log, "Left Vanguard 0", "Right Arcanist 0", "Strike", 50, true);

    let metadata = BattleMetadata {
        winner: Some("Left".to_string()),
        duration_secs: 42.5,
        random_seed: Some(7),
        left_party: vec![],
        right_party: vec![],
    };

    let path = std::env::temp_dir().join("squadsim_log_test.json");
    let written = log
        .save_to_file(&metadata, Some(path.to_str().unwrap()))
        .expect("save should succeed");

    let contents = std::fs::read_to_string(&written).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["metadata"]["winner"], "Left");
    assert_eq!(parsed["metadata"]["random_seed"], 7);
    assert!(parsed["entries"].as_array().unwrap().len() >= 1);

    std::fs::remove_file(written).ok();
}
