//! Battle Action Selection
//!
//! Every AI combatant runs the same decision routine on its cadence:
//!
//! 1. **Resource gate** - below one energy bar, wait instead of thinking.
//! 2. **Candidate enumeration** - score every (ability, primary target)
//!    pair the roster allows, aggregating area-of-effect value into the
//!    primary target's score.
//! 3. **Value modifier** - each per-target magnitude is scaled by energy
//!    cost, shape preference, and the profile's health-focus bias.
//! 4. **Selection** - weighted-random draw over the top three candidates
//!    by cumulative-sum buckets.
//! 5. **Pending reconciliation** - a previously parked action with a
//!    boosted value can override the fresh pick.
//! 6. **Execution gate** - worthless picks defer; unaffordable picks are
//!    parked in the single pending slot; everything else is queued for
//!    the executor.
//!
//! Deferrals are not errors. They lengthen the combatant's wait and the
//! routine runs again on the next eligible tick.

use bevy::prelude::*;

use super::abilities::{AbilityType, TargetShape};
use super::ability_config::AbilityDefinitions;
use super::components::{AiProfile, BattleClock, Combatant, FieldPosition, FocusPriority, GameRng};
use super::constants::{
    GLOBAL_ACTION_STAGGER, LOW_ENERGY_WAIT_PENALTY, NO_CANDIDATES_WAIT_PENALTY,
    NO_WORTHWHILE_WAIT_PENALTY, PENDING_VALUE_BOOST, TOP_CANDIDATE_POOL,
    UNAFFORDABLE_WAIT_PENALTY,
};
use super::battle_math::{estimate_damage, estimate_heal};
use super::executor::AbilityUsePending;
use super::party::{BattleSnapshot, CombatantInfo, TargetFilter};

/// A scored (ability, primary target) pair. Rebuilt from scratch every
/// decision cycle; never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoredCandidate {
    pub ability: AbilityType,
    pub target: Entity,
    pub value: i32,
}

/// The single-slot carry-over for an action that scored well but couldn't
/// be afforded when it was chosen.
#[derive(Clone, Copy, Debug)]
pub struct PendingAction {
    pub ability: AbilityType,
    pub target: Entity,
    /// The original candidate value inflated by the pending boost,
    /// fixed at store time.
    pub value: i32,
}

/// Per-combatant AI driver component.
#[derive(Component)]
pub struct ActionSelector {
    /// Behavioral tuning for this combatant
    pub profile: AiProfile,
    /// Seconds since this combatant last executed an action
    pub time_since_last_action: f32,
    /// Current wait before the next decision attempt; lengthened by
    /// deferrals, reset to the profile interval on execution
    pub next_action_wait: f32,
    /// At most one parked action; cleared whenever any action executes
    pub pending: Option<PendingAction>,
    /// Cleared permanently if the battle is misconfigured for this
    /// combatant (no opposing party)
    pub active: bool,
}

impl ActionSelector {
    pub fn new(profile: AiProfile) -> Self {
        Self {
            profile,
            time_since_last_action: 0.0,
            next_action_wait: profile.action_interval,
            pending: None,
            active: true,
        }
    }

    /// Readiness predicate: this combatant's own cadence has elapsed AND
    /// the global stagger window since anyone's last action has passed.
    pub fn ready(&self, clock: &BattleClock) -> bool {
        self.time_since_last_action > self.next_action_wait
            && clock.elapsed > clock.time_of_last_action + GLOBAL_ACTION_STAGGER
    }
}

/// Why a decision cycle ended without an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeferReason {
    /// Below one energy bar; candidates were never enumerated
    LowEnergy,
    /// The rosters offered no (ability, target) pair at all
    NoCandidates,
    /// Candidates existed but none was worth taking
    NothingWorthwhile,
    /// The chosen action can't be afforded yet; parked as pending
    Unaffordable,
}

/// Outcome of one decision cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionDecision {
    /// Execute an ability against a primary target
    Act { ability: AbilityType, target: Entity },
    /// Wait and retry later
    Defer(DeferReason),
}

/// Modifies the value of an ability based on AI-specific parameters to
/// cause certain targets to be prioritized over others.
///
/// The energy-cost term is inherited arithmetic, preserved exactly: at
/// cost 1 it cancels the whole base modifier, so cheap abilities live or
/// die on the preference bonuses below.
pub fn value_modifier(
    profile: &AiProfile,
    shape: TargetShape,
    target: &CombatantInfo,
    required_energy_bars: u32,
) -> f32 {
    let mut value_mod = 1.0;

    value_mod -= 1.0 - (0.15 * (required_energy_bars as f32 - 1.0));

    if shape == profile.preferred_shape {
        value_mod += 0.3;
    }

    match profile.focus {
        FocusPriority::LowestHealth => {
            if target.highest_health_in_party {
                value_mod -= 0.2;
            } else if target.lowest_health_in_party {
                value_mod += 0.5;
            }
        }
        FocusPriority::WellRounded => {
            if !target.highest_health_in_party && !target.lowest_health_in_party {
                value_mod += 0.25;
            }
        }
        FocusPriority::HighestHealth => {
            if target.highest_health_in_party {
                value_mod += 0.5;
            } else if target.lowest_health_in_party {
                value_mod -= 0.2;
            }
        }
    }

    value_mod
}

/// Enumerate and score every (ability, primary target) candidate for one
/// combatant. Area value is aggregated into the primary target's score:
/// one candidate per pair, not per affected sub-target.
pub fn score_candidates(
    actor: &CombatantInfo,
    profile: &AiProfile,
    defs: &AbilityDefinitions,
    snapshot: &BattleSnapshot,
) -> Vec<ScoredCandidate> {
    let mut candidates = Vec::new();

    for ability in actor.archetype.equipped_abilities() {
        let def = defs.get_unchecked(ability);

        let target_side = if def.targets_allies {
            actor.side
        } else {
            actor.side.opponent()
        };
        let filter = TargetFilter {
            include_dead: def.can_target_dead,
            // Reach only restricts strikes across the field
            melee_reach: !def.ranged && target_side != actor.side,
            hawkeye: actor.hawkeye,
        };

        for primary in snapshot.targetable_members(target_side, filter) {
            let mut value: i32 = 0;

            for effect in &def.effects {
                // Fresh affected set per effect; no scratch list survives
                // between iterations
                for affected in snapshot.affected_targets(def.target_shape, primary) {
                    let Some(target) = snapshot.get(affected) else {
                        continue;
                    };

                    let value_mod =
                        value_modifier(profile, def.target_shape, target, def.energy_cost);

                    let magnitude = if effect.kind.is_offensive() {
                        estimate_damage(effect, def.element, actor, target)
                    } else {
                        estimate_heal(effect, target)
                    };

                    value += (magnitude as f32 * value_mod) as i32;
                }
            }

            candidates.push(ScoredCandidate {
                ability: *ability,
                target: primary,
                value,
            });
        }
    }

    candidates
}

/// Walk the cumulative ranges of the top candidates and pick the one the
/// draw lands in. `sorted` must be in descending value order; the pool is
/// the top `TOP_CANDIDATE_POOL` entries. Returns `None` when the draw
/// escapes every bucket.
pub fn pick_weighted(sorted: &[ScoredCandidate], draw: i32) -> Option<usize> {
    let mut lower = 0;
    for (index, candidate) in sorted.iter().take(TOP_CANDIDATE_POOL).enumerate() {
        let upper = lower + candidate.value;
        if draw >= lower && draw < upper {
            return Some(index);
        }
        lower = upper;
    }
    None
}

/// Run one full decision cycle for one combatant.
///
/// Mutates only the selector's own bookkeeping (wait penalties and the
/// pending slot). Execution is the caller's job.
pub fn look_for_action(
    selector: &mut ActionSelector,
    actor: &CombatantInfo,
    defs: &AbilityDefinitions,
    snapshot: &BattleSnapshot,
    rng: &mut GameRng,
) -> ActionDecision {
    // Step 1: resource gate
    if actor.energy_bars < 1 {
        selector.next_action_wait += LOW_ENERGY_WAIT_PENALTY;
        return ActionDecision::Defer(DeferReason::LowEnergy);
    }

    // Steps 2-3: enumerate and score
    let candidates = score_candidates(actor, &selector.profile, defs, snapshot);

    select_from_candidates(selector, actor, candidates, defs, rng)
}

/// Steps 4-6 of the decision cycle: weighted selection, pending
/// reconciliation, and the execution gate, over an already-scored
/// candidate list.
pub fn select_from_candidates(
    selector: &mut ActionSelector,
    actor: &CombatantInfo,
    mut candidates: Vec<ScoredCandidate>,
    defs: &AbilityDefinitions,
    rng: &mut GameRng,
) -> ActionDecision {
    if candidates.is_empty() {
        selector.next_action_wait += NO_CANDIDATES_WAIT_PENALTY;
        return ActionDecision::Defer(DeferReason::NoCandidates);
    }

    // Descending by value; enumeration order breaks ties, which is
    // deterministic because roster queries come back in slot order
    candidates.sort_by(|a, b| b.value.cmp(&a.value));

    if candidates[0].value <= 0 {
        selector.next_action_wait += NO_WORTHWHILE_WAIT_PENALTY;
        return ActionDecision::Defer(DeferReason::NothingWorthwhile);
    }

    // Step 4: weighted-random draw over the top of the list
    let pool = &candidates[..candidates.len().min(TOP_CANDIDATE_POOL)];
    let total_weight: i32 = pool.iter().map(|c| c.value).sum();

    let mut selected = if total_weight > 0 {
        let draw = rng.random_below(total_weight);
        match pick_weighted(&candidates, draw) {
            Some(index) => candidates[index],
            None => {
                warn!(
                    "Weighted draw {} escaped all buckets (total {}); falling back to best candidate",
                    draw, total_weight
                );
                candidates[0]
            }
        }
    } else {
        // Negative-valued tail outweighed the best candidate; the draw
        // range would be degenerate
        warn!(
            "Top candidate pool weight {} is not positive; falling back to best candidate",
            total_weight
        );
        candidates[0]
    };

    // Step 5: a parked action that still scores higher wins
    let mut from_pending = false;
    if let Some(pending) = &selector.pending {
        if selected.value < pending.value {
            selected = ScoredCandidate {
                ability: pending.ability,
                target: pending.target,
                value: pending.value,
            };
            from_pending = true;
        }
    }

    // Step 6: execution gate
    if selected.value <= 0 {
        selector.next_action_wait += NO_WORTHWHILE_WAIT_PENALTY;
        return ActionDecision::Defer(DeferReason::NothingWorthwhile);
    }

    let def = defs.get_unchecked(&selected.ability);
    if !actor.can_perform(def) {
        // Park it and keep re-evaluating; the boost is applied once, at
        // store time, so the value stays exactly 1.2x the original score
        if !from_pending {
            selector.pending = Some(PendingAction {
                ability: selected.ability,
                target: selected.target,
                value: (selected.value as f32 * PENDING_VALUE_BOOST) as i32,
            });
        }
        selector.next_action_wait += UNAFFORDABLE_WAIT_PENALTY;
        return ActionDecision::Defer(DeferReason::Unaffordable);
    }

    // Executing clears the pending slot no matter where the winner came
    // from
    selector.pending = None;

    ActionDecision::Act {
        ability: selected.ability,
        target: selected.target,
    }
}

// ============================================================================
// Systems
// ============================================================================

/// One-shot wiring check for newly spawned selectors.
///
/// A combatant whose side faces no opposing party is a configuration
/// error: reported once, after which its AI stays inert instead of
/// failing every tick.
pub fn initialize_selectors(
    all: Query<&Combatant>,
    mut fresh: Query<(&Combatant, &mut ActionSelector), Added<ActionSelector>>,
) {
    for (combatant, mut selector) in fresh.iter_mut() {
        let has_opposition = all
            .iter()
            .any(|other| other.side == combatant.side.opponent());

        if !has_opposition {
            error!(
                "No opposing party found for {} {} {}; its AI will stay inactive",
                combatant.side.name(),
                combatant.archetype.name(),
                combatant.slot
            );
            selector.active = false;
        }
    }
}

/// Run the decision routine for every eligible combatant this tick.
///
/// At most one action executes per tick: the first combatant to act
/// stamps the shared clock, which closes the stagger window for everyone
/// behind it in the loop.
pub fn decide_actions(
    mut commands: Commands,
    mut clock: ResMut<BattleClock>,
    defs: Res<AbilityDefinitions>,
    mut rng: ResMut<GameRng>,
    mut combatants: Query<(Entity, &Combatant, &FieldPosition, &mut ActionSelector)>,
) {
    // Read pass: snapshot everyone before any decisions are made
    let snapshot = BattleSnapshot::collect(
        combatants
            .iter()
            .map(|(entity, combatant, position, _)| {
                CombatantInfo::from_parts(entity, combatant, position)
            })
            .collect(),
    );

    // Decision pass, in stable slot order
    let mut order: Vec<Entity> = combatants
        .iter()
        .map(|(entity, ..)| entity)
        .collect();
    order.sort_by_key(|entity| {
        snapshot
            .get(*entity)
            .map_or((u8::MAX, u8::MAX), |i| (i.side as u8, i.slot))
    });

    for entity in order {
        let Ok((_, combatant, _, mut selector)) = combatants.get_mut(entity) else {
            continue;
        };

        if !selector.active || !combatant.is_alive() || combatant.is_stunned() {
            continue;
        }
        if !selector.ready(&clock) {
            continue;
        }

        let Some(actor) = snapshot.get(entity) else {
            continue;
        };

        match look_for_action(&mut selector, actor, &defs, &snapshot, &mut rng) {
            ActionDecision::Act { ability, target } => {
                // Cadence bookkeeping happens here; the decision routine
                // already cleared the pending slot, and the executor
                // applies the effects after the command flush
                selector.time_since_last_action = 0.0;
                selector.next_action_wait = selector.profile.action_interval;
                clock.stamp_action();

                commands.spawn(AbilityUsePending {
                    actor: entity,
                    ability,
                    primary: target,
                });
            }
            ActionDecision::Defer(_) => {
                // Normal outcome; penalties already applied by the
                // decision routine
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::abilities::TargetShape;

    fn candidate(raw: u32, value: i32) -> ScoredCandidate {
        ScoredCandidate {
            ability: AbilityType::Strike,
            target: Entity::from_raw(raw),
            value,
        }
    }

    // The worked example from the selection design: top-3 [40, 30, 10],
    // total weight 80, draw 55 lands in the second bucket
    #[test]
    fn test_pick_weighted_bucket_walk() {
        let sorted = vec![candidate(1, 40), candidate(2, 30), candidate(3, 10)];

        assert_eq!(pick_weighted(&sorted, 0), Some(0));
        assert_eq!(pick_weighted(&sorted, 39), Some(0));
        assert_eq!(pick_weighted(&sorted, 40), Some(1));
        assert_eq!(pick_weighted(&sorted, 55), Some(1));
        assert_eq!(pick_weighted(&sorted, 69), Some(1));
        assert_eq!(pick_weighted(&sorted, 70), Some(2));
        assert_eq!(pick_weighted(&sorted, 79), Some(2));
        assert_eq!(pick_weighted(&sorted, 80), None);
    }

    #[test]
    fn test_pick_weighted_ignores_beyond_top_three() {
        let sorted = vec![
            candidate(1, 40),
            candidate(2, 30),
            candidate(3, 10),
            candidate(4, 100),
        ];
        // The fourth candidate is outside the pool even with a huge value
        assert_eq!(pick_weighted(&sorted, 79), Some(2));
        assert_eq!(pick_weighted(&sorted, 81), None);
    }

    #[test]
    fn test_pick_weighted_short_lists() {
        let sorted = vec![candidate(1, 25)];
        assert_eq!(pick_weighted(&sorted, 0), Some(0));
        assert_eq!(pick_weighted(&sorted, 24), Some(0));
        assert_eq!(pick_weighted(&sorted, 25), None);
    }

    fn bare_target(lowest: bool, highest: bool) -> CombatantInfo {
        use crate::battle::abilities::Element;
        use crate::battle::components::{Archetype, Row, Side};
        CombatantInfo {
            entity: Entity::from_raw(9),
            side: Side::Right,
            row: Row::Front,
            line: 0,
            slot: 0,
            archetype: Archetype::Vanguard,
            max_health: 300,
            current_health: 150,
            energy_bars: 2,
            max_energy_bars: 4,
            attack: 40,
            resilience: 10,
            affinity: Element::None,
            shield_points: 0,
            barrier_points: 0,
            alive: true,
            hidden: false,
            blind: false,
            offense_up: false,
            offense_down: false,
            hawkeye: false,
            lowest_health_in_party: lowest,
            highest_health_in_party: highest,
        }
    }

    fn profile(preferred: TargetShape, focus: FocusPriority) -> AiProfile {
        AiProfile {
            action_interval: 3.0,
            preferred_shape: preferred,
            focus,
        }
    }

    #[test]
    fn test_value_modifier_energy_term_cancels_at_cost_one() {
        let p = profile(TargetShape::SameRow, FocusPriority::WellRounded);
        let target = bare_target(false, true);
        // cost 1, no shape match, no focus match: 1.0 - 1.0 = 0.0
        let m = value_modifier(&p, TargetShape::Single, &target, 1);
        assert!((m - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_value_modifier_energy_term_scales_with_cost() {
        let p = profile(TargetShape::SameRow, FocusPriority::WellRounded);
        let target = bare_target(false, true);
        // cost 3: 1.0 - (1.0 - 0.15*2) = 0.30
        let m = value_modifier(&p, TargetShape::Single, &target, 3);
        assert!((m - 0.30).abs() < 1e-6);
    }

    #[test]
    fn test_value_modifier_preferred_shape_bonus() {
        let p = profile(TargetShape::SameRow, FocusPriority::WellRounded);
        let target = bare_target(false, true);
        let m = value_modifier(&p, TargetShape::SameRow, &target, 1);
        assert!((m - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_value_modifier_focus_table() {
        let target_low = bare_target(true, false);
        let target_high = bare_target(false, true);
        let target_mid = bare_target(false, false);

        let low_focus = profile(TargetShape::SameRow, FocusPriority::LowestHealth);
        assert!((value_modifier(&low_focus, TargetShape::Single, &target_low, 1) - 0.5).abs() < 1e-6);
        assert!((value_modifier(&low_focus, TargetShape::Single, &target_high, 1) + 0.2).abs() < 1e-6);
        assert!((value_modifier(&low_focus, TargetShape::Single, &target_mid, 1) - 0.0).abs() < 1e-6);

        let rounded = profile(TargetShape::SameRow, FocusPriority::WellRounded);
        assert!((value_modifier(&rounded, TargetShape::Single, &target_mid, 1) - 0.25).abs() < 1e-6);
        assert!((value_modifier(&rounded, TargetShape::Single, &target_low, 1) - 0.0).abs() < 1e-6);

        let high_focus = profile(TargetShape::SameRow, FocusPriority::HighestHealth);
        assert!((value_modifier(&high_focus, TargetShape::Single, &target_high, 1) - 0.5).abs() < 1e-6);
        assert!((value_modifier(&high_focus, TargetShape::Single, &target_low, 1) + 0.2).abs() < 1e-6);
    }
}
