//! Party Snapshot & Roster Queries
//!
//! The action selector never touches ECS queries directly. Each decision
//! tick builds a `BattleSnapshot` — a read-only view of every combatant —
//! and all roster questions (who can this ability reach, who shares a row
//! with the primary target, who is the weakest member of a party) are
//! answered against that snapshot.
//!
//! Every query returns a freshly allocated sequence. There is no shared
//! scratch buffer to alias between effects or iterations.

use bevy::prelude::*;
use smallvec::SmallVec;
use std::collections::HashMap;

use super::abilities::{Element, TargetShape};
use super::ability_config::AbilityConfig;
use super::components::{Archetype, Combatant, FieldPosition, Row, Side};

/// Per-tick snapshot of a single combatant, used for AI decision making.
#[derive(Clone, Copy, Debug)]
pub struct CombatantInfo {
    pub entity: Entity,
    pub side: Side,
    pub row: Row,
    pub line: u8,
    pub slot: u8,
    pub archetype: Archetype,
    pub max_health: i32,
    pub current_health: i32,
    pub energy_bars: u32,
    pub max_energy_bars: u32,
    pub attack: i32,
    pub resilience: i32,
    pub affinity: Element,
    pub shield_points: i32,
    pub barrier_points: i32,
    pub alive: bool,
    pub hidden: bool,
    pub blind: bool,
    pub offense_up: bool,
    pub offense_down: bool,
    pub hawkeye: bool,
    /// Ties the lowest living health in its party
    pub lowest_health_in_party: bool,
    /// Ties the highest living health in its party
    pub highest_health_in_party: bool,
}

impl CombatantInfo {
    pub fn from_parts(entity: Entity, combatant: &Combatant, position: &FieldPosition) -> Self {
        Self {
            entity,
            side: position.side,
            row: position.row,
            line: position.line,
            slot: combatant.slot,
            archetype: combatant.archetype,
            max_health: combatant.max_health,
            current_health: combatant.current_health,
            energy_bars: combatant.energy_bars,
            max_energy_bars: combatant.max_energy_bars,
            attack: combatant.attack,
            resilience: combatant.resilience,
            affinity: combatant.affinity,
            shield_points: combatant.shield_points,
            barrier_points: combatant.barrier_points,
            alive: combatant.is_alive(),
            hidden: combatant.hidden,
            blind: combatant.blind,
            offense_up: combatant.offense_up,
            offense_down: combatant.offense_down,
            hawkeye: combatant.hawkeye,
            // Filled in by BattleSnapshot::collect once the whole party
            // is known
            lowest_health_in_party: false,
            highest_health_in_party: false,
        }
    }

    /// Health as a percentage (0.0 to 1.0)
    pub fn health_pct(&self) -> f32 {
        if self.max_health > 0 {
            self.current_health as f32 / self.max_health as f32
        } else {
            0.0
        }
    }

    /// Check if this combatant can currently perform an ability
    /// (cost and charge gating only).
    pub fn can_perform(&self, def: &AbilityConfig) -> bool {
        def.performable_with(self.energy_bars, self.max_energy_bars)
    }
}

/// Filter for roster eligibility queries.
#[derive(Clone, Copy, Debug, Default)]
pub struct TargetFilter {
    /// Include dead members (resurrection abilities)
    pub include_dead: bool,
    /// Restrict to the front row while it has living members
    /// (non-ranged abilities reaching across the field)
    pub melee_reach: bool,
    /// The querier perceives hidden targets
    pub hawkeye: bool,
}

/// Read-only view of the whole battle for one decision tick.
pub struct BattleSnapshot {
    combatants: HashMap<Entity, CombatantInfo>,
}

impl BattleSnapshot {
    /// Build a snapshot from per-combatant info records, computing each
    /// party's health extremes among its living members.
    pub fn collect(mut infos: Vec<CombatantInfo>) -> Self {
        for side in [Side::Left, Side::Right] {
            let living: Vec<i32> = infos
                .iter()
                .filter(|i| i.side == side && i.alive)
                .map(|i| i.current_health)
                .collect();
            let (Some(&lowest), Some(&highest)) = (living.iter().min(), living.iter().max())
            else {
                continue;
            };

            for info in infos.iter_mut().filter(|i| i.side == side && i.alive) {
                info.lowest_health_in_party = info.current_health == lowest;
                info.highest_health_in_party = info.current_health == highest;
            }
        }

        Self {
            combatants: infos.into_iter().map(|i| (i.entity, i)).collect(),
        }
    }

    pub fn get(&self, entity: Entity) -> Option<&CombatantInfo> {
        self.combatants.get(&entity)
    }

    /// All members of one party, living or dead, in slot order.
    pub fn members_of(&self, side: Side) -> Vec<&CombatantInfo> {
        let mut members: Vec<&CombatantInfo> = self
            .combatants
            .values()
            .filter(|c| c.side == side)
            .collect();
        // Slot order keeps enumeration deterministic across runs
        members.sort_by_key(|c| c.slot);
        members
    }

    /// Whether a party still has anyone standing.
    pub fn party_alive(&self, side: Side) -> bool {
        self.combatants.values().any(|c| c.side == side && c.alive)
    }

    /// The eligible primary targets on `side` under `filter`.
    ///
    /// Returns a fresh vector in slot order.
    pub fn targetable_members(&self, side: Side, filter: TargetFilter) -> Vec<Entity> {
        let front_holds = self
            .combatants
            .values()
            .any(|c| c.side == side && c.alive && c.row == Row::Front);

        self.members_of(side)
            .into_iter()
            .filter(|c| c.alive || filter.include_dead)
            .filter(|c| !c.hidden || filter.hawkeye)
            .filter(|c| {
                // Melee reach collapses forward: the back row opens up
                // only once the front row is wiped
                !filter.melee_reach || !front_holds || c.row == Row::Front
            })
            .map(|c| c.entity)
            .collect()
    }

    /// Expand an ability's shape around a primary target into the concrete
    /// affected set. Area shapes sweep living members of the primary's
    /// party; `Single` keeps the primary even when dead (resurrection).
    ///
    /// Returns a fresh sequence per call.
    pub fn affected_targets(&self, shape: TargetShape, primary: Entity) -> SmallVec<[Entity; 4]> {
        let Some(anchor) = self.get(primary) else {
            return SmallVec::new();
        };

        match shape {
            TargetShape::Single => SmallVec::from_slice(&[primary]),
            TargetShape::SameRow => self.sweep(anchor, |c| c.row == anchor.row),
            TargetShape::SameLine => self.sweep(anchor, |c| c.line == anchor.line),
            TargetShape::WholeParty => self.sweep(anchor, |_| true),
        }
    }

    fn sweep(
        &self,
        anchor: &CombatantInfo,
        matches: impl Fn(&CombatantInfo) -> bool,
    ) -> SmallVec<[Entity; 4]> {
        let mut hits: SmallVec<[(u8, Entity); 4]> = self
            .combatants
            .values()
            .filter(|c| c.side == anchor.side && c.alive && matches(c))
            .map(|c| (c.slot, c.entity))
            .collect();
        hits.sort_by_key(|(slot, _)| *slot);
        hits.into_iter().map(|(_, e)| e).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::components::Archetype;

    fn info(
        raw: u32,
        side: Side,
        row: Row,
        line: u8,
        health: i32,
        alive: bool,
        hidden: bool,
    ) -> CombatantInfo {
        CombatantInfo {
            entity: Entity::from_raw(raw),
            side,
            row,
            line,
            slot: line,
            archetype: Archetype::Vanguard,
            max_health: 300,
            current_health: health,
            energy_bars: 2,
            max_energy_bars: 4,
            attack: 40,
            resilience: 10,
            affinity: Element::None,
            shield_points: 0,
            barrier_points: 0,
            alive,
            hidden,
            blind: false,
            offense_up: false,
            offense_down: false,
            hawkeye: false,
            lowest_health_in_party: false,
            highest_health_in_party: false,
        }
    }

    #[test]
    fn test_health_extremes_marked_per_party() {
        let snapshot = BattleSnapshot::collect(vec![
            info(1, Side::Left, Row::Front, 0, 100, true, false),
            info(2, Side::Left, Row::Front, 1, 200, true, false),
            info(3, Side::Left, Row::Back, 2, 300, true, false),
        ]);

        let low = snapshot.get(Entity::from_raw(1)).unwrap();
        assert!(low.lowest_health_in_party && !low.highest_health_in_party);

        let mid = snapshot.get(Entity::from_raw(2)).unwrap();
        assert!(!mid.lowest_health_in_party && !mid.highest_health_in_party);

        let high = snapshot.get(Entity::from_raw(3)).unwrap();
        assert!(!high.lowest_health_in_party && high.highest_health_in_party);
    }

    #[test]
    fn test_dead_members_excluded_from_extremes() {
        let snapshot = BattleSnapshot::collect(vec![
            info(1, Side::Left, Row::Front, 0, 0, false, false),
            info(2, Side::Left, Row::Front, 1, 150, true, false),
        ]);

        // The dead member carries no extreme flags; the sole survivor is
        // both lowest and highest
        let dead = snapshot.get(Entity::from_raw(1)).unwrap();
        assert!(!dead.lowest_health_in_party && !dead.highest_health_in_party);

        let alone = snapshot.get(Entity::from_raw(2)).unwrap();
        assert!(alone.lowest_health_in_party && alone.highest_health_in_party);
    }

    #[test]
    fn test_targetable_excludes_dead_without_flag() {
        let snapshot = BattleSnapshot::collect(vec![
            info(1, Side::Right, Row::Front, 0, 0, false, false),
            info(2, Side::Right, Row::Front, 1, 150, true, false),
        ]);

        let filter = TargetFilter::default();
        let targets = snapshot.targetable_members(Side::Right, filter);
        assert_eq!(targets, vec![Entity::from_raw(2)]);

        let with_dead = snapshot.targetable_members(
            Side::Right,
            TargetFilter {
                include_dead: true,
                ..TargetFilter::default()
            },
        );
        assert_eq!(with_dead.len(), 2);
    }

    #[test]
    fn test_hidden_targets_need_hawkeye() {
        let snapshot = BattleSnapshot::collect(vec![
            info(1, Side::Right, Row::Front, 0, 150, true, true),
            info(2, Side::Right, Row::Front, 1, 150, true, false),
        ]);

        let blind_query = snapshot.targetable_members(Side::Right, TargetFilter::default());
        assert_eq!(blind_query, vec![Entity::from_raw(2)]);

        let keen_query = snapshot.targetable_members(
            Side::Right,
            TargetFilter {
                hawkeye: true,
                ..TargetFilter::default()
            },
        );
        assert_eq!(keen_query.len(), 2);
    }

    #[test]
    fn test_melee_reach_stops_at_living_front_row() {
        let snapshot = BattleSnapshot::collect(vec![
            info(1, Side::Right, Row::Front, 0, 150, true, false),
            info(2, Side::Right, Row::Back, 1, 150, true, false),
        ]);

        let melee = TargetFilter {
            melee_reach: true,
            ..TargetFilter::default()
        };
        assert_eq!(
            snapshot.targetable_members(Side::Right, melee),
            vec![Entity::from_raw(1)]
        );

        // Once the front row falls, melee reaches the back row
        let snapshot = BattleSnapshot::collect(vec![
            info(1, Side::Right, Row::Front, 0, 0, false, false),
            info(2, Side::Right, Row::Back, 1, 150, true, false),
        ]);
        assert_eq!(
            snapshot.targetable_members(Side::Right, melee),
            vec![Entity::from_raw(2)]
        );
    }

    #[test]
    fn test_affected_targets_resolves_shapes() {
        let snapshot = BattleSnapshot::collect(vec![
            info(1, Side::Right, Row::Front, 0, 150, true, false),
            info(2, Side::Right, Row::Front, 1, 150, true, false),
            info(3, Side::Right, Row::Back, 0, 150, true, false),
            info(4, Side::Left, Row::Front, 0, 150, true, false),
        ]);
        let primary = Entity::from_raw(1);

        let single = snapshot.affected_targets(TargetShape::Single, primary);
        assert_eq!(single.as_slice(), &[primary]);

        let row = snapshot.affected_targets(TargetShape::SameRow, primary);
        assert_eq!(row.len(), 2);
        assert!(!row.contains(&Entity::from_raw(3)));

        let line = snapshot.affected_targets(TargetShape::SameLine, primary);
        assert_eq!(line.len(), 2);
        assert!(line.contains(&Entity::from_raw(3)));

        let party = snapshot.affected_targets(TargetShape::WholeParty, primary);
        assert_eq!(party.len(), 3);
        assert!(!party.contains(&Entity::from_raw(4)));
    }

    #[test]
    fn test_queries_return_fresh_sequences() {
        let snapshot = BattleSnapshot::collect(vec![
            info(1, Side::Right, Row::Front, 0, 150, true, false),
            info(2, Side::Right, Row::Front, 1, 150, true, false),
        ]);
        let primary = Entity::from_raw(1);

        let first = snapshot.affected_targets(TargetShape::SameRow, primary);
        let second = snapshot.affected_targets(TargetShape::SameRow, primary);
        assert_eq!(first, second);
        // Distinct allocations: mutating one never affects the other
        let mut first = first;
        first.clear();
        assert_eq!(second.len(), 2);
    }
}
