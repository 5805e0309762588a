//! Ability Execution
//!
//! The action selector only decides. Executing an ability — resolving its
//! area, rolling each effect, consuming shields and energy, recording
//! deaths — happens here, one command-flush after the decision so the
//! selector's snapshot stays read-only.

use bevy::prelude::*;
use smallvec::SmallVec;

use crate::combat::events::{
    AbilityUsedEvent, CombatantDownedEvent, CombatantRevivedEvent, DamageDealtEvent,
    HealingDoneEvent,
};
use crate::combat::log::CombatLog;

use super::abilities::{AbilityType, EffectKind, TargetShape};
use super::ability_config::AbilityDefinitions;
use super::battle_math::{roll_damage, roll_heal};
use super::components::{Combatant, FieldPosition, GameRng};
use super::constants::{CHARGE_MAGNITUDE_MULTIPLIER, STUN_DURATION};
use super::utils::combatant_id;

/// A decided action waiting for execution. Spawned as a marker entity by
/// `decide_actions` and consumed by `process_ability_uses` after the
/// command flush.
#[derive(Component)]
pub struct AbilityUsePending {
    pub actor: Entity,
    pub ability: AbilityType,
    pub primary: Entity,
}

/// Resolve an ability's shape around its primary target using current
/// component state. Area shapes sweep the primary's party's living
/// members; `Single` keeps a dead primary so resurrection can land.
fn resolve_affected(
    def_shape: TargetShape,
    primary: Entity,
    combatants: &Query<(Entity, &mut Combatant, &FieldPosition)>,
) -> SmallVec<[Entity; 4]> {
    let Ok((_, _, anchor_pos)) = combatants.get(primary) else {
        return SmallVec::new();
    };
    let (anchor_side, anchor_row, anchor_line) = (anchor_pos.side, anchor_pos.row, anchor_pos.line);

    if def_shape == TargetShape::Single {
        return SmallVec::from_slice(&[primary]);
    }

    let mut hits: SmallVec<[(u8, Entity); 4]> = combatants
        .iter()
        .filter(|(_, combatant, position)| {
            position.side == anchor_side
                && combatant.is_alive()
                && match def_shape {
                    TargetShape::SameRow => position.row == anchor_row,
                    TargetShape::SameLine => position.line == anchor_line,
                    TargetShape::WholeParty => true,
                    TargetShape::Single => unreachable!(),
                }
        })
        .map(|(entity, combatant, _)| (combatant.slot, entity))
        .collect();
    hits.sort_by_key(|(slot, _)| *slot);
    hits.into_iter().map(|(_, entity)| entity).collect()
}

/// Apply every queued ability use.
///
/// The stagger window means at most one entry per tick in practice, but
/// the loop handles any number.
#[allow(clippy::too_many_arguments)]
pub fn process_ability_uses(
    mut commands: Commands,
    mut combat_log: ResMut<CombatLog>,
    mut game_rng: ResMut<GameRng>,
    abilities: Res<AbilityDefinitions>,
    pending_uses: Query<(Entity, &AbilityUsePending)>,
    mut combatants: Query<(Entity, &mut Combatant, &FieldPosition)>,
    mut ability_events: EventWriter<AbilityUsedEvent>,
    mut damage_events: EventWriter<DamageDealtEvent>,
    mut healing_events: EventWriter<HealingDoneEvent>,
    mut downed_events: EventWriter<CombatantDownedEvent>,
    mut revived_events: EventWriter<CombatantRevivedEvent>,
) {
    for (pending_entity, pending) in pending_uses.iter() {
        commands.entity(pending_entity).despawn();

        let def = abilities.get_unchecked(&pending.ability);

        // Pay costs up front and copy what the damage formula needs from
        // the actor, so target borrows below don't overlap
        let Ok((_, mut actor, _)) = combatants.get_mut(pending.actor) else {
            continue;
        };
        if !actor.is_alive() {
            continue;
        }

        let is_charged = def.requires_charge;
        if is_charged {
            actor.energy_bars = 0;
            actor.charge_progress = 0.0;
        } else {
            actor.energy_bars = actor.energy_bars.saturating_sub(def.energy_cost);
        }
        // Acting breaks concealment
        actor.hidden = false;

        let actor_snapshot = actor.clone();
        let actor_id = combatant_id(&actor_snapshot);
        drop(actor);

        info!("{} uses {}", actor_id, def.name);
        let primary_id = combatants
            .get(pending.primary)
            .map(|(_, target, _)| combatant_id(target))
            .ok();
        combat_log.log_ability_use(
            actor_id.clone(),
            def.name.clone(),
            primary_id,
            format!("{} uses {}", actor_id, def.name),
        );
        ability_events.send(AbilityUsedEvent {
            actor: pending.actor,
            target: Some(pending.primary),
            ability_name: def.name.clone(),
        });

        let affected = resolve_affected(def.target_shape, pending.primary, &combatants);

        let mut damage_dealt_total: i32 = 0;
        let mut healing_done_total: i32 = 0;

        for target_entity in affected {
            for effect in &def.effects {
                let Ok((_, mut target, _)) = combatants.get_mut(target_entity) else {
                    continue;
                };

                if effect.kind.is_offensive() {
                    if !target.is_alive() {
                        continue;
                    }

                    let roll = roll_damage(
                        effect,
                        def.element,
                        is_charged,
                        CHARGE_MAGNITUDE_MULTIPLIER,
                        &actor_snapshot,
                        &target,
                        &mut game_rng,
                    );
                    if roll.missed {
                        combat_log.log_battle_event(format!(
                            "{}'s {} misses {}",
                            actor_id,
                            def.name,
                            combatant_id(&target)
                        ));
                        continue;
                    }
                    // Death claims whatever soak can't stop
                    let amount = if effect.kind == EffectKind::InstantDeath {
                        target.current_health
                    } else {
                        roll.amount
                    };

                    // Soak order: shields, then barrier, then health
                    let mut remaining = amount;
                    if !effect.bypass_shields && target.shield_points > 0 {
                        let soaked = remaining.min(target.shield_points);
                        target.shield_points -= soaked;
                        remaining -= soaked;
                    }
                    if !effect.bypass_barrier && target.barrier_points > 0 {
                        let soaked = remaining.min(target.barrier_points);
                        target.barrier_points -= soaked;
                        remaining -= soaked;
                    }

                    let dealt = remaining.min(target.current_health);
                    target.current_health -= dealt;
                    target.damage_taken += dealt;
                    damage_dealt_total += dealt;

                    if effect.stun && target.is_alive() {
                        target.stun_remaining = STUN_DURATION;
                    }

                    let target_id = combatant_id(&target);
                    let killing_blow = !target.is_alive();
                    let absorbed = amount - remaining;
                    let message = if absorbed > 0 {
                        format!(
                            "{}'s {} hits {} for {} damage ({} absorbed)",
                            actor_id, def.name, target_id, dealt, absorbed
                        )
                    } else {
                        format!(
                            "{}'s {} hits {} for {} damage",
                            actor_id, def.name, target_id, dealt
                        )
                    };
                    combat_log.log_damage(
                        actor_id.clone(),
                        target_id.clone(),
                        def.name.clone(),
                        dealt,
                        killing_blow,
                        message,
                    );
                    damage_events.send(DamageDealtEvent {
                        source: pending.actor,
                        target: target_entity,
                        amount: dealt,
                        ability_name: def.name.clone(),
                    });

                    if killing_blow {
                        target.stun_remaining = 0.0;
                        combat_log.log_death(
                            target_id.clone(),
                            Some(actor_id.clone()),
                            format!("{} has fallen", target_id),
                        );
                        downed_events.send(CombatantDownedEvent {
                            victim: target_entity,
                            killer: Some(pending.actor),
                        });
                    }

                    target.debug_validate();
                } else {
                    // Restorative path
                    match effect.kind {
                        EffectKind::Resurrect => {
                            if target.is_alive() {
                                continue;
                            }
                            let restored = roll_heal(
                                effect,
                                is_charged,
                                CHARGE_MAGNITUDE_MULTIPLIER,
                                &target,
                                &mut game_rng,
                            )
                            .clamp(1, target.max_health);
                            target.current_health = restored;

                            let target_id = combatant_id(&target);
                            combat_log.log_healing(
                                actor_id.clone(),
                                target_id.clone(),
                                def.name.clone(),
                                restored,
                                format!(
                                    "{}'s {} returns {} to the fight with {} health",
                                    actor_id, def.name, target_id, restored
                                ),
                            );
                            healing_events.send(HealingDoneEvent {
                                source: pending.actor,
                                target: target_entity,
                                amount: restored,
                                ability_name: def.name.clone(),
                            });
                            revived_events.send(CombatantRevivedEvent {
                                target: target_entity,
                                reviver: pending.actor,
                            });
                            healing_done_total += restored;
                        }
                        _ => {
                            if !target.is_alive() {
                                continue;
                            }
                            let rolled = roll_heal(
                                effect,
                                is_charged,
                                CHARGE_MAGNITUDE_MULTIPLIER,
                                &target,
                                &mut game_rng,
                            );
                            let missing = target.max_health - target.current_health;
                            let healed = rolled.min(missing);
                            if healed <= 0 {
                                continue;
                            }
                            target.current_health += healed;
                            healing_done_total += healed;

                            let target_id = combatant_id(&target);
                            combat_log.log_healing(
                                actor_id.clone(),
                                target_id.clone(),
                                def.name.clone(),
                                healed,
                                format!(
                                    "{}'s {} heals {} for {}",
                                    actor_id, def.name, target_id, healed
                                ),
                            );
                            healing_events.send(HealingDoneEvent {
                                source: pending.actor,
                                target: target_entity,
                                amount: healed,
                                ability_name: def.name.clone(),
                            });

                            target.debug_validate();
                        }
                    }
                }
            }
        }

        // Fold tallies back into the actor
        if let Ok((_, mut actor, _)) = combatants.get_mut(pending.actor) {
            actor.damage_dealt += damage_dealt_total;
            actor.healing_done += healing_done_total;
        }
    }
}
