//! Shared Utility Functions

use crate::combat::log::CombatantId;

use super::components::Combatant;

/// Helper to generate a consistent combatant ID for the combat log.
///
/// Format: "{side} {archetype} {slot}" e.g., "Left Vanguard 0"
pub fn combatant_id(combatant: &Combatant) -> CombatantId {
    format!(
        "{} {} {}",
        combatant.side.name(),
        combatant.archetype.name(),
        combatant.slot
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::components::{Archetype, Side};

    #[test]
    fn test_combatant_id_format() {
        let c = Combatant::new(Side::Left, 0, Archetype::Vanguard);
        assert_eq!(combatant_id(&c), "Left Vanguard 0");

        let c2 = Combatant::new(Side::Right, 2, Archetype::Cleric);
        assert_eq!(combatant_id(&c2), "Right Cleric 2");
    }
}
