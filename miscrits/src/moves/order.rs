//! Ability ordering. `ability_order` is stored earliest-learned first; the
//! editor shows it most-recent first. Only the storage list is ever written.

use crate::moves::record::{Ability, AbilityId, Creature};

pub fn storage_index(creature: &Creature, ability_id: AbilityId) -> Option<usize> {
    creature.ability_order.iter().position(|id| *id == ability_id)
}

/// Moves the ability one row up in the display, i.e. later in storage.
pub fn move_visual_up(creature: &mut Creature, ability_id: AbilityId) -> bool {
    match storage_index(creature, ability_id) {
        Some(index) if index + 1 < creature.ability_order.len() => {
            creature.ability_order.swap(index, index + 1);
            true
        }
        _ => false,
    }
}

/// Moves the ability one row down in the display, i.e. earlier in storage.
pub fn move_visual_down(creature: &mut Creature, ability_id: AbilityId) -> bool {
    match storage_index(creature, ability_id) {
        Some(index) if index > 0 => {
            creature.ability_order.swap(index, index - 1);
            true
        }
        _ => false,
    }
}

pub fn can_move_up(creature: &Creature, ability_id: AbilityId) -> bool {
    storage_index(creature, ability_id)
        .map(|index| index + 1 < creature.ability_order.len())
        .unwrap_or(false)
}

pub fn can_move_down(creature: &Creature, ability_id: AbilityId) -> bool {
    storage_index(creature, ability_id)
        .map(|index| index > 0)
        .unwrap_or(false)
}

pub fn display_order(creature: &Creature) -> Vec<(AbilityId, &Ability)> {
    creature
        .ability_order
        .iter()
        .rev()
        .filter_map(|id| creature.ability(*id).map(|ability| (*id, ability)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creature() -> Creature {
        Creature::new(1, &["Flue"])
            .with_ability(Ability::new(10, "a"))
            .with_ability(Ability::new(11, "b"))
            .with_ability(Ability::new(12, "c"))
    }

    fn display_ids(creature: &Creature) -> Vec<AbilityId> {
        display_order(creature).into_iter().map(|(id, _)| id).collect()
    }

    #[test]
    fn display_is_reverse_of_storage() {
        assert_eq!(display_ids(&creature()), vec![12, 11, 10]);
    }

    #[test]
    fn move_up_swaps_with_later_storage_slot() {
        let mut creature = creature();
        assert!(move_visual_up(&mut creature, 11));
        assert_eq!(creature.ability_order, vec![10, 12, 11]);
        assert_eq!(display_ids(&creature), vec![11, 12, 10]);
    }

    #[test]
    fn move_down_swaps_with_earlier_storage_slot() {
        let mut creature = creature();
        assert!(move_visual_down(&mut creature, 11));
        assert_eq!(creature.ability_order, vec![11, 10, 12]);
    }

    #[test]
    fn edges_are_noops() {
        let mut creature = creature();
        assert!(!move_visual_up(&mut creature, 12));
        assert!(!move_visual_down(&mut creature, 10));
        assert!(!can_move_up(&creature, 12));
        assert!(!can_move_down(&creature, 10));
        assert!(can_move_up(&creature, 10));
        assert_eq!(creature.ability_order, vec![10, 11, 12]);
    }

    #[test]
    fn unknown_id_is_silent_noop() {
        let mut creature = creature();
        assert!(!move_visual_up(&mut creature, 99));
        assert!(!move_visual_down(&mut creature, 99));
        assert_eq!(creature.ability_order, vec![10, 11, 12]);
    }

    #[test]
    fn up_then_down_restores_order() {
        let mut creature = creature();
        move_visual_up(&mut creature, 10);
        move_visual_down(&mut creature, 10);
        assert_eq!(creature.ability_order, vec![10, 11, 12]);
    }

    #[test]
    fn dangling_ids_are_skipped() {
        let mut creature = creature();
        creature.ability_order.insert(1, 77);
        assert_eq!(display_ids(&creature), vec![12, 11, 10]);
    }
}
