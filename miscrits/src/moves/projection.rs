//! Mapping between the single "UI type" selector and the stored
//! `type`/`element` pair.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::moves::icon::{self, MISC};
use crate::moves::record::{Ability, Dataset, DEFAULT_ELEMENT, DEFAULT_KIND};

pub const STANDARD_ELEMENTS: [&str; 17] = [
    "Physical",
    "Fire",
    "Water",
    "Nature",
    "Wind",
    "Earth",
    "Lightning",
    "Misc",
    "FireWind",
    "FireEarth",
    "FireLightning",
    "WaterWind",
    "WaterEarth",
    "WaterLightning",
    "NatureWind",
    "NatureEarth",
    "NatureLightning",
];

pub fn is_standard_element(value: &str) -> bool {
    STANDARD_ELEMENTS.contains(&value)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub kind: String,
    pub element: String,
}

/// Ordered list of values offered by the UI type selector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiTypes(Vec<String>);

impl Default for UiTypes {
    fn default() -> Self {
        Self::from_dataset(&Dataset::default())
    }
}

impl UiTypes {
    /// Standard elements first, then every other non-Attack type in the data.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let standard: BTreeSet<&str> = STANDARD_ELEMENTS.iter().copied().collect();
        let extra: BTreeSet<&str> = dataset
            .creatures
            .iter()
            .flat_map(|creature| creature.abilities.iter())
            .map(Ability::kind)
            .filter(|kind| *kind != DEFAULT_KIND && !standard.contains(kind))
            .collect();
        Self(
            standard
                .into_iter()
                .chain(extra)
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn position(&self, ui_type: &str) -> Option<usize> {
        self.0.iter().position(|value| value == ui_type)
    }

    /// Steps through the list with wraparound.
    pub fn cycle(&self, current: &str, delta: i32) -> String {
        if self.0.is_empty() {
            return current.to_string();
        }
        let len = self.0.len() as i32;
        let index = self.position(current).map(|i| i as i32).unwrap_or(0);
        let next = (index + delta).rem_euclid(len) as usize;
        self.0[next].clone()
    }
}

pub fn ui_to_storage(ui_type: &str) -> Category {
    if is_standard_element(ui_type) {
        Category {
            kind: DEFAULT_KIND.to_string(),
            element: ui_type.to_string(),
        }
    } else {
        Category {
            kind: ui_type.to_string(),
            element: MISC.to_string(),
        }
    }
}

/// Display-only projection; values not in `ui_types` show as `Physical`.
pub fn storage_to_ui(ability: &Ability, ui_types: &UiTypes) -> String {
    let value = if ability.kind() == DEFAULT_KIND {
        ability.element()
    } else {
        ability.kind()
    };
    if ui_types.position(value).is_some() {
        value.to_string()
    } else {
        DEFAULT_ELEMENT.to_string()
    }
}

/// Uncommitted name/type edits for the selected ability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditBuffer {
    pub name: String,
    pub ui_type: String,
}

impl EditBuffer {
    pub fn from_ability(ability: &Ability, ui_types: &UiTypes) -> Self {
        Self {
            name: ability.name().to_string(),
            ui_type: storage_to_ui(ability, ui_types),
        }
    }

    /// The stored ability with the buffered edits laid over it.
    pub fn preview(&self, stored: &Ability) -> Ability {
        let category = ui_to_storage(&self.ui_type);
        let mut preview = stored.clone();
        preview.set("name", self.name.as_str().into());
        preview.set("type", category.kind.into());
        preview.set("element", category.element.into());
        preview
    }

    pub fn preview_icon(&self, stored: &Ability) -> String {
        icon::resolve_icon(&self.preview(stored))
    }

    pub fn is_dirty(&self, stored: &Ability, ui_types: &UiTypes) -> bool {
        *self != Self::from_ability(stored, ui_types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::record::Creature;

    fn dataset() -> Dataset {
        Dataset::new(vec![Creature::new(1, &["Flue"])
            .with_ability(Ability::new(1, "a").with_category("Heal", "Misc"))
            .with_ability(Ability::new(2, "b").with_category("Buff", "Misc"))
            .with_ability(Ability::new(3, "c").with_category("Attack", "Fire"))
            .with_ability(Ability::new(4, "d").with_category("Buff", "Misc"))])
    }

    #[test]
    fn ui_types_list_standard_then_extra_types() {
        let types = UiTypes::from_dataset(&dataset());
        let slice = types.as_slice();
        assert_eq!(slice.len(), STANDARD_ELEMENTS.len() + 2);
        assert_eq!(slice[0], "Earth");
        assert_eq!(&slice[slice.len() - 2..], ["Buff".to_string(), "Heal".to_string()]);
        assert!(types.position("Attack").is_none());
    }

    #[test]
    fn standard_choice_becomes_attack() {
        assert_eq!(
            ui_to_storage("Water"),
            Category {
                kind: "Attack".into(),
                element: "Water".into()
            }
        );
        assert_eq!(
            ui_to_storage("Buff"),
            Category {
                kind: "Buff".into(),
                element: "Misc".into()
            }
        );
    }

    #[test]
    fn misc_choice_is_an_attack_with_misc_element() {
        assert_eq!(ui_to_storage("Misc").kind, "Attack");
    }

    #[test]
    fn storage_to_ui_coerces_unknown_values() {
        let types = UiTypes::from_dataset(&dataset());
        let odd = Ability::new(9, "odd").with_category("Attack", "Shadow");
        assert_eq!(storage_to_ui(&odd, &types), "Physical");
        assert_eq!(odd.element(), "Shadow");
        let heal = Ability::new(8, "h").with_category("Heal", "Misc");
        assert_eq!(storage_to_ui(&heal, &types), "Heal");
    }

    #[test]
    fn preview_does_not_touch_stored_ability() {
        let types = UiTypes::from_dataset(&dataset());
        let stored = Ability::new(3, "c").with_category("Attack", "Fire").with_ap(10);
        let mut buffer = EditBuffer::from_ability(&stored, &types);
        assert!(!buffer.is_dirty(&stored, &types));
        buffer.ui_type = "Buff".into();
        assert_eq!(buffer.preview_icon(&stored), "buff");
        assert_eq!(stored.kind(), "Attack");
        assert!(buffer.is_dirty(&stored, &types));
    }

    #[test]
    fn cycle_wraps_around() {
        let types = UiTypes::from_dataset(&Dataset::default());
        let last = types.as_slice()[types.len() - 1].clone();
        assert_eq!(types.cycle(&last, 1), types.as_slice()[0]);
        assert_eq!(types.cycle(&types.as_slice()[0], -1), last);
    }
}
