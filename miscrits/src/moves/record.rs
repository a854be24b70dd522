//! Creature and ability records as they appear in `miscrits.json`.
//!
//! Each record keeps the object it was parsed from. Accessors read the keys
//! the editor reasons about out of that object and setters write back into it,
//! so key order, explicit `null`s, absent keys and number formatting all
//! survive a load -> edit -> export cycle.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

pub type CreatureId = i64;
pub type AbilityId = i64;

pub const DEFAULT_KIND: &str = "Attack";
pub const DEFAULT_ELEMENT: &str = "Physical";

const ORDER_KEY: &str = "ability_order";
const ABILITIES_KEY: &str = "abilities";

fn read_id<E: de::Error>(raw: &Map<String, Value>) -> Result<i64, E> {
    match raw.get("id") {
        Some(value) => value
            .as_i64()
            .ok_or_else(|| E::invalid_type(de::Unexpected::Other("non-integer id"), &"an integer id")),
        None => Err(E::missing_field("id")),
    }
}

fn str_list(value: Option<&Value>) -> Vec<&str> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// `null` and absent both read as empty.
fn typed_list<'a, T, E>(raw: &'a Map<String, Value>, key: &'static str) -> Result<Vec<T>, E>
where
    T: Deserialize<'a>,
    E: de::Error,
{
    match raw.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => Vec::<T>::deserialize(value).map_err(|err| E::custom(format!("{key}: {err}"))),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ability {
    pub id: AbilityId,
    raw: Map<String, Value>,
}

impl Ability {
    pub fn new(id: AbilityId, name: impl Into<String>) -> Self {
        let mut raw = Map::new();
        raw.insert("id".into(), id.into());
        raw.insert("name".into(), Value::String(name.into()));
        Self { id, raw }
    }

    pub fn with_category(mut self, kind: &str, element: &str) -> Self {
        self.set("type", kind.into());
        self.set("element", element.into());
        self
    }

    pub fn with_ap(mut self, ap: i64) -> Self {
        self.set("ap", ap.into());
        self
    }

    pub fn with_keys(mut self, keys: &[&str]) -> Self {
        self.set("keys", keys.iter().map(|key| Value::from(*key)).collect());
        self
    }

    pub fn with_true_dmg(mut self, true_dmg: bool) -> Self {
        self.set("true_dmg", true_dmg.into());
        self
    }

    /// Raw value of any key, `None` when the key is absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    /// Overwrites a key in place, or appends it when it was absent.
    pub fn set(&mut self, key: &str, value: Value) {
        self.raw.insert(key.to_string(), value);
    }

    fn str_or(&self, key: &str, default: &'static str) -> &str {
        self.raw.get(key).and_then(Value::as_str).unwrap_or(default)
    }

    pub fn name(&self) -> &str {
        self.str_or("name", "")
    }

    pub fn kind(&self) -> &str {
        self.str_or("type", DEFAULT_KIND)
    }

    pub fn element(&self) -> &str {
        self.str_or("element", DEFAULT_ELEMENT)
    }

    /// Stored AP number, integral or not.
    pub fn ap_number(&self) -> Option<&Number> {
        match self.raw.get("ap") {
            Some(Value::Number(number)) => Some(number),
            _ => None,
        }
    }

    pub fn ap(&self) -> f64 {
        self.ap_number().and_then(Number::as_f64).unwrap_or(0.0)
    }

    pub fn keys(&self) -> Vec<&str> {
        str_list(self.raw.get("keys"))
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.keys().iter().any(|k| *k == key)
    }

    pub fn true_dmg(&self) -> bool {
        self.raw.get("true_dmg").and_then(Value::as_bool).unwrap_or(false)
    }
}

impl Serialize for Ability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Ability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Map<String, Value> = Map::deserialize(deserializer)?;
        let id = read_id::<D::Error>(&raw)?;
        Ok(Self { id, raw })
    }
}

/// `ability_order` and `abilities` are lifted out of `raw` into typed fields
/// because the order engine and the store mutate them. `raw` keeps their
/// slot, holding `null` only when the input had an explicit `null`.
#[derive(Clone, Debug, PartialEq)]
pub struct Creature {
    pub id: CreatureId,
    pub ability_order: Vec<AbilityId>,
    pub abilities: Vec<Ability>,
    raw: Map<String, Value>,
}

impl Creature {
    pub fn new(id: CreatureId, names: &[&str]) -> Self {
        let mut raw = Map::new();
        raw.insert("id".into(), id.into());
        raw.insert("names".into(), names.iter().map(|name| Value::from(*name)).collect());
        Self {
            id,
            ability_order: Vec::new(),
            abilities: Vec::new(),
            raw,
        }
    }

    /// Appends an ability and records it as the most recently learned.
    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.ability_order.push(ability.id);
        self.abilities.push(ability);
        self
    }

    pub fn with_element(self, element: &str) -> Self {
        self.with_field("element", element)
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.raw.insert(key.to_string(), value.into());
        self
    }

    pub fn names(&self) -> Vec<&str> {
        str_list(self.raw.get("names"))
    }

    /// Stored element, `None` when absent or `null`.
    pub fn element_opt(&self) -> Option<&str> {
        self.str_field("element")
    }

    pub fn element(&self) -> &str {
        self.element_opt().unwrap_or(DEFAULT_ELEMENT)
    }

    pub fn ability(&self, id: AbilityId) -> Option<&Ability> {
        self.abilities.iter().find(|ability| ability.id == id)
    }

    pub fn ability_mut(&mut self, id: AbilityId) -> Option<&mut Ability> {
        self.abilities.iter_mut().find(|ability| ability.id == id)
    }

    /// Base-form name, falling back to the legacy single `name` key.
    pub fn first_name(&self) -> &str {
        self.names()
            .first()
            .copied()
            .or_else(|| self.str_field("name"))
            .unwrap_or("Unknown")
    }

    /// Final-form name, only when the creature actually evolves.
    pub fn final_name(&self) -> Option<&str> {
        let names = self.names();
        if names.len() > 1 {
            names.last().copied()
        } else {
            None
        }
    }

    /// Selector label searchable by id, base name and final name.
    pub fn selector_label(&self) -> String {
        match self.final_name() {
            Some(last) => format!("{}. {} / {}", self.id, self.first_name(), last),
            None => format!("{}. {}", self.id, self.first_name()),
        }
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(Value::as_str)
    }
}

impl Serialize for Creature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let keep_null = |value: &Value, empty: bool| value.is_null() && empty;
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in &self.raw {
            match key.as_str() {
                ORDER_KEY if !keep_null(value, self.ability_order.is_empty()) => {
                    map.serialize_entry(key, &self.ability_order)?
                }
                ABILITIES_KEY if !keep_null(value, self.abilities.is_empty()) => {
                    map.serialize_entry(key, &self.abilities)?
                }
                _ => map.serialize_entry(key, value)?,
            }
        }
        if !self.raw.contains_key(ORDER_KEY) && !self.ability_order.is_empty() {
            map.serialize_entry(ORDER_KEY, &self.ability_order)?;
        }
        if !self.raw.contains_key(ABILITIES_KEY) && !self.abilities.is_empty() {
            map.serialize_entry(ABILITIES_KEY, &self.abilities)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Creature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw: Map<String, Value> = Map::deserialize(deserializer)?;
        let id = read_id::<D::Error>(&raw)?;
        let ability_order = typed_list::<_, D::Error>(&raw, ORDER_KEY)?;
        let abilities = typed_list::<_, D::Error>(&raw, ABILITIES_KEY)?;
        for key in [ORDER_KEY, ABILITIES_KEY] {
            if let Some(slot) = raw.get_mut(key) {
                if !slot.is_null() {
                    *slot = Value::Array(Vec::new());
                }
            }
        }
        Ok(Self {
            id,
            ability_order,
            abilities,
            raw,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    pub creatures: Vec<Creature>,
}

impl Dataset {
    pub fn new(creatures: Vec<Creature>) -> Self {
        Self { creatures }
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.creatures.iter().find(|creature| creature.id == id)
    }

    pub fn creature_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        self.creatures.iter_mut().find(|creature| creature.id == id)
    }

    pub fn ability_count(&self) -> usize {
        self.creatures
            .iter()
            .map(|creature| creature.abilities.len())
            .sum()
    }

    /// Creature ids ordered the way the selector lists them.
    pub fn sorted_ids(&self) -> Vec<CreatureId> {
        let mut ids: Vec<CreatureId> = self.creatures.iter().map(|creature| creature.id).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_read_as_game_defaults() {
        let ability: Ability = serde_json::from_str(r#"{"id":3,"name":"Poke"}"#).unwrap();
        assert_eq!(ability.kind(), "Attack");
        assert_eq!(ability.element(), "Physical");
        assert_eq!(ability.ap(), 0.0);
        assert!(ability.keys().is_empty());
        assert!(!ability.true_dmg());
    }

    #[test]
    fn null_fields_read_as_game_defaults() {
        let ability: Ability =
            serde_json::from_str(r#"{"id":3,"name":"Poke","type":null,"keys":null,"true_dmg":null}"#)
                .unwrap();
        assert_eq!(ability.kind(), "Attack");
        assert!(ability.keys().is_empty());
        assert!(!ability.true_dmg());
    }

    #[test]
    fn fractional_ap_is_accepted() {
        let ability: Ability = serde_json::from_str(r#"{"id":3,"ap":1.5}"#).unwrap();
        assert_eq!(ability.ap(), 1.5);
        assert_eq!(ability.ap_number().map(ToString::to_string), Some("1.5".to_string()));
    }

    #[test]
    fn missing_id_is_rejected() {
        assert!(serde_json::from_str::<Ability>(r#"{"name":"x"}"#).is_err());
        assert!(serde_json::from_str::<Creature>(r#"{"id":"one"}"#).is_err());
    }

    #[test]
    fn unknown_keys_are_kept() {
        let creature: Creature = serde_json::from_str(
            r#"{"id":1,"names":["Flue"],"rarity":"Rare","abilities":[{"id":2,"name":"x","cd":3}]}"#,
        )
        .unwrap();
        assert_eq!(creature.str_field("rarity"), Some("Rare"));
        assert_eq!(creature.abilities[0].get("cd"), Some(&Value::from(3)));
    }

    #[test]
    fn set_overwrites_in_place_and_appends_new_keys() {
        let mut ability: Ability = serde_json::from_str(r#"{"cd":1,"id":2,"name":"x"}"#).unwrap();
        ability.set("name", "y".into());
        ability.set("ap", 4.into());
        assert_eq!(
            serde_json::to_string(&ability).unwrap(),
            r#"{"cd":1,"id":2,"name":"y","ap":4}"#
        );
    }

    #[test]
    fn null_ability_lists_stay_null_until_filled() {
        let raw = r#"{"id":1,"ability_order":null,"abilities":null}"#;
        let creature: Creature = serde_json::from_str(raw).unwrap();
        assert!(creature.abilities.is_empty());
        assert_eq!(serde_json::to_string(&creature).unwrap(), raw);

        let filled = creature.with_ability(Ability::new(5, "New"));
        assert_eq!(
            serde_json::to_string(&filled).unwrap(),
            r#"{"id":1,"ability_order":[5],"abilities":[{"id":5,"name":"New"}]}"#
        );
    }

    #[test]
    fn selector_label_includes_final_form() {
        let single = Creature::new(4, &["Papa"]);
        let evolving = Creature::new(1, &["Flue", "Flare", "Blaze", "Afterburn"]);
        assert_eq!(single.selector_label(), "4. Papa");
        assert_eq!(evolving.selector_label(), "1. Flue / Afterburn");
    }

    #[test]
    fn first_name_falls_back_to_legacy_name() {
        let creature: Creature = serde_json::from_str(r#"{"id":9,"name":"Ekkult"}"#).unwrap();
        assert_eq!(creature.first_name(), "Ekkult");
    }
}
