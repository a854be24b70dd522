//! The in-memory dataset snapshot plus the session's append-only edit log.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::moves::error::MovesError;
use crate::moves::order;
use crate::moves::projection::{self, UiTypes};
use crate::moves::record::{Ability, AbilityId, CreatureId, Dataset};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityField {
    Name,
    #[serde(rename = "type")]
    Type,
    Element,
    Ap,
    #[serde(rename = "true_dmg")]
    TrueDamage,
}

impl AbilityField {
    pub fn key(self) -> &'static str {
        match self {
            AbilityField::Name => "name",
            AbilityField::Type => "type",
            AbilityField::Element => "element",
            AbilityField::Ap => "ap",
            AbilityField::TrueDamage => "true_dmg",
        }
    }
}

impl fmt::Display for AbilityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Number(Number),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Integral values are written as JSON integers. `None` for NaN or
    /// infinities.
    pub fn number(value: f64) -> Option<Self> {
        let number = if value.fract() == 0.0 && value.abs() < (1u64 << 53) as f64 {
            Number::from(value as i64)
        } else {
            Number::from_f64(value)?
        };
        Some(FieldValue::Number(number))
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(flag) => Some(FieldValue::Flag(*flag)),
            Value::Number(number) => Some(FieldValue::Number(number.clone())),
            Value::String(text) => Some(FieldValue::Text(text.clone())),
            _ => None,
        }
    }

    fn into_json(self) -> Value {
        match self {
            FieldValue::Flag(flag) => Value::Bool(flag),
            FieldValue::Number(number) => Value::Number(number),
            FieldValue::Text(text) => Value::String(text),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value.into())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => write!(f, "{text:?}"),
            FieldValue::Number(number) => write!(f, "{number}"),
            FieldValue::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditLogEntry {
    pub timestamp: DateTime<Utc>,
    pub creature_id: CreatureId,
    pub ability_id: AbilityId,
    pub field: AbilityField,
    pub old_value: Option<FieldValue>,
    pub new_value: FieldValue,
}

impl EditLogEntry {
    pub fn summary(&self) -> String {
        let old = self
            .old_value
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{} #{}/{} {}: {} -> {}",
            self.timestamp.format("%H:%M:%S"),
            self.creature_id,
            self.ability_id,
            self.field,
            old,
            self.new_value
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    Local,
    Upload(String),
    Remote,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Local => f.write_str("local game cache"),
            DataSource::Upload(path) => write!(f, "upload {path}"),
            DataSource::Remote => f.write_str("remote"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordStore {
    dataset: Dataset,
    log: Vec<EditLogEntry>,
    unsaved: bool,
    source: Option<DataSource>,
    ui_types: UiTypes,
}

impl RecordStore {
    pub fn new(dataset: Dataset, source: DataSource) -> Self {
        let ui_types = UiTypes::from_dataset(&dataset);
        Self {
            dataset,
            log: Vec::new(),
            unsaved: false,
            source: Some(source),
            ui_types,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn source(&self) -> Option<&DataSource> {
        self.source.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn ui_types(&self) -> &UiTypes {
        &self.ui_types
    }

    pub fn edit_log(&self) -> &[EditLogEntry] {
        &self.log
    }

    pub fn creature_count(&self) -> usize {
        self.dataset.len()
    }

    pub fn ability_count(&self) -> usize {
        self.dataset.ability_count()
    }

    pub fn find(&self, creature_id: CreatureId, ability_id: AbilityId) -> Result<&Ability, MovesError> {
        let creature = self
            .dataset
            .creature(creature_id)
            .ok_or(MovesError::CreatureNotFound(creature_id))?;
        creature
            .ability(ability_id)
            .ok_or(MovesError::AbilityNotFound {
                creature_id,
                ability_id,
            })
    }

    /// Writes one field, logging the previous value. Returns `false` when the
    /// stored value already equals `value`.
    pub fn update(
        &mut self,
        creature_id: CreatureId,
        ability_id: AbilityId,
        field: AbilityField,
        value: FieldValue,
    ) -> Result<bool, MovesError> {
        check_shape(field, &value)?;
        let creature = self
            .dataset
            .creature_mut(creature_id)
            .ok_or(MovesError::CreatureNotFound(creature_id))?;
        let ability = creature
            .ability_mut(ability_id)
            .ok_or(MovesError::AbilityNotFound {
                creature_id,
                ability_id,
            })?;

        let old_value = ability.get(field.key()).and_then(FieldValue::from_json);
        if old_value.as_ref() == Some(&value) {
            return Ok(false);
        }
        ability.set(field.key(), value.clone().into_json());

        tracing::debug!(creature_id, ability_id, %field, new = %value, "ability edited");
        self.log.push(EditLogEntry {
            timestamp: Utc::now(),
            creature_id,
            ability_id,
            field,
            old_value,
            new_value: value,
        });
        self.unsaved = true;
        Ok(true)
    }

    /// Projects a UI type selection onto `type`/`element` and writes both.
    /// Returns whether either field changed.
    pub fn apply_ui_type(
        &mut self,
        creature_id: CreatureId,
        ability_id: AbilityId,
        ui_type: &str,
    ) -> Result<bool, MovesError> {
        let category = projection::ui_to_storage(ui_type);
        let kind_changed = self.update(
            creature_id,
            ability_id,
            AbilityField::Type,
            FieldValue::text(category.kind),
        )?;
        let element_changed = self.update(
            creature_id,
            ability_id,
            AbilityField::Element,
            FieldValue::text(category.element),
        )?;
        Ok(kind_changed || element_changed)
    }

    pub fn move_visual_up(&mut self, creature_id: CreatureId, ability_id: AbilityId) -> bool {
        let moved = self
            .dataset
            .creature_mut(creature_id)
            .map(|creature| order::move_visual_up(creature, ability_id))
            .unwrap_or(false);
        self.unsaved |= moved;
        moved
    }

    pub fn move_visual_down(&mut self, creature_id: CreatureId, ability_id: AbilityId) -> bool {
        let moved = self
            .dataset
            .creature_mut(creature_id)
            .map(|creature| order::move_visual_down(creature, ability_id))
            .unwrap_or(false);
        self.unsaved |= moved;
        moved
    }

    /// Swaps in a freshly loaded snapshot. The edit log is session scoped
    /// and survives reloads.
    pub fn replace(&mut self, dataset: Dataset, source: DataSource) {
        self.ui_types = UiTypes::from_dataset(&dataset);
        self.dataset = dataset;
        self.source = Some(source);
        self.unsaved = false;
    }

    pub fn mark_saved(&mut self) {
        self.unsaved = false;
    }

    /// Restores the unsaved flag after an export that never reached disk.
    pub fn mark_unsaved(&mut self) {
        self.unsaved = true;
    }
}

fn check_shape(field: AbilityField, value: &FieldValue) -> Result<(), MovesError> {
    let ok = matches!(
        (field, value),
        (AbilityField::Name, FieldValue::Text(_))
            | (AbilityField::Type, FieldValue::Text(_))
            | (AbilityField::Element, FieldValue::Text(_))
            | (AbilityField::Ap, FieldValue::Number(_))
            | (AbilityField::TrueDamage, FieldValue::Flag(_))
    );
    if ok {
        Ok(())
    } else {
        Err(MovesError::FieldShape {
            field,
            value: value.to_string(),
        })
    }
}
