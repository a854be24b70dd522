use crate::moves::record::{AbilityId, CreatureId};
use crate::moves::store::AbilityField;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MovesError {
    #[error("creature {0} not found")]
    CreatureNotFound(CreatureId),
    #[error("ability {ability_id} not found on creature {creature_id}")]
    AbilityNotFound {
        creature_id: CreatureId,
        ability_id: AbilityId,
    },
    #[error("field `{field}` cannot hold {value}")]
    FieldShape { field: AbilityField, value: String },
    #[error("failed to serialize dataset: {0}")]
    Serialize(String),
}

impl MovesError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            MovesError::CreatureNotFound(_) | MovesError::AbilityNotFound { .. }
        )
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("dataset not available: {0}")]
    NotAvailable(String),
    #[error("invalid dataset: {0}")]
    InvalidInput(String),
}
