//! Moves editor core: the dataset snapshot, its edit log, icon resolution,
//! ability ordering, the UI type projection and export.

pub mod error;
pub mod export;
pub mod icon;
pub mod order;
pub mod projection;
pub mod record;
pub mod store;

pub use error::{LoadError, MovesError};
pub use record::{Ability, AbilityId, Creature, CreatureId, Dataset};
pub use store::{AbilityField, DataSource, EditLogEntry, FieldValue, RecordStore};
