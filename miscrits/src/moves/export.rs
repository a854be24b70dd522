use chrono::NaiveDate;

use crate::moves::error::{LoadError, MovesError};
use crate::moves::record::Dataset;

pub const EXPORT_MIME: &str = "application/json";

/// Compact JSON with non-ASCII text written literally.
pub fn serialize(dataset: &Dataset) -> Result<Vec<u8>, MovesError> {
    serde_json::to_vec(dataset).map_err(|err| MovesError::Serialize(err.to_string()))
}

pub fn parse(bytes: &[u8]) -> Result<Dataset, LoadError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| LoadError::InvalidInput(format!("not UTF-8: {err}")))?;
    serde_json::from_str(text).map_err(|err| LoadError::InvalidInput(err.to_string()))
}

pub fn export_filename(date: NaiveDate) -> String {
    format!("miscrits_{}.json", date.format("%Y%m%d"))
}
