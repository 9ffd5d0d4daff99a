//! Shared helpers for mapping upstream DTOs to domain types.
//!
//! Both upstream APIs are loose about types: numbers sometimes arrive as
//! strings, empty strings stand in for missing values. The helpers here
//! apply one policy everywhere: a required field that is absent, empty or
//! uncoercible fails the whole mapping with the field's name.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::VigicruesError;
use crate::geo::CoordinateError;

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Field present but not coercible to the expected type
    #[error("invalid value for {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },

    /// Document does not have the expected overall structure
    #[error("unexpected document shape: {0}")]
    Shape(String),

    /// Coordinates present but outside the projection's domain
    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
}

impl From<ConversionError> for VigicruesError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::MissingField(field) => VigicruesError::MalformedResponse {
                field: field.to_string(),
                reason: "missing required field".to_string(),
            },
            ConversionError::InvalidField { field, value } => VigicruesError::MalformedResponse {
                field: field.to_string(),
                reason: format!("invalid value {value:?}"),
            },
            ConversionError::Shape(message) => VigicruesError::MalformedResponse {
                field: "(document)".to_string(),
                reason: message,
            },
            ConversionError::Coordinate(e) => VigicruesError::Coordinate(e),
        }
    }
}

/// A scalar that upstream sends either as a JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    /// Coerce to a finite `f64`.
    ///
    /// Blank strings count as absent. French decimal commas are accepted.
    pub fn to_f64(&self, field: &'static str) -> Result<Option<f64>, ConversionError> {
        let value = match self {
            NumberOrString::Number(n) => *n,
            NumberOrString::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                s.replace(',', ".")
                    .parse::<f64>()
                    .map_err(|_| ConversionError::InvalidField {
                        field,
                        value: s.to_string(),
                    })?
            }
        };

        if !value.is_finite() {
            return Err(ConversionError::InvalidField {
                field,
                value: value.to_string(),
            });
        }
        Ok(Some(value))
    }
}

/// Decode a raw JSON document into a DTO.
pub fn decode<T: DeserializeOwned>(raw: &Value) -> Result<T, ConversionError> {
    T::deserialize(raw).map_err(|e| ConversionError::Shape(e.to_string()))
}

/// A required, non-blank string field.
pub fn required(value: Option<&str>, field: &'static str) -> Result<String, ConversionError> {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(ConversionError::MissingField(field)),
    }
}

/// An optional string field; blank counts as absent.
pub fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A required numeric field.
pub fn required_f64(
    value: Option<&NumberOrString>,
    field: &'static str,
) -> Result<f64, ConversionError> {
    value
        .map(|v| v.to_f64(field))
        .transpose()?
        .flatten()
        .ok_or(ConversionError::MissingField(field))
}

/// An optional numeric field; present-but-garbage still fails.
pub fn optional_f64(
    value: Option<&NumberOrString>,
    field: &'static str,
) -> Result<Option<f64>, ConversionError> {
    Ok(value.map(|v| v.to_f64(field)).transpose()?.flatten())
}
