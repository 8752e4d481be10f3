//! Canonicalisation of equivalent field shapes.
//!
//! Only shapes that are both valid get reconciled here. Nothing invalid is
//! repaired: the decoder has already rejected it.

use std::collections::BTreeMap;

use super::decode::{DecodedFields, FieldValue, TagsValue};
use super::error::PipelineError;

/// Separator used for the canonical tag string.
pub const TAG_SEPARATOR: &str = ", ";

/// Decoded fields in canonical form. Tags are always a single string.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFields {
    values: BTreeMap<&'static str, FieldValue>,
}

/// Reconcile representation-level variance in `fields`.
#[must_use]
pub fn normalize(fields: DecodedFields) -> NormalizedFields {
    let values = fields
        .into_map()
        .into_iter()
        .map(|(name, value)| (name, canonical(value)))
        .collect();
    NormalizedFields { values }
}

fn canonical(value: FieldValue) -> FieldValue {
    match value {
        FieldValue::Tags(TagsValue::Delimited(s)) => FieldValue::Text(s),
        FieldValue::Tags(TagsValue::List(tags)) => FieldValue::Text(tags.join(TAG_SEPARATOR)),
        other => other,
    }
}

impl NormalizedFields {
    /// Borrow a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Remove a string field.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is absent or not a string.
    pub fn take_text(&mut self, name: &'static str) -> Result<String, PipelineError> {
        match self.take(name)? {
            FieldValue::Text(s) => Ok(s),
            other => Err(mismatch(name, "string", &other)),
        }
    }

    /// Remove a string list field.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is absent or not a list.
    pub fn take_list(&mut self, name: &'static str) -> Result<Vec<String>, PipelineError> {
        match self.take(name)? {
            FieldValue::TextList(items) => Ok(items),
            other => Err(mismatch(name, "array", &other)),
        }
    }

    /// Remove an integer field.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is absent or not an integer.
    pub fn take_integer(&mut self, name: &'static str) -> Result<i64, PipelineError> {
        match self.take(name)? {
            FieldValue::Integer(i) => Ok(i),
            other => Err(mismatch(name, "integer", &other)),
        }
    }

    /// Remove a numeric field.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is absent or not a number.
    pub fn take_number(&mut self, name: &'static str) -> Result<f64, PipelineError> {
        match self.take(name)? {
            FieldValue::Number(x) => Ok(x),
            other => Err(mismatch(name, "number", &other)),
        }
    }

    fn take(&mut self, name: &'static str) -> Result<FieldValue, PipelineError> {
        self.values
            .remove(name)
            .ok_or_else(|| PipelineError::MissingField(name.to_owned()))
    }
}

fn mismatch(name: &str, expected: &str, found: &FieldValue) -> PipelineError {
    let actual = match found {
        FieldValue::Text(_) | FieldValue::Tags(TagsValue::Delimited(_)) => "string",
        FieldValue::TextList(_) | FieldValue::Tags(TagsValue::List(_)) => "array",
        FieldValue::Integer(_) | FieldValue::Number(_) => "number",
    };
    PipelineError::invalid(name, expected, actual)
}
