//! JSON parsing and schema validation.
//!
//! The loosely typed `serde_json::Value` never leaves this module: callers
//! get [`DecodedFields`], whose values already match their declared kinds.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::error::PipelineError;
use super::extract::ExtractedText;
use super::schema::{FieldKind, FieldSpec, Schema};

/// Characters shown on each side of a syntax error.
const CONTEXT_RADIUS: usize = 100;
/// Characters of the candidate text kept when no error offset is known.
const EXCERPT_CHARS: usize = 200;

/// Tags as the model produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagsValue {
    /// A single delimited string, e.g. `"a, b, c"`.
    Delimited(String),
    /// A list of individual tags.
    List(Vec<String>),
}

/// A field value that satisfied its [`FieldKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A string.
    Text(String),
    /// A fixed-length list of strings.
    TextList(Vec<String>),
    /// Tags in either accepted shape.
    Tags(TagsValue),
    /// An in-range integer.
    Integer(i64),
    /// An in-range number.
    Number(f64),
}

/// Validated fields keyed by name.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFields {
    values: BTreeMap<&'static str, FieldValue>,
}

impl DecodedFields {
    pub(crate) const fn from_map(values: BTreeMap<&'static str, FieldValue>) -> Self {
        Self { values }
    }

    pub(crate) fn into_map(self) -> BTreeMap<&'static str, FieldValue> {
        self.values
    }

    /// Borrow a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parse extracted text and validate it against `schema`.
///
/// # Errors
///
/// - [`PipelineError::EmptyResponse`] if nothing is left after extraction
/// - [`PipelineError::MalformedJson`] if the text is not JSON
/// - [`PipelineError::NotAnObject`] if the root is not an object
/// - [`PipelineError::MissingField`] / [`PipelineError::InvalidFieldValue`]
///   for schema violations
pub fn decode(text: &ExtractedText, schema: &Schema) -> Result<DecodedFields, PipelineError> {
    if text.is_empty() {
        return Err(PipelineError::EmptyResponse);
    }

    let value: Value =
        serde_json::from_str(text.as_str()).map_err(|e| malformed(text.as_str(), &e))?;
    decode_value(value, schema)
}

/// Validate an already parsed document against `schema`.
///
/// # Errors
///
/// Same schema errors as [`decode`].
pub fn decode_value(value: Value, schema: &Schema) -> Result<DecodedFields, PipelineError> {
    let Value::Object(mut object) = value else {
        return Err(PipelineError::NotAnObject {
            actual: json_type(&value),
        });
    };

    // Presence first, so a missing field is reported even if an earlier
    // field is also malformed.
    if let Some(missing) = schema.fields.iter().find(|f| !is_present(&object, f.name)) {
        return Err(PipelineError::MissingField(missing.name.to_owned()));
    }

    let mut values = BTreeMap::new();
    for spec in schema.fields {
        let raw = object.remove(spec.name).unwrap_or(Value::Null);
        values.insert(spec.name, check_field(spec, raw)?);
    }

    Ok(DecodedFields::from_map(values))
}

fn is_present(object: &Map<String, Value>, name: &str) -> bool {
    object.get(name).is_some_and(|v| !v.is_null())
}

fn check_field(spec: &FieldSpec, value: Value) -> Result<FieldValue, PipelineError> {
    let name = spec.name;

    match spec.kind {
        FieldKind::Text {
            non_empty,
            max_chars,
        } => {
            let Value::String(s) = value else {
                return Err(PipelineError::invalid(name, "string", json_type(&value)));
            };
            if non_empty && s.trim().is_empty() {
                return Err(PipelineError::invalid(name, "non-empty string", "empty string"));
            }
            if let Some(max) = max_chars {
                let len = s.chars().count();
                if len > max {
                    return Err(PipelineError::invalid(
                        name,
                        format!("length<={max}"),
                        len.to_string(),
                    ));
                }
            }
            Ok(FieldValue::Text(s))
        }

        FieldKind::TextList { len } => {
            let Value::Array(items) = value else {
                return Err(PipelineError::invalid(name, "array", json_type(&value)));
            };
            if items.len() != len {
                return Err(PipelineError::invalid(
                    name,
                    format!("length=={len}"),
                    items.len().to_string(),
                ));
            }
            string_items(name, items).map(FieldValue::TextList)
        }

        FieldKind::Tags => match value {
            Value::String(s) if s.trim().is_empty() => {
                Err(PipelineError::invalid(name, "non-empty tags", "empty string"))
            }
            Value::String(s) => Ok(FieldValue::Tags(TagsValue::Delimited(s))),
            Value::Array(items) if items.is_empty() => {
                Err(PipelineError::invalid(name, "non-empty tags", "empty array"))
            }
            Value::Array(items) => {
                string_items(name, items).map(|tags| FieldValue::Tags(TagsValue::List(tags)))
            }
            other => Err(PipelineError::invalid(
                name,
                "string or array of strings",
                json_type(&other),
            )),
        },

        FieldKind::Integer { min, max } => {
            let Value::Number(n) = value else {
                return Err(PipelineError::invalid(name, "integer", json_type(&value)));
            };
            if n.is_f64() {
                return Err(PipelineError::invalid(name, "integer", n.to_string()));
            }
            match n.as_i64() {
                Some(i) if (min..=max).contains(&i) => Ok(FieldValue::Integer(i)),
                _ => Err(PipelineError::invalid(
                    name,
                    format!("{min}<=value<={max}"),
                    n.to_string(),
                )),
            }
        }

        FieldKind::Number { min, max } => {
            let Some(x) = value.as_f64() else {
                return Err(PipelineError::invalid(name, "number", json_type(&value)));
            };
            if x > min && x < max {
                Ok(FieldValue::Number(x))
            } else {
                Err(PipelineError::invalid(
                    name,
                    format!("{min}<value<{max}"),
                    value.to_string(),
                ))
            }
        }
    }
}

fn string_items(name: &str, items: Vec<Value>) -> Result<Vec<String>, PipelineError> {
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) if s.trim().is_empty() => Err(PipelineError::invalid(
                name,
                "non-empty string items",
                "empty string",
            )),
            Value::String(s) => Ok(s),
            other => Err(PipelineError::invalid(
                name,
                "string items",
                json_type(&other),
            )),
        })
        .collect()
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn malformed(text: &str, err: &serde_json::Error) -> PipelineError {
    let offset = byte_offset(text, err.line(), err.column());
    let context = offset.map_or_else(
        || head(text, EXCERPT_CHARS).to_owned(),
        |o| context_window(text, o),
    );

    PipelineError::MalformedJson {
        offset,
        context,
        message: err.to_string(),
    }
}

/// Convert serde_json's 1-based line/column into a byte offset.
///
/// Line 0 means the parser had no position (I/O errors).
fn byte_offset(text: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    Some((line_start + column.saturating_sub(1)).min(text.len()))
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn head(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((idx, _)) => text.get(..idx).unwrap_or(text),
        None => text,
    }
}

fn context_window(text: &str, offset: usize) -> String {
    let offset = floor_char_boundary(text, offset);
    let (before, after) = text.split_at(offset);

    let start = before
        .char_indices()
        .rev()
        .nth(CONTEXT_RADIUS - 1)
        .map_or(0, |(idx, _)| idx);

    let mut window = before.get(start..).unwrap_or_default().to_owned();
    window.push_str(head(after, CONTEXT_RADIUS));
    window
}
