//! Required-field tables for decoding model replies.

/// Expected shape of a single field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// A JSON string.
    Text {
        /// Reject empty or whitespace-only strings.
        non_empty: bool,
        /// Maximum length in characters.
        max_chars: Option<usize>,
    },
    /// A JSON array of exactly `len` non-empty strings.
    TextList {
        /// Required number of items.
        len: usize,
    },
    /// Either a delimited string or an array of strings.
    Tags,
    /// A JSON integer within inclusive bounds.
    Integer {
        /// Lower bound (inclusive).
        min: i64,
        /// Upper bound (inclusive).
        max: i64,
    },
    /// Any JSON number strictly between the bounds.
    Number {
        /// Lower bound (exclusive).
        min: f64,
        /// Upper bound (exclusive).
        max: f64,
    },
}

/// A required field and its expected kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// JSON key.
    pub name: &'static str,
    /// Expected kind.
    pub kind: FieldKind,
}

impl FieldSpec {
    /// A non-empty string.
    #[must_use]
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text {
                non_empty: true,
                max_chars: None,
            },
        }
    }

    /// A string that may be empty.
    #[must_use]
    pub const fn optional_text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text {
                non_empty: false,
                max_chars: None,
            },
        }
    }

    /// A non-empty string of at most `max_chars` characters.
    #[must_use]
    pub const fn bounded_text(name: &'static str, max_chars: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Text {
                non_empty: true,
                max_chars: Some(max_chars),
            },
        }
    }

    /// An array of exactly `len` strings.
    #[must_use]
    pub const fn text_list(name: &'static str, len: usize) -> Self {
        Self {
            name,
            kind: FieldKind::TextList { len },
        }
    }

    /// A tag string or tag array.
    #[must_use]
    pub const fn tags(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Tags,
        }
    }

    /// An integer in `min..=max`.
    #[must_use]
    pub const fn integer(name: &'static str, min: i64, max: i64) -> Self {
        Self {
            name,
            kind: FieldKind::Integer { min, max },
        }
    }

    /// A number in the open interval `(min, max)`.
    #[must_use]
    pub const fn number(name: &'static str, min: f64, max: f64) -> Self {
        Self {
            name,
            kind: FieldKind::Number { min, max },
        }
    }
}

/// An ordered set of required fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schema {
    /// Name used in diagnostics.
    pub name: &'static str,
    /// Fields in the order they are checked.
    pub fields: &'static [FieldSpec],
}

impl Schema {
    /// Look up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}
