//! Best-effort cleanup of model output before JSON parsing.
//!
//! Models wrap JSON in code fences or add prose despite being told not to.
//! Extraction never fails; the decoder owns the validity check.

const FENCE: &str = "```";

/// Model text with fences, language tags and surrounding prose removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    /// Returns the candidate JSON text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the value and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Whether nothing is left after cleanup.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for ExtractedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reduce raw model text to a candidate JSON document.
#[must_use]
pub fn extract(raw: &str) -> ExtractedText {
    let text = strip_fences(raw.trim());
    let text = strip_language_tag(text);
    let text = object_span(text);
    ExtractedText(text.trim().to_owned())
}

/// Remove a leading fence line and a trailing fence, or a bare backtick run.
fn strip_fences(text: &str) -> &str {
    let mut text = text;

    if let Some(after) = text.strip_prefix(FENCE) {
        let after = after.trim_start_matches('`');
        text = match after.split_once('\n') {
            // ```json\n{...}: the opening line holds at most a language tag
            Some((opening, body)) if !opening.contains('{') => body,
            _ => after,
        };
    }

    let text = text.trim_end();
    let text = text.strip_suffix(FENCE).map_or(text, |t| t.trim_end_matches('`'));

    text.trim().trim_matches('`').trim()
}

/// Drop a leading `json` language tag (any case).
fn strip_language_tag(text: &str) -> &str {
    match text.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => text.get(4..).unwrap_or_default().trim_start(),
        _ => text,
    }
}

/// Slice from the first `{` to the last `}` when both exist in order.
fn object_span(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => text.get(start..=end).unwrap_or(text),
        _ => text,
    }
}
