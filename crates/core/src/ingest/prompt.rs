//! Prompt templates and entity embedding.
//!
//! Entities are serialized to compact JSON and cut to a character budget
//! before substitution. The cut ignores JSON structure, so the embedded
//! document may be incomplete; the templates tell the model to expect that.

use serde_json::Value;

/// Character budget for a single product in the optimisation prompt.
pub const PRODUCT_ENTITY_LIMIT: usize = 8000;
/// Character budget for each product in the bundle prompt.
pub const BUNDLE_ENTITY_LIMIT: usize = 6000;
/// Character budget for the product in the announcement prompt.
pub const ANNOUNCEMENT_ENTITY_LIMIT: usize = 8000;

/// An entity to embed in a prompt together with its size cap.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    entity: &'a Value,
    truncation_limit: usize,
}

impl<'a> GenerationRequest<'a> {
    /// Create a request for `entity`, capped at `truncation_limit` characters.
    #[must_use]
    pub const fn new(entity: &'a Value, truncation_limit: usize) -> Self {
        Self {
            entity,
            truncation_limit,
        }
    }

    /// The entity being embedded.
    #[must_use]
    pub const fn entity(&self) -> &'a Value {
        self.entity
    }

    /// Compact JSON for the entity, cut to the character budget.
    #[must_use]
    pub fn serialized_entity(&self) -> String {
        truncate_chars(&self.entity.to_string(), self.truncation_limit).to_owned()
    }
}

/// Cut `s` after `limit` characters without splitting a UTF-8 sequence.
fn truncate_chars(s: &str, limit: usize) -> &str {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => s.get(..idx).unwrap_or(s),
        None => s,
    }
}

/// A fixed prompt with `{name}` placeholders.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    /// Template text.
    pub text: &'static str,
    /// Output token budget to request alongside this prompt.
    pub max_tokens: u32,
}

impl PromptTemplate {
    /// Substitute placeholders in a single pass.
    ///
    /// Substituted values are never rescanned, so an entity containing
    /// `{product_b}` cannot inject into a later slot. Braces that do not
    /// name a known slot are copied verbatim.
    #[must_use]
    pub fn render(&self, slots: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(
            self.text.len() + slots.iter().map(|(_, v)| v.len()).sum::<usize>(),
        );
        let mut rest = self.text;

        while let Some(open) = rest.find('{') {
            let (before, from_brace) = rest.split_at(open);
            out.push_str(before);

            let slot = from_brace.get(1..).and_then(|after| {
                let close = after.find('}')?;
                let name = after.get(..close)?;
                slots
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| (*value, close + 2))
            });

            match slot {
                Some((value, consumed)) => {
                    out.push_str(value);
                    rest = from_brace.get(consumed..).unwrap_or_default();
                }
                None => {
                    out.push('{');
                    rest = from_brace.get(1..).unwrap_or_default();
                }
            }
        }

        out.push_str(rest);
        out
    }
}

/// Listing optimisation: one product in, nine launch fields out.
pub const PRODUCT_TEMPLATE: PromptTemplate = PromptTemplate {
    text: r#"You are an ecommerce launch assistant.

Given raw product JSON, produce a JSON object with these exact fields:

- title: Optimized product title
- description_html: Concise, persuasive HTML description with bullet points
- bullets: Array of exactly 5 key selling points
- tags: Comma-separated string of 5-10 relevant tags
- seo_title: SEO-optimized title (max 60 characters)
- seo_description: SEO meta description (max 155 characters)
- discount_code: A slug-like discount code (e.g., "LAUNCH20", "NEWPRODUCT15")
- discount_percent: Integer between 5 and 30
- banner_copy: Short announcement bar copy for the launch

Return ONLY valid JSON, no markdown code blocks, no explanations.
The product JSON may be cut off; work with what is present.

Product JSON:

{product_json}"#,
    max_tokens: 2000,
};

/// Bundle proposal: two products in, one bundle listing out.
pub const BUNDLE_TEMPLATE: PromptTemplate = PromptTemplate {
    text: r#"You are a Shopify ecommerce expert.

Here are two products in JSON (either may be cut off):

Product A:
{product_a}

Product B:
{product_b}

Create a NEW Shopify bundle product combining them.

Return ONLY valid JSON with no explanation, using exactly these fields:
{
  "title": "...",
  "description_html": "...",
  "tags": "...",
  "bundle_price_percent_off": 10,
  "bundle_notes": "..."
}

bundle_price_percent_off must be a number greater than 0 and less than 100."#,
    max_tokens: 800,
};

/// Announcement snippet: a Liquid snippet injected into the live theme.
pub const ANNOUNCEMENT_TEMPLATE: PromptTemplate = PromptTemplate {
    text: r#"You are a Shopify theme developer.

Write a self-contained announcement bar for the product below as a Liquid
snippet. Inline its CSS in a <style> tag, use no external assets and no
JavaScript.

Announcement copy to feature:
{banner_copy}

Product JSON (may be cut off):
{product_json}

Return ONLY valid JSON with no explanation, using exactly these fields:
- filename: Snippet asset key, e.g. "snippets/launch-announcement.liquid"
- content: The full Liquid snippet source
- preview_html: Static HTML rendering of the snippet for previewing"#,
    max_tokens: 1500,
};

/// Connectivity check prompt.
pub const PING_TEMPLATE: PromptTemplate = PromptTemplate {
    text: "Say 'Hello, Claude API is working!' and nothing else.",
    max_tokens: 100,
};

/// Build the listing optimisation prompt for `product`.
#[must_use]
pub fn product_prompt(product: &Value) -> String {
    let entity = GenerationRequest::new(product, PRODUCT_ENTITY_LIMIT).serialized_entity();
    PRODUCT_TEMPLATE.render(&[("product_json", entity.as_str())])
}

/// Build the bundle proposal prompt for two products.
#[must_use]
pub fn bundle_prompt(product_a: &Value, product_b: &Value) -> String {
    let a = GenerationRequest::new(product_a, BUNDLE_ENTITY_LIMIT).serialized_entity();
    let b = GenerationRequest::new(product_b, BUNDLE_ENTITY_LIMIT).serialized_entity();
    BUNDLE_TEMPLATE.render(&[("product_a", a.as_str()), ("product_b", b.as_str())])
}

/// Build the announcement snippet prompt.
///
/// Without explicit copy the model is asked to write its own.
#[must_use]
pub fn announcement_prompt(product: &Value, banner_copy: Option<&str>) -> String {
    let entity = GenerationRequest::new(product, ANNOUNCEMENT_ENTITY_LIMIT).serialized_entity();
    let copy = banner_copy
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("(none given - write a short launch announcement)");
    ANNOUNCEMENT_TEMPLATE.render(&[
        ("banner_copy", copy),
        ("product_json", entity.as_str()),
    ])
}
