//! Keyword intent detection for the assistant prompt box.
//!
//! The merchant types free text ("I want to bundle two mugs"); this maps it
//! to the dashboard section to open. Matching is case-insensitive substring
//! search, checked in priority order: bundle, optimise, list, help.

use serde::Serialize;

/// What the merchant asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Build a bundle from two products.
    Bundle,
    /// Generate optimised listing content.
    Optimize,
    /// Show the product list.
    List,
    /// Explain what the assistant can do.
    Help,
    /// Nothing matched.
    Unknown,
}

/// Dashboard section to reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Bundle builder.
    Bundle,
    /// Listing optimiser.
    Optimize,
    /// Product list.
    Products,
}

/// Detected intent with the reply shown to the merchant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Intent {
    /// Detected action.
    pub action: Action,
    /// Section to open, if any.
    pub show_section: Option<Section>,
    /// Assistant reply.
    pub message: &'static str,
}

const RULES: &[(&[&str], Action, Option<Section>, &str)] = &[
    (
        &["bundle", "combine", "pair", "group products"],
        Action::Bundle,
        Some(Section::Bundle),
        "Great! I'll help you create a bundle. Select two products below to get started.",
    ),
    (
        &[
            "description",
            "desc",
            "launch",
            "optimize",
            "generate",
            "assets",
            "title",
            "seo",
        ],
        Action::Optimize,
        Some(Section::Optimize),
        "Perfect! I'll help you optimize your product descriptions and launch assets. \
         Select a product below to generate optimized content.",
    ),
    (
        &["product", "list", "show", "view", "see"],
        Action::List,
        Some(Section::Products),
        "I'll load your products for you.",
    ),
    (
        &["help", "what can", "how", "guide"],
        Action::Help,
        None,
        "I can help you with:\n\
         \u{2022} Creating product bundles - just say 'I want to bundle something'\n\
         \u{2022} Optimizing product descriptions - say 'I want to change descriptions'\n\
         \u{2022} Generating launch assets - select a product and I'll create optimized content\n\n\
         What would you like to do?",
    ),
];

const FALLBACK: &str = "I'm here to help! What would you like to do?";

/// Detect the merchant's intent from a free-text prompt.
#[must_use]
pub fn detect(prompt: &str) -> Intent {
    let prompt = prompt.to_lowercase();

    RULES
        .iter()
        .find(|(keywords, ..)| keywords.iter().any(|k| prompt.contains(k)))
        .map_or(
            Intent {
                action: Action::Unknown,
                show_section: None,
                message: FALLBACK,
            },
            |&(_, action, show_section, message)| Intent {
                action,
                show_section,
                message,
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_intent() {
        let intent = detect("I want to BUNDLE my mugs");
        assert_eq!(intent.action, Action::Bundle);
        assert_eq!(intent.show_section, Some(Section::Bundle));
    }

    #[test]
    fn test_bundle_wins_over_optimize() {
        assert_eq!(detect("combine and optimize").action, Action::Bundle);
    }

    #[test]
    fn test_optimize_intent() {
        assert_eq!(detect("rewrite my SEO").action, Action::Optimize);
        assert_eq!(detect("change descriptions").action, Action::Optimize);
    }

    #[test]
    fn test_list_intent() {
        let intent = detect("show me everything");
        assert_eq!(intent.action, Action::List);
        assert_eq!(intent.show_section, Some(Section::Products));
    }

    #[test]
    fn test_help_intent() {
        let intent = detect("what can you do?");
        assert_eq!(intent.action, Action::Help);
        assert_eq!(intent.show_section, None);
        assert!(intent.message.starts_with("I can help you with:"));
    }

    #[test]
    fn test_unknown_intent() {
        let intent = detect("");
        assert_eq!(intent.action, Action::Unknown);
        assert_eq!(intent.message, FALLBACK);
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(detect("bundle")).expect("serialize");
        assert_eq!(value["action"], "bundle");
        assert_eq!(value["show_section"], "bundle");
        let value = serde_json::to_value(detect("???")).expect("serialize");
        assert_eq!(value["show_section"], serde_json::Value::Null);
    }
}
