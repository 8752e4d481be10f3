//! Request and response bodies for the Admin REST endpoints we call.
//!
//! Products stay as raw JSON: they are passed through to the frontend and
//! embedded in prompts verbatim, so only the few fields we read are typed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use launchkit_core::{BundleProposal, ProductSuggestion};

/// Product type set on created bundles.
pub const BUNDLE_PRODUCT_TYPE: &str = "Bundle";
/// Variant title set on created bundles.
pub const BUNDLE_VARIANT_TITLE: &str = "Bundle Default";
/// Metafield namespace holding bundle metadata.
pub const BUNDLE_METAFIELD_NAMESPACE: &str = "bundle";
/// Metafield key holding the bundle's component products.
pub const BUNDLE_METAFIELD_KEY: &str = "components";

// =============================================================================
// Products
// =============================================================================

/// Numeric product ID.
#[must_use]
pub fn product_id(product: &Value) -> Option<u64> {
    product.get("id").and_then(Value::as_u64)
}

/// Price string of the first variant.
#[must_use]
pub fn first_variant_price(product: &Value) -> Option<&str> {
    product
        .get("variants")?
        .as_array()?
        .first()?
        .get("price")?
        .as_str()
}

/// Source URL of the first image.
#[must_use]
pub fn first_image_src(product: &Value) -> Option<&str> {
    product
        .get("images")?
        .as_array()?
        .first()?
        .get("src")?
        .as_str()
}

/// Listing fields overwritten when a suggestion is applied.
#[derive(Debug, Clone, Serialize)]
pub struct ProductUpdate<'a> {
    pub id: u64,
    pub title: &'a str,
    pub body_html: &'a str,
    pub tags: &'a str,
}

impl<'a> ProductUpdate<'a> {
    /// Update `id` with the listing content of `suggestion`.
    #[must_use]
    pub fn from_suggestion(id: u64, suggestion: &'a ProductSuggestion) -> Self {
        Self {
            id,
            title: suggestion.title(),
            body_html: suggestion.description_html(),
            tags: suggestion.tags(),
        }
    }
}

/// A product to create.
#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    pub title: String,
    pub body_html: String,
    pub tags: String,
    pub product_type: &'static str,
    pub variants: Vec<NewVariant>,
    pub images: Vec<NewImage>,
}

impl NewProduct {
    /// Single-variant bundle listing priced at `price`.
    #[must_use]
    pub fn bundle(proposal: &BundleProposal, price: Decimal, images: Vec<NewImage>) -> Self {
        Self {
            title: proposal.title().to_string(),
            body_html: proposal.description_html().to_string(),
            tags: proposal.tags().to_string(),
            product_type: BUNDLE_PRODUCT_TYPE,
            variants: vec![NewVariant {
                title: BUNDLE_VARIANT_TITLE.to_string(),
                price,
            }],
            images,
        }
    }
}

/// A variant on a product to create.
#[derive(Debug, Clone, Serialize)]
pub struct NewVariant {
    pub title: String,
    /// Serialized as a decimal string, the form Shopify stores.
    pub price: Decimal,
}

/// An image to attach by URL.
#[derive(Debug, Clone, Serialize)]
pub struct NewImage {
    pub src: String,
}

/// A metafield on a product.
#[derive(Debug, Clone, Serialize)]
pub struct NewMetafield {
    pub namespace: &'static str,
    pub key: &'static str,
    #[serde(rename = "type")]
    pub value_type: &'static str,
    /// JSON-encoded value.
    pub value: String,
    pub owner_resource: &'static str,
    pub owner_id: u64,
}

impl NewMetafield {
    /// `bundle.components` metafield recording which products a bundle combines.
    #[must_use]
    pub fn bundle_components(bundle_id: u64, product_a: u64, product_b: u64, notes: &str) -> Self {
        let value = serde_json::json!({
            "product_a_id": product_a,
            "product_b_id": product_b,
            "notes": notes,
        });
        Self {
            namespace: BUNDLE_METAFIELD_NAMESPACE,
            key: BUNDLE_METAFIELD_KEY,
            value_type: "json",
            value: value.to_string(),
            owner_resource: "product",
            owner_id: bundle_id,
        }
    }
}

// =============================================================================
// Discounts
// =============================================================================

/// A percentage price rule applying to every line item for every customer.
#[derive(Debug, Clone, Serialize)]
pub struct NewPriceRule {
    pub title: String,
    pub target_type: &'static str,
    pub target_selection: &'static str,
    pub allocation_method: &'static str,
    pub value_type: &'static str,
    /// Negative percentage, e.g. `"-15"`.
    pub value: String,
    pub customer_selection: &'static str,
    pub starts_at: DateTime<Utc>,
}

impl NewPriceRule {
    /// Launch discount rule for `code` at `percent` off, starting at `starts_at`.
    #[must_use]
    pub fn launch(code: &str, percent: u8, starts_at: DateTime<Utc>) -> Self {
        Self {
            title: format!("Launch Discount: {code}"),
            target_type: "line_item",
            target_selection: "all",
            allocation_method: "across",
            value_type: "percentage",
            value: format!("-{percent}"),
            customer_selection: "all",
            starts_at,
        }
    }
}

/// A created price rule.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceRule {
    pub id: u64,
    #[serde(default)]
    pub title: String,
}

/// A created discount code.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscountCode {
    pub id: u64,
    pub code: String,
    #[serde(default)]
    pub price_rule_id: Option<u64>,
}

// =============================================================================
// Themes
// =============================================================================

/// Role of the published theme.
pub const MAIN_THEME_ROLE: &str = "main";

/// An online store theme.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Theme {
    pub id: u64,
    pub name: String,
    pub role: String,
}

/// A theme asset as returned after a write.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Asset {
    pub key: String,
    #[serde(default)]
    pub theme_id: Option<u64>,
}

// =============================================================================
// Envelopes
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct ProductEnvelope {
    pub product: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PriceRuleEnvelope {
    pub price_rule: PriceRule,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DiscountCodeEnvelope {
    pub discount_code: DiscountCode,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThemesEnvelope {
    pub themes: Vec<Theme>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssetEnvelope {
    pub asset: Asset,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_product_accessors() {
        let product = json!({
            "id": 632_910_392,
            "variants": [{"price": "19.99"}, {"price": "5.00"}],
            "images": [{"src": "https://cdn.shopify.com/a.jpg"}]
        });
        assert_eq!(product_id(&product), Some(632_910_392));
        assert_eq!(first_variant_price(&product), Some("19.99"));
        assert_eq!(first_image_src(&product), Some("https://cdn.shopify.com/a.jpg"));
    }

    #[test]
    fn test_product_accessors_tolerate_missing_fields() {
        let product = json!({"variants": [], "images": null});
        assert_eq!(product_id(&product), None);
        assert_eq!(first_variant_price(&product), None);
        assert_eq!(first_image_src(&product), None);
    }

    #[test]
    fn test_launch_price_rule_shape() {
        let starts_at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("date");
        let rule = serde_json::to_value(NewPriceRule::launch("LAUNCH15", 15, starts_at))
            .expect("serialize");
        assert_eq!(rule["title"], "Launch Discount: LAUNCH15");
        assert_eq!(rule["value"], "-15");
        assert_eq!(rule["value_type"], "percentage");
        assert_eq!(rule["target_selection"], "all");
        assert_eq!(rule["allocation_method"], "across");
        assert_eq!(rule["customer_selection"], "all");
    }

    #[test]
    fn test_price_serializes_as_string() {
        let variant = NewVariant {
            title: BUNDLE_VARIANT_TITLE.to_string(),
            price: Decimal::new(2700, 2),
        };
        let value = serde_json::to_value(variant).expect("serialize");
        assert_eq!(value["price"], "27.00");
    }

    #[test]
    fn test_bundle_components_metafield() {
        let metafield = NewMetafield::bundle_components(9, 1, 2, "gift set");
        let value: Value = serde_json::from_str(&metafield.value).expect("json value");
        assert_eq!(value, json!({"product_a_id": 1, "product_b_id": 2, "notes": "gift set"}));
        let body = serde_json::to_value(&metafield).expect("serialize");
        assert_eq!(body["type"], "json");
        assert_eq!(body["owner_id"], 9);
    }
}
