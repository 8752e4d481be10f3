//! Validated records produced by the pipeline.
//!
//! Fields are private: a record can only be built by [`Validated::from_fields`]
//! after decoding succeeded, so holding one proves every constraint held.

use serde::Serialize;

use super::error::PipelineError;
use super::normalize::NormalizedFields;
use super::schema::{FieldSpec, Schema};

/// A record type with a schema and a constructor from normalized fields.
pub trait Validated: Sized {
    /// Required fields and their kinds.
    const SCHEMA: Schema;

    /// Build the record from fields that already passed [`Self::SCHEMA`].
    ///
    /// # Errors
    ///
    /// Returns an error if a field is missing or has the wrong kind, which
    /// only happens when `fields` was not decoded with [`Self::SCHEMA`].
    fn from_fields(fields: NormalizedFields) -> Result<Self, PipelineError>;
}

/// Number of selling points in a product suggestion.
pub const BULLET_COUNT: usize = 5;
/// Maximum SEO title length in characters.
pub const SEO_TITLE_MAX: usize = 60;
/// Maximum SEO description length in characters.
pub const SEO_DESCRIPTION_MAX: usize = 155;
/// Smallest launch discount the model may propose.
pub const DISCOUNT_MIN: i64 = 5;
/// Largest launch discount the model may propose.
pub const DISCOUNT_MAX: i64 = 30;

/// Listing optimisation output for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSuggestion {
    title: String,
    description_html: String,
    bullets: [String; BULLET_COUNT],
    tags: String,
    seo_title: String,
    seo_description: String,
    discount_code: String,
    discount_percent: u8,
    banner_copy: String,
}

impl ProductSuggestion {
    /// Optimised product title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// HTML product description.
    #[must_use]
    pub fn description_html(&self) -> &str {
        &self.description_html
    }

    /// The five selling points.
    #[must_use]
    pub const fn bullets(&self) -> &[String; BULLET_COUNT] {
        &self.bullets
    }

    /// Canonical comma-separated tags.
    #[must_use]
    pub fn tags(&self) -> &str {
        &self.tags
    }

    /// SEO title, at most 60 characters.
    #[must_use]
    pub fn seo_title(&self) -> &str {
        &self.seo_title
    }

    /// SEO meta description, at most 155 characters.
    #[must_use]
    pub fn seo_description(&self) -> &str {
        &self.seo_description
    }

    /// Launch discount code.
    #[must_use]
    pub fn discount_code(&self) -> &str {
        &self.discount_code
    }

    /// Launch discount in percent, within 5..=30.
    #[must_use]
    pub const fn discount_percent(&self) -> u8 {
        self.discount_percent
    }

    /// Announcement bar copy.
    #[must_use]
    pub fn banner_copy(&self) -> &str {
        &self.banner_copy
    }
}

impl Validated for ProductSuggestion {
    const SCHEMA: Schema = Schema {
        name: "product_suggestion",
        fields: &[
            FieldSpec::text("title"),
            FieldSpec::text("description_html"),
            FieldSpec::text_list("bullets", BULLET_COUNT),
            FieldSpec::tags("tags"),
            FieldSpec::bounded_text("seo_title", SEO_TITLE_MAX),
            FieldSpec::bounded_text("seo_description", SEO_DESCRIPTION_MAX),
            FieldSpec::text("discount_code"),
            FieldSpec::integer("discount_percent", DISCOUNT_MIN, DISCOUNT_MAX),
            FieldSpec::text("banner_copy"),
        ],
    };

    fn from_fields(mut fields: NormalizedFields) -> Result<Self, PipelineError> {
        let bullets = fields.take_list("bullets")?;
        let count = bullets.len();
        let bullets: [String; BULLET_COUNT] = bullets.try_into().map_err(|_| {
            PipelineError::invalid("bullets", format!("length=={BULLET_COUNT}"), count.to_string())
        })?;

        let percent = fields.take_integer("discount_percent")?;
        let discount_percent = u8::try_from(percent).map_err(|_| {
            PipelineError::invalid(
                "discount_percent",
                format!("{DISCOUNT_MIN}<=value<={DISCOUNT_MAX}"),
                percent.to_string(),
            )
        })?;

        Ok(Self {
            title: fields.take_text("title")?,
            description_html: fields.take_text("description_html")?,
            bullets,
            tags: fields.take_text("tags")?,
            seo_title: fields.take_text("seo_title")?,
            seo_description: fields.take_text("seo_description")?,
            discount_code: fields.take_text("discount_code")?,
            discount_percent,
            banner_copy: fields.take_text("banner_copy")?,
        })
    }
}

/// A new bundle listing combining two products.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BundleProposal {
    title: String,
    description_html: String,
    tags: String,
    bundle_price_percent_off: f64,
    bundle_notes: String,
}

impl BundleProposal {
    /// Bundle title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// HTML bundle description.
    #[must_use]
    pub fn description_html(&self) -> &str {
        &self.description_html
    }

    /// Canonical comma-separated tags.
    #[must_use]
    pub fn tags(&self) -> &str {
        &self.tags
    }

    /// Discount off the combined price, strictly between 0 and 100.
    #[must_use]
    pub const fn bundle_price_percent_off(&self) -> f64 {
        self.bundle_price_percent_off
    }

    /// Free-form merchandising notes; may be empty.
    #[must_use]
    pub fn bundle_notes(&self) -> &str {
        &self.bundle_notes
    }
}

impl Validated for BundleProposal {
    const SCHEMA: Schema = Schema {
        name: "bundle_proposal",
        fields: &[
            FieldSpec::text("title"),
            FieldSpec::text("description_html"),
            FieldSpec::tags("tags"),
            FieldSpec::number("bundle_price_percent_off", 0.0, 100.0),
            FieldSpec::optional_text("bundle_notes"),
        ],
    };

    fn from_fields(mut fields: NormalizedFields) -> Result<Self, PipelineError> {
        Ok(Self {
            title: fields.take_text("title")?,
            description_html: fields.take_text("description_html")?,
            tags: fields.take_text("tags")?,
            bundle_price_percent_off: fields.take_number("bundle_price_percent_off")?,
            bundle_notes: fields.take_text("bundle_notes")?,
        })
    }
}

/// A Liquid snippet to inject into the live theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Announcement {
    filename: String,
    content: String,
    preview_html: String,
}

impl Announcement {
    /// Theme asset key proposed by the model.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Liquid source.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Static HTML preview.
    #[must_use]
    pub fn preview_html(&self) -> &str {
        &self.preview_html
    }
}

impl Validated for Announcement {
    const SCHEMA: Schema = Schema {
        name: "announcement",
        fields: &[
            FieldSpec::text("filename"),
            FieldSpec::text("content"),
            FieldSpec::text("preview_html"),
        ],
    };

    fn from_fields(mut fields: NormalizedFields) -> Result<Self, PipelineError> {
        Ok(Self {
            filename: fields.take_text("filename")?,
            content: fields.take_text("content")?,
            preview_html: fields.take_text("preview_html")?,
        })
    }
}
