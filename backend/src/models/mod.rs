//! Domain models for the directory catalog.
//!
//! - [`Product`] - one normalized software listing (`products.json` entry)
//! - [`Category`] - one category index entry (`categories.json` value)
//! - [`Deployment`] / [`PricingModel`] - closed classifications inferred from text

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// =============================================================================
// Deployment
// =============================================================================

/// Where a product runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Deployment {
    Cloud,
    #[serde(rename = "On-Premise")]
    OnPremise,
    Mobile,
}

impl Deployment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cloud => "Cloud",
            Self::OnPremise => "On-Premise",
            Self::Mobile => "Mobile",
        }
    }
}

impl fmt::Display for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Pricing Model
// =============================================================================

/// Go-to-market pricing classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PricingModel {
    Free,
    Freemium,
    Subscription,
    /// B2B default when nothing else is stated.
    #[default]
    #[serde(rename = "Quote-based")]
    QuoteBased,
}

impl PricingModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Freemium => "Freemium",
            Self::Subscription => "Subscription",
            Self::QuoteBased => "Quote-based",
        }
    }
}

impl fmt::Display for PricingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A normalized catalog entry.
///
/// Field order is the serialized key order. `extra` holds fields attached by
/// enrichment (feature groups, pricing detail, ...) and is empty for products
/// straight out of the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub description: String,
    pub categories: Vec<String>,
    pub property_types: Vec<String>,
    pub deployment: Vec<Deployment>,
    #[serde(default)]
    pub pricing_model: PricingModel,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub is_top_rated: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub seo_headline: String,
    #[serde(default)]
    pub seo_description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Whether the product is listed under `category`.
    pub fn in_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Overwrite fields from a JSON object, going through serde so typed
    /// fields keep their invariants. On failure `self` is left untouched.
    pub fn apply_fields(&mut self, fields: &Map<String, Value>) -> Result<(), serde_json::Error> {
        let mut value = serde_json::to_value(&*self)?;
        if let Value::Object(ref mut obj) = value {
            for (key, field) in fields {
                obj.insert(key.clone(), field.clone());
            }
        }
        *self = serde_json::from_value(value)?;
        Ok(())
    }
}

// =============================================================================
// Category
// =============================================================================

/// A category index entry. Holds member slugs only, never products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub product_count: usize,
    pub products: Vec<String>,
}

impl Category {
    pub fn new(name: impl Into<String>, slug: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            description: description.into(),
            product_count: 0,
            products: Vec::new(),
        }
    }

    /// Append a member slug, keeping the count in step.
    pub fn push(&mut self, product_slug: impl Into<String>) {
        self.products.push(product_slug.into());
        self.product_count = self.products.len();
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn sample_product(slug: &str, categories: &[&str]) -> Product {
        Product {
            title: format!("Product {slug}"),
            slug: slug.to_string(),
            url: format!("https://{slug}.com"),
            domain: format!("{slug}.com"),
            tagline: "A tagline.".to_string(),
            description: "A description.".to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            property_types: vec!["Commercial".to_string()],
            deployment: vec![Deployment::Cloud],
            pricing_model: PricingModel::QuoteBased,
            logo_url: format!("https://logo.clearbit.com/{slug}.com"),
            is_free: false,
            is_top_rated: false,
            is_verified: false,
            seo_headline: String::new(),
            seo_description: String::new(),
            extra: Map::new(),
        }
    }

    #[test]
    fn test_serialized_key_order() {
        let product = sample_product("acme", &["Broker Tools"]);
        let value = serde_json::to_value(&product).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        // Value map ordering depends on serde_json features, so only count keys here.
        assert_eq!(keys.len(), 16);
        let json = serde_json::to_string(&product).unwrap();
        assert!(json.starts_with(r#"{"title":"Product acme","slug":"acme","url""#));
        assert!(json.contains(r#""deployment":["Cloud"],"pricing_model":"Quote-based""#));
    }

    #[test]
    fn test_enum_spellings() {
        assert_eq!(serde_json::to_value(Deployment::OnPremise).unwrap(), json!("On-Premise"));
        assert_eq!(serde_json::to_value(PricingModel::QuoteBased).unwrap(), json!("Quote-based"));
        assert_eq!(PricingModel::Freemium.to_string(), "Freemium");
    }

    #[test]
    fn test_apply_fields_sets_known_and_extra() {
        let mut product = sample_product("acme", &["Broker Tools"]);
        let fields = json!({
            "description": "Long form copy.",
            "pros": ["Fast"]
        });
        product.apply_fields(fields.as_object().unwrap()).unwrap();

        assert_eq!(product.description, "Long form copy.");
        assert_eq!(product.extra["pros"], json!(["Fast"]));
    }

    #[test]
    fn test_apply_fields_rejects_bad_type_without_change() {
        let mut product = sample_product("acme", &["Broker Tools"]);
        let before = product.clone();
        let fields = json!({ "categories": "Broker Tools" });

        assert!(product.apply_fields(fields.as_object().unwrap()).is_err());
        assert_eq!(product, before);
    }

    #[test]
    fn test_category_push_tracks_count() {
        let mut category = Category::new("Broker Tools", "broker-tools", "desc");
        assert!(category.is_empty());
        category.push("acme");
        category.push("beta");
        assert_eq!(category.product_count, 2);
        assert_eq!(category.products, vec!["acme", "beta"]);
    }
}
