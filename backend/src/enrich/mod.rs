//! Catalog enrichment: apply override records to an existing catalog.
//!
//! Overrides come from a JSON document:
//!
//! ```json
//! {
//!   "by_title": [ { "title": "Acme CRE", "fields": { "pros": ["Fast"] } } ],
//!   "by_slug":  [ { "slug": "acme-cre", "fields": { "description": "..." } } ]
//! }
//! ```
//!
//! Title updates only touch existing products. Slug updates update or
//! append. Fields are applied through serde, so an update that would break
//! a typed field is rejected as a whole.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{EnrichError, EnrichResult};
use crate::models::Product;

/// Update an existing product found by exact title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleUpdate {
    pub title: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Update the product with this slug, or append a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlugUpdate {
    pub slug: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// A full override document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentFile {
    #[serde(default)]
    pub by_title: Vec<TitleUpdate>,
    #[serde(default)]
    pub by_slug: Vec<SlugUpdate>,
}

impl EnrichmentFile {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_empty(&self) -> bool {
        self.by_title.is_empty() && self.by_slug.is_empty()
    }
}

/// Outcome counts of one enrichment pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrichReport {
    pub updated: usize,
    pub appended: usize,
    /// Title updates with no matching product
    pub missing: usize,
    /// Updates that would have produced an invalid product or a duplicate slug
    pub rejected: usize,
}

impl EnrichReport {
    pub fn summary(&self) -> String {
        format!(
            "Enriched: {} updated, {} appended, {} missing, {} rejected",
            self.updated, self.appended, self.missing, self.rejected
        )
    }
}

/// Read a published `products.json`.
pub fn load_products(path: &Path) -> EnrichResult<Vec<Product>> {
    read_json(path)
}

/// Read an override document.
pub fn load_enrichment(path: &Path) -> EnrichResult<EnrichmentFile> {
    read_json(path)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> EnrichResult<T> {
    let content = std::fs::read_to_string(path).map_err(|source| EnrichError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| EnrichError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply every title update, then every slug update, in document order.
pub fn apply_enrichment(products: &mut Vec<Product>, file: &EnrichmentFile) -> EnrichReport {
    let mut report = EnrichReport::default();

    for update in &file.by_title {
        apply_title_update(products, update, &mut report);
    }
    for update in &file.by_slug {
        apply_slug_update(products, update, &mut report);
    }

    info!("{}", report.summary());
    report
}

fn apply_title_update(products: &mut [Product], update: &TitleUpdate, report: &mut EnrichReport) {
    let Some(index) = products.iter().position(|p| p.title == update.title) else {
        warn!(title = %update.title, "product not found, skipping update");
        report.missing += 1;
        return;
    };

    match update_at(products, index, &update.fields) {
        Ok(()) => report.updated += 1,
        Err(e) => {
            warn!(title = %update.title, error = %e, "rejected update");
            report.rejected += 1;
        }
    }
}

fn apply_slug_update(products: &mut Vec<Product>, update: &SlugUpdate, report: &mut EnrichReport) {
    if let Some(index) = products.iter().position(|p| p.slug == update.slug) {
        match update_at(products, index, &update.fields) {
            Ok(()) => report.updated += 1,
            Err(e) => {
                warn!(slug = %update.slug, error = %e, "rejected update");
                report.rejected += 1;
            }
        }
        return;
    }

    let mut fields = update.fields.clone();
    fields.insert("slug".to_string(), Value::String(update.slug.clone()));
    match serde_json::from_value::<Product>(Value::Object(fields)) {
        Ok(product) => {
            info!(slug = %update.slug, "appending new product");
            products.push(product);
            report.appended += 1;
        }
        Err(e) => {
            warn!(slug = %update.slug, error = %e, "cannot append product");
            report.rejected += 1;
        }
    }
}

/// Apply `fields` to the product at `index`, refusing a slug another product holds.
fn update_at(products: &mut [Product], index: usize, fields: &Map<String, Value>) -> Result<(), String> {
    if let Some(slug) = fields.get("slug").and_then(Value::as_str) {
        let taken = products
            .iter()
            .enumerate()
            .any(|(i, p)| i != index && p.slug == slug);
        if taken {
            return Err(format!("slug '{slug}' already belongs to another product"));
        }
    }
    products[index].apply_fields(fields).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::sample_product;
    use serde_json::json;

    fn file(value: Value) -> EnrichmentFile {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_title_update() {
        let mut products = vec![sample_product("acme", &["Broker Tools"])];
        let report = apply_enrichment(
            &mut products,
            &file(json!({
                "by_title": [{ "title": "Product acme", "fields": { "tagline": "New.", "pros": ["Fast"] } }]
            })),
        );

        assert_eq!(report.updated, 1);
        assert_eq!(products[0].tagline, "New.");
        assert_eq!(products[0].extra["pros"], json!(["Fast"]));
    }

    #[test]
    fn test_title_miss_is_skipped() {
        let mut products = vec![sample_product("acme", &["Broker Tools"])];
        let before = products.clone();
        let report = apply_enrichment(
            &mut products,
            &file(json!({ "by_title": [{ "title": "Nope", "fields": { "tagline": "x" } }] })),
        );

        assert_eq!(report.missing, 1);
        assert_eq!(products, before);
    }

    #[test]
    fn test_slug_update_or_append() {
        let mut products = vec![sample_product("acme", &["Broker Tools"])];
        let report = apply_enrichment(
            &mut products,
            &file(json!({
                "by_slug": [
                    { "slug": "acme", "fields": { "is_verified": true } },
                    { "slug": "newco", "fields": {
                        "title": "NewCo",
                        "categories": ["Site Selection"],
                        "property_types": ["Office"],
                        "deployment": ["Cloud"]
                    } }
                ]
            })),
        );

        assert_eq!(report, EnrichReport { updated: 1, appended: 1, missing: 0, rejected: 0 });
        assert!(products[0].is_verified);
        assert_eq!(products[1].slug, "newco");
        assert_eq!(products[1].title, "NewCo");
        assert_eq!(products[1].url, "");
    }

    #[test]
    fn test_append_without_title_rejected() {
        let mut products = Vec::new();
        let report = apply_enrichment(
            &mut products,
            &file(json!({ "by_slug": [{ "slug": "ghost", "fields": { "tagline": "Boo." } }] })),
        );

        assert_eq!(report.rejected, 1);
        assert!(products.is_empty());
    }

    #[test]
    fn test_bad_field_type_rejected() {
        let mut products = vec![sample_product("acme", &["Broker Tools"])];
        let before = products.clone();
        let report = apply_enrichment(
            &mut products,
            &file(json!({ "by_slug": [{ "slug": "acme", "fields": { "deployment": ["Mainframe"] } }] })),
        );

        assert_eq!(report.rejected, 1);
        assert_eq!(products, before);
    }

    #[test]
    fn test_slug_collision_rejected() {
        let mut products = vec![
            sample_product("acme", &["Broker Tools"]),
            sample_product("beta", &["Broker Tools"]),
        ];
        let before = products.clone();
        let report = apply_enrichment(
            &mut products,
            &file(json!({
                "by_title": [{ "title": "Product beta", "fields": { "slug": "acme" } }],
                "by_slug": [{ "slug": "acme", "fields": { "slug": "beta", "tagline": "x" } }]
            })),
        );

        assert_eq!(report.rejected, 2);
        assert_eq!(report.updated, 0);
        assert_eq!(products, before);
    }

    #[test]
    fn test_slug_rename_to_free_slug() {
        let mut products = vec![
            sample_product("acme", &["Broker Tools"]),
            sample_product("beta", &["Broker Tools"]),
        ];
        let report = apply_enrichment(
            &mut products,
            &file(json!({
                "by_slug": [
                    { "slug": "beta", "fields": { "slug": "beta" } },
                    { "slug": "beta", "fields": { "slug": "beta-cre" } }
                ]
            })),
        );

        assert_eq!(report.updated, 2);
        assert_eq!(report.rejected, 0);
        assert_eq!(products[1].slug, "beta-cre");
    }

    #[test]
    fn test_missing_sections_default() {
        let parsed = EnrichmentFile::from_json("{}").unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_load_errors_carry_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overrides.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_enrichment(&path).unwrap_err();
        assert!(matches!(err, EnrichError::Json { .. }));
        assert!(err.to_string().contains("overrides.json"));

        let missing = load_products(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, EnrichError::Io { .. }));
    }
}
