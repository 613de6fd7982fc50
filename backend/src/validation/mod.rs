//! JSON Schema validation for the published documents.
//!
//! # Embedded Schemas
//!
//! Schemas are embedded at compile time from the `schemas/` directory:
//! - `product.json` - one `products.json` entry
//! - `category.json` - one `categories.json` value
//!
//! Category membership against the active taxonomy is not expressible in
//! the schema (the taxonomy is loadable), so [`validate_catalog`] checks it
//! separately.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use cre_directory::validation::is_valid_category;
//!
//! let category = json!({
//!     "name": "Broker Tools",
//!     "slug": "broker-tools",
//!     "description": "Software for brokers.",
//!     "product_count": 1,
//!     "products": ["acme-cre"]
//! });
//! assert!(is_valid_category(&category));
//! ```

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;

use crate::aggregate::CategoryIndex;
use crate::models::Product;
use crate::taxonomy::Taxonomy;

static PRODUCT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/product.json")).expect("Invalid embedded schema")
});

static CATEGORY_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/category.json")).expect("Invalid embedded schema")
});

/// Validate a JSON value against a draft 7 schema.
///
/// Returns every violation, not just the first.
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema).map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate one `products.json` entry.
pub fn validate_product(data: &Value) -> Result<(), Vec<String>> {
    validate(&PRODUCT_SCHEMA, data)
}

pub fn is_valid_product(data: &Value) -> bool {
    is_valid(&PRODUCT_SCHEMA, data)
}

/// Validate one `categories.json` value.
pub fn validate_category(data: &Value) -> Result<(), Vec<String>> {
    validate(&CATEGORY_SCHEMA, data)
}

pub fn is_valid_category(data: &Value) -> bool {
    is_valid(&CATEGORY_SCHEMA, data)
}

/// A catalog record that failed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidRecord {
    /// Position in the catalog
    pub index: usize,
    /// Slug, or empty when the record has none
    pub slug: String,
    pub errors: Vec<String>,
}

/// Check raw catalog entries (e.g. a loaded `products.json`) against the
/// product schema.
pub fn validate_values(records: &[Value]) -> Vec<InvalidRecord> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            validate_product(record).err().map(|errors| InvalidRecord {
                index,
                slug: record.get("slug").and_then(Value::as_str).unwrap_or_default().to_string(),
                errors,
            })
        })
        .collect()
}

/// Check typed products against the schema and the taxonomy.
pub fn validate_catalog(products: &[Product], taxonomy: &Taxonomy) -> Vec<InvalidRecord> {
    products
        .iter()
        .enumerate()
        .filter_map(|(index, product)| {
            let mut errors = match serde_json::to_value(product) {
                Ok(value) => validate_product(&value).err().unwrap_or_default(),
                Err(e) => vec![e.to_string()],
            };
            errors.extend(
                product
                    .categories
                    .iter()
                    .filter(|c| !taxonomy.is_canonical(c))
                    .map(|c| format!("'{c}' is not a canonical category")),
            );

            if errors.is_empty() {
                None
            } else {
                Some(InvalidRecord {
                    index,
                    slug: product.slug.clone(),
                    errors,
                })
            }
        })
        .collect()
}

/// Check an aggregated category index against the category schema.
///
/// `index` is the position in the index and `slug` the index key.
pub fn validate_categories(index: &CategoryIndex) -> Vec<InvalidRecord> {
    index
        .iter()
        .enumerate()
        .filter_map(|(position, (slug, category))| {
            let result = match serde_json::to_value(category) {
                Ok(value) => validate_category(&value),
                Err(e) => Err(vec![e.to_string()]),
            };
            result.err().map(|errors| InvalidRecord {
                index: position,
                slug: slug.clone(),
                errors,
            })
        })
        .collect()
}
