//! Category aggregator: products in, category index out.

use indexmap::IndexMap;
use tracing::debug;

use crate::models::{Category, Product};
use crate::slug::slugify;
use crate::taxonomy::Taxonomy;

/// Category slug → category, in taxonomy order.
pub type CategoryIndex = IndexMap<String, Category>;

/// Build the category index.
///
/// Iterates the taxonomy once; each category collects the slugs of the
/// products that name it exactly, in product order. Categories with no
/// members are left out.
pub fn build_categories(taxonomy: &Taxonomy, products: &[Product]) -> CategoryIndex {
    let mut index = CategoryIndex::new();

    for def in &taxonomy.categories {
        let slug = slugify(&def.name);
        let mut category = Category::new(def.name.clone(), slug.clone(), def.description.clone());

        for product in products.iter().filter(|p| p.in_category(&def.name)) {
            category.push(product.slug.clone());
        }

        if category.is_empty() {
            debug!(category = %def.name, "omitting empty category");
            continue;
        }
        index.insert(slug, category);
    }

    index
}
