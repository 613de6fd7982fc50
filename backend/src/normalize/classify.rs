//! Text classification heuristics.
//!
//! All matching is case-insensitive substring search over free text, and
//! the rules are order-dependent.

use std::collections::BTreeSet;

use crate::models::{Deployment, PricingModel};
use crate::parser::RawRow;
use crate::taxonomy::Taxonomy;

/// Property types searched for by name, in order.
const NAMED_PROPERTY_TYPES: &[&str] = &["Office", "Retail", "Industrial", "Multifamily", "Mixed-Use"];

/// Added when the text only says "commercial".
const COMMERCIAL_BUNDLE: &[&str] = &["Office", "Retail", "Industrial"];

const DEFAULT_PROPERTY_TYPE: &str = "Commercial";

const DEPLOYMENT_KEYWORDS: &[(Deployment, &[&str])] = &[
    (
        Deployment::Cloud,
        &["cloud", "saas", "web-based", "web based", "browser", "online"],
    ),
    (
        Deployment::OnPremise,
        &["on-premise", "on premise", "desktop", "installed"],
    ),
    (Deployment::Mobile, &["mobile", "ios", "android", "app"]),
];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Map the raw `Category` text plus flag columns to canonical categories.
///
/// Never empty; sorted by name.
pub fn map_categories(raw_categories: &str, row: &RawRow, taxonomy: &Taxonomy) -> Vec<String> {
    let mut categories = BTreeSet::new();

    for token in raw_categories.split(&[';', ','][..]) {
        let token = token.trim().to_lowercase();
        if token.is_empty() {
            continue;
        }
        if let Some(category) = taxonomy.lookup(&token) {
            categories.insert(category.to_string());
        }
    }

    // headers arrive trimmed, some configured column names do not
    for rule in &taxonomy.flags {
        if row.flag(rule.column.trim()) {
            categories.insert(rule.category.clone());
        }
    }

    if categories.is_empty() {
        categories.insert(taxonomy.fallback.clone());
    }

    categories.into_iter().collect()
}

/// Property types mentioned in a description. Never empty; sorted.
pub fn infer_property_types(description: &str) -> Vec<String> {
    let text = description.to_lowercase();
    let mut types: Vec<&str> = NAMED_PROPERTY_TYPES
        .iter()
        .copied()
        .filter(|pt| text.contains(&pt.to_lowercase()))
        .collect();

    if text.contains("residential") {
        types.push("Residential");
    }
    if text.contains("commercial") && types.is_empty() {
        types.extend_from_slice(COMMERCIAL_BUNDLE);
    }
    if types.is_empty() {
        types.push(DEFAULT_PROPERTY_TYPE);
    }

    let unique: BTreeSet<&str> = types.into_iter().collect();
    unique.into_iter().map(String::from).collect()
}

/// Deployment modes mentioned in a description. Defaults to cloud.
pub fn infer_deployment(description: &str) -> Vec<Deployment> {
    let text = description.to_lowercase();
    let mut modes: Vec<Deployment> = DEPLOYMENT_KEYWORDS
        .iter()
        .filter(|(_, keywords)| contains_any(&text, keywords))
        .map(|(mode, _)| *mode)
        .collect();

    if modes.is_empty() {
        modes.push(Deployment::Cloud);
    }
    modes
}

/// Pricing model stated in a description. First matching rule wins.
pub fn infer_pricing(description: &str) -> PricingModel {
    let text = description.to_lowercase();

    if text.contains("free") && !text.contains("trial") {
        if contains_any(&text, &["freemium", "premium"]) {
            return PricingModel::Freemium;
        }
        return PricingModel::Free;
    }
    if contains_any(&text, &["subscription", "monthly", "per month"]) {
        return PricingModel::Subscription;
    }
    // Explicit quote/contact wording and silence both land on the B2B default.
    PricingModel::QuoteBased
}
