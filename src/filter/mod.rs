//! Filter criteria, shared product predicates and ordering
//!
//! The predicates here back both the client-side fallbacks of
//! [`ProductClient`](crate::client::ProductClient) and the display-level
//! filtering, so the two paths cannot drift apart.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Availability, CatalogProduct, DisplayProduct};
use crate::transform::to_display_product;

/// Combined filter. Every present field must hold; empty fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub brands: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ram: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub storage: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<String>,
    /// Substrings that must each appear in at least one specification line
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specifications: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Canonical cache key: defined fields sorted by name, serialized, then base64 encoded
    pub fn cache_key(&self) -> String {
        let fields: BTreeMap<String, Value> = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        };
        let canonical = serde_json::to_string(&fields).unwrap_or_default();
        format!("filtered_{}", STANDARD.encode(canonical))
    }

    /// Applies the criteria to a raw catalog record
    pub fn matches_catalog(&self, product: &CatalogProduct) -> bool {
        let brand_ok = self.brands.is_empty()
            || self.brands.iter().any(|b| brand_matches(&product.title, b));

        brand_ok && self.matches_parts(&to_display_product(product), &product.specifications)
    }

    /// Applies the criteria to an already transformed product.
    /// Specification substrings are checked against its feature list.
    pub fn matches_display(&self, product: &DisplayProduct) -> bool {
        let brand_ok = self.brands.is_empty()
            || self
                .brands
                .iter()
                .any(|b| b.eq_ignore_ascii_case(&product.brand));

        brand_ok && self.matches_parts(product, &product.features)
    }

    fn matches_parts(&self, product: &DisplayProduct, specifications: &[String]) -> bool {
        let in_set = |wanted: &[String], value: &str| {
            wanted.is_empty() || wanted.iter().any(|w| w.eq_ignore_ascii_case(value))
        };

        price_in_range(product.price, self.min_price, self.max_price)
            && in_set(&self.ram, &product.specs.ram)
            && in_set(&self.storage, &product.specs.storage)
            && in_set(&self.colors, &product.specs.color)
            && in_set(&self.networks, &product.specs.network)
            && specifications_contain_all(specifications, &self.specifications)
            && self.min_rating.is_none_or(|min| product.rating >= min)
            && (self.in_stock_only != Some(true) || product.in_stock)
            && self
                .category
                .as_deref()
                .is_none_or(|c| category_matches(&product.category, c))
    }
}

/// Case-insensitive brand match against a product title.
///
/// Matches when the title starts with the brand or contains it as a
/// whitespace-delimited word.
pub fn brand_matches(title: &str, brand: &str) -> bool {
    let title = title.to_lowercase();
    let brand = brand.trim().to_lowercase();
    if brand.is_empty() {
        return false;
    }

    title.starts_with(&brand)
        || title.contains(&format!(" {brand} "))
        || title.split_whitespace().any(|word| word == brand)
}

pub fn category_matches(category: &str, wanted: &str) -> bool {
    category.to_lowercase() == wanted.to_lowercase()
}

/// Inclusive range check; a missing bound is unbounded
pub fn price_in_range(price: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.is_none_or(|m| price >= m) && max.is_none_or(|m| price <= m)
}

pub fn availability_is(product: &CatalogProduct, status: &Availability) -> bool {
    &product.availability == status
}

/// AND over requested substrings, OR over specification lines
pub fn specifications_contain_all(specifications: &[String], wanted: &[String]) -> bool {
    wanted.iter().all(|w| {
        let w = w.to_lowercase();
        specifications.iter().any(|s| s.to_lowercase().contains(&w))
    })
}

pub fn filter(products: &[DisplayProduct], criteria: &FilterCriteria) -> Vec<DisplayProduct> {
    if criteria.is_empty() {
        return products.to_vec();
    }
    products
        .iter()
        .filter(|p| criteria.matches_display(p))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    Rating,
    Newest,
    #[default]
    Relevance,
}

impl SortKey {
    pub fn parse(s: &str) -> Self {
        match s {
            "price-asc" => Self::PriceAsc,
            "price-desc" => Self::PriceDesc,
            "rating" => Self::Rating,
            "newest" => Self::Newest,
            _ => Self::Relevance,
        }
    }
}

/// Stable ordering; `Newest` and `Relevance` keep source order
pub fn sort(products: &[DisplayProduct], key: SortKey) -> Vec<DisplayProduct> {
    let mut sorted = products.to_vec();
    match key {
        SortKey::PriceAsc => sorted.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortKey::PriceDesc => sorted.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortKey::Rating => sorted.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        SortKey::Newest | SortKey::Relevance => {}
    }
    sorted
}
