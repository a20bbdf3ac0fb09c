//! Client-side equivalents of the catalog service's query endpoints.
//!
//! Used when a server call fails. All functions are pure over the product set
//! they are given and keep input order for ties.

use crate::filter::{availability_is, brand_matches, category_matches, price_in_range};
use crate::models::{Availability, CatalogProduct, ProductStats};

const TITLE_HIT: u32 = 10;
const CATEGORY_HIT: u32 = 8;
const SPEC_HIT: u32 = 5;
const TEXT_HIT: u32 = 3;
const WORD_PREFIX_HIT: u32 = 2;

/// Relevance score of `product` for the whitespace-separated `query`
pub fn search_score(product: &CatalogProduct, query: &str) -> u32 {
    let title = product.title.to_lowercase();
    let category = product.category.to_lowercase();
    let specs: Vec<String> = product
        .specifications
        .iter()
        .map(|s| s.to_lowercase())
        .collect();
    let text = format!("{title} {category} {}", specs.join(" "));

    query
        .to_lowercase()
        .split_whitespace()
        .map(|token| {
            let mut score = 0;
            if title.contains(token) {
                score += TITLE_HIT;
            }
            if category.contains(token) {
                score += CATEGORY_HIT;
            }
            score += SPEC_HIT * specs.iter().filter(|s| s.contains(token)).count() as u32;
            if text.contains(token) {
                score += TEXT_HIT;
            }
            if text.split_whitespace().any(|word| word.starts_with(token)) {
                score += WORD_PREFIX_HIT;
            }
            score
        })
        .sum()
}

pub fn search(products: &[CatalogProduct], query: &str) -> Vec<CatalogProduct> {
    let mut scored: Vec<(u32, &CatalogProduct)> = products
        .iter()
        .map(|p| (search_score(p, query), p))
        .filter(|(score, _)| *score > 0)
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, p)| p.clone()).collect()
}

pub fn by_category(products: &[CatalogProduct], category: &str) -> Vec<CatalogProduct> {
    keep(products, |p| category_matches(&p.category, category))
}

pub fn by_brand(products: &[CatalogProduct], brand: &str) -> Vec<CatalogProduct> {
    keep(products, |p| brand_matches(&p.title, brand))
}

pub fn by_price_range(products: &[CatalogProduct], min: f64, max: f64) -> Vec<CatalogProduct> {
    keep(products, |p| price_in_range(p.active_price(), Some(min), Some(max)))
}

pub fn by_rating(products: &[CatalogProduct], min_rating: f64) -> Vec<CatalogProduct> {
    keep(products, |p| p.rating.average >= min_rating)
}

pub fn by_availability(products: &[CatalogProduct], status: &Availability) -> Vec<CatalogProduct> {
    keep(products, |p| availability_is(p, status))
}

/// `average * 0.7 + min(reviews / 1000, 1) * 0.3 * 5`
pub fn trending_score(product: &CatalogProduct) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let reviews = (product.rating.review_count as f64 / 1000.0).min(1.0);
    product.rating.average * 0.7 + reviews * 0.3 * 5.0
}

pub fn trending(products: &[CatalogProduct], limit: usize) -> Vec<CatalogProduct> {
    let mut rated: Vec<(f64, &CatalogProduct)> = products
        .iter()
        .filter(|p| p.rating.average > 0.0)
        .map(|p| (trending_score(p), p))
        .collect();

    rated.sort_by(|a, b| b.0.total_cmp(&a.0));
    rated
        .into_iter()
        .take(limit)
        .map(|(_, p)| p.clone())
        .collect()
}

pub fn discounted(products: &[CatalogProduct]) -> Vec<CatalogProduct> {
    let mut out = keep(products, |p| {
        p.pricing.total_discount > 0.0 && p.has_strike_through()
    });
    out.sort_by(|a, b| b.pricing.total_discount.total_cmp(&a.pricing.total_discount));
    out
}

/// Counts per category and availability, plus the mean rating average over
/// every product, unrated ones included
pub fn stats(products: &[CatalogProduct]) -> ProductStats {
    let mut stats = ProductStats {
        total: products.len(),
        ..ProductStats::default()
    };

    for product in products {
        *stats
            .by_category
            .entry(product.category.clone())
            .or_insert(0) += 1;
        *stats
            .by_availability
            .entry(product.availability.to_string())
            .or_insert(0) += 1;
    }

    if !products.is_empty() {
        #[allow(clippy::cast_precision_loss)]
        let count = products.len() as f64;
        stats.avg_rating = products.iter().map(|p| p.rating.average).sum::<f64>() / count;
    }

    stats
}

fn keep(
    products: &[CatalogProduct],
    pred: impl Fn(&CatalogProduct) -> bool,
) -> Vec<CatalogProduct> {
    products.iter().filter(|p| pred(p)).cloned().collect()
}
