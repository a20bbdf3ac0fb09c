//! Conversion of raw catalog records into display products
//!
//! Everything here is total: a record with missing rating, pricing, media or
//! specifications still produces a [`DisplayProduct`], with fixed defaults in
//! place of the missing data.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{CatalogProduct, DisplayProduct, Specs};

pub const UNKNOWN: &str = "Unknown";
pub const MODEL_PLACEHOLDER: &str = "Model";

const IMAGE_WIDTH: &str = "600";
const IMAGE_HEIGHT: &str = "600";
const IMAGE_QUALITY: &str = "80";

static RAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*gb\s*ram").expect("valid RAM regex"));
static STORAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*gb\s*rom").expect("valid storage regex"));
static PAREN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]*)\)").expect("valid parenthesis regex"));

pub fn to_display_product(product: &CatalogProduct) -> DisplayProduct {
    let (brand, model) = split_title(&product.title);
    let specs = parse_specs(&product.specifications);
    let images: Vec<String> = product.media.iter().map(|m| resolve_media_url(m)).collect();

    let description = format!(
        "{brand} {model} with {} RAM, {} storage and {} connectivity",
        specs.ram, specs.storage, specs.network
    );

    DisplayProduct {
        id: product.id,
        price: product.active_price(),
        original_price: product.original_price(),
        image: images.first().cloned(),
        images,
        rating: product.rating.average,
        review_count: product.rating.review_count,
        in_stock: product.availability.is_in_stock(),
        description,
        features: product.specifications.iter().take(4).cloned().collect(),
        category: product.category.clone(),
        url: product.url.clone(),
        product_id: product.product_id.clone(),
        specs,
        brand,
        model,
    }
}

/// Splits a title into brand (first token) and model (the rest)
pub fn split_title(title: &str) -> (String, String) {
    let mut tokens = title.split_whitespace();
    let Some(brand) = tokens.next() else {
        return (UNKNOWN.to_string(), MODEL_PLACEHOLDER.to_string());
    };

    let model = tokens.collect::<Vec<_>>().join(" ");
    if model.is_empty() {
        (brand.to_string(), MODEL_PLACEHOLDER.to_string())
    } else {
        (brand.to_string(), model)
    }
}

/// Pulls RAM, storage, network and color out of free-text specification lines.
///
/// Each field is searched independently across all lines and falls back to
/// [`UNKNOWN`]. Color is read from the first parenthesized group, which in
/// scraped listings usually holds display-size text; that is kept as-is.
pub fn parse_specs(specifications: &[String]) -> Specs {
    let capture = |re: &Regex| {
        specifications
            .iter()
            .find_map(|s| re.captures(s).map(|c| format!("{}GB", &c[1])))
            .unwrap_or_else(|| UNKNOWN.to_string())
    };

    let ram = capture(&RAM_RE);
    let storage = capture(&STORAGE_RE);

    let lowered: Vec<String> = specifications.iter().map(|s| s.to_lowercase()).collect();
    let network = if lowered.iter().any(|s| s.contains("5g")) {
        "5G"
    } else if lowered.iter().any(|s| s.contains("4g")) {
        "4G"
    } else {
        UNKNOWN
    }
    .to_string();

    let color = specifications
        .iter()
        .find_map(|s| PAREN_RE.captures(s))
        .and_then(|c| c[1].split(',').next().map(|seg| seg.trim().to_string()))
        .filter(|seg| !seg.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string());

    Specs {
        ram,
        storage,
        network,
        color,
    }
}

/// Fills the width, height and quality placeholders of a templated media URL
pub fn resolve_media_url(url: &str) -> String {
    url.replace("{@width}", IMAGE_WIDTH)
        .replace("{@height}", IMAGE_HEIGHT)
        .replace("{@quality}", IMAGE_QUALITY)
}
