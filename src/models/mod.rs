//! Data models for catalog records, display products, statistics and cart lines

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A product record as returned by the remote catalog service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: Rating,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pricing: Pricing,
    #[serde(default, deserialize_with = "null_as_default")]
    pub specifications: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub media: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(
        rename = "warrantySummary",
        default,
        deserialize_with = "null_as_default"
    )]
    pub warranty_summary: String,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(default)]
    pub time_update: Option<NaiveDateTime>,
}

impl CatalogProduct {
    /// First price entry not marked as struck through, or zero
    pub fn active_price(&self) -> f64 {
        self.pricing
            .prices
            .iter()
            .find(|p| !p.strike_off)
            .map_or(0.0, |p| p.value)
    }

    /// First price entry marked as struck through
    pub fn original_price(&self) -> Option<f64> {
        self.pricing
            .prices
            .iter()
            .find(|p| p.strike_off)
            .map(|p| p.value)
    }

    pub fn has_strike_through(&self) -> bool {
        self.pricing.prices.iter().any(|p| p.strike_off)
    }
}

/// Aggregated rating block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(default, deserialize_with = "null_as_default")]
    pub average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u64,
    #[serde(
        rename = "reviewCount",
        default,
        deserialize_with = "null_as_default"
    )]
    pub review_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub breakup: Vec<u64>,
}

/// Pricing block with ordered price entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    #[serde(default, deserialize_with = "null_as_default")]
    pub prices: Vec<PriceEntry>,
    #[serde(
        rename = "totalDiscount",
        default,
        deserialize_with = "null_as_default"
    )]
    pub total_discount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    #[serde(rename = "strikeOff", default, deserialize_with = "null_as_default")]
    pub strike_off: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: f64,
}

/// Stock state of a listing. Unknown wire values are preserved verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Availability {
    InStock,
    OutOfStock,
    ComingSoon,
    #[default]
    Unknown,
    Other(String),
}

impl Availability {
    pub fn as_str(&self) -> &str {
        match self {
            Self::InStock => "IN_STOCK",
            Self::OutOfStock => "OUT_OF_STOCK",
            Self::ComingSoon => "COMING_SOON",
            Self::Unknown => "UNKNOWN",
            Self::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "IN_STOCK" => Self::InStock,
            "OUT_OF_STOCK" => Self::OutOfStock,
            "COMING_SOON" => Self::ComingSoon,
            "" | "UNKNOWN" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_in_stock(&self) -> bool {
        matches!(self, Self::InStock)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Availability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Availability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map_or_else(Self::default, |s| Self::parse(&s)))
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Structured fields parsed out of free-text specification strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specs {
    pub ram: String,
    pub storage: String,
    pub network: String,
    pub color: String,
}

/// Display-oriented product derived from a [`CatalogProduct`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayProduct {
    pub id: i64,
    pub brand: String,
    pub model: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub specs: Specs,
    pub rating: f64,
    pub review_count: u64,
    pub in_stock: bool,
    pub description: String,
    pub features: Vec<String>,
    pub category: String,
    pub url: String,
    pub product_id: String,
}

impl DisplayProduct {
    /// Whole-number discount relative to the original price, if any
    pub fn discount_percent(&self) -> Option<u32> {
        let original = self.original_price?;
        if original <= 0.0 || self.price >= original {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = ((original - self.price) / original * 100.0).round() as u32;
        Some(percent)
    }
}

/// Aggregate statistics over the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductStats {
    pub total: usize,
    #[serde(rename = "byCategory", default)]
    pub by_category: BTreeMap<String, usize>,
    #[serde(rename = "byAvailability", default)]
    pub by_availability: BTreeMap<String, usize>,
    #[serde(rename = "avgRating", default)]
    pub avg_rating: f64,
}

/// Color/storage pair selected when adding to the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub color: String,
    pub storage: String,
}

impl Variant {
    pub fn new(color: impl Into<String>, storage: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            storage: storage.into(),
        }
    }
}

/// A line in the shopping cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: DisplayProduct,
    pub quantity: u32,
    pub variant: Variant,
}

impl CartLine {
    pub fn same_slot(&self, product_id: i64, variant: &Variant) -> bool {
        self.product.id == product_id && &self.variant == variant
    }

    pub fn line_total(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_wire_shape() {
        let raw = json!({
            "id": 7,
            "product_id": "MOBGX",
            "title": "Samsung Galaxy A14",
            "url": "https://example.com/p/7",
            "rating": {"average": 4.2, "count": 120, "reviewCount": 15, "breakup": [1, 2, 3, 4, 5]},
            "pricing": {"prices": [{"strikeOff": true, "value": 1000.0}, {"strikeOff": false, "value": 700.0}], "totalDiscount": 30},
            "specifications": ["4 GB RAM | 64 GB ROM"],
            "media": [],
            "category": "mobile",
            "warrantySummary": "1 year",
            "availability": "OUT_OF_STOCK",
            "source": "flipkart",
            "time_update": "2025-08-29T10:15:00"
        });

        let product: CatalogProduct = serde_json::from_value(raw).unwrap();
        assert_eq!(product.rating.review_count, 15);
        assert_eq!(product.availability, Availability::OutOfStock);
        assert!((product.active_price() - 700.0).abs() < f64::EPSILON);
        assert_eq!(product.original_price(), Some(1000.0));
        assert!(product.time_update.is_some());
    }

    #[test]
    fn tolerates_missing_and_null_fields() {
        let raw = json!({"id": 1, "title": "Nokia", "rating": null, "specifications": null, "availability": null});
        let product: CatalogProduct = serde_json::from_value(raw).unwrap();
        assert_eq!(product.rating, Rating::default());
        assert!(product.specifications.is_empty());
        assert_eq!(product.availability, Availability::Unknown);
        assert!(product.active_price().abs() < f64::EPSILON);

        let raw = json!({
            "id": 2,
            "rating": {"average": null, "count": null, "reviewCount": null, "breakup": null},
            "pricing": {"prices": [{"strikeOff": null, "value": 499}], "totalDiscount": null}
        });
        let product: CatalogProduct = serde_json::from_value(raw).unwrap();
        assert_eq!(product.rating, Rating::default());
        assert!(product.pricing.total_discount.abs() < f64::EPSILON);
        assert!(!product.has_strike_through());
        assert!((product.active_price() - 499.0).abs() < f64::EPSILON);
    }

    #[test]
    fn one_null_rating_does_not_fail_the_catalog() {
        let raw = json!([
            {"id": 1, "rating": {"average": null, "count": 0}},
            {"id": 2, "rating": {"average": 4.1, "count": 10}}
        ]);
        let products: Vec<CatalogProduct> = serde_json::from_value(raw).unwrap();
        assert_eq!(products.len(), 2);
        assert!((products[1].rating.average - 4.1).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_availability_round_trips() {
        let a: Availability = serde_json::from_value(json!("PREORDER")).unwrap();
        assert_eq!(a, Availability::Other("PREORDER".to_string()));
        assert_eq!(serde_json::to_value(&a).unwrap(), json!("PREORDER"));
    }
}
