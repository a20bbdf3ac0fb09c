//! Cached catalog client for scraped product listings.
//!
//! [`client::ProductClient`] fronts the remote catalog service with a
//! [`cache::ResultCache`] and falls back to client-side filtering, search and
//! ranking when the service is unreachable. [`transform`] and [`filter`] turn
//! raw records into display products and narrow or order them.

pub mod cache;
pub mod cart;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod refresher;
pub mod sequence;
pub mod transform;

pub use cache::{CacheStats, ResultCache, SweepHandle};
pub use cart::{Cart, CartStore};
pub use catalog::{CatalogApi, HttpCatalog};
pub use client::ProductClient;
pub use error::CatalogError;
pub use filter::{FilterCriteria, SortKey};
pub use models::{CatalogProduct, DisplayProduct};
pub use refresher::CatalogRefresher;
