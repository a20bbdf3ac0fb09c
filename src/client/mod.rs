//! Product data client: cached access to the catalog service with client-side fallbacks.
//!
//! Every operation checks the [`ResultCache`] first, then makes a single call to
//! the [`CatalogApi`]. When that call fails, query operations recompute their
//! answer locally from the full product set (see [`fallback`]), and the result
//! is cached either way. Only [`ProductClient::get_all_products`] and
//! [`ProductClient::get_product_by_id`] surface failures to the caller.

pub mod fallback;

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheStats, DEFAULT_TTL, ResultCache};
use crate::catalog::CatalogApi;
use crate::error::{CatalogError, Result};
use crate::filter::FilterCriteria;
use crate::models::{Availability, CatalogProduct, ProductStats};
use crate::sequence::{RequestSequencer, SearchTicket};

pub const ALL_PRODUCTS_KEY: &str = "all_products";

pub const SEARCH_TTL: Duration = Duration::from_secs(2 * 60);
pub const FILTER_TTL: Duration = Duration::from_secs(3 * 60);
pub const FILTERED_TTL: Duration = Duration::from_secs(2 * 60);
pub const TRENDING_TTL: Duration = Duration::from_secs(10 * 60);
pub const DISCOUNTED_TTL: Duration = Duration::from_secs(5 * 60);
pub const STATS_TTL: Duration = Duration::from_secs(15 * 60);

pub struct ProductClient<A> {
    api: A,
    cache: Arc<ResultCache>,
    /// Last full product set seen, used when the service is unreachable
    snapshot: Mutex<Option<Arc<Vec<CatalogProduct>>>>,
    searches: RequestSequencer,
}

impl<A: CatalogApi> ProductClient<A> {
    pub fn new(api: A, cache: Arc<ResultCache>) -> Self {
        Self {
            api,
            cache,
            snapshot: Mutex::new(None),
            searches: RequestSequencer::new(),
        }
    }

    /// Full catalog.
    ///
    /// # Errors
    /// Returns [`CatalogError::ProductsUnavailable`] when the service call fails.
    pub async fn get_all_products(&self, use_cache: bool) -> Result<Vec<CatalogProduct>> {
        if use_cache
            && let Some(products) = self.cached::<Vec<CatalogProduct>>(ALL_PRODUCTS_KEY)
        {
            self.remember(&products);
            return Ok(products);
        }

        match self.api.list_products().await {
            Ok(products) => {
                info!("Fetched {} products from catalog service", products.len());
                self.store(ALL_PRODUCTS_KEY, &products, DEFAULT_TTL);
                self.remember(&products);
                Ok(products)
            }
            Err(e) => {
                error!("Error fetching products: {}", e);
                Err(CatalogError::ProductsUnavailable {
                    source: Box::new(e),
                })
            }
        }
    }

    /// Single product, never cached.
    ///
    /// # Errors
    /// [`CatalogError::NotFound`] for an unknown id, otherwise
    /// [`CatalogError::ProductUnavailable`].
    pub async fn get_product_by_id(&self, id: i64) -> Result<CatalogProduct> {
        match self.api.get_product(id).await {
            Ok(product) => Ok(product),
            Err(e @ CatalogError::NotFound { .. }) => {
                warn!("Product {} not found", id);
                Err(e)
            }
            Err(e) => {
                error!("Error fetching product {}: {}", id, e);
                Err(CatalogError::ProductUnavailable {
                    id,
                    source: Box::new(e),
                })
            }
        }
    }

    /// Server-side search, falling back to local scored search.
    /// A blank query returns nothing without touching the network.
    pub async fn search_products(&self, query: &str) -> Result<Vec<CatalogProduct>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let key = format!("search_{}", query.to_lowercase());
        self.fetch_or_fallback("search", &key, SEARCH_TTL, self.api.search(query), |all| {
            fallback::search(all, query)
        })
        .await
    }

    /// Starts a new search generation, superseding any search still in flight
    pub fn begin_search(&self) -> SearchTicket {
        self.searches.issue()
    }

    /// Runs [`Self::search_products`] and returns `None` if a newer search
    /// was started before this one finished, whether it succeeded or not.
    pub async fn search_sequenced(
        &self,
        ticket: SearchTicket,
        query: &str,
    ) -> Result<Option<Vec<CatalogProduct>>> {
        let outcome = self.search_products(query).await;
        if !self.searches.is_latest(ticket) {
            debug!("Discarding stale search #{} for '{}'", ticket.number(), query);
            return Ok(None);
        }
        outcome.map(Some)
    }

    pub async fn get_products_by_category(&self, category: &str) -> Result<Vec<CatalogProduct>> {
        let key = format!("category_{}", category.to_lowercase());
        self.fetch_or_fallback(
            "category",
            &key,
            DEFAULT_TTL,
            self.api.by_category(category),
            |all| fallback::by_category(all, category),
        )
        .await
    }

    pub async fn get_products_by_brand(&self, brand: &str) -> Result<Vec<CatalogProduct>> {
        let key = format!("brand_{}", brand.to_lowercase());
        self.fetch_or_fallback("brand", &key, DEFAULT_TTL, self.api.by_brand(brand), |all| {
            fallback::by_brand(all, brand)
        })
        .await
    }

    pub async fn get_products_by_price_range(
        &self,
        min: f64,
        max: f64,
    ) -> Result<Vec<CatalogProduct>> {
        let key = format!("price_{min}_{max}");
        self.fetch_or_fallback(
            "price range",
            &key,
            FILTER_TTL,
            self.api.by_price_range(min, max),
            |all| fallback::by_price_range(all, min, max),
        )
        .await
    }

    pub async fn get_products_by_rating(&self, min_rating: f64) -> Result<Vec<CatalogProduct>> {
        let key = format!("rating_{min_rating}");
        self.fetch_or_fallback(
            "rating",
            &key,
            FILTER_TTL,
            self.api.by_rating(min_rating),
            |all| fallback::by_rating(all, min_rating),
        )
        .await
    }

    pub async fn get_products_by_availability(
        &self,
        status: &Availability,
    ) -> Result<Vec<CatalogProduct>> {
        let key = format!("availability_{status}");
        self.fetch_or_fallback(
            "availability",
            &key,
            FILTER_TTL,
            self.api.by_availability(status),
            |all| fallback::by_availability(all, status),
        )
        .await
    }

    /// Combined filtering; there is no server endpoint for this, so it always
    /// runs locally over the full product set.
    pub async fn get_filtered_products(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<CatalogProduct>> {
        let key = criteria.cache_key();
        if let Some(hit) = self.cached(&key) {
            return Ok(hit);
        }

        let all = self.product_set().await?;
        let filtered: Vec<CatalogProduct> = all
            .iter()
            .filter(|p| criteria.matches_catalog(p))
            .cloned()
            .collect();

        self.store(&key, &filtered, FILTERED_TTL);
        Ok(filtered)
    }

    pub async fn get_trending_products(&self, limit: usize) -> Result<Vec<CatalogProduct>> {
        let key = format!("trending_{limit}");
        self.fetch_or_fallback(
            "trending",
            &key,
            TRENDING_TTL,
            self.api.trending(limit),
            |all| fallback::trending(all, limit),
        )
        .await
    }

    pub async fn get_discounted_products(&self) -> Result<Vec<CatalogProduct>> {
        self.fetch_or_fallback(
            "discounted",
            "discounted",
            DISCOUNTED_TTL,
            self.api.discounted(),
            fallback::discounted,
        )
        .await
    }

    pub async fn get_product_stats(&self) -> Result<ProductStats> {
        self.fetch_or_fallback("stats", "stats", STATS_TTL, self.api.stats(), fallback::stats)
            .await
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Product cache cleared");
    }

    pub fn get_cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// cache → server → local fallback → cache write, strictly in that order
    async fn fetch_or_fallback<T, F>(
        &self,
        operation: &str,
        key: &str,
        ttl: Duration,
        server: F,
        local: impl FnOnce(&[CatalogProduct]) -> T,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = Result<T>>,
    {
        if let Some(hit) = self.cached(key) {
            return Ok(hit);
        }

        let value = match server.await {
            Ok(value) => value,
            Err(e) => {
                if e.is_network() {
                    warn!(
                        "Catalog {} request failed, using client-side fallback: {}",
                        operation, e
                    );
                } else {
                    error!(
                        "Catalog {} request errored, using client-side fallback: {}",
                        operation, e
                    );
                }
                let all = self.product_set().await?;
                local(all.as_slice())
            }
        };

        self.store(key, &value, ttl);
        Ok(value)
    }

    /// Full product set for local computation: cache or service first, then
    /// the last snapshot if the service is unreachable.
    async fn product_set(&self) -> Result<Arc<Vec<CatalogProduct>>> {
        match self.get_all_products(true).await {
            Ok(products) => Ok(Arc::new(products)),
            Err(e) => self.snapshot().ok_or(e),
        }
    }

    fn snapshot(&self) -> Option<Arc<Vec<CatalogProduct>>> {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn remember(&self, products: &[CatalogProduct]) {
        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(Arc::new(products.to_vec()));
    }

    fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let payload = self.cache.get(key)?;
        match serde_json::from_value(payload) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    fn store<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_value(value) {
            Ok(payload) => self.cache.set(key, payload, Some(ttl)),
            Err(e) => warn!("Could not cache {}: {}", key, e),
        }
    }
}
