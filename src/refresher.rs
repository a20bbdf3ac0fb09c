use std::sync::Arc;

use tracing::info;

use crate::cache::CacheStats;
use crate::catalog::CatalogApi;
use crate::client::ProductClient;
use crate::error::Result;

/// Periodic job body: re-reads the full catalog past the cache and reports
/// what the client is holding.
pub struct CatalogRefresher<A> {
    client: Arc<ProductClient<A>>,
}

impl<A> Clone for CatalogRefresher<A> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    pub products: usize,
    pub cache: CacheStats,
}

impl<A: CatalogApi> CatalogRefresher<A> {
    pub fn new(client: Arc<ProductClient<A>>) -> Self {
        Self { client }
    }

    pub async fn refresh(&self) -> Result<RefreshReport> {
        let products = self.client.get_all_products(false).await?;
        let stats = self.client.get_product_stats().await?;

        info!(
            "Catalog holds {} products across {} categories (avg rating {:.2})",
            products.len(),
            stats.by_category.len(),
            stats.avg_rating
        );

        let cache = self.client.get_cache_stats();
        info!(
            "Cache holds {} entries (~{} bytes)",
            cache.entries, cache.approx_bytes
        );

        Ok(RefreshReport {
            products: products.len(),
            cache,
        })
    }
}
