//! Remote catalog service interface and its HTTP implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::models::{Availability, CatalogProduct, ProductStats};

/// Operations exposed by the remote catalog service.
///
/// Every call is a single attempt. Implementations report transport failures
/// and non-2xx statuses as network-class [`CatalogError`]s.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_products(&self) -> Result<Vec<CatalogProduct>>;

    /// # Errors
    /// Returns [`CatalogError::NotFound`] when the service has no such product.
    async fn get_product(&self, id: i64) -> Result<CatalogProduct>;

    async fn search(&self, query: &str) -> Result<Vec<CatalogProduct>>;

    async fn by_category(&self, category: &str) -> Result<Vec<CatalogProduct>>;

    async fn by_brand(&self, brand: &str) -> Result<Vec<CatalogProduct>>;

    async fn by_price_range(&self, min: f64, max: f64) -> Result<Vec<CatalogProduct>>;

    async fn by_rating(&self, min_rating: f64) -> Result<Vec<CatalogProduct>>;

    async fn by_availability(&self, status: &Availability) -> Result<Vec<CatalogProduct>>;

    async fn trending(&self, limit: usize) -> Result<Vec<CatalogProduct>>;

    async fn discounted(&self) -> Result<Vec<CatalogProduct>>;

    async fn stats(&self) -> Result<ProductStats>;
}

/// [`CatalogApi`] over the service's `/api/products` REST surface
#[derive(Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: String,
}

impl HttpCatalog {
    /// # Errors
    /// Returns [`CatalogError::Network`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/products{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path);
        debug!("GET {}", url);

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| CatalogError::Deserialize {
            context: url,
            source,
        })
    }
}

#[async_trait]
impl CatalogApi for HttpCatalog {
    async fn list_products(&self) -> Result<Vec<CatalogProduct>> {
        self.get_json("/", &[]).await
    }

    async fn get_product(&self, id: i64) -> Result<CatalogProduct> {
        let product: Option<CatalogProduct> = self
            .get_json(&format!("/{id}"), &[])
            .await
            .map_err(|e| match e {
                CatalogError::UnexpectedStatus { status, .. }
                    if status == StatusCode::NOT_FOUND.as_u16() =>
                {
                    CatalogError::NotFound { id }
                }
                other => other,
            })?;

        // The service answers an unknown id with `null` rather than a 404
        product.ok_or(CatalogError::NotFound { id })
    }

    async fn search(&self, query: &str) -> Result<Vec<CatalogProduct>> {
        self.get_json("/search", &[("q", query.to_string())]).await
    }

    async fn by_category(&self, category: &str) -> Result<Vec<CatalogProduct>> {
        let path = format!("/category/{}", urlencoding::encode(category));
        self.get_json(&path, &[]).await
    }

    async fn by_brand(&self, brand: &str) -> Result<Vec<CatalogProduct>> {
        let path = format!("/brand/{}", urlencoding::encode(brand));
        self.get_json(&path, &[]).await
    }

    async fn by_price_range(&self, min: f64, max: f64) -> Result<Vec<CatalogProduct>> {
        self.get_json(
            "/filter/price",
            &[("min_price", min.to_string()), ("max_price", max.to_string())],
        )
        .await
    }

    async fn by_rating(&self, min_rating: f64) -> Result<Vec<CatalogProduct>> {
        self.get_json("/filter/rating", &[("min_rating", min_rating.to_string())])
            .await
    }

    async fn by_availability(&self, status: &Availability) -> Result<Vec<CatalogProduct>> {
        self.get_json(
            "/filter/availability",
            &[("status", status.as_str().to_string())],
        )
        .await
    }

    async fn trending(&self, limit: usize) -> Result<Vec<CatalogProduct>> {
        self.get_json("/trending", &[("limit", limit.to_string())])
            .await
    }

    async fn discounted(&self) -> Result<Vec<CatalogProduct>> {
        self.get_json("/discounted", &[]).await
    }

    async fn stats(&self) -> Result<ProductStats> {
        self.get_json("/stats", &[]).await
    }
}
