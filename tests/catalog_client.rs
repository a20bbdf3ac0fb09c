//! Integration tests for `ProductClient` over `HttpCatalog`.
//!
//! Each test stands up a `wiremock` server in place of the catalog service, so
//! both the server-backed paths and the client-side fallbacks are exercised
//! over real HTTP.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use product_catalog::models::Availability;
use product_catalog::{CatalogError, CatalogRefresher, HttpCatalog, ProductClient, ResultCache};

fn test_client(server: &MockServer) -> ProductClient<HttpCatalog> {
    let catalog = HttpCatalog::new(&server.uri(), Duration::from_secs(5), "catalog-test/0.1")
        .expect("failed to build test HttpCatalog");
    ProductClient::new(catalog, Arc::new(ResultCache::default()))
}

fn product_json(id: i64, title: &str, prices: Value, rating: Value) -> Value {
    json!({
        "id": id,
        "product_id": format!("MOB{id}"),
        "title": title,
        "url": format!("https://www.flipkart.com/p/{id}"),
        "rating": rating,
        "pricing": {"prices": prices, "totalDiscount": 0},
        "specifications": ["4 GB RAM | 64 GB ROM", "16.51 cm (6.5 inch) HD+ Display"],
        "media": ["https://rukminim2.flixcart.com/image/{@width}/{@height}/x.jpeg?q={@quality}"],
        "category": "mobile",
        "warrantySummary": "1 Year Warranty",
        "availability": "IN_STOCK",
        "source": "flipkart",
        "time_update": "2025-08-29T10:15:00"
    })
}

fn catalog_json() -> Value {
    json!([
        product_json(
            1,
            "Samsung Galaxy A14",
            json!([{"strikeOff": true, "value": 1000}, {"strikeOff": false, "value": 700}]),
            json!({"average": 4.5, "count": 600, "reviewCount": 500}),
        ),
        product_json(
            2,
            "Apple iPhone 14",
            json!([{"strikeOff": false, "value": 60000}]),
            json!({"average": 4.0, "count": 9000, "reviewCount": 2000}),
        ),
    ])
}

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_json()))
        .mount(server)
        .await;
}

fn ids(products: &[product_catalog::CatalogProduct]) -> Vec<i64> {
    products.iter().map(|p| p.id).collect()
}

#[tokio::test]
async fn get_all_products_is_served_from_cache_within_ttl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let first = client.get_all_products(true).await.unwrap();
    let second = client.get_all_products(true).await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn get_all_products_reports_unavailable_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = test_client(&server).get_all_products(true).await.unwrap_err();
    assert!(matches!(err, CatalogError::ProductsUnavailable { .. }));
    assert_eq!(
        err.to_string(),
        "Failed to fetch products. Please try again later."
    );
}

#[tokio::test]
async fn get_product_by_id_maps_404_and_null_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/7"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/products/8"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert!(matches!(
        client.get_product_by_id(7).await,
        Err(CatalogError::NotFound { id: 7 })
    ));
    assert!(matches!(
        client.get_product_by_id(8).await,
        Err(CatalogError::NotFound { id: 8 })
    ));
}

#[tokio::test]
async fn search_uses_server_results_when_available() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/search"))
        .and(query_param("q", "iPhone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([catalog_json()[1]])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let found = client.search_products("  iPhone ").await.unwrap();
    assert_eq!(ids(&found), vec![2]);

    // Cached under the lower-cased query
    client.search_products("iphone").await.unwrap();
}

#[tokio::test]
async fn price_filter_falls_back_to_active_price() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/products/filter/price"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let in_range = client.get_products_by_price_range(500.0, 800.0).await.unwrap();
    assert_eq!(ids(&in_range), vec![1]);

    let above = client.get_products_by_price_range(800.0, 1000.0).await.unwrap();
    assert!(above.is_empty());
}

#[tokio::test]
async fn trending_falls_back_to_weighted_score() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/products/trending"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let trending = test_client(&server).get_trending_products(2).await.unwrap();
    assert_eq!(ids(&trending), vec![2, 1]);
}

#[tokio::test]
async fn availability_and_brand_queries_hit_their_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/filter/availability"))
        .and(query_param("status", "IN_STOCK"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/products/brand/Apple"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([catalog_json()[1]])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let in_stock = client
        .get_products_by_availability(&Availability::InStock)
        .await
        .unwrap();
    assert_eq!(in_stock.len(), 2);

    let apple = client.get_products_by_brand("Apple").await.unwrap();
    assert_eq!(ids(&apple), vec![2]);
}

#[tokio::test]
async fn stats_fall_back_to_local_aggregation() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/products/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let stats = test_client(&server).get_product_stats().await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.by_category.get("mobile"), Some(&2));
    assert!((stats.avg_rating - 4.25).abs() < 1e-9);
}

#[tokio::test]
async fn refresher_bypasses_cache_and_reports() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_json()))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/products/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "byCategory": {"mobile": 2},
            "byAvailability": {"IN_STOCK": 2},
            "avgRating": 4.25
        })))
        .mount(&server)
        .await;

    let refresher = CatalogRefresher::new(Arc::new(test_client(&server)));
    refresher.refresh().await.unwrap();
    let report = refresher.refresh().await.unwrap();

    assert_eq!(report.products, 2);
    // all_products and stats
    assert_eq!(report.cache.entries, 2);
}
