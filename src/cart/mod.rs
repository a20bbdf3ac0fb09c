//! Shopping cart state and its durable storage

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, Sqlite, SqlitePool, migrate::MigrateDatabase};
use tracing::info;

use crate::error::{CatalogError, Result};
use crate::models::{CartLine, DisplayProduct, Variant};

/// Storage key the cart is kept under
pub const CART_KEY: &str = "cart";

/// Ordered cart lines. A product with the same id and variant as an existing
/// line increases that line's quantity instead of adding a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// # Errors
    /// Returns [`CatalogError::Validation`] for a zero quantity.
    pub fn add(&mut self, product: DisplayProduct, quantity: u32, variant: Variant) -> Result<()> {
        if quantity == 0 {
            return Err(CatalogError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.same_slot(product.id, &variant))
        {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine {
                product,
                quantity,
                variant,
            });
        }
        Ok(())
    }

    pub fn remove(&mut self, product_id: i64, variant: &Variant) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| !l.same_slot(product_id, variant));
        self.lines.len() != before
    }

    /// Sets the quantity of a line; zero removes it
    pub fn update_quantity(&mut self, product_id: i64, variant: &Variant, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product_id, variant);
        }

        match self
            .lines
            .iter_mut()
            .find(|l| l.same_slot(product_id, variant))
        {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

/// Key/value store in SQLite holding the serialized cart
#[derive(Clone)]
pub struct CartStore {
    pool: SqlitePool,
}

impl CartStore {
    pub async fn connect(db_url: &str) -> Result<Self> {
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            info!("Creating cart database at {}", db_url);
            Sqlite::create_database(db_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(db_url)
            .await?;
        Self::with_pool(pool).await
    }

    /// Wraps an existing pool and applies pending migrations
    pub async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Reads the stored cart, or an empty one if nothing was saved yet
    pub async fn load(&self) -> Result<Cart> {
        let row = sqlx::query("SELECT value FROM local_storage WHERE key = ?")
            .bind(CART_KEY)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(Cart::default());
        };

        let raw: String = row.get("value");
        serde_json::from_str(&raw).map_err(|source| CatalogError::Deserialize {
            context: format!("stored {CART_KEY}"),
            source,
        })
    }

    pub async fn save(&self, cart: &Cart) -> Result<()> {
        let raw = serde_json::to_string(cart).map_err(|source| CatalogError::Deserialize {
            context: format!("stored {CART_KEY}"),
            source,
        })?;

        sqlx::query(
            r"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
        )
        .bind(CART_KEY)
        .bind(raw)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogProduct, PriceEntry, Pricing};
    use crate::transform::to_display_product;

    fn display(id: i64, price: f64) -> DisplayProduct {
        let product = CatalogProduct {
            id,
            product_id: format!("MOB{id}"),
            title: "Apple iPhone 15".to_string(),
            url: String::new(),
            rating: Default::default(),
            pricing: Pricing {
                prices: vec![PriceEntry {
                    strike_off: false,
                    value: price,
                }],
                total_discount: 0.0,
            },
            specifications: vec![],
            media: vec![],
            category: "mobile".to_string(),
            warranty_summary: String::new(),
            availability: Default::default(),
            source: String::new(),
            time_update: None,
        };
        to_display_product(&product)
    }

    #[test]
    fn same_slot_increments_quantity() {
        let mut cart = Cart::default();
        let black = Variant::new("Black", "128GB");

        cart.add(display(1, 100.0), 1, black.clone()).unwrap();
        cart.add(display(1, 100.0), 2, black.clone()).unwrap();
        cart.add(display(1, 100.0), 1, Variant::new("Blue", "128GB")).unwrap();

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.item_count(), 4);
        assert!((cart.total() - 400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_quantity_is_rejected_or_removes() {
        let mut cart = Cart::default();
        let variant = Variant::new("Black", "64GB");
        assert!(matches!(
            cart.add(display(1, 10.0), 0, variant.clone()),
            Err(CatalogError::Validation(_))
        ));

        cart.add(display(1, 10.0), 1, variant.clone()).unwrap();
        assert!(cart.update_quantity(1, &variant, 5));
        assert_eq!(cart.item_count(), 5);
        assert!(cart.update_quantity(1, &variant, 0));
        assert!(cart.is_empty());
        assert!(!cart.remove(1, &variant));
    }

    async fn memory_store() -> CartStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        CartStore::with_pool(pool).await.expect("migrations")
    }

    #[tokio::test]
    async fn load_without_saved_cart_is_empty() {
        let store = memory_store().await;
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn saved_cart_is_restored_in_order() {
        let store = memory_store().await;
        let mut cart = Cart::default();
        cart.add(display(2, 50.0), 1, Variant::new("Red", "64GB")).unwrap();
        cart.add(display(1, 80.0), 2, Variant::new("Black", "128GB")).unwrap();

        store.save(&cart).await.unwrap();
        cart.clear();
        store.save(&cart).await.unwrap();
        assert!(store.load().await.unwrap().is_empty());

        cart.add(display(3, 20.0), 1, Variant::new("Green", "32GB")).unwrap();
        cart.add(display(1, 80.0), 1, Variant::new("Black", "128GB")).unwrap();
        store.save(&cart).await.unwrap();

        let restored = store.load().await.unwrap();
        assert_eq!(restored, cart);
        let ids: Vec<i64> = restored.lines().iter().map(|l| l.product.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
