use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("product {id} not found")]
    NotFound { id: i64 },

    #[error("Failed to fetch products. Please try again later.")]
    ProductsUnavailable {
        #[source]
        source: Box<CatalogError>,
    },

    #[error("Failed to fetch product details. Please try again later.")]
    ProductUnavailable {
        id: i64,
        #[source]
        source: Box<CatalogError>,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl CatalogError {
    /// True for failures of the remote service that a client-side fallback can absorb
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::UnexpectedStatus { .. } | Self::Deserialize { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
