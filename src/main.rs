use std::sync::Arc;

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use product_catalog::config::Config;
use product_catalog::{CartStore, CatalogRefresher, HttpCatalog, ProductClient, ResultCache};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("Starting product catalog client against {}", config.api_base_url);

    let cart = CartStore::connect(&config.cart_db_url).await?.load().await?;
    info!("Restored cart with {} items", cart.item_count());

    let catalog = HttpCatalog::new(
        &config.api_base_url,
        config.request_timeout,
        &config.user_agent,
    )?;
    let cache = Arc::new(ResultCache::default());
    let sweeper = cache.start_sweeper(config.cache_sweep_interval);

    let client = Arc::new(ProductClient::new(catalog, cache));
    let refresher = CatalogRefresher::new(client);

    // Warm the cache once before scheduling
    if let Err(e) = refresher.refresh().await {
        error!("Error during initial refresh: {}", e);
    }

    let mut sched = JobScheduler::new().await?;

    let job_refresher = refresher.clone();
    sched
        .add(Job::new_async(config.refresh_cron.as_str(), move |_uuid, _l| {
            let refresher = job_refresher.clone();
            Box::pin(async move {
                if let Err(e) = refresher.refresh().await {
                    error!("Error refreshing catalog: {}", e);
                }
            })
        })?)
        .await?;

    info!("Scheduler started with schedule '{}'", config.refresh_cron);
    sched.start().await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    sweeper.stop();
    sched.shutdown().await?;

    Ok(())
}
