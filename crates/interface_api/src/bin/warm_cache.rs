//! Cache warming job binary
//!
//! Run after nightly data loads to materialize the unfiltered dashboard
//! snapshot for the latest fact date (or an explicit date).
//!
//! # Usage
//!
//! ```bash
//! # Warm the latest fact date
//! DATABASE_URL=postgres://... cargo run --bin warm-cache
//!
//! # Warm a specific date
//! DATABASE_URL=postgres://... cargo run --bin warm-cache 2024-04-10
//! ```

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_metrics::DashboardService;
use infra_db::{create_pool_from_url, CacheWarmer, PgCacheStore, PgFactStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let date = match std::env::args().nth(1) {
        Some(raw) => Some(core_kernel::parse_date(&raw)?),
        None => None,
    };

    let database_url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("API_DATABASE_URL"))
        .unwrap_or_else(|_| "postgres://localhost/balances".to_string());
    let pool = create_pool_from_url(&database_url).await?;

    let cache = Arc::new(PgCacheStore::new(pool.clone()));
    let service = DashboardService::new(Arc::new(PgFactStore::new(pool)), cache.clone());
    let warmer = CacheWarmer::new(service, cache);

    match warmer.warm(date).await? {
        Some(summary) => {
            tracing::info!(
                as_of_date = %summary.as_of_date,
                "cache warmed: {} clients, {} funds, {} accounts, {} chart points",
                summary.clients,
                summary.funds,
                summary.accounts,
                summary.chart_points
            );
        }
        None => {
            tracing::warn!("nothing to warm: the fact store is empty");
        }
    }

    Ok(())
}
