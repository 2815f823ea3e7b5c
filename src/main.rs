//! Faculty Directory Portal — client data layer
//!
//! Reconciles the remote directory store, the local cache snapshot, and the
//! bundled seed dataset into one session aggregate. The binary is a sync
//! check: it opens a session and reports what was loaded and from where.

mod cache;
mod config;
mod errors;
mod models;
mod reconcile;
mod remote;
mod seed;
mod session;
mod view;

use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cache::CacheStore;
use config::Config;
use models::Connectivity;
use remote::RemoteClient;
use session::Session;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting faculty directory sync check");
    tracing::info!("Remote store: {}", config.api_base_url);
    tracing::info!("Cache path: {:?}", config.cache_path);

    if config.api_token.is_none() {
        tracing::warn!("No API token configured (FACDIR_API_TOKEN). Writes may be rejected.");
    }

    // Initialize the cache store
    let pool = cache::init_cache(&config.cache_path).await?;
    let cache = CacheStore::new(pool);

    // Build the remote client
    let remote = RemoteClient::new(
        config.api_base_url.clone(),
        config.api_token.as_deref(),
        config.retry_attempts,
        Duration::from_millis(config.retry_backoff_ms),
    )?;

    // Open a session (reconciled load: remote -> cache -> seed)
    let mut session = Session::open(remote, cache).await;

    match session.connectivity() {
        Connectivity::Connected => tracing::info!("Remote store reachable"),
        Connectivity::Offline => tracing::warn!("Remote store unreachable, using fallback data"),
        Connectivity::Connecting => {}
    }

    let data = session.data();
    tracing::info!(
        departments = data.departments.len(),
        branches = data.branches.len(),
        professors = data.professors.len(),
        news = data.news.len(),
        "Directory loaded"
    );

    for department in data.departments.values() {
        tracing::info!(
            department = %department.name,
            branches = data.branches_of(department).len(),
            professors = data.professors_in_department(&department.id).len(),
            "Department summary"
        );
    }

    for notice in session.take_notices() {
        tracing::warn!("Notice: {}", notice.message);
    }

    session.close().await;

    Ok(())
}

#[cfg(test)]
mod tests;
