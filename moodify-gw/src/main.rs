//! moodify-gw (Aggregation Gateway) - hydrated library views over the four
//! Moodify stores
//!
//! Resolves a user's library from the Library Store, hydrates it against
//! the Catalog and Collection Stores, and exposes the result plus the
//! multi-step mutations over HTTP. Holds no state of its own.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use moodify_agg::stores::{
    HttpCatalogStore, HttpCollectionStore, HttpIdentityStore, HttpLibraryStore,
};
use moodify_agg::Aggregator;
use moodify_common::config::{ConfigOverrides, GatewayConfig};
use moodify_gw::{build_router, AppState};

/// Moodify aggregation gateway
#[derive(Debug, Parser)]
#[command(name = "moodify-gw", version)]
struct Args {
    /// Catalog Store base URL
    #[arg(long)]
    catalog_url: Option<String>,

    /// Library Store base URL
    #[arg(long)]
    library_url: Option<String>,

    /// Collection Store base URL
    #[arg(long)]
    collection_url: Option<String>,

    /// Identity Store base URL
    #[arg(long)]
    identity_url: Option<String>,

    /// Address to bind the gateway to
    #[arg(long)]
    bind_addr: Option<String>,

    /// HTTP timeout for store calls, in seconds
    #[arg(long)]
    http_timeout_secs: Option<u64>,

    /// Concurrency cap for the playlist hydration fan-out
    #[arg(long)]
    hydration_concurrency: Option<usize>,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        ConfigOverrides {
            catalog_url: args.catalog_url,
            library_url: args.library_url,
            collection_url: args.collection_url,
            identity_url: args.identity_url,
            bind_addr: args.bind_addr,
            http_timeout_secs: args.http_timeout_secs,
            hydration_concurrency: args.hydration_concurrency,
            service_token: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting Moodify Aggregation Gateway (moodify-gw) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();
    let config = GatewayConfig::resolve(args.into());
    info!(
        catalog = %config.catalog_url,
        library = %config.library_url,
        collection = %config.collection_url,
        identity = %config.identity_url,
        "Resolved store endpoints"
    );

    let timeout = Duration::from_secs(config.http_timeout_secs);
    let catalog = Arc::new(HttpCatalogStore::new(
        &config.catalog_url,
        timeout,
        config.service_token.clone(),
    )?);
    let library = Arc::new(HttpLibraryStore::new(
        &config.library_url,
        timeout,
        config.service_token.clone(),
    )?);
    let collection = Arc::new(HttpCollectionStore::new(
        &config.collection_url,
        timeout,
        config.service_token.clone(),
    )?);
    let identity = Arc::new(HttpIdentityStore::new(&config.identity_url, timeout)?);

    let agg = Aggregator::new(catalog, library, collection)
        .with_concurrency(config.hydration_concurrency);

    let state = AppState::new(Arc::new(agg), identity);
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("moodify-gw listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
