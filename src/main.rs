//! studymap-ra - Learning Resource Aggregation Service
//!
//! **Module Identity:**
//! - Name: studymap-ra (Resource Aggregation)
//! - Port: 5746 (default)
//!
//! Gathers per-day study resources for learning plans from wikipedia,
//! youtube, reddit, and medium, persists them, and serves them over HTTP.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use studymap_ra::config::{Config, LookupBackend};
use studymap_ra::db::resources::ResourceStore;
use studymap_ra::lookup::{HttpLookup, ScriptLookup, SourceLookup};
use studymap_ra::services::{ImmediateResourceService, ResourceOrchestrator, SourceFetcher};
use studymap_ra::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification first, before any slow startup work
    info!(
        "Starting studymap-ra v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = Config::load();
    info!("Database: {}", config.database_path.display());

    let db_pool = studymap_ra::db::init_database_pool(&config.database_path).await?;
    info!("Database connection established");

    let lookup: Arc<dyn SourceLookup> = match config.lookup_backend {
        LookupBackend::Script => {
            let script = ScriptLookup::new(&config.script_dir);
            for (source, present) in script.helper_status() {
                if !present {
                    warn!(
                        source = %source,
                        dir = %config.script_dir.display(),
                        "Helper executable missing; lookups for this source will use fallback links"
                    );
                }
            }
            Arc::new(script)
        }
        LookupBackend::Http => Arc::new(HttpLookup::new()?),
    };
    info!(
        backend = lookup.name(),
        "Lookup backend initialized"
    );

    let store = ResourceStore::new(db_pool);
    let fetcher = SourceFetcher::with_timeout(Arc::clone(&lookup), config.fetch_timeout());
    let orchestrator = ResourceOrchestrator::with_parallelism(
        fetcher.clone(),
        store.clone(),
        config.unit_parallelism,
    );
    let immediate = ImmediateResourceService::with_settings(
        lookup,
        config.immediate_fetch_timeout(),
        config.immediate_cache_ttl(),
    );

    let state = AppState::new(store, orchestrator, immediate);
    let app = studymap_ra::build_router(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
