use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tutoring_backend::{
    config::{get_config, init_config, Config},
    database::{
        pool::{create_pool, run_migrations},
        MemoryStore, PgStore, SharedStore,
    },
    routes, AppState,
};

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.log_json {
        builder
            .json()
            .try_init()
            .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    } else {
        builder
            .try_init()
            .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    init_tracing(config)?;

    let store: SharedStore = if config.database_url.is_some() {
        let pool = create_pool(config).await?;
        run_migrations(&pool).await?;
        info!("Using PostgreSQL store");
        Arc::new(PgStore::new(pool))
    } else {
        warn!("DATABASE_URL is not set; using the in-memory store, data will not persist");
        Arc::new(MemoryStore::new())
    };

    let app_state = AppState::new(store, &config.jwt_secret);

    let app = routes::build_router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
