use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use watchlist_api::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, create_redis_client, run_migrations, PgStore, RedisSessionStore},
    services::TmdbProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("watchlist_api=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    let redis_client = create_redis_client(&config.redis_url)?;

    let state = AppState::new(
        Arc::new(PgStore::new(pool)),
        Arc::new(RedisSessionStore::new(redis_client, config.session_ttl_secs)),
        Arc::new(TmdbProvider::new(
            config.tmdb_api_token.clone(),
            config.tmdb_api_url.clone(),
            config.watch_region.clone(),
        )),
        config.password_cost,
    );

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, region = %config.watch_region, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
