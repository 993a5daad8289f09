use anyhow::Context;
use axum::http::{HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

use order_engine::app_system::{load_catalog, seed_catalog, setup_tracing, OrderSystem};
use order_engine::config::EngineConfig;
use order_engine::http::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing file is fine: production injects the variables directly.
    let _ = dotenvy::from_filename(".env.local");

    setup_tracing();

    let config = EngineConfig::from_env().context("invalid configuration")?;
    info!(addr = %config.bind_addr, "Starting order engine");

    let system = OrderSystem::start(&config);

    if let Some(path) = &config.seed_file {
        let catalog = load_catalog(path).await?;
        seed_catalog(&system.product_client, catalog)
            .await
            .context("seeding catalog")?;
    }

    let app = build_router(system.engine.clone())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_localhost_only());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!("order engine listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .context("server crashed")?;

    system.shutdown().await.map_err(anyhow::Error::msg)?;
    info!("Order engine stopped");
    Ok(())
}

/// CORS: allow only localhost origins.
fn cors_localhost_only() -> CorsLayer {
    let allowed_origins = [
        "http://localhost",
        "http://127.0.0.1",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
    ];

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(tower_http::cors::Any)
}
