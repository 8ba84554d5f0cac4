use std::sync::Arc;

use server::config::{EngineSettings, SearchLimits, ServerSettings};
use server::elastic::ElasticClient;
use server::state::AppState;
use server::taxonomy::CategoryTaxonomy;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (ignored in production where env vars are set directly).
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    server::config::load_feature_flags();
    let flags = server::config::feature_flags();

    let telemetry = if flags.telemetry {
        server::telemetry::init_telemetry()
    } else {
        None
    };
    server::health::record_start_time();

    let settings = ServerSettings::from_env();
    let taxonomy = CategoryTaxonomy::load(&settings.categories_path)?;
    tracing::info!(
        path = %settings.categories_path,
        categories = taxonomy.len(),
        "keyword categories loaded"
    );

    let engine_settings = EngineSettings::from_env();
    tracing::info!(url = %engine_settings.search_url(), "search engine configured");
    let engine = ElasticClient::new(engine_settings)?;

    let limits = SearchLimits::from_env();
    let state = AppState::new(Arc::new(engine), taxonomy, limits);

    let mut router = server::openapi::api_router(state);

    if flags.telemetry {
        router = router.layer(server::telemetry::OtelTraceLayer);
    }

    if !settings.production {
        tracing::info!("running in development mode, permissive CORS enabled");
        router = router.layer(tower_http::cors::CorsLayer::very_permissive());
    }

    let router = router
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::request_id::PropagateRequestIdLayer::x_request_id())
        .layer(tower_http::request_id::SetRequestIdLayer::x_request_id(
            tower_http::request_id::MakeRequestUuid,
        ));

    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    tracing::info!(addr = %settings.bind_addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(provider) = telemetry {
        if let Err(e) = provider.shutdown() {
            tracing::warn!(error = %e, "failed to flush telemetry");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
