use axum::Router;
use shared_types::{
    AppError, AppErrorKind, Diagnostic, DiagnosticCode, FeatureFlags, SearchResponse,
    SelectedResponse, Stats,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::health;
use crate::rest;
use crate::state::AppState;

/// OpenAPI documentation for the API.
#[derive(OpenApi)]
#[openapi(
    paths(
        rest::search::search,
        rest::selected::selected,
        health::health_check,
    ),
    components(schemas(
        AppError,
        AppErrorKind,
        SearchResponse,
        SelectedResponse,
        Stats,
        Diagnostic,
        DiagnosticCode,
        health::HealthResponse,
    )),
    tags(
        (name = "search", description = "Article search and facet statistics"),
        (name = "health", description = "Health check endpoint")
    ),
    info(
        title = "Article Statistics API",
        description = "Full-text article search with region, language, category and date facets",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

/// Build the application router using the process-wide feature flags.
pub fn api_router(state: AppState) -> Router {
    build_router(state, crate::config::feature_flags())
}

/// Build the REST API at `/api/*` plus `/health`, and the API docs at
/// `/docs` when the `docs` flag is on.
pub fn build_router(state: AppState, flags: &FeatureFlags) -> Router {
    let router = Router::new()
        .merge(rest::api_router())
        .route("/health", axum::routing::get(health::health_check))
        .with_state(state);

    let router = if flags.docs {
        router.merge(Scalar::with_url("/docs", ApiDoc::openapi()))
    } else {
        router
    };
    router.fallback(rest::not_found)
}
