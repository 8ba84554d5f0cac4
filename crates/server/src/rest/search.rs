use axum::extract::State;
use axum::Json;
use shared_types::{AppError, Diagnostic, DiagnosticCode, SearchParams, SearchResponse};

use crate::elastic::decode_hits;
use crate::error_convert::ENGINE_UNREACHABLE;
use crate::filters::SearchFilters;
use crate::query::QueryBuilder;
use crate::rest::FirstValueQuery;
use crate::state::AppState;
use crate::stats::aggregate;

/// Full-text search with facet statistics.
///
/// `q` is checked first, then engine liveness, then exactly one search is
/// issued. Malformed list filters and unknown categories do not fail the
/// request; they are listed under `diagnostics`.
#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matches and facet statistics", body = SearchResponse),
        (status = 400, description = "Missing q parameter", body = AppError),
        (status = 502, description = "Search engine returned an unusable response", body = AppError),
        (status = 503, description = "Search engine unreachable", body = AppError)
    ),
    tag = "search"
)]
#[tracing::instrument(skip(state, params), fields(q = params.q.as_deref().unwrap_or_default()))]
pub async fn search(
    State(state): State<AppState>,
    FirstValueQuery(params): FirstValueQuery<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let filters = SearchFilters::from_params(&params, &state.limits)?;

    if !state.engine.ping().await {
        return Err(AppError::service_unavailable(ENGINE_UNREACHABLE));
    }

    let built = QueryBuilder::new(&state.taxonomy).from_filters(&filters);
    let mut diagnostics = filters.diagnostics;
    for category in built.unknown_categories {
        tracing::warn!(category = %category, "unknown category skipped");
        diagnostics.push(Diagnostic {
            code: DiagnosticCode::UnknownCategory,
            parameter: "keywords".to_string(),
            value: category,
        });
    }

    let response = state.engine.search(&built.query.to_json()).await?;
    let hits = decode_hits(response)?;
    let stats = aggregate(&hits.hits)?;

    tracing::info!(
        total = hits.total.value(),
        returned = hits.hits.len(),
        "search completed"
    );

    Ok(Json(SearchResponse {
        query: filters.query,
        search_from: params.from.unwrap_or_default(),
        search_to: params.to.unwrap_or_default(),
        total_results: hits.total.value(),
        articles_count: hits.hits.len(),
        stats,
        diagnostics,
    }))
}
