use axum::extract::State;
use axum::Json;
use shared_types::{AppError, SelectedParams, SelectedResponse};

use crate::error_convert::ENGINE_UNREACHABLE;
use crate::filters::SelectedFilters;
use crate::rest::FirstValueQuery;
use crate::selected::retrieve;
use crate::state::AppState;

/// Paginated documents by identifier.
///
/// Each document carries its engine id and a placeholder `preview`; the
/// article body is never returned.
#[utoipa::path(
    get,
    path = "/api/selected",
    params(SelectedParams),
    responses(
        (status = 200, description = "One page of documents", body = SelectedResponse),
        (status = 400, description = "Missing ids parameter", body = AppError),
        (status = 502, description = "Search engine returned an unusable response", body = AppError),
        (status = 503, description = "Search engine unreachable", body = AppError)
    ),
    tag = "search"
)]
#[tracing::instrument(skip(state, params))]
pub async fn selected(
    State(state): State<AppState>,
    FirstValueQuery(params): FirstValueQuery<SelectedParams>,
) -> Result<Json<SelectedResponse>, AppError> {
    let filters = SelectedFilters::from_params(&params, &state.limits)?;

    if !state.engine.ping().await {
        return Err(AppError::service_unavailable(ENGINE_UNREACHABLE));
    }

    let page = retrieve(state.engine.as_ref(), &filters).await?;
    tracing::debug!(
        ids = filters.ids.len(),
        page = page.page_num,
        returned = page.per_page,
        "selected page built"
    );
    Ok(Json(page))
}
