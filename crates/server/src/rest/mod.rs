pub mod search;
pub mod selected;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum::http::Uri;
use axum::response::Html;
use axum::{routing::get, Router};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use shared_types::AppError;

use crate::state::AppState;

/// Build the REST API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/search", get(search::search))
        .route("/api/selected", get(selected::selected))
        .route("/stats_api", get(banner))
}

/// Landing page of the statistics API.
pub async fn banner() -> Html<&'static str> {
    Html("<h1>some cool statistics :P</h1>")
}

/// JSON 404 for any unrouted path.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::not_found(format!("No route for {}", uri.path()))
}

/// Query-string extractor that keeps the first value of a repeated
/// parameter, so `?q=a&q=b` reads as `q=a`.
///
/// Rejections are reported as [`AppError`] JSON.
#[derive(Debug, Clone)]
pub struct FirstValueQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for FirstValueQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        let mut fields = Map::new();
        for (key, value) in pairs {
            fields.entry(key).or_insert(Value::String(value));
        }

        serde_json::from_value(Value::Object(fields))
            .map(FirstValueQuery)
            .map_err(|e| AppError::bad_request(format!("Invalid query string: {e}")))
    }
}
