use axum::extract::FromRef;
use std::sync::Arc;

use crate::config::SearchLimits;
use crate::elastic::SearchEngine;
use crate::taxonomy::CategoryTaxonomy;

/// Shared application state passed to Axum handlers via `State`.
///
/// Everything in here is built once at startup and only read afterwards.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub engine: Arc<dyn SearchEngine>,
    pub taxonomy: Arc<CategoryTaxonomy>,
    pub limits: SearchLimits,
}

impl AppState {
    pub fn new(
        engine: Arc<dyn SearchEngine>,
        taxonomy: CategoryTaxonomy,
        limits: SearchLimits,
    ) -> Self {
        Self {
            engine,
            taxonomy: Arc::new(taxonomy),
            limits,
        }
    }
}
