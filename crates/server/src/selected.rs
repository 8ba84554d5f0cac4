//! Paginated lookup of documents by identifier (`/api/selected`).

use serde_json::{json, Map, Value};
use shared_types::{page_offset, total_pages, SelectedResponse};

use crate::elastic::{decode_hits, EngineError, SearchEngine, SearchHits};
use crate::filters::SelectedFilters;
use crate::query::CONTENT_FIELD;

/// Stands in for the article body, which is never sent to clients.
pub const PREVIEW_PLACEHOLDER: &str =
    "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.";

/// Direct `_id` lookup for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdLookup {
    pub ids: Vec<String>,
    pub from: u64,
    pub size: u64,
}

impl IdLookup {
    pub fn new(ids: &[String], page: u64, page_size: u64) -> Self {
        Self {
            ids: ids.to_vec(),
            from: page_offset(page, page_size),
            size: page_size,
        }
    }

    /// Wire form; `from` and `size` travel as strings like the search `size`.
    pub fn to_json(&self) -> Value {
        json!({
            "from": self.from.to_string(),
            "size": self.size.to_string(),
            "query": { "terms": { "_id": self.ids } }
        })
    }
}

/// Drop the article body, add the preview placeholder and the engine id.
pub fn to_document(id: String, source: Value) -> Map<String, Value> {
    let mut document = match source {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    document.remove(CONTENT_FIELD);
    document.insert("preview".to_string(), Value::from(PREVIEW_PLACEHOLDER));
    document.insert("id".to_string(), Value::String(id));
    document
}

/// Shape one page of lookup hits. `per_page` is the number of documents
/// actually on the page, which can be short on the last one.
pub fn page_result(hits: SearchHits, page: u64, page_size: u64) -> SelectedResponse {
    let total = hits.total.value();
    let results: Vec<Map<String, Value>> = hits
        .hits
        .into_iter()
        .map(|hit| to_document(hit.id, hit.source))
        .collect();

    SelectedResponse {
        page_num: page,
        per_page: results.len(),
        total_pages: total_pages(total, page_size),
        total_results: total,
        results,
    }
}

/// Issue the lookup and shape the page. Exactly one engine call.
pub async fn retrieve(
    engine: &dyn SearchEngine,
    filters: &SelectedFilters,
) -> Result<SelectedResponse, EngineError> {
    let lookup = IdLookup::new(&filters.ids, filters.page, filters.page_size);
    let response = engine.search(&lookup.to_json()).await?;
    let hits = decode_hits(response)?;
    Ok(page_result(hits, filters.page, filters.page_size))
}
