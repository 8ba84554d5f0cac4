use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use server::config::SearchLimits;
use server::elastic::{EngineError, SearchEngine};
use server::state::AppState;
use server::taxonomy::CategoryTaxonomy;
use shared_types::FeatureFlags;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// One call observed by [`FakeEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Ping,
    Search(Value),
}

/// What the fake answers to `search`.
#[derive(Debug, Clone)]
pub enum FakeReply {
    Body(Value),
    Status(u16),
}

/// In-memory search engine that records every call in order.
pub struct FakeEngine {
    alive: bool,
    reply: FakeReply,
    calls: Mutex<Vec<EngineCall>>,
}

#[allow(dead_code)]
impl FakeEngine {
    pub fn responding(body: Value) -> Arc<Self> {
        Arc::new(Self {
            alive: true,
            reply: FakeReply::Body(body),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing_with(status: u16) -> Arc<Self> {
        Arc::new(Self {
            alive: true,
            reply: FakeReply::Status(status),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            alive: false,
            reply: FakeReply::Body(empty_hits()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Bodies of every `search` call, in order.
    pub fn searches(&self) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Search(body) => Some(body),
                EngineCall::Ping => None,
            })
            .collect()
    }
}

#[async_trait]
impl SearchEngine for FakeEngine {
    async fn ping(&self) -> bool {
        self.calls.lock().unwrap().push(EngineCall::Ping);
        self.alive
    }

    async fn search(&self, body: &Value) -> Result<Value, EngineError> {
        self.calls
            .lock()
            .unwrap()
            .push(EngineCall::Search(body.clone()));
        match &self.reply {
            FakeReply::Body(value) => Ok(value.clone()),
            FakeReply::Status(status) => Err(EngineError::Status {
                status: *status,
                body: "fake failure".to_string(),
            }),
        }
    }
}

#[allow(dead_code)]
pub fn empty_hits() -> Value {
    json!({ "hits": { "total": { "value": 0, "relation": "eq" }, "hits": [] } })
}

#[allow(dead_code)]
/// Wrap hit documents in a `_search` response envelope.
pub fn hits_response(total: u64, hits: Vec<Value>) -> Value {
    json!({
        "took": 2,
        "timed_out": false,
        "hits": {
            "total": { "value": total, "relation": "eq" },
            "hits": hits
        }
    })
}

#[allow(dead_code)]
pub fn article(id: &str, region: &str, language: &str, keywords: &[&str], published: &str) -> Value {
    json!({
        "_index": "articles_index",
        "_id": id,
        "_score": 1.0,
        "_source": {
            "title": format!("Article {id}"),
            "content": "full article text",
            "region": region,
            "language": language,
            "keywords": keywords,
            "published": [published]
        }
    })
}

pub fn test_taxonomy() -> CategoryTaxonomy {
    let mut categories = HashMap::new();
    categories.insert(
        "theft".to_string(),
        vec!["theft".to_string(), "robbery".to_string(), "burglary".to_string()],
    );
    categories.insert(
        "fraud".to_string(),
        vec!["fraud".to_string(), "scam".to_string()],
    );
    CategoryTaxonomy::new(categories)
}

#[allow(dead_code)]
/// Build the application router around `engine`, with default limits and
/// all feature flags off.
pub fn test_app(engine: Arc<FakeEngine>) -> Router {
    let state = AppState::new(engine, test_taxonomy(), SearchLimits::default());
    server::openapi::build_router(state, &FeatureFlags::default())
}

#[allow(dead_code)]
/// Same as [`test_app`] with the `/docs` UI mounted.
pub fn test_app_with_docs(engine: Arc<FakeEngine>) -> Router {
    let state = AppState::new(engine, test_taxonomy(), SearchLimits::default());
    let flags = FeatureFlags {
        docs: true,
        ..Default::default()
    };
    server::openapi::build_router(state, &flags)
}

#[allow(dead_code)]
/// Helper to make a GET request and return (status, body).
pub async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[allow(dead_code)]
/// Helper to make a GET request and parse the body as JSON.
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    let value = serde_json::from_str(&body)
        .unwrap_or_else(|e| panic!("response to {uri} is not JSON ({e}): {body}"));
    (status, value)
}
