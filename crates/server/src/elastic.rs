//! HTTP client for the Elasticsearch cluster.
//!
//! Handlers only see the [`SearchEngine`] trait so that router tests can
//! swap in an in-memory engine.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::config::EngineSettings;

/// Failure talking to the search engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The request never produced a response (DNS, TLS, connection refused).
    #[error("search engine request failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// The engine answered with a non-success status.
    #[error("search engine returned {status}: {body}")]
    Status { status: u16, body: String },
    /// The engine answered 2xx but the body was not the expected JSON.
    #[error("search engine response could not be decoded: {0}")]
    Decode(String),
}

#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Liveness check; true only when the cluster root answers 200.
    async fn ping(&self) -> bool;

    /// Run one `_search` request with `body` as its JSON payload.
    async fn search(&self, body: &Value) -> Result<Value, EngineError>;
}

/// `hits` section of a `_search` response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchHits {
    pub total: TotalHits,
    #[serde(default)]
    pub hits: Vec<RawHit>,
}

/// Total match count. Recent clusters report `{"value": n, "relation": ..}`,
/// older ones a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Detailed { value: u64 },
    Count(u64),
}

impl Default for TotalHits {
    fn default() -> Self {
        TotalHits::Count(0)
    }
}

impl TotalHits {
    pub fn value(self) -> u64 {
        match self {
            TotalHits::Detailed { value } | TotalHits::Count(value) => value,
        }
    }
}

/// One hit with its source document left untyped.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source", default)]
    pub source: Value,
}

#[derive(Deserialize)]
struct SearchEnvelope {
    hits: SearchHits,
}

/// Extract the hit list and total from a raw `_search` response.
pub fn decode_hits(response: Value) -> Result<SearchHits, EngineError> {
    serde_json::from_value::<SearchEnvelope>(response)
        .map(|envelope| envelope.hits)
        .map_err(|e| EngineError::Decode(e.to_string()))
}

/// Long-lived client shared by every request.
#[derive(Debug, Clone)]
pub struct ElasticClient {
    http: reqwest::Client,
    settings: EngineSettings,
}

impl ElasticClient {
    pub fn new(settings: EngineSettings) -> Result<Self, EngineError> {
        if settings.accept_invalid_certs {
            tracing::warn!(
                host = %settings.host,
                "TLS certificate verification disabled for the search engine"
            );
        }
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .map_err(EngineError::Transport)?;
        Ok(Self { http, settings })
    }
}

#[async_trait]
impl SearchEngine for ElasticClient {
    #[tracing::instrument(skip(self))]
    async fn ping(&self) -> bool {
        let url = self.settings.root_url();
        let result = self
            .http
            .get(&url)
            .basic_auth(&self.settings.user, Some(&self.settings.password))
            .send()
            .await;

        match result {
            Ok(response) if response.status() == reqwest::StatusCode::OK => true,
            Ok(response) => {
                tracing::warn!(url = %url, status = %response.status(), "search engine probe rejected");
                false
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "search engine unreachable");
                false
            }
        }
    }

    #[tracing::instrument(skip(self, body))]
    async fn search(&self, body: &Value) -> Result<Value, EngineError> {
        let url = self.settings.search_url();
        tracing::debug!(url = %url, body_bytes = body.to_string().len(), "search engine request");

        // The cluster accepts a JSON body on GET; the API has always used it.
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.settings.user, Some(&self.settings.password))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "search engine request failed");
                EngineError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, "search engine returned an error");
            return Err(EngineError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| EngineError::Decode(e.to_string()))
    }
}
