use shared_types::{AppConfig, FeatureFlags};
use std::net::SocketAddr;
use std::sync::OnceLock;

static FLAGS: OnceLock<FeatureFlags> = OnceLock::new();

/// Path to the config file, relative to the working directory.
const CONFIG_PATH: &str = "config.toml";

/// Read `config.toml`, parse feature flags, and store them in the global
/// `OnceLock`. Only the first call has effect.
///
/// If the file is missing or unparseable, all flags default to `false`.
pub fn load_feature_flags() {
    FLAGS.get_or_init(|| match std::fs::read_to_string(CONFIG_PATH) {
        Ok(contents) => {
            let config: AppConfig = toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to parse {CONFIG_PATH}, all feature flags off");
                AppConfig::default()
            });
            tracing::info!(flags = ?config.features, "feature flags loaded");
            config.features
        }
        Err(e) => {
            tracing::info!(error = %e, "{CONFIG_PATH} not found, all feature flags off");
            FeatureFlags::default()
        }
    });
}

/// Get the loaded feature flags. Returns all-false defaults if
/// `load_feature_flags()` hasn't been called yet.
pub fn feature_flags() -> &'static FeatureFlags {
    static DEFAULT: FeatureFlags = FeatureFlags {
        telemetry: false,
        docs: false,
    };
    FLAGS.get().unwrap_or(&DEFAULT)
}

/// Hits aggregated when `size` is missing or out of range.
pub const DEFAULT_SEARCH_SIZE: i64 = 300;
/// Documents per page when the selected endpoint gets no usable `size`.
pub const DEFAULT_PAGE_SIZE: i64 = 10;
/// Upper bound on the selected endpoint's page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Connection details for the Elasticsearch cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub index: String,
    /// Skip TLS certificate verification (self-signed development clusters).
    pub accept_invalid_certs: bool,
}

impl EngineSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            protocol: lookup("ES_PROTOCOL").unwrap_or_else(|| "https".to_string()),
            host: lookup("ES_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: parse_or(&lookup, "ES_PORT", 9200),
            user: lookup("ES_USER").unwrap_or_else(|| "elastic".to_string()),
            password: lookup("ES_PASSWORD").unwrap_or_else(|| "elastic123".to_string()),
            index: lookup("ELASTIC_INDEX_NAME").unwrap_or_else(|| "articles_index".to_string()),
            accept_invalid_certs: parse_or(&lookup, "ES_ACCEPT_INVALID_CERTS", true),
        }
    }

    /// Cluster root, used by the liveness probe.
    pub fn root_url(&self) -> String {
        format!("{}://{}:{}/", self.protocol, self.host, self.port)
    }

    /// `_search` endpoint of the configured index.
    pub fn search_url(&self) -> String {
        format!(
            "{}://{}:{}/{}/_search",
            self.protocol, self.host, self.port, self.index
        )
    }
}

/// Size bounds applied to incoming requests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchLimits {
    pub default_size: i64,
    pub max_size: i64,
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_SEARCH_SIZE,
            max_size: DEFAULT_SEARCH_SIZE,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl SearchLimits {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds limits from `lookup`. A default larger than its maximum is
    /// pulled down to the maximum so that defaults always satisfy the bound.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let max_size = parse_or(&lookup, "SEARCH_MAX_SIZE", defaults.max_size).max(1);
        let default_size =
            parse_or(&lookup, "SEARCH_DEFAULT_SIZE", defaults.default_size).clamp(1, max_size);
        let max_page_size =
            parse_or(&lookup, "SELECTED_MAX_PAGE_SIZE", defaults.max_page_size).max(1);
        let default_page_size = parse_or(
            &lookup,
            "SELECTED_DEFAULT_PAGE_SIZE",
            defaults.default_page_size,
        )
        .clamp(1, max_page_size);

        Self {
            default_size,
            max_size,
            default_page_size,
            max_page_size,
        }
    }
}

/// Process-level settings for the HTTP listener.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub bind_addr: SocketAddr,
    /// When false, permissive CORS is enabled for local front-end work.
    pub production: bool,
    pub categories_path: String,
}

impl ServerSettings {
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 5000)));

        Self {
            bind_addr,
            production: std::env::var("PRODUCTION").is_ok(),
            categories_path: std::env::var("KEYWORD_CATEGORIES_PATH")
                .unwrap_or_else(|_| "static/en_keyword_categories.json".to_string()),
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
