//! Raw query-string parameters → typed filter values.
//!
//! Nothing in here fails on malformed filter input: a list that is not in
//! `[a, b]` form becomes [`ListFilter::MalformedFilterIgnored`], a bad size
//! becomes the configured default. Only the required `q` / `ids`
//! parameters can reject a request.

use shared_types::{
    normalize_page, AppError, Diagnostic, DiagnosticCode, SearchParams, SelectedParams,
};

use crate::config::SearchLimits;

/// Outcome of parsing a bracketed list parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListFilter {
    /// Parameter missing, blank, or an empty list.
    Absent,
    /// Parameter present but not bracketed; no filter is applied.
    MalformedFilterIgnored,
    Values(Vec<String>),
}

impl ListFilter {
    pub fn values(self) -> Option<Vec<String>> {
        match self {
            ListFilter::Values(values) => Some(values),
            _ => None,
        }
    }
}

/// Parse `[a, b, c]` into trimmed tokens.
///
/// Input without brackets is [`ListFilter::MalformedFilterIgnored`]. Tokens
/// that are empty after trimming are dropped without a diagnostic, so
/// `[a,,b]` reads as `[a, b]` and `[ , ]` is [`ListFilter::Absent`].
pub fn parse_list(raw: Option<&str>) -> ListFilter {
    parse_bracketed(raw, |token| token.trim())
}

/// Like [`parse_list`], additionally stripping quotes around each token so
/// that `["id1", 'id2']` and `[id1, id2]` read the same.
pub fn parse_id_list(raw: Option<&str>) -> ListFilter {
    parse_bracketed(raw, |token| token.trim().trim_matches(['"', '\'']).trim())
}

fn parse_bracketed(raw: Option<&str>, clean: impl Fn(&str) -> &str) -> ListFilter {
    let raw = match raw.map(str::trim) {
        None | Some("") => return ListFilter::Absent,
        Some(raw) => raw,
    };

    let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) else {
        return ListFilter::MalformedFilterIgnored;
    };

    let values: Vec<String> = inner
        .split(',')
        .map(&clean)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect();

    if values.is_empty() {
        ListFilter::Absent
    } else {
        ListFilter::Values(values)
    }
}

/// Bound a requested size to `(0, max]`, substituting `default` otherwise.
pub fn check_size(size: i64, default: i64, max: i64) -> i64 {
    if size <= 0 || size > max {
        default
    } else {
        size
    }
}

/// Parse and bound a size parameter; unparseable input yields `default`.
pub fn parse_size(raw: Option<&str>, default: i64, max: i64) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .map(|size| check_size(size, default, max))
        .unwrap_or(default)
}

/// Parse a 1-based page number; anything unusable becomes page 1.
pub fn parse_page(raw: Option<&str>) -> u64 {
    normalize_page(raw.and_then(|v| v.trim().parse::<i64>().ok()))
}

/// A date bound is kept verbatim when non-blank.
pub fn parse_date_bound(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty())
}

/// Fully parsed `/api/search` request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilters {
    pub query: String,
    pub categories: Option<Vec<String>>,
    pub regions: Option<Vec<String>>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub size: i64,
    pub diagnostics: Vec<Diagnostic>,
}

impl SearchFilters {
    pub fn from_params(params: &SearchParams, limits: &SearchLimits) -> Result<Self, AppError> {
        let query = required(params.q.as_deref()).ok_or_else(|| AppError::missing_parameter("q"))?;

        let mut diagnostics = Vec::new();
        let categories = list_with_diagnostic("keywords", params.keywords.as_deref(), &mut diagnostics);
        let regions = list_with_diagnostic("regions", params.regions.as_deref(), &mut diagnostics);

        Ok(Self {
            query: query.to_string(),
            categories,
            regions,
            from: parse_date_bound(params.from.as_deref()),
            to: parse_date_bound(params.to.as_deref()),
            size: parse_size(params.size.as_deref(), limits.default_size, limits.max_size),
            diagnostics,
        })
    }
}

fn list_with_diagnostic(
    parameter: &str,
    raw: Option<&str>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Vec<String>> {
    match parse_list(raw) {
        ListFilter::Values(values) => Some(values),
        ListFilter::Absent => None,
        ListFilter::MalformedFilterIgnored => {
            tracing::warn!(parameter, value = raw.unwrap_or_default(), "malformed list filter ignored");
            diagnostics.push(Diagnostic {
                code: DiagnosticCode::MalformedFilterIgnored,
                parameter: parameter.to_string(),
                value: raw.unwrap_or_default().to_string(),
            });
            None
        }
    }
}

/// Fully parsed `/api/selected` request.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFilters {
    pub ids: Vec<String>,
    pub page: u64,
    pub page_size: u64,
}

impl SelectedFilters {
    pub fn from_params(params: &SelectedParams, limits: &SearchLimits) -> Result<Self, AppError> {
        let ids = parse_id_list(params.ids.as_deref())
            .values()
            .ok_or_else(|| AppError::missing_parameter("ids"))?;

        let page_size = parse_size(
            params.size.as_deref(),
            limits.default_page_size,
            limits.max_page_size,
        );

        Ok(Self {
            ids,
            page: parse_page(params.page.as_deref()),
            page_size: page_size as u64,
        })
    }
}
