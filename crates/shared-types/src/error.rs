use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Categorization of application errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum AppErrorKind {
    NotFound,
    BadRequest,
    ServiceUnavailable,
    UpstreamError,
    InternalError,
}

impl fmt::Display for AppErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppErrorKind::NotFound => write!(f, "NotFound"),
            AppErrorKind::BadRequest => write!(f, "BadRequest"),
            AppErrorKind::ServiceUnavailable => write!(f, "ServiceUnavailable"),
            AppErrorKind::UpstreamError => write!(f, "UpstreamError"),
            AppErrorKind::InternalError => write!(f, "InternalError"),
        }
    }
}

/// Structured application error returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AppError {
    pub kind: AppErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub field_errors: HashMap<String, String>,
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: AppErrorKind::NotFound,
            message: message.into(),
            field_errors: HashMap::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            kind: AppErrorKind::BadRequest,
            message: message.into(),
            field_errors: HashMap::new(),
        }
    }

    /// A required query parameter was absent or blank.
    pub fn missing_parameter(name: &str) -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert(name.to_string(), "required".to_string());
        Self {
            kind: AppErrorKind::BadRequest,
            message: format!("Invalid input, please provide '{name}' parameter"),
            field_errors,
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: AppErrorKind::ServiceUnavailable,
            message: message.into(),
            field_errors: HashMap::new(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            kind: AppErrorKind::UpstreamError,
            message: message.into(),
            field_errors: HashMap::new(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: AppErrorKind::InternalError,
            message: message.into(),
            field_errors: HashMap::new(),
        }
    }

    /// HTTP status this error is reported with.
    pub fn status_code_u16(&self) -> u16 {
        match self.kind {
            AppErrorKind::NotFound => 404,
            AppErrorKind::BadRequest => 400,
            AppErrorKind::ServiceUnavailable => 503,
            AppErrorKind::UpstreamError => 502,
            AppErrorKind::InternalError => 500,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(feature = "server")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = axum::http::StatusCode::from_u16(self.status_code_u16())
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        (status, axum::Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameter_names_the_field() {
        let err = AppError::missing_parameter("q");
        assert_eq!(err.kind, AppErrorKind::BadRequest);
        assert_eq!(err.message, "Invalid input, please provide 'q' parameter");
        assert_eq!(err.field_errors.get("q").unwrap(), "required");
    }

    #[test]
    fn not_found_error_has_correct_kind() {
        let err = AppError::not_found("missing item");
        assert_eq!(err.kind, AppErrorKind::NotFound);
        assert_eq!(err.message, "missing item");
        assert!(err.field_errors.is_empty());
    }

    #[test]
    fn status_code_mapping() {
        assert_eq!(AppError::not_found("").status_code_u16(), 404);
        assert_eq!(AppError::bad_request("").status_code_u16(), 400);
        assert_eq!(AppError::service_unavailable("").status_code_u16(), 503);
        assert_eq!(AppError::upstream("").status_code_u16(), 502);
        assert_eq!(AppError::internal("").status_code_u16(), 500);
    }

    #[test]
    fn display_impl_formats_correctly() {
        let err = AppError::service_unavailable("Can't connect to Elasticsearch");
        assert_eq!(
            format!("{}", err),
            "ServiceUnavailable: Can't connect to Elasticsearch"
        );
    }

    #[test]
    fn empty_field_errors_are_not_serialized() {
        let json = serde_json::to_string(&AppError::internal("boom")).unwrap();
        assert_eq!(json, r#"{"kind":"InternalError","message":"boom"}"#);
    }

    #[test]
    fn error_roundtrip_through_json() {
        let err = AppError::missing_parameter("ids");
        let json = serde_json::to_string(&err).unwrap();
        let parsed: AppError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, parsed);
    }
}
