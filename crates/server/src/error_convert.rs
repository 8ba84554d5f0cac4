use shared_types::AppError;

use crate::elastic::EngineError;
use crate::stats::StatsError;

/// Message returned when the liveness probe fails.
pub const ENGINE_UNREACHABLE: &str = "Can't connect to Elasticsearch";

/// Convert an EngineError into an AppError.
///
/// A request that never reached the engine is a 503; anything the engine
/// answered but we could not use is a 502.
pub fn engine_to_app_error(err: EngineError) -> AppError {
    match &err {
        EngineError::Transport(_) => AppError::service_unavailable(ENGINE_UNREACHABLE),
        EngineError::Status { status, .. } => {
            AppError::upstream(format!("Search engine rejected the request ({status})"))
        }
        EngineError::Decode(_) => AppError::upstream(err.to_string()),
    }
}

/// Convert a StatsError into an AppError. Malformed hits are a server-side
/// failure; the message names the offending document.
pub fn stats_to_app_error(err: StatsError) -> AppError {
    AppError::internal(err.to_string())
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        engine_to_app_error(err)
    }
}

impl From<StatsError> for AppError {
    fn from(err: StatsError) -> Self {
        stats_to_app_error(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::normalize_date;
    use shared_types::AppErrorKind;

    #[test]
    fn status_error_is_upstream() {
        let err = AppError::from(EngineError::Status {
            status: 500,
            body: "boom".to_string(),
        });
        assert_eq!(err.kind, AppErrorKind::UpstreamError);
        assert_eq!(err.status_code_u16(), 502);
        assert!(err.message.contains("500"));
    }

    #[test]
    fn decode_error_is_upstream() {
        let err: AppError = EngineError::Decode("expected value".to_string()).into();
        assert_eq!(err.kind, AppErrorKind::UpstreamError);
    }

    #[test]
    fn transport_error_is_unavailable() {
        let transport = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        let err = AppError::from(EngineError::Transport(transport));
        assert_eq!(err.kind, AppErrorKind::ServiceUnavailable);
        assert_eq!(err.message, ENGINE_UNREACHABLE);
    }

    #[test]
    fn malformed_timestamp_is_internal() {
        let source = normalize_date("not a date").unwrap_err();
        let err = AppError::from(StatsError::MalformedTimestamp {
            id: "a".to_string(),
            value: "not a date".to_string(),
            source,
        });
        assert_eq!(err.kind, AppErrorKind::InternalError);
        assert_eq!(err.status_code_u16(), 500);
        assert!(err.message.contains("hit a"));
    }
}
