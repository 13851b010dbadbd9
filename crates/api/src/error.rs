use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use percapita_core::PipelineError;
use serde::Serialize;

/// A failed chart request. Always rendered as a JSON error body, never as a
/// chart.
#[derive(Debug)]
pub struct ApiError(pub PipelineError);

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_upstream() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.0.kind(),
            message: self.0.to_string(),
        };
        tracing::error!(%status, kind = body.error, error = %self.0, "chart pipeline failed");
        sentry_anyhow::capture_anyhow(&anyhow::Error::new(self.0));
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn upstream_failures_are_bad_gateway() {
        let err = ApiError(PipelineError::Network {
            url: "https://example.invalid/cases.csv".to_string(),
            detail: "connection refused".to_string(),
        });
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);

        let err = ApiError(PipelineError::Parse {
            dataset: "population",
            line: 3,
            detail: "bad figure".to_string(),
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn data_failures_are_internal_errors() {
        let err = ApiError(PipelineError::MissingPopulation {
            countries: vec!["US".to_string()],
        });
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = ApiError(PipelineError::DataShape {
            date: NaiveDate::from_ymd_opt(2020, 1, 22).unwrap(),
            country: "US".to_string(),
            first: 1,
            second: 2,
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
