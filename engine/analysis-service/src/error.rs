//! API errors and JSON error rendering

use analysis_pipeline::PipelineError;
use league_client::LeagueClientError;
use serde::Serialize;
use stats_fetcher::StatsError;
use std::convert::Infallible;
use thiserror::Error;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::{Rejection, Reply};

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    pub timestamp: String,
}

/// Error detail
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

/// An error raised by a route handler, carried through warp as a rejection
#[derive(Error, Debug)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl warp::reject::Reject for ApiError {}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into(), details: None }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message.clone(),
                details: self.details.clone(),
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::InvalidWeek(_) => ApiError::bad_request(e.to_string()),
            other => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "PIPELINE_ERROR", other.to_string()),
        }
    }
}

impl From<StatsError> for ApiError {
    fn from(e: StatsError) -> Self {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "STATS_ERROR", e.to_string())
    }
}

impl From<LeagueClientError> for ApiError {
    fn from(e: LeagueClientError) -> Self {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "LEAGUE_ERROR", e.to_string())
    }
}

fn render(status: StatusCode, code: &'static str, message: impl Into<String>) -> warp::reply::Response {
    let body = ApiError::new(status, code, message).to_response();
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

/// Turn any rejection into a JSON error response
pub async fn handle_rejection(err: Rejection) -> Result<warp::reply::Response, Infallible> {
    if let Some(api_error) = err.find::<ApiError>() {
        if api_error.status.is_server_error() {
            error!("Request failed: {}", api_error);
        } else {
            warn!("Request rejected: {}", api_error);
        }
        let body = api_error.to_response();
        return Ok(warp::reply::with_status(warp::reply::json(&body), api_error.status).into_response());
    }

    if err.is_not_found() {
        return Ok(render(StatusCode::NOT_FOUND, "NOT_FOUND", "Route not found"));
    }

    if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        return Ok(render(StatusCode::BAD_REQUEST, "INVALID_QUERY", e.to_string()));
    }

    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(render(StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED", "Method not allowed"));
    }

    error!("Unhandled rejection: {:?}", err);
    Ok(render(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Internal server error"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_status() {
        let invalid: ApiError = PipelineError::InvalidWeek(0).into();
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

        let failed: ApiError = PipelineError::Stats(StatsError::schema("no player column")).into();
        assert_eq!(failed.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(failed.message.contains("no player column"));
    }

    #[test]
    fn test_error_response_shape() {
        let error = ApiError::not_found("missing").with_details(serde_json::json!({"week": 3}));
        let value = serde_json::to_value(error.to_response()).unwrap();

        assert_eq!(value["error"]["code"], "NOT_FOUND");
        assert_eq!(value["error"]["message"], "missing");
        assert_eq!(value["error"]["details"]["week"], 3);
        assert!(value["timestamp"].is_string());
    }
}
