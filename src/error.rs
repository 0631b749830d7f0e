use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Missing {0}.")]
    MissingInput(&'static str),

    #[error("Invalid data source.")]
    InvalidDataSource,

    #[error("Malformed JSON in request body")]
    MalformedBody,

    #[error("Error: {status} - {body}")]
    UpstreamHttp { status: u16, body: String },

    #[error("{0}")]
    UpstreamTransport(String),

    #[error("{0}")]
    UpstreamPayload(String),

    #[error("Malformed result: {0}")]
    MalformedResult(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DashboardError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::MissingInput(_)
            | DashboardError::InvalidDataSource
            | DashboardError::MalformedBody => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for the `outcome` metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::MissingInput(_) => "missing_input",
            DashboardError::InvalidDataSource => "invalid_datasource",
            DashboardError::MalformedBody => "malformed_body",
            DashboardError::UpstreamHttp { .. } => "upstream_http",
            DashboardError::UpstreamTransport(_) => "upstream_transport",
            DashboardError::UpstreamPayload(_) => "upstream_payload",
            DashboardError::MalformedResult(_) => "malformed_result",
            DashboardError::Config(_) => "config",
            DashboardError::Internal(_) => "internal",
        }
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        DashboardError::UpstreamTransport(err.to_string())
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::UpstreamPayload(format!("Invalid JSON from data source: {}", err))
    }
}

impl From<toml::de::Error> for DashboardError {
    fn from(err: toml::de::Error) -> Self {
        DashboardError::Config(err.to_string())
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
