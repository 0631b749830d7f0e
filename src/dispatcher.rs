//! Builds upstream query URLs and performs the single outbound instant query.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    metrics::UpstreamTimer,
    models::{BackendKind, DataSourceEntry},
    DashboardError, Result,
};

impl BackendKind {
    pub fn query_path(&self) -> &'static str {
        match self {
            BackendKind::VictoriaMetrics => "/select/0/prometheus/api/v1/query",
            BackendKind::Prometheus => "/api/v1/query",
        }
    }
}

pub fn query_url(entry: &DataSourceEntry) -> String {
    format!("{}{}", entry.url.trim_end_matches('/'), entry.kind.query_path())
}

/// HTTP client for instant queries.
///
/// Holds a second client with certificate checks disabled, used only for
/// data sources that set `insecure_skip_verify`.
#[derive(Debug, Clone)]
pub struct QueryClient {
    verified: Client,
    unverified: Client,
}

impl QueryClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let verified = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        let unverified = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| DashboardError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            verified,
            unverified,
        })
    }

    fn client_for(&self, entry: &DataSourceEntry) -> &Client {
        if entry.insecure_skip_verify {
            &self.unverified
        } else {
            &self.verified
        }
    }

    /// Runs `query` against `entry` and returns the decoded payload once the
    /// backend reports `status: success`.
    pub async fn instant_query(&self, entry: &DataSourceEntry, query: &str) -> Result<Value> {
        let url = query_url(entry);
        let timer = UpstreamTimer::new(entry.kind);

        let response = self
            .client_for(entry)
            .get(&url)
            .query(&[("query", query)])
            .send()
            .await
            .map_err(|e| {
                warn!(datasource = %entry.name, %url, "upstream request failed: {}", e);
                DashboardError::from(e)
            })?;

        let status = response.status();
        let body = response.text().await?;
        debug!(
            datasource = %entry.name,
            kind = %entry.kind,
            status = status.as_u16(),
            elapsed_secs = timer.elapsed_secs(),
            "upstream responded"
        );

        if !status.is_success() {
            warn!(datasource = %entry.name, status = status.as_u16(), "upstream returned an error status");
            return Err(DashboardError::UpstreamHttp {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = serde_json::from_str(&body)?;
        ensure_success(&payload)?;
        Ok(payload)
    }
}

fn ensure_success(payload: &Value) -> Result<()> {
    if payload.get("status").and_then(Value::as_str) == Some("success") {
        return Ok(());
    }

    let message = match payload.get("error").and_then(Value::as_str) {
        Some(detail) => format!("Query failed: {}", detail),
        None => "Query failed.".to_string(),
    };
    Err(DashboardError::UpstreamPayload(message))
}
