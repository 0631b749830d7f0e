use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;

use super::{execute, AppState};
use crate::{metrics, models::QueryRequest, DashboardError, Result};

/// `POST /query-metric`: passes the backend's JSON through untouched.
///
/// The body is parsed as JSON whatever the content type says. The query is
/// trimmed; the data source is not, since it must equal a configured URL
/// exactly. The form endpoint trims both, as browsers may pad form fields.
pub async fn query_metric(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let result = run(&state, &body).await;
    match &result {
        Ok(_) => metrics::record_query("api", "ok"),
        Err(e) => metrics::record_query("api", e.kind()),
    }
    result.map(Json)
}

async fn run(state: &AppState, body: &[u8]) -> Result<Value> {
    let request: QueryRequest =
        serde_json::from_slice(body).map_err(|_| DashboardError::MalformedBody)?;

    let query = request.query.unwrap_or_default();
    let datasource = request.datasource.unwrap_or_default();
    execute(state, query.trim(), &datasource).await
}
