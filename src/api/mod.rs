pub mod query;
pub mod ui;

use axum::{routing::get, routing::post, Json, Router};
use axum::extract::State;
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    config::Config,
    datasource::DataSourceRegistry,
    dispatcher::QueryClient,
    metrics,
    models::DataSourceEntry,
    DashboardError, Result,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub datasources: Arc<DataSourceRegistry>,
    pub client: QueryClient,
}

impl AppState {
    pub fn new(datasources: DataSourceRegistry, client: QueryClient) -> Self {
        Self {
            datasources: Arc::new(datasources),
            client,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let datasources = DataSourceRegistry::new(config.datasources.clone())?;
        for source in datasources.iter().filter(|s| s.insecure_skip_verify) {
            warn!(
                datasource = %source.name,
                url = %source.url,
                "TLS certificate verification is disabled for this data source"
            );
        }
        let client = QueryClient::new(config.upstream_timeout())?;
        Ok(Self::new(datasources, client))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ui::index))
        .route("/query-ui", post(ui::query_ui))
        .route("/query-metric", post(query::query_metric))
        .route("/api/datasources", get(list_datasources))
        .route("/healthz", get(|| async { "OK" }))
        .route("/metrics", get(|| async { metrics::render() }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn list_datasources(State(state): State<AppState>) -> Json<Vec<DataSourceEntry>> {
    Json(state.datasources.iter().cloned().collect())
}

/// Validates the two inputs, resolves the data source and runs the query.
/// Nothing goes over the network unless the data source is registered.
pub(crate) async fn execute(state: &AppState, query: &str, datasource: &str) -> Result<Value> {
    if query.is_empty() {
        return Err(DashboardError::MissingInput("query"));
    }
    if datasource.is_empty() {
        return Err(DashboardError::MissingInput("datasource"));
    }

    let entry = state.datasources.resolve(datasource)?;
    info!(datasource = %entry.name, kind = %entry.kind, "running query: {}", query);
    state.client.instant_query(entry, query).await
}

pub async fn start_server(config: Config) -> Result<()> {
    let state = AppState::from_config(&config)?;
    info!("Loaded {} data sources", state.datasources.len());

    let app = router(state);
    info!("Starting query dashboard on {}", config.listen_addr);

    let listener = TcpListener::bind(&config.listen_addr).await.map_err(|e| {
        DashboardError::Internal(format!("Failed to bind to {}: {}", config.listen_addr, e))
    })?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DashboardError::Internal(format!("Server error: {}", e)))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
