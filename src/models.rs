use serde::{Deserialize, Serialize};
use std::fmt;

/// Which flavour of Prometheus HTTP API a data source speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Prometheus,
    #[serde(alias = "victoria")]
    VictoriaMetrics,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Prometheus => write!(f, "prometheus"),
            BackendKind::VictoriaMetrics => write!(f, "victoriametrics"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceEntry {
    pub name: String,
    pub url: String,
    pub kind: BackendKind,
    #[serde(default, skip_serializing)]
    pub insecure_skip_verify: bool,
}

/// Body accepted by `POST /query-metric` and `POST /query-ui`.
#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub datasource: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub metric_name: String,
    pub labels: Vec<String>,
    pub instance: String,
    pub value: String,
    pub timestamp_seconds: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Rows(Vec<ResultRow>),
    NoData,
}
