use serde::Deserialize;
use std::{path::Path, time::Duration};

use crate::{
    models::{BackendKind, DataSourceEntry},
    DashboardError, Result,
};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5005";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,

    #[serde(default)]
    pub datasources: Vec<DataSourceEntry>,
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    DEFAULT_UPSTREAM_TIMEOUT_SECS
}

impl Default for Config {
    /// Local development setup: one backend of each kind on localhost.
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            upstream_timeout_secs: default_upstream_timeout_secs(),
            datasources: vec![
                DataSourceEntry {
                    name: "prometheus-local".to_string(),
                    url: "http://localhost:9090".to_string(),
                    kind: BackendKind::Prometheus,
                    insecure_skip_verify: false,
                },
                DataSourceEntry {
                    name: "victoriametrics-local".to_string(),
                    url: "http://localhost:8481".to_string(),
                    kind: BackendKind::VictoriaMetrics,
                    insecure_skip_verify: false,
                },
            ],
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        if config.upstream_timeout_secs == 0 {
            return Err(DashboardError::Config(
                "upstream_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}
