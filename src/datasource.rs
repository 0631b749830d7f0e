//! Read-only registry of the metrics backends a user may query.

use std::collections::HashSet;

use crate::{models::DataSourceEntry, DashboardError, Result};

#[derive(Debug, Clone)]
pub struct DataSourceRegistry {
    entries: Vec<DataSourceEntry>,
}

impl DataSourceRegistry {
    pub fn new(entries: Vec<DataSourceEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(DashboardError::Config(
                "at least one data source must be configured".to_string(),
            ));
        }

        let mut names = HashSet::new();
        let mut urls = HashSet::new();
        for entry in &entries {
            if entry.url.trim().is_empty() {
                return Err(DashboardError::Config(format!(
                    "data source {} has an empty url",
                    entry.name
                )));
            }
            if !names.insert(entry.name.as_str()) {
                return Err(DashboardError::Config(format!(
                    "duplicate data source name: {}",
                    entry.name
                )));
            }
            if !urls.insert(entry.url.as_str()) {
                return Err(DashboardError::Config(format!(
                    "duplicate data source url: {}",
                    entry.url
                )));
            }
        }

        Ok(Self { entries })
    }

    /// Exact-match lookup by URL.
    pub fn resolve(&self, url: &str) -> Result<&DataSourceEntry> {
        self.entries
            .iter()
            .find(|entry| entry.url == url)
            .ok_or(DashboardError::InvalidDataSource)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataSourceEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BackendKind;
    use pretty_assertions::assert_eq;

    fn entry(name: &str, url: &str, kind: BackendKind) -> DataSourceEntry {
        DataSourceEntry {
            name: name.to_string(),
            url: url.to_string(),
            kind,
            insecure_skip_verify: false,
        }
    }

    fn registry() -> DataSourceRegistry {
        DataSourceRegistry::new(vec![
            entry("prom", "http://prom:9090", BackendKind::Prometheus),
            entry("vm", "http://vm:8481", BackendKind::VictoriaMetrics),
        ])
        .unwrap()
    }

    #[test]
    fn test_resolve_exact_match() {
        let registry = registry();
        let found = registry.resolve("http://vm:8481").unwrap();
        assert_eq!(found.name, "vm");
        assert_eq!(found.kind, BackendKind::VictoriaMetrics);
    }

    #[test]
    fn test_resolve_rejects_near_matches() {
        let registry = registry();
        for url in ["http://vm:8481/", "http://vm", "HTTP://VM:8481", " http://vm:8481", ""] {
            assert!(
                matches!(registry.resolve(url), Err(DashboardError::InvalidDataSource)),
                "{url:?} should not resolve"
            );
        }
    }

    #[test]
    fn test_iter_keeps_configuration_order() {
        let names: Vec<_> = registry().iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, vec!["prom", "vm"]);
    }

    #[test]
    fn test_rejects_duplicates_and_empty() {
        assert!(DataSourceRegistry::new(vec![]).is_err());
        assert!(DataSourceRegistry::new(vec![
            entry("a", "http://x", BackendKind::Prometheus),
            entry("a", "http://y", BackendKind::Prometheus),
        ])
        .is_err());
        assert!(DataSourceRegistry::new(vec![
            entry("a", "http://x", BackendKind::Prometheus),
            entry("b", "http://x", BackendKind::VictoriaMetrics),
        ])
        .is_err());
        assert!(DataSourceRegistry::new(vec![entry("a", "  ", BackendKind::Prometheus)]).is_err());
    }
}
