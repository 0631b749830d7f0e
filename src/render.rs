//! HTML rendering of the query page.

use chrono::{DateTime, Utc};

use crate::{datasource::DataSourceRegistry, models::ResultRow};

/// What the area below the form shows.
#[derive(Debug, Clone, PartialEq)]
pub enum PageBody {
    Empty,
    Error(String),
    NoData,
    Rows(Vec<ResultRow>),
}

pub struct QueryPage<'a> {
    pub datasources: &'a DataSourceRegistry,
    pub query: String,
    pub selected: Option<String>,
    pub body: PageBody,
}

impl<'a> QueryPage<'a> {
    pub fn empty(datasources: &'a DataSourceRegistry) -> Self {
        Self {
            datasources,
            query: String::new(),
            selected: None,
            body: PageBody::Empty,
        }
    }

    pub fn render(&self) -> String {
        let mut html = String::with_capacity(8_192);

        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"UTF-8\">\n");
        html.push_str("<title>Prometheus Query UI</title>\n");
        html.push_str(
            "<link href=\"https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css\" \
             rel=\"stylesheet\">\n",
        );
        push_style(&mut html);
        html.push_str("</head>\n<body class=\"bg-light py-5\">\n<div class=\"container\">\n");
        html.push_str("<h2 class=\"mb-4 text-center\">Monitoring Query Dashboard</h2>\n");

        self.push_form(&mut html);

        match &self.body {
            PageBody::Empty => {}
            PageBody::Error(message) => {
                html.push_str(&format!(
                    "<div class=\"alert alert-danger\" role=\"alert\">{}</div>\n",
                    html_escape(message)
                ));
            }
            PageBody::NoData => {
                html.push_str(
                    "<div class=\"alert alert-warning\" role=\"alert\">No data found for this query.</div>\n",
                );
            }
            PageBody::Rows(rows) => self.push_table(&mut html, rows),
        }

        html.push_str("</div>\n</body>\n</html>\n");
        html
    }

    fn push_form(&self, html: &mut String) {
        html.push_str("<form method=\"POST\" action=\"/query-ui\" class=\"mb-4\">\n");
        html.push_str(&format!(
            "<div class=\"form-floating mb-3\">\
             <input type=\"text\" class=\"form-control\" id=\"queryInput\" name=\"query\" \
             placeholder=\"Type PromQL query here...\" value=\"{}\">\
             <label for=\"queryInput\">Query</label></div>\n",
            html_escape(&self.query)
        ));
        html.push_str(
            "<div class=\"form-floating mb-3\">\
             <select class=\"form-select\" id=\"datasourceSelect\" name=\"datasource\" required>\n",
        );
        for source in self.datasources.iter() {
            let selected = if self.selected.as_deref() == Some(source.url.as_str()) {
                " selected"
            } else {
                ""
            };
            html.push_str(&format!(
                "<option value=\"{}\"{}>{}</option>\n",
                html_escape(&source.url),
                selected,
                html_escape(&source.name)
            ));
        }
        html.push_str("</select><label for=\"datasourceSelect\">Data Source</label></div>\n");
        html.push_str("<button type=\"submit\" class=\"btn btn-primary\">Run Query</button>\n");
        html.push_str("</form>\n");
    }

    fn push_table(&self, html: &mut String, rows: &[ResultRow]) {
        html.push_str(&format!(
            "<div class=\"card shadow\">\n<div class=\"card-header bg-dark text-white\">\
             <strong>Query Result</strong> <span class=\"float-end\"><code>{}</code></span></div>\n",
            html_escape(&self.query)
        ));
        html.push_str(
            "<div class=\"card-body p-0\">\n<table class=\"table table-bordered table-hover mb-0\">\n\
             <thead class=\"table-light\"><tr>\
             <th>Metric</th><th>Labels</th><th>Instance</th><th>Value</th><th>Timestamp</th>\
             </tr></thead>\n<tbody>\n",
        );
        for row in rows {
            let badges: String = row
                .labels
                .iter()
                .map(|label| format!("<span class=\"label-badge\">{}</span>", html_escape(label)))
                .collect();
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                html_escape(&row.metric_name),
                badges,
                html_escape(&row.instance),
                html_escape(&row.value),
                format_timestamp(row.timestamp_seconds),
            ));
        }
        html.push_str("</tbody>\n</table>\n</div>\n</div>\n");
    }
}

fn push_style(html: &mut String) {
    html.push_str("<style>\n");
    html.push_str(
        ".label-badge{display:inline-block;background-color:#f0f0f0;border-radius:4px;\
         padding:2px 6px;margin:2px;font-size:0.8rem}\n",
    );
    html.push_str("code{font-size:0.9rem;background-color:#eee;padding:2px 4px;border-radius:4px}\n");
    html.push_str(".ts-utc{display:block;font-size:0.75rem;color:#777}\n");
    html.push_str("</style>\n");
}

/// Raw seconds, plus a UTC rendering when the value is a valid instant.
fn format_timestamp(seconds: f64) -> String {
    if !seconds.is_finite() {
        return seconds.to_string();
    }
    let secs = seconds.floor();
    let nanos = ((seconds - secs) * 1e9).round().min(999_999_999.0) as u32;
    match DateTime::<Utc>::from_timestamp(secs as i64, nanos) {
        Some(at) => format!(
            "{}<span class=\"ts-utc\">{}</span>",
            seconds,
            at.format("%Y-%m-%d %H:%M:%S%.3f UTC")
        ),
        None => seconds.to_string(),
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BackendKind, DataSourceEntry};
    use pretty_assertions::assert_eq;

    fn registry() -> DataSourceRegistry {
        DataSourceRegistry::new(vec![
            DataSourceEntry {
                name: "prom".to_string(),
                url: "http://prom:9090".to_string(),
                kind: BackendKind::Prometheus,
                insecure_skip_verify: false,
            },
            DataSourceEntry {
                name: "vm".to_string(),
                url: "http://vm:8481".to_string(),
                kind: BackendKind::VictoriaMetrics,
                insecure_skip_verify: false,
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_page_lists_sources() {
        let registry = registry();
        let html = QueryPage::empty(&registry).render();

        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("<option value=\"http://prom:9090\">prom</option>"));
        assert!(html.contains("<option value=\"http://vm:8481\">vm</option>"));
        assert!(!html.contains("alert"));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn test_selected_source_and_query_echoed() {
        let registry = registry();
        let page = QueryPage {
            datasources: &registry,
            query: "rate(http_requests_total{code=\"500\"}[5m])".to_string(),
            selected: Some("http://vm:8481".to_string()),
            body: PageBody::NoData,
        };
        let html = page.render();

        assert!(html.contains("<option value=\"http://vm:8481\" selected>vm</option>"));
        assert!(html.contains("value=\"rate(http_requests_total{code=&quot;500&quot;}[5m])\""));
        assert!(html.contains("No data found for this query."));
        assert!(!html.contains("alert-danger"));
    }

    #[test]
    fn test_error_banner_is_escaped() {
        let registry = registry();
        let page = QueryPage {
            datasources: &registry,
            query: "up".to_string(),
            selected: None,
            body: PageBody::Error("Error: 502 - <html>bad gateway</html>".to_string()),
        };
        let html = page.render();

        assert!(html.contains("alert-danger"));
        assert!(html.contains("&lt;html&gt;bad gateway&lt;/html&gt;"));
        assert!(!html.contains("<html>bad gateway"));
    }

    #[test]
    fn test_rows_render_as_table() {
        let registry = registry();
        let page = QueryPage {
            datasources: &registry,
            query: "up".to_string(),
            selected: Some("http://prom:9090".to_string()),
            body: PageBody::Rows(vec![ResultRow {
                metric_name: "up".to_string(),
                labels: vec!["job=\"node\"".to_string()],
                instance: "a:9100".to_string(),
                value: "1".to_string(),
                timestamp_seconds: 0.5,
            }]),
        };
        let html = page.render();

        assert!(html.contains("<table"));
        assert!(html.contains("<span class=\"label-badge\">job=&quot;node&quot;</span>"));
        assert!(html.contains("<td>a:9100</td>"));
        assert!(html.contains("1970-01-01 00:00:00.500 UTC"));
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<b>\"hi\" & 'bye'</b>"), "&lt;b&gt;&quot;hi&quot; &amp; &#39;bye&#39;&lt;/b&gt;");
    }
}
