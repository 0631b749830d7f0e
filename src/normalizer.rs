//! Flattens Prometheus instant-query results into table rows.

use serde_json::{Map, Value};

use crate::{
    models::{QueryOutcome, ResultRow},
    DashboardError, Result,
};

pub const EXPRESSION_RESULT: &str = "Expression Result";
pub const NO_INSTANCE: &str = "N/A";

const NAME_LABEL: &str = "__name__";
const INSTANCE_LABEL: &str = "instance";

/// Turns a successful query payload into rows, or [`QueryOutcome::NoData`]
/// when the backend returned nothing.
pub fn outcome(payload: &Value) -> Result<QueryOutcome> {
    let data = payload
        .get("data")
        .ok_or_else(|| DashboardError::UpstreamPayload("Response has no data".to_string()))?;
    let result = data
        .get("result")
        .ok_or_else(|| DashboardError::UpstreamPayload("Response has no result".to_string()))?;
    let result_type = data.get("resultType").and_then(Value::as_str).unwrap_or("vector");

    let rows = match result_type {
        "vector" => {
            let items = result.as_array().ok_or_else(|| {
                DashboardError::UpstreamPayload("Vector result is not an array".to_string())
            })?;
            normalize(items)?
        }
        // A bare [timestamp, value] pair with no labels.
        "scalar" | "string" => {
            let (timestamp_seconds, value) = sample(Some(result))?;
            vec![ResultRow {
                metric_name: EXPRESSION_RESULT.to_string(),
                labels: Vec::new(),
                instance: NO_INSTANCE.to_string(),
                value,
                timestamp_seconds,
            }]
        }
        other => {
            return Err(DashboardError::UpstreamPayload(format!(
                "Unsupported result type: {}",
                other
            )))
        }
    };

    if rows.is_empty() {
        Ok(QueryOutcome::NoData)
    } else {
        Ok(QueryOutcome::Rows(rows))
    }
}

pub fn normalize(result: &[Value]) -> Result<Vec<ResultRow>> {
    result.iter().map(normalize_item).collect()
}

fn normalize_item(item: &Value) -> Result<ResultRow> {
    let empty = Map::new();
    let metric = item.get("metric").and_then(Value::as_object).unwrap_or(&empty);

    let metric_name = metric
        .get(NAME_LABEL)
        .map(label_text)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| EXPRESSION_RESULT.to_string());

    let labels = metric
        .iter()
        .filter(|(key, _)| key.as_str() != NAME_LABEL && key.as_str() != INSTANCE_LABEL)
        .map(|(key, value)| format!("{}=\"{}\"", key, label_text(value)))
        .collect();

    let instance = metric
        .get(INSTANCE_LABEL)
        .map(label_text)
        .unwrap_or_else(|| NO_INSTANCE.to_string());

    let (timestamp_seconds, value) = sample(item.get("value"))?;

    Ok(ResultRow {
        metric_name,
        labels,
        instance,
        value,
        timestamp_seconds,
    })
}

fn label_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Reads a `[timestamp, value]` pair.
fn sample(pair: Option<&Value>) -> Result<(f64, String)> {
    let pair = pair
        .and_then(Value::as_array)
        .filter(|pair| pair.len() >= 2)
        .ok_or_else(|| {
            DashboardError::MalformedResult("expected a [timestamp, value] pair".to_string())
        })?;

    let timestamp = match &pair[0] {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        DashboardError::MalformedResult(format!("timestamp is not numeric: {}", pair[0]))
    })?;

    Ok((timestamp, label_text(&pair[1])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_named_metric_with_instance() {
        let rows = normalize(&[json!({
            "metric": {"__name__": "up", "instance": "a:9100"},
            "value": [1700000000.123, "1"]
        })])
        .unwrap();

        assert_eq!(
            rows,
            vec![ResultRow {
                metric_name: "up".to_string(),
                labels: vec![],
                instance: "a:9100".to_string(),
                value: "1".to_string(),
                timestamp_seconds: 1700000000.123,
            }]
        );
    }

    #[test]
    fn test_expression_without_name() {
        let rows = normalize(&[json!({"metric": {"job": "node"}, "value": [1, "0.5"]})]).unwrap();

        assert_eq!(rows[0].metric_name, EXPRESSION_RESULT);
        assert_eq!(rows[0].labels, vec!["job=\"node\"".to_string()]);
        assert_eq!(rows[0].instance, NO_INSTANCE);
    }

    #[test]
    fn test_labels_keep_received_order() {
        let item: Value = serde_json::from_str(
            r#"{"metric": {"zone": "b", "__name__": "x", "app": "api", "env": "prod"}, "value": [1, "2"]}"#,
        )
        .unwrap();
        let rows = normalize(&[item]).unwrap();

        assert_eq!(rows[0].labels, vec!["zone=\"b\"", "app=\"api\"", "env=\"prod\""]);
    }

    #[test]
    fn test_one_row_per_item_in_order() {
        let items: Vec<Value> = (0..5)
            .map(|i| json!({"metric": {"__name__": format!("m{}", i)}, "value": [i, i.to_string()]}))
            .collect();
        let rows = normalize(&items).unwrap();

        let names: Vec<_> = rows.iter().map(|r| r.metric_name.as_str()).collect();
        assert_eq!(names, vec!["m0", "m1", "m2", "m3", "m4"]);
        assert_eq!(rows[3].timestamp_seconds, 3.0);
        assert_eq!(rows[3].value, "3");
    }

    #[test]
    fn test_missing_metric_and_empty_name() {
        let rows = normalize(&[
            json!({"value": [1, "7"]}),
            json!({"metric": {"__name__": ""}, "value": [1, "8"]}),
        ])
        .unwrap();

        assert_eq!(rows[0].metric_name, EXPRESSION_RESULT);
        assert!(rows[0].labels.is_empty());
        assert_eq!(rows[1].metric_name, EXPRESSION_RESULT);
    }

    #[test]
    fn test_malformed_sample_pair() {
        for item in [
            json!({"metric": {}}),
            json!({"metric": {}, "value": []}),
            json!({"metric": {}, "value": [1]}),
            json!({"metric": {}, "value": "1"}),
            json!({"metric": {}, "value": [null, "1"]}),
        ] {
            assert!(
                matches!(normalize(&[item.clone()]), Err(DashboardError::MalformedResult(_))),
                "{item} should be rejected"
            );
        }
    }

    #[test]
    fn test_outcome_no_data() {
        let payload = json!({"status": "success", "data": {"resultType": "vector", "result": []}});
        assert_eq!(outcome(&payload).unwrap(), QueryOutcome::NoData);
    }

    #[test]
    fn test_outcome_scalar() {
        let payload = json!({"status": "success", "data": {"resultType": "scalar", "result": [1700000000, "2"]}});
        match outcome(&payload).unwrap() {
            QueryOutcome::Rows(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].metric_name, EXPRESSION_RESULT);
                assert_eq!(rows[0].value, "2");
            }
            QueryOutcome::NoData => panic!("scalar result should produce a row"),
        }
    }

    #[test]
    fn test_outcome_rejects_missing_result_and_matrix() {
        let missing = json!({"status": "success", "data": {}});
        assert!(matches!(outcome(&missing), Err(DashboardError::UpstreamPayload(_))));

        let matrix = json!({"status": "success", "data": {"resultType": "matrix", "result": []}});
        assert!(matches!(outcome(&matrix), Err(DashboardError::UpstreamPayload(_))));
    }
}
