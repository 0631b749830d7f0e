use axum::{extract::State, response::Html, Form};

use super::{execute, AppState};
use crate::{
    metrics,
    models::{QueryOutcome, QueryRequest},
    normalizer,
    render::{PageBody, QueryPage},
};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(QueryPage::empty(&state.datasources).render())
}

/// `POST /query-ui`: every outcome, failures included, renders as a page.
pub async fn query_ui(State(state): State<AppState>, Form(form): Form<QueryRequest>) -> Html<String> {
    let query = form.query.unwrap_or_default().trim().to_string();
    let datasource = form.datasource.unwrap_or_default().trim().to_string();

    let outcome = execute(&state, &query, &datasource)
        .await
        .and_then(|payload| normalizer::outcome(&payload));

    let body = match outcome {
        Ok(QueryOutcome::Rows(rows)) => {
            metrics::record_query("ui", "ok");
            PageBody::Rows(rows)
        }
        Ok(QueryOutcome::NoData) => {
            metrics::record_query("ui", "no_data");
            PageBody::NoData
        }
        Err(e) => {
            metrics::record_query("ui", e.kind());
            PageBody::Error(e.to_string())
        }
    };

    let page = QueryPage {
        datasources: &state.datasources,
        query,
        selected: Some(datasource).filter(|d| !d.is_empty()),
        body,
    };
    Html(page.render())
}
