//! JSON API handlers
//!
//! Every endpoint that touches sheet data answers fetch failures with
//! HTTP 400 and an `{"error": ...}` body. Pipeline failures never fail
//! the request; they surface as an `error` field next to the data.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::ViewerError;
use crate::pipeline::{
    self, detect_timestamp_columns, validate_timestamp_column, SortOrder, TableQuery, TableView,
};
use crate::server::{markup, AppState};

/// Query parameters of `/api/data` and the index page
#[derive(Debug, Default, Deserialize)]
pub struct DataParams {
    pub q: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub group_by_period: Option<String>,
    pub timestamp_column: Option<String>,
    pub dedupe_column: Option<String>,
    pub dedupe_timestamp_column: Option<String>,
    pub sort_column: Option<String>,
    pub sort_order: Option<String>,
    pub sheet: Option<String>,
}

impl DataParams {
    /// Convert request parameters into a pipeline query
    pub fn to_query(&self, default_page_size: usize) -> TableQuery {
        TableQuery {
            search: self.q.clone(),
            group_by_period: self.group_by_period.clone(),
            timestamp_column: self.timestamp_column.clone(),
            dedupe_column: self.dedupe_column.clone(),
            dedupe_timestamp_column: self.dedupe_timestamp_column.clone(),
            sort_column: self.sort_column.clone(),
            sort_order: SortOrder::parse_param(self.sort_order.as_deref().unwrap_or("")),
            page: self.page.unwrap_or(1),
            page_size: self
                .page_size
                .map(|size| size.max(0) as usize)
                .unwrap_or(default_page_size),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SheetParams {
    pub sheet: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateParams {
    pub column: String,
    pub sheet: Option<String>,
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "sheets": state.source.sheets().len(),
    }))
}

pub async fn sheets(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "sheets": state.source.sheets() }))
}

pub async fn data(State(state): State<AppState>, Query(params): Query<DataParams>) -> Response {
    let table = match state.source.fetch_table(params.sheet.as_deref()).await {
        Ok(table) => table,
        Err(err) => return fetch_error(err),
    };
    let view = pipeline::apply_query(table, &params.to_query(state.page_size_default));
    let rows = rendered_rows(&view);

    let mut body = json!({
        "total": view.total,
        "page": view.page,
        "page_size": view.page_size,
        "pages": view.pages,
        "columns": &view.table.columns,
        "rows": rows,
        "grouped": view.grouped,
        "deduplicated": view.deduplicated,
        "duplicates_removed": view.duplicates_removed,
        "original_count": view.original_count,
        "search_term": &view.search_term,
    });
    if let Some(error) = &view.error {
        body["error"] = json!(error);
    }
    Json(body).into_response()
}

pub async fn columns(State(state): State<AppState>, Query(params): Query<SheetParams>) -> Response {
    let table = match state.source.fetch_table(params.sheet.as_deref()).await {
        Ok(table) => table,
        Err(err) => return fetch_error(err),
    };
    let timestamp_columns = detect_timestamp_columns(&table);
    Json(json!({
        "columns": table.columns,
        "timestamp_columns": timestamp_columns,
    }))
    .into_response()
}

pub async fn validate_timestamp(
    State(state): State<AppState>,
    Query(params): Query<ValidateParams>,
) -> Response {
    let table = match state.source.fetch_table(params.sheet.as_deref()).await {
        Ok(table) => table,
        Err(err) => return fetch_error(err),
    };
    let validation = validate_timestamp_column(&table, &params.column);
    Json(json!({
        "valid": validation.valid,
        "message": validation.message,
        "column": params.column,
    }))
    .into_response()
}

/// Rows for the JSON body, decorated only while a search is active
fn rendered_rows(view: &TableView) -> Vec<Map<String, Value>> {
    let mut records = view.table.to_records();
    if let Some(term) = view.search_term.as_deref() {
        for record in &mut records {
            for value in record.values_mut() {
                *value = json!(markup::decorate_cell(&value_text(value), Some(term)));
            }
        }
    }
    records
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn fetch_error(err: ViewerError) -> Response {
    tracing::warn!("sheet fetch failed: {}", err);
    (StatusCode::BAD_REQUEST, Json(json!({ "error": err.to_string() }))).into_response()
}
