use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use tavola::error::{ViewerError, ViewerResult};
use tavola::server::{router, AppState};
use tavola::source::{SheetInfo, TableSource};
use tavola::table::{Cell, Table};

/// Serves a fixed table under the sheet name "orders"
struct FixtureSource {
    table: Table,
    fail: bool,
}

#[async_trait]
impl TableSource for FixtureSource {
    async fn fetch_table(&self, sheet: Option<&str>) -> ViewerResult<Table> {
        if self.fail {
            return Err(ViewerError::fetch_failed("orders", "backend offline"));
        }
        if let Some(name) = sheet.filter(|name| !name.is_empty()) {
            if name != "orders" {
                return Err(ViewerError::SheetNotFound(name.to_string()));
            }
        }
        Ok(self.table.clone())
    }

    fn sheets(&self) -> Vec<SheetInfo> {
        vec![SheetInfo {
            name: "orders".to_string(),
            display_name: "orders".to_string(),
        }]
    }
}

fn fixture_table() -> Table {
    Table::from_rows(
        vec![
            "Name".to_string(),
            "Updated".to_string(),
            "Link".to_string(),
        ],
        vec![
            vec![
                Cell::from("alice"),
                Cell::from("2024-03-01 10:00:00"),
                Cell::from("https://tickets.example.com/1"),
            ],
            vec![
                Cell::from("bob"),
                Cell::from("2024-03-01 12:00:00"),
                Cell::Null,
            ],
            vec![
                Cell::from("alice"),
                Cell::from("2024-03-02 09:30:00"),
                Cell::from("https://tickets.example.com/7"),
            ],
            vec![
                Cell::from("carol"),
                Cell::from("2024-03-04 16:45:00"),
                Cell::Null,
            ],
        ],
    )
}

fn app() -> Router {
    app_with(fixture_table(), false)
}

fn app_with(table: Table, fail: bool) -> Router {
    router(AppState {
        source: Arc::new(FixtureSource { table, fail }),
        page_size_default: 25,
    })
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

async fn get_html(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health_reports_sheet_count() {
    let (status, body) = get_json(app(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "sheets": 1 }));
}

#[tokio::test]
async fn test_sheets_lists_configured_sheets() {
    let (status, body) = get_json(app(), "/api/sheets").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "sheets": [{ "name": "orders", "display_name": "orders" }] })
    );
}

#[tokio::test]
async fn test_data_returns_all_rows_by_default() {
    let (status, body) = get_json(app(), "/api/data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(4));
    assert_eq!(body["page"], json!(1));
    assert_eq!(body["pages"], json!(1));
    assert_eq!(body["columns"], json!(["Name", "Updated", "Link"]));
    assert_eq!(body["rows"][0]["Name"], json!("alice"));
    assert_eq!(body["rows"][1]["Link"], json!(null));
    assert_eq!(body["grouped"], json!(false));
    assert_eq!(body["deduplicated"], json!(false));
    assert_eq!(body["search_term"], json!(null));
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_data_search_filters_and_decorates() {
    let (status, body) = get_json(app(), "/api/data?q=alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(2));
    assert_eq!(body["search_term"], json!("alice"));

    let name = body["rows"][0]["Name"].as_str().unwrap();
    assert!(name.contains("<mark"));
    let link = body["rows"][0]["Link"].as_str().unwrap();
    assert!(link.contains("<a href=\"https://tickets.example.com/1\""));
}

#[tokio::test]
async fn test_data_groups_by_day() {
    let (status, body) = get_json(
        app(),
        "/api/data?group_by_period=day&timestamp_column=Updated",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["grouped"], json!(true));
    assert_eq!(body["total"], json!(3));
    assert_eq!(body["columns"][0], json!("Day_Group"));
    // Newest day first
    assert_eq!(body["rows"][0]["Day_Group"], json!("2024-03-04"));
    assert_eq!(body["rows"][2]["Day_Group"], json!("2024-03-01"));
    assert_eq!(body["rows"][2]["Name"], json!(2));
}

#[tokio::test]
async fn test_data_dedupes_to_latest_row() {
    let (status, body) = get_json(
        app(),
        "/api/data?dedupe_column=Name&dedupe_timestamp_column=Updated",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deduplicated"], json!(true));
    assert_eq!(body["duplicates_removed"], json!(1));
    assert_eq!(body["total"], json!(3));
    assert_eq!(body["original_count"], json!(4));
    // Most recent rows first
    assert_eq!(body["rows"][0]["Name"], json!("carol"));
}

#[tokio::test]
async fn test_data_reports_invalid_period_with_data() {
    let (status, body) = get_json(
        app(),
        "/api/data?group_by_period=month&timestamp_column=Updated",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["error"],
        json!("Invalid grouping period 'month'. Must be 'day' or 'week'")
    );
    assert_eq!(body["grouped"], json!(false));
    assert_eq!(body["total"], json!(4));
}

#[tokio::test]
async fn test_data_pagination_meta() {
    let (status, body) = get_json(app(), "/api/data?page=2&page_size=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(4));
    assert_eq!(body["page"], json!(2));
    assert_eq!(body["page_size"], json!(3));
    assert_eq!(body["pages"], json!(2));
    assert_eq!(body["rows"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_data_fetch_failure_returns_400() {
    let (status, body) = get_json(app_with(fixture_table(), true), "/api/data").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Error loading sheet 'orders': backend offline" })
    );
}

#[tokio::test]
async fn test_data_unknown_sheet_returns_400() {
    let (status, body) = get_json(app(), "/api/data?sheet=missing").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Sheet 'missing' not found in configuration" })
    );
}

#[tokio::test]
async fn test_columns_lists_detected_timestamp_columns() {
    let (status, body) = get_json(app(), "/api/columns").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["columns"], json!(["Name", "Updated", "Link"]));
    assert_eq!(body["timestamp_columns"], json!(["Updated"]));
}

#[tokio::test]
async fn test_validate_timestamp_accepts_good_column() {
    let (status, body) = get_json(app(), "/api/validate-timestamp?column=Updated").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], json!(true));
    assert_eq!(body["column"], json!("Updated"));
    assert_eq!(
        body["message"],
        json!("Column 'Updated' validated successfully (100.0% valid timestamps)")
    );
}

#[tokio::test]
async fn test_validate_timestamp_rejects_text_column() {
    let (status, body) = get_json(app(), "/api/validate-timestamp?column=Name").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], json!(false));
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("insufficient valid timestamp data"));
}

#[tokio::test]
async fn test_validate_timestamp_unknown_column() {
    let (status, body) = get_json(app(), "/api/validate-timestamp?column=Nope").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], json!(false));
    assert_eq!(body["message"], json!("Column 'Nope' not found in the data"));
}

#[tokio::test]
async fn test_index_page_renders_table() {
    let (status, html) = get_html(app(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<th>Name</th>"));
    assert!(html.contains("<td>alice</td>"));
    assert!(html.contains("4 rows"));
}

#[tokio::test]
async fn test_index_page_highlights_search() {
    let (status, html) = get_html(app(), "/?q=carol").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<mark"));
    assert!(!html.contains("<td>bob</td>"));
}

#[tokio::test]
async fn test_index_page_shows_fetch_error() {
    let (status, html) = get_html(app_with(fixture_table(), true), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("class=\"error\""));
    assert!(html.contains("Error loading sheet &#39;orders&#39;: backend offline"));
}
