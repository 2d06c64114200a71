//! Server-rendered index page
//!
//! One GET endpoint renders the whole viewer: sheet tabs, the control
//! form, the transformed table and pagination links. The page accepts the
//! same query parameters as `/api/data`, so every view has a shareable
//! URL.

use axum::extract::{Query, State};
use axum::response::Html;

use crate::pipeline::{self, detect_timestamp_columns, TableView};
use crate::server::api::DataParams;
use crate::server::markup::{decorate_cell, escape_html};
use crate::server::AppState;
use crate::source::SheetInfo;

const PAGE_CSS: &str = "\
body { font-family: system-ui, sans-serif; margin: 1.5rem; color: #222; }\
h1 { font-size: 1.3rem; margin: 0 0 1rem; }\
nav.tabs { margin-bottom: 1rem; }\
nav.tabs a { display: inline-block; padding: 0.3rem 0.8rem; margin-right: 0.3rem; \
border: 1px solid #ccc; border-radius: 4px 4px 0 0; text-decoration: none; color: #333; }\
nav.tabs a.active { background: #333; color: #fff; border-color: #333; }\
form.controls { display: flex; flex-wrap: wrap; gap: 0.8rem; align-items: end; \
margin-bottom: 1rem; padding: 0.8rem; background: #f6f6f6; border-radius: 4px; }\
form.controls label { display: flex; flex-direction: column; font-size: 0.8rem; gap: 0.2rem; }\
form.controls input, form.controls select { padding: 0.25rem 0.4rem; }\
.error { background: #fdecea; color: #b3261e; padding: 0.6rem 0.8rem; \
border-radius: 4px; margin-bottom: 1rem; }\
.meta { color: #666; font-size: 0.85rem; margin-bottom: 0.5rem; }\
table { border-collapse: collapse; width: 100%; }\
th, td { border: 1px solid #ddd; padding: 0.35rem 0.55rem; text-align: left; \
font-size: 0.9rem; vertical-align: top; }\
th { background: #f0f0f0; }\
tr:nth-child(even) td { background: #fafafa; }\
.pagination { margin-top: 0.8rem; display: flex; gap: 0.8rem; align-items: center; }\
.pagination .disabled { color: #aaa; }\
.empty { color: #666; font-style: italic; }";

pub async fn index(State(state): State<AppState>, Query(params): Query<DataParams>) -> Html<String> {
    let sheets = state.source.sheets();
    let current_sheet = params
        .sheet
        .as_deref()
        .filter(|name| !name.is_empty())
        .map(String::from)
        .or_else(|| sheets.first().map(|info| info.name.clone()))
        .unwrap_or_default();

    let table = match state.source.fetch_table(params.sheet.as_deref()).await {
        Ok(table) => table,
        Err(err) => {
            return Html(render_error_page(&err.to_string(), &sheets, &current_sheet));
        }
    };

    let all_columns = table.columns.clone();
    let timestamp_columns = detect_timestamp_columns(&table);
    let view = pipeline::apply_query(table, &params.to_query(state.page_size_default));

    Html(render_index(
        &params,
        &view,
        &sheets,
        &current_sheet,
        &all_columns,
        &timestamp_columns,
    ))
}

fn render_index(
    params: &DataParams,
    view: &TableView,
    sheets: &[SheetInfo],
    current_sheet: &str,
    all_columns: &[String],
    timestamp_columns: &[String],
) -> String {
    let mut body = String::new();
    body.push_str("<h1>Tavola</h1>");
    body.push_str(&render_sheet_tabs(sheets, current_sheet));
    body.push_str(&render_controls(
        params,
        view,
        current_sheet,
        all_columns,
        timestamp_columns,
    ));
    if let Some(error) = &view.error {
        body.push_str(&format!("<div class=\"error\">{}</div>", escape_html(error)));
    }
    body.push_str(&render_meta(view));
    body.push_str(&render_table(view));
    body.push_str(&render_pagination(params, view));
    page_shell(current_sheet, &body)
}

fn render_error_page(message: &str, sheets: &[SheetInfo], current_sheet: &str) -> String {
    let mut body = String::new();
    body.push_str("<h1>Tavola</h1>");
    body.push_str(&render_sheet_tabs(sheets, current_sheet));
    body.push_str(&format!("<div class=\"error\">{}</div>", escape_html(message)));
    body.push_str("<p><a href=\"/\">Back to the default sheet</a></p>");
    page_shell("Error", &body)
}

fn page_shell(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        PAGE_CSS,
        body
    )
}

fn render_sheet_tabs(sheets: &[SheetInfo], current_sheet: &str) -> String {
    if sheets.len() <= 1 {
        return String::new();
    }
    let mut out = String::from("<nav class=\"tabs\">");
    for info in sheets {
        let class = if info.name == current_sheet {
            " class=\"active\""
        } else {
            ""
        };
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query.append_pair("sheet", &info.name);
        out.push_str(&format!(
            "<a{} href=\"/?{}\">{}</a>",
            class,
            escape_html(&query.finish()),
            escape_html(&info.display_name)
        ));
    }
    out.push_str("</nav>");
    out
}

fn render_controls(
    params: &DataParams,
    view: &TableView,
    current_sheet: &str,
    all_columns: &[String],
    timestamp_columns: &[String],
) -> String {
    let search = params.q.as_deref().unwrap_or("");
    let period = params.group_by_period.as_deref().unwrap_or("");
    let order = params
        .sort_order
        .as_deref()
        .map(|value| value.trim().to_lowercase())
        .unwrap_or_default();

    let mut out = String::from("<form method=\"get\" action=\"/\" class=\"controls\">");
    out.push_str(&format!(
        "<input type=\"hidden\" name=\"sheet\" value=\"{}\">",
        escape_html(current_sheet)
    ));
    out.push_str(&format!(
        "<label>Search <input type=\"text\" name=\"q\" value=\"{}\" \
         placeholder=\"Search all columns\"></label>",
        escape_html(search)
    ));
    out.push_str(&format!(
        "<label>Group by <select name=\"group_by_period\">\
         <option value=\"\">No grouping</option>\
         <option value=\"day\"{}>Day</option>\
         <option value=\"week\"{}>Week</option>\
         </select></label>",
        selected_if(period == "day"),
        selected_if(period == "week")
    ));
    out.push_str(&format!(
        "<label>Timestamp column <select name=\"timestamp_column\">{}</select></label>",
        render_options(timestamp_columns, params.timestamp_column.as_deref())
    ));
    out.push_str(&format!(
        "<label>Dedupe by <select name=\"dedupe_column\">{}</select></label>",
        render_options(all_columns, params.dedupe_column.as_deref())
    ));
    out.push_str(&format!(
        "<label>Dedupe timestamp <select name=\"dedupe_timestamp_column\">{}</select></label>",
        render_options(timestamp_columns, params.dedupe_timestamp_column.as_deref())
    ));
    out.push_str(&format!(
        "<label>Sort by <select name=\"sort_column\">{}</select></label>",
        render_options(timestamp_columns, params.sort_column.as_deref())
    ));
    out.push_str(&format!(
        "<label>Order <select name=\"sort_order\">\
         <option value=\"desc\"{}>Newest first</option>\
         <option value=\"asc\"{}>Oldest first</option>\
         </select></label>",
        selected_if(order != "asc"),
        selected_if(order == "asc")
    ));
    out.push_str(&format!(
        "<label>Page size <input type=\"number\" name=\"page_size\" min=\"1\" value=\"{}\"></label>",
        view.page_size
    ));
    out.push_str("<button type=\"submit\">Apply</button>");
    out.push_str(&format!(
        "<a class=\"reset\" href=\"/?{}\">Reset</a>",
        escape_html(&sheet_query(current_sheet))
    ));
    out.push_str("</form>");
    out
}

fn sheet_query(sheet: &str) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("sheet", sheet);
    query.finish()
}

fn selected_if(condition: bool) -> &'static str {
    if condition {
        " selected"
    } else {
        ""
    }
}

fn render_options(values: &[String], selected: Option<&str>) -> String {
    let mut out = String::from("<option value=\"\">(none)</option>");
    for value in values {
        let escaped = escape_html(value);
        out.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>",
            escaped,
            selected_if(selected == Some(value.as_str())),
            escaped
        ));
    }
    out
}

fn render_meta(view: &TableView) -> String {
    let mut parts = vec![format!("{} rows", view.total)];
    if view.deduplicated {
        parts.push(format!(
            "deduplicated, {} duplicates removed",
            view.duplicates_removed
        ));
    }
    if view.grouped {
        parts.push("grouped".to_string());
    }
    if let Some(term) = &view.search_term {
        parts.push(format!("matching \"{}\"", escape_html(term)));
    }
    if view.total != view.original_count {
        parts.push(format!("from {} fetched", view.original_count));
    }
    format!("<div class=\"meta\">{}</div>", parts.join(" &middot; "))
}

fn render_table(view: &TableView) -> String {
    if view.table.columns.is_empty() {
        return "<p class=\"empty\">No data available</p>".to_string();
    }
    let mut out = String::from("<table><thead><tr>");
    for column in &view.table.columns {
        out.push_str(&format!("<th>{}</th>", escape_html(column)));
    }
    out.push_str("</tr></thead><tbody>");
    if view.table.rows.is_empty() {
        out.push_str(&format!(
            "<tr><td colspan=\"{}\" class=\"empty\">No rows to show</td></tr>",
            view.table.columns.len()
        ));
    }
    for row in &view.table.rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str(&format!(
                "<td>{}</td>",
                decorate_cell(&cell.as_text(), view.search_term.as_deref())
            ));
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
}

fn render_pagination(params: &DataParams, view: &TableView) -> String {
    if view.pages <= 1 {
        return String::new();
    }
    let current = view.page.max(1);
    let mut out = String::from("<div class=\"pagination\">");
    if current > 1 {
        out.push_str(&format!(
            "<a href=\"{}\">&larr; Prev</a>",
            escape_html(&page_href(params, current - 1))
        ));
    } else {
        out.push_str("<span class=\"disabled\">&larr; Prev</span>");
    }
    out.push_str(&format!("<span>Page {} of {}</span>", current, view.pages));
    if (current as usize) < view.pages {
        out.push_str(&format!(
            "<a href=\"{}\">Next &rarr;</a>",
            escape_html(&page_href(params, current + 1))
        ));
    } else {
        out.push_str("<span class=\"disabled\">Next &rarr;</span>");
    }
    out.push_str("</div>");
    out
}

/// Link to another page of the current view, all other parameters kept
fn page_href(params: &DataParams, page: i64) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in [
        ("sheet", &params.sheet),
        ("q", &params.q),
        ("group_by_period", &params.group_by_period),
        ("timestamp_column", &params.timestamp_column),
        ("dedupe_column", &params.dedupe_column),
        ("dedupe_timestamp_column", &params.dedupe_timestamp_column),
        ("sort_column", &params.sort_column),
        ("sort_order", &params.sort_order),
    ] {
        if let Some(value) = value {
            if !value.trim().is_empty() {
                query.append_pair(key, value);
            }
        }
    }
    if let Some(size) = params.page_size {
        query.append_pair("page_size", &size.to_string());
    }
    query.append_pair("page", &page.to_string());
    format!("/?{}", query.finish())
}
