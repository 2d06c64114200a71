//! Google Sheets backend
//!
//! Fetches sheet values through the public REST endpoint
//! (`GET {base}/{sheet_id}/values/{tab}`) and converts the raw value grid
//! into a [`Table`]. The first row supplies column names; blank header
//! cells fall back to positional `Column<N>` names.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::config::SheetConfig;
use crate::error::{ViewerError, ViewerResult};
use crate::source::{SheetInfo, TableSource};
use crate::table::{Cell, Table};

const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// HTTP client for the Sheets values endpoint
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
    sheets: Vec<SheetConfig>,
}

/// Response body of the values endpoint
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl SheetsClient {
    /// Create a client for the given sheet configurations
    ///
    /// `api_base` falls back to the public Google endpoint when empty.
    pub fn new(
        api_base: &str,
        api_key: Option<String>,
        sheets: Vec<SheetConfig>,
    ) -> ViewerResult<Self> {
        let base = if api_base.trim().is_empty() {
            DEFAULT_API_BASE
        } else {
            api_base
        };
        let base_url = Url::parse(base).map_err(|e| {
            ViewerError::ConfigError(format!("Invalid sheets API base URL '{}': {}", base, e))
        })?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            sheets,
        })
    }

    fn resolve(&self, sheet: Option<&str>) -> ViewerResult<&SheetConfig> {
        match sheet.filter(|name| !name.is_empty()) {
            Some(name) => self
                .sheets
                .iter()
                .find(|config| config.name == name)
                .ok_or_else(|| ViewerError::SheetNotFound(name.to_string())),
            None => self
                .sheets
                .first()
                .ok_or_else(|| ViewerError::ConfigError("No sheets configured".to_string())),
        }
    }

    fn values_url(&self, config: &SheetConfig) -> Result<Url, String> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| "sheets API base URL cannot be a base".to_string())?
            .pop_if_empty()
            .push(&config.sheet_id)
            .push("values")
            .push(&config.tab);
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }

    async fn fetch_values(&self, config: &SheetConfig) -> Result<Table, String> {
        let url = self.values_url(config)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("sheets API returned HTTP {}", status.as_u16()));
        }
        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| format!("invalid response body: {}", e))?;
        Ok(table_from_values(body.values))
    }
}

#[async_trait]
impl TableSource for SheetsClient {
    async fn fetch_table(&self, sheet: Option<&str>) -> ViewerResult<Table> {
        let config = self.resolve(sheet)?;
        let table = self
            .fetch_values(config)
            .await
            .map_err(|reason| ViewerError::fetch_failed(&config.name, reason))?;
        tracing::info!(
            sheet = %config.name,
            rows = table.len(),
            columns = table.columns.len(),
            "fetched sheet data"
        );
        Ok(table)
    }

    fn sheets(&self) -> Vec<SheetInfo> {
        self.sheets
            .iter()
            .map(|config| SheetInfo {
                name: config.name.clone(),
                display_name: config.name.clone(),
            })
            .collect()
    }
}

/// Convert a raw value grid into a table
///
/// The first row becomes the header. Short rows are padded with nulls and
/// long rows truncated so every row matches the header width.
fn table_from_values(values: Vec<Vec<serde_json::Value>>) -> Table {
    let mut rows = values.into_iter();
    let header = match rows.next() {
        Some(header) => header,
        None => return Table::new(Vec::new()),
    };
    let columns: Vec<String> = header
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let name = Cell::from(value).as_text();
            let trimmed = name.trim();
            if trimmed.is_empty() {
                format!("Column{}", index + 1)
            } else {
                trimmed.to_string()
            }
        })
        .collect();

    let mut table = Table::new(columns);
    for row in rows {
        table.push_row(row.into_iter().map(Cell::from).collect());
    }
    table
}
