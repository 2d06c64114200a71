//! Environment-driven configuration
//!
//! All settings come from environment variables. `SHEETS_CONFIG` holds a
//! JSON array of sheet entries; the legacy `SHEET_ID`/`SHEET_TAB` pair is
//! still honored as a single-sheet fallback.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ViewerError, ViewerResult};
use crate::pipeline::DEFAULT_PAGE_SIZE;

const DEFAULT_CACHE_TTL_SEC: u64 = 60;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// One configured sheet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SheetConfig {
    /// Name used in URLs and the sheet picker
    pub name: String,

    /// Spreadsheet document id
    pub sheet_id: String,

    /// Worksheet tab within the document
    #[serde(default = "default_tab")]
    pub tab: String,
}

fn default_tab() -> String {
    "Sheet1".to_string()
}

/// Full application configuration
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Configured sheets, first entry is the default
    pub sheets: Vec<SheetConfig>,

    /// How long fetched tables are cached
    pub cache_ttl: Duration,

    /// Page size when a request does not specify one
    pub page_size_default: usize,

    /// Listen address for the HTTP server
    pub bind_addr: String,

    /// API key for the sheets backend, if required
    pub api_key: Option<String>,

    /// Base URL of the sheets values endpoint
    ///
    /// Empty means the public Google endpoint.
    pub api_base: String,
}

impl ViewerConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> ViewerResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an injectable variable lookup
    pub fn from_lookup<F>(lookup: F) -> ViewerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sheets = load_sheets(&lookup)?;

        let cache_ttl_sec = parse_var(&lookup, "CACHE_TTL_SEC", DEFAULT_CACHE_TTL_SEC)?;
        let page_size_default = parse_var(&lookup, "PAGE_SIZE_DEFAULT", DEFAULT_PAGE_SIZE)?;
        let bind_addr =
            non_empty(&lookup, "BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Ok(Self {
            sheets,
            cache_ttl: Duration::from_secs(cache_ttl_sec),
            page_size_default,
            bind_addr,
            api_key: non_empty(&lookup, "SHEETS_API_KEY"),
            api_base: non_empty(&lookup, "SHEETS_API_BASE").unwrap_or_default(),
        })
    }
}

fn load_sheets<F>(lookup: &F) -> ViewerResult<Vec<SheetConfig>>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = non_empty(lookup, "SHEETS_CONFIG") {
        let sheets: Vec<SheetConfig> = serde_json::from_str(&raw).map_err(|e| {
            ViewerError::ConfigError(format!("SHEETS_CONFIG is not a valid JSON array: {}", e))
        })?;
        if sheets.is_empty() {
            return Err(ViewerError::ConfigError(
                "SHEETS_CONFIG must contain at least one sheet".to_string(),
            ));
        }
        return Ok(sheets);
    }

    if let Some(sheet_id) = non_empty(lookup, "SHEET_ID") {
        return Ok(vec![SheetConfig {
            name: "Default Sheet".to_string(),
            sheet_id,
            tab: non_empty(lookup, "SHEET_TAB").unwrap_or_else(default_tab),
        }]);
    }

    Err(ViewerError::ConfigError(
        "No sheet configuration found. Set SHEETS_CONFIG or legacy SHEET_ID environment variable."
            .to_string(),
    ))
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> ViewerResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup, key) {
        Some(raw) => raw.trim().parse().map_err(|e| {
            ViewerError::ConfigError(format!("{} has invalid value '{}': {}", key, raw, e))
        }),
        None => Ok(default),
    }
}
