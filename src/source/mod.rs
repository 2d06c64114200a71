//! Table sources
//!
//! These traits and implementations cover where tables come from. The
//! pipeline never talks to a backend directly; it receives a fetched
//! `Table` and the serving layer picks the source.

mod cache;
mod sheets;

pub use cache::CachedSource;
pub use sheets::SheetsClient;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ViewerResult;
use crate::table::Table;

/// A configured sheet as listed to clients
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SheetInfo {
    pub name: String,
    pub display_name: String,
}

/// Provider of tabular data by sheet name
///
/// Implementations can fetch from a real backend, serve cached copies, or
/// hold fixtures for tests.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Fetch the full table for a configured sheet
    ///
    /// `None` (or an empty name) selects the first configured sheet. Fails
    /// with `SheetNotFound` for unknown names and `FetchFailed` when the
    /// backend errors.
    async fn fetch_table(&self, sheet: Option<&str>) -> ViewerResult<Table>;

    /// All sheets this source can serve, in configuration order
    fn sheets(&self) -> Vec<SheetInfo>;
}
