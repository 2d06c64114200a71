//! Read-only web viewer over spreadsheet-backed tables
//!
//! Data flows fetch, transform, render: a [`source::TableSource`]
//! produces a [`table::Table`], [`pipeline::apply_query`] runs the
//! requested transformations over it, and [`server`] exposes the result
//! through a JSON API and a server-rendered page.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod server;
pub mod source;
pub mod table;
pub mod timestamp;
