//! Fetch KNMI weather observations and parse them into indexed tables.
//!
//! The KNMI climatology services return comma separated text annotated with
//! `#` comment lines, the last of which names the columns. [`TabularFetcher`]
//! downloads such a body with one GET request and [`parse_table`] turns it into
//! a [`Table`] keyed by its date column.
//!
//! ```no_run
//! use mcp_knmi_server::{ObservationQuery, TabularFetcher};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let fetcher = TabularFetcher::new()?;
//! let query = ObservationQuery::daily_temperature("240", "20190101", "20200131");
//! let table = fetcher.observations(&query).await?;
//!
//! for row in table.get("20190101") {
//!     println!("TG = {:?}", row.value("TG"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod error;
pub mod fetcher;
pub mod formatters;
pub mod models;
pub mod service;
pub mod table;

pub use error::FetchError;
pub use fetcher::TabularFetcher;
pub use models::{ObservationQuery, QueryParams, Resolution, VariableGroup};
pub use table::{parse_table, parse_timestamp, Row, Table};
