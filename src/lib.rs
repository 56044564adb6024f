//! # pubcount
//!
//! Per-year publication counts from arXiv and BASE, reported as CSV plus a bar chart.
//!
//! ## Modules
//!
//! - [`source`] - Supported providers
//! - [`query`] - Search URL construction
//! - [`fetch`] - Proxy-routed, cached HTTP fetching
//! - [`cache`] - On-disk response cache
//! - [`extract`] - Result-count parsing per provider
//! - [`aggregate`] - Year-range orchestration
//! - [`report`] / [`chart`] - CSV and PNG output
//! - [`pipeline`] - Aggregate and save in one call
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pubcount::{aggregate, fetch::{FetchConfig, HttpFetcher}, Source};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fetcher = HttpFetcher::new(FetchConfig::default())?;
//!     let records = aggregate::run_for_years(&fetcher, Source::Arxiv, "privacy", 2020, 2024).await?;
//!     println!("Collected {} years", records.len());
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod cache;
pub mod chart;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod query;
pub mod report;
pub mod source;

pub use error::{PubcountError, Result};
pub use source::Source;
