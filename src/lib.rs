//! Fetch-align-derive core for an economic indicators dashboard.
//!
//! Two components, consumed leaf-first: a catalog-validated series fetcher
//! for a FRED-style observations API, and a pure engine that joins fetched
//! series by date, computes derived fields (ratios, growth, moving
//! averages), and classifies records with declarative threshold rules.
//! Rendering consumes the resulting [`AlignedRecord`] sequence; nothing here
//! knows about charts.
//!
//! ```no_run
//! use std::sync::Arc;
//! use econ_series::{FredFetcher, Pipeline, panels};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Arc::new(FredFetcher::from_env()?);
//! let pipeline = Pipeline::new(fetcher);
//! let records = pipeline.run(&panels::labor_market()).await?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod panel;
pub mod panels;
pub mod pipeline;

pub use catalog::{Catalog, SeriesMeta};
pub use engine::classify::ClassificationRule;
pub use engine::derive::DerivedField;
pub use error::{ConfigError, PipelineError, UpstreamError};
pub use fetcher::fred::FredFetcher;
pub use fetcher::SeriesSource;
pub use models::{AlignedRecord, Frequency, Observation, SeriesRequest};
pub use panel::{PanelSpec, SeriesRole};
pub use pipeline::Pipeline;
