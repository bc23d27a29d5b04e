//! Price-per-unit-area estimation for residential transactions.
//!
//! A fixed six-column feature record is fed to a pre-fitted random forest
//! regressor, and a historical transactions table backs a few read-only
//! exploration views (describe, correlation, histogram).

extern crate serde;

pub mod cache;
pub mod cli;
pub mod config;
pub mod context;
pub mod dataset;
pub mod error;
pub mod model;
pub mod records;
pub mod stats;
pub mod summary;

#[cfg(test)]
mod testing;

pub use config::AppConfig;
pub use context::AppContext;
pub use dataset::{Dataset, DatasetView, HistogramOptions};
pub use error::{PredictorError, Result};
pub use model::{format_prediction, ModelArtifact, ModelHandle, PredictionService};
pub use records::FeatureRecord;
