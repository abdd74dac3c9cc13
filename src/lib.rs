//! can-hyper — CAN-bus capture windowing for intrusion-detection datasets.
//!
//! Modular structure:
//! - [`capture`] — Capture CSV ingestion and identifier normalization
//! - [`period`] — Dominant-gap periodicity and the diagnostic hyper-period
//! - [`features`] — Fixed-window aggregation into the feature table
//! - [`labels`] — Ground-truth flags and class precedence
//! - [`storage`] — Columnar (zstd) table persistence with CSV fallback
//! - [`report`] — Run summary and fuzzy-attack onset detection
//! - [`model`] — Design matrix export for training collaborators
//! - [`logging`] — Structured JSON logging

pub mod builder;
pub mod capture;
pub mod config;
pub mod error;
pub mod features;
pub mod labels;
pub mod logging;
pub mod model;
pub mod period;
pub mod report;
pub mod storage;

pub use builder::FeatureTableBuilder;
pub use capture::{Event, Identifier, SourceSplit};
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use features::{FeatureRow, FeatureTable, WindowAggregate, WindowAggregator};
pub use labels::{resolve_label, ClassLabel};
pub use logging::StructuredLogger;
pub use model::DesignMatrix;
pub use period::{compute_hyper_period, estimate_period, HyperPeriod};
pub use report::RunSummary;
pub use storage::{load_table, persist, TableFormat};
