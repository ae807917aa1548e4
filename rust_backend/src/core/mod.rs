//! Core domain models and error types for TRX sizing.
//!
//! This module defines the per-cell records that flow through the pipeline
//! and the typed errors the core stages report.

pub mod domain;
pub mod error;

pub use domain::{
    Baseline, CellMeta, CellRecord, ExcludedCell, Label, PlannedCell, PostMetrics, RowStatus,
};
pub use error::{ErrorKind, SizingError, SizingResult};
