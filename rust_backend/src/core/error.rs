//! Error types for sizing operations.
//!
//! Every failure the core can produce for a single cell is a [`SizingError`].
//! None of them abort a batch: the planner skips failed trials, and the batch
//! driver turns per-cell failures into row flags and summary counts.

use serde::{Deserialize, Serialize};

/// Result type for core sizing operations
pub type SizingResult<T> = Result<T, SizingError>;

/// Error type for the Erlang-B lookup, classification and planning stages.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SizingError {
    /// The Erlang-B table has no usable entry for this channel count.
    #[error("No Erlang-B capacity for channel count {channels}")]
    NoCapacityForChannelCount { channels: i64 },

    /// A lookup returned zero capacity, so utilization is undefined.
    #[error("Zero equipped capacity at {channels} channels, utilization undefined")]
    DivisionByZero { channels: i64 },

    /// The bounded search ended without meeting the acceptance test.
    #[error("Planning did not converge for cell {cell_id} (last delta {last_delta})")]
    PlanningIncomplete { cell_id: String, last_delta: i32 },

    /// The record violates an input invariant and cannot be planned.
    #[error("Malformed cell record {cell_id}: {reason}")]
    MalformedCellRecord { cell_id: String, reason: String },

    /// The current capacity or utilization of the cell cannot be computed.
    #[error("Baseline unresolvable for cell {cell_id}: {cause}")]
    BaselineUnresolvable {
        cell_id: String,
        cause: Box<SizingError>,
    },

    /// The Erlang-B reference table failed load-time validation.
    #[error("Invalid Erlang-B table: {0}")]
    InvalidErlangTable(String),

    /// Thresholds or planner settings are unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Coarse error category used for end-of-run counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NoCapacityForChannelCount,
    DivisionByZero,
    PlanningIncomplete,
    MalformedCellRecord,
    BaselineUnresolvable,
    InvalidErlangTable,
    Configuration,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NoCapacityForChannelCount => "no_capacity_for_channel_count",
            ErrorKind::DivisionByZero => "division_by_zero",
            ErrorKind::PlanningIncomplete => "planning_incomplete",
            ErrorKind::MalformedCellRecord => "malformed_cell_record",
            ErrorKind::BaselineUnresolvable => "baseline_unresolvable",
            ErrorKind::InvalidErlangTable => "invalid_erlang_table",
            ErrorKind::Configuration => "configuration",
        }
    }
}

impl SizingError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SizingError::NoCapacityForChannelCount { .. } => ErrorKind::NoCapacityForChannelCount,
            SizingError::DivisionByZero { .. } => ErrorKind::DivisionByZero,
            SizingError::PlanningIncomplete { .. } => ErrorKind::PlanningIncomplete,
            SizingError::MalformedCellRecord { .. } => ErrorKind::MalformedCellRecord,
            SizingError::BaselineUnresolvable { .. } => ErrorKind::BaselineUnresolvable,
            SizingError::InvalidErlangTable(_) => ErrorKind::InvalidErlangTable,
            SizingError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Wrap a lookup/utilization failure as a baseline failure for `cell_id`.
    pub fn baseline(cell_id: impl Into<String>, cause: SizingError) -> Self {
        SizingError::BaselineUnresolvable {
            cell_id: cell_id.into(),
            cause: Box::new(cause),
        }
    }

    pub fn malformed(cell_id: impl Into<String>, reason: impl Into<String>) -> Self {
        SizingError::MalformedCellRecord {
            cell_id: cell_id.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err = SizingError::NoCapacityForChannelCount { channels: 28 };
        assert_eq!(err.kind(), ErrorKind::NoCapacityForChannelCount);

        let wrapped = SizingError::baseline("S1_1", err);
        assert_eq!(wrapped.kind(), ErrorKind::BaselineUnresolvable);
    }

    #[test]
    fn test_display_includes_cause() {
        let err = SizingError::baseline("S1_1", SizingError::DivisionByZero { channels: 12 });
        let msg = err.to_string();
        assert!(msg.contains("S1_1"));
        assert!(msg.contains("12 channels"));
    }

    #[test]
    fn test_kind_as_str() {
        assert_eq!(ErrorKind::PlanningIncomplete.as_str(), "planning_incomplete");
        assert_eq!(
            SizingError::malformed("X", "negative").kind().as_str(),
            "malformed_cell_record"
        );
    }
}
