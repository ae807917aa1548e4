//! Domain models for per-cell TRX sizing.
//!
//! A [`CellRecord`] is the unit of work: it arrives from the ETL stage with
//! TRX counts, control-channel overheads and traffic measurements, and leaves
//! the batch as a [`PlannedCell`] carrying the label, the TRX delta and the
//! post-change metrics.

use serde::{Deserialize, Serialize};

use crate::core::error::{ErrorKind, SizingError};

/// Timeslots carried by one TRX.
pub const CHANNELS_PER_TRX: i64 = 8;

/// Maps the last character of a cell name to its sector number.
///
/// `A`, `B` and `C` map to `1`, `2` and `3`; ASCII digits pass through.
/// Any other suffix has no sector.
///
/// # Examples
///
/// ```
/// use trx_sizing::core::domain::sector_from_cell_name;
///
/// assert_eq!(sector_from_cell_name("DEL123B"), Some('2'));
/// assert_eq!(sector_from_cell_name("DEL1233"), Some('3'));
/// assert_eq!(sector_from_cell_name("DEL123X"), None);
/// ```
pub fn sector_from_cell_name(cell_name: &str) -> Option<char> {
    match cell_name.trim_end().chars().last()? {
        'A' => Some('1'),
        'B' => Some('2'),
        'C' => Some('3'),
        c if c.is_ascii_digit() => Some(c),
        _ => None,
    }
}

/// Builds the `<site>_<sector>` identifier for a cell, if its sector resolves.
pub fn derive_cell_id(site_id: &str, cell_name: &str) -> Option<String> {
    sector_from_cell_name(cell_name).map(|sector| format!("{}_{}", site_id, sector))
}

/// Descriptive columns carried through to the output untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellMeta {
    #[serde(default)]
    pub bsc: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
}

/// Per-cell input attributes as produced by the ETL stage.
///
/// `trx_per_site` must already hold the site total (see
/// [`crate::preprocessing::enricher::SiteAggregator`]); the batch never
/// recomputes it. `blocking_exceed_count` is `None` when no blocking
/// statistics were found for the cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub site_id: String,
    pub cell_name: String,
    /// Key used to join blocking statistics (the network's cell identifier).
    #[serde(default)]
    pub stats_key: Option<String>,
    #[serde(default)]
    pub meta: CellMeta,
    pub trx_900: u32,
    pub trx_1800: u32,
    pub bcch: u32,
    pub sdcch: u32,
    pub pdtch: u32,
    pub ccch: u32,
    pub avg_traffic_erlangs: f64,
    pub hr_traffic_pct: f64,
    #[serde(default)]
    pub blocking_nom_avg_pct: Option<f64>,
    #[serde(default)]
    pub blocking_exceed_count: Option<u32>,
    #[serde(default)]
    pub trx_per_site: u32,
}

impl CellRecord {
    /// Sector identifier, falling back to the raw cell name when the
    /// sector suffix does not resolve.
    pub fn cell_id(&self) -> String {
        derive_cell_id(&self.site_id, &self.cell_name).unwrap_or_else(|| self.cell_name.clone())
    }

    /// Both bands together, widened so that no pair of counts can overflow.
    pub fn trx_per_sector(&self) -> i64 {
        i64::from(self.trx_900) + i64::from(self.trx_1800)
    }

    /// Channel-equivalents consumed by BCCH, SDCCH, PDTCH and CCCH.
    pub fn channel_overhead(&self) -> i64 {
        i64::from(self.bcch) + i64::from(self.sdcch) + i64::from(self.pdtch) + i64::from(self.ccch)
    }

    /// Traffic channels available with `trx` transceivers on this sector.
    pub fn tch_for_trx(&self, trx: i64) -> i64 {
        trx * CHANNELS_PER_TRX - self.channel_overhead()
    }

    /// Usable traffic channels at the current TRX count. Negative values
    /// mean the overheads exceed the equipped timeslots.
    pub fn total_tch(&self) -> i64 {
        self.tch_for_trx(self.trx_per_sector())
    }
}

/// Sizing classification of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Grow,
    Degrow,
    None,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Grow => "Grow",
            Label::Degrow => "Degrow",
            Label::None => "None",
        }
    }

    /// Remark text used in exported tables; unlabelled cells stay blank.
    pub fn remark(&self) -> &'static str {
        match self {
            Label::Grow => "Grow",
            Label::Degrow => "Degrow",
            Label::None => "",
        }
    }
}

/// Current-state capacity figures of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub total_tch: i64,
    pub equipped_capacity_erlangs: f64,
    pub cell_utilization_pct: f64,
}

/// Metrics after applying a TRX delta.
///
/// Capacity and utilization are `None` when the trial that produced these
/// metrics could not be evaluated (lookup miss or zero capacity).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostMetrics {
    pub post_trx_per_sector: i64,
    pub post_total_tch: i64,
    pub post_equipped_capacity_erlangs: Option<f64>,
    pub post_cell_utilization_pct: Option<f64>,
    pub post_trx_per_site: i64,
}

impl PostMetrics {
    /// Post-change metrics identical to the current state.
    pub fn unchanged(cell: &CellRecord, baseline: &Baseline) -> Self {
        Self {
            post_trx_per_sector: cell.trx_per_sector(),
            post_total_tch: baseline.total_tch,
            post_equipped_capacity_erlangs: Some(baseline.equipped_capacity_erlangs),
            post_cell_utilization_pct: Some(baseline.cell_utilization_pct),
            post_trx_per_site: i64::from(cell.trx_per_site),
        }
    }
}

/// Outcome flag of one output row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    /// Planned and the recommendation met the acceptance test (or no change was needed).
    Planned,
    /// The search exhausted its bound; the delta is unvalidated.
    Incomplete,
    /// The record violates an input invariant and was not planned.
    Malformed,
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Planned => "planned",
            RowStatus::Incomplete => "incomplete",
            RowStatus::Malformed => "malformed",
        }
    }
}

/// One row of the augmented output table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedCell {
    pub cell_id: String,
    pub record: CellRecord,
    pub baseline: Option<Baseline>,
    pub label: Option<Label>,
    pub trx_delta: i32,
    pub post: Option<PostMetrics>,
    pub incomplete: bool,
    pub status: RowStatus,
    pub diagnostic: Option<String>,
}

impl PlannedCell {
    /// Row for a record that failed validation; it keeps its inputs and a
    /// diagnostic but carries no plan.
    pub fn malformed(record: CellRecord, error: &SizingError) -> Self {
        Self {
            cell_id: record.cell_id(),
            record,
            baseline: None,
            label: None,
            trx_delta: 0,
            post: None,
            incomplete: false,
            status: RowStatus::Malformed,
            diagnostic: Some(error.to_string()),
        }
    }
}

/// A cell left out of the output table, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedCell {
    pub cell_id: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl ExcludedCell {
    pub fn new(cell_id: impl Into<String>, error: &SizingError) -> Self {
        Self {
            cell_id: cell_id.into(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::sample_cell;
    use super::*;

    #[test]
    fn test_sector_mapping() {
        assert_eq!(sector_from_cell_name("ABC12A"), Some('1'));
        assert_eq!(sector_from_cell_name("ABC12B"), Some('2'));
        assert_eq!(sector_from_cell_name("ABC12C"), Some('3'));
        assert_eq!(sector_from_cell_name("ABC127"), Some('7'));
        assert_eq!(sector_from_cell_name("ABC12D"), None);
        assert_eq!(sector_from_cell_name(""), None);
    }

    #[test]
    fn test_cell_id_derivation() {
        let cell = sample_cell();
        assert_eq!(cell.cell_id(), "DEL0001_1");

        let mut odd = sample_cell();
        odd.cell_name = "DEL0001Z".to_string();
        assert_eq!(odd.cell_id(), "DEL0001Z");
    }

    #[test]
    fn test_total_tch() {
        let cell = sample_cell();
        assert_eq!(cell.trx_per_sector(), 4);
        assert_eq!(cell.channel_overhead(), 4);
        assert_eq!(cell.total_tch(), 28);
        assert_eq!(cell.tch_for_trx(5), 36);
    }

    #[test]
    fn test_trx_per_sector_does_not_overflow() {
        let mut cell = sample_cell();
        cell.trx_900 = u32::MAX;
        cell.trx_1800 = 1;
        assert_eq!(cell.trx_per_sector(), i64::from(u32::MAX) + 1);
        assert_eq!(cell.total_tch(), (i64::from(u32::MAX) + 1) * 8 - 4);
    }

    #[test]
    fn test_total_tch_can_go_negative() {
        let mut cell = sample_cell();
        cell.trx_900 = 0;
        cell.trx_1800 = 0;
        assert_eq!(cell.total_tch(), -4);
    }

    #[test]
    fn test_label_remarks() {
        assert_eq!(Label::Grow.remark(), "Grow");
        assert_eq!(Label::Degrow.as_str(), "Degrow");
        assert_eq!(Label::None.remark(), "");
    }

    #[test]
    fn test_post_metrics_unchanged() {
        let cell = sample_cell();
        let baseline = Baseline {
            total_tch: 28,
            equipped_capacity_erlangs: 20.0,
            cell_utilization_pct: 125.0,
        };
        let post = PostMetrics::unchanged(&cell, &baseline);
        assert_eq!(post.post_trx_per_sector, 4);
        assert_eq!(post.post_total_tch, 28);
        assert_eq!(post.post_equipped_capacity_erlangs, Some(20.0));
        assert_eq!(post.post_cell_utilization_pct, Some(125.0));
        assert_eq!(post.post_trx_per_site, 30);
    }

    #[test]
    fn test_record_deserializes_with_defaults() {
        let json = r#"{
            "site_id": "S1",
            "cell_name": "S1B",
            "trx_900": 1,
            "trx_1800": 1,
            "bcch": 1,
            "sdcch": 1,
            "pdtch": 0,
            "ccch": 0,
            "avg_traffic_erlangs": 3.5,
            "hr_traffic_pct": 10.0
        }"#;
        let cell: CellRecord = serde_json::from_str(json).unwrap();
        assert_eq!(cell.cell_id(), "S1_2");
        assert_eq!(cell.blocking_exceed_count, None);
        assert_eq!(cell.trx_per_site, 0);
        assert_eq!(cell.meta, CellMeta::default());
    }
}
