//! Cell record validation with error and warning reporting.
//!
//! Errors mark records that violate an input invariant (negative traffic
//! channel count, non-numeric traffic); the batch keeps such records in the
//! output with a diagnostic but does not plan them. Warnings describe data
//! quality issues that do not prevent planning.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::domain::{sector_from_cell_name, CellRecord};
use crate::core::error::{SizingError, SizingResult};

/// Validation outcome for a whole cell table.
///
/// # Examples
///
/// ```
/// use trx_sizing::preprocessing::validator::ValidationResult;
///
/// let mut result = ValidationResult::new();
/// assert!(result.is_valid);
///
/// result.add_warning("Unresolved sector suffix".to_string());
/// assert!(result.is_valid);
///
/// result.add_error("Negative traffic channel count".to_string());
/// assert!(!result.is_valid);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: ValidationStats,
}

/// Counts of the issues found during validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationStats {
    pub total_cells: usize,
    pub malformed_cells: usize,
    pub unresolved_sectors: usize,
    pub duplicate_cell_ids: usize,
    pub missing_blocking: usize,
    pub site_total_mismatches: usize,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            ..Default::default()
        }
    }

    /// Adds an error and marks the result as invalid.
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

/// Only the first few messages of each kind are listed; the stats keep the totals.
const MAX_LISTED: usize = 5;

/// Validator for cell records.
pub struct CellValidator;

impl CellValidator {
    /// Check the invariants a record must hold to be planned.
    ///
    /// Fails with `MalformedCellRecord` when the TRX counts sum past the
    /// record's count range, when the traffic channel count is negative, or
    /// when traffic or half-rate share is negative or not a
    /// number.
    pub fn check_record(cell: &CellRecord) -> SizingResult<()> {
        let cell_id = cell.cell_id();

        if u32::try_from(cell.trx_per_sector()).is_err() {
            return Err(SizingError::malformed(
                cell_id,
                format!(
                    "TRX per sector {} ({} + {}) is out of range",
                    cell.trx_per_sector(),
                    cell.trx_900,
                    cell.trx_1800
                ),
            ));
        }

        let total_tch = cell.total_tch();
        if total_tch < 0 {
            return Err(SizingError::malformed(
                cell_id,
                format!(
                    "negative total TCH {} ({} TRX, {} overhead channels)",
                    total_tch,
                    cell.trx_per_sector(),
                    cell.channel_overhead()
                ),
            ));
        }

        if !cell.avg_traffic_erlangs.is_finite() || cell.avg_traffic_erlangs < 0.0 {
            return Err(SizingError::malformed(
                cell_id,
                format!("invalid average traffic {}", cell.avg_traffic_erlangs),
            ));
        }

        if !cell.hr_traffic_pct.is_finite() || cell.hr_traffic_pct < 0.0 {
            return Err(SizingError::malformed(
                cell_id,
                format!("invalid half-rate traffic share {}", cell.hr_traffic_pct),
            ));
        }

        Ok(())
    }

    /// Validate a whole table, collecting errors, warnings and counts.
    pub fn validate_cells(cells: &[CellRecord]) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.stats.total_cells = cells.len();

        let mut seen = HashSet::new();
        for cell in cells {
            let cell_id = cell.cell_id();

            if let Err(err) = Self::check_record(cell) {
                result.stats.malformed_cells += 1;
                if result.stats.malformed_cells <= MAX_LISTED {
                    result.add_error(err.to_string());
                } else {
                    result.is_valid = false;
                }
            }

            if sector_from_cell_name(&cell.cell_name).is_none() {
                result.stats.unresolved_sectors += 1;
                if result.stats.unresolved_sectors <= MAX_LISTED {
                    result.add_warning(format!(
                        "Cell name '{}' has no recognizable sector suffix",
                        cell.cell_name
                    ));
                }
            }

            if !seen.insert(cell_id.clone()) {
                result.stats.duplicate_cell_ids += 1;
                if result.stats.duplicate_cell_ids <= MAX_LISTED {
                    result.add_warning(format!("Duplicate cell id {}", cell_id));
                }
            }

            if cell.blocking_exceed_count.is_none() {
                result.stats.missing_blocking += 1;
            }

            if i64::from(cell.trx_per_site) < cell.trx_per_sector() {
                result.stats.site_total_mismatches += 1;
                if result.stats.site_total_mismatches <= MAX_LISTED {
                    result.add_warning(format!(
                        "Cell {} has {} TRX but its site total is {}",
                        cell_id,
                        cell.trx_per_sector(),
                        cell.trx_per_site
                    ));
                }
            }

            if cell.hr_traffic_pct > 100.0 {
                result.add_warning(format!(
                    "Cell {} reports half-rate share above 100%: {}",
                    cell_id, cell.hr_traffic_pct
                ));
            }
        }

        if result.stats.malformed_cells > MAX_LISTED {
            result.add_error(format!(
                "Total malformed cells: {} (showing first {})",
                result.stats.malformed_cells, MAX_LISTED
            ));
        }
        if result.stats.missing_blocking > 0 {
            result.add_warning(format!(
                "{} cells have no blocking statistics",
                result.stats.missing_blocking
            ));
        }

        result
    }
}
