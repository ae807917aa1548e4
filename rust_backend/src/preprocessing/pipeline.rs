use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::algorithms::classifier::{classify, Thresholds};
use crate::algorithms::erlang::ErlangBTable;
use crate::algorithms::planner::{compute_baseline, plan, PlannerSettings};
use crate::core::domain::{CellRecord, ExcludedCell, Label, PlannedCell, RowStatus};
use crate::core::error::{ErrorKind, SizingResult};
use crate::preprocessing::validator::CellValidator;

/// End-of-run counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_cells: usize,
    pub output_rows: usize,
    pub grow: usize,
    pub degrow: usize,
    pub unchanged: usize,
    pub incomplete: usize,
    pub malformed: usize,
    pub excluded: usize,
    /// Per-cell failures by kind (malformed, baseline, incomplete).
    pub errors_by_kind: BTreeMap<ErrorKind, usize>,
    /// Skipped planner trials by kind (lookup miss, zero capacity).
    pub skipped_trials: BTreeMap<ErrorKind, usize>,
}

impl BatchSummary {
    pub fn error_count(&self, kind: ErrorKind) -> usize {
        self.errors_by_kind.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_errors(&self) -> usize {
        self.errors_by_kind.values().sum()
    }
}

/// Result of a batch run.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// One row per input cell, in input order, minus excluded cells.
    pub rows: Vec<PlannedCell>,
    /// Cells whose baseline could not be resolved.
    pub excluded: Vec<ExcludedCell>,
    pub summary: BatchSummary,
}

enum CellOutcome {
    Row {
        row: PlannedCell,
        errors: Vec<ErrorKind>,
        skipped: Vec<ErrorKind>,
    },
    Excluded(ExcludedCell),
}

/// Drives classification and planning over a table of cells.
///
/// Cells are independent: each is validated, baselined, classified and
/// planned on its own, and a failure in one never affects another. With the
/// `parallel` feature the cells are spread over the rayon thread pool; the
/// Erlang-B table is shared read-only.
pub struct CapacityPlanningBatch {
    table: ErlangBTable,
    thresholds: Thresholds,
    settings: PlannerSettings,
}

impl CapacityPlanningBatch {
    /// Create a batch with validated thresholds and planner settings.
    pub fn new(
        table: ErlangBTable,
        thresholds: Thresholds,
        settings: PlannerSettings,
    ) -> SizingResult<Self> {
        thresholds.validate()?;
        settings.validate()?;
        Ok(Self {
            table,
            thresholds,
            settings,
        })
    }

    /// Create a batch with the default thresholds and planner settings.
    pub fn with_defaults(table: ErlangBTable) -> Self {
        Self {
            table,
            thresholds: Thresholds::default(),
            settings: PlannerSettings::default(),
        }
    }

    pub fn table(&self) -> &ErlangBTable {
        &self.table
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// Plan every cell and assemble the augmented table.
    ///
    /// `trx_per_site` is taken from the records as is.
    pub fn run(&self, cells: &[CellRecord]) -> BatchResult {
        info!(
            "Planning {} cells (search bound {}, {:?} lookup)",
            cells.len(),
            self.settings.search_bound,
            self.table.policy()
        );

        #[cfg(feature = "parallel")]
        let outcomes: Vec<CellOutcome> = {
            use rayon::prelude::*;
            cells.par_iter().map(|cell| self.evaluate(cell)).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<CellOutcome> = cells.iter().map(|cell| self.evaluate(cell)).collect();

        let mut summary = BatchSummary {
            total_cells: cells.len(),
            ..Default::default()
        };
        let mut rows = Vec::with_capacity(outcomes.len());
        let mut excluded = Vec::new();

        for outcome in outcomes {
            match outcome {
                CellOutcome::Row {
                    row,
                    errors,
                    skipped,
                } => {
                    for kind in errors {
                        *summary.errors_by_kind.entry(kind).or_insert(0) += 1;
                    }
                    for kind in skipped {
                        *summary.skipped_trials.entry(kind).or_insert(0) += 1;
                    }
                    match row.status {
                        RowStatus::Malformed => summary.malformed += 1,
                        RowStatus::Incomplete => summary.incomplete += 1,
                        RowStatus::Planned => {}
                    }
                    match row.label {
                        Some(Label::Grow) => summary.grow += 1,
                        Some(Label::Degrow) => summary.degrow += 1,
                        Some(Label::None) => summary.unchanged += 1,
                        None => {}
                    }
                    rows.push(row);
                }
                CellOutcome::Excluded(cell) => {
                    *summary.errors_by_kind.entry(cell.kind).or_insert(0) += 1;
                    excluded.push(cell);
                }
            }
        }

        summary.output_rows = rows.len();
        summary.excluded = excluded.len();

        info!(
            "Batch complete: {} rows ({} grow, {} degrow, {} unchanged), {} incomplete, {} malformed, {} excluded",
            summary.output_rows,
            summary.grow,
            summary.degrow,
            summary.unchanged,
            summary.incomplete,
            summary.malformed,
            summary.excluded
        );

        BatchResult {
            rows,
            excluded,
            summary,
        }
    }

    fn evaluate(&self, cell: &CellRecord) -> CellOutcome {
        let cell_id = cell.cell_id();

        if let Err(err) = CellValidator::check_record(cell) {
            warn!("Not planning cell {}: {}", cell_id, err);
            return CellOutcome::Row {
                row: PlannedCell::malformed(cell.clone(), &err),
                errors: vec![err.kind()],
                skipped: Vec::new(),
            };
        }

        let baseline = match compute_baseline(cell, &self.table) {
            Ok(baseline) => baseline,
            Err(err) => {
                warn!("Excluding cell {}: {}", cell_id, err);
                return CellOutcome::Excluded(ExcludedCell::new(cell_id, &err));
            }
        };

        let label = classify(cell, &baseline, &self.thresholds);
        let outcome = plan(cell, &baseline, label, &self.table, &self.settings);

        let incomplete = outcome.incomplete_error(&cell_id);
        if let Some(err) = &incomplete {
            warn!("{} search unresolved: {}", label.as_str(), err);
        }
        let errors = incomplete.iter().map(|e| e.kind()).collect();
        let skipped = outcome.skipped.iter().map(|s| s.error.kind()).collect();

        let row = PlannedCell {
            cell_id,
            record: cell.clone(),
            baseline: Some(baseline),
            label: Some(label),
            trx_delta: outcome.trx_delta,
            post: Some(outcome.post),
            incomplete: outcome.incomplete,
            status: if outcome.incomplete {
                RowStatus::Incomplete
            } else {
                RowStatus::Planned
            },
            diagnostic: incomplete.map(|e| e.to_string()),
        };

        CellOutcome::Row {
            row,
            errors,
            skipped,
        }
    }
}
