//! Bounded TRX-delta search.
//!
//! For a labelled cell the planner walks TRX deltas away from the current
//! state, one step at a time, and stops at the first delta whose post-change
//! metrics pass the acceptance test for the label. Grow walks `0, 1, 2, ...`
//! and Degrow walks `0, -1, -2, ...`, both up to `search_bound - 1` steps.
//! Each trial performs a single Erlang-B lookup. Trials whose lookup misses
//! or whose capacity is zero are skipped, never fatal.
//!
//! When no delta in range is accepted the outcome keeps the last attempted
//! delta and its metrics but is flagged incomplete.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::algorithms::erlang::{utilization_pct, ErlangBTable};
use crate::core::domain::{Baseline, CellRecord, Label, PostMetrics};
use crate::core::error::{SizingError, SizingResult};

/// Search bound and acceptance limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    /// Number of deltas tried per cell, starting at zero.
    pub search_bound: u32,
    /// Post-change utilization must fall strictly below this for Grow.
    pub grow_utilization_ceiling_pct: f64,
    /// Post-change site TRX total must stay strictly below this for Grow.
    pub grow_site_trx_ceiling: u32,
    /// Post-change utilization must fall strictly below this for Degrow.
    pub degrow_utilization_ceiling_pct: f64,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            search_bound: 10,
            grow_utilization_ceiling_pct: 130.0,
            grow_site_trx_ceiling: 36,
            degrow_utilization_ceiling_pct: 100.0,
        }
    }
}

impl PlannerSettings {
    pub fn validate(&self) -> SizingResult<()> {
        if self.search_bound == 0 {
            return Err(SizingError::Configuration(
                "planner search_bound must be at least 1".to_string(),
            ));
        }
        if i32::try_from(self.search_bound).is_err() {
            return Err(SizingError::Configuration(format!(
                "planner search_bound {} is too large",
                self.search_bound
            )));
        }
        for (name, value) in [
            ("grow_utilization_ceiling_pct", self.grow_utilization_ceiling_pct),
            ("degrow_utilization_ceiling_pct", self.degrow_utilization_ceiling_pct),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SizingError::Configuration(format!(
                    "planner {} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    fn accepts(&self, label: Label, post_utilization: f64, post_site_trx: i64) -> bool {
        match label {
            Label::Grow => {
                post_utilization < self.grow_utilization_ceiling_pct
                    && post_site_trx < i64::from(self.grow_site_trx_ceiling)
            }
            Label::Degrow => post_utilization < self.degrow_utilization_ceiling_pct,
            Label::None => true,
        }
    }
}

/// A trial that could not be evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTrial {
    pub delta: i32,
    pub error: SizingError,
}

/// Result of planning one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutcome {
    pub label: Label,
    pub trx_delta: i32,
    pub post: PostMetrics,
    /// The search ran out of steps without an accepted delta.
    pub incomplete: bool,
    /// Trials attempted, including skipped ones. Zero for `Label::None`.
    pub trials: u32,
    pub skipped: Vec<SkippedTrial>,
}

impl PlanOutcome {
    /// `PlanningIncomplete` error for this outcome, if it did not converge.
    pub fn incomplete_error(&self, cell_id: &str) -> Option<SizingError> {
        self.incomplete.then(|| SizingError::PlanningIncomplete {
            cell_id: cell_id.to_string(),
            last_delta: self.trx_delta,
        })
    }
}

/// Current capacity and utilization of `cell`.
///
/// Fails with `BaselineUnresolvable` wrapping the lookup or division error.
pub fn compute_baseline(cell: &CellRecord, table: &ErlangBTable) -> SizingResult<Baseline> {
    let total_tch = cell.total_tch();
    let resolve = || -> SizingResult<Baseline> {
        let capacity = table.lookup(total_tch)?;
        let utilization = utilization_pct(cell.avg_traffic_erlangs, capacity, total_tch)?;
        Ok(Baseline {
            total_tch,
            equipped_capacity_erlangs: capacity,
            cell_utilization_pct: utilization,
        })
    };
    resolve().map_err(|cause| SizingError::baseline(cell.cell_id(), cause))
}

/// Find the smallest TRX change for `label` that passes the acceptance test.
///
/// `Label::None` returns a zero delta with unchanged metrics and runs no
/// trials.
pub fn plan(
    cell: &CellRecord,
    baseline: &Baseline,
    label: Label,
    table: &ErlangBTable,
    settings: &PlannerSettings,
) -> PlanOutcome {
    let step: i32 = match label {
        Label::Grow => 1,
        Label::Degrow => -1,
        Label::None => {
            return PlanOutcome {
                label,
                trx_delta: 0,
                post: PostMetrics::unchanged(cell, baseline),
                incomplete: false,
                trials: 0,
                skipped: Vec::new(),
            }
        }
    };

    let bound = i32::try_from(settings.search_bound.max(1)).unwrap_or(i32::MAX);
    let mut skipped = Vec::new();
    let mut last = PostMetrics::unchanged(cell, baseline);
    let mut last_delta = 0;

    for i in 0..bound {
        let delta = step * i;
        let (post, utilization) = evaluate_trial(cell, table, delta);
        last = post;
        last_delta = delta;

        match utilization {
            Ok(util) if settings.accepts(label, util, post.post_trx_per_site) => {
                return PlanOutcome {
                    label,
                    trx_delta: delta,
                    post,
                    incomplete: false,
                    trials: (i + 1) as u32,
                    skipped,
                };
            }
            Ok(_) => {}
            Err(error) => {
                debug!(
                    "Skipping trial delta={} for cell {}: {}",
                    delta,
                    cell.cell_id(),
                    error
                );
                skipped.push(SkippedTrial { delta, error });
            }
        }
    }

    PlanOutcome {
        label,
        trx_delta: last_delta,
        post: last,
        incomplete: true,
        trials: bound as u32,
        skipped,
    }
}

/// Post-change metrics for one delta, plus its utilization or the reason it
/// could not be computed.
fn evaluate_trial(
    cell: &CellRecord,
    table: &ErlangBTable,
    delta: i32,
) -> (PostMetrics, SizingResult<f64>) {
    let post_trx = cell.trx_per_sector() + i64::from(delta);
    let post_tch = cell.tch_for_trx(post_trx);
    let post_site = i64::from(cell.trx_per_site) + i64::from(delta);

    let capacity = table.lookup(post_tch);
    let utilization = capacity
        .clone()
        .and_then(|c| utilization_pct(cell.avg_traffic_erlangs, c, post_tch));

    let post = PostMetrics {
        post_trx_per_sector: post_trx,
        post_total_tch: post_tch,
        post_equipped_capacity_erlangs: capacity.ok(),
        post_cell_utilization_pct: utilization.as_ref().ok().copied(),
        post_trx_per_site: post_site,
    };
    (post, utilization)
}
