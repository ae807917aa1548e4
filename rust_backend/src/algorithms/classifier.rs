//! Grow/Degrow classification rules.

use serde::{Deserialize, Serialize};

use crate::core::domain::{Baseline, CellRecord, Label};
use crate::core::error::{SizingError, SizingResult};

/// Threshold set for [`classify`].
///
/// Grow requires every `grow_*` condition plus `hr_traffic_pct` and the
/// site ceiling; Degrow requires every `degrow_*` condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Half-rate share that must be strictly exceeded for Grow.
    pub hr_traffic_pct: f64,
    pub grow_utilization_pct: f64,
    pub grow_blocking_count: u32,
    /// Site TRX total that must not be reached for Grow.
    pub site_trx_max: u32,
    pub degrow_utilization_pct: f64,
    /// TRX per sector that must be strictly exceeded for Degrow.
    pub degrow_trx_per_sector_min: u32,
    pub degrow_blocking_count: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            hr_traffic_pct: 90.0,
            grow_utilization_pct: 140.0,
            grow_blocking_count: 3,
            site_trx_max: 36,
            degrow_utilization_pct: 70.0,
            degrow_trx_per_sector_min: 2,
            degrow_blocking_count: 2,
        }
    }
}

impl Thresholds {
    /// Reject non-finite or negative percentage thresholds.
    pub fn validate(&self) -> SizingResult<()> {
        let pct = [
            ("hr_traffic_pct", self.hr_traffic_pct),
            ("grow_utilization_pct", self.grow_utilization_pct),
            ("degrow_utilization_pct", self.degrow_utilization_pct),
        ];
        for (name, value) in pct {
            if !value.is_finite() || value < 0.0 {
                return Err(SizingError::Configuration(format!(
                    "threshold {} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Label a cell. Grow is tested first, then Degrow; otherwise `Label::None`.
///
/// A cell without blocking statistics meets neither blocking condition and
/// is therefore always `Label::None`.
pub fn classify(cell: &CellRecord, baseline: &Baseline, thresholds: &Thresholds) -> Label {
    let utilization = baseline.cell_utilization_pct;

    if let Some(blocking) = cell.blocking_exceed_count {
        let grow = cell.hr_traffic_pct > thresholds.hr_traffic_pct
            && utilization >= thresholds.grow_utilization_pct
            && blocking >= thresholds.grow_blocking_count
            && cell.trx_per_site < thresholds.site_trx_max;
        if grow {
            return Label::Grow;
        }

        let degrow = utilization < thresholds.degrow_utilization_pct
            && cell.trx_per_sector() > i64::from(thresholds.degrow_trx_per_sector_min)
            && blocking < thresholds.degrow_blocking_count;
        if degrow {
            return Label::Degrow;
        }
    }

    Label::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::test_support::sample_cell;
    use proptest::prelude::*;

    fn baseline(util: f64) -> Baseline {
        Baseline {
            total_tch: 28,
            equipped_capacity_erlangs: 20.0,
            cell_utilization_pct: util,
        }
    }

    #[test]
    fn test_grow() {
        let cell = sample_cell();
        assert_eq!(classify(&cell, &baseline(150.0), &Thresholds::default()), Label::Grow);
    }

    #[test]
    fn test_hr_traffic_boundary() {
        let t = Thresholds::default();
        let mut cell = sample_cell();

        cell.hr_traffic_pct = 90.0;
        assert_ne!(classify(&cell, &baseline(150.0), &t), Label::Grow);

        cell.hr_traffic_pct = 90.01;
        assert_eq!(classify(&cell, &baseline(150.0), &t), Label::Grow);
    }

    #[test]
    fn test_grow_utilization_is_inclusive() {
        let cell = sample_cell();
        assert_eq!(classify(&cell, &baseline(140.0), &Thresholds::default()), Label::Grow);
        assert_eq!(classify(&cell, &baseline(139.9), &Thresholds::default()), Label::None);
    }

    #[test]
    fn test_grow_blocked_by_site_ceiling() {
        let mut cell = sample_cell();
        cell.trx_per_site = 36;
        assert_eq!(classify(&cell, &baseline(150.0), &Thresholds::default()), Label::None);
    }

    #[test]
    fn test_degrow() {
        let mut cell = sample_cell();
        cell.blocking_exceed_count = Some(1);
        assert_eq!(classify(&cell, &baseline(50.0), &Thresholds::default()), Label::Degrow);
    }

    #[test]
    fn test_degrow_needs_more_than_min_trx() {
        let mut cell = sample_cell();
        cell.blocking_exceed_count = Some(0);
        cell.trx_900 = 1;
        cell.trx_1800 = 1;
        assert_eq!(classify(&cell, &baseline(10.0), &Thresholds::default()), Label::None);
    }

    #[test]
    fn test_degrow_blocking_is_exclusive() {
        let mut cell = sample_cell();
        cell.blocking_exceed_count = Some(2);
        assert_eq!(classify(&cell, &baseline(50.0), &Thresholds::default()), Label::None);
    }

    #[test]
    fn test_missing_blocking_is_none() {
        let mut cell = sample_cell();
        cell.blocking_exceed_count = None;
        assert_eq!(classify(&cell, &baseline(150.0), &Thresholds::default()), Label::None);
        assert_eq!(classify(&cell, &baseline(10.0), &Thresholds::default()), Label::None);
    }

    #[test]
    fn test_custom_thresholds() {
        let t = Thresholds {
            grow_utilization_pct: 100.0,
            ..Thresholds::default()
        };
        let cell = sample_cell();
        assert_eq!(classify(&cell, &baseline(110.0), &t), Label::Grow);
    }

    #[test]
    fn test_validate_thresholds() {
        assert!(Thresholds::default().validate().is_ok());
        let bad = Thresholds {
            degrow_utilization_pct: f64::NAN,
            ..Thresholds::default()
        };
        assert!(matches!(bad.validate(), Err(SizingError::Configuration(_))));
    }

    proptest! {
        #[test]
        fn prop_classify_is_deterministic(
            util in 0.0..400.0f64,
            hr in 0.0..100.0f64,
            blocking in proptest::option::of(0u32..8),
            site in 0u32..60,
            trx in 1u32..12,
        ) {
            let mut cell = sample_cell();
            cell.hr_traffic_pct = hr;
            cell.blocking_exceed_count = blocking;
            cell.trx_per_site = site;
            cell.trx_900 = trx;
            cell.trx_1800 = 0;
            let t = Thresholds::default();
            let first = classify(&cell, &baseline(util), &t);
            let second = classify(&cell.clone(), &baseline(util), &t);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_grow_and_degrow_disjoint_by_utilization(util in 70.0..140.0f64) {
            // Between the two utilization thresholds no label can apply.
            let mut cell = sample_cell();
            cell.blocking_exceed_count = Some(0);
            let label = classify(&cell, &baseline(util), &Thresholds::default());
            prop_assert_eq!(label, Label::None);
        }
    }
}
