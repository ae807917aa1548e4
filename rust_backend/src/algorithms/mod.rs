//! Sizing algorithms.
//!
//! This module provides the Erlang-B capacity lookup, the Grow/Degrow
//! classifier and the bounded TRX-delta search.
//!
//! # Components
//!
//! - [`erlang`]: Validated Erlang-B table with exact and round-down lookup
//! - [`classifier`]: Threshold rules mapping a cell to Grow, Degrow or None
//! - [`planner`]: Minimal TRX change satisfying post-change utilization limits
//!
//! # Example
//!
//! ```
//! use trx_sizing::algorithms::{classify, compute_baseline, plan, PlannerSettings, Thresholds};
//! use trx_sizing::algorithms::erlang::{ErlangBEntry, ErlangBTable};
//! use trx_sizing::core::domain::{CellMeta, CellRecord, Label};
//!
//! let table = ErlangBTable::new(vec![ErlangBEntry::new(28, 20.0)]).unwrap();
//! let cell = CellRecord {
//!     site_id: "S1".into(),
//!     cell_name: "S1A".into(),
//!     stats_key: None,
//!     meta: CellMeta::default(),
//!     trx_900: 4,
//!     trx_1800: 0,
//!     bcch: 1,
//!     sdcch: 2,
//!     pdtch: 0,
//!     ccch: 1,
//!     avg_traffic_erlangs: 25.0,
//!     hr_traffic_pct: 95.0,
//!     blocking_nom_avg_pct: None,
//!     blocking_exceed_count: Some(0),
//!     trx_per_site: 12,
//! };
//!
//! let baseline = compute_baseline(&cell, &table).unwrap();
//! assert_eq!(baseline.cell_utilization_pct, 125.0);
//!
//! let label = classify(&cell, &baseline, &Thresholds::default());
//! assert_eq!(label, Label::None);
//!
//! let outcome = plan(&cell, &baseline, Label::Grow, &table, &PlannerSettings::default());
//! assert_eq!(outcome.trx_delta, 0);
//! ```

pub mod classifier;
pub mod erlang;
pub mod planner;

pub use classifier::{classify, Thresholds};
pub use erlang::{utilization_pct, ErlangBEntry, ErlangBTable, MatchPolicy};
pub use planner::{compute_baseline, plan, PlanOutcome, PlannerSettings, SkippedTrial};
