pub mod enricher;
pub mod pipeline;
pub mod validator;

pub use enricher::{BlockingEnricher, BlockingSample, BlockingSummary, SiteAggregator};
pub use pipeline::{BatchResult, BatchSummary, CapacityPlanningBatch};
pub use validator::{CellValidator, ValidationResult, ValidationStats};
