//! Sizing configuration file support.
//!
//! All settings live in one TOML file. Every section and field is optional;
//! missing values fall back to the deployment defaults.
//!
//! ```toml
//! [thresholds]
//! hr_traffic_pct = 90.0
//! grow_utilization_pct = 140.0
//!
//! [planner]
//! search_bound = 10
//!
//! [erlang]
//! match_policy = "round_down"
//!
//! [inputs]
//! cells = "input/cells.csv"
//! erlang_table = "input/erlang_b.csv"
//! blocking_dir = "input/blocking"
//!
//! [output]
//! path = "output/trx_plan.csv"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::algorithms::classifier::Thresholds;
use crate::algorithms::erlang::MatchPolicy;
use crate::algorithms::planner::PlannerSettings;
use crate::core::error::{SizingError, SizingResult};

/// Complete sizing configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SizingConfig {
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub planner: PlannerSettings,
    #[serde(default)]
    pub erlang: ErlangSettings,
    #[serde(default)]
    pub blocking: BlockingSettings,
    #[serde(default)]
    pub inputs: InputSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

/// Erlang-B table settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErlangSettings {
    #[serde(default)]
    pub match_policy: MatchPolicy,
    #[serde(default = "default_channels_column")]
    pub channels_column: String,
    /// Column holding capacity at the planning grade of service.
    #[serde(default = "default_capacity_column")]
    pub capacity_column: String,
}

impl Default for ErlangSettings {
    fn default() -> Self {
        Self {
            match_policy: MatchPolicy::default(),
            channels_column: default_channels_column(),
            capacity_column: default_capacity_column(),
        }
    }
}

fn default_channels_column() -> String {
    "channels".to_string()
}

fn default_capacity_column() -> String {
    "capacity_erlangs".to_string()
}

/// Blocking statistics settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockingSettings {
    /// User-perceived blocking above this percentage counts as an exceed day.
    #[serde(default = "default_exceed_threshold_pct")]
    pub exceed_threshold_pct: f64,
}

impl Default for BlockingSettings {
    fn default() -> Self {
        Self {
            exceed_threshold_pct: default_exceed_threshold_pct(),
        }
    }
}

fn default_exceed_threshold_pct() -> f64 {
    1.0
}

/// Input file locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSettings {
    #[serde(default)]
    pub cells: Option<PathBuf>,
    #[serde(default)]
    pub erlang_table: Option<PathBuf>,
    /// Directory of daily blocking CSV exports.
    #[serde(default)]
    pub blocking_dir: Option<PathBuf>,
    /// Recompute `trx_per_site` from the loaded cells.
    #[serde(default = "default_aggregate_sites")]
    pub aggregate_sites: bool,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            cells: None,
            erlang_table: None,
            blocking_dir: None,
            aggregate_sites: default_aggregate_sites(),
        }
    }
}

fn default_aggregate_sites() -> bool {
    true
}

/// Output file locations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Augmented table; `.csv` or `.json`.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// End-of-run summary as JSON.
    #[serde(default)]
    pub summary_path: Option<PathBuf>,
}

impl SizingConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SizingResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            SizingError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> SizingResult<Self> {
        let config: SizingConfig = toml::from_str(content).map_err(|e| {
            SizingError::Configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `trx_sizing.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> SizingResult<Self> {
        let search_paths = [
            PathBuf::from("trx_sizing.toml"),
            PathBuf::from("rust_backend/trx_sizing.toml"),
            PathBuf::from("../trx_sizing.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(SizingError::Configuration(
            "No trx_sizing.toml found in standard locations".to_string(),
        ))
    }

    pub fn validate(&self) -> SizingResult<()> {
        self.thresholds.validate()?;
        self.planner.validate()?;
        if !self.blocking.exceed_threshold_pct.is_finite() {
            return Err(SizingError::Configuration(
                "blocking.exceed_threshold_pct must be a number".to_string(),
            ));
        }
        if self.erlang.capacity_column.is_empty() || self.erlang.channels_column.is_empty() {
            return Err(SizingError::Configuration(
                "erlang column names must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
