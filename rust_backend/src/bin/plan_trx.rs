//! TRX planning batch binary.
//!
//! Loads the cell inventory and the Erlang-B table named in the config,
//! optionally joins the daily blocking exports, plans every cell and writes
//! the augmented table.
//!
//! # Usage
//!
//! ```bash
//! trx-plan                      # trx_sizing.toml from the standard locations
//! trx-plan config/prod.toml
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use trx_sizing::config::SizingConfig;
use trx_sizing::io::export::{write_output, write_summary};
use trx_sizing::io::loaders::{BlockingStatsLoader, CellInventoryLoader, ErlangTableLoader};
use trx_sizing::preprocessing::{
    BlockingEnricher, CapacityPlanningBatch, CellValidator, SiteAggregator,
};

fn load_config() -> Result<SizingConfig> {
    match env::args().nth(1) {
        Some(path) => SizingConfig::from_file(&path)
            .with_context(|| format!("Invalid configuration in {}", path)),
        None => match SizingConfig::from_default_location() {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!("{}; using built-in defaults", e);
                Ok(SizingConfig::default())
            }
        },
    }
}

fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .init();

    let config = load_config()?;

    let Some(cells_path) = config.inputs.cells.clone() else {
        bail!("inputs.cells is not set");
    };
    let Some(table_path) = config.inputs.erlang_table.clone() else {
        bail!("inputs.erlang_table is not set");
    };

    let table = ErlangTableLoader::load_from_file(&table_path, &config.erlang)?;
    let loaded = CellInventoryLoader::load_from_file(&cells_path)?;
    if !loaded.skipped_rows.is_empty() {
        warn!(
            "{} inventory rows could not be read",
            loaded.skipped_rows.len()
        );
    }

    let mut cells = loaded.cells;
    if config.inputs.aggregate_sites {
        cells = SiteAggregator::apply(&cells);
    }
    if let Some(dir) = &config.inputs.blocking_dir {
        let samples = BlockingStatsLoader::load_dir(dir)?;
        let enricher =
            BlockingEnricher::from_samples(&samples, config.blocking.exceed_threshold_pct);
        cells = enricher.enrich(&cells);
    }

    let validation = CellValidator::validate_cells(&cells);
    for error in &validation.errors {
        warn!("{}", error);
    }
    for warning in &validation.warnings {
        warn!("{}", warning);
    }

    let batch = CapacityPlanningBatch::new(table, config.thresholds, config.planner)?;
    let entries = batch.table().entries();
    if let (Some(first), Some(last)) = (entries.first(), entries.last()) {
        info!(
            "Erlang-B table covers {}..={} channels",
            first.channels, last.channels
        );
    }
    info!(
        "Grow at >= {}% utilization and >= {} blocking days; accept below {}% within {} steps",
        batch.thresholds().grow_utilization_pct,
        batch.thresholds().grow_blocking_count,
        batch.settings().grow_utilization_ceiling_pct,
        batch.settings().search_bound
    );
    let result = batch.run(&cells);

    let output_path = config
        .output
        .path
        .clone()
        .unwrap_or_else(|| PathBuf::from("trx_plan.csv"));
    write_output(&result.rows, &output_path)?;

    if let Some(summary_path) = &config.output.summary_path {
        write_summary(&result, summary_path)?;
        info!("Summary written to {}", summary_path.display());
    }

    let summary = &result.summary;
    info!(
        "{} cells: {} grow, {} degrow, {} unchanged, {} incomplete, {} malformed, {} excluded",
        summary.total_cells,
        summary.grow,
        summary.degrow,
        summary.unchanged,
        summary.incomplete,
        summary.malformed,
        summary.excluded
    );
    for (kind, count) in &summary.errors_by_kind {
        warn!("{}: {} cells", kind.as_str(), count);
    }
    for (kind, count) in &summary.skipped_trials {
        info!("Skipped trials ({}): {}", kind.as_str(), count);
    }

    Ok(())
}
