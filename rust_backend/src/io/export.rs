//! Writers for the augmented cell table and the run summary.

use anyhow::{Context, Result};
use log::info;
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::core::domain::{ExcludedCell, PlannedCell};
use crate::io::loaders::SourceType;
use crate::preprocessing::pipeline::{BatchResult, BatchSummary};

/// Flat view of one output row, in the published column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    pub cell_id: String,
    pub site_id: String,
    pub cell_name: String,
    pub bsc: Option<String>,
    pub vendor: Option<String>,
    pub town: Option<String>,
    pub trx_900: i64,
    pub trx_1800: i64,
    pub trx_per_sector: i64,
    pub bcch: i64,
    pub sdcch: i64,
    pub pdtch: i64,
    pub ccch: i64,
    pub trx_per_site: i64,
    pub avg_traffic_erlangs: f64,
    pub hr_traffic_pct: f64,
    pub blocking_nom_avg_pct: Option<f64>,
    pub blocking_exceed_count: Option<i64>,
    pub total_tch: i64,
    pub equipped_capacity_erlangs: Option<f64>,
    pub cell_utilization_pct: Option<f64>,
    pub remarks: String,
    pub trx_delta: i64,
    pub post_trx_per_sector: Option<i64>,
    pub post_total_tch: Option<i64>,
    pub post_equipped_capacity_erlangs: Option<f64>,
    pub post_cell_utilization_pct: Option<f64>,
    pub post_trx_per_site: Option<i64>,
    pub incomplete: bool,
    pub status: String,
    pub diagnostic: Option<String>,
}

impl From<&PlannedCell> for OutputRow {
    fn from(row: &PlannedCell) -> Self {
        let record = &row.record;
        Self {
            cell_id: row.cell_id.clone(),
            site_id: record.site_id.clone(),
            cell_name: record.cell_name.clone(),
            bsc: record.meta.bsc.clone(),
            vendor: record.meta.vendor.clone(),
            town: record.meta.town.clone(),
            trx_900: i64::from(record.trx_900),
            trx_1800: i64::from(record.trx_1800),
            trx_per_sector: record.trx_per_sector(),
            bcch: i64::from(record.bcch),
            sdcch: i64::from(record.sdcch),
            pdtch: i64::from(record.pdtch),
            ccch: i64::from(record.ccch),
            trx_per_site: i64::from(record.trx_per_site),
            avg_traffic_erlangs: record.avg_traffic_erlangs,
            hr_traffic_pct: record.hr_traffic_pct,
            blocking_nom_avg_pct: record.blocking_nom_avg_pct,
            blocking_exceed_count: record.blocking_exceed_count.map(i64::from),
            // Malformed rows still report the raw channel count
            total_tch: row
                .baseline
                .map(|b| b.total_tch)
                .unwrap_or_else(|| record.total_tch()),
            equipped_capacity_erlangs: row.baseline.map(|b| b.equipped_capacity_erlangs),
            cell_utilization_pct: row.baseline.map(|b| b.cell_utilization_pct),
            remarks: row.label.map(|l| l.remark()).unwrap_or("").to_string(),
            trx_delta: i64::from(row.trx_delta),
            post_trx_per_sector: row.post.map(|p| p.post_trx_per_sector),
            post_total_tch: row.post.map(|p| p.post_total_tch),
            post_equipped_capacity_erlangs: row.post.and_then(|p| p.post_equipped_capacity_erlangs),
            post_cell_utilization_pct: row.post.and_then(|p| p.post_cell_utilization_pct),
            post_trx_per_site: row.post.map(|p| p.post_trx_per_site),
            incomplete: row.incomplete,
            status: row.status.as_str().to_string(),
            diagnostic: row.diagnostic.clone(),
        }
    }
}

/// Convert planned rows into a DataFrame.
pub fn rows_to_dataframe(rows: &[PlannedCell]) -> Result<DataFrame> {
    let flat: Vec<OutputRow> = rows.iter().map(OutputRow::from).collect();

    macro_rules! values {
        ($field:ident) => {
            flat.iter().map(|r| r.$field.clone()).collect::<Vec<_>>()
        };
    }

    let df = df!(
        "cell_id" => values!(cell_id),
        "site_id" => values!(site_id),
        "cell_name" => values!(cell_name),
        "bsc" => values!(bsc),
        "vendor" => values!(vendor),
        "town" => values!(town),
        "trx_900" => values!(trx_900),
        "trx_1800" => values!(trx_1800),
        "trx_per_sector" => values!(trx_per_sector),
        "bcch" => values!(bcch),
        "sdcch" => values!(sdcch),
        "pdtch" => values!(pdtch),
        "ccch" => values!(ccch),
        "trx_per_site" => values!(trx_per_site),
        "avg_traffic_erlangs" => values!(avg_traffic_erlangs),
        "hr_traffic_pct" => values!(hr_traffic_pct),
        "blocking_nom_avg_pct" => values!(blocking_nom_avg_pct),
        "blocking_exceed_count" => values!(blocking_exceed_count),
        "total_tch" => values!(total_tch),
        "equipped_capacity_erlangs" => values!(equipped_capacity_erlangs),
        "cell_utilization_pct" => values!(cell_utilization_pct),
        "remarks" => values!(remarks),
        "trx_delta" => values!(trx_delta),
        "post_trx_per_sector" => values!(post_trx_per_sector),
        "post_total_tch" => values!(post_total_tch),
        "post_equipped_capacity_erlangs" => values!(post_equipped_capacity_erlangs),
        "post_cell_utilization_pct" => values!(post_cell_utilization_pct),
        "post_trx_per_site" => values!(post_trx_per_site),
        "incomplete" => values!(incomplete),
        "status" => values!(status),
        "diagnostic" => values!(diagnostic),
    )?;

    Ok(df)
}

/// Write rows as CSV with a header line.
pub fn write_csv(rows: &[PlannedCell], path: &Path) -> Result<()> {
    let mut df = rows_to_dataframe(rows)?;
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .with_context(|| format!("Failed to write CSV: {}", path.display()))?;
    Ok(())
}

/// Write rows as a JSON array of flat objects.
pub fn write_json(rows: &[PlannedCell], path: &Path) -> Result<()> {
    let flat: Vec<OutputRow> = rows.iter().map(OutputRow::from).collect();
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    serde_json::to_writer_pretty(file, &flat)
        .with_context(|| format!("Failed to write JSON: {}", path.display()))?;
    Ok(())
}

/// Write rows in the format implied by the file extension.
pub fn write_output(rows: &[PlannedCell], path: &Path) -> Result<()> {
    match SourceType::from_path(path)? {
        SourceType::Csv => write_csv(rows, path)?,
        SourceType::Json => write_json(rows, path)?,
    }
    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

#[derive(Serialize)]
struct RunReport<'a> {
    summary: &'a BatchSummary,
    excluded: &'a [ExcludedCell],
}

/// Write the run summary and the excluded cells as JSON.
pub fn write_summary(result: &BatchResult, path: &Path) -> Result<()> {
    let report = RunReport {
        summary: &result.summary,
        excluded: &result.excluded,
    };
    let file = File::create(path)
        .with_context(|| format!("Failed to create summary file: {}", path.display()))?;
    serde_json::to_writer_pretty(file, &report)
        .with_context(|| format!("Failed to write summary: {}", path.display()))?;
    Ok(())
}
