use anyhow::{bail, Context, Result};
use log::{info, warn};
use polars::prelude::*;
use std::path::{Path, PathBuf};

use crate::algorithms::erlang::{ErlangBEntry, ErlangBTable};
use crate::config::ErlangSettings;
use crate::core::domain::{CellMeta, CellRecord};
use crate::preprocessing::enricher::BlockingSample;

/// Represents the source type of tabular input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Json,
    Csv,
}

impl SourceType {
    /// Detect the source type from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .context("File has no extension")?;

        match extension.to_lowercase().as_str() {
            "json" => Ok(SourceType::Json),
            "csv" => Ok(SourceType::Csv),
            _ => bail!("Unsupported file format: {}", extension),
        }
    }
}

/// Result of loading a cell inventory
#[derive(Debug)]
pub struct CellLoadResult {
    pub cells: Vec<CellRecord>,
    pub source_type: SourceType,
    /// Rows dropped because an identity or count column was unusable.
    pub skipped_rows: Vec<String>,
}

// Accepted header names per field: snake_case first, then the CBS export headers.
const SITE_ID_COLUMNS: &[&str] = &["site_id", "SITE_ID", "2G_Site_ID"];
const CELL_NAME_COLUMNS: &[&str] = &["cell_name", "Cell_Name", "Cellname"];
const STATS_KEY_COLUMNS: &[&str] = &["stats_key", "MO", "Cell ID"];
const BSC_COLUMNS: &[&str] = &["bsc", "BSC", "BSC Name"];
const VENDOR_COLUMNS: &[&str] = &["vendor", "OEM", "Vendor Name"];
const TOWN_COLUMNS: &[&str] = &["town", "HQ_TOWN", "Town"];
const TRX_900_COLUMNS: &[&str] = &["trx_900", "900 TRX", "#900 Active TRX"];
const TRX_1800_COLUMNS: &[&str] = &["trx_1800", "1800 TRX", "#1800 Active TRX"];
const BCCH_COLUMNS: &[&str] = &["bcch", "BCCH"];
const SDCCH_COLUMNS: &[&str] = &[
    "sdcch",
    "SDCCH",
    "NO OF SDCCH (CAVAACC - NBH) ",
    "NO OF SDCCH (CAVAACC - NBH)",
];
const PDTCH_COLUMNS: &[&str] = &["pdtch", "PDTCH"];
const CCCH_COLUMNS: &[&str] = &["ccch", "CCCH"];
const TRAFFIC_COLUMNS: &[&str] = &[
    "avg_traffic_erlangs",
    "Traffic(avg 7 days)",
    "Average BBH Traffic (Total)",
];
const HR_TRAFFIC_COLUMNS: &[&str] = &["hr_traffic_pct", "% HR Traffic(avg 7 days)", "% HR Traffic"];
const BLOCKING_NOM_COLUMNS: &[&str] = &["blocking_nom_avg_pct", "TCH Blocking Nom(avg 7 days)"];
const BLOCKING_COUNT_COLUMNS: &[&str] = &[
    "blocking_exceed_count",
    "TCH Blocking (>1%) count in last 7 days",
];
const SITE_TRX_COLUMNS: &[&str] = &["trx_per_site", "TRX per site"];

const SAMPLE_KEY_COLUMNS: &[&str] = &["CELL_ID", "cell_key"];
const SAMPLE_NOM_COLUMNS: &[&str] = &["TCH_Blocking_Nom", "tch_blocking_nom"];
const SAMPLE_PERCEIVED_COLUMNS: &[&str] = &[
    "TCH_Blocking_User_Perceived",
    "tch_blocking_user_perceived",
];

/// Parse a CSV file with a header row into a DataFrame
fn read_csv(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to parse CSV file: {}", path.display()))
}

fn find_column<'a>(df: &DataFrame, candidates: &[&'a str]) -> Option<&'a str> {
    candidates.iter().copied().find(|name| df.column(name).is_ok())
}

fn f64_column(df: &DataFrame, candidates: &[&str]) -> Result<Option<Vec<Option<f64>>>> {
    let Some(name) = find_column(df, candidates) else {
        return Ok(None);
    };
    let column = df
        .column(name)?
        .cast(&DataType::Float64)
        .with_context(|| format!("Column '{}' is not numeric", name))?;
    let values = column.f64()?.into_iter().collect();
    Ok(Some(values))
}

fn str_column(df: &DataFrame, candidates: &[&str]) -> Result<Option<Vec<Option<String>>>> {
    let Some(name) = find_column(df, candidates) else {
        return Ok(None);
    };
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
        .collect();
    Ok(Some(values))
}

fn required<T>(values: Option<T>, field: &str, candidates: &[&str]) -> Result<T> {
    values.with_context(|| {
        format!(
            "Missing required column for {} (accepted: {})",
            field,
            candidates.join(", ")
        )
    })
}

/// Non-negative whole number, or `None`.
fn as_count(value: Option<f64>) -> Option<u32> {
    let v = value?;
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) {
        Some(v as u32)
    } else {
        None
    }
}

fn nth<T: Clone>(values: &Option<Vec<Option<T>>>, idx: usize) -> Option<T> {
    values.as_ref().and_then(|v| v.get(idx).cloned().flatten())
}

/// Loader for the per-cell inventory (TRX counts, overheads, traffic).
pub struct CellInventoryLoader;

impl CellInventoryLoader {
    /// Load cells from a file (auto-detects JSON or CSV)
    pub fn load_from_file(path: &Path) -> Result<CellLoadResult> {
        match SourceType::from_path(path)? {
            SourceType::Json => Self::load_from_json(path),
            SourceType::Csv => Self::load_from_csv(path),
        }
    }

    /// Load cells from a JSON array of records
    pub fn load_from_json(path: &Path) -> Result<CellLoadResult> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read cell file: {}", path.display()))?;
        Self::load_from_json_str(&content)
    }

    pub fn load_from_json_str(json_str: &str) -> Result<CellLoadResult> {
        let cells: Vec<CellRecord> =
            serde_json::from_str(json_str).context("Failed to parse cell JSON")?;
        info!("Loaded {} cells from JSON", cells.len());
        Ok(CellLoadResult {
            cells,
            source_type: SourceType::Json,
            skipped_rows: Vec::new(),
        })
    }

    /// Load cells from a CSV export
    pub fn load_from_csv(path: &Path) -> Result<CellLoadResult> {
        let df = read_csv(path)?;
        let mut result = Self::dataframe_to_cells(&df)
            .with_context(|| format!("Failed to read cells from {}", path.display()))?;
        result.source_type = SourceType::Csv;
        Ok(result)
    }

    /// Convert a DataFrame of inventory rows into cell records.
    ///
    /// Rows without a site or cell name, or with a TRX or overhead count that
    /// is not a non-negative whole number, are skipped and reported. Missing
    /// traffic values become NaN so the record is flagged downstream.
    pub fn dataframe_to_cells(df: &DataFrame) -> Result<CellLoadResult> {
        let site_ids = required(str_column(df, SITE_ID_COLUMNS)?, "site_id", SITE_ID_COLUMNS)?;
        let cell_names = required(
            str_column(df, CELL_NAME_COLUMNS)?,
            "cell_name",
            CELL_NAME_COLUMNS,
        )?;
        let stats_keys = str_column(df, STATS_KEY_COLUMNS)?;
        let bscs = str_column(df, BSC_COLUMNS)?;
        let vendors = str_column(df, VENDOR_COLUMNS)?;
        let towns = str_column(df, TOWN_COLUMNS)?;

        let trx_900 = required(f64_column(df, TRX_900_COLUMNS)?, "trx_900", TRX_900_COLUMNS)?;
        let trx_1800 = required(
            f64_column(df, TRX_1800_COLUMNS)?,
            "trx_1800",
            TRX_1800_COLUMNS,
        )?;
        let bcch = required(f64_column(df, BCCH_COLUMNS)?, "bcch", BCCH_COLUMNS)?;
        let sdcch = required(f64_column(df, SDCCH_COLUMNS)?, "sdcch", SDCCH_COLUMNS)?;
        let pdtch = required(f64_column(df, PDTCH_COLUMNS)?, "pdtch", PDTCH_COLUMNS)?;
        let ccch = required(f64_column(df, CCCH_COLUMNS)?, "ccch", CCCH_COLUMNS)?;
        let traffic = required(
            f64_column(df, TRAFFIC_COLUMNS)?,
            "avg_traffic_erlangs",
            TRAFFIC_COLUMNS,
        )?;
        let hr_traffic = required(
            f64_column(df, HR_TRAFFIC_COLUMNS)?,
            "hr_traffic_pct",
            HR_TRAFFIC_COLUMNS,
        )?;
        let blocking_nom = f64_column(df, BLOCKING_NOM_COLUMNS)?;
        let blocking_count = f64_column(df, BLOCKING_COUNT_COLUMNS)?;
        let site_trx = f64_column(df, SITE_TRX_COLUMNS)?;

        let mut cells = Vec::with_capacity(df.height());
        let mut skipped_rows = Vec::new();

        for idx in 0..df.height() {
            let (Some(site_id), Some(cell_name)) =
                (site_ids[idx].clone(), cell_names[idx].clone())
            else {
                skipped_rows.push(format!("row {}: missing site id or cell name", idx + 1));
                continue;
            };

            let counts = [
                ("trx_900", as_count(trx_900[idx])),
                ("trx_1800", as_count(trx_1800[idx])),
                ("bcch", as_count(bcch[idx])),
                ("sdcch", as_count(sdcch[idx])),
                ("pdtch", as_count(pdtch[idx])),
                ("ccch", as_count(ccch[idx])),
            ];
            if let Some((field, _)) = counts.iter().find(|(_, v)| v.is_none()) {
                skipped_rows.push(format!(
                    "row {} ({}): {} is not a non-negative whole number",
                    idx + 1,
                    cell_name,
                    field
                ));
                continue;
            }
            let [trx_900_n, trx_1800_n, bcch_n, sdcch_n, pdtch_n, ccch_n] =
                counts.map(|(_, v)| v.unwrap_or(0));

            cells.push(CellRecord {
                site_id,
                cell_name,
                stats_key: nth(&stats_keys, idx),
                meta: CellMeta {
                    bsc: nth(&bscs, idx),
                    vendor: nth(&vendors, idx),
                    town: nth(&towns, idx),
                },
                trx_900: trx_900_n,
                trx_1800: trx_1800_n,
                bcch: bcch_n,
                sdcch: sdcch_n,
                pdtch: pdtch_n,
                ccch: ccch_n,
                avg_traffic_erlangs: traffic[idx].unwrap_or(f64::NAN),
                hr_traffic_pct: hr_traffic[idx].unwrap_or(f64::NAN),
                blocking_nom_avg_pct: nth(&blocking_nom, idx),
                blocking_exceed_count: as_count(nth(&blocking_count, idx)),
                trx_per_site: as_count(nth(&site_trx, idx)).unwrap_or(0),
            });
        }

        for skipped in skipped_rows.iter().take(5) {
            warn!("Skipped inventory {}", skipped);
        }
        info!(
            "Loaded {} cells from CSV ({} rows skipped)",
            cells.len(),
            skipped_rows.len()
        );

        Ok(CellLoadResult {
            cells,
            source_type: SourceType::Csv,
            skipped_rows,
        })
    }
}

/// Loader for the Erlang-B reference table
pub struct ErlangTableLoader;

impl ErlangTableLoader {
    /// Load and validate an Erlang-B table (auto-detects JSON or CSV).
    ///
    /// The configured match policy is applied to the returned table.
    pub fn load_from_file(path: &Path, settings: &ErlangSettings) -> Result<ErlangBTable> {
        let entries = match SourceType::from_path(path)? {
            SourceType::Json => {
                let content = std::fs::read_to_string(path).with_context(|| {
                    format!("Failed to read Erlang-B table: {}", path.display())
                })?;
                serde_json::from_str::<Vec<ErlangBEntry>>(&content)
                    .context("Failed to parse Erlang-B table JSON")?
            }
            SourceType::Csv => {
                let df = read_csv(path)?;
                Self::dataframe_to_entries(&df, settings)?
            }
        };

        let table = ErlangBTable::new(entries)
            .with_context(|| format!("Erlang-B table {} failed validation", path.display()))?
            .with_policy(settings.match_policy);
        info!(
            "Loaded Erlang-B table with {} entries ({:?} lookup)",
            table.len(),
            table.policy()
        );
        Ok(table)
    }

    /// Extract `(channels, capacity)` pairs from the configured columns.
    ///
    /// Rows where either value is blank are ignored; a channel count that is
    /// not a non-negative whole number is an error.
    pub fn dataframe_to_entries(
        df: &DataFrame,
        settings: &ErlangSettings,
    ) -> Result<Vec<ErlangBEntry>> {
        let channels_col = [settings.channels_column.as_str()];
        let capacity_col = [settings.capacity_column.as_str()];
        let channels = required(f64_column(df, &channels_col)?, "channels", &channels_col)?;
        let capacity = required(f64_column(df, &capacity_col)?, "capacity", &capacity_col)?;

        let mut entries = Vec::with_capacity(channels.len());
        for (idx, (n, cap)) in channels.into_iter().zip(capacity).enumerate() {
            let (Some(n), Some(cap)) = (n, cap) else {
                continue;
            };
            let Some(n) = as_count(Some(n)) else {
                bail!("Erlang-B row {}: invalid channel count {}", idx + 1, n);
            };
            entries.push(ErlangBEntry::new(n, cap));
        }
        Ok(entries)
    }
}

/// Loader for daily blocking-statistics exports
pub struct BlockingStatsLoader;

impl BlockingStatsLoader {
    /// Load every `.csv` file in `dir`, in file-name order.
    pub fn load_dir(dir: &Path) -> Result<Vec<BlockingSample>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to list blocking directory: {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
            })
            .collect();
        files.sort();

        let mut samples = Vec::new();
        for file in &files {
            samples.extend(Self::load_file(file)?);
        }
        info!(
            "Loaded {} blocking samples from {} files in {}",
            samples.len(),
            files.len(),
            dir.display()
        );
        Ok(samples)
    }

    /// Load samples from one CSV export. Rows without a cell key are dropped.
    pub fn load_file(path: &Path) -> Result<Vec<BlockingSample>> {
        let df = read_csv(path)?;
        Self::dataframe_to_samples(&df)
            .with_context(|| format!("Failed to read blocking samples from {}", path.display()))
    }

    pub fn dataframe_to_samples(df: &DataFrame) -> Result<Vec<BlockingSample>> {
        let keys = required(str_column(df, SAMPLE_KEY_COLUMNS)?, "CELL_ID", SAMPLE_KEY_COLUMNS)?;
        let nom = f64_column(df, SAMPLE_NOM_COLUMNS)?;
        let perceived = f64_column(df, SAMPLE_PERCEIVED_COLUMNS)?;

        let samples = keys
            .into_iter()
            .enumerate()
            .filter_map(|(idx, key)| {
                key.map(|cell_key| BlockingSample {
                    cell_key,
                    tch_blocking_nom: nth(&nom, idx),
                    tch_blocking_user_perceived: nth(&perceived, idx),
                })
            })
            .collect();
        Ok(samples)
    }
}
