use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::domain::CellRecord;

/// Computes per-site TRX totals.
///
/// The total must be in place before planning starts; the planner treats it
/// as a fixed input and only offsets it by the trial delta.
pub struct SiteAggregator;

impl SiteAggregator {
    /// Sum of TRX per sector for every site.
    pub fn site_totals(cells: &[CellRecord]) -> HashMap<String, i64> {
        let mut totals: HashMap<String, i64> = HashMap::new();
        for cell in cells {
            let total = totals.entry(cell.site_id.clone()).or_insert(0);
            *total = total.saturating_add(cell.trx_per_sector());
        }
        totals
    }

    /// Copy of `cells` with `trx_per_site` filled in.
    ///
    /// Totals beyond `u32::MAX` are clamped; such a site can never pass the
    /// Grow site ceiling.
    pub fn apply(cells: &[CellRecord]) -> Vec<CellRecord> {
        let totals = Self::site_totals(cells);
        cells
            .iter()
            .map(|cell| {
                let mut cell = cell.clone();
                let total = totals.get(&cell.site_id).copied().unwrap_or(0);
                cell.trx_per_site = u32::try_from(total).unwrap_or(u32::MAX);
                cell
            })
            .collect()
    }
}

/// One daily blocking measurement for a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockingSample {
    pub cell_key: String,
    pub tch_blocking_nom: Option<f64>,
    pub tch_blocking_user_perceived: Option<f64>,
}

/// Blocking statistics of one cell over the lookback window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockingSummary {
    /// Mean nominal TCH blocking over samples that reported it.
    pub mean_nom_pct: Option<f64>,
    /// Samples whose user-perceived blocking exceeded the threshold.
    pub exceed_count: u32,
    pub samples: usize,
}

/// Enricher joining aggregated blocking statistics onto cell records
pub struct BlockingEnricher {
    stats: HashMap<String, BlockingSummary>,
}

impl BlockingEnricher {
    /// Aggregate raw samples by cell key.
    ///
    /// A sample counts towards `exceed_count` when its user-perceived
    /// blocking is strictly greater than `exceed_threshold_pct`; samples
    /// without that value never count.
    pub fn from_samples(samples: &[BlockingSample], exceed_threshold_pct: f64) -> Self {
        struct Acc {
            nom_sum: f64,
            nom_n: usize,
            exceed: u32,
            samples: usize,
        }

        let mut acc: HashMap<&str, Acc> = HashMap::new();
        for sample in samples {
            let entry = acc.entry(sample.cell_key.as_str()).or_insert(Acc {
                nom_sum: 0.0,
                nom_n: 0,
                exceed: 0,
                samples: 0,
            });
            entry.samples += 1;
            if let Some(nom) = sample.tch_blocking_nom.filter(|v| v.is_finite()) {
                entry.nom_sum += nom;
                entry.nom_n += 1;
            }
            if sample
                .tch_blocking_user_perceived
                .is_some_and(|v| v > exceed_threshold_pct)
            {
                entry.exceed += 1;
            }
        }

        let stats = acc
            .into_iter()
            .map(|(key, a)| {
                let summary = BlockingSummary {
                    mean_nom_pct: (a.nom_n > 0).then(|| a.nom_sum / a.nom_n as f64),
                    exceed_count: a.exceed,
                    samples: a.samples,
                };
                (key.to_string(), summary)
            })
            .collect();

        Self { stats }
    }

    pub fn get(&self, cell_key: &str) -> Option<&BlockingSummary> {
        self.stats.get(cell_key)
    }

    /// Number of distinct cell keys with statistics.
    pub fn key_count(&self) -> usize {
        self.stats.len()
    }

    /// Copy of `cells` with blocking fields set from the matching statistics.
    ///
    /// Cells without a match keep whatever blocking values they already had.
    pub fn enrich(&self, cells: &[CellRecord]) -> Vec<CellRecord> {
        let mut unmatched = 0usize;
        let enriched: Vec<CellRecord> = cells
            .iter()
            .map(|cell| {
                let mut cell = cell.clone();
                match cell.stats_key.as_deref().and_then(|k| self.stats.get(k)) {
                    Some(summary) => {
                        cell.blocking_nom_avg_pct = summary.mean_nom_pct;
                        cell.blocking_exceed_count = Some(summary.exceed_count);
                    }
                    None => unmatched += 1,
                }
                cell
            })
            .collect();

        info!(
            "Blocking statistics joined onto {} of {} cells ({} keys available)",
            enriched.len() - unmatched,
            enriched.len(),
            self.stats.len()
        );
        if unmatched > 0 {
            warn!(
                "{} cells have no blocking statistics and cannot be labelled Grow or Degrow",
                unmatched
            );
        }

        enriched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::test_support::sample_cell;

    fn sample(key: &str, nom: Option<f64>, perceived: Option<f64>) -> BlockingSample {
        BlockingSample {
            cell_key: key.to_string(),
            tch_blocking_nom: nom,
            tch_blocking_user_perceived: perceived,
        }
    }

    #[test]
    fn test_site_totals() {
        let mut a = sample_cell();
        a.trx_900 = 3;
        a.trx_1800 = 1;
        let mut b = sample_cell();
        b.cell_name = "DEL0001B".to_string();
        b.trx_900 = 2;
        b.trx_1800 = 0;
        let mut c = sample_cell();
        c.site_id = "DEL0002".to_string();
        c.trx_900 = 5;
        c.trx_1800 = 0;

        let cells = vec![a, b, c];
        let out = SiteAggregator::apply(&cells);
        assert_eq!(out[0].trx_per_site, 6);
        assert_eq!(out[1].trx_per_site, 6);
        assert_eq!(out[2].trx_per_site, 5);
        // Input untouched
        assert_eq!(cells[0].trx_per_site, 30);
    }

    #[test]
    fn test_site_totals_clamp_oversized_counts() {
        let mut a = sample_cell();
        a.trx_900 = u32::MAX;
        a.trx_1800 = u32::MAX;
        let mut b = sample_cell();
        b.cell_name = "DEL0001B".to_string();

        let totals = SiteAggregator::site_totals(&[a.clone(), b.clone()]);
        assert_eq!(totals["DEL0001"], 2 * i64::from(u32::MAX) + 4);

        let out = SiteAggregator::apply(&[a, b]);
        assert_eq!(out[0].trx_per_site, u32::MAX);
        assert_eq!(out[1].trx_per_site, u32::MAX);
    }

    #[test]
    fn test_aggregate_samples() {
        let samples = vec![
            sample("10011", Some(1.0), Some(0.5)),
            sample("10011", Some(3.0), Some(1.5)),
            sample("10011", None, Some(1.0)),
            sample("10011", Some(2.0), Some(4.0)),
            sample("20022", None, None),
        ];
        let enricher = BlockingEnricher::from_samples(&samples, 1.0);
        assert_eq!(enricher.key_count(), 2);

        let s = enricher.get("10011").unwrap();
        assert_eq!(s.mean_nom_pct, Some(2.0));
        assert_eq!(s.exceed_count, 2);
        assert_eq!(s.samples, 4);

        let empty = enricher.get("20022").unwrap();
        assert_eq!(empty.mean_nom_pct, None);
        assert_eq!(empty.exceed_count, 0);
    }

    #[test]
    fn test_enrich_left_join() {
        let samples = vec![sample("10011", Some(0.4), Some(2.0))];
        let enricher = BlockingEnricher::from_samples(&samples, 1.0);

        let mut matched = sample_cell();
        matched.blocking_exceed_count = None;
        let mut unmatched = sample_cell();
        unmatched.stats_key = Some("99999".to_string());
        unmatched.blocking_exceed_count = None;
        let mut keyless = sample_cell();
        keyless.stats_key = None;

        let out = enricher.enrich(&[matched, unmatched, keyless]);
        assert_eq!(out[0].blocking_exceed_count, Some(1));
        assert_eq!(out[0].blocking_nom_avg_pct, Some(0.4));
        assert_eq!(out[1].blocking_exceed_count, None);
        // Pre-existing values survive when nothing matches
        assert_eq!(out[2].blocking_exceed_count, Some(4));
    }
}
