//! Erlang-B capacity lookup.
//!
//! Capacity is read from a static reference table (channel count → offered
//! traffic at a fixed grade of service) rather than computed from the
//! Erlang-B formula. The table is validated once at construction and is
//! read-only afterwards, so it can be shared across worker threads by
//! reference.

use serde::{Deserialize, Serialize};

use crate::core::error::{SizingError, SizingResult};

/// One row of the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErlangBEntry {
    pub channels: u32,
    pub capacity_erlangs: f64,
}

impl ErlangBEntry {
    pub fn new(channels: u32, capacity_erlangs: f64) -> Self {
        Self {
            channels,
            capacity_erlangs,
        }
    }
}

/// How a channel count absent from the table is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Only exact channel counts resolve.
    #[default]
    Exact,
    /// Fall back to the largest listed channel count below the request.
    RoundDown,
}

/// Validated, channel-ordered Erlang-B table.
#[derive(Debug, Clone, PartialEq)]
pub struct ErlangBTable {
    entries: Vec<ErlangBEntry>,
    policy: MatchPolicy,
}

impl ErlangBTable {
    /// Build a table from unordered entries.
    ///
    /// Entries are sorted by channel count, then checked: the table must not
    /// be empty, capacities must be finite and non-negative, channel counts
    /// must be unique and capacity must not decrease as channels increase.
    ///
    /// # Examples
    ///
    /// ```
    /// use trx_sizing::algorithms::erlang::{ErlangBEntry, ErlangBTable};
    ///
    /// let table = ErlangBTable::new(vec![
    ///     ErlangBEntry::new(29, 21.0),
    ///     ErlangBEntry::new(28, 20.0),
    /// ])
    /// .unwrap();
    /// assert_eq!(table.lookup(28).unwrap(), 20.0);
    /// assert!(table.lookup(27).is_err());
    /// ```
    pub fn new(mut entries: Vec<ErlangBEntry>) -> SizingResult<Self> {
        if entries.is_empty() {
            return Err(SizingError::InvalidErlangTable("table is empty".to_string()));
        }

        if let Some(bad) = entries
            .iter()
            .find(|e| !e.capacity_erlangs.is_finite() || e.capacity_erlangs < 0.0)
        {
            return Err(SizingError::InvalidErlangTable(format!(
                "capacity {} at {} channels is not a non-negative number",
                bad.capacity_erlangs, bad.channels
            )));
        }

        entries.sort_by_key(|e| e.channels);

        for pair in entries.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if prev.channels == next.channels {
                return Err(SizingError::InvalidErlangTable(format!(
                    "duplicate channel count {}",
                    next.channels
                )));
            }
            if next.capacity_erlangs < prev.capacity_erlangs {
                return Err(SizingError::InvalidErlangTable(format!(
                    "capacity decreases from {} at {} channels to {} at {} channels",
                    prev.capacity_erlangs, prev.channels, next.capacity_erlangs, next.channels
                )));
            }
        }

        Ok(Self {
            entries,
            policy: MatchPolicy::default(),
        })
    }

    /// Set the policy used by [`lookup`](Self::lookup).
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn entries(&self) -> &[ErlangBEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Capacity in Erlangs for `channels` under the table's policy.
    pub fn lookup(&self, channels: i64) -> SizingResult<f64> {
        self.lookup_with(channels, self.policy)
    }

    /// Capacity in Erlangs for `channels` under an explicit policy.
    ///
    /// Negative channel counts never resolve.
    pub fn lookup_with(&self, channels: i64, policy: MatchPolicy) -> SizingResult<f64> {
        let miss = SizingError::NoCapacityForChannelCount { channels };
        if channels < 0 {
            return Err(miss);
        }
        let key = u32::try_from(channels).unwrap_or(u32::MAX);

        match self.entries.binary_search_by_key(&key, |e| e.channels) {
            Ok(idx) if i64::from(key) == channels => Ok(self.entries[idx].capacity_erlangs),
            Ok(idx) => match policy {
                MatchPolicy::Exact => Err(miss),
                MatchPolicy::RoundDown => Ok(self.entries[idx].capacity_erlangs),
            },
            Err(insert_at) => match policy {
                MatchPolicy::Exact => Err(miss),
                MatchPolicy::RoundDown if insert_at == 0 => Err(miss),
                MatchPolicy::RoundDown => Ok(self.entries[insert_at - 1].capacity_erlangs),
            },
        }
    }
}

/// Offered traffic as a percentage of equipped capacity.
///
/// `channels` only labels the error when the capacity is zero.
pub fn utilization_pct(
    traffic_erlangs: f64,
    capacity_erlangs: f64,
    channels: i64,
) -> SizingResult<f64> {
    if capacity_erlangs == 0.0 {
        return Err(SizingError::DivisionByZero { channels });
    }
    Ok(traffic_erlangs / capacity_erlangs * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ErlangBTable {
        ErlangBTable::new(vec![
            ErlangBEntry::new(30, 21.9),
            ErlangBEntry::new(20, 13.2),
            ErlangBEntry::new(28, 20.0),
            ErlangBEntry::new(0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_entries_sorted_on_load() {
        let t = table();
        let channels: Vec<u32> = t.entries().iter().map(|e| e.channels).collect();
        assert_eq!(channels, vec![0, 20, 28, 30]);
        assert_eq!(t.len(), 4);
        assert_eq!(t.policy(), MatchPolicy::Exact);
    }

    #[test]
    fn test_exact_lookup() {
        let t = table();
        assert_eq!(t.lookup(28).unwrap(), 20.0);
        assert_eq!(
            t.lookup(29),
            Err(SizingError::NoCapacityForChannelCount { channels: 29 })
        );
    }

    #[test]
    fn test_round_down_lookup() {
        let t = table().with_policy(MatchPolicy::RoundDown);
        assert_eq!(t.lookup(29).unwrap(), 20.0);
        assert_eq!(t.lookup(28).unwrap(), 20.0);
        assert_eq!(t.lookup(1000).unwrap(), 21.9);
    }

    #[test]
    fn test_round_down_below_first_entry() {
        let t = ErlangBTable::new(vec![ErlangBEntry::new(10, 5.1)])
            .unwrap()
            .with_policy(MatchPolicy::RoundDown);
        assert!(t.lookup(9).is_err());
    }

    #[test]
    fn test_negative_channels_miss() {
        let t = table().with_policy(MatchPolicy::RoundDown);
        assert_eq!(
            t.lookup(-3),
            Err(SizingError::NoCapacityForChannelCount { channels: -3 })
        );
    }

    #[test]
    fn test_lookup_with_overrides_policy() {
        let t = table();
        assert!(t.lookup_with(25, MatchPolicy::Exact).is_err());
        assert_eq!(t.lookup_with(25, MatchPolicy::RoundDown).unwrap(), 13.2);
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = ErlangBTable::new(vec![ErlangBEntry::new(8, 3.0), ErlangBEntry::new(8, 3.1)])
            .unwrap_err();
        assert!(matches!(err, SizingError::InvalidErlangTable(_)));
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_rejects_decreasing_capacity() {
        let err = ErlangBTable::new(vec![ErlangBEntry::new(8, 3.6), ErlangBEntry::new(9, 3.1)])
            .unwrap_err();
        assert!(err.to_string().contains("decreases"));
    }

    #[test]
    fn test_rejects_empty_and_nan() {
        assert!(ErlangBTable::new(vec![]).is_err());
        assert!(ErlangBTable::new(vec![ErlangBEntry::new(1, f64::NAN)]).is_err());
        assert!(ErlangBTable::new(vec![ErlangBEntry::new(1, -0.5)]).is_err());
    }

    #[test]
    fn test_equal_capacity_allowed() {
        let t = ErlangBTable::new(vec![ErlangBEntry::new(1, 0.0), ErlangBEntry::new(2, 0.0)]);
        assert!(t.is_ok());
    }

    #[test]
    fn test_utilization() {
        assert_eq!(utilization_pct(25.0, 20.0, 28).unwrap(), 125.0);
        assert_eq!(
            utilization_pct(5.0, 0.0, 0),
            Err(SizingError::DivisionByZero { channels: 0 })
        );
    }
}
