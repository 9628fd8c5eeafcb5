use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};
use std::iter::Peekable;

/// A single raw data point of one indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Raw observations keyed by indicator code.
///
/// Each series is an ordered map, so it is always ascending by date and a
/// second insert on the same date replaces the first (last-inserted wins).
/// As-of lookups are `O(log n)`; see [`AsOfCursor`] for forward scans.
#[derive(Debug, Clone, Default)]
pub struct ObservationStore {
    series: BTreeMap<String, BTreeMap<NaiveDate, f64>>,
}

impl ObservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one observation. Non-finite values are rejected and `false` is
    /// returned; the series is left untouched.
    pub fn insert(&mut self, code: &str, date: NaiveDate, value: f64) -> bool {
        if !value.is_finite() {
            tracing::warn!(indicator = code, %date, "dropping non-finite observation");
            return false;
        }
        self.series
            .entry(code.to_string())
            .or_default()
            .insert(date, value);
        true
    }

    /// Insert a batch of observations for one indicator. Returns how many were kept.
    pub fn extend<I>(&mut self, code: &str, observations: I) -> usize
    where
        I: IntoIterator<Item = Observation>,
    {
        observations
            .into_iter()
            .filter(|obs| self.insert(code, obs.date, obs.value))
            .count()
    }

    /// All observations of an indicator, ascending by date.
    pub fn all_observations(&self, code: &str) -> Vec<Observation> {
        self.series
            .get(code)
            .map(|s| s.iter().map(|(d, v)| Observation::new(*d, *v)).collect())
            .unwrap_or_default()
    }

    /// Raw values of an indicator in date order.
    pub fn values(&self, code: &str) -> impl Iterator<Item = f64> + '_ {
        self.series
            .get(code)
            .into_iter()
            .flat_map(|s| s.values().copied())
    }

    /// Chronologically last observation.
    pub fn latest(&self, code: &str) -> Option<Observation> {
        self.series
            .get(code)?
            .iter()
            .next_back()
            .map(|(d, v)| Observation::new(*d, *v))
    }

    pub fn latest_at_or_before(&self, code: &str, date: NaiveDate) -> Option<Observation> {
        self.series
            .get(code)?
            .range(..=date)
            .next_back()
            .map(|(d, v)| Observation::new(*d, *v))
    }

    /// Latest observation with `from <= date <= to`.
    pub fn latest_in_range(&self, code: &str, from: NaiveDate, to: NaiveDate) -> Option<Observation> {
        if from > to {
            return None;
        }
        self.series
            .get(code)?
            .range(from..=to)
            .next_back()
            .map(|(d, v)| Observation::new(*d, *v))
    }

    /// Forward-only cursor over one indicator, for monotonically advancing queries.
    pub fn cursor(&self, code: &str) -> Option<AsOfCursor<'_>> {
        self.series.get(code).map(|s| AsOfCursor {
            iter: s.iter().peekable(),
            current: None,
        })
    }

    /// Union of the observation dates of the given indicators.
    pub fn union_dates<'a, I>(&self, codes: I) -> BTreeSet<NaiveDate>
    where
        I: IntoIterator<Item = &'a str>,
    {
        codes
            .into_iter()
            .filter_map(|code| self.series.get(code))
            .flat_map(|s| s.keys().copied())
            .collect()
    }

    /// Codes of every indicator with at least one observation.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.series
            .iter()
            .filter(|(_, s)| !s.is_empty())
            .map(|(code, _)| code.as_str())
    }

    pub fn len(&self, code: &str) -> usize {
        self.series.get(code).map_or(0, |s| s.len())
    }

    pub fn total_observations(&self) -> usize {
        self.series.values().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_observations() == 0
    }
}

/// Merge-scan cursor returning the latest observation at or before a date.
///
/// Dates passed to [`AsOfCursor::advance_to`] must not decrease between calls.
pub struct AsOfCursor<'a> {
    iter: Peekable<btree_map::Iter<'a, NaiveDate, f64>>,
    current: Option<Observation>,
}

impl AsOfCursor<'_> {
    pub fn advance_to(&mut self, date: NaiveDate) -> Option<Observation> {
        while let Some((d, v)) = self.iter.peek() {
            if **d <= date {
                self.current = Some(Observation::new(**d, **v));
                self.iter.next();
            } else {
                break;
            }
        }
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_store() -> ObservationStore {
        let mut store = ObservationStore::new();
        store.insert("M2SL", date(2024, 3, 1), 3.0);
        store.insert("M2SL", date(2024, 1, 1), 1.0);
        store.insert("M2SL", date(2024, 2, 1), 2.0);
        store
    }

    #[test]
    fn test_observations_are_sorted_by_date() {
        let store = sample_store();
        let obs = store.all_observations("M2SL");
        let dates: Vec<_> = obs.iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 2, 1), date(2024, 3, 1)]);
    }

    #[test]
    fn test_duplicate_date_last_insert_wins() {
        let mut store = sample_store();
        store.insert("M2SL", date(2024, 2, 1), 20.0);
        assert_eq!(store.len("M2SL"), 3);
        assert_eq!(
            store.latest_at_or_before("M2SL", date(2024, 2, 15)).unwrap().value,
            20.0
        );
    }

    #[test]
    fn test_non_finite_values_dropped() {
        let mut store = ObservationStore::new();
        assert!(!store.insert("FEDFUNDS", date(2024, 1, 1), f64::NAN));
        assert!(!store.insert("FEDFUNDS", date(2024, 1, 2), f64::INFINITY));
        assert!(store.is_empty());
        assert_eq!(store.codes().count(), 0);
    }

    #[test]
    fn test_extend_counts_kept() {
        let mut store = ObservationStore::new();
        let kept = store.extend(
            "WDTGAL",
            vec![
                Observation::new(date(2024, 1, 1), 1.0),
                Observation::new(date(2024, 1, 8), f64::NAN),
                Observation::new(date(2024, 1, 15), 2.0),
            ],
        );
        assert_eq!(kept, 2);
        assert_eq!(store.total_observations(), 2);
    }

    #[test]
    fn test_latest_at_or_before() {
        let store = sample_store();
        assert_eq!(store.latest_at_or_before("M2SL", date(2023, 12, 31)), None);
        assert_eq!(
            store.latest_at_or_before("M2SL", date(2024, 2, 1)).unwrap().value,
            2.0
        );
        assert_eq!(
            store.latest_at_or_before("M2SL", date(2030, 1, 1)).unwrap().value,
            3.0
        );
        assert_eq!(store.latest_at_or_before("UNKNOWN", date(2030, 1, 1)), None);
    }

    #[test]
    fn test_latest_in_range() {
        let store = sample_store();
        let obs = store
            .latest_in_range("M2SL", date(2024, 1, 1), date(2024, 2, 29))
            .unwrap();
        assert_eq!(obs.date, date(2024, 2, 1));
        assert!(store
            .latest_in_range("M2SL", date(2025, 1, 1), date(2025, 12, 31))
            .is_none());
        assert!(store
            .latest_in_range("M2SL", date(2024, 3, 1), date(2024, 1, 1))
            .is_none());
    }

    #[test]
    fn test_cursor_matches_point_lookups() {
        let store = sample_store();
        let mut cursor = store.cursor("M2SL").unwrap();
        for d in [date(2023, 12, 1), date(2024, 1, 15), date(2024, 2, 1), date(2024, 6, 1)] {
            assert_eq!(cursor.advance_to(d), store.latest_at_or_before("M2SL", d));
        }
    }

    #[test]
    fn test_union_dates() {
        let mut store = sample_store();
        store.insert("FEDFUNDS", date(2024, 1, 1), 5.0);
        store.insert("FEDFUNDS", date(2024, 1, 20), 5.25);
        let dates = store.union_dates(["M2SL", "FEDFUNDS"]);
        assert_eq!(dates.len(), 4);
        assert_eq!(dates.iter().next(), Some(&date(2024, 1, 1)));
    }
}
