use super::config::{IndicatorConfig, IndicatorTable};
use super::normalize::ReferenceRange;
use crate::error::ScoreError;
use crate::store::{Observation, ObservationStore};
use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Point in time a composite score is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsOf {
    /// Last observation of every indicator
    Latest,
    /// Last observation within a calendar year
    Year(i32),
    /// Last observation within the month, else earlier in the same year
    YearMonth(i32, u32),
}

impl AsOf {
    /// Build from optional CLI-style parts, rejecting months outside 1-12.
    pub fn from_parts(year: Option<i32>, month: Option<u32>) -> Result<Self, ScoreError> {
        match (year, month) {
            (None, None) => Ok(AsOf::Latest),
            (Some(y), None) => Ok(AsOf::Year(y)),
            (Some(y), Some(m)) if (1..=12).contains(&m) => Ok(AsOf::YearMonth(y, m)),
            (Some(y), Some(m)) => Err(ScoreError::InvalidPeriod { year: y, month: m }),
            (None, Some(_)) => Err(ScoreError::MonthWithoutYear),
        }
    }

    /// Inclusive date window searched for an observation. `None` for `Latest`
    /// and for periods that do not map to a calendar window.
    fn window(&self) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            AsOf::Latest => None,
            AsOf::Year(y) => Some((
                NaiveDate::from_ymd_opt(y, 1, 1)?,
                NaiveDate::from_ymd_opt(y, 12, 31)?,
            )),
            AsOf::YearMonth(y, m) => {
                let first = NaiveDate::from_ymd_opt(y, m, 1)?;
                let end = first.checked_add_months(Months::new(1))?.pred_opt()?;
                Some((NaiveDate::from_ymd_opt(y, 1, 1)?, end))
            }
        }
    }
}

impl fmt::Display for AsOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsOf::Latest => write!(f, "latest"),
            AsOf::Year(y) => write!(f, "{}", y),
            AsOf::YearMonth(y, m) => write!(f, "{}-{:02}", y, m),
        }
    }
}

/// How one indicator fed into a composite score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub code: String,
    pub date: NaiveDate,
    pub raw: f64,
    pub scaled: f64,
    pub oriented: f64,
    pub weight: f64,
}

impl Contribution {
    /// Points this indicator adds on the 0-100 scale.
    pub fn points(&self) -> f64 {
        self.oriented * self.weight * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeScore {
    pub score: f64,
    /// Most recent observation date among the contributing indicators
    pub as_of_date: NaiveDate,
    pub contributions: Vec<Contribution>,
    /// Weighted indicators with no usable observation for the period
    pub skipped: Vec<String>,
}

/// One store snapshot together with the indicator table and the
/// reference ranges fitted over each full series.
///
/// Ranges are fit once here and shared by every point-in-time and history
/// query, so early dates are scaled against later values as well.
pub struct ScoringContext<'a> {
    store: &'a ObservationStore,
    indicators: &'a IndicatorTable,
    ranges: BTreeMap<String, ReferenceRange>,
}

impl<'a> ScoringContext<'a> {
    pub fn new(store: &'a ObservationStore, indicators: &'a IndicatorTable) -> Self {
        let mut ranges = BTreeMap::new();
        for indicator in indicators.iter() {
            match ReferenceRange::fit(store.values(&indicator.code)) {
                Some(range) => {
                    if range.is_degenerate() {
                        tracing::debug!(
                            "{}",
                            ScoreError::DegenerateRange(indicator.code.clone())
                        );
                    }
                    ranges.insert(indicator.code.clone(), range);
                }
                None => {
                    tracing::debug!("{}", ScoreError::NoObservations(indicator.code.clone()));
                }
            }
        }
        Self {
            store,
            indicators,
            ranges,
        }
    }

    pub fn store(&self) -> &ObservationStore {
        self.store
    }

    pub fn indicators(&self) -> &IndicatorTable {
        self.indicators
    }

    pub fn range(&self, code: &str) -> Option<ReferenceRange> {
        self.ranges.get(code).copied()
    }

    /// Composite score as of the given period.
    ///
    /// `Latest` considers every indicator; year and month queries only the
    /// weighted ones. Weighted indicators without an observation for the
    /// period are skipped; when nothing contributes the result is
    /// `InsufficientData`.
    pub fn score(&self, as_of: AsOf) -> Result<CompositeScore, ScoreError> {
        let window = match as_of {
            AsOf::Latest => None,
            _ => match as_of.window() {
                Some(w) => Some(w),
                None => {
                    match as_of {
                        AsOf::YearMonth(year, month) if !(1..=12).contains(&month) => {
                            tracing::warn!("{}", ScoreError::InvalidPeriod { year, month });
                        }
                        _ => tracing::warn!(period = %as_of, "period outside the calendar range"),
                    }
                    return Err(ScoreError::InsufficientData);
                }
            },
        };

        let mut contributions = Vec::new();
        let mut skipped = Vec::new();

        // Latest takes every indicator; weight-0 ones add no points but still
        // count as contributors and can set the as-of date.
        let candidates = self
            .indicators
            .iter()
            .filter(|i| window.is_none() || i.is_active());

        for indicator in candidates {
            let observation = match window {
                None => self.store.latest(&indicator.code),
                Some((from, to)) => self.store.latest_in_range(&indicator.code, from, to),
            };
            match observation.and_then(|obs| self.contribution(indicator, obs)) {
                Some(c) => contributions.push(c),
                None if indicator.is_active() => {
                    tracing::debug!(indicator = %indicator.code, period = %as_of, "no observation, skipping");
                    skipped.push(indicator.code.clone());
                }
                None => {}
            }
        }

        let as_of_date = contributions
            .iter()
            .map(|c| c.date)
            .max()
            .ok_or(ScoreError::InsufficientData)?;

        Ok(CompositeScore {
            score: aggregate(&contributions),
            as_of_date,
            contributions,
            skipped,
        })
    }

    /// Scale and orient one observation of an indicator.
    pub(crate) fn contribution(
        &self,
        indicator: &IndicatorConfig,
        observation: Observation,
    ) -> Option<Contribution> {
        let range = self.ranges.get(&indicator.code)?;
        let scaled = range.apply(observation.value);
        Some(Contribution {
            code: indicator.code.clone(),
            date: observation.date,
            raw: observation.value,
            scaled,
            oriented: indicator.polarity.orient(scaled),
            weight: indicator.weight,
        })
    }
}

/// Raw weighted sum of oriented values, times 100, rounded to one decimal.
/// Weights are not renormalized.
pub(crate) fn aggregate(contributions: &[Contribution]) -> f64 {
    let sum: f64 = contributions.iter().map(|c| c.oriented * c.weight).sum();
    round_one_decimal(sum * 100.0)
}

/// Ties go to the even digit.
pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Calendar month key of a date.
pub(crate) fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}
