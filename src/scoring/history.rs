use super::engine::{aggregate, month_key, ScoringContext};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub score: f64,
}

/// Group dates by calendar month and keep the last date of each month,
/// ascending.
pub fn month_end_dates<I>(dates: I) -> Vec<NaiveDate>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut months: BTreeMap<(i32, u32), NaiveDate> = BTreeMap::new();
    for date in dates {
        months
            .entry(month_key(date))
            .and_modify(|last| {
                if date > *last {
                    *last = date;
                }
            })
            .or_insert(date);
    }
    months.into_values().collect()
}

impl ScoringContext<'_> {
    /// Monthly composite score history.
    ///
    /// Each month present in the union of the configured indicators' dates is
    /// represented by its last available date `d`; every weighted indicator
    /// contributes its latest observation at or before `d`. Months where no
    /// indicator contributes are left out.
    pub fn build_history(&self) -> Vec<HistoryPoint> {
        let indicators = self.indicators();
        let store = self.store();

        let dates = month_end_dates(store.union_dates(indicators.iter().map(|i| i.code.as_str())));

        let mut cursors: Vec<_> = indicators
            .active()
            .filter_map(|indicator| store.cursor(&indicator.code).map(|c| (indicator, c)))
            .collect();

        let mut history = Vec::with_capacity(dates.len());
        for date in dates {
            let contributions: Vec<_> = cursors
                .iter_mut()
                .filter_map(|(indicator, cursor)| {
                    let observation = cursor.advance_to(date)?;
                    self.contribution(*indicator, observation)
                })
                .collect();

            if contributions.is_empty() {
                tracing::trace!(%date, "no contributing indicators, month omitted");
                continue;
            }

            history.push(HistoryPoint {
                date,
                score: aggregate(&contributions),
            });
        }

        tracing::debug!(points = history.len(), "built score history");
        history
    }
}
