use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::{Arc, RwLock};

use crate::error::ScoreError;
use crate::scoring::{
    series_warnings, AsOf, CompositeScore, HistoryPoint, IndicatorTable, ScoringContext,
};
use crate::store::{load_observations, ObservationStore};

/// Everything derived from one observation load: the latest composite score
/// and the full monthly history.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub current: Result<CompositeScore, ScoreError>,
    pub history: Vec<HistoryPoint>,
    pub observations: usize,
    pub computed_at: DateTime<Utc>,
}

/// Score and build history over one store snapshot.
pub fn compute_snapshot(store: &ObservationStore, indicators: &IndicatorTable) -> Snapshot {
    let ctx = ScoringContext::new(store, indicators);
    Snapshot {
        current: ctx.score(AsOf::Latest),
        history: ctx.build_history(),
        observations: store.total_observations(),
        computed_at: Utc::now(),
    }
}

/// Single publish point for computed snapshots.
///
/// A snapshot is only ever swapped in whole, so readers see either the
/// previous complete result or the new one.
#[derive(Clone, Default)]
pub struct SharedSnapshot {
    inner: Arc<RwLock<Option<Arc<Snapshot>>>>,
}

impl SharedSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest published snapshot, if any.
    pub fn get(&self) -> Option<Arc<Snapshot>> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Arc::clone(&snapshot));
        snapshot
    }
}

/// Reload observations and recompute score and history on a blocking worker,
/// then publish the result.
///
/// On failure nothing is published and the previous snapshot stays visible.
pub async fn refresh(
    data_path: &Path,
    indicators: Arc<IndicatorTable>,
    shared: &SharedSnapshot,
) -> Result<Arc<Snapshot>> {
    let path = data_path.to_path_buf();
    let started = std::time::Instant::now();

    let snapshot = tokio::task::spawn_blocking(move || -> Result<Snapshot> {
        let store = load_observations(&path)?;
        for warning in series_warnings(&indicators, &store) {
            tracing::warn!("{}", warning);
        }
        Ok(compute_snapshot(&store, &indicators))
    })
    .await
    .context("Refresh worker failed")??;

    tracing::info!(
        observations = snapshot.observations,
        history_points = snapshot.history.len(),
        elapsed = %humantime::format_duration(started.elapsed()),
        "refreshed liquidity snapshot"
    );

    Ok(shared.publish(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{IndicatorConfig, Polarity};
    use chrono::NaiveDate;
    use std::env;
    use std::fs;

    fn table() -> Arc<IndicatorTable> {
        Arc::new(IndicatorTable::new(vec![
            IndicatorConfig::new("X", "X", 0.6, Polarity::Normal),
            IndicatorConfig::new("Y", "Y", 0.4, Polarity::Inverted),
        ]))
    }

    #[test]
    fn test_compute_snapshot() {
        let mut store = ObservationStore::new();
        let jan = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let jun = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
        store.insert("X", jan, 0.0);
        store.insert("X", jun, 10.0);
        store.insert("Y", jan, 5.0);
        store.insert("Y", jun, 0.0);

        let snapshot = compute_snapshot(&store, &table());
        assert_eq!(snapshot.current.as_ref().unwrap().score, 100.0);
        assert_eq!(snapshot.history.len(), 2);
        assert_eq!(snapshot.observations, 4);
    }

    #[test]
    fn test_compute_snapshot_empty() {
        let snapshot = compute_snapshot(&ObservationStore::new(), &table());
        assert_eq!(snapshot.current, Err(ScoreError::InsufficientData));
        assert!(snapshot.history.is_empty());
    }

    #[test]
    fn test_shared_snapshot_starts_empty() {
        assert!(SharedSnapshot::new().get().is_none());
    }

    #[tokio::test]
    async fn test_refresh_publishes_and_keeps_previous_on_failure() {
        let temp_path = env::temp_dir().join("liquidity_score_test_refresh.json");
        fs::write(
            &temp_path,
            r#"{
                "X": [{"date": "2020-01-01", "value": 0.0}, {"date": "2020-06-01", "value": 10.0}],
                "Y": [{"date": "2020-01-01", "value": 5.0}, {"date": "2020-06-01", "value": 0.0}]
            }"#,
        )
        .unwrap();

        let shared = SharedSnapshot::new();
        let published = refresh(&temp_path, table(), &shared).await.unwrap();
        assert_eq!(published.current.as_ref().unwrap().score, 100.0);

        let missing = env::temp_dir().join("liquidity_score_test_refresh_missing.json");
        let _ = fs::remove_file(&missing);
        assert!(refresh(&missing, table(), &shared).await.is_err());

        let current = shared.get().unwrap();
        assert!(Arc::ptr_eq(&current, &published));

        let _ = fs::remove_file(&temp_path);
    }
}
