use super::config::IndicatorTable;
use crate::store::ObservationStore;
use std::collections::HashSet;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Validate the indicator table at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_indicators(table: &IndicatorTable) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if table.is_empty() {
        errors.push("indicators: at least one indicator must be configured".to_string());
    }

    let mut seen = HashSet::new();
    for (i, indicator) in table.iter().enumerate() {
        if indicator.code.trim().is_empty() {
            errors.push(format!("indicators[{}].code: must not be empty", i));
        } else if !seen.insert(indicator.code.to_ascii_uppercase()) {
            errors.push(format!(
                "indicators[{}].code: duplicate code '{}'",
                i, indicator.code
            ));
        }

        if indicator.name.trim().is_empty() {
            errors.push(format!("indicators[{}].name: must not be empty", i));
        }

        if !indicator.weight.is_finite() || indicator.weight < 0.0 {
            errors.push(format!(
                "indicators[{}].weight: must be a non-negative number, got {}",
                i, indicator.weight
            ));
        }
    }

    if !table.is_empty() && table.active().count() == 0 {
        errors.push("indicators: at least one indicator needs a weight above 0".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Non-fatal remarks about the weighting scheme.
///
/// Weights are summed as-is, so a total other than 1 shifts every score
/// proportionally.
pub fn weight_warnings(table: &IndicatorTable) -> Vec<String> {
    let total = table.total_weight();
    if total > 0.0 && (total - 1.0).abs() > WEIGHT_TOLERANCE {
        vec![format!(
            "indicator weights sum to {:.2}; scores will range over 0-{:.1} instead of 0-100",
            total,
            total * 100.0
        )]
    } else {
        Vec::new()
    }
}

/// Weighted indicators with no observations in the loaded store.
///
/// Codes match series names exactly, so a differently-cased series is
/// pointed out rather than silently ignored.
pub fn series_warnings(table: &IndicatorTable, store: &ObservationStore) -> Vec<String> {
    table
        .active()
        .filter(|indicator| store.len(&indicator.code) == 0)
        .map(|indicator| {
            match store
                .codes()
                .find(|code| code.eq_ignore_ascii_case(&indicator.code))
            {
                Some(series) => format!(
                    "indicator '{}' has no observations; codes are case-sensitive, did you mean '{}'?",
                    indicator.code, series
                ),
                None => format!("indicator '{}' has no observations", indicator.code),
            }
        })
        .collect()
}
