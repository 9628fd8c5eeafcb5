use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::scoring::{
    CompositeScore, HistoryPoint, IndicatorConfig, IndicatorTable, Polarity, ReferenceRange,
};
use crate::store::Observation;

/// Interpretation bands for a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiquidityLevel {
    Abundant,
    Sufficient,
    Moderate,
    Tight,
}

impl LiquidityLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            LiquidityLevel::Abundant
        } else if score >= 60.0 {
            LiquidityLevel::Sufficient
        } else if score >= 40.0 {
            LiquidityLevel::Moderate
        } else {
            LiquidityLevel::Tight
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            LiquidityLevel::Abundant => "Liquidity is very abundant.",
            LiquidityLevel::Sufficient => "Liquidity is fairly sufficient.",
            LiquidityLevel::Moderate => "Liquidity is moderate; caution is warranted.",
            LiquidityLevel::Tight => "Liquidity is tight. This may be a tightening phase.",
        }
    }

    fn paint(&self, text: &str) -> String {
        match self {
            LiquidityLevel::Abundant => text.green().to_string(),
            LiquidityLevel::Sufficient => text.yellow().to_string(),
            LiquidityLevel::Moderate => text.bright_red().to_string(),
            LiquidityLevel::Tight => text.red().to_string(),
        }
    }
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score with one decimal, as the engine rounds it.
pub fn format_score(score: f64) -> String {
    format!("{:.1}", score)
}

/// Headline for the current composite score, followed by its interpretation.
pub fn format_current(result: &CompositeScore, use_colors: bool) -> String {
    let level = LiquidityLevel::from_score(result.score);
    let score = format!("{} / 100", format_score(result.score));
    let headline = if use_colors {
        format!(
            "Liquidity score: {} (as of {})",
            level.paint(&score).bold(),
            result.as_of_date
        )
    } else {
        format!("Liquidity score: {} (as of {})", score, result.as_of_date)
    };
    format!("{}\n{}", headline, level.message())
}

/// One line per contributing indicator plus the skipped ones (verbose mode).
pub fn format_breakdown(result: &CompositeScore, table: &IndicatorTable, use_colors: bool) -> String {
    let mut lines = Vec::new();
    for c in &result.contributions {
        let name = table.get(&c.code).map_or(c.code.as_str(), |i| i.name.as_str());
        let line = format!(
            "  {:<32} {}  raw {:>12.2}  scaled {:.3}  oriented {:.3}  x{:.2}  -> {:>5.1} pts",
            truncate_name(name, 32),
            c.date,
            c.raw,
            c.scaled,
            c.oriented,
            c.weight,
            c.points()
        );
        lines.push(line);
    }
    for code in &result.skipped {
        let line = format!("  {:<32} no data for this period", code);
        lines.push(if use_colors { line.dimmed().to_string() } else { line });
    }
    lines.join("\n")
}

/// Weighting scheme as percentages, one indicator per line, with the total.
pub fn format_weights(table: &IndicatorTable, use_colors: bool) -> String {
    if table.is_empty() {
        return "No indicators configured.".to_string();
    }

    let mut lines: Vec<String> = table
        .iter()
        .map(|i| {
            let weight = format!("{:>4.0}%", i.weight * 100.0);
            let polarity = match i.polarity {
                Polarity::Normal => "",
                Polarity::Inverted => "inverted",
            };
            let name = truncate_name(&i.name, 32);
            let line = if use_colors && !i.is_active() {
                format!("{:<14}{:<34}{}  {}", i.code, name, weight, "info only")
                    .dimmed()
                    .to_string()
            } else if use_colors {
                format!("{:<14}{:<34}{}  {}", i.code.cyan(), name, weight.bold(), polarity)
            } else if !i.is_active() {
                format!("{:<14}{:<34}{}  info only", i.code, name, weight)
            } else {
                format!("{:<14}{:<34}{}  {}", i.code, name, weight, polarity)
            };
            line.trim_end().to_string()
        })
        .collect();

    lines.push(format!("{:<48}{:>4.0}%", "Total", table.total_weight() * 100.0));
    lines.join("\n")
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Horizontal bar proportional to a 0-100 score.
fn score_bar(score: f64, width: usize) -> String {
    let filled = ((score.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    "#".repeat(filled)
}

/// Format history as a table: date, score, bar.
/// Bar width follows the terminal; pipes get a fixed 40 columns.
pub fn format_history_table(history: &[HistoryPoint], use_colors: bool) -> String {
    if history.is_empty() {
        return "No history available.".to_string();
    }

    // Date: 10 chars, score: 5 chars, separators: 2 x 2
    let fixed_width = 10 + 5 + 4;
    let bar_width = match get_terminal_width() {
        Some(width) if width > fixed_width + 10 => (width - fixed_width).min(60),
        Some(_) => 10,
        None => 40,
    };

    history
        .iter()
        .map(|point| {
            let score = format!("{:>5}", format_score(point.score));
            let bar = score_bar(point.score, bar_width);
            let line = if use_colors {
                let level = LiquidityLevel::from_score(point.score);
                format!("{}  {}  {}", point.date.dimmed(), score.bold(), level.paint(&bar))
            } else {
                format!("{}  {}  {}", point.date, score, bar)
            };
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format history as tab-separated values for scripting
/// Columns: date, score (no headers, no colors)
pub fn format_history_tsv(history: &[HistoryPoint]) -> String {
    history
        .iter()
        .map(|point| format!("{}\t{}", point.date, format_score(point.score)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Detailed view of one indicator: configuration, description and data span.
pub fn format_indicator_detail(
    indicator: &IndicatorConfig,
    range: Option<ReferenceRange>,
    latest: Option<Observation>,
    use_colors: bool,
) -> String {
    let title = format!("{} ({})", indicator.name, indicator.code);
    let mut lines = vec![if use_colors {
        title.bold().to_string()
    } else {
        title
    }];

    lines.push(format!("  Weight: {:.0}%", indicator.weight * 100.0));
    lines.push(format!(
        "  Polarity: {}",
        match indicator.polarity {
            Polarity::Normal => "normal (higher = more liquidity)",
            Polarity::Inverted => "inverted (higher = less liquidity)",
        }
    ));
    match range {
        Some(r) if r.is_degenerate() => {
            lines.push(format!("  Range: constant at {} (scales to 0)", r.min))
        }
        Some(r) => lines.push(format!("  Range: {} .. {}", r.min, r.max)),
        None => lines.push("  Range: no observations".to_string()),
    }
    if let Some(obs) = latest {
        let scaled = range.map(|r| r.apply(obs.value)).unwrap_or_default();
        lines.push(format!(
            "  Latest: {} on {} (scaled {:.3})",
            obs.value, obs.date, scaled
        ));
    }
    if let Some(ref description) = indicator.description {
        lines.push(String::new());
        lines.push(format!("  {}", description));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Contribution;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_score() -> CompositeScore {
        CompositeScore {
            score: 63.4,
            as_of_date: date(2024, 5, 1),
            contributions: vec![Contribution {
                code: "M2SL".to_string(),
                date: date(2024, 5, 1),
                raw: 20950.3,
                scaled: 0.9,
                oriented: 0.9,
                weight: 0.2,
            }],
            skipped: vec!["BUSLOANS".to_string()],
        }
    }

    #[test]
    fn test_level_bands() {
        assert_eq!(LiquidityLevel::from_score(100.0), LiquidityLevel::Abundant);
        assert_eq!(LiquidityLevel::from_score(80.0), LiquidityLevel::Abundant);
        assert_eq!(LiquidityLevel::from_score(79.9), LiquidityLevel::Sufficient);
        assert_eq!(LiquidityLevel::from_score(60.0), LiquidityLevel::Sufficient);
        assert_eq!(LiquidityLevel::from_score(40.0), LiquidityLevel::Moderate);
        assert_eq!(LiquidityLevel::from_score(39.9), LiquidityLevel::Tight);
        assert_eq!(LiquidityLevel::from_score(0.0), LiquidityLevel::Tight);
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(63.4), "63.4");
        assert_eq!(format_score(100.0), "100.0");
        assert_eq!(format_score(0.0), "0.0");
    }

    #[test]
    fn test_format_current() {
        let result = format_current(&sample_score(), false);
        assert_eq!(
            result,
            "Liquidity score: 63.4 / 100 (as of 2024-05-01)\nLiquidity is fairly sufficient."
        );
    }

    #[test]
    fn test_format_breakdown() {
        let table = IndicatorTable::default();
        let result = format_breakdown(&sample_score(), &table, false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("M2 Money Supply"));
        assert!(lines[0].contains("18.0 pts"));
        assert!(lines[1].contains("BUSLOANS"));
        assert!(lines[1].contains("no data"));
    }

    #[test]
    fn test_format_breakdown_inverted_shows_both_values() {
        let mut score = sample_score();
        score.contributions = vec![Contribution {
            code: "FEDFUNDS".to_string(),
            date: date(2024, 5, 1),
            raw: 1.5,
            scaled: 0.25,
            oriented: 0.75,
            weight: 0.2,
        }];
        score.skipped.clear();

        let result = format_breakdown(&score, &IndicatorTable::default(), false);
        assert!(result.contains("scaled 0.250"));
        assert!(result.contains("oriented 0.750"));
        assert!(result.contains("15.0 pts"));
    }

    #[test]
    fn test_format_weights() {
        let table = IndicatorTable::default();
        let result = format_weights(&table, false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("RRPONTSYD"));
        assert!(lines[0].contains("25%"));
        assert!(lines[0].ends_with("inverted"));
        assert!(lines[2].ends_with("20%"));
        assert!(lines[6].starts_with("Total"));
        assert!(lines[6].ends_with("100%"));
    }

    #[test]
    fn test_format_weights_info_only() {
        let table = IndicatorTable::new(vec![IndicatorConfig::new(
            "DGS10",
            "10-Year Treasury",
            0.0,
            Polarity::Normal,
        )]);
        let result = format_weights(&table, false);
        assert!(result.lines().next().unwrap().ends_with("info only"));
    }

    #[test]
    fn test_format_weights_empty() {
        let table = IndicatorTable::new(vec![]);
        assert_eq!(format_weights(&table, false), "No indicators configured.");
    }

    #[test]
    fn test_score_bar() {
        assert_eq!(score_bar(50.0, 10), "#####");
        assert_eq!(score_bar(0.0, 10), "");
        assert_eq!(score_bar(150.0, 10), "##########");
    }

    #[test]
    fn test_format_history_table() {
        let history = vec![
            HistoryPoint { date: date(2024, 1, 31), score: 42.0 },
            HistoryPoint { date: date(2024, 2, 29), score: 57.5 },
        ];
        let result = format_history_table(&history, false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("2024-01-31   42.0"));
        assert!(lines[1].contains("57.5"));
        assert!(lines[1].contains('#'));
    }

    #[test]
    fn test_format_history_empty() {
        assert_eq!(format_history_table(&[], false), "No history available.");
        assert_eq!(format_history_tsv(&[]), "");
    }

    #[test]
    fn test_format_history_tsv() {
        let history = vec![
            HistoryPoint { date: date(2024, 1, 31), score: 42.0 },
            HistoryPoint { date: date(2024, 2, 29), score: 57.5 },
        ];
        assert_eq!(format_history_tsv(&history), "2024-01-31\t42.0\n2024-02-29\t57.5");
    }

    #[test]
    fn test_format_indicator_detail() {
        let table = IndicatorTable::default();
        let indicator = table.get("FEDFUNDS").unwrap();
        let range = Some(ReferenceRange { min: 0.05, max: 5.33 });
        let latest = Some(Observation::new(date(2024, 5, 1), 5.33));
        let result = format_indicator_detail(indicator, range, latest, false);
        assert!(result.starts_with("Federal Funds Rate (FEDFUNDS)"));
        assert!(result.contains("Weight: 20%"));
        assert!(result.contains("inverted"));
        assert!(result.contains("Latest: 5.33 on 2024-05-01 (scaled 1.000)"));
        assert!(result.contains("monetary policy"));
    }

    #[test]
    fn test_format_indicator_detail_without_data() {
        let indicator = IndicatorConfig::new("X", "Example", 0.5, Polarity::Normal);
        let result = format_indicator_detail(&indicator, None, None, false);
        assert!(result.contains("Range: no observations"));
        assert!(!result.contains("Latest"));
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Short", 20), "Short");
        assert_eq!(truncate_name("TGA (Treasury General Account)", 10), "TGA (Tr...");
        assert_eq!(truncate_name("Hello world", 3), "Hel");
    }
}
