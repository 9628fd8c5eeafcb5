pub mod formatter;

pub use formatter::{
    format_breakdown, format_current, format_history_table, format_history_tsv,
    format_indicator_detail, format_score, format_weights, should_use_colors, LiquidityLevel,
};
