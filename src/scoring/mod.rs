pub mod config;
pub mod engine;
pub mod history;
pub mod normalize;
pub mod validation;

pub use config::*;
pub use engine::{AsOf, CompositeScore, Contribution, ScoringContext};
pub use history::{month_end_dates, HistoryPoint};
pub use normalize::ReferenceRange;
pub use validation::{series_warnings, validate_indicators, weight_warnings};
