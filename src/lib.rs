//! Liquidity composite scoring.
//!
//! Several macroeconomic series are min-max scaled over their full history,
//! oriented so that higher always means more liquidity, and combined with
//! configured weights into a 0-100 score, either as of one period or as a
//! monthly history.

pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod scoring;
pub mod store;

pub use error::{ScoreError, StoreError};
