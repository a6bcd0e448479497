//! # Analytics
//!
//! The metrics engine: pure, deterministic statistics over the numeric data a
//! caller supplies with an analysis request.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0).
//! - **Total Functions:** Every calculation is defined for empty and degenerate input.
//!   Zero denominators are guarded explicitly and produce `0`, never `NaN` or a panic.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: Computes a `MetricsReport` from a `RawMetricsInput`.
//! - `stats`: The individual return-series functions (Sharpe, Sortino, VaR, ...).
//! - `TradeStatistics`: Decimal trade-level and behavioral statistics.
//! - `grade_score` / `letter_grade`: The weighted letter-grade mapping.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod grade;
pub mod report;
pub mod stats;
pub mod trades;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use grade::{grade_score, letter_grade};
pub use report::MetricsReport;
pub use trades::{PROFIT_FACTOR_CAP, TradeStatistics};
