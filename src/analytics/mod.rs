//! Analytics core
//!
//! Pure, synchronous aggregations over glucose readings and insulin doses.
//! "Now" and the thresholds are always passed in; nothing here reads the
//! clock or touches the filesystem.

pub mod day_key;
pub mod insulin_correlation;
pub mod meal_breakdown;
pub mod report_stats;
pub mod thresholds;
pub mod trend;
pub mod window;

pub use day_key::{DayKeyRange, DayKeyed};
pub use insulin_correlation::{compute_insulin_correlation, CorrelationPair, CorrelationResult, CorrelationTrend, DoseRangeStat};
pub use meal_breakdown::{compute_meal_breakdown, MealStat};
pub use report_stats::{compute_report_stats, ReportRange, ReportStats};
pub use thresholds::Thresholds;
pub use trend::{compute_daily_trends, DailyTrend, TrendLabel, TrendSeries};
pub use window::{compute_dashboard_stats, DashboardStats, WindowSummary};
