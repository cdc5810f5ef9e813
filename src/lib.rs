//! GlyTrack Library
//!
//! Glucose and insulin analytics: civil-day bucketing, windowed dashboard
//! statistics, meal breakdown, trend smoothing, dose correlation and report
//! statistics, plus the MCP surface that serves them.

pub mod analytics;
pub mod build_info;
pub mod data;
pub mod mcp;
pub mod models;
pub mod tools;
