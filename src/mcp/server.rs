//! GlyTrack MCP Server Implementation
//!
//! Implements the MCP server with all GlyTrack tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::data::RecordSet;
use crate::tools::status::StatusTracker;
use crate::tools::{self, day_keys, glucose, insulin, reports};

/// GlyTrack MCP Service
#[derive(Clone)]
pub struct GlytrackService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    data_path: PathBuf,
    tool_router: ToolRouter<GlytrackService>,
}

impl GlytrackService {
    pub fn new(data_path: PathBuf) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(data_path.clone()))),
            data_path,
            tool_router: Self::tool_router(),
        }
    }

    /// Records are re-read on every call so a fresh export is picked up
    fn records(&self) -> Result<RecordSet, McpError> {
        tools::load_records(&self.data_path).map_err(|e| McpError::internal_error(e, None))
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ResolveDayKeyParams {
    /// RFC 3339 instant to resolve (defaults to now)
    pub instant: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NowParams {
    /// RFC 3339 instant treated as "now" (defaults to the current time)
    pub now: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WindowParams {
    /// RFC 3339 instant treated as "now" (defaults to the current time)
    pub now: Option<String>,
    /// Window length in days, ending today
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReportStatsParams {
    /// "week" (default), "month" or "all"
    pub range: Option<String>,
    /// RFC 3339 instant treated as "now" (defaults to the current time)
    pub now: Option<String>,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl GlytrackService {
    // --- Status ---

    #[tool(description = "Get the current status of the GlyTrack service including build info, export file summary, and process information")]
    async fn glytrack_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Resolve an instant to its Europe/Oslo day key (YYYY-MM-DD), local hour, ISO week start, and neighbouring days")]
    fn resolve_day_key(&self, Parameters(p): Parameters<ResolveDayKeyParams>) -> Result<CallToolResult, McpError> {
        let instant = tools::parse_now(p.instant.as_deref()).map_err(|e| McpError::internal_error(e, None))?;
        let result = day_keys::resolve_day_key(instant).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Glucose ---

    #[tool(description = "Dashboard statistics for the 14-day window ending today: averages, compliance, over-target counts, 7-day coverage, within-target and high/low figures, and data-quality counts")]
    fn dashboard_stats(&self, Parameters(p): Parameters<NowParams>) -> Result<CallToolResult, McpError> {
        let now = tools::parse_now(p.now.as_deref()).map_err(|e| McpError::internal_error(e, None))?;
        let records = self.records()?;
        let result = glucose::dashboard_stats(&records, now).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Post-meal glucose grouped by meal type (groups of at least 3 readings), with mean and over-target count. Default window 14 days.")]
    fn meal_breakdown(&self, Parameters(p): Parameters<WindowParams>) -> Result<CallToolResult, McpError> {
        let now = tools::parse_now(p.now.as_deref()).map_err(|e| McpError::internal_error(e, None))?;
        let records = self.records()?;
        let result = glucose::meal_breakdown(&records, now, p.days).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Daily mean glucose for the most recent 7 days with data, smoothed with a 3-day rolling average and labelled increasing/decreasing/stable. Default window 14 days.")]
    fn daily_trends(&self, Parameters(p): Parameters<WindowParams>) -> Result<CallToolResult, McpError> {
        let now = tools::parse_now(p.now.as_deref()).map_err(|e| McpError::internal_error(e, None))?;
        let records = self.records()?;
        let result = glucose::daily_trends(&records, now, p.days).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Insulin ---

    #[tool(description = "Pair evening long-acting insulin doses with the next morning's fasting glucose, grouped by 2-unit dose range, with a trend. Never recommends a dose. Default window 30 days.")]
    fn insulin_correlation(&self, Parameters(p): Parameters<WindowParams>) -> Result<CallToolResult, McpError> {
        let now = tools::parse_now(p.now.as_deref()).map_err(|e| McpError::internal_error(e, None))?;
        let records = self.records()?;
        let result = insulin::insulin_correlation(&records, now, p.days).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Reports ---

    #[tool(description = "Statistics for the printable report: period totals, compliance, 7/14-day per-category windows ending on the period end or today, whichever is earlier, and per-meal averages")]
    fn report_stats(&self, Parameters(p): Parameters<ReportStatsParams>) -> Result<CallToolResult, McpError> {
        let now = tools::parse_now(p.now.as_deref()).map_err(|e| McpError::internal_error(e, None))?;
        let records = self.records()?;
        let result = reports::report_stats(&records, p.range.as_deref(), now).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

#[tool_handler]
impl ServerHandler for GlytrackService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "glytrack".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("GlyTrack".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "GlyTrack - read-only glucose and insulin analytics over the exported log. \
                 Days are Europe/Oslo civil dates (YYYY-MM-DD); targets are fasting <= 5.3 and post-meal <= 6.7 mmol/L. \
                 Status: glytrack_status. Dates: resolve_day_key. \
                 Glucose: dashboard_stats, meal_breakdown, daily_trends. \
                 Insulin: insulin_correlation (advisories only point to a clinician). \
                 Reports: report_stats (range week/month/all). \
                 All analytics tools accept an optional RFC 3339 'now'."
                    .into(),
            ),
        }
    }
}
