//! GlyTrack
//!
//! An MCP server for glucose and insulin analytics.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use glytrack::build_info;
use glytrack::data;
use glytrack::mcp::GlytrackService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("glytrack=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let data_path = data::data_path_from_env();
    eprintln!("Export file: {}", data_path.display());

    // The file may appear later; every tool call reloads it
    match data::RecordSet::load(&data_path) {
        Ok(records) => eprintln!(
            "Loaded {} readings and {} insulin doses (schema version {})",
            records.readings.len(),
            records.insulin_doses.len(),
            records.schema_version
        ),
        Err(e) => tracing::warn!(error = %e, "export file not usable yet"),
    }

    // Create the GlyTrack service
    let service = GlytrackService::new(data_path);

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
