//! MCP module
//!
//! rmcp server exposing the GlyTrack tools over stdio.

pub mod server;

pub use server::GlytrackService;
