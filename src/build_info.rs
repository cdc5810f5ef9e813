//! Build information
//!
//! Values embedded by `build.rs`, plus the export schema versions this build
//! can read. Shown in the startup banner and by the status tool.

use serde::Serialize;

use crate::data::loader::SUPPORTED_SCHEMA_VERSIONS;

/// Rebuild counter for the current cargo profile
pub const BUILD_NUMBER: u64 = match option_env!("GLYTRACK_BUILD_NUMBER") {
    Some(s) => match parse_u64(s) {
        Some(n) => n,
        None => 0,
    },
    None => 0,
};

/// Build timestamp, `YYYY-MM-DDTHH:MM:SSZ`
pub const BUILD_TIMESTAMP: &str = match option_env!("GLYTRACK_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

pub const BUILD_PROFILE: &str = match option_env!("GLYTRACK_BUILD_PROFILE") {
    Some(s) => s,
    None => "unknown",
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// `str::parse` is not const
const fn parse_u64(s: &str) -> Option<u64> {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    let mut result: u64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if !b.is_ascii_digit() {
            return None;
        }
        result = result * 10 + (b - b'0') as u64;
        i += 1;
    }
    Some(result)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub build_profile: &'static str,
    pub export_schema_versions: &'static [u32],
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_number: BUILD_NUMBER,
            build_timestamp: BUILD_TIMESTAMP,
            build_profile: BUILD_PROFILE,
            export_schema_versions: &SUPPORTED_SCHEMA_VERSIONS,
        }
    }

    /// Lines of the startup banner, without the frame
    pub fn banner_lines(&self) -> Vec<String> {
        let schemas: Vec<String> = self
            .export_schema_versions
            .iter()
            .map(|v| v.to_string())
            .collect();
        vec![
            "GlyTrack - glucose & insulin analytics".to_string(),
            format!(
                "Version: {} | Build: {} ({})",
                self.version, self.build_number, self.build_profile
            ),
            format!("Compiled: {}", self.build_timestamp),
            format!("Export schema versions: {}", schemas.join(", ")),
        ]
    }
}

/// Print the startup banner to stderr
pub fn print_startup_banner() {
    eprintln!("===============================================");
    for line in BuildInfo::current().banner_lines() {
        eprintln!("  {}", line);
    }
    eprintln!("===============================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u64() {
        assert_eq!(parse_u64("42"), Some(42));
        assert_eq!(parse_u64("0"), Some(0));
        assert_eq!(parse_u64(""), None);
        assert_eq!(parse_u64("4a"), None);
    }

    #[test]
    fn test_build_script_values_embedded() {
        let info = BuildInfo::current();
        assert_eq!(info.name, "glytrack");
        assert!(info.build_number >= 1);
        assert_ne!(info.build_timestamp, "unknown");
        assert_ne!(info.build_profile, "unknown");
    }

    #[test]
    fn test_banner_lists_export_schemas() {
        let lines = BuildInfo::current().banner_lines();
        assert_eq!(lines.last().map(String::as_str), Some("Export schema versions: 1, 2"));
    }
}
