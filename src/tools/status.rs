//! GlyTrack Status Tool
//!
//! Provides runtime status information about the GlyTrack service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::analytics::day_key::LOCAL_TZ;
use crate::analytics::Thresholds;
use crate::build_info::BuildInfo;
use crate::data::RecordSet;

/// Summary of the export file as last seen by the status tool
#[derive(Debug, Clone, Serialize)]
pub struct DataFileStatus {
    pub schema_version: u32,
    pub exported_at: Option<String>,
    pub reading_count: usize,
    pub insulin_dose_count: usize,
    pub first_day: Option<String>,
    pub last_day: Option<String>,
}

impl From<&RecordSet> for DataFileStatus {
    fn from(records: &RecordSet) -> Self {
        let span = records.span();
        Self {
            schema_version: records.schema_version,
            exported_at: records.exported_at.map(|t| t.to_rfc3339()),
            reading_count: records.readings.len(),
            insulin_dose_count: records.insulin_doses.len(),
            first_day: span.as_ref().map(|s| s.start.clone()),
            last_day: span.map(|s| s.end),
        }
    }
}

/// Status information for the GlyTrack service
#[derive(Debug, Clone, Serialize)]
pub struct GlytrackStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub build_profile: &'static str,
    pub version: &'static str,
    pub export_schema_versions: &'static [u32],
    pub timezone: &'static str,
    pub thresholds: Thresholds,
    pub data_path: String,
    pub data_size_bytes: Option<u64>,
    /// Absent when the file is missing or fails to load
    pub data: Option<DataFileStatus>,
    pub data_error: Option<String>,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    data_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(data_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            data_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> GlytrackStatus {
        let build_info = BuildInfo::current();

        let data_size_bytes = std::fs::metadata(&self.data_path)
            .ok()
            .map(|m| m.len());

        let (data, data_error) = match RecordSet::load(&self.data_path) {
            Ok(records) => (Some(DataFileStatus::from(&records)), None),
            Err(e) => {
                tracing::warn!(path = %self.data_path.display(), error = %e, "export file not usable");
                (None, Some(e.to_string()))
            }
        };

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        GlytrackStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            build_profile: build_info.build_profile,
            version: build_info.version,
            export_schema_versions: build_info.export_schema_versions,
            timezone: LOCAL_TZ.name(),
            thresholds: Thresholds::default(),
            data_path: self.data_path.display().to_string(),
            data_size_bytes,
            data,
            data_error,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_status_with_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = StatusTracker::new(dir.path().join("missing.json"));
        let status = tracker.get_status();

        assert_eq!(status.data_size_bytes, None);
        assert!(status.data.is_none());
        assert!(status.data_error.unwrap().contains("not found"));
        assert_eq!(status.timezone, "Europe/Oslo");
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.export_schema_versions, &[1, 2]);
    }

    #[test]
    fn test_status_summarizes_export() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"schema_version": 1, "readings": [
                {{"id": "a", "measuredAt": "2026-01-12T06:30:00Z", "valueMmolL": "5.6", "isFasting": true}}
            ]}}"#
        )
        .unwrap();

        let status = StatusTracker::new(file.path().to_path_buf()).get_status();
        let data = status.data.unwrap();
        assert_eq!(data.schema_version, 1);
        assert_eq!(data.reading_count, 1);
        assert_eq!(data.first_day.as_deref(), Some("2026-01-12"));
        assert!(status.data_size_bytes.unwrap() > 0);
    }
}
