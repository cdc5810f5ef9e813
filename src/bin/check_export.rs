//! Utility to validate an export file and print a short summary
//!
//! Usage: check_export [PATH]   (defaults to GLYTRACK_DATA_PATH or data/glytrack-export.json)

use std::path::PathBuf;

use glytrack::analytics::{
    compute_daily_trends, compute_dashboard_stats, compute_report_stats, DayKeyRange, ReportRange,
    Thresholds,
};
use glytrack::analytics::window::DASHBOARD_DAYS;
use glytrack::tools::insulin;
use glytrack::data::{self, RecordSet};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(data::data_path_from_env);
    println!("Export file: {}", path.display());

    let records = RecordSet::load(&path)?;
    println!("Schema version: {}", records.schema_version);
    if let Some(exported_at) = records.exported_at {
        println!("Exported at: {}", exported_at.to_rfc3339());
    }
    println!("Readings: {}", records.readings.len());
    println!("Insulin doses: {}", records.insulin_doses.len());

    let Some(span) = records.span() else {
        println!("No records.");
        return Ok(());
    };
    println!("Days: {} .. {}", span.start, span.end);

    let unparsable_readings = records.readings.iter().filter(|r| r.value().is_none()).count();
    let unparsable_doses = records.insulin_doses.iter().filter(|d| d.units().is_none()).count();
    if unparsable_readings > 0 || unparsable_doses > 0 {
        println!(
            "Unparsable values: {} readings, {} doses",
            unparsable_readings, unparsable_doses
        );
    }

    if let Some(reading) = records.readings.last() {
        println!("Latest reading: {} ({})", reading.format_value(), reading.day_key);
    }
    if let Some(dose) = records.insulin_doses.last() {
        println!("Latest dose: {} ({})", dose.format_value(), dose.day_key);
    }

    // Dashboard as of the last logged reading
    if let Some(last) = records.readings.last() {
        let now = last.measured_at;
        let window = records.readings_in(&DayKeyRange::ending_at(now, DASHBOARD_DAYS));
        let stats = compute_dashboard_stats(&window, None, now, &Thresholds::default());
        println!("Last 14 days (ending {}):", last.day_key);
        println!("  Compliance: {:.1}%", stats.compliance_percentage);
        if let Some(avg) = stats.average_fasting {
            println!("  Average fasting: {:.1} mmol/L", avg);
        }
        if let Some(avg) = stats.average_post_meal {
            println!("  Average post-meal: {:.1} mmol/L", avg);
        }
        println!(
            "  Data quality: {} untyped, {} both types, {} unparsable",
            stats.quality_missing_type_count,
            stats.quality_both_types_count,
            stats.quality_unparsable_count
        );

        let trends = compute_daily_trends(&window);
        if let Some(label) = trends.label {
            println!("  Trend: {}", label.as_str());
        }

        let correlation = insulin::insulin_correlation(&records, now, None)?;
        println!(
            "  Evening basal: {} complete pairs, {}",
            correlation.result.complete_pairs.len(),
            correlation.result.trend.as_str()
        );

        let report = compute_report_stats(&records.readings, ReportRange::All, now, &Thresholds::default());
        println!("Post-meal averages ({} .. {}):", report.period.start, report.period.end);
        for slot in &report.meal_type_stats {
            if let Some(avg) = slot.average {
                println!("  {}: {:.1} mmol/L ({} readings)", slot.meal_type.display_name(), avg, slot.count);
            }
        }
    }

    Ok(())
}
