//! Day key resolution tool

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::day_key;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayKeyResolution {
    pub instant: DateTime<Utc>,
    pub timezone: &'static str,
    pub day_key: String,
    pub local_hour: u32,
    pub week_start: String,
    pub previous_day: String,
    pub next_day: String,
}

/// Resolve the civil day and neighbouring days for an instant
pub fn resolve_day_key(instant: DateTime<Utc>) -> Result<DayKeyResolution, String> {
    let key = day_key::day_key(instant);
    let shift = |days: i64| {
        day_key::shift_day_key(&key, days).ok_or_else(|| format!("Day key {} out of range", key))
    };

    Ok(DayKeyResolution {
        instant,
        timezone: day_key::LOCAL_TZ.name(),
        local_hour: day_key::local_hour(instant),
        week_start: day_key::week_start_day_key(&key)
            .ok_or_else(|| format!("Day key {} out of range", key))?,
        previous_day: shift(-1)?,
        next_day: shift(1)?,
        day_key: key.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_resolve_across_midnight() {
        // 23:30Z on a Sunday is 00:30 Monday in Oslo
        let r = resolve_day_key(Utc.with_ymd_and_hms(2026, 1, 11, 23, 30, 0).unwrap()).unwrap();
        assert_eq!(r.day_key, "2026-01-12");
        assert_eq!(r.local_hour, 0);
        assert_eq!(r.week_start, "2026-01-12");
        assert_eq!(r.previous_day, "2026-01-11");
        assert_eq!(r.next_day, "2026-01-13");
        assert_eq!(r.timezone, "Europe/Oslo");
    }

    #[test]
    fn test_resolve_month_boundary() {
        let r = resolve_day_key(Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap()).unwrap();
        assert_eq!(r.previous_day, "2026-02-28");
        assert_eq!(r.week_start, "2026-02-23");
    }
}
