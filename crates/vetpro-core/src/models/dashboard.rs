use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::models::appointment::AppointmentWithDetails;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_patients: i64,
    pub appointments_today: i64,
    pub pending_appointments: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub upcoming: Vec<AppointmentWithDetails>,
}

/// Half-open UTC range `[start, end)` covering the calendar day of `now` in `tz`.
pub fn local_day_bounds(tz: Tz, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.with_timezone(&tz).date_naive();
    let start_of = |date: chrono::NaiveDate| {
        let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
        tz.from_local_datetime(&midnight)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            // Days that skip midnight start at the first valid instant after it.
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight) - tz_offset(tz, now))
    };
    let start = start_of(today);
    let end = today
        .succ_opt()
        .map(start_of)
        .unwrap_or(start + Duration::days(1));
    (start, end)
}

fn tz_offset(tz: Tz, at: DateTime<Utc>) -> Duration {
    use chrono::Offset;
    let seconds = at.with_timezone(&tz).offset().fix().local_minus_utc();
    Duration::seconds(seconds as i64)
}
