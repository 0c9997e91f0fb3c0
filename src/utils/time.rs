use chrono::{DateTime, Duration, Local, NaiveTime, Utc};

/// Start and end (half-open) of the current calendar day in server-local
/// time, expressed in UTC for timestamp comparisons.
pub fn local_day_bounds() -> (DateTime<Utc>, DateTime<Utc>) {
    let day = Local::now().date_naive();
    let start = day
        .and_time(NaiveTime::MIN)
        .and_local_timezone(Local)
        .earliest()
        .map_or_else(Utc::now, |dt| dt.with_timezone(&Utc));
    (start, start + Duration::days(1))
}
