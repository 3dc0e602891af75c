//! Date math for bucket boundaries.
//!
//! All boundary functions operate on local wall-clock time (`NaiveDateTime`).
//! Use [`to_local`] / [`from_local`] to cross between stored UTC instants and
//! the zone the dashboard is rendered in.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::types::Period;

/// Wall-clock time of `ts` in `tz`.
pub fn to_local<Tz: TimeZone>(ts: DateTime<Utc>, tz: &Tz) -> NaiveDateTime {
    ts.with_timezone(tz).naive_local()
}

/// UTC instant for a wall-clock time in `tz`.
///
/// Ambiguous local times (DST fold) resolve to the earliest instant. Local
/// times that do not exist (DST gap) are read as UTC.
pub fn from_local<Tz: TimeZone>(local: NaiveDateTime, tz: &Tz) -> DateTime<Utc> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&local))
}

/// `t` with the time of day zeroed.
pub fn day_start(t: NaiveDateTime) -> NaiveDateTime {
    t.date().and_time(NaiveTime::MIN)
}

/// Monday 00:00:00 of the week containing `t`.
///
/// Sunday belongs to the week that started six days earlier.
pub fn week_start(t: NaiveDateTime) -> NaiveDateTime {
    let offset = t.weekday().num_days_from_monday();
    day_start(t) - Duration::days(i64::from(offset))
}

/// Sunday 00:00:00 of the calendar week containing `t`.
pub fn sunday_week_start(t: NaiveDateTime) -> NaiveDateTime {
    let offset = t.weekday().num_days_from_sunday();
    day_start(t) - Duration::days(i64::from(offset))
}

/// Lower bound of the rolling window for `period`, ending at `now`.
///
/// - week: seven days back (a rolling window, not the calendar week)
/// - month: one calendar month back
/// - year: one calendar year back
///
/// Month arithmetic clamps to the last day of the target month. `None`
/// (an unrecognized period) keeps the date of `now`. The time of day is
/// always zeroed.
pub fn period_start(period: Option<Period>, now: NaiveDateTime) -> NaiveDateTime {
    let shifted = match period {
        Some(Period::Week) => now - Duration::days(7),
        Some(Period::Month) => now.checked_sub_months(Months::new(1)).unwrap_or(now),
        Some(Period::Year) => now.checked_sub_months(Months::new(12)).unwrap_or(now),
        None => now,
    };
    day_start(shifted)
}
