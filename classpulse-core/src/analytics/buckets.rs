//! Chart buckets for the activity graph.
//!
//! Three fixed schemes, one per period:
//!
//! | Scheme | Buckets | Labels | Anchor |
//! |--------|---------|--------|--------|
//! | [`BucketScheme::DailyWeek`] | 7 | `Sun`..`Sat` | Sunday of the current calendar week |
//! | [`BucketScheme::WeeklyMonth`] | 4 | `Week 1`..`Week 4` | window start, 7-day strides |
//! | [`BucketScheme::MonthlyYear`] | 12 | `YYYY-MM` | calendar month of the window start |
//!
//! Every bucket is emitted, empty or not. Records are expected to be
//! pre-filtered to [`BucketScheme::range`] by the store query.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use super::timebucket::{day_start, from_local, period_start, sunday_week_start, to_local};
use crate::types::{ActivityRecord, KindCounts, Period};

const DAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const WEEKS_PER_MONTH_VIEW: i64 = 4;
const MONTHS_PER_YEAR_VIEW: usize = 12;
/// The month view starts this many days before today (four 7-day weeks including today).
const MONTH_VIEW_LOOKBACK_DAYS: i64 = 27;

/// Typed bucket key. Display strings are derived, never used as keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BucketId {
    /// Day of the week, 0 = Sunday
    Day(u8),
    /// Zero-based week index within the month view
    Week(u8),
    /// Calendar month (month is 1-12)
    Month { year: i32, month: u32 },
}

impl BucketId {
    /// Chart label for this bucket.
    pub fn label(&self) -> String {
        match self {
            BucketId::Day(day) => DAY_LABELS
                .get(usize::from(*day))
                .copied()
                .unwrap_or("?")
                .to_string(),
            BucketId::Week(index) => format!("Week {}", index + 1),
            BucketId::Month { year, month } => format!("{:04}-{:02}", year, month),
        }
    }
}

/// One chart column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    /// Display label (day name, "Week N" or "YYYY-MM")
    #[serde(rename = "day")]
    pub label: String,
    /// Typed key
    #[serde(skip)]
    pub id: BucketId,
    /// Local anchor time, used only for ordering
    #[serde(skip)]
    pub sort_key: NaiveDateTime,
    /// Per-kind counts
    #[serde(flatten)]
    pub counts: KindCounts,
}

impl Bucket {
    fn empty(id: BucketId, sort_key: NaiveDateTime) -> Self {
        Self {
            label: id.label(),
            id,
            sort_key,
            counts: KindCounts::default(),
        }
    }
}

/// How records are grouped into chart buckets.
///
/// Each variant carries its local anchor time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketScheme {
    /// Seven day buckets starting at a Sunday 00:00
    DailyWeek { week_start: NaiveDateTime },
    /// Four 7-day buckets starting at `window_start`
    WeeklyMonth { window_start: NaiveDateTime },
    /// Twelve calendar-month buckets starting at `window_start`'s month
    MonthlyYear { window_start: NaiveDateTime },
}

impl BucketScheme {
    /// Daily buckets for the calendar week (Sunday to Saturday) containing `now`.
    pub fn daily_week(now: NaiveDateTime) -> Self {
        BucketScheme::DailyWeek {
            week_start: sunday_week_start(now),
        }
    }

    /// Weekly buckets for the four weeks ending today.
    pub fn weekly_month(now: NaiveDateTime) -> Self {
        BucketScheme::WeeklyMonth {
            window_start: day_start(now - Duration::days(MONTH_VIEW_LOOKBACK_DAYS)),
        }
    }

    /// Monthly buckets for the twelve months starting one year before `now`.
    pub fn monthly_year(now: NaiveDateTime) -> Self {
        BucketScheme::MonthlyYear {
            window_start: period_start(Some(Period::Year), now),
        }
    }

    /// Scheme used by the activity chart for `period`.
    ///
    /// Anything other than month or year falls back to the daily week view.
    pub fn for_period(period: Option<Period>, now: NaiveDateTime) -> Self {
        match period {
            Some(Period::Month) => Self::weekly_month(now),
            Some(Period::Year) => Self::monthly_year(now),
            Some(Period::Week) | None => Self::daily_week(now),
        }
    }

    /// Local `[start, end)` range the store query should cover.
    ///
    /// The month and year views are open-ended.
    pub fn range(&self) -> (NaiveDateTime, Option<NaiveDateTime>) {
        match *self {
            BucketScheme::DailyWeek { week_start } => {
                (week_start, Some(week_start + Duration::days(7)))
            }
            BucketScheme::WeeklyMonth { window_start }
            | BucketScheme::MonthlyYear { window_start } => (window_start, None),
        }
    }

    /// [`range`](Self::range) converted to UTC instants for a store filter.
    pub fn utc_range<Tz: TimeZone>(&self, tz: &Tz) -> (DateTime<Utc>, Option<DateTime<Utc>>) {
        let (start, end) = self.range();
        (from_local(start, tz), end.map(|end| from_local(end, tz)))
    }

    /// Pre-initialized empty buckets, in chronological order.
    fn empty_buckets(&self) -> Vec<Bucket> {
        match *self {
            BucketScheme::DailyWeek { week_start } => (0..7u8)
                .map(|day| {
                    Bucket::empty(
                        BucketId::Day(day),
                        week_start + Duration::days(i64::from(day)),
                    )
                })
                .collect(),
            BucketScheme::WeeklyMonth { window_start } => (0..WEEKS_PER_MONTH_VIEW)
                .map(|week| {
                    Bucket::empty(
                        BucketId::Week(week as u8),
                        window_start + Duration::days(week * 7),
                    )
                })
                .collect(),
            BucketScheme::MonthlyYear { window_start } => {
                let first = window_start.date().with_day(1).unwrap_or(window_start.date());
                std::iter::successors(Some(first), |d| d.checked_add_months(Months::new(1)))
                    .take(MONTHS_PER_YEAR_VIEW)
                    .map(|d| {
                        Bucket::empty(
                            BucketId::Month {
                                year: d.year(),
                                month: d.month(),
                            },
                            d.and_time(NaiveTime::MIN),
                        )
                    })
                    .collect()
            }
        }
    }

    /// Bucket key for a local record time, if the scheme can place it.
    ///
    /// The returned key may still be absent from the bucket set (a month
    /// outside the year view); such records are dropped by the caller.
    fn assign(&self, local: NaiveDateTime) -> Option<BucketId> {
        match *self {
            BucketScheme::DailyWeek { week_start } => {
                let offset = (day_start(local) - week_start).num_days();
                (0..7).contains(&offset).then(|| BucketId::Day(offset as u8))
            }
            BucketScheme::WeeklyMonth { window_start } => {
                let elapsed_ms = (local - window_start).num_milliseconds();
                let days = elapsed_ms.div_euclid(Duration::days(1).num_milliseconds());
                if days < 0 {
                    return None;
                }
                // Records past day 27 stay in the last week rather than being dropped
                let week = (days / 7).min(WEEKS_PER_MONTH_VIEW - 1);
                Some(BucketId::Week(week as u8))
            }
            BucketScheme::MonthlyYear { .. } => Some(BucketId::Month {
                year: local.year(),
                month: local.month(),
            }),
        }
    }
}

/// Fold `records` into the buckets of `scheme`.
///
/// Record times are read as wall-clock time in `tz`. The result always holds
/// every bucket of the scheme, sorted by anchor time.
pub fn compute_buckets<Tz: TimeZone>(
    records: &[ActivityRecord],
    scheme: &BucketScheme,
    tz: &Tz,
) -> Vec<Bucket> {
    let mut buckets: BTreeMap<BucketId, Bucket> = scheme
        .empty_buckets()
        .into_iter()
        .map(|bucket| (bucket.id, bucket))
        .collect();

    for record in records {
        let local = to_local(record.created_at, tz);
        let Some(id) = scheme.assign(local) else {
            continue;
        };
        if let Some(bucket) = buckets.get_mut(&id) {
            bucket.counts.record(record.kind());
        }
    }

    let mut ordered: Vec<Bucket> = buckets.into_values().collect();
    ordered.sort_by_key(|bucket| bucket.sort_key);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn record(kind: &str, local: NaiveDateTime) -> ActivityRecord {
        ActivityRecord {
            teacher_id: "T1".to_string(),
            teacher_name: "Asha Rao".to_string(),
            grade: 8,
            subject: "Science".to_string(),
            activity_type: kind.to_string(),
            created_at: local.and_utc(),
        }
    }

    fn labels(buckets: &[Bucket]) -> Vec<String> {
        buckets.iter().map(|b| b.label.clone()).collect()
    }

    fn grand_total(buckets: &[Bucket]) -> u64 {
        buckets.iter().map(|b| b.counts.total()).sum()
    }

    #[test]
    fn test_daily_week_empty_has_all_days() {
        // Wednesday
        let scheme = BucketScheme::daily_week(at(2024, 1, 10, 12));
        let buckets = compute_buckets(&[], &scheme, &Utc);

        assert_eq!(
            labels(&buckets),
            vec!["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
        );
        assert_eq!(buckets[0].sort_key, at(2024, 1, 7, 0));
        assert_eq!(buckets[6].sort_key, at(2024, 1, 13, 0));
        assert_eq!(grand_total(&buckets), 0);
    }

    #[test]
    fn test_daily_week_assigns_by_day() {
        let scheme = BucketScheme::daily_week(at(2024, 1, 10, 12));
        let records = vec![
            record("Lesson Plan", at(2024, 1, 7, 0)),
            record("Quiz", at(2024, 1, 7, 23)),
            record("Question Paper", at(2024, 1, 10, 9)),
            record("Lesson Plan", at(2024, 1, 13, 22)),
            record("Homework", at(2024, 1, 13, 22)),
        ];
        let buckets = compute_buckets(&records, &scheme, &Utc);

        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0].counts.lessons, 1);
        assert_eq!(buckets[0].counts.quizzes, 1);
        assert_eq!(buckets[3].counts.assessments, 1);
        assert_eq!(buckets[6].counts.lessons, 1);
        // Unknown kinds never count
        assert_eq!(grand_total(&buckets), 4);
    }

    #[test]
    fn test_daily_week_ignores_records_outside_week() {
        let scheme = BucketScheme::daily_week(at(2024, 1, 10, 12));
        let records = vec![
            record("Quiz", at(2024, 1, 6, 23)),
            record("Quiz", at(2024, 1, 14, 0)),
        ];
        let buckets = compute_buckets(&records, &scheme, &Utc);
        assert_eq!(buckets.len(), 7);
        assert_eq!(grand_total(&buckets), 0);
    }

    #[test]
    fn test_daily_week_uses_local_day() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        // Local Wednesday 2024-01-10 12:00 at -05:00
        let scheme = BucketScheme::daily_week(at(2024, 1, 10, 12));
        // 2024-01-11 03:00 UTC is Wednesday 22:00 local
        let late = ActivityRecord {
            created_at: at(2024, 1, 11, 3).and_utc(),
            ..record("Quiz", at(2024, 1, 1, 0))
        };
        let buckets = compute_buckets(&[late], &scheme, &tz);
        assert_eq!(buckets[3].label, "Wed");
        assert_eq!(buckets[3].counts.quizzes, 1);
    }

    #[test]
    fn test_daily_week_range() {
        let scheme = BucketScheme::daily_week(at(2024, 1, 10, 12));
        assert_eq!(scheme.range(), (at(2024, 1, 7, 0), Some(at(2024, 1, 14, 0))));
    }

    #[test]
    fn test_weekly_month_buckets() {
        let now = at(2024, 3, 28, 15);
        let scheme = BucketScheme::weekly_month(now);
        assert_eq!(
            scheme,
            BucketScheme::WeeklyMonth {
                window_start: at(2024, 3, 1, 0)
            }
        );

        let buckets = compute_buckets(&[], &scheme, &Utc);
        assert_eq!(
            labels(&buckets),
            vec!["Week 1", "Week 2", "Week 3", "Week 4"]
        );
        let anchors: Vec<_> = buckets.iter().map(|b| b.sort_key).collect();
        assert_eq!(
            anchors,
            vec![
                at(2024, 3, 1, 0),
                at(2024, 3, 8, 0),
                at(2024, 3, 15, 0),
                at(2024, 3, 22, 0)
            ]
        );
    }

    #[test]
    fn test_weekly_month_assignment_and_clamp() {
        let scheme = BucketScheme::WeeklyMonth {
            window_start: at(2024, 3, 1, 0),
        };
        let records = vec![
            record("Lesson Plan", at(2024, 3, 1, 0)),
            record("Lesson Plan", at(2024, 3, 7, 23)),
            record("Quiz", at(2024, 3, 8, 0)),
            record("Quiz", at(2024, 3, 21, 12)),
            record("Question Paper", at(2024, 3, 22, 0)),
            // Day 27 and beyond all land in the last bucket
            record("Question Paper", at(2024, 3, 28, 10)),
            record("Question Paper", at(2024, 4, 30, 10)),
        ];
        let buckets = compute_buckets(&records, &scheme, &Utc);

        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets[0].counts.lessons, 2);
        assert_eq!(buckets[1].counts.quizzes, 1);
        assert_eq!(buckets[2].counts.quizzes, 1);
        assert_eq!(buckets[3].counts.assessments, 3);
        assert_eq!(grand_total(&buckets), records.len() as u64);
    }

    #[test]
    fn test_weekly_month_drops_records_before_window() {
        let scheme = BucketScheme::WeeklyMonth {
            window_start: at(2024, 3, 1, 0),
        };
        let records = vec![record("Quiz", at(2024, 2, 29, 23))];
        let buckets = compute_buckets(&records, &scheme, &Utc);
        assert_eq!(grand_total(&buckets), 0);
    }

    #[test]
    fn test_monthly_year_buckets() {
        let now = at(2024, 5, 15, 9);
        let scheme = BucketScheme::monthly_year(now);
        let buckets = compute_buckets(&[], &scheme, &Utc);

        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[0].label, "2023-05");
        assert_eq!(buckets[7].label, "2023-12");
        assert_eq!(buckets[8].label, "2024-01");
        assert_eq!(buckets[11].label, "2024-04");
        assert!(buckets.windows(2).all(|w| w[0].sort_key < w[1].sort_key));
    }

    #[test]
    fn test_monthly_year_drops_unmatched_months() {
        let scheme = BucketScheme::monthly_year(at(2024, 5, 15, 9));
        let records = vec![
            record("Lesson Plan", at(2023, 5, 20, 9)),
            record("Quiz", at(2023, 12, 31, 23)),
            record("Quiz", at(2024, 4, 1, 0)),
            // The current month is past the twelfth bucket
            record("Question Paper", at(2024, 5, 2, 9)),
        ];
        let buckets = compute_buckets(&records, &scheme, &Utc);

        assert_eq!(buckets[0].counts.lessons, 1);
        assert_eq!(buckets[7].counts.quizzes, 1);
        assert_eq!(buckets[11].counts.quizzes, 1);
        assert_eq!(grand_total(&buckets), 3);
    }

    #[test]
    fn test_monthly_year_from_month_end() {
        // Jan 31 must not skip February
        let scheme = BucketScheme::MonthlyYear {
            window_start: at(2024, 1, 31, 0),
        };
        let buckets = compute_buckets(&[], &scheme, &Utc);
        assert_eq!(buckets[0].label, "2024-01");
        assert_eq!(buckets[1].label, "2024-02");
        assert_eq!(buckets[11].label, "2024-12");
    }

    #[test]
    fn test_for_period() {
        let now = at(2024, 5, 15, 9);
        assert!(matches!(
            BucketScheme::for_period(Some(Period::Week), now),
            BucketScheme::DailyWeek { .. }
        ));
        assert!(matches!(
            BucketScheme::for_period(None, now),
            BucketScheme::DailyWeek { .. }
        ));
        assert!(matches!(
            BucketScheme::for_period(Some(Period::Month), now),
            BucketScheme::WeeklyMonth { .. }
        ));
        assert!(matches!(
            BucketScheme::for_period(Some(Period::Year), now),
            BucketScheme::MonthlyYear { .. }
        ));
    }

    #[test]
    fn test_bucket_serializes_without_sort_key() {
        let scheme = BucketScheme::daily_week(at(2024, 1, 10, 12));
        let buckets = compute_buckets(&[record("Quiz", at(2024, 1, 8, 10))], &scheme, &Utc);
        let json = serde_json::to_value(&buckets[1]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"day": "Mon", "lessons": 0, "quizzes": 1, "assessments": 0})
        );
    }
}
