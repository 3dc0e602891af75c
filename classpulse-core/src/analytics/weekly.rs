//! Week-by-week activity counts.
//!
//! Unlike the chart buckets, only weeks that contain at least one record are
//! reported; nothing is synthesized for quiet weeks.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

use super::timebucket::{from_local, to_local, week_start};
use crate::types::{ActivityRecord, KindCounts};

/// Activity created during one Monday-anchored week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyCounts {
    /// Instant of the local Monday 00:00 that starts the week
    pub week_start: DateTime<Utc>,
    pub lessons_created: u64,
    pub quizzes_created: u64,
    pub assessments_created: u64,
}

impl WeeklyCounts {
    fn new(week_start: DateTime<Utc>, counts: KindCounts) -> Self {
        Self {
            week_start,
            lessons_created: counts.lessons,
            quizzes_created: counts.quizzes,
            assessments_created: counts.assessments,
        }
    }

    /// Sum across all three kinds.
    pub fn total(&self) -> u64 {
        self.lessons_created + self.quizzes_created + self.assessments_created
    }
}

/// Group records by local week start, ascending.
pub(crate) fn group_by_week<'a, Tz, I>(records: I, tz: &Tz) -> Vec<WeeklyCounts>
where
    Tz: TimeZone,
    I: IntoIterator<Item = &'a ActivityRecord>,
{
    let mut weeks: BTreeMap<NaiveDateTime, KindCounts> = BTreeMap::new();

    for record in records {
        let start = week_start(to_local(record.created_at, tz));
        weeks.entry(start).or_default().record(record.kind());
    }

    weeks
        .into_iter()
        .map(|(start, counts)| WeeklyCounts::new(from_local(start, tz), counts))
        .collect()
}

/// Weekly totals across every teacher.
pub fn compute_weekly_summary<Tz: TimeZone>(records: &[ActivityRecord], tz: &Tz) -> Vec<WeeklyCounts> {
    group_by_week(records, tz)
}
