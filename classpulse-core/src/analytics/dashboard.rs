//! Dashboard service: store queries composed with the aggregators.
//!
//! One function per dashboard endpoint. Each takes the store, the time zone
//! used for bucketing and an explicit `now`, so results are reproducible.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::buckets::{compute_buckets, Bucket, BucketScheme};
use super::insights::{compute_insights, InsightsSummary};
use super::pulse::{compute_pulse, PulseInsight};
use super::teachers::{compute_all_teachers, compute_teacher_by_id, TeacherSummary};
use super::timebucket::{from_local, period_start, to_local};
use super::weekly::{compute_weekly_summary, WeeklyCounts};
use crate::error::Result;
use crate::store::{ActivityFilter, RecordStore};
use crate::types::Period;

/// Period and filter parameters shared by the filtered endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    pub period: Option<String>,
    /// Free-form grade token, e.g. "Grade 9"
    pub grade: Option<String>,
    pub subject: Option<String>,
}

impl DashboardQuery {
    /// Requested period. Missing means week; unrecognized means `None`.
    pub fn period(&self) -> Option<Period> {
        self.period.as_deref().unwrap_or("week").parse().ok()
    }

    fn apply_filters(&self, filter: ActivityFilter) -> ActivityFilter {
        filter
            .with_grade_token(self.grade.as_deref())
            .with_subject(self.subject.as_deref())
    }
}

/// Chart buckets and insight cards for the same query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub activity: Vec<Bucket>,
    pub insights: InsightsSummary,
}

/// Weekly totals over every record.
pub fn weekly_summary<S, Tz>(store: &S, tz: &Tz) -> Result<Vec<WeeklyCounts>>
where
    S: RecordStore + ?Sized,
    Tz: TimeZone,
{
    let records = store.query(&ActivityFilter::default())?;
    Ok(compute_weekly_summary(&records, tz))
}

/// Activity chart buckets for the query's period.
///
/// An unrecognized period gets the daily week view.
pub fn daily_activity<S, Tz>(
    store: &S,
    query: &DashboardQuery,
    tz: &Tz,
    now: DateTime<Utc>,
) -> Result<Vec<Bucket>>
where
    S: RecordStore + ?Sized,
    Tz: TimeZone,
{
    let scheme = BucketScheme::for_period(query.period(), to_local(now, tz));
    let (from, to) = scheme.utc_range(tz);
    let filter = query.apply_filters(ActivityFilter::between(from, to));

    let records = store.query(&filter)?;
    tracing::debug!(?scheme, count = records.len(), "Computing activity buckets");
    Ok(compute_buckets(&records, &scheme, tz))
}

/// Insight cards for everything created since the period start.
///
/// An unrecognized period starts the window at today's midnight.
pub fn insights<S, Tz>(
    store: &S,
    query: &DashboardQuery,
    tz: &Tz,
    now: DateTime<Utc>,
) -> Result<InsightsSummary>
where
    S: RecordStore + ?Sized,
    Tz: TimeZone,
{
    let start = period_start(query.period(), to_local(now, tz));
    let filter = query.apply_filters(ActivityFilter::since(from_local(start, tz)));

    let records = store.query(&filter)?;
    Ok(compute_insights(&records))
}

/// Pulse cards over the whole dataset.
pub fn ai_pulse<S: RecordStore + ?Sized>(store: &S) -> Result<[PulseInsight; 3]> {
    let records = store.query(&ActivityFilter::default())?;
    Ok(compute_pulse(&records))
}

pub fn all_teachers<S, Tz>(store: &S, tz: &Tz) -> Result<Vec<TeacherSummary>>
where
    S: RecordStore + ?Sized,
    Tz: TimeZone,
{
    let records = store.query(&ActivityFilter::default())?;
    Ok(compute_all_teachers(&records, tz))
}

/// `Ok(None)` when the teacher has no records.
pub fn teacher_by_id<S, Tz>(store: &S, teacher_id: &str, tz: &Tz) -> Result<Option<TeacherSummary>>
where
    S: RecordStore + ?Sized,
    Tz: TimeZone,
{
    let records = store.query(&ActivityFilter::for_teacher(teacher_id))?;
    Ok(compute_teacher_by_id(teacher_id, &records, tz))
}
