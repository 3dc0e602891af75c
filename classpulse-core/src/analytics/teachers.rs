//! Per-teacher totals for the teachers table and detail view.

use std::collections::HashMap;

use chrono::TimeZone;
use serde::Serialize;

use super::weekly::{group_by_week, WeeklyCounts};
use crate::types::{ActivityRecord, KindCounts};

/// Aggregated activity for one teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSummary {
    /// Serialized as `_id`, the teacher id string
    #[serde(rename = "_id")]
    pub teacher_id: String,
    /// Name from the first record seen for this teacher
    #[serde(rename = "name")]
    pub teacher_name: String,
    /// Subject from the first record seen for this teacher
    pub subject: String,
    pub total_lessons: u64,
    pub total_quizzes: u64,
    pub total_assessments: u64,
    /// Only weeks with activity, ascending
    pub weekly_activity: Vec<WeeklyCounts>,
}

/// Summarize one teacher's records. `None` when there are no records.
///
/// Name and subject come from the first record in store order; later
/// records are not checked for consistency.
fn summarize<Tz: TimeZone>(
    teacher_id: &str,
    records: &[&ActivityRecord],
    tz: &Tz,
) -> Option<TeacherSummary> {
    let first = records.first()?;

    let mut totals = KindCounts::default();
    for record in records {
        totals.record(record.kind());
    }

    Some(TeacherSummary {
        teacher_id: teacher_id.to_string(),
        teacher_name: first.teacher_name.clone(),
        subject: first.subject.clone(),
        total_lessons: totals.lessons,
        total_quizzes: totals.quizzes,
        total_assessments: totals.assessments,
        weekly_activity: group_by_week(records.iter().copied(), tz),
    })
}

/// Summaries for every teacher present in `records`, sorted by name.
pub fn compute_all_teachers<Tz: TimeZone>(
    records: &[ActivityRecord],
    tz: &Tz,
) -> Vec<TeacherSummary> {
    // Partition in first-seen order so the per-teacher record order matches the store
    let mut order: Vec<&str> = Vec::new();
    let mut partitions: HashMap<&str, Vec<&ActivityRecord>> = HashMap::new();

    for record in records {
        let id = record.teacher_id.as_str();
        partitions
            .entry(id)
            .or_insert_with(|| {
                order.push(id);
                Vec::new()
            })
            .push(record);
    }

    let mut summaries: Vec<TeacherSummary> = order
        .into_iter()
        .filter_map(|id| summarize(id, partitions.get(id)?, tz))
        .collect();

    summaries.sort_by(|a, b| a.teacher_name.cmp(&b.teacher_name));
    summaries
}

/// Summary for `teacher_id`, or `None` if none of `records` belong to it.
pub fn compute_teacher_by_id<Tz: TimeZone>(
    teacher_id: &str,
    records: &[ActivityRecord],
    tz: &Tz,
) -> Option<TeacherSummary> {
    let own: Vec<&ActivityRecord> = records
        .iter()
        .filter(|record| record.teacher_id == teacher_id)
        .collect();
    summarize(teacher_id, &own, tz)
}
