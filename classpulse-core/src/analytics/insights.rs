//! Scalar insight cards for the dashboard header.

use std::collections::HashSet;

use serde::Serialize;

use crate::types::{ActivityRecord, KindCounts};

/// Submission rate has no data source yet and is always reported as zero.
pub const SUBMISSION_RATE_PLACEHOLDER: u64 = 0;

/// Totals over the records of one period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsSummary {
    /// Distinct teachers with at least one record
    #[serde(rename = "activeTeachers")]
    pub active_teacher_count: u64,
    pub lessons_created: u64,
    pub quizzes_conducted: u64,
    pub assessments_made: u64,
    /// Unfinished metric, always [`SUBMISSION_RATE_PLACEHOLDER`]
    pub submission_rate: u64,
}

/// Single pass over `records`.
pub fn compute_insights(records: &[ActivityRecord]) -> InsightsSummary {
    let mut teachers: HashSet<&str> = HashSet::new();
    let mut counts = KindCounts::default();

    for record in records {
        teachers.insert(record.teacher_id.as_str());
        counts.record(record.kind());
    }

    InsightsSummary {
        active_teacher_count: teachers.len() as u64,
        lessons_created: counts.lessons,
        quizzes_conducted: counts.quizzes,
        assessments_made: counts.assessments,
        submission_rate: SUBMISSION_RATE_PLACEHOLDER,
    }
}
