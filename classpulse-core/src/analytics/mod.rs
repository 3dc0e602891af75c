//! Analytics module for classpulse
//!
//! Pure aggregations over [`ActivityRecord`](crate::types::ActivityRecord)
//! slices, plus the [`dashboard`] service that feeds them from a store:
//! - Time bucketing helpers (local wall-clock day/week/period starts)
//! - Chart buckets per period
//! - Insight cards and the AI pulse
//! - Weekly and per-teacher summaries
//!
//! Nothing here is cached; every call recomputes from the records given.

pub mod buckets;
pub mod dashboard;
pub mod insights;
pub mod pulse;
pub mod teachers;
pub mod timebucket;
pub mod weekly;

pub use buckets::{compute_buckets, Bucket, BucketId, BucketScheme};
pub use dashboard::{DashboardQuery, Overview};
pub use insights::{compute_insights, InsightsSummary, SUBMISSION_RATE_PLACEHOLDER};
pub use pulse::{
    busiest_grade, busiest_teacher, compute_pulse, GradeLeader, PulseInsight, PulseKind,
    WorkloadLeader,
};
pub use teachers::{compute_all_teachers, compute_teacher_by_id, TeacherSummary};
pub use weekly::{compute_weekly_summary, WeeklyCounts};
