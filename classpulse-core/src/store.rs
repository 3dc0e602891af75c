//! Record store abstraction.
//!
//! Aggregation code only ever sees [`ActivityRecord`] slices; where those come
//! from is behind [`RecordStore`]. [`crate::Database`] is the SQLite
//! implementation.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::ActivityRecord;

/// Subject filter value meaning "no subject filter".
pub const ALL_SUBJECTS: &str = "All Subjects";

/// Read access to persisted activity records.
pub trait RecordStore: Send + Sync {
    /// Records matching `filter`, in insertion order.
    fn query(&self, filter: &ActivityFilter) -> Result<Vec<ActivityRecord>>;

    /// Every teacher id present, in order of first insertion.
    fn distinct_teacher_ids(&self) -> Result<Vec<String>>;
}

/// Conjunction of optional record predicates. The default matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFilter {
    /// Inclusive lower bound on `created_at`
    pub created_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `created_at`
    pub created_to: Option<DateTime<Utc>>,
    pub teacher_id: Option<String>,
    pub grade: Option<GradeMatch>,
    pub subject: Option<String>,
}

/// Grade predicate parsed from a request token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeMatch {
    Exact(i64),
    /// The token named a grade no record can have (digits beyond `i64`)
    Nothing,
}

impl ActivityFilter {
    /// Match everything created at or after `from`.
    pub fn since(from: DateTime<Utc>) -> Self {
        Self {
            created_from: Some(from),
            ..Self::default()
        }
    }

    /// Match everything created in `[from, to)`; an absent `to` is open-ended.
    pub fn between(from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> Self {
        Self {
            created_from: Some(from),
            created_to: to,
            ..Self::default()
        }
    }

    /// Match only one teacher's records.
    pub fn for_teacher(teacher_id: impl Into<String>) -> Self {
        Self {
            teacher_id: Some(teacher_id.into()),
            ..Self::default()
        }
    }

    /// Restrict to the grade encoded in a free-form token such as `"Grade 9"`.
    ///
    /// A token without digits leaves the grade unfiltered.
    pub fn with_grade_token(mut self, token: Option<&str>) -> Self {
        self.grade = token.and_then(parse_grade_token);
        self
    }

    /// Restrict to one subject. Empty or [`ALL_SUBJECTS`] leaves it unfiltered.
    pub fn with_subject(mut self, subject: Option<&str>) -> Self {
        self.subject = subject
            .filter(|s| !s.is_empty() && *s != ALL_SUBJECTS)
            .map(str::to_string);
        self
    }
}

/// Concatenate every ASCII digit in `token` and parse the result.
///
/// `"Grade 9"` gives `Exact(9)`, `"Class 10 A"` gives `Exact(10)`, `"all"`
/// gives `None`. A digit run too large for `i64` gives `Nothing`.
pub fn parse_grade_token(token: &str) -> Option<GradeMatch> {
    let digits: String = token.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    Some(match digits.parse() {
        Ok(grade) => GradeMatch::Exact(grade),
        Err(_) => GradeMatch::Nothing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_grade_token() {
        assert_eq!(parse_grade_token("9"), Some(GradeMatch::Exact(9)));
        assert_eq!(parse_grade_token("Grade 9"), Some(GradeMatch::Exact(9)));
        assert_eq!(parse_grade_token("Class 10 A"), Some(GradeMatch::Exact(10)));
        assert_eq!(parse_grade_token("All Grades"), None);
        assert_eq!(parse_grade_token(""), None);
        assert_eq!(
            parse_grade_token("Grade 99999999999999999999999"),
            Some(GradeMatch::Nothing)
        );
    }

    #[test]
    fn test_grade_token_disables_filter_when_non_numeric() {
        let filter = ActivityFilter::default().with_grade_token(Some("all"));
        assert_eq!(filter.grade, None);

        let filter = ActivityFilter::default().with_grade_token(Some("Grade 7"));
        assert_eq!(filter.grade, Some(GradeMatch::Exact(7)));

        let filter = ActivityFilter::default().with_grade_token(None);
        assert_eq!(filter.grade, None);
    }

    #[test]
    fn test_subject_sentinel() {
        let filter = ActivityFilter::default().with_subject(Some(ALL_SUBJECTS));
        assert_eq!(filter.subject, None);

        let filter = ActivityFilter::default().with_subject(Some(""));
        assert_eq!(filter.subject, None);

        let filter = ActivityFilter::default().with_subject(Some("Science"));
        assert_eq!(filter.subject.as_deref(), Some("Science"));
    }

    #[test]
    fn test_constructors() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();

        let filter = ActivityFilter::between(from, Some(to));
        assert_eq!(filter.created_from, Some(from));
        assert_eq!(filter.created_to, Some(to));

        let filter = ActivityFilter::since(from);
        assert_eq!(filter.created_to, None);

        let filter = ActivityFilter::for_teacher("T1");
        assert_eq!(filter.teacher_id.as_deref(), Some("T1"));
        assert_eq!(filter.created_from, None);
    }
}
