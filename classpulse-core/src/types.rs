//! Core domain types for classpulse
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Activity** | One piece of authored teaching material, stored as an [`ActivityRecord`] |
//! | **Activity kind** | [`ActivityKind`]: lesson plan, quiz or question paper |
//! | **Bucket** | A fixed day, week or month slice used to group activities for charts |
//! | **Period** | The caller-selected window granularity: week, month or year |
//!
//! Records keep the raw `activity_type` string as it was stored. Only the three
//! recognized strings map to an [`ActivityKind`]; anything else is still an
//! activity (it counts towards teacher presence and workload) but never
//! increments a per-kind counter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Activity kinds
// ============================================

/// The three classifiable activity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityKind {
    LessonPlan,
    Quiz,
    QuestionPaper,
}

impl ActivityKind {
    /// Stored representation of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::LessonPlan => "Lesson Plan",
            ActivityKind::Quiz => "Quiz",
            ActivityKind::QuestionPaper => "Question Paper",
        }
    }
}

impl std::str::FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Lesson Plan" => Ok(ActivityKind::LessonPlan),
            "Quiz" => Ok(ActivityKind::Quiz),
            "Question Paper" => Ok(ActivityKind::QuestionPaper),
            _ => Err(format!("unknown activity type: {}", s)),
        }
    }
}

// ============================================
// Activity records
// ============================================

/// A single authored activity as persisted by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Stable teacher identifier
    pub teacher_id: String,
    /// Teacher display name
    pub teacher_name: String,
    /// School grade the activity targets
    pub grade: i64,
    /// Subject name (opaque)
    pub subject: String,
    /// Raw activity type as stored ("Lesson Plan", "Quiz", "Question Paper", ...)
    pub activity_type: String,
    /// When the activity was created
    pub created_at: DateTime<Utc>,
}

impl ActivityRecord {
    /// The classified kind, or `None` for unrecognized activity types.
    pub fn kind(&self) -> Option<ActivityKind> {
        self.activity_type.parse().ok()
    }
}

// ============================================
// Kind counters
// ============================================

/// One counter per [`ActivityKind`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    pub lessons: u64,
    pub quizzes: u64,
    pub assessments: u64,
}

impl KindCounts {
    /// Increment the counter for `kind`. Unrecognized kinds are ignored.
    pub fn record(&mut self, kind: Option<ActivityKind>) {
        match kind {
            Some(ActivityKind::LessonPlan) => self.lessons += 1,
            Some(ActivityKind::Quiz) => self.quizzes += 1,
            Some(ActivityKind::QuestionPaper) => self.assessments += 1,
            None => {}
        }
    }

    /// Sum across all three kinds.
    pub fn total(&self) -> u64 {
        self.lessons + self.quizzes + self.assessments
    }
}

// ============================================
// Periods
// ============================================

/// Caller-selected aggregation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    Month,
    Year,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            _ => Err(format!("unknown period: {}", s)),
        }
    }
}
