//! "AI pulse" observations: short derived statements about the whole dataset.
//!
//! The pulse always has exactly three entries, in this order: workload,
//! enrollment, alert. Ties for busiest teacher or grade go to whichever was
//! encountered first in store order.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::types::ActivityRecord;

const ALERT_TEXT: &str = "Monitor teacher activity patterns for optimal resource allocation";

/// Which observation a [`PulseInsight`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PulseKind {
    Workload,
    Enrollment,
    Alert,
}

impl PulseKind {
    pub fn icon(&self) -> &'static str {
        match self {
            PulseKind::Workload => "👥",
            PulseKind::Enrollment => "📈",
            PulseKind::Alert => "⚠️",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            PulseKind::Workload => "purple",
            PulseKind::Enrollment => "green",
            PulseKind::Alert => "yellow",
        }
    }
}

/// One rendered pulse card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PulseInsight {
    #[serde(rename = "type")]
    pub kind: PulseKind,
    pub icon: &'static str,
    pub text: String,
    pub color: &'static str,
}

impl PulseInsight {
    fn new(kind: PulseKind, text: String) -> Self {
        Self {
            kind,
            icon: kind.icon(),
            text,
            color: kind.color(),
        }
    }
}

/// Teacher with the most records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkloadLeader {
    /// Empty when there are no records
    pub teacher_name: String,
    pub activity_count: u64,
    /// Distinct subjects across the teacher's records
    pub subject_count: u64,
}

/// Grade with the most records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradeLeader {
    /// `None` when there are no records
    pub grade: Option<i64>,
    pub activity_count: u64,
}

impl GradeLeader {
    /// Display name of the grade's class, e.g. "Class 9 A".
    ///
    /// The section letter is a fixed display convention.
    pub fn class_label(&self) -> String {
        self.grade
            .map(|grade| format!("Class {} A", grade))
            .unwrap_or_default()
    }
}

/// The teacher with the strictly greatest record count.
pub fn busiest_teacher(records: &[ActivityRecord]) -> WorkloadLeader {
    struct Tally<'a> {
        name: &'a str,
        count: u64,
        subjects: HashSet<&'a str>,
    }

    let mut order: Vec<&str> = Vec::new();
    let mut tallies: HashMap<&str, Tally> = HashMap::new();

    for record in records {
        let tally = tallies
            .entry(record.teacher_id.as_str())
            .or_insert_with(|| {
                order.push(record.teacher_id.as_str());
                Tally {
                    name: record.teacher_name.as_str(),
                    count: 0,
                    subjects: HashSet::new(),
                }
            });
        tally.count += 1;
        tally.subjects.insert(record.subject.as_str());
    }

    let mut leader = WorkloadLeader::default();
    for id in order {
        let Some(tally) = tallies.get(id) else {
            continue;
        };
        if tally.count > leader.activity_count {
            leader = WorkloadLeader {
                teacher_name: tally.name.to_string(),
                activity_count: tally.count,
                subject_count: tally.subjects.len() as u64,
            };
        }
    }
    leader
}

/// The grade with the strictly greatest record count.
pub fn busiest_grade(records: &[ActivityRecord]) -> GradeLeader {
    let mut order: Vec<i64> = Vec::new();
    let mut counts: HashMap<i64, u64> = HashMap::new();

    for record in records {
        *counts.entry(record.grade).or_insert_with(|| {
            order.push(record.grade);
            0
        }) += 1;
    }

    let mut leader = GradeLeader::default();
    for grade in order {
        let count = counts.get(&grade).copied().unwrap_or(0);
        if count > leader.activity_count {
            leader = GradeLeader {
                grade: Some(grade),
                activity_count: count,
            };
        }
    }
    leader
}

/// The three pulse cards for `records` (normally the unfiltered dataset).
pub fn compute_pulse(records: &[ActivityRecord]) -> [PulseInsight; 3] {
    let teacher = busiest_teacher(records);
    let grade = busiest_grade(records);

    [
        PulseInsight::new(
            PulseKind::Workload,
            format!(
                "{} has the highest workload with {} activities and {} subjects",
                teacher.teacher_name, teacher.activity_count, teacher.subject_count
            ),
        ),
        PulseInsight::new(
            PulseKind::Enrollment,
            format!(
                "{} has the most activity with {} activities",
                grade.class_label(),
                grade.activity_count
            ),
        ),
        PulseInsight::new(PulseKind::Alert, ALERT_TEXT.to_string()),
    ]
}
