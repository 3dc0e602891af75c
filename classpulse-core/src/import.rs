//! Seed import from JSON.
//!
//! The seed file is a JSON array of objects keyed the way exports from the
//! legacy dashboard are:
//!
//! ```json
//! [{"Teacher_id": "T001", "Teacher_name": "Asha Rao", "Grade": 8,
//!   "Subject": "Mathematics", "Activity_type": "Quiz",
//!   "Created_at": "2024-07-12T10:30:00Z"}]
//! ```
//!
//! `Created_at` accepts RFC 3339, a zone-less `YYYY-MM-DDTHH:MM:SS` (read as
//! local wall-clock time in the caller's zone) or a bare `YYYY-MM-DD` (UTC
//! midnight).

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Deserialize;

use crate::analytics::timebucket::from_local;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::store::{ActivityFilter, RecordStore};
use crate::types::ActivityRecord;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Deserialize)]
struct SeedRecord {
    #[serde(rename = "Teacher_id")]
    teacher_id: String,
    #[serde(rename = "Teacher_name")]
    teacher_name: String,
    #[serde(rename = "Grade")]
    grade: i64,
    #[serde(rename = "Subject")]
    subject: String,
    #[serde(rename = "Activity_type")]
    activity_type: String,
    #[serde(rename = "Created_at")]
    created_at: String,
}

impl SeedRecord {
    fn into_record<Tz: TimeZone>(self, index: usize, tz: &Tz) -> Result<ActivityRecord> {
        let invalid = |message: String| Error::InvalidRecord { index, message };

        for (field, value) in [
            ("Teacher_id", &self.teacher_id),
            ("Teacher_name", &self.teacher_name),
            ("Subject", &self.subject),
            ("Activity_type", &self.activity_type),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(format!("{} is empty", field)));
            }
        }

        let created_at = parse_created_at(&self.created_at, tz)
            .ok_or_else(|| invalid(format!("unparseable Created_at {:?}", self.created_at)))?;

        Ok(ActivityRecord {
            teacher_id: self.teacher_id,
            teacher_name: self.teacher_name,
            grade: self.grade,
            subject: self.subject,
            activity_type: self.activity_type,
            created_at,
        })
    }
}

/// Parse a seed timestamp in any of the accepted shapes.
pub fn parse_created_at<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(from_local(naive, tz));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// Parse and validate a seed document.
///
/// Fails on the first invalid record; nothing is partially accepted.
pub fn parse_seed_json<Tz: TimeZone>(json: &str, tz: &Tz) -> Result<Vec<ActivityRecord>> {
    let seeds: Vec<SeedRecord> = serde_json::from_str(json)?;
    seeds
        .into_iter()
        .enumerate()
        .map(|(index, seed)| seed.into_record(index, tz))
        .collect()
}

/// Read and parse a seed file.
pub fn load_seed_file<Tz: TimeZone>(path: &Path, tz: &Tz) -> Result<Vec<ActivityRecord>> {
    let json = std::fs::read_to_string(path)?;
    let records = parse_seed_json(&json, tz)?;
    tracing::debug!(path = %path.display(), count = records.len(), "Loaded seed file");
    Ok(records)
}

/// What [`import_records`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The store already held data and replacing was not requested
    Skipped { existing: i64 },
    /// Records were written, after removing `replaced` existing ones
    Imported { inserted: usize, replaced: usize },
}

/// Insert `records` unless the store already has data.
///
/// With `replace`, existing data is swapped out in the same transaction
/// instead of skipping.
pub fn import_records(
    db: &Database,
    records: &[ActivityRecord],
    replace: bool,
) -> Result<ImportOutcome> {
    let existing = db.count_activities()?;

    if existing > 0 && !replace {
        tracing::warn!(existing, "Activities already present, skipping import");
        return Ok(ImportOutcome::Skipped { existing });
    }

    let (replaced, inserted) = if existing > 0 {
        db.replace_activities(records)?
    } else {
        (0, db.insert_activities(records)?)
    };

    tracing::info!(inserted, replaced, "Import complete");
    Ok(ImportOutcome::Imported { inserted, replaced })
}

/// Per-teacher record count, for the post-import report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherCount {
    pub teacher_id: String,
    /// Name from the teacher's first record
    pub teacher_name: String,
    pub activity_count: usize,
}

/// One entry per teacher in first-insertion order.
pub fn teacher_counts<S: RecordStore + ?Sized>(store: &S) -> Result<Vec<TeacherCount>> {
    let mut counts = Vec::new();
    for teacher_id in store.distinct_teacher_ids()? {
        let records = store.query(&ActivityFilter::for_teacher(teacher_id.as_str()))?;
        let teacher_name = records
            .first()
            .map(|r| r.teacher_name.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        counts.push(TeacherCount {
            teacher_id,
            teacher_name,
            activity_count: records.len(),
        });
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    const SEED: &str = r#"[
        {"Teacher_id": "T002", "Teacher_name": "Zara Khan", "Grade": 9, "Subject": "Science",
         "Activity_type": "Quiz", "Created_at": "2024-07-12T10:30:00Z"},
        {"Teacher_id": "T001", "Teacher_name": "Asha Rao", "Grade": 8, "Subject": "Mathematics",
         "Activity_type": "Lesson Plan", "Created_at": "2024-07-11T09:00:00.000+05:30"},
        {"Teacher_id": "T002", "Teacher_name": "Zara Khan", "Grade": 9, "Subject": "Science",
         "Activity_type": "Question Paper", "Created_at": "2024-07-13"}
    ]"#;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    #[test]
    fn test_parse_seed_json() {
        let records = parse_seed_json(SEED, &Utc).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].teacher_id, "T002");
        assert_eq!(
            records[1].created_at,
            Utc.with_ymd_and_hms(2024, 7, 11, 3, 30, 0).unwrap()
        );
        assert_eq!(
            records[2].created_at,
            Utc.with_ymd_and_hms(2024, 7, 13, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_naive_timestamp_is_local() {
        let tz = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let parsed = parse_created_at("2024-07-11T09:00:00", &tz).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 7, 11, 3, 30, 0).unwrap());

        let parsed = parse_created_at("2024-07-11 09:00:00", &Utc).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 7, 11, 9, 0, 0).unwrap());

        assert!(parse_created_at("last tuesday", &Utc).is_none());
    }

    #[test]
    fn test_invalid_record_reports_index() {
        let json = r#"[
            {"Teacher_id": "T1", "Teacher_name": "A", "Grade": 7, "Subject": "Art",
             "Activity_type": "Quiz", "Created_at": "2024-01-01"},
            {"Teacher_id": " ", "Teacher_name": "B", "Grade": 7, "Subject": "Art",
             "Activity_type": "Quiz", "Created_at": "2024-01-01"}
        ]"#;
        match parse_seed_json(json, &Utc) {
            Err(Error::InvalidRecord { index, message }) => {
                assert_eq!(index, 1);
                assert!(message.contains("Teacher_id"));
            }
            other => panic!("expected InvalidRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_field_is_json_error() {
        let json = r#"[{"Teacher_id": "T1"}]"#;
        assert!(matches!(parse_seed_json(json, &Utc), Err(Error::Json(_))));
    }

    #[test]
    fn test_import_skips_when_data_exists() {
        let db = test_db();
        let records = parse_seed_json(SEED, &Utc).unwrap();

        let outcome = import_records(&db, &records, false).unwrap();
        assert_eq!(
            outcome,
            ImportOutcome::Imported {
                inserted: 3,
                replaced: 0
            }
        );

        let outcome = import_records(&db, &records, false).unwrap();
        assert_eq!(outcome, ImportOutcome::Skipped { existing: 3 });
        assert_eq!(db.count_activities().unwrap(), 3);
    }

    #[test]
    fn test_import_replace() {
        let db = test_db();
        let records = parse_seed_json(SEED, &Utc).unwrap();
        import_records(&db, &records, false).unwrap();

        let outcome = import_records(&db, &records[..1], true).unwrap();
        assert_eq!(
            outcome,
            ImportOutcome::Imported {
                inserted: 1,
                replaced: 3
            }
        );
        assert_eq!(db.count_activities().unwrap(), 1);
    }

    #[test]
    fn test_failed_replace_keeps_previous_data() {
        let db = test_db();
        let records = parse_seed_json(SEED, &Utc).unwrap();
        import_records(&db, &records, false).unwrap();
        db.connection()
            .execute_batch(
                "CREATE TRIGGER reject_insert BEFORE INSERT ON activities
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        assert!(import_records(&db, &records[..1], true).is_err());
        assert_eq!(db.count_activities().unwrap(), 3);
    }

    #[test]
    fn test_teacher_counts() {
        let db = test_db();
        import_records(&db, &parse_seed_json(SEED, &Utc).unwrap(), false).unwrap();

        let counts = teacher_counts(&db).unwrap();
        assert_eq!(
            counts,
            vec![
                TeacherCount {
                    teacher_id: "T002".to_string(),
                    teacher_name: "Zara Khan".to_string(),
                    activity_count: 2,
                },
                TeacherCount {
                    teacher_id: "T001".to_string(),
                    teacher_name: "Asha Rao".to_string(),
                    activity_count: 1,
                },
            ]
        );
    }

    #[test]
    fn test_load_seed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(&path, SEED).unwrap();

        assert_eq!(load_seed_file(&path, &Utc).unwrap().len(), 3);
        assert!(matches!(
            load_seed_file(&dir.path().join("missing.json"), &Utc),
            Err(Error::Io(_))
        ));
    }
}
