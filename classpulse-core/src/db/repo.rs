//! Database repository layer
//!
//! Insert, count and filtered query operations over the activity log.

use crate::error::Result;
use crate::store::{ActivityFilter, GradeMatch, RecordStore};
use crate::types::ActivityRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row, Transaction};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Stored form of a timestamp.
///
/// Fixed millisecond precision with a `Z` suffix, so comparing the text
/// compares the instants.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Database handle (single connection behind a mutex)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL lets dashboard reads proceed while an import is writing
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA cache_size = -16000;  -- 16MB cache
            ",
        )?;

        tracing::debug!(path = %path.display(), "Opened database");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.connection();
        super::schema::run_migrations(&conn)
    }

    /// Get the underlying connection (for advanced use)
    ///
    /// A panic while holding the lock cannot leave a half-applied
    /// statement behind, so a poisoned lock is recovered.
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ============================================
    // Activity operations
    // ============================================

    /// Insert records in a single transaction. Returns the number inserted.
    pub fn insert_activities(&self, records: &[ActivityRecord]) -> Result<usize> {
        let mut conn = self.connection();
        let tx = conn.transaction()?;
        Self::insert_activities_tx(&tx, records)?;
        tx.commit()?;

        tracing::debug!(count = records.len(), "Inserted activities");
        Ok(records.len())
    }

    /// Delete every record and insert `records` in one transaction.
    ///
    /// Returns `(removed, inserted)`. On failure the previous rows are kept.
    pub fn replace_activities(&self, records: &[ActivityRecord]) -> Result<(usize, usize)> {
        let mut conn = self.connection();
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM activities", [])?;
        Self::insert_activities_tx(&tx, records)?;
        tx.commit()?;

        tracing::info!(removed, inserted = records.len(), "Replaced activities");
        Ok((removed, records.len()))
    }

    fn insert_activities_tx(tx: &Transaction, records: &[ActivityRecord]) -> Result<()> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO activities (teacher_id, teacher_name, grade, subject, activity_type, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )?;
        for record in records {
            stmt.execute(params![
                record.teacher_id,
                record.teacher_name,
                record.grade,
                record.subject,
                record.activity_type,
                format_timestamp(&record.created_at),
            ])?;
        }
        Ok(())
    }

    /// Count all stored records
    pub fn count_activities(&self) -> Result<i64> {
        let conn = self.connection();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM activities", [], |r| r.get(0))?;
        Ok(count)
    }

    fn row_to_activity(row: &Row) -> rusqlite::Result<ActivityRecord> {
        let created_at: String = row.get("created_at")?;
        Ok(ActivityRecord {
            teacher_id: row.get("teacher_id")?,
            teacher_name: row.get("teacher_name")?,
            grade: row.get("grade")?,
            subject: row.get("subject")?,
            activity_type: row.get("activity_type")?,
            created_at: parse_timestamp(5, &created_at)?,
        })
    }
}

impl RecordStore for Database {
    fn query(&self, filter: &ActivityFilter) -> Result<Vec<ActivityRecord>> {
        let conn = self.connection();

        let mut sql = String::from(
            "SELECT teacher_id, teacher_name, grade, subject, activity_type, created_at \
             FROM activities WHERE 1=1",
        );
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![];

        if let Some(from) = &filter.created_from {
            sql.push_str(" AND created_at >= ?");
            params.push(Box::new(format_timestamp(from)));
        }

        if let Some(to) = &filter.created_to {
            sql.push_str(" AND created_at < ?");
            params.push(Box::new(format_timestamp(to)));
        }

        if let Some(teacher_id) = &filter.teacher_id {
            sql.push_str(" AND teacher_id = ?");
            params.push(Box::new(teacher_id.clone()));
        }

        match filter.grade {
            Some(GradeMatch::Exact(grade)) => {
                sql.push_str(" AND grade = ?");
                params.push(Box::new(grade));
            }
            Some(GradeMatch::Nothing) => sql.push_str(" AND 0"),
            None => {}
        }

        if let Some(subject) = &filter.subject {
            sql.push_str(" AND subject = ?");
            params.push(Box::new(subject.clone()));
        }

        sql.push_str(" ORDER BY id ASC");

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_refs.as_slice(), Self::row_to_activity)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::trace!(?filter, count = records.len(), "Queried activities");
        Ok(records)
    }

    fn distinct_teacher_ids(&self) -> Result<Vec<String>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT teacher_id FROM activities GROUP BY teacher_id ORDER BY MIN(id) ASC",
        )?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(ids)
    }
}
