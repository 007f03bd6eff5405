//! Credential and entry storage with SQLite
//!
//! - `users`: one immutable profile per username
//! - `journal_entries`: append-only, fully scored entries keyed by username

mod schema;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use uuid::Uuid;

use crate::history::{format_timestamp, parse_timestamp};
use crate::model::{JournalEntry, ScoreSet, UserProfile};

pub use schema::SCHEMA;

pub struct JournalStore {
    conn: Connection,
}

impl JournalStore {
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ============================================
    // USERS
    // ============================================

    /// Insert a new profile. Returns false if the username is already taken;
    /// existing profiles are never overwritten.
    pub fn create_user(&self, profile: &UserProfile) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO users (username, password_hash, name, dob, height_cm, weight_kg)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                profile.username,
                profile.password_hash,
                profile.name,
                profile.dob.format("%Y-%m-%d").to_string(),
                profile.height_cm,
                profile.weight_kg,
            ],
        )?;
        Ok(inserted == 1)
    }

    pub fn get_user_profile(&self, username: &str) -> Result<Option<UserProfile>> {
        let result = self.conn.query_row(
            "SELECT username, password_hash, name, dob, height_cm, weight_kg
             FROM users WHERE username = ?",
            params![username],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, u32>(4)?,
                    row.get::<_, u32>(5)?,
                ))
            },
        );

        let (username, password_hash, name, dob, height_cm, weight_kg) = match result {
            Ok(fields) => fields,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let dob = NaiveDate::parse_from_str(&dob, "%Y-%m-%d")
            .with_context(|| format!("Invalid date of birth stored for user {}", username))?;

        Ok(Some(UserProfile {
            username,
            password_hash,
            name,
            dob,
            height_cm,
            weight_kg,
        }))
    }

    // ============================================
    // ENTRIES
    // ============================================

    /// Append a scored entry, stamping it with the current time.
    ///
    /// Timestamps are strictly increasing per user: if the clock has not
    /// moved past the latest entry, the new one lands a microsecond after it.
    pub fn append_entry(&self, username: &str, text: &str, scores: &ScoreSet) -> Result<JournalEntry> {
        let now = Utc::now();
        let created_at = match self.latest_timestamp(username)? {
            Some(latest) if now <= latest => latest + Duration::microseconds(1),
            _ => now,
        };
        let id = Uuid::new_v4().to_string();

        self.conn.execute(
            r#"INSERT INTO journal_entries
               (id, username, journal_text, reflection_score, stress_score, anxiety_score, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                id,
                username,
                text,
                i64::from(scores.reflection),
                i64::from(scores.stress),
                i64::from(scores.anxiety),
                format_timestamp(created_at),
            ],
        )?;

        tracing::debug!(entry = %id, user = username, "appended journal entry");

        Ok(JournalEntry {
            id,
            username: username.to_string(),
            text: text.to_string(),
            scores: *scores,
            created_at,
        })
    }

    /// Newest parseable timestamp among the user's entries. Unparseable
    /// values are logged and skipped.
    fn latest_timestamp(&self, username: &str) -> Result<Option<DateTime<Utc>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, created_at FROM journal_entries WHERE username = ?")?;
        let rows = stmt.query_map(params![username], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut latest: Option<DateTime<Utc>> = None;
        for row in rows {
            let (id, raw) = row?;
            match parse_timestamp(&raw) {
                Some(ts) => latest = latest.max(Some(ts)),
                None => tracing::warn!(entry = %id, created_at = %raw, "unparseable entry timestamp"),
            }
        }
        Ok(latest)
    }

    /// All stored rows for a user, unvalidated.
    pub fn list_entries(&self, username: &str) -> Result<Vec<EntryRow>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, username, journal_text, reflection_score, stress_score,
                      anxiety_score, created_at
               FROM journal_entries
               WHERE username = ?
               ORDER BY seq"#,
        )?;

        let rows = stmt.query_map(params![username], |row| {
            Ok(EntryRow {
                id: row.get(0)?,
                username: row.get(1)?,
                text: row.get(2)?,
                reflection_score: row.get(3)?,
                stress_score: row.get(4)?,
                anxiety_score: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn count_entries(&self, username: &str) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM journal_entries WHERE username = ?",
            params![username],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    #[cfg(test)]
    pub(crate) fn insert_raw_entry(&self, row: &EntryRow) -> Result<()> {
        self.conn.execute(
            r#"INSERT INTO journal_entries
               (id, username, journal_text, reflection_score, stress_score, anxiety_score, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                row.id,
                row.username,
                row.text,
                row.reflection_score,
                row.stress_score,
                row.anxiety_score,
                row.created_at,
            ],
        )?;
        Ok(())
    }
}

// ============================================
// ROW TYPES
// ============================================

/// An entry as stored, before timestamp and score validation
#[derive(Debug, Clone)]
pub struct EntryRow {
    pub id: String,
    pub username: String,
    pub text: String,
    pub reflection_score: i64,
    pub stress_score: i64,
    pub anxiety_score: i64,
    pub created_at: String,
}
