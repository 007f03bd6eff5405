//! SQLite schema definition
//!
//! Entries are append-only: nothing in the store updates or deletes a row
//! of `journal_entries`.

pub const SCHEMA: &str = r#"
-- ============================================
-- USERS
-- ============================================

-- One row per account, written once at sign-up
CREATE TABLE IF NOT EXISTS users (
    username TEXT PRIMARY KEY,
    password_hash TEXT NOT NULL,           -- 'sha256$<salt>$<hex digest>'
    name TEXT NOT NULL,
    dob TEXT NOT NULL,                     -- ISO date, YYYY-MM-DD
    height_cm INTEGER NOT NULL,
    weight_kg INTEGER NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

-- ============================================
-- JOURNAL ENTRIES
-- ============================================

CREATE TABLE IF NOT EXISTS journal_entries (
    seq INTEGER PRIMARY KEY,               -- insertion order
    id TEXT NOT NULL UNIQUE,               -- UUID
    username TEXT NOT NULL,
    journal_text TEXT NOT NULL,
    reflection_score INTEGER NOT NULL,
    stress_score INTEGER NOT NULL,
    anxiety_score INTEGER NOT NULL,
    created_at TEXT NOT NULL,              -- RFC 3339 UTC, nanosecond precision
    FOREIGN KEY(username) REFERENCES users(username)
);

-- ============================================
-- INDEXES
-- ============================================

CREATE INDEX IF NOT EXISTS idx_entries_user ON journal_entries(username, seq);
"#;
