//! Horizon filtering of a user's entry history
//!
//! Stored rows come back in no guaranteed order and may carry timestamps
//! written by older versions. Rows that cannot be read are dropped with a
//! warning instead of failing the whole view.

use chrono::{DateTime, Duration, Months, NaiveDateTime, SecondsFormat, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::{JournalEntry, Score, ScoreSet};
use crate::store::EntryRow;

/// A stored entry that could not be turned into a [`JournalEntry`]
#[derive(Debug, Error)]
#[error("malformed entry {entry_id}: {reason}")]
pub struct MalformedRecordError {
    pub entry_id: String,
    pub reason: String,
}

/// Named look-back window for charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Horizon {
    OneDay,
    OneWeek,
    OneMonth,
    SixMonths,
    OneYear,
    FiveYears,
}

impl Horizon {
    pub const ALL: [Horizon; 6] = [
        Horizon::OneDay,
        Horizon::OneWeek,
        Horizon::OneMonth,
        Horizon::SixMonths,
        Horizon::OneYear,
        Horizon::FiveYears,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Horizon::OneDay => "1d",
            Horizon::OneWeek => "1w",
            Horizon::OneMonth => "1m",
            Horizon::SixMonths => "6m",
            Horizon::OneYear => "1y",
            Horizon::FiveYears => "5y",
        }
    }

    /// Earliest instant still inside the window ending at `now`.
    ///
    /// Months and years are calendar offsets: the day of month is clamped,
    /// so one month before March 31 is the last day of February.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let shifted = match self {
            Horizon::OneDay => now.checked_sub_signed(Duration::days(1)),
            Horizon::OneWeek => now.checked_sub_signed(Duration::weeks(1)),
            Horizon::OneMonth => now.checked_sub_months(Months::new(1)),
            Horizon::SixMonths => now.checked_sub_months(Months::new(6)),
            Horizon::OneYear => now.checked_sub_months(Months::new(12)),
            Horizon::FiveYears => now.checked_sub_months(Months::new(60)),
        };
        shifted.unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Horizon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Horizon::ALL
            .iter()
            .copied()
            .find(|h| h.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let tags: Vec<&str> = Horizon::ALL.iter().map(|h| h.as_str()).collect();
                format!("unknown horizon '{}', expected one of {}", s, tags.join(", "))
            })
    }
}

/// Storage format for entry timestamps. Fixed width, so it also sorts lexically.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a stored timestamp. Accepts RFC 3339 and offset-less ISO 8601,
/// the latter read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

impl TryFrom<EntryRow> for JournalEntry {
    type Error = MalformedRecordError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let malformed = |reason: String| MalformedRecordError {
            entry_id: row.id.clone(),
            reason,
        };

        let created_at = parse_timestamp(&row.created_at)
            .ok_or_else(|| malformed(format!("unparseable timestamp {:?}", row.created_at)))?;

        let score = |name: &str, value: i64| {
            Score::new(value).ok_or_else(|| malformed(format!("{} score {} out of range", name, value)))
        };
        let scores = ScoreSet {
            reflection: score("reflection", row.reflection_score)?,
            stress: score("stress", row.stress_score)?,
            anxiety: score("anxiety", row.anxiety_score)?,
        };

        Ok(JournalEntry {
            id: row.id,
            username: row.username,
            text: row.text,
            scores,
            created_at,
        })
    }
}

/// Chronologically ordered entries inside `horizon`, measured from now.
pub fn filter_by_horizon(entries: Vec<EntryRow>, horizon: Horizon) -> Vec<JournalEntry> {
    filter_by_horizon_at(entries, horizon, Utc::now())
}

/// Same as [`filter_by_horizon`] with an explicit clock.
pub fn filter_by_horizon_at(
    entries: Vec<EntryRow>,
    horizon: Horizon,
    now: DateTime<Utc>,
) -> Vec<JournalEntry> {
    let mut parsed: Vec<JournalEntry> = entries
        .into_iter()
        .filter_map(|row| match JournalEntry::try_from(row) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(entry = %e.entry_id, reason = %e.reason, "skipping malformed entry");
                None
            }
        })
        .collect();

    // Stable, so equal timestamps keep their storage order
    parsed.sort_by_key(|e| e.created_at);

    let cutoff = horizon.cutoff(now);
    parsed.retain(|e| e.created_at >= cutoff);
    parsed
}
