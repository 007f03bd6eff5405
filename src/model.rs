//! Core journal types shared by the store, the analyzer and the CLI

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

/// Lowest score the analyzer accepts.
pub const MIN_SCORE: u8 = 1;
/// Highest score the analyzer accepts.
pub const MAX_SCORE: u8 = 10;

/// A single-axis score, always within [1, 10].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Score(u8);

impl Score {
    /// Returns `None` when `value` is outside [1, 10].
    pub fn new(value: i64) -> Option<Self> {
        if (MIN_SCORE as i64..=MAX_SCORE as i64).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl From<Score> for i64 {
    fn from(score: Score) -> Self {
        score.0 as i64
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scoring dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Overall mood, higher is more positive
    Reflection,
    Stress,
    Anxiety,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Reflection, Axis::Stress, Axis::Anxiety];

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Reflection => "reflection",
            Axis::Stress => "stress",
            Axis::Anxiety => "anxiety",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three scores attached to every stored entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSet {
    pub reflection: Score,
    pub stress: Score,
    pub anxiety: Score,
}

impl ScoreSet {
    pub fn get(&self, axis: Axis) -> Score {
        match axis {
            Axis::Reflection => self.reflection,
            Axis::Stress => self.stress,
            Axis::Anxiety => self.anxiety,
        }
    }
}

/// A registered user. Never updated after sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub dob: NaiveDate,
    pub height_cm: u32,
    pub weight_kg: u32,
}

/// A fully scored, persisted journal entry
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub id: String,
    pub username: String,
    pub text: String,
    pub scores: ScoreSet,
    pub created_at: DateTime<Utc>,
}
