//! Journal scoring and coaching reports
//!
//! Each axis is a separate completion call that must come back as a bare
//! integer. Asking for three numbers in one reply would save round-trips
//! but makes the reply much harder to parse reliably.

mod prompts;

use thiserror::Error;

use crate::completion::{CompletionEndpoint, CompletionError};
use crate::model::{Axis, Score, ScoreSet};

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("journal text is empty")]
    EmptyText,

    #[error("could not read a 1-10 {axis} score from reply {reply:?}")]
    ScoreParse { axis: Axis, reply: String },

    #[error(transparent)]
    Upstream(#[from] CompletionError),
}

/// Turns journal text into scores and a report through a completion endpoint
pub struct Analyzer {
    endpoint: Box<dyn CompletionEndpoint>,
    model: String,
    clarify_retries: u32,
}

impl Analyzer {
    pub fn new(endpoint: Box<dyn CompletionEndpoint>, model: impl Into<String>) -> Self {
        Self {
            endpoint,
            model: model.into(),
            clarify_retries: 0,
        }
    }

    /// Number of re-prompts after an unparseable score reply. Zero surfaces
    /// the parse error immediately.
    pub fn with_clarify_retries(mut self, retries: u32) -> Self {
        self.clarify_retries = retries;
        self
    }

    fn ask(&self, prompt: &str) -> Result<String, ScoringError> {
        tracing::debug!(endpoint = self.endpoint.name(), model = %self.model, "completion request");
        Ok(self.endpoint.complete(&self.model, prompt)?)
    }

    pub fn score(&self, text: &str, axis: Axis) -> Result<Score, ScoringError> {
        ensure_text(text)?;

        let mut reply = self.ask(&prompts::score_prompt(axis, text))?;
        let mut attempts = 0;
        loop {
            if let Some(score) = parse_score(&reply) {
                tracing::debug!(%axis, %score, "scored entry");
                return Ok(score);
            }
            if attempts >= self.clarify_retries {
                return Err(ScoringError::ScoreParse { axis, reply });
            }
            attempts += 1;
            tracing::warn!(%axis, attempt = attempts, reply = %reply, "unparseable score, asking again");
            reply = self.ask(&prompts::clarify_prompt(axis, text, &reply))?;
        }
    }

    /// Reflection, stress and anxiety in that order. The first failure aborts.
    pub fn score_all(&self, text: &str) -> Result<ScoreSet, ScoringError> {
        Ok(ScoreSet {
            reflection: self.score(text, Axis::Reflection)?,
            stress: self.score(text, Axis::Stress)?,
            anxiety: self.score(text, Axis::Anxiety)?,
        })
    }

    /// Free-form coaching report. The requested bullet layout is not checked.
    pub fn generate_report(&self, text: &str) -> Result<String, ScoringError> {
        ensure_text(text)?;
        let reply = self.ask(&prompts::report_prompt(text))?;
        Ok(reply.trim().to_string())
    }
}

fn ensure_text(text: &str) -> Result<(), ScoringError> {
    if text.trim().is_empty() {
        Err(ScoringError::EmptyText)
    } else {
        Ok(())
    }
}

/// Accepts `7`, ` 7\n`, `"7"` and `7.`; anything else is not a score.
pub fn parse_score(reply: &str) -> Option<Score> {
    let trimmed = reply.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    let digits = trimmed.strip_suffix('.').unwrap_or(trimmed);
    digits.parse::<i64>().ok().and_then(Score::new)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use crate::completion::{CompletionEndpoint, CompletionError};

    /// Replays canned replies in order and records every prompt it was sent.
    #[derive(Clone, Default)]
    pub struct ScriptedEndpoint {
        replies: Rc<RefCell<VecDeque<Result<String, CompletionError>>>>,
        pub prompts: Rc<RefCell<Vec<String>>>,
    }

    impl ScriptedEndpoint {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(self, text: &str) -> Self {
            self.replies.borrow_mut().push_back(Ok(text.to_string()));
            self
        }

        pub fn fail(self, err: CompletionError) -> Self {
            self.replies.borrow_mut().push_back(Err(err));
            self
        }

        pub fn calls(&self) -> usize {
            self.prompts.borrow().len()
        }
    }

    impl CompletionEndpoint for ScriptedEndpoint {
        fn name(&self) -> &str {
            "scripted"
        }

        fn complete(&self, _model: &str, prompt: &str) -> Result<String, CompletionError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(CompletionError::InvalidResponse {
                    message: "script exhausted".to_string(),
                }))
        }
    }
}
