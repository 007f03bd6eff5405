//! Journal operations for a signed-in user
//!
//! Every operation takes a [`RequestContext`] carrying the store, the
//! analyzer and the user. Nothing here keeps state between calls.

use anyhow::{Context, Result};

use crate::config::ThemesConfig;
use crate::history::{self, Horizon};
use crate::model::{JournalEntry, UserProfile};
use crate::scoring::Analyzer;
use crate::store::JournalStore;
use crate::themes::{self, ThemeCloud};

pub struct RequestContext<'a> {
    pub store: &'a JournalStore,
    /// Only needed for submissions; read-only views work without one
    pub analyzer: Option<&'a Analyzer>,
    pub user: UserProfile,
}

impl<'a> RequestContext<'a> {
    pub fn new(store: &'a JournalStore, user: UserProfile) -> Self {
        Self {
            store,
            analyzer: None,
            user,
        }
    }

    pub fn with_analyzer(mut self, analyzer: &'a Analyzer) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }
}

/// Result of a successful submission
#[derive(Debug)]
pub struct Submission {
    pub entry: JournalEntry,
    pub report: String,
}

/// Theme view for a horizon
#[derive(Debug)]
pub enum ThemeView {
    /// No entry in the window has any usable words
    NoData,
    Cloud(ThemeCloud),
}

/// Score, report on and store one journal entry.
///
/// All completion calls finish before the write, so a failed call leaves
/// the store untouched.
pub fn submit(ctx: &RequestContext<'_>, text: &str) -> Result<Submission> {
    let span = tracing::info_span!("submit", user = %ctx.username());
    let _guard = span.enter();

    let analyzer = ctx
        .analyzer
        .context("No completion endpoint configured for this request")?;
    let scores = analyzer.score_all(text)?;
    let report = analyzer.generate_report(text)?;

    let entry = ctx
        .store
        .append_entry(ctx.username(), text, &scores)
        .context("Failed to save journal entry")?;

    tracing::info!(
        entry = %entry.id,
        reflection = %scores.reflection,
        stress = %scores.stress,
        anxiety = %scores.anxiety,
        "saved journal entry"
    );

    Ok(Submission { entry, report })
}

/// Entries within `horizon`, oldest first
pub fn history(ctx: &RequestContext<'_>, horizon: Horizon) -> Result<Vec<JournalEntry>> {
    let rows = ctx.store.list_entries(ctx.username())?;
    let total = rows.len();
    let entries = history::filter_by_horizon(rows, horizon);
    tracing::debug!(%horizon, total, kept = entries.len(), "filtered history");
    Ok(entries)
}

/// Theme cloud for the entries within `horizon`
pub fn themes(
    ctx: &RequestContext<'_>,
    horizon: Horizon,
    config: &ThemesConfig,
) -> Result<ThemeView> {
    let entries = history(ctx, horizon)?;
    Ok(theme_view(&entries, config))
}

pub fn theme_view(entries: &[JournalEntry], config: &ThemesConfig) -> ThemeView {
    if entries.is_empty() {
        return ThemeView::NoData;
    }
    let texts = entries.iter().map(|e| Some(e.text.as_str()));
    match themes::build_theme_cloud(texts, config) {
        Some(cloud) => ThemeView::Cloud(cloud),
        None => ThemeView::NoData,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{self, NewUser};
    use crate::completion::CompletionError;
    use crate::scoring::testing::ScriptedEndpoint;
    use crate::scoring::ScoringError;
    use chrono::{NaiveDate, Utc};

    fn setup() -> (JournalStore, UserProfile) {
        let store = JournalStore::open_in_memory().unwrap();
        let user = auth::sign_up(
            &store,
            NewUser {
                username: "ada".to_string(),
                password: "pw".to_string(),
                name: "Ada".to_string(),
                dob: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
                height_cm: 170,
                weight_kg: 65,
            },
        )
        .unwrap();
        (store, user)
    }

    #[test]
    fn test_submit_persists_scored_entry() {
        let (store, user) = setup();
        let endpoint = ScriptedEndpoint::new()
            .reply("7")
            .reply("4")
            .reply("3")
            .reply("Summary of Emotions: Reflective");
        let analyzer = Analyzer::new(Box::new(endpoint.clone()), "m");
        let ctx = RequestContext::new(&store, user).with_analyzer(&analyzer);

        let before = Utc::now();
        let submission = submit(&ctx, "Finished the garden fence.").unwrap();
        assert_eq!(submission.report, "Summary of Emotions: Reflective");
        assert_eq!(endpoint.calls(), 4);

        let listed = history(&ctx, Horizon::OneDay).unwrap();
        assert_eq!(listed.len(), 1);
        let entry = &listed[0];
        assert_eq!(entry.text, "Finished the garden fence.");
        assert_eq!(
            (entry.scores.reflection.get(), entry.scores.stress.get(), entry.scores.anxiety.get()),
            (7, 4, 3)
        );
        assert!(entry.created_at >= before);
        assert_eq!(entry, &submission.entry);
    }

    #[test]
    fn test_upstream_failure_writes_nothing() {
        let (store, user) = setup();
        let endpoint = ScriptedEndpoint::new()
            .reply("7")
            .fail(CompletionError::Unreachable {
                url: "http://localhost".to_string(),
                message: "connection refused".to_string(),
            });
        let analyzer = Analyzer::new(Box::new(endpoint), "m");
        let ctx = RequestContext::new(&store, user).with_analyzer(&analyzer);

        let err = submit(&ctx, "anything").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScoringError>(),
            Some(ScoringError::Upstream(CompletionError::Unreachable { .. }))
        ));
        assert_eq!(store.count_entries("ada").unwrap(), 0);
    }

    #[test]
    fn test_report_failure_writes_nothing() {
        let (store, user) = setup();
        let endpoint = ScriptedEndpoint::new()
            .reply("7")
            .reply("4")
            .reply("3")
            .fail(CompletionError::RateLimited);
        let analyzer = Analyzer::new(Box::new(endpoint), "m");
        let ctx = RequestContext::new(&store, user).with_analyzer(&analyzer);

        assert!(submit(&ctx, "anything").is_err());
        assert_eq!(store.count_entries("ada").unwrap(), 0);
    }

    #[test]
    fn test_parse_failure_writes_nothing() {
        let (store, user) = setup();
        let endpoint = ScriptedEndpoint::new().reply("Seven out of ten!");
        let analyzer = Analyzer::new(Box::new(endpoint), "m");
        let ctx = RequestContext::new(&store, user).with_analyzer(&analyzer);

        let err = submit(&ctx, "anything").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScoringError>(),
            Some(ScoringError::ScoreParse { .. })
        ));
        assert_eq!(store.count_entries("ada").unwrap(), 0);
    }

    #[test]
    fn test_submit_without_analyzer_fails() {
        let (store, user) = setup();
        let ctx = RequestContext::new(&store, user);
        assert!(submit(&ctx, "hello").is_err());
        assert_eq!(store.count_entries("ada").unwrap(), 0);
    }

    #[test]
    fn test_themes_without_entries_is_no_data() {
        let (store, user) = setup();
        let ctx = RequestContext::new(&store, user);

        let view = themes(&ctx, Horizon::OneMonth, &ThemesConfig::default()).unwrap();
        assert!(matches!(view, ThemeView::NoData));
    }

    #[test]
    fn test_themes_for_recent_entries() {
        let (store, user) = setup();
        let endpoint = ScriptedEndpoint::new()
            .reply("6")
            .reply("6")
            .reply("6")
            .reply("ok");
        let analyzer = Analyzer::new(Box::new(endpoint), "m");
        let ctx = RequestContext::new(&store, user).with_analyzer(&analyzer);
        submit(&ctx, "Deadline stress, deadline again, then yoga.").unwrap();

        match themes(&ctx, Horizon::OneWeek, &ThemesConfig::default()).unwrap() {
            ThemeView::Cloud(cloud) => {
                assert_eq!(cloud.frequencies()[0], ("deadline".to_string(), 1.0));
            }
            ThemeView::NoData => panic!("expected a cloud"),
        }
    }
}
