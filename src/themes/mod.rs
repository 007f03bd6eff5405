//! Recurring themes as a word cloud
//!
//! An empty corpus has no cloud: [`build_theme_cloud`] returns `None` and
//! callers show a "no data" state instead of rendering.

mod layout;
mod stopwords;

pub use layout::PlacedWord;

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use crate::config::ThemesConfig;

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w[\w']+").expect("static regex"))
}

/// A laid-out word cloud
#[derive(Debug, Clone)]
pub struct ThemeCloud {
    width: u32,
    height: u32,
    frequencies: Vec<(String, f64)>,
    words: Vec<PlacedWord>,
}

impl ThemeCloud {
    /// Words with frequencies normalised to the most common one, descending
    pub fn frequencies(&self) -> &[(String, f64)] {
        &self.frequencies
    }

    pub fn words(&self) -> &[PlacedWord] {
        &self.words
    }

    pub fn to_svg(&self) -> String {
        layout::render_svg(&self.words, self.width, self.height)
    }
}

fn count_words<'a>(
    texts: impl IntoIterator<Item = Option<&'a str>>,
    stopwords: &HashSet<String>,
) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for text in texts.into_iter().flatten() {
        let lowered = text.to_lowercase();
        for m in word_pattern().find_iter(&lowered) {
            let token = m.as_str();
            if stopwords.contains(token) {
                continue;
            }
            let word = token.strip_suffix("'s").unwrap_or(token).trim_end_matches('\'');
            if word.chars().count() < 2
                || word.chars().all(|c| c.is_numeric())
                || stopwords.contains(word)
            {
                continue;
            }
            *counts.entry(word.to_string()).or_insert(0) += 1;
        }
    }

    merge_plurals(counts)
}

/// Fold "meetings" into "meeting" when both occur
fn merge_plurals(counts: HashMap<String, usize>) -> HashMap<String, usize> {
    let mut merged: HashMap<String, usize> = HashMap::with_capacity(counts.len());
    for (word, count) in &counts {
        let singular = word
            .strip_suffix('s')
            .filter(|s| !word.ends_with("ss") && counts.contains_key(*s));
        let key = singular.unwrap_or(word.as_str());
        *merged.entry(key.to_string()).or_insert(0) += count;
    }
    merged
}

/// The `max_words` most frequent words, normalised so the top word is 1.0.
/// Ties are broken alphabetically.
pub fn word_frequencies<'a>(
    texts: impl IntoIterator<Item = Option<&'a str>>,
    config: &ThemesConfig,
) -> Vec<(String, f64)> {
    let stopwords = stopwords::build(&config.extra_stopwords);
    let mut counts: Vec<(String, usize)> = count_words(texts, &stopwords).into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts.truncate(config.max_words);

    let top = match counts.first() {
        Some((_, n)) => *n as f64,
        None => return Vec::new(),
    };
    counts
        .into_iter()
        .map(|(word, n)| (word, n as f64 / top))
        .collect()
}

/// Build the cloud for a set of entry texts. `None` when no words survive
/// stopword filtering.
pub fn build_theme_cloud<'a>(
    texts: impl IntoIterator<Item = Option<&'a str>>,
    config: &ThemesConfig,
) -> Option<ThemeCloud> {
    let frequencies = word_frequencies(texts, config);
    if frequencies.is_empty() {
        return None;
    }

    let words = layout::place_words(&frequencies, config.width, config.height);
    tracing::debug!(
        distinct = frequencies.len(),
        placed = words.len(),
        "built theme cloud"
    );

    Some(ThemeCloud {
        width: config.width,
        height: config.height,
        frequencies,
        words,
    })
}
