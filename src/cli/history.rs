//! History command implementation

use anyhow::Result;

use crate::history::Horizon;
use crate::journal::{self, RequestContext};
use crate::model::{Axis, JournalEntry, Score, MAX_SCORE, MIN_SCORE};

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

fn bar(score: Score) -> char {
    let span = (MAX_SCORE - MIN_SCORE) as usize;
    let step = (score.get() - MIN_SCORE) as usize;
    BARS[(step * (BARS.len() - 1) + span / 2) / span]
}

pub fn sparkline(entries: &[JournalEntry], axis: Axis) -> String {
    entries.iter().map(|e| bar(e.scores.get(axis))).collect()
}

pub fn run(ctx: &RequestContext<'_>, horizon: Horizon) -> Result<()> {
    let entries = journal::history(ctx, horizon)?;

    if entries.is_empty() {
        println!("No journal entries in the last {}. Run 'braindump write' first.", horizon);
        return Ok(());
    }

    println!(
        "{:<17} {:<11} {:<7} {:<8} {}",
        "Timestamp", "Reflection", "Stress", "Anxiety", "Entry"
    );
    println!("{}", "-".repeat(90));

    for entry in &entries {
        let text = entry.text.lines().next().unwrap_or_default();
        let text = if text.chars().count() > 40 {
            format!("{}...", text.chars().take(37).collect::<String>())
        } else {
            text.to_string()
        };

        println!(
            "{:<17} {:<11} {:<7} {:<8} {}",
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.scores.reflection,
            entry.scores.stress,
            entry.scores.anxiety,
            text
        );
    }

    println!();
    for axis in Axis::ALL {
        println!("{:<11} {}", axis.as_str(), sparkline(&entries, axis));
    }

    Ok(())
}
