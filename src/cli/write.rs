//! Write command implementation

use anyhow::{Context, Result};
use std::io::{self, Read, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::journal::{self, RequestContext};

/// Journal text from the argument, a file, or stdin, in that order
pub fn read_text(text: Option<String>, file: Option<&Path>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

pub fn run(ctx: &RequestContext<'_>, text: &str, stream_delay: Duration) -> Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("Nothing to save: the journal entry is empty.");
    }

    println!("Analyzing your entry...\n");
    let submission = match journal::submit(ctx, text) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "submission failed");
            anyhow::bail!("Could not analyze your entry right now; nothing was saved. Please try again.");
        }
    };

    let scores = submission.entry.scores;
    println!(
        "Reflection: {}/10 | Stress: {}/10 | Anxiety: {}/10\n",
        scores.reflection, scores.stress, scores.anxiety
    );

    println!("AI Reflections & Recommendations");
    println!("{}", "-".repeat(40));
    let mut stdout = io::stdout().lock();
    stream_words(&mut stdout, &submission.report, stream_delay)?;
    writeln!(stdout, "\n")?;

    println!("✅ Entry saved ({})", submission.entry.created_at.format("%Y-%m-%d %H:%M"));
    Ok(())
}

/// Print an already complete text a word at a time
pub fn stream_words(out: &mut impl Write, text: &str, delay: Duration) -> io::Result<()> {
    for word in text.split_inclusive(' ') {
        out.write_all(word.as_bytes())?;
        out.flush()?;
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_words_preserves_text() {
        let mut out = Vec::new();
        let report = "Summary of Emotions: Calm\n- Take a walk  daily";
        stream_words(&mut out, report, Duration::ZERO).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), report);
    }

    #[test]
    fn test_read_text_prefers_argument() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entry.txt");
        std::fs::write(&path, "from file").unwrap();

        assert_eq!(read_text(Some("inline".into()), Some(&path)).unwrap(), "inline");
        assert_eq!(read_text(None, Some(&path)).unwrap(), "from file");
        assert!(read_text(None, Some(&dir.path().join("missing.txt"))).is_err());
    }
}
