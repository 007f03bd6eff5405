//! Themes command implementation

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::ThemesConfig;
use crate::history::Horizon;
use crate::journal::{self, RequestContext, ThemeView};

pub fn run(
    ctx: &RequestContext<'_>,
    horizon: Horizon,
    config: &ThemesConfig,
    out: &Path,
) -> Result<()> {
    let cloud = match journal::themes(ctx, horizon, config)? {
        ThemeView::Cloud(cloud) => cloud,
        ThemeView::NoData => {
            println!("No recurring themes yet for the last {}. Write a few entries first.", horizon);
            return Ok(());
        }
    };

    std::fs::write(out, cloud.to_svg())
        .with_context(|| format!("Failed to write {}", out.display()))?;

    println!("Recurring themes (last {}):", horizon);
    for (word, weight) in cloud.frequencies().iter().take(10) {
        println!("  {:<20} {:.2}", word, weight);
    }
    println!("\nWord cloud written to {}", out.display());
    Ok(())
}
