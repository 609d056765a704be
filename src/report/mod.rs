use crate::fixer::{FixSummary, LoopState};
use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),

    #[error("Failed to encode summary as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Print the summary to the terminal and optionally write markdown / JSON copies.
#[instrument(skip(summary), fields(state = %summary.state()))]
pub fn output(
    summary: &FixSummary,
    markdown_path: Option<&Path>,
    json_path: Option<&Path>,
) -> Result<(), ReportError> {
    debug!("writing summary to terminal");
    print_terminal_summary(summary);

    if let Some(path) = markdown_path {
        debug!(path = %path.display(), "writing markdown summary");
        std::fs::write(path, render_markdown(summary))?;
    }
    if let Some(path) = json_path {
        debug!(path = %path.display(), "writing JSON summary");
        std::fs::write(path, serde_json::to_string_pretty(summary)?)?;
    }
    Ok(())
}

/// Format and print the summary to the terminal with colors.
///
/// ═══ TypeScript Fix Summary ═══
/// Errors: 4 → 0
/// • src/a.ts (3 errors targeted)
///
/// ═══ Status: RESOLVED ═══
fn print_terminal_summary(summary: &FixSummary) {
    println!();
    println!("═══ TypeScript Fix Summary ═══");
    println!(
        "Errors: {} → {}",
        summary.errors_before, summary.errors_after
    );
    if summary.results.is_empty() {
        println!("  No fixes applied.");
    } else {
        for result in &summary.results {
            println!(
                "  • {} ({} errors targeted)",
                result.file, result.errors_targeted
            );
        }
    }
    println!();
    println!("═══ Status: {} ═══", colorize_state(summary));
    println!();
}

/// Markdown body for a pull request carrying the fixes.
pub fn render_markdown(summary: &FixSummary) -> String {
    let mut md = String::new();
    md.push_str("## Automated TypeScript error fixes\n\n");
    md.push_str(&format!(
        "**Errors before:** {} | **Errors after:** {} | **Files fixed:** {}\n\n",
        summary.errors_before,
        summary.errors_after,
        summary.files_fixed.len()
    ));

    if !summary.results.is_empty() {
        md.push_str("| File | Errors targeted |\n|---|---|\n");
        for result in &summary.results {
            md.push_str(&format!("| `{}` | {} |\n", result.file, result.errors_targeted));
        }
        md.push('\n');
    }

    if summary.fully_resolved {
        md.push_str("All type errors are resolved.\n");
    } else {
        md.push_str(&format!(
            "⚠️ {} error(s) remain and need manual attention.\n",
            summary.errors_after
        ));
    }

    md.push_str(
        "\nEach fix was limited to the reported errors and rejected if it changed more than half of a file. Please review before merging.\n",
    );
    md
}

fn colorize_state(summary: &FixSummary) -> colored::ColoredString {
    match summary.state() {
        LoopState::Resolved => "RESOLVED".green().bold(),
        LoopState::Exhausted => "EXHAUSTED".red().bold(),
    }
}
