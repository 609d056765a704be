mod config;
mod diagnostics;
mod fixer;
mod gate;
mod llm;
mod report;

use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, info_span, Instrument};
use tracing_subscriber::EnvFilter;

/// tsc-fixer: runs the TypeScript compiler, asks a language model to patch
/// each file with type errors, and keeps only small, verified patches.
#[derive(Parser, Debug)]
#[command(name = "tsc-fixer", version, about)]
struct Cli {
    /// Maximum fix attempts (default 3, or `fixer.max_retries` in .tsc-fixer.toml)
    #[arg(long)]
    max_retries: Option<u32>,

    /// tsconfig passed to `tsc -p` (default tsconfig.json)
    #[arg(long)]
    tsconfig: Option<PathBuf>,

    /// Text-generation provider
    #[arg(long, value_enum)]
    provider: Option<llm::Provider>,

    /// Model override for the selected provider
    #[arg(long)]
    model: Option<String>,

    /// Optional output file path for a markdown summary (pull-request body)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Optional output file path for a JSON summary
    #[arg(long)]
    json: Option<PathBuf>,

    /// Run the loop without writing any file
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let settings = config::Config::load()?.resolve(config::Overrides {
        max_retries: cli.max_retries,
        tsconfig_path: cli.tsconfig,
        provider: cli.provider,
        model: cli.model,
    })?;
    debug!(?settings, "resolved settings");

    let span = info_span!(
        "tsc_fix",
        provider = %settings.provider,
        tsconfig = %settings.tsconfig_path.display(),
        dry_run = cli.dry_run
    );

    info!(retries = settings.max_retries, "running fix loop");
    let summary = fixer::run_fix_loop(
        settings.max_retries,
        &settings.tsconfig_path,
        settings.provider,
        settings.credentials,
        cli.dry_run,
    )
    .instrument(span)
    .await?;
    info!(
        errors_before = summary.errors_before,
        errors_after = summary.errors_after,
        files_fixed = summary.files_fixed.len(),
        "fix loop finished"
    );

    report::output(&summary, cli.output.as_deref(), cli.json.as_deref())?;

    if summary.files_fixed.is_empty() && summary.errors_before > 0 {
        return Err(format!(
            "{} TypeScript error(s) could not be fixed",
            summary.errors_before
        )
        .into());
    }
    if !summary.fully_resolved {
        return Err(format!(
            "{} TypeScript error(s) remain after {} attempts",
            summary.errors_after, settings.max_retries
        )
        .into());
    }

    info!(state = %summary.state(), "done");
    Ok(())
}
