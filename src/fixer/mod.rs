pub mod prompt;
pub mod store;
pub mod types;

pub use store::{DryRunStore, FileStore, FsStore};
pub use types::{FixSummary, LoopState, PatchCandidate};

use std::path::Path;
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::diagnostics::{
    group_by_file, parse_diagnostics, Diagnostic, DiagnosticError, DiagnosticRunner, FileErrors,
    TscRunner,
};
use crate::gate::{admit, diff_line_count, GateDecision, RejectReason};
use crate::llm::{build_generator, Credentials, LlmError, Provider, TextGenerator};

#[derive(Debug, Error)]
pub enum FixError {
    #[error("Diagnostic pass failed: {0}")]
    Diagnostics(#[from] DiagnosticError),
}

/// Why no patch was applied to a file during one attempt.
/// The file keeps its errors and is retried on the next attempt.
#[derive(Debug, Error)]
pub enum PatchSkip {
    #[error("could not read file: {0}")]
    Read(#[source] std::io::Error),

    #[error("LLM call failed: {0}")]
    Generation(#[from] LlmError),

    #[error("could not extract code from LLM response")]
    NoCodeBlock,

    #[error("{0}")]
    Rejected(RejectReason),
}

/// Applied patches accumulated across attempts.
#[derive(Debug, Default)]
struct Progress {
    files_fixed: Vec<String>,
    results: Vec<PatchCandidate>,
}

impl Progress {
    fn record(&mut self, candidate: PatchCandidate) {
        if !self.files_fixed.contains(&candidate.file) {
            self.files_fixed.push(candidate.file.clone());
        }
        self.results.push(candidate);
    }

    fn resolved(self, errors_before: usize) -> FixSummary {
        self.finish(errors_before, 0, true)
    }

    /// Attempts ran out; the run counts as unresolved whatever the last pass reports.
    fn exhausted(self, errors_before: usize, errors_after: usize) -> FixSummary {
        self.finish(errors_before, errors_after, false)
    }

    fn finish(self, errors_before: usize, errors_after: usize, fully_resolved: bool) -> FixSummary {
        FixSummary {
            errors_before,
            errors_after,
            files_fixed: self.files_fixed,
            results: self.results,
            fully_resolved,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptOutcome {
    AlreadyClean,
    Processed,
}

/// Drives the check → patch → gate → apply loop over injected collaborators.
pub struct Fixer<'a> {
    runner: &'a dyn DiagnosticRunner,
    generator: &'a dyn TextGenerator,
    store: &'a dyn FileStore,
}

impl<'a> Fixer<'a> {
    pub fn new(
        runner: &'a dyn DiagnosticRunner,
        generator: &'a dyn TextGenerator,
        store: &'a dyn FileStore,
    ) -> Self {
        Self {
            runner,
            generator,
            store,
        }
    }

    /// Run up to `max_attempts` fix attempts.
    ///
    /// Ends early as soon as any diagnostic pass reports zero errors. When the
    /// attempts run out, one more pass measures what is left. Only a failure to
    /// run the diagnostic pass is returned as an error; per-file problems are
    /// logged and the file is retried on the next attempt.
    pub async fn run(&self, max_attempts: u32) -> Result<FixSummary, FixError> {
        let errors_before = self.check().await?.len();
        info!(errors = errors_before, "found TypeScript error(s)");

        if errors_before == 0 {
            return Ok(FixSummary::clean());
        }

        let mut progress = Progress::default();

        for attempt in 1..=max_attempts {
            let span = info_span!("fix_attempt", attempt, max_attempts);
            let outcome = self.attempt(attempt, &mut progress).instrument(span).await?;
            if outcome == AttemptOutcome::AlreadyClean {
                return Ok(progress.resolved(errors_before));
            }

            let remaining = self.check().await?.len();
            if remaining == 0 {
                info!(attempts = attempt, "all errors fixed");
                return Ok(progress.resolved(errors_before));
            }
            debug!(attempt, remaining, "errors remain after attempt");
        }

        let remaining = self.check().await?.len();
        warn!(remaining, attempts = max_attempts, "error(s) remain after all attempts");
        Ok(progress.exhausted(errors_before, remaining))
    }

    async fn check(&self) -> Result<Vec<Diagnostic>, FixError> {
        let run = self.runner.run().await?;
        let diagnostics = parse_diagnostics(&run.output);
        debug!(exit_code = ?run.exit_code, errors = diagnostics.len(), "diagnostic pass");
        Ok(diagnostics)
    }

    async fn attempt(
        &self,
        attempt: u32,
        progress: &mut Progress,
    ) -> Result<AttemptOutcome, FixError> {
        let errors = self.check().await?;
        if errors.is_empty() {
            info!("all errors resolved");
            return Ok(AttemptOutcome::AlreadyClean);
        }

        let groups = group_by_file(&errors);
        info!(
            attempt,
            errors = errors.len(),
            files = groups.len(),
            "error(s) remaining"
        );

        for group in &groups {
            match self.propose_patch(group).await {
                Ok(candidate) => self.apply(candidate, progress).await,
                Err(skip) => log_skip(&group.file, &skip),
            }
        }

        Ok(AttemptOutcome::Processed)
    }

    /// Ask the generator for a new body for one file and run it through the gate.
    async fn propose_patch(&self, group: &FileErrors) -> Result<PatchCandidate, PatchSkip> {
        let original = self.store.read(&group.file).await.map_err(PatchSkip::Read)?;
        let instruction = prompt::build_instruction(&group.file, &original, &group.errors);

        let response = self.generator.generate(&instruction).await?;
        debug!(file = %group.file, model = %response.model, "received patch response");

        let extracted = prompt::extract_code_block(&response.content)
            .filter(|body| !body.is_empty())
            .ok_or(PatchSkip::NoCodeBlock)?;
        let proposed = restore_trailing_newline(&original, extracted);

        match admit(&original, &proposed) {
            GateDecision::Rejected(reason) => Err(PatchSkip::Rejected(reason)),
            GateDecision::Accepted { diff_percentage } => {
                debug!(file = %group.file, diff_percentage, "patch admitted");
                Ok(PatchCandidate {
                    file: group.file.clone(),
                    original,
                    proposed,
                    errors_targeted: group.errors.len(),
                })
            }
        }
    }

    async fn apply(&self, candidate: PatchCandidate, progress: &mut Progress) {
        if let Err(e) = self.store.write(&candidate.file, &candidate.proposed).await {
            error!(file = %candidate.file, error = %e, "failed to write fix");
            return;
        }
        info!(
            file = %candidate.file,
            errors_targeted = candidate.errors_targeted,
            changed_lines = diff_line_count(&candidate.original, &candidate.proposed),
            "applied fix"
        );
        progress.record(candidate);
    }
}

/// Extracted bodies lose their final newline; give it back when the original had one.
fn restore_trailing_newline(original: &str, mut proposed: String) -> String {
    if original.ends_with('\n') && !proposed.ends_with('\n') {
        proposed.push('\n');
    }
    proposed
}

fn log_skip(file: &str, skip: &PatchSkip) {
    match skip {
        PatchSkip::Generation(_) | PatchSkip::Read(_) => {
            error!(file = %file, reason = %skip, "skipping file")
        }
        PatchSkip::Rejected(RejectReason::NoChange) => {
            info!(file = %file, "no changes needed")
        }
        PatchSkip::NoCodeBlock | PatchSkip::Rejected(_) => {
            warn!(file = %file, reason = %skip, "skipping file")
        }
    }
}

/// Run the fix loop against the real type checker, the selected provider and
/// the working directory.
pub async fn run_fix_loop(
    max_attempts: u32,
    tsconfig_path: &Path,
    provider: Provider,
    credentials: Credentials,
    dry_run: bool,
) -> Result<FixSummary, FixError> {
    let runner = TscRunner::new(tsconfig_path);
    let generator = build_generator(provider, credentials);
    let store: Box<dyn FileStore> = if dry_run {
        Box::new(DryRunStore::new(FsStore::new(".")))
    } else {
        Box::new(FsStore::new("."))
    };

    Fixer::new(&runner, &*generator, &*store)
        .run(max_attempts)
        .await
}
