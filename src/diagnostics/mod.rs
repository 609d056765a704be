pub mod parser;
pub mod types;

pub use parser::{group_by_file, parse_diagnostics};
pub use types::{Diagnostic, FileErrors, RunOutput};

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, instrument};

#[derive(Debug, Error)]
pub enum DiagnosticError {
    #[error("Failed to run type checker `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Runs one diagnostic pass against the project.
///
/// Only the captured text matters to callers; a non-zero exit status is the
/// normal outcome when errors exist and is not itself a failure.
#[async_trait]
pub trait DiagnosticRunner: Send + Sync {
    async fn run(&self) -> Result<RunOutput, DiagnosticError>;
}

/// Runs `npx tsc --noEmit --pretty false -p <config>` in the working directory.
pub struct TscRunner {
    config_path: PathBuf,
}

impl TscRunner {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }
}

#[async_trait]
impl DiagnosticRunner for TscRunner {
    #[instrument(skip(self), fields(config = %self.config_path.display()))]
    async fn run(&self) -> Result<RunOutput, DiagnosticError> {
        info!("running tsc");

        let output = Command::new("npx")
            .args(["tsc", "--noEmit", "--pretty", "false", "-p"])
            .arg(&self.config_path)
            .output()
            .await
            .map_err(|source| DiagnosticError::Spawn {
                command: "npx tsc".to_string(),
                source,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        debug!(exit_code = ?output.status.code(), output_bytes = text.len(), "tsc finished");

        Ok(RunOutput {
            exit_code: output.status.code(),
            output: text,
        })
    }
}
