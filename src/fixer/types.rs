use serde::Serialize;
use std::fmt;

/// A proposed whole-file replacement for one errored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchCandidate {
    /// File path as reported by the type checker
    pub file: String,
    #[serde(skip)]
    pub original: String,
    #[serde(skip)]
    pub proposed: String,
    /// Number of errors the patch was asked to fix
    pub errors_targeted: usize,
}

/// Where the fix loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// A diagnostic pass reported zero errors
    Resolved,
    /// Every attempt ran and errors remain
    Exhausted,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopState::Resolved => write!(f, "RESOLVED"),
            LoopState::Exhausted => write!(f, "EXHAUSTED"),
        }
    }
}

/// Outcome of a complete fix run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixSummary {
    /// Errors reported by the first diagnostic pass
    pub errors_before: usize,
    /// Errors reported by the last diagnostic pass
    pub errors_after: usize,
    /// Distinct files that received at least one applied patch
    pub files_fixed: Vec<String>,
    /// Every applied patch, in application order
    pub results: Vec<PatchCandidate>,
    pub fully_resolved: bool,
}

impl FixSummary {
    /// Summary for a project that was already clean.
    pub fn clean() -> Self {
        Self {
            errors_before: 0,
            errors_after: 0,
            files_fixed: Vec::new(),
            results: Vec::new(),
            fully_resolved: true,
        }
    }

    pub fn state(&self) -> LoopState {
        if self.fully_resolved {
            LoopState::Resolved
        } else {
            LoopState::Exhausted
        }
    }
}
