/// One error reported by the type checker.
/// Built by the parser from a single output line and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// File path exactly as the checker printed it (either separator style)
    pub file: String,
    /// 1-based line number
    pub line: u32,
    /// 1-based column number
    pub col: u32,
    /// Tool-defined error code (e.g., "TS2322")
    pub code: String,
    /// Human-readable message
    pub message: String,
}

/// All diagnostics reported for one file, in the order the checker printed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileErrors {
    pub file: String,
    pub errors: Vec<Diagnostic>,
}

/// Raw result of one diagnostic pass.
/// Only `output` feeds the fix loop; the exit code is kept for logging.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub exit_code: Option<i32>,
    /// stdout followed by stderr
    pub output: String,
}

