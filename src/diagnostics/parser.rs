use regex::Regex;
use std::sync::LazyLock;

use super::types::{Diagnostic, FileErrors};

/// One checker error line: `<path>(<line>,<col>): error <code>: <message>`.
static ERROR_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+)\((\d+),(\d+)\): error (\S+): (.+)$")
        .expect("ERROR_LINE_RE regex should compile")
});

/// Parse raw type-checker output into diagnostics, in output order.
///
/// Lines that don't match the error grammar (progress text, summaries,
/// continuation lines of multi-line messages) are dropped silently, so this
/// never fails. The path is taken verbatim apart from surrounding whitespace.
pub fn parse_diagnostics(raw_output: &str) -> Vec<Diagnostic> {
    raw_output.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Diagnostic> {
    let caps = ERROR_LINE_RE.captures(line)?;

    let line_no = parse_position(&caps[2])?;
    let col = parse_position(&caps[3])?;

    Some(Diagnostic {
        file: caps[1].trim().to_string(),
        line: line_no,
        col,
        code: caps[4].trim().to_string(),
        message: caps[5].trim().to_string(),
    })
}

/// Positions are 1-based; zero or out-of-range values mean the line is noise.
fn parse_position(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}

/// Group diagnostics by file.
///
/// Files appear in the order they were first reported, and each file keeps
/// its diagnostics in report order.
pub fn group_by_file(diagnostics: &[Diagnostic]) -> Vec<FileErrors> {
    let mut groups: Vec<FileErrors> = Vec::new();

    for diagnostic in diagnostics {
        match groups.iter_mut().find(|g| g.file == diagnostic.file) {
            Some(group) => group.errors.push(diagnostic.clone()),
            None => groups.push(FileErrors {
                file: diagnostic.file.clone(),
                errors: vec![diagnostic.clone()],
            }),
        }
    }

    groups
}
