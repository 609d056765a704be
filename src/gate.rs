//! Change-safety gate for proposed whole-file patches.
//!
//! Divergence is measured position by position: line `i` of the original is
//! compared with line `i` of the proposal. An inserted line therefore shifts
//! every later line and counts them all as changed. That over-counting is
//! accepted; rejecting a good patch costs less than admitting a rewrite.

use std::fmt;

/// Patches changing more than this share of the original's lines are rejected.
pub const MAX_DIFF_PERCENTAGE: f64 = 50.0;

/// Why a proposed body was not admitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectReason {
    /// Proposed body is identical to the original
    NoChange,
    /// Proposed body changes too much of the original
    TooLarge { diff_percentage: f64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NoChange => write!(f, "no changes proposed"),
            RejectReason::TooLarge { diff_percentage } => write!(
                f,
                "diff is {:.1}% (>{}%), likely a hallucinated rewrite",
                diff_percentage, MAX_DIFF_PERCENTAGE
            ),
        }
    }
}

/// Outcome of running a proposal through the gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    Accepted { diff_percentage: f64 },
    Rejected(RejectReason),
}

/// Number of line positions where the two texts differ.
/// A position present in only one text counts as changed.
pub fn diff_line_count(original: &str, proposed: &str) -> usize {
    let original_lines: Vec<&str> = original.split('\n').collect();
    let proposed_lines: Vec<&str> = proposed.split('\n').collect();
    let max_len = original_lines.len().max(proposed_lines.len());

    (0..max_len)
        .filter(|&i| original_lines.get(i) != proposed_lines.get(i))
        .count()
}

/// Changed lines as a percentage of the original's line count.
///
/// Lines are split on `\n` only, so an empty original is one empty line and
/// any non-empty proposal against it scores 100.
pub fn diff_percentage(original: &str, proposed: &str) -> f64 {
    let original_len = original.split('\n').count();
    if original_len == 0 {
        return 0.0;
    }
    diff_line_count(original, proposed) as f64 / original_len as f64 * 100.0
}

/// Decide whether a proposed body may replace the original.
///
/// Identical bodies are rejected first, so `admit(x, x)` always reports
/// `NoChange`. Exactly `MAX_DIFF_PERCENTAGE` is still accepted.
pub fn admit(original: &str, proposed: &str) -> GateDecision {
    if original == proposed {
        return GateDecision::Rejected(RejectReason::NoChange);
    }

    let diff_percentage = diff_percentage(original, proposed);
    if diff_percentage > MAX_DIFF_PERCENTAGE {
        return GateDecision::Rejected(RejectReason::TooLarge { diff_percentage });
    }

    GateDecision::Accepted { diff_percentage }
}
