use regex::Regex;
use std::sync::LazyLock;

use crate::diagnostics::Diagnostic;

/// First fenced block: an opening fence with an optional tag, then lazily
/// everything up to a closing fence that sits alone on its own line.
/// Backticks inside a code line (markdown in a string literal) never close it.
static CODE_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[^\n`]*\n(.*?)\n[ ]{0,3}```[ \t]*(?:\r?\n|$)")
        .expect("CODE_FENCE_RE regex should compile")
});

/// Prefix every line with its 1-based number, right-aligned to 4 columns.
pub fn add_line_numbers(content: &str) -> String {
    content
        .split('\n')
        .enumerate()
        .map(|(i, line)| format!("{:>4} | {}", i + 1, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the patch instruction for one file and its current errors.
pub fn build_instruction(file_path: &str, file_content: &str, errors: &[Diagnostic]) -> String {
    let numbered = add_line_numbers(file_content);
    let error_list = errors
        .iter()
        .map(|e| format!("- Line {}, Col {}: {} — {}", e.line, e.col, e.code, e.message))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a TypeScript expert. Fix ONLY the type errors listed below. Do NOT refactor, rename variables, change logic, add features, or modify anything unrelated to the listed errors.

## File: {file_path}

```typescript
{numbered}
```

## TypeScript Errors to Fix

{error_list}

## Instructions

1. Fix ONLY the listed type errors — nothing else.
2. Keep all existing imports, exports, variable names, and logic exactly as they are.
3. If a fix requires adding an import, add only what is strictly necessary.
4. Return the COMPLETE corrected file inside a single fenced code block.
5. Do NOT include line numbers in your output.
6. Do NOT add comments explaining the changes."#
    )
}

/// Extract the body of the first fenced code block, trailing whitespace trimmed.
///
/// The opening fence's language tag is ignored. Later blocks are never used.
pub fn extract_code_block(response: &str) -> Option<String> {
    CODE_FENCE_RE
        .captures(response)
        .map(|caps| caps[1].trim_end().to_string())
}
