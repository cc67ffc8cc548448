//! Function extractor
//!
//! Parses a shell source file into [`FunctionRecord`]s using a line-oriented
//! brace-counting heuristic, not a real shell grammar. A definition line at
//! brace depth 0 opens a record; the record closes when the running brace
//! balance returns to 0. Nested function definitions are attributed to the
//! enclosing record's body. Here-documents containing brace characters can
//! desynchronize the counter; this is a known limitation kept on purpose,
//! since the QA thresholds were tuned against this exact extraction behavior.

use crate::models::{FunctionRecord, SourceFile};
use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

static HEADER: OnceLock<Regex> = OnceLock::new();
static BARE_RETURN: OnceLock<Regex> = OnceLock::new();

fn header_regex() -> &'static Regex {
    HEADER.get_or_init(|| {
        Regex::new(r"^\s*(?:function\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*\(\s*\)\s*\{?").unwrap()
    })
}

fn bare_return_regex() -> &'static Regex {
    BARE_RETURN.get_or_init(|| Regex::new(r"^return(\s+(\d+|\$\?))?;?$").unwrap())
}

/// Whether a body line counts toward the meaningful body.
///
/// Filtered out: blanks, `#`-comments, `local`/`readonly`/`export`
/// declarations, bare `return [N]`/`return $?`, and a lone closing brace.
pub fn is_meaningful(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed == "}" {
        return false;
    }
    if let Some(first) = trimmed.split_whitespace().next() {
        if matches!(first, "local" | "readonly" | "export") {
            return false;
        }
    }
    if bare_return_regex().is_match(trimmed) {
        return false;
    }
    true
}

/// In-progress record state while scanning a file
struct Partial {
    name: String,
    start_line: usize,
    /// Record-local brace balance
    balance: i64,
    /// Whether the opening brace has been seen yet
    entered: bool,
    /// 0-based index of the line carrying the opening brace
    brace_line: usize,
    body: Vec<String>,
}

/// Extract every top-level function record from a source file.
///
/// Records with zero meaningful lines are retained; the detectors decide
/// relevance independently. An unclosed record at end-of-file is discarded
/// with a warning.
pub fn extract_functions(file: &SourceFile, file_idx: usize) -> Vec<FunctionRecord> {
    let mut records = Vec::new();
    let mut current: Option<Partial> = None;
    // Brace depth outside any record; definitions only open at depth 0
    let mut outer_depth: i64 = 0;

    for (idx, line) in file.lines.iter().enumerate() {
        let opens = line.matches('{').count() as i64;
        let closes = line.matches('}').count() as i64;

        match current.as_mut() {
            None => {
                if outer_depth == 0 {
                    if let Some(caps) = header_regex().captures(line) {
                        let mut partial = Partial {
                            name: caps[1].to_string(),
                            start_line: idx + 1,
                            balance: opens - closes,
                            entered: opens > 0,
                            brace_line: idx,
                            body: Vec::new(),
                        };
                        if partial.entered && partial.balance <= 0 {
                            // Opened and closed on the definition line
                            records.push(FunctionRecord {
                                name: partial.name,
                                file: file.path.clone(),
                                file_idx,
                                start_line: partial.start_line,
                                end_line: partial.start_line,
                                body: Vec::new(),
                                meaningful_body: Vec::new(),
                            });
                        } else {
                            if !partial.entered {
                                // Still waiting for the opening brace
                                partial.balance = 0;
                            }
                            current = Some(partial);
                        }
                        continue;
                    }
                }
                outer_depth = (outer_depth + opens - closes).max(0);
            }
            Some(partial) => {
                partial.balance += opens - closes;
                if !partial.entered {
                    if partial.balance > 0 {
                        partial.entered = true;
                        partial.brace_line = idx;
                    } else {
                        partial.balance = partial.balance.max(0);
                    }
                    continue;
                }

                if partial.balance <= 0 {
                    // Matching closing brace found on this line
                    if idx > partial.brace_line {
                        partial.body.push(line.clone());
                    }
                    let partial = current.take().unwrap();
                    let meaningful_body: Vec<String> = partial
                        .body
                        .iter()
                        .filter(|l| is_meaningful(l))
                        .cloned()
                        .collect();
                    records.push(FunctionRecord {
                        name: partial.name,
                        file: file.path.clone(),
                        file_idx,
                        start_line: partial.start_line,
                        end_line: idx + 1,
                        body: partial.body,
                        meaningful_body,
                    });
                } else {
                    partial.body.push(line.clone());
                }
            }
        }
    }

    if let Some(partial) = current {
        warn!(
            "{}:{}: function `{}` has no matching closing brace, skipping",
            file.path.display(),
            partial.start_line,
            partial.name
        );
    }

    records
}
