//! Per-function metric derivation
//!
//! Computes the complexity and usage metrics the trivial-wrapper classifier
//! consumes. Usage counts need the complete corpus, so the calculator is
//! constructed after all extraction has finished.

use crate::models::{FunctionMetrics, FunctionRecord, SourceFile};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

static VARIABLE: OnceLock<Regex> = OnceLock::new();

/// Variable references: `$name`, `${name}`, positional `$1..$9`, and the
/// specials `$@ $* $# $? $$`.
fn variable_regex() -> &'static Regex {
    VARIABLE.get_or_init(|| {
        Regex::new(r"\$\{?([A-Za-z_][A-Za-z0-9_]*|[0-9]|[@*#?$])").unwrap()
    })
}

/// Count maximal whitespace runs in a raw line, including indentation.
///
/// This counts separators, not words. The exact rule is load-bearing: the
/// token-complexity thresholds were tuned against it, so it must not be
/// replaced with a real tokenizer.
fn whitespace_runs(line: &str) -> usize {
    let mut runs = 0;
    let mut in_run = false;
    for ch in line.chars() {
        if ch.is_whitespace() {
            if !in_run {
                runs += 1;
                in_run = true;
            }
        } else {
            in_run = false;
        }
    }
    runs
}

/// Count distinct variable references in the meaningful body, deduplicated
/// by name after stripping the `$`/`{` decoration.
fn count_variables(meaningful_body: &[String]) -> usize {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    for line in meaningful_body {
        for caps in variable_regex().captures_iter(line) {
            seen.insert(caps[1].to_string());
        }
    }
    seen.len()
}

/// Corpus-aware metric calculator.
pub struct MetricCalculator<'a> {
    files: &'a [SourceFile],
}

impl<'a> MetricCalculator<'a> {
    pub fn new(files: &'a [SourceFile]) -> Self {
        Self { files }
    }

    /// Whole-word occurrences of `name` in one file.
    fn count_in_file(word: &Regex, file: &SourceFile) -> usize {
        file.lines
            .iter()
            .map(|line| word.find_iter(line).count())
            .sum()
    }

    /// Compute all metrics for one record.
    pub fn compute(&self, record: &FunctionRecord) -> FunctionMetrics {
        let token_count = record
            .meaningful_body
            .iter()
            .map(|line| whitespace_runs(line))
            .sum();

        // Word-boundary match so `init` never counts inside `reinit`
        let word = Regex::new(&format!(r"\b{}\b", regex::escape(&record.name)))
            .expect("escaped identifier is a valid regex");

        let own_file = &self.files[record.file_idx];
        let local_hits = Self::count_in_file(&word, own_file);
        let global_hits: usize = self
            .files
            .iter()
            .map(|file| Self::count_in_file(&word, file))
            .sum();

        FunctionMetrics {
            meaningful_line_count: record.meaningful_body.len(),
            variable_count: count_variables(&record.meaningful_body),
            token_count,
            // The definition itself accounts for one occurrence
            local_usage_count: local_hits.saturating_sub(1),
            global_usage_count: global_hits.saturating_sub(1),
        }
    }
}
