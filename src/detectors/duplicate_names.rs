//! Duplicate function-name detector
//!
//! Fuzzy-matches every pair of extracted function names across the corpus in
//! two independent passes:
//!
//! 1. **Full-name pass** — WARN at `similarity_threshold`, FAIL at
//!    `full_fail_threshold`.
//! 2. **Stripped-name pass** — names with their module prefix removed
//!    (`git_check_valid` → `check_valid`); warn-only, because suffix idioms
//!    like `*_init` and `*_debug` are expected to collide across modules and
//!    must not break a build.
//!
//! Pairs defined in the same file are never compared; same-file
//! near-duplicates are an intentional pattern. The corpus comparison is
//! O(n²·L²) without the length-ratio prune, so the prune runs before every
//! distance computation and the outer index range is partitioned across
//! rayon workers, each owning a private result buffer.

use crate::config::Thresholds;
use crate::detectors::similarity::{
    passes_length_prune, similarity, strip_module_prefix,
};
use crate::models::{
    deterministic_finding_id, Corpus, Finding, PairSide, PairVerdict, Severity, SimilarityMode,
    SimilarityPair,
};
use anyhow::Result;
use rayon::prelude::*;
use tracing::{debug, info};

/// Outcome of the pairwise comparison passes
#[derive(Debug, Default)]
pub struct DuplicateOutcome {
    pub pairs: Vec<SimilarityPair>,
    /// Number of edit-distance computations actually performed
    pub comparisons: usize,
}

/// One comparison candidate: the name form under comparison plus the record
/// it came from.
struct Candidate<'a> {
    name: &'a str,
    file_idx: usize,
    side: PairSide,
}

pub struct DuplicateNameDetector {
    thresholds: Thresholds,
}

impl DuplicateNameDetector {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn name(&self) -> &'static str {
        "duplicate-names"
    }

    /// Run both comparison passes over the whole corpus.
    pub fn detect(&self, corpus: &Corpus) -> Result<DuplicateOutcome> {
        let t = &self.thresholds;

        let full: Vec<Candidate> = corpus
            .records
            .iter()
            .filter(|r| r.name.chars().count() >= t.min_name_length)
            .map(|r| Candidate {
                name: r.name.as_str(),
                file_idx: r.file_idx,
                side: PairSide {
                    name: r.name.clone(),
                    file: r.file.clone(),
                    line: r.start_line,
                },
            })
            .collect();

        let stripped: Vec<Candidate> = corpus
            .records
            .iter()
            .filter_map(|r| {
                let name = strip_module_prefix(&r.name);
                if name.chars().count() < t.min_name_length {
                    return None;
                }
                Some(Candidate {
                    name,
                    file_idx: r.file_idx,
                    side: PairSide {
                        name: r.name.clone(),
                        file: r.file.clone(),
                        line: r.start_line,
                    },
                })
            })
            .collect();

        let (mut pairs, full_comparisons) = compare_pass(
            &full,
            SimilarityMode::FullName,
            t.similarity_threshold,
            Some(t.full_fail_threshold),
        );
        let (stripped_pairs, stripped_comparisons) = compare_pass(
            &stripped,
            SimilarityMode::StrippedName,
            t.strip_warn_threshold,
            None,
        );
        pairs.extend(stripped_pairs);

        // Deterministic output order: mode, then location
        pairs.sort_by(|x, y| {
            (x.mode as u8, &x.a.file, x.a.line, &x.b.file, x.b.line).cmp(&(
                y.mode as u8,
                &y.a.file,
                y.a.line,
                &y.b.file,
                y.b.line,
            ))
        });

        let comparisons = full_comparisons + stripped_comparisons;
        info!(
            "{}: {} pairs flagged from {} distance computations",
            self.name(),
            pairs.len(),
            comparisons
        );
        Ok(DuplicateOutcome { pairs, comparisons })
    }

    /// Render pairs as report findings.
    pub fn findings(&self, pairs: &[SimilarityPair]) -> Vec<Finding> {
        pairs
            .iter()
            .map(|pair| {
                let severity = match pair.verdict {
                    PairVerdict::Fail => Severity::High,
                    PairVerdict::Warn => Severity::Medium,
                };
                let title = format!(
                    "Near-duplicate function names `{}` / `{}`",
                    pair.a.name, pair.b.name
                );
                let description = match pair.mode {
                    SimilarityMode::FullName => format!(
                        "`{}` ({}:{}) and `{}` ({}:{}) have {:.0}% similar names.",
                        pair.a.name,
                        pair.a.file.display(),
                        pair.a.line,
                        pair.b.name,
                        pair.b.file.display(),
                        pair.b.line,
                        pair.score * 100.0
                    ),
                    SimilarityMode::StrippedName => format!(
                        "`{}` ({}:{}) and `{}` ({}:{}) have {:.0}% similar names \
                         once their module prefixes are stripped.",
                        pair.a.name,
                        pair.a.file.display(),
                        pair.a.line,
                        pair.b.name,
                        pair.b.file.display(),
                        pair.b.line,
                        pair.score * 100.0
                    ),
                };
                Finding {
                    id: deterministic_finding_id(
                        self.name(),
                        &pair.a.file.to_string_lossy(),
                        pair.a.line as u32,
                        &title,
                    ),
                    detector: self.name().to_string(),
                    severity,
                    title,
                    description,
                    affected_files: vec![pair.a.file.clone(), pair.b.file.clone()],
                    line_start: Some(pair.a.line as u32),
                    line_end: None,
                    suggested_fix: Some(
                        "Merge the implementations or rename one to state its distinct purpose."
                            .to_string(),
                    ),
                }
            })
            .collect()
    }
}

/// One pairwise comparison pass. `fail_threshold` is `None` for warn-only
/// passes. Returns flagged pairs plus the number of distance computations.
fn compare_pass(
    candidates: &[Candidate],
    mode: SimilarityMode,
    warn_threshold: f64,
    fail_threshold: Option<f64>,
) -> (Vec<SimilarityPair>, usize) {
    let (pairs, comparisons) = (0..candidates.len())
        .into_par_iter()
        .map(|i| {
            // Private per-worker buffer, merged in the reduction
            let mut local_pairs = Vec::new();
            let mut local_comparisons = 0usize;
            let a = &candidates[i];

            for b in &candidates[i + 1..] {
                if a.file_idx == b.file_idx {
                    continue;
                }
                // The warn tier is the lowest score that can matter here
                if !passes_length_prune(a.name, b.name, warn_threshold) {
                    continue;
                }

                local_comparisons += 1;
                let score = similarity(a.name, b.name);
                if score < warn_threshold {
                    continue;
                }

                let verdict = match fail_threshold {
                    Some(fail) if score >= fail => PairVerdict::Fail,
                    _ => PairVerdict::Warn,
                };

                // Order endpoints by location for stable output
                let (first, second) = if (&a.side.file, a.side.line) <= (&b.side.file, b.side.line)
                {
                    (a.side.clone(), b.side.clone())
                } else {
                    (b.side.clone(), a.side.clone())
                };
                local_pairs.push(SimilarityPair {
                    mode,
                    score,
                    verdict,
                    a: first,
                    b: second,
                });
            }

            (local_pairs, local_comparisons)
        })
        .reduce(
            || (Vec::new(), 0),
            |(mut acc_pairs, acc_count), (pairs, count)| {
                acc_pairs.extend(pairs);
                (acc_pairs, acc_count + count)
            },
        );

    debug!(
        "{} pass: {} pairs from {} comparisons",
        mode, pairs.len(), comparisons
    );
    (pairs, comparisons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FunctionRecord, SourceFile};
    use std::path::PathBuf;

    fn record(name: &str, file: &str, file_idx: usize, line: usize) -> FunctionRecord {
        FunctionRecord {
            name: name.to_string(),
            file: PathBuf::from(file),
            file_idx,
            start_line: line,
            end_line: line + 2,
            body: vec!["\techo hi".to_string()],
            meaningful_body: vec!["\techo hi".to_string()],
        }
    }

    fn corpus(records: Vec<FunctionRecord>) -> Corpus {
        let n_files = records.iter().map(|r| r.file_idx).max().map_or(0, |m| m + 1);
        Corpus {
            files: (0..n_files)
                .map(|i| SourceFile {
                    path: PathBuf::from(format!("f{i}.sh")),
                    lines: Vec::new(),
                })
                .collect(),
            metrics: vec![Default::default(); records.len()],
            records,
        }
    }

    fn detector() -> DuplicateNameDetector {
        DuplicateNameDetector::new(Thresholds::default())
    }

    #[test]
    fn test_near_duplicate_warns_but_does_not_fail() {
        let corpus = corpus(vec![
            record("is_valid_user", "a.sh", 0, 1),
            record("is_valid_usern", "b.sh", 1, 1),
        ]);
        let outcome = detector().detect(&corpus).unwrap();

        let full: Vec<_> = outcome
            .pairs
            .iter()
            .filter(|p| p.mode == SimilarityMode::FullName)
            .collect();
        assert_eq!(full.len(), 1);
        assert_eq!(full[0].verdict, PairVerdict::Warn);
        assert!(full[0].score >= 0.85 && full[0].score < 0.95);
    }

    #[test]
    fn test_identical_names_fail() {
        let corpus = corpus(vec![
            record("check_valid", "a.sh", 0, 1),
            record("check_valid", "b.sh", 1, 1),
        ]);
        let outcome = detector().detect(&corpus).unwrap();
        let fail = outcome
            .pairs
            .iter()
            .find(|p| p.mode == SimilarityMode::FullName)
            .unwrap();
        assert_eq!(fail.verdict, PairVerdict::Fail);
        assert_eq!(fail.score, 1.0);
    }

    #[test]
    fn test_same_file_pairs_excluded() {
        let corpus = corpus(vec![
            record("check_valid", "a.sh", 0, 1),
            record("check_valid", "a.sh", 0, 20),
        ]);
        let outcome = detector().detect(&corpus).unwrap();
        assert!(outcome.pairs.is_empty());
    }

    #[test]
    fn test_short_names_excluded() {
        let corpus = corpus(vec![
            record("fix", "a.sh", 0, 1),
            record("foo", "b.sh", 1, 1),
        ]);
        let outcome = detector().detect(&corpus).unwrap();
        assert!(outcome.pairs.is_empty());
        assert_eq!(outcome.comparisons, 0);
    }

    #[test]
    fn test_stripped_pass_never_fails() {
        // Full names are dissimilar, stripped names identical
        let corpus = corpus(vec![
            record("git_check_valid", "a.sh", 0, 1),
            record("docker_check_valid", "b.sh", 1, 1),
        ]);
        let outcome = detector().detect(&corpus).unwrap();

        assert!(outcome
            .pairs
            .iter()
            .all(|p| p.mode != SimilarityMode::FullName));
        let stripped: Vec<_> = outcome
            .pairs
            .iter()
            .filter(|p| p.mode == SimilarityMode::StrippedName)
            .collect();
        assert_eq!(stripped.len(), 1);
        assert_eq!(stripped[0].verdict, PairVerdict::Warn);
        assert_eq!(stripped[0].score, 1.0);
        // Full names are reported even when the stripped form matched
        assert_eq!(stripped[0].a.name, "git_check_valid");
        assert_eq!(stripped[0].b.name, "docker_check_valid");
    }

    #[test]
    fn test_pairs_come_from_different_files() {
        let corpus = corpus(vec![
            record("git_fetch_all", "a.sh", 0, 1),
            record("git_fetch_all", "a.sh", 0, 40),
            record("git_fetch_all", "b.sh", 1, 1),
            record("hub_fetch_all", "c.sh", 2, 1),
        ]);
        let outcome = detector().detect(&corpus).unwrap();
        for pair in &outcome.pairs {
            assert_ne!(pair.a.file, pair.b.file);
        }
    }

    #[test]
    fn test_dissimilar_names_not_materialized() {
        let corpus = corpus(vec![
            record("download_file", "a.sh", 0, 1),
            record("parse_headers", "b.sh", 1, 1),
        ]);
        let outcome = detector().detect(&corpus).unwrap();
        assert!(outcome.pairs.is_empty());
    }

    #[test]
    fn test_prune_skips_length_mismatch() {
        // 4 vs 20 chars: the 0.2 length-ratio bound is below both warn
        // tiers, so no DP ever runs
        let corpus = corpus(vec![
            record("abcd", "a.sh", 0, 1),
            record("abcdefghijklmnopqrst", "b.sh", 1, 1),
        ]);
        let outcome = detector().detect(&corpus).unwrap();
        assert!(outcome.pairs.is_empty());
        assert_eq!(outcome.comparisons, 0);
    }

    #[test]
    fn test_findings_severity_mapping() {
        let corpus = corpus(vec![
            record("check_valid", "a.sh", 0, 1),
            record("check_valid", "b.sh", 1, 1),
        ]);
        let det = detector();
        let outcome = det.detect(&corpus).unwrap();
        let findings = det.findings(&outcome.pairs);
        assert!(!findings.is_empty());
        let fail_finding = findings
            .iter()
            .find(|f| f.severity == Severity::High)
            .unwrap();
        assert!(fail_finding.title.contains("check_valid"));
        assert_eq!(fail_finding.affected_files.len(), 2);
    }

    #[test]
    fn test_detect_is_idempotent() {
        let corpus = corpus(vec![
            record("is_valid_user", "a.sh", 0, 1),
            record("is_valid_usern", "b.sh", 1, 1),
            record("git_check_valid", "c.sh", 2, 1),
            record("docker_check_valid", "d.sh", 3, 1),
        ]);
        let det = detector();
        let first = det.detect(&corpus).unwrap();
        let second = det.detect(&corpus).unwrap();
        assert_eq!(first.pairs.len(), second.pairs.len());
        assert_eq!(first.comparisons, second.comparisons);
        for (x, y) in first.pairs.iter().zip(second.pairs.iter()) {
            assert_eq!(x.a.name, y.a.name);
            assert_eq!(x.b.name, y.b.name);
            assert_eq!(x.score, y.score);
        }
    }
}
