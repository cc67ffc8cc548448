//! Core data models for nutqa
//!
//! These models are used throughout the codebase for representing
//! shell sources, extracted functions, detector verdicts, and findings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Generate a deterministic finding ID based on content hash.
///
/// This ensures findings have stable IDs across runs, enabling:
/// - Tracking findings over time (fixed vs new vs recurring)
/// - Reliable deduplication
///
/// The ID is a 16-character hex string derived from hashing:
/// - detector name (which detector found it)
/// - file path (where it was found)
/// - line number (specific location)
/// - title (what the issue is)
pub fn deterministic_finding_id(detector: &str, file: &str, line: u32, title: &str) -> String {
    // MD5 for stable cross-version hashing; DefaultHasher is intentionally
    // not stable across Rust/compiler versions.
    let input = format!("{detector}\n{file}\n{line}\n{title}");
    let digest = md5::compute(input.as_bytes());
    format!("{:x}", digest)[..16].to_string()
}

/// Severity levels for findings
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// A QA issue finding
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Finding {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub detector: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub affected_files: Vec<PathBuf>,
    #[serde(default)]
    pub line_start: Option<u32>,
    #[serde(default)]
    pub line_end: Option<u32>,
    #[serde(default)]
    pub suggested_fix: Option<String>,
}

/// Summary of findings by severity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindingsSummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
    pub total: usize,
}

impl FindingsSummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = Self::default();
        for f in findings {
            match f.severity {
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
                Severity::Info => summary.info += 1,
            }
            summary.total += 1;
        }
        summary
    }
}

/// A shell source file, read fully into memory for one analysis run.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path relative to the scan root
    pub path: PathBuf,
    pub lines: Vec<String>,
}

/// A shell function extracted from a source file.
///
/// Nested function definitions are not tracked separately; their text is
/// attributed to the enclosing record's body.
#[derive(Debug, Clone)]
pub struct FunctionRecord {
    pub name: String,
    pub file: PathBuf,
    /// Index of the owning file in the scanned corpus
    pub file_idx: usize,
    /// 1-based, inclusive
    pub start_line: usize,
    /// 1-based, inclusive
    pub end_line: usize,
    /// Raw body lines between the opening and matching closing brace
    pub body: Vec<String>,
    /// Body lines after filtering blanks, comments, declaration-only
    /// statements, bare returns, and the lone closing brace
    pub meaningful_body: Vec<String>,
}

/// The complete extracted corpus for one run. Built after all per-file
/// extraction has finished; detectors never see a partial corpus.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub files: Vec<SourceFile>,
    pub records: Vec<FunctionRecord>,
    /// Parallel to `records`
    pub metrics: Vec<FunctionMetrics>,
}

/// Per-function metrics derived from a record and the corpus.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FunctionMetrics {
    pub meaningful_line_count: usize,
    /// Distinct variable references in the meaningful body
    pub variable_count: usize,
    /// Whitespace-run count across the meaningful body (complexity proxy)
    pub token_count: usize,
    /// Whole-word uses of the name in its own file, minus the definition
    pub local_usage_count: usize,
    /// Whole-word uses of the name across the corpus, minus the definition
    pub global_usage_count: usize,
}

/// Which name form a similarity pair was matched on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMode {
    FullName,
    StrippedName,
}

impl std::fmt::Display for SimilarityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimilarityMode::FullName => write!(f, "full-name"),
            SimilarityMode::StrippedName => write!(f, "stripped-name"),
        }
    }
}

/// Verdict for a similarity pair. Non-matching pairs are never materialized,
/// so there is no Pass variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairVerdict {
    Warn,
    Fail,
}

/// One endpoint of a similarity pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairSide {
    pub name: String,
    pub file: PathBuf,
    pub line: usize,
}

/// An unordered pair of similarly-named functions from different files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityPair {
    pub mode: SimilarityMode,
    /// Normalized similarity in [0, 1]; 1.0 = identical
    pub score: f64,
    pub verdict: PairVerdict,
    pub a: PairSide,
    pub b: PairSide,
}

/// Trivial-wrapper classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapperStatus {
    Pass,
    Warn,
    Fail,
}

/// The first rule that decided a wrapper verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapperReason {
    NotTrivial,
    Annotated,
    LocalUsage,
    GlobalUsage,
    ErgonomicVars,
    Complex,
    TokenWarn,
    TokenFail,
}

impl WrapperReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            WrapperReason::NotTrivial => "not_trivial",
            WrapperReason::Annotated => "annotated",
            WrapperReason::LocalUsage => "local_usage",
            WrapperReason::GlobalUsage => "global_usage",
            WrapperReason::ErgonomicVars => "ergonomic_vars",
            WrapperReason::Complex => "complex",
            WrapperReason::TokenWarn => "token_warn",
            WrapperReason::TokenFail => "token_fail",
        }
    }
}

/// Per-function trivial-wrapper verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrapperVerdict {
    pub name: String,
    pub file: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
    pub status: WrapperStatus,
    pub reason: WrapperReason,
    pub metrics: FunctionMetrics,
}

/// Aggregate verdict-bucket counts for a run
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct VerdictCounts {
    pub duplicate_fail: usize,
    pub duplicate_warn: usize,
    pub wrapper_fail: usize,
    pub wrapper_warn: usize,
    pub wrapper_pass: usize,
}

/// Full report for one QA run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaReport {
    pub findings: Vec<Finding>,
    pub findings_summary: FindingsSummary,
    /// Similarity pairs, as produced by the duplicate detector
    pub pairs: Vec<SimilarityPair>,
    /// Warn/Fail wrapper verdicts; Pass verdicts are counted but not listed
    pub wrappers: Vec<WrapperVerdict>,
    pub counts: VerdictCounts,
    pub total_files: usize,
    pub total_functions: usize,
    pub comparisons_made: usize,
    /// True iff any full-name FAIL pair or any wrapper Fail verdict exists
    pub should_fail: bool,
}
