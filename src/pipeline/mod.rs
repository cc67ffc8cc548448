//! QA analysis pipeline
//!
//! Orchestrates the full run:
//! 1. Scan source files (include globs, exclude rules)
//! 2. Extract function records per file (parallel, no shared state)
//! 3. Compute per-function metrics against the complete corpus
//! 4. Run the duplicate-name and trivial-wrapper detectors
//! 5. Aggregate findings, counts, and the should-fail signal
//!
//! Extraction must fully complete before any corpus-wide pass starts:
//! global usage counts and cross-file similarity both need every record.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::QaConfig;
use crate::detectors::{
    DetectionSummary, DetectorResult, DuplicateNameDetector, TrivialWrapperDetector,
};
use crate::metrics::MetricCalculator;
use crate::models::{
    Corpus, FindingsSummary, PairVerdict, QaReport, SimilarityMode, VerdictCounts, WrapperStatus,
};
use crate::{extractor, scanner};

/// Full analysis pipeline.
pub struct Pipeline {
    config: QaConfig,
    /// Worker threads for the parallel stages (0 = rayon default)
    workers: usize,
}

impl Pipeline {
    /// Create a pipeline, validating thresholds up front. Contradictory
    /// thresholds abort here, before any file is scanned.
    pub fn new(config: QaConfig) -> Result<Self> {
        config
            .thresholds
            .validate()
            .context("invalid [qa.thresholds] configuration")?;
        Ok(Self { config, workers: 0 })
    }

    /// Set the worker thread count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Run the whole pipeline against `root`.
    pub fn run(&self, root: &Path) -> Result<QaReport> {
        if self.workers > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.workers)
                .build()?;
            pool.install(|| self.run_inner(root))
        } else {
            self.run_inner(root)
        }
    }

    fn run_inner(&self, root: &Path) -> Result<QaReport> {
        let start = Instant::now();

        let paths = scanner::scan_paths(root, &self.config.include, &self.config.exclude)?;
        let files = scanner::read_sources(root, &paths);
        debug!("Scanned {} candidate files under {}", files.len(), root.display());

        // Per-file extraction is embarrassingly parallel; collect-then-flatten
        // keeps record order stable regardless of scheduling
        let records: Vec<_> = files
            .par_iter()
            .enumerate()
            .map(|(idx, file)| extractor::extract_functions(file, idx))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect();

        // Barrier: everything below needs the complete corpus
        let calculator = MetricCalculator::new(&files);
        let metrics: Vec<_> = records
            .par_iter()
            .map(|record| calculator.compute(record))
            .collect();

        let corpus = Corpus {
            files,
            records,
            metrics,
        };
        info!(
            "Extracted {} functions from {} files",
            corpus.records.len(),
            corpus.files.len()
        );

        let mut summary = DetectionSummary::default();

        let duplicates = DuplicateNameDetector::new(self.config.thresholds);
        let det_start = Instant::now();
        let outcome = duplicates.detect(&corpus)?;
        let mut findings = duplicates.findings(&outcome.pairs);
        summary.add_result(&DetectorResult::success(
            duplicates.name().to_string(),
            findings.clone(),
            det_start.elapsed().as_millis() as u64,
        ));

        let wrappers = TrivialWrapperDetector::new(&self.config);
        let det_start = Instant::now();
        let verdicts = wrappers.detect(&corpus)?;
        let wrapper_findings = wrappers.findings(&verdicts);
        summary.add_result(&DetectorResult::success(
            wrappers.name().to_string(),
            wrapper_findings.clone(),
            det_start.elapsed().as_millis() as u64,
        ));
        findings.extend(wrapper_findings);

        // Severity-descending, then location, for stable diff-friendly output
        findings.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.affected_files.cmp(&b.affected_files))
                .then_with(|| a.line_start.cmp(&b.line_start))
        });

        let counts = VerdictCounts {
            duplicate_fail: outcome
                .pairs
                .iter()
                .filter(|p| p.verdict == PairVerdict::Fail)
                .count(),
            duplicate_warn: outcome
                .pairs
                .iter()
                .filter(|p| p.verdict == PairVerdict::Warn)
                .count(),
            wrapper_fail: verdicts
                .iter()
                .filter(|v| v.status == WrapperStatus::Fail)
                .count(),
            wrapper_warn: verdicts
                .iter()
                .filter(|v| v.status == WrapperStatus::Warn)
                .count(),
            wrapper_pass: verdicts
                .iter()
                .filter(|v| v.status == WrapperStatus::Pass)
                .count(),
        };

        // Stripped-name WARN and token WARN never force failure by themselves
        let should_fail = outcome
            .pairs
            .iter()
            .any(|p| p.mode == SimilarityMode::FullName && p.verdict == PairVerdict::Fail)
            || counts.wrapper_fail > 0;

        let report = QaReport {
            findings_summary: FindingsSummary::from_findings(&findings),
            findings,
            wrappers: verdicts
                .into_iter()
                .filter(|v| v.status != WrapperStatus::Pass)
                .collect(),
            counts,
            total_files: corpus.files.len(),
            total_functions: corpus.records.len(),
            comparisons_made: outcome.comparisons,
            pairs: outcome.pairs,
            should_fail,
        };

        info!(
            "QA run complete in {:?}: {} findings from {}/{} detectors, should_fail={}",
            start.elapsed(),
            report.findings.len(),
            summary.detectors_succeeded,
            summary.detectors_run,
            report.should_fail
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_pipeline_rejects_invalid_thresholds() {
        let config = QaConfig {
            thresholds: Thresholds {
                similarity_threshold: 0.99,
                full_fail_threshold: 0.90,
                ..Thresholds::default()
            },
            ..QaConfig::default()
        };
        assert!(Pipeline::new(config).is_err());
    }

    #[test]
    fn test_empty_corpus_produces_clean_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = Pipeline::new(QaConfig::default())
            .unwrap()
            .run(dir.path())
            .unwrap();
        assert_eq!(report.total_files, 0);
        assert_eq!(report.total_functions, 0);
        assert!(report.findings.is_empty());
        assert!(!report.should_fail);
    }

    #[test]
    fn test_duplicate_across_files_fails_run() {
        let dir = tempfile::tempdir().unwrap();
        let body = "check_valid() {\n\tgrep -q \"$1\" \"$2\" || return 1\n\techo \"$1\" \"$2\" ok\n\tdate +%s\n}\n";
        write(dir.path(), "a.sh", body);
        write(dir.path(), "b.sh", body);

        let report = Pipeline::new(QaConfig::default())
            .unwrap()
            .run(dir.path())
            .unwrap();
        assert!(report.counts.duplicate_fail >= 1);
        assert!(report.should_fail);
    }

    #[test]
    fn test_wrapper_warn_does_not_fail_run() {
        let dir = tempfile::tempdir().unwrap();
        // 3 tokens: warn tier, not fail
        write(dir.path(), "a.sh", "run_it() {\n\tcmd one two\n}\n");

        let report = Pipeline::new(QaConfig::default())
            .unwrap()
            .run(dir.path())
            .unwrap();
        assert_eq!(report.counts.wrapper_warn, 1);
        assert_eq!(report.counts.wrapper_fail, 0);
        assert!(!report.should_fail);
    }
}
