//! Trivial-wrapper classifier
//!
//! A short function is only worth flagging when it adds no logical value
//! beyond renaming a call. Frequent reuse, multi-variable bookkeeping, or
//! enough internal complexity each independently justify a wrapper's
//! existence; any one is sufficient. The rules below are evaluated in order
//! and the first match decides the verdict.

use crate::config::{QaConfig, Thresholds};
use crate::models::{
    deterministic_finding_id, Corpus, Finding, FunctionMetrics, FunctionRecord, Severity,
    SourceFile, WrapperReason, WrapperStatus, WrapperVerdict,
};
use anyhow::Result;
use rayon::prelude::*;
use tracing::info;

/// How many lines above a definition are searched for exemption markers
const ANNOTATION_WINDOW: usize = 10;

/// Whether any configured exemption marker appears in a comment line within
/// the window immediately preceding the function. Marker-agnostic: plain
/// substring containment against the caller-supplied set.
pub fn has_exemption(file: &SourceFile, record: &FunctionRecord, markers: &[String]) -> bool {
    if markers.is_empty() {
        return false;
    }
    let end = record.start_line.saturating_sub(1); // 0-based header index
    let start = end.saturating_sub(ANNOTATION_WINDOW);
    file.lines[start..end].iter().any(|line| {
        let trimmed = line.trim();
        trimmed.starts_with('#') && markers.iter().any(|marker| trimmed.contains(marker.as_str()))
    })
}

/// Apply the rule chain to one function.
pub fn classify(
    metrics: &FunctionMetrics,
    annotated: bool,
    t: &Thresholds,
) -> (WrapperStatus, WrapperReason) {
    if metrics.meaningful_line_count > t.max_lines {
        return (WrapperStatus::Pass, WrapperReason::NotTrivial);
    }
    if annotated {
        return (WrapperStatus::Pass, WrapperReason::Annotated);
    }
    if metrics.local_usage_count >= t.local_usage_threshold {
        return (WrapperStatus::Pass, WrapperReason::LocalUsage);
    }
    if metrics.global_usage_count >= t.global_usage_threshold {
        return (WrapperStatus::Pass, WrapperReason::GlobalUsage);
    }
    if metrics.variable_count >= t.min_vars_for_ergonomic {
        return (WrapperStatus::Pass, WrapperReason::ErgonomicVars);
    }
    if metrics.token_count >= t.token_complexity_pass {
        return (WrapperStatus::Pass, WrapperReason::Complex);
    }
    if metrics.token_count >= t.token_complexity_warn {
        return (WrapperStatus::Warn, WrapperReason::TokenWarn);
    }
    (WrapperStatus::Fail, WrapperReason::TokenFail)
}

pub struct TrivialWrapperDetector {
    thresholds: Thresholds,
    markers: Vec<String>,
}

impl TrivialWrapperDetector {
    pub fn new(config: &QaConfig) -> Self {
        Self {
            thresholds: config.thresholds,
            markers: config.markers.clone(),
        }
    }

    pub fn name(&self) -> &'static str {
        "trivial-wrappers"
    }

    /// Classify every record in the corpus. Returns all verdicts, Pass
    /// included; the reporter decides which ones to surface.
    pub fn detect(&self, corpus: &Corpus) -> Result<Vec<WrapperVerdict>> {
        let verdicts: Vec<WrapperVerdict> = corpus
            .records
            .par_iter()
            .zip(corpus.metrics.par_iter())
            .map(|(record, metrics)| {
                let annotated =
                    has_exemption(&corpus.files[record.file_idx], record, &self.markers);
                let (status, reason) = classify(metrics, annotated, &self.thresholds);
                WrapperVerdict {
                    name: record.name.clone(),
                    file: record.file.clone(),
                    start_line: record.start_line,
                    end_line: record.end_line,
                    status,
                    reason,
                    metrics: *metrics,
                }
            })
            .collect();

        let flagged = verdicts
            .iter()
            .filter(|v| v.status != WrapperStatus::Pass)
            .count();
        info!(
            "{}: {} of {} functions flagged",
            self.name(),
            flagged,
            verdicts.len()
        );
        Ok(verdicts)
    }

    /// Render Warn/Fail verdicts as report findings.
    pub fn findings(&self, verdicts: &[WrapperVerdict]) -> Vec<Finding> {
        verdicts
            .iter()
            .filter(|v| v.status != WrapperStatus::Pass)
            .map(|v| {
                let severity = match v.status {
                    WrapperStatus::Fail => Severity::High,
                    _ => Severity::Medium,
                };
                let title = format!("Trivial wrapper `{}`", v.name);
                let m = &v.metrics;
                let description = format!(
                    "`{}` ({}:{}) is {} meaningful line(s) with {} token(s), {} variable(s), \
                     used {} time(s) locally and {} time(s) globally ({}).",
                    v.name,
                    v.file.display(),
                    v.start_line,
                    m.meaningful_line_count,
                    m.token_count,
                    m.variable_count,
                    m.local_usage_count,
                    m.global_usage_count,
                    v.reason.as_str()
                );
                Finding {
                    id: deterministic_finding_id(
                        self.name(),
                        &v.file.to_string_lossy(),
                        v.start_line as u32,
                        &title,
                    ),
                    detector: self.name().to_string(),
                    severity,
                    title,
                    description,
                    affected_files: vec![v.file.clone()],
                    line_start: Some(v.start_line as u32),
                    line_end: Some(v.end_line as u32),
                    suggested_fix: Some(
                        "Inline the call at its use sites, or mark the wrapper with an \
                         exemption comment if it is intentional API surface."
                            .to_string(),
                    ),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract_functions;
    use crate::metrics::MetricCalculator;
    use std::path::PathBuf;

    fn source(name: &str, text: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from(name),
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    fn build_corpus(files: Vec<SourceFile>) -> Corpus {
        let mut records = Vec::new();
        for (idx, file) in files.iter().enumerate() {
            records.extend(extract_functions(file, idx));
        }
        let calc = MetricCalculator::new(&files);
        let metrics = records.iter().map(|r| calc.compute(r)).collect();
        Corpus {
            files,
            records,
            metrics,
        }
    }

    fn metrics(
        lines: usize,
        vars: usize,
        tokens: usize,
        local: usize,
        global: usize,
    ) -> FunctionMetrics {
        FunctionMetrics {
            meaningful_line_count: lines,
            variable_count: vars,
            token_count: tokens,
            local_usage_count: local,
            global_usage_count: global,
        }
    }

    #[test]
    fn test_long_function_passes_regardless_of_usage() {
        let t = Thresholds::default();
        let m = metrics(5, 0, 0, 0, 0);
        assert_eq!(
            classify(&m, false, &t),
            (WrapperStatus::Pass, WrapperReason::NotTrivial)
        );
        // Even an annotated, heavily-used long function reports not_trivial
        assert_eq!(
            classify(&m, true, &t),
            (WrapperStatus::Pass, WrapperReason::NotTrivial)
        );
    }

    #[test]
    fn test_annotation_beats_usage_rules() {
        let t = Thresholds::default();
        let m = metrics(1, 0, 0, 10, 10);
        assert_eq!(
            classify(&m, true, &t),
            (WrapperStatus::Pass, WrapperReason::Annotated)
        );
    }

    #[test]
    fn test_rule_order() {
        let t = Thresholds::default();

        let m = metrics(1, 0, 0, 4, 0);
        assert_eq!(classify(&m, false, &t).1, WrapperReason::LocalUsage);

        let m = metrics(1, 0, 0, 0, 6);
        assert_eq!(classify(&m, false, &t).1, WrapperReason::GlobalUsage);

        let m = metrics(1, 2, 0, 0, 0);
        assert_eq!(classify(&m, false, &t).1, WrapperReason::ErgonomicVars);

        let m = metrics(1, 0, 4, 0, 0);
        assert_eq!(classify(&m, false, &t).1, WrapperReason::Complex);

        let m = metrics(1, 0, 3, 0, 0);
        assert_eq!(
            classify(&m, false, &t),
            (WrapperStatus::Warn, WrapperReason::TokenWarn)
        );

        let m = metrics(1, 1, 2, 0, 0);
        assert_eq!(
            classify(&m, false, &t),
            (WrapperStatus::Fail, WrapperReason::TokenFail)
        );
    }

    #[test]
    fn test_echo_wrapper_fails() {
        // 1 meaningful line, 1 variable, 2 tokens, never called: token_fail
        let corpus = build_corpus(vec![source(
            "a.sh",
            "say() {\n\
             \techo \"$1\"\n\
             }\n",
        )]);
        let det = TrivialWrapperDetector::new(&QaConfig::default());
        let verdicts = det.detect(&corpus).unwrap();
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].status, WrapperStatus::Fail);
        assert_eq!(verdicts[0].reason, WrapperReason::TokenFail);
    }

    #[test]
    fn test_echo_wrapper_with_reuse_passes() {
        let corpus = build_corpus(vec![source(
            "a.sh",
            "say() {\n\
             \techo \"$1\"\n\
             }\n\
             say a\nsay b\nsay c\nsay d\nsay e\n",
        )]);
        let det = TrivialWrapperDetector::new(&QaConfig::default());
        let verdicts = det.detect(&corpus).unwrap();
        assert_eq!(verdicts[0].status, WrapperStatus::Pass);
        assert_eq!(verdicts[0].reason, WrapperReason::LocalUsage);
    }

    #[test]
    fn test_annotated_wrapper_passes() {
        let file = source(
            "a.sh",
            "# @public-api: stable entry point\n\
             say() {\n\
             \techo \"$1\"\n\
             }\n",
        );
        let corpus = build_corpus(vec![file]);
        let config = QaConfig {
            markers: vec!["@public-api".to_string()],
            ..QaConfig::default()
        };
        let det = TrivialWrapperDetector::new(&config);
        let verdicts = det.detect(&corpus).unwrap();
        assert_eq!(verdicts[0].status, WrapperStatus::Pass);
        assert_eq!(verdicts[0].reason, WrapperReason::Annotated);
    }

    #[test]
    fn test_marker_outside_window_ignored() {
        let mut lines = vec!["# @public-api".to_string()];
        lines.extend((0..12).map(|i| format!("# filler {i}")));
        lines.push("say() {".to_string());
        lines.push("\techo \"$1\"".to_string());
        lines.push("}".to_string());
        let file = SourceFile {
            path: PathBuf::from("a.sh"),
            lines,
        };
        let record = extract_functions(&file, 0).remove(0);
        assert!(!has_exemption(
            &file,
            &record,
            &["@public-api".to_string()]
        ));
    }

    #[test]
    fn test_marker_must_be_in_comment() {
        let file = source(
            "a.sh",
            "MARKER=\"@public-api\"\n\
             say() {\n\
             \techo \"$1\"\n\
             }\n",
        );
        let record = extract_functions(&file, 0).remove(0);
        assert!(!has_exemption(
            &file,
            &record,
            &["@public-api".to_string()]
        ));
    }

    #[test]
    fn test_findings_skip_pass_verdicts() {
        let corpus = build_corpus(vec![source(
            "a.sh",
            "say() {\n\
             \techo \"$1\"\n\
             }\n\
             \n\
             big_one() {\n\
             \tgrep -q foo bar\n\
             \tsed -i 's/a/b/' x\n\
             \tawk ': print :' y\n\
             }\n",
        )]);
        let det = TrivialWrapperDetector::new(&QaConfig::default());
        let verdicts = det.detect(&corpus).unwrap();
        let findings = det.findings(&verdicts);
        // Only the failing wrapper is reported; the 3-line function passes
        assert_eq!(findings.len(), 1);
        assert!(findings[0].title.contains("say"));
        assert_eq!(findings[0].severity, Severity::High);
    }
}
