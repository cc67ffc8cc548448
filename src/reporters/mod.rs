//! Output reporters for QA results
//!
//! Supports two output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON

mod json;
mod text;

use crate::models::QaReport;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render a QA report in the specified format
pub fn report(report: &QaReport, format: &str) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(report, fmt)
}

/// Render a QA report using an OutputFormat enum
pub fn report_with_format(report: &QaReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report),
        OutputFormat::Json => json::render(report),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{
        Finding, FindingsSummary, QaReport, Severity, VerdictCounts,
    };

    /// Create a minimal QaReport for testing
    pub(crate) fn test_report() -> QaReport {
        let findings = vec![Finding {
            id: "f1".into(),
            detector: "trivial-wrappers".into(),
            severity: Severity::High,
            title: "Trivial wrapper `say`".into(),
            description: "A test issue".into(),
            affected_files: vec!["lib/say.sh".into()],
            line_start: Some(10),
            suggested_fix: Some("Inline it".into()),
            ..Default::default()
        }];

        QaReport {
            findings_summary: FindingsSummary::from_findings(&findings),
            findings,
            pairs: Vec::new(),
            wrappers: Vec::new(),
            counts: VerdictCounts {
                wrapper_fail: 1,
                wrapper_pass: 4,
                ..Default::default()
            },
            total_files: 2,
            total_functions: 5,
            comparisons_made: 10,
            should_fail: true,
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::from_str("sarif").is_err());
    }

    #[test]
    fn test_report_dispatch() {
        let r = test_report();
        assert!(report(&r, "text").unwrap().contains("say"));
        assert!(report(&r, "json").unwrap().contains("trivial-wrappers"));
    }
}
