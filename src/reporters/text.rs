//! Text (terminal) reporter with colors and formatting

use crate::models::{QaReport, Severity};
use anyhow::Result;

/// Severity colors (ANSI escape codes)
fn severity_color(severity: &Severity) -> &'static str {
    match severity {
        Severity::High => "\x1b[31m",   // Red
        Severity::Medium => "\x1b[33m", // Yellow
        Severity::Low => "\x1b[34m",    // Blue
        Severity::Info => "\x1b[90m",   // Gray
    }
}

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Severity tag
fn severity_tag(severity: &Severity) -> &'static str {
    match severity {
        Severity::High => "[H]",
        Severity::Medium => "[M]",
        Severity::Low => "[L]",
        Severity::Info => "[I]",
    }
}

/// Render report as formatted terminal output
pub fn render(report: &QaReport) -> Result<String> {
    let mut out = String::new();

    out.push_str(&format!("\n{BOLD}nutqa source analysis{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));

    if report.total_files == 0 {
        out.push_str("No shell sources matched. Nothing to check.\n");
        return Ok(out);
    }

    out.push_str(&format!(
        "Files: {}  Functions: {}  Comparisons: {}\n\n",
        report.total_files, report.total_functions, report.comparisons_made
    ));

    // Verdict buckets (compact)
    let c = &report.counts;
    out.push_str(&format!("{BOLD}VERDICTS{RESET}\n"));
    out.push_str(&format!(
        "  Duplicates: {} fail / {} warn  Wrappers: {} fail / {} warn / {} pass\n\n",
        c.duplicate_fail, c.duplicate_warn, c.wrapper_fail, c.wrapper_warn, c.wrapper_pass
    ));

    // Findings summary
    let fs = &report.findings_summary;
    out.push_str(&format!("{BOLD}FINDINGS{RESET} ({} total)\n", fs.total));

    let mut summary_parts = Vec::new();
    if fs.high > 0 {
        summary_parts.push(format!("\x1b[31m{} high{RESET}", fs.high));
    }
    if fs.medium > 0 {
        summary_parts.push(format!("\x1b[33m{} medium{RESET}", fs.medium));
    }
    if fs.low > 0 {
        summary_parts.push(format!("\x1b[34m{} low{RESET}", fs.low));
    }
    if !summary_parts.is_empty() {
        out.push_str(&format!("  {}\n\n", summary_parts.join(" | ")));
    }

    if !report.findings.is_empty() {
        out.push_str(&format!(
            "{DIM}  #   SEV   TITLE                                    FILE{RESET}\n"
        ));
        out.push_str(&format!(
            "{DIM}  ─────────────────────────────────────────────────────────────────{RESET}\n"
        ));

        for (i, finding) in report.findings.iter().enumerate() {
            let sev_c = severity_color(&finding.severity);
            let sev_tag = severity_tag(&finding.severity);

            // Truncate title if too long; chars() avoids UTF-8 slice panics
            let title: String = finding.title.chars().take(35).collect();
            let title = if finding.title.chars().count() > 38 {
                format!("{}...", title)
            } else {
                finding.title.clone()
            };

            let file_info = format_file_location(finding);

            out.push_str(&format!(
                "  {DIM}{:>3}{RESET}  {sev_c}{}{RESET}  {:<40}  {DIM}{}{RESET}\n",
                i + 1,
                sev_tag,
                title,
                file_info
            ));
        }
        out.push('\n');
    }

    if report.should_fail {
        out.push_str(&format!(
            "{BOLD}\x1b[31mFAIL{RESET} duplicate definitions or unjustified wrappers found\n"
        ));
    } else if fs.total > 0 {
        out.push_str(&format!(
            "{DIM}Warnings only; the run passes. Review before they accumulate.{RESET}\n"
        ));
    } else {
        out.push_str(&format!("{DIM}Clean. No findings.{RESET}\n"));
    }

    Ok(out)
}

fn format_file_location(finding: &crate::models::Finding) -> String {
    let Some(file) = finding.affected_files.first() else {
        return String::new();
    };
    let file_str = file.display().to_string();
    let short_file = if file_str.chars().count() > 25 {
        let skip = file_str.chars().count() - 22;
        format!("...{}", file_str.chars().skip(skip).collect::<String>())
    } else {
        file_str
    };
    match finding.line_start {
        Some(line) => format!("{}:{}", short_file, line),
        None => short_file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_render_contains_counts_and_verdict() {
        let output = render(&test_report()).unwrap();
        assert!(output.contains("Files: 2"));
        assert!(output.contains("Functions: 5"));
        assert!(output.contains("FAIL"));
        assert!(output.contains("Trivial wrapper"));
    }

    #[test]
    fn test_render_empty_corpus() {
        let mut report = test_report();
        report.total_files = 0;
        let output = render(&report).unwrap();
        assert!(output.contains("Nothing to check"));
    }
}
