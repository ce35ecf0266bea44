use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;

use crate::scanner::{Finding, ScanReport, Severity, SeverityCounts};

/// Format styles supported by the report renderer.
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Produce a report string from a `ScanReport` using the desired format.
/// Output is deterministic for deterministic input and detector order.
pub fn render_report(report: &ScanReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => render_human(report),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&JsonReport::from(report))?),
    }
}

fn marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴",
        Severity::High => "🟠",
        Severity::Medium => "🟡",
        Severity::Low => "🟢",
    }
}

fn render_human(report: &ScanReport) -> anyhow::Result<String> {
    let banner = "=".repeat(60);
    let counts = report.severity_counts();
    let groups = report.by_severity();

    let mut out = String::new();
    writeln!(out, "{banner}")?;
    writeln!(out, "PII Detection Report - GDPR Compliance Scan")?;
    writeln!(out, "{banner}")?;
    writeln!(out)?;

    writeln!(out, "## Summary")?;
    writeln!(out, "Total PII instances found: {}", report.total())?;
    writeln!(out)?;
    writeln!(out, "By Severity:")?;
    writeln!(out, "  🔴 Critical: {}", counts.critical)?;
    writeln!(out, "  🟠 High:     {}", counts.high)?;
    writeln!(out, "  🟡 Medium:   {}", counts.medium)?;
    writeln!(out, "  🟢 Low:      {}", counts.low)?;
    writeln!(out)?;

    for severity in Severity::ALL {
        let Some(findings) = groups.get(&severity) else {
            continue;
        };
        writeln!(
            out,
            "## {} {} Severity ({} findings)",
            marker(severity),
            severity.as_str().to_uppercase(),
            findings.len()
        )?;
        writeln!(out)?;

        // Files sorted lexicographically, findings kept in discovery order.
        let mut by_file: BTreeMap<&str, Vec<&Finding>> = BTreeMap::new();
        for finding in findings {
            by_file.entry(finding.file.as_str()).or_default().push(finding);
        }
        for (file, file_findings) in by_file {
            writeln!(out, "### {file}")?;
            for finding in file_findings {
                writeln!(out, "  Line {}: {}", finding.line, finding.description)?;
                writeln!(out, "    Type: {}", finding.detector)?;
                writeln!(out, "    GDPR: {}", finding.citation)?;
                writeln!(out, "    Found: {}", finding.matched)?;
                writeln!(out, "    Context: {}", finding.context)?;
                writeln!(out)?;
            }
        }
    }

    writeln!(out, "{banner}")?;
    writeln!(out, "## Recommendations")?;
    writeln!(out, "{banner}")?;
    writeln!(out)?;

    if counts.critical > 0 {
        writeln!(out, "🔴 CRITICAL: Immediately review critical findings")?;
        writeln!(out, "   - SSN, credit cards must be encrypted")?;
        writeln!(out, "   - Never log or expose in plain text")?;
        writeln!(out)?;
    }
    if counts.high > 0 {
        writeln!(out, "🟠 HIGH: Review high-severity personal data")?;
        writeln!(out, "   - Emails, phones are personal data (GDPR Art. 4)")?;
        writeln!(out, "   - Ensure proper legal basis for processing")?;
        writeln!(out, "   - Implement data subject rights (access, erasure)")?;
        writeln!(out)?;
    }
    if counts.medium > 0 || counts.low > 0 {
        writeln!(out, "🟡 MEDIUM/LOW: Review context for these findings")?;
        writeln!(out, "   - IP addresses can be personal data")?;
        writeln!(out, "   - UUIDs may identify users")?;
        writeln!(out, "   - Ensure compliance with GDPR principles")?;
        writeln!(out)?;
    }

    writeln!(out, "Detection is pattern-based and intentionally broad; expect false")?;
    writeln!(out, "positives (any five-digit number matches the postal-code pattern)")?;
    writeln!(out, "and review each finding in context.")?;
    writeln!(out)?;
    writeln!(out, "For detailed GDPR analysis, run:")?;
    writeln!(out, "  /comply:audit gdpr")?;

    Ok(out)
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    total_findings: usize,
    by_severity: SeverityCounts,
    findings: &'a [Finding],
}

impl<'a> From<&'a ScanReport> for JsonReport<'a> {
    fn from(report: &'a ScanReport) -> Self {
        Self {
            total_findings: report.total(),
            by_severity: report.severity_counts(),
            findings: &report.findings,
        }
    }
}
