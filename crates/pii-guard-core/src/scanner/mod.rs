use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod file_scanner;
pub mod registry;
pub mod suppression;
pub mod walker;

/// Byte span within a scanned line `(start, end)` where `start <= end`.
pub type Span = (usize, usize);

/// Severity tiers, declared in report order. The derived `Ord` drives both
/// grouping and section ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    /// Parse a severity name. Detector definitions carry severities as text,
    /// so unknown tiers are caught here, at construction time.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

/// Definition of a single detection pattern used during scanning.
///
/// Constructed only through [`Detector::new`], which validates invariants
/// and compiles the pattern case-insensitively.
#[derive(Debug, Clone)]
pub struct Detector {
    name: String,
    pattern: Regex,
    severity: Severity,
    citation: String,
    description: String,
}

impl Detector {
    /// Construct a new detector, validating invariants before returning.
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        severity: &str,
        citation: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DetectorValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DetectorValidationError::EmptyName);
        }
        if pattern.is_empty() {
            return Err(DetectorValidationError::EmptyPattern { name });
        }
        let severity = Severity::from_name(severity).ok_or_else(|| {
            DetectorValidationError::UnknownSeverity {
                name: name.clone(),
                severity: severity.to_string(),
            }
        })?;
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| DetectorValidationError::InvalidPattern {
                name: name.clone(),
                source,
            })?;
        Ok(Self {
            name,
            pattern,
            severity,
            citation: citation.into(),
            description: description.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn citation(&self) -> &str {
        &self.citation
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub(crate) fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

/// Errors emitted while validating detector definitions.
#[derive(Debug, Error)]
pub enum DetectorValidationError {
    #[error("detector name must not be blank")]
    EmptyName,
    #[error("detector `{name}` pattern must not be empty")]
    EmptyPattern { name: String },
    #[error("detector `{name}` pattern does not compile: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
    #[error("detector `{name}` declares unknown severity `{severity}` (expected one of critical, high, medium, low)")]
    UnknownSeverity { name: String, severity: String },
    #[error("duplicate detector name `{0}`")]
    DuplicateName(String),
}

/// One reported occurrence of a matched pattern, after suppression filtering.
///
/// The severity always equals the originating detector's severity; findings
/// are immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub file: String,
    /// 1-based line number over the decoded text.
    pub line: usize,
    #[serde(rename = "type")]
    pub detector: String,
    pub severity: Severity,
    pub citation: String,
    pub description: String,
    pub matched: String,
    /// Trimmed source line, truncated to at most 100 characters.
    pub context: String,
}

/// Per-tier finding totals, serialized as the `by_severity` report block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// Findings of one scan run in discovery order, with derived severity views.
/// Exists only for the duration of one report generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub findings: Vec<Finding>,
}

impl ScanReport {
    pub fn new(findings: Vec<Finding>) -> Self {
        Self { findings }
    }

    pub fn total(&self) -> usize {
        self.findings.len()
    }

    pub fn severity_counts(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for finding in &self.findings {
            match finding.severity {
                Severity::Critical => counts.critical += 1,
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }
        }
        counts
    }

    /// Partition findings by severity tier, keyed in report order. Relative
    /// discovery order is preserved within each group; tiers with no
    /// findings have no entry.
    pub fn by_severity(&self) -> BTreeMap<Severity, Vec<&Finding>> {
        let mut groups: BTreeMap<Severity, Vec<&Finding>> = BTreeMap::new();
        for finding in &self.findings {
            groups.entry(finding.severity).or_default().push(finding);
        }
        groups
    }

    /// True when any critical or high finding exists; drives the exit code.
    pub fn has_blocking_findings(&self) -> bool {
        self.findings
            .iter()
            .any(|finding| matches!(finding.severity, Severity::Critical | Severity::High))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(severity: Severity) -> Finding {
        Finding {
            file: "a.txt".into(),
            line: 1,
            detector: "email".into(),
            severity,
            citation: "Art. 4(1)".into(),
            description: "Email address (direct identifier)".into(),
            matched: "jane@corp.io".into(),
            context: "jane@corp.io".into(),
        }
    }

    #[test]
    fn detector_new_enforces_invariants() {
        let detector = Detector::new(
            "email",
            r"[a-z]+@[a-z]+\.[a-z]{2,}",
            "high",
            "Art. 4(1)",
            "Email address (direct identifier)",
        )
        .expect("valid detector should be constructed");
        assert_eq!(detector.name(), "email");
        assert_eq!(detector.severity(), Severity::High);
    }

    #[test]
    fn detector_rejects_unknown_severity() {
        let err = Detector::new("email", r"@", "urgent", "Art. 4(1)", "Email")
            .expect_err("unknown severity should be rejected at construction");
        assert!(matches!(
            err,
            DetectorValidationError::UnknownSeverity { name, severity }
                if name == "email" && severity == "urgent"
        ));
    }

    #[test]
    fn detector_rejects_invalid_pattern() {
        let err = Detector::new("broken", r"([unclosed", "low", "Art. 4(1)", "Broken")
            .expect_err("invalid regex should be rejected");
        assert!(matches!(
            err,
            DetectorValidationError::InvalidPattern { name, .. } if name == "broken"
        ));
    }

    #[test]
    fn detector_rejects_blank_name() {
        let err = Detector::new("  ", r"@", "low", "Art. 4(1)", "Blank")
            .expect_err("blank name should be rejected");
        assert!(matches!(err, DetectorValidationError::EmptyName));
    }

    #[test]
    fn severity_orders_critical_first() {
        let mut tiers = vec![Severity::Low, Severity::High, Severity::Critical];
        tiers.sort();
        assert_eq!(
            tiers,
            vec![Severity::Critical, Severity::High, Severity::Low]
        );
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Severity::Critical).unwrap(),
            "\"critical\""
        );
        assert_eq!(Severity::from_name("HIGH"), Some(Severity::High));
        assert_eq!(Severity::from_name("urgent"), None);
    }

    #[test]
    fn finding_serializes_detector_as_type() {
        let value = serde_json::to_value(finding(Severity::High)).unwrap();
        assert_eq!(value["type"], "email");
        assert_eq!(value["severity"], "high");
        assert_eq!(value["line"], 1);
    }

    #[test]
    fn report_totals_match_severity_counts() {
        let report = ScanReport::new(vec![
            finding(Severity::Critical),
            finding(Severity::High),
            finding(Severity::High),
            finding(Severity::Low),
        ]);
        let counts = report.severity_counts();
        assert_eq!(counts.critical, 1);
        assert_eq!(counts.high, 2);
        assert_eq!(counts.medium, 0);
        assert_eq!(counts.low, 1);
        assert_eq!(counts.total(), report.total());
        assert!(report.has_blocking_findings());
    }

    #[test]
    fn by_severity_preserves_discovery_order() {
        let mut first = finding(Severity::High);
        first.line = 1;
        let mut second = finding(Severity::High);
        second.line = 9;
        let report = ScanReport::new(vec![first, second]);

        let groups = report.by_severity();
        let lines: Vec<_> = groups[&Severity::High].iter().map(|f| f.line).collect();
        assert_eq!(lines, vec![1, 9]);
        assert!(!groups.contains_key(&Severity::Critical));
    }

    #[test]
    fn medium_and_low_findings_do_not_block() {
        let report = ScanReport::new(vec![finding(Severity::Medium), finding(Severity::Low)]);
        assert!(!report.has_blocking_findings());
    }
}
