use std::fs;
use std::path::Path;

use tracing::{debug, instrument, trace};

use super::registry::DetectorRegistry;
use super::suppression::SuppressionFilter;
use super::Finding;

const MAX_CONTEXT_CHARS: usize = 100;

/// Scan one file, returning every non-suppressed match as a finding.
///
/// The file is decoded permissively: undecodable byte sequences are replaced
/// rather than failing. Any read error (permission, binary device, the path
/// being a directory) yields an empty result; per-file failures are never
/// fatal to the overall scan and are not surfaced as findings.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn scan_file(
    path: &Path,
    registry: &DetectorRegistry,
    filter: &SuppressionFilter,
) -> Vec<Finding> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            debug!(error = %err, "skipping unreadable file");
            return Vec::new();
        }
    };
    let text = String::from_utf8_lossy(&bytes);

    let mut findings = Vec::new();
    for (index, line) in text.lines().enumerate() {
        for hit in registry.matches_in(line) {
            if filter.is_false_positive(hit.text, line) {
                continue;
            }
            findings.push(Finding {
                file: path.display().to_string(),
                line: index + 1,
                detector: hit.detector.name().to_string(),
                severity: hit.detector.severity(),
                citation: hit.detector.citation().to_string(),
                description: hit.detector.description().to_string(),
                matched: hit.text.to_string(),
                context: truncate_context(line),
            });
        }
    }
    trace!(findings = findings.len(), "file scanned");
    findings
}

fn truncate_context(line: &str) -> String {
    line.trim().chars().take(MAX_CONTEXT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Severity;
    use std::io::Write;

    fn write_fixture(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    fn scan(path: &Path) -> Vec<Finding> {
        scan_file(
            path,
            &DetectorRegistry::with_defaults(),
            &SuppressionFilter::default(),
        )
    }

    #[test]
    fn email_line_yields_one_high_finding() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "contact.txt", b"Contact: jane.doe@company.com\n");

        let findings = scan(&path);
        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.detector, "email");
        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.line, 1);
        assert_eq!(finding.matched, "jane.doe@company.com");
        assert_eq!(finding.context, "Contact: jane.doe@company.com");
    }

    #[test]
    fn ssn_line_yields_one_critical_finding() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "record.txt", b"SSN: 123-45-6789\n");

        let findings = scan(&path);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].detector, "ssn_us");
        assert_eq!(findings[0].severity, Severity::Critical);
        assert_eq!(findings[0].matched, "123-45-6789");
    }

    #[test]
    fn placeholder_values_yield_no_findings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "sample.txt", b"test@example.com\n");

        assert!(scan(&path).is_empty());
    }

    #[test]
    fn line_numbers_are_one_based() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "multi.txt", b"nothing here\n\nmail: ops@corp.io\n");

        let findings = scan(&path);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 3);
    }

    #[test]
    fn context_is_trimmed_and_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let padding = "x".repeat(200);
        let line = format!("   ops@corp.io {padding}\n");
        let path = write_fixture(&dir, "long.txt", line.as_bytes());

        let findings = scan(&path);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].context.chars().count(), 100);
        assert!(findings[0].context.starts_with("ops@corp.io"));
    }

    #[test]
    fn invalid_utf8_is_decoded_permissively() {
        let dir = tempfile::tempdir().unwrap();
        let mut contents = Vec::from(&b"\xff\xfe garbage\n"[..]);
        contents.extend_from_slice(b"mail: ops@corp.io\n");
        let path = write_fixture(&dir, "mixed.bin.log", &contents);

        let findings = scan(&path);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 2);
    }

    #[test]
    fn read_errors_are_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // A directory path fails `fs::read`; the scanner must stay silent.
        assert!(scan(dir.path()).is_empty());
        assert!(scan(&dir.path().join("missing.txt")).is_empty());
    }
}
