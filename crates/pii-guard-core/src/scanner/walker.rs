use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use super::file_scanner::scan_file;
use super::registry::DetectorRegistry;
use super::suppression::SuppressionFilter;
use super::ScanReport;

/// Directory names that never get scanned, wherever they appear in a path.
const DEFAULT_SKIP_DIRS: &[&str] = &[
    "node_modules",
    "vendor",
    "dist",
    "build",
    ".git",
    ".svn",
    ".hg",
    "venv",
    "env",
    "__pycache__",
    "target",
    "bin",
    "obj",
];

/// File extensions handed to the file scanner. Files with no extension are
/// never scanned.
const DEFAULT_EXTENSIONS: &[&str] = &[
    "js", "ts", "jsx", "tsx", "py", "rb", "php", "java", "go", "rs", "sql", "json", "yaml", "yml",
    "env", "config", "md", "txt", "log",
];

/// Errors surfaced to the user before traversal begins. Per-file failures
/// during the walk are swallowed instead.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan root `{0}` does not exist")]
    RootMissing(PathBuf),
    #[error("scan root `{0}` is not a directory")]
    RootNotDirectory(PathBuf),
}

/// Inclusion/exclusion policy applied before a path reaches the file scanner.
#[derive(Debug, Clone)]
pub struct ScanPolicy {
    pub skip_dirs: BTreeSet<String>,
    pub extensions: BTreeSet<String>,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ScanPolicy {
    /// A skip-directory name anywhere in the segment sequence excludes the
    /// file, not just at the root.
    fn skips_path(&self, path: &Path) -> bool {
        path.components().any(|component| {
            matches!(
                component,
                Component::Normal(segment)
                    if segment.to_str().is_some_and(|s| self.skip_dirs.contains(s))
            )
        })
    }

    fn scans_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(ext))
    }
}

/// Validate the scan root. The one user-input check that is surfaced.
pub fn validate_scan_root(root: &Path) -> Result<(), ScanError> {
    if !root.exists() {
        return Err(ScanError::RootMissing(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::RootNotDirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Recursively scan every eligible file under `root`, aggregating findings
/// in deterministic traversal order (file names sorted at each level).
#[instrument(skip_all, fields(root = %root.display()))]
pub fn scan_tree(
    root: &Path,
    registry: &DetectorRegistry,
    filter: &SuppressionFilter,
    policy: &ScanPolicy,
) -> Result<ScanReport, ScanError> {
    validate_scan_root(root)?;

    let mut findings = Vec::new();
    let walker = WalkDir::new(root).sort_by_file_name();
    for entry in walker.into_iter().filter_map(|entry| entry.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if policy.skips_path(path) || !policy.scans_extension(path) {
            continue;
        }
        findings.extend(scan_file(path, registry, filter));
    }
    debug!(findings = findings.len(), "scan complete");
    Ok(ScanReport::new(findings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scan(root: &Path) -> Result<ScanReport, ScanError> {
        scan_tree(
            root,
            &DetectorRegistry::with_defaults(),
            &SuppressionFilter::default(),
            &ScanPolicy::default(),
        )
    }

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn missing_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, ScanError::RootMissing(_)));
    }

    #[test]
    fn file_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "plain.txt", "hello");
        let err = scan(&dir.path().join("plain.txt")).unwrap_err();
        assert!(matches!(err, ScanError::RootNotDirectory(_)));
    }

    #[test]
    fn skip_directories_are_invisible_at_any_depth() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/app.js", "ok");
        write(dir.path(), "node_modules/pkg/index.js", "mail: ops@corp.io");
        write(dir.path(), "src/deep/.git/config.txt", "mail: ops@corp.io");
        write(dir.path(), "src/deep/target/debug/out.log", "SSN: 123-45-6789");

        let report = scan(dir.path()).unwrap();
        assert!(report.findings.is_empty());
    }

    #[test]
    fn extension_allow_list_is_enforced() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "notes.txt", "mail: ops@corp.io");
        write(dir.path(), "image.png", "mail: ops@corp.io");
        write(dir.path(), "README", "mail: ops@corp.io");

        let report = scan(dir.path()).unwrap();
        let files: Vec<_> = report.findings.iter().map(|f| f.file.as_str()).collect();
        assert_eq!(report.findings.len(), 1);
        assert!(files[0].ends_with("notes.txt"));
    }

    #[test]
    fn files_without_extension_are_never_scanned() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Makefile", "mail: ops@corp.io");
        write(dir.path(), ".env", "mail: ops@corp.io");

        let report = scan(dir.path()).unwrap();
        assert!(report.findings.is_empty());
    }

    #[test]
    fn traversal_order_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.txt", "mail: b@corp.io");
        write(dir.path(), "a.txt", "mail: a@corp.io");
        write(dir.path(), "c/z.txt", "mail: z@corp.io");

        let first = scan(dir.path()).unwrap();
        let second = scan(dir.path()).unwrap();
        let order: Vec<_> = first.findings.iter().map(|f| f.matched.clone()).collect();
        assert_eq!(order, vec!["a@corp.io", "b@corp.io", "z@corp.io"]);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn custom_policy_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "notes.txt", "mail: ops@corp.io");
        write(dir.path(), "notes.cfg", "mail: ops@corp.io");

        let mut policy = ScanPolicy::default();
        policy.extensions.insert("cfg".to_string());
        let report = scan_tree(
            dir.path(),
            &DetectorRegistry::with_defaults(),
            &SuppressionFilter::default(),
            &policy,
        )
        .unwrap();
        assert_eq!(report.findings.len(), 2);
    }
}
