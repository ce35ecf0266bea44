pub mod carbon;
pub mod report;
pub mod scanner;

use std::path::Path;

pub use report::{render_report, OutputFormat};
pub use scanner::{
    file_scanner::scan_file,
    registry::{DetectorRegistry, RawMatch},
    suppression::SuppressionFilter,
    walker::{scan_tree, validate_scan_root, ScanError, ScanPolicy},
    Detector, DetectorValidationError, Finding, ScanReport, Severity, SeverityCounts, Span,
};

/// Scan a directory tree with the default detector set, suppression filter,
/// and traversal policy.
pub fn scan(root: &Path) -> Result<ScanReport, ScanError> {
    let registry = DetectorRegistry::with_defaults();
    let filter = SuppressionFilter::default();
    let policy = ScanPolicy::default();
    scan_tree(root, &registry, &filter, &policy)
}
