use tracing::trace;

use super::{Detector, DetectorValidationError, Span};

/// Ordered, pluggable table of detectors.
///
/// Iteration order is insertion order and nothing else, so repeated runs
/// over identical input produce byte-identical reports. Callers may start
/// from [`DetectorRegistry::with_defaults`] or build their own set; the
/// pipeline never special-cases individual detectors.
#[derive(Debug, Clone, Default)]
pub struct DetectorRegistry {
    detectors: Vec<Detector>,
}

/// One raw detector hit on a line, before suppression filtering.
#[derive(Debug, Clone, Copy)]
pub struct RawMatch<'r, 'l> {
    pub detector: &'r Detector,
    pub text: &'l str,
    pub span: Span,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the default personal-data detector set.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for &(name, pattern, severity, citation, description) in DEFAULT_DETECTORS {
            let detector = Detector::new(name, pattern, severity, citation, description)
                .expect("default detector table must be valid");
            registry
                .push(detector)
                .expect("default detector names are unique");
        }
        registry
    }

    /// Append a detector, rejecting duplicate names.
    pub fn push(&mut self, detector: Detector) -> Result<(), DetectorValidationError> {
        if self.detectors.iter().any(|d| d.name() == detector.name()) {
            return Err(DetectorValidationError::DuplicateName(
                detector.name().to_string(),
            ));
        }
        self.detectors.push(detector);
        Ok(())
    }

    /// Remove a detector by name; returns whether one was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.detectors.len();
        self.detectors.retain(|d| d.name() != name);
        self.detectors.len() != before
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Detector> {
        self.detectors.iter()
    }

    /// All detector hits on one line: detectors in insertion order, matches
    /// per detector left to right, every occurrence reported.
    pub fn matches_in<'r, 'l>(&'r self, line: &'l str) -> Vec<RawMatch<'r, 'l>> {
        let mut matches = Vec::new();
        for detector in &self.detectors {
            for hit in detector.pattern().find_iter(line) {
                trace!(detector = detector.name(), start = hit.start(), "raw match");
                matches.push(RawMatch {
                    detector,
                    text: hit.as_str(),
                    span: (hit.start(), hit.end()),
                });
            }
        }
        matches
    }
}

/// Default detector table: (name, pattern, severity, citation, description).
/// Patterns are deliberately broad; precision is traded for recall and the
/// report guidance says so.
const DEFAULT_DETECTORS: &[(&str, &str, &str, &str, &str)] = &[
    (
        "email",
        r"\b[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}\b",
        "high",
        "Art. 4(1)",
        "Email address (direct identifier)",
    ),
    (
        "ssn_us",
        r"\b\d{3}-\d{2}-\d{4}\b",
        "critical",
        "Art. 4(1)",
        "US Social Security Number",
    ),
    (
        "credit_card",
        r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b",
        "critical",
        "Art. 4(1)",
        "Credit card number",
    ),
    (
        "phone",
        r"\b(\+\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b",
        "high",
        "Art. 4(1)",
        "Phone number",
    ),
    (
        "ip_address",
        r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b",
        "medium",
        "Art. 4(1)",
        "IP address (indirect identifier)",
    ),
    (
        "uuid",
        r"\b[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\b",
        "low",
        "Art. 4(1)",
        "UUID (potential user identifier)",
    ),
    (
        "postal_code_us",
        r"\b\d{5}(-\d{4})?\b",
        "low",
        "Art. 4(1)",
        "US postal code",
    ),
];
