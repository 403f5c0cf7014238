//! Check outcomes and the report that collects them.

use serde::Serialize;

/// Outcome class of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Holds.
    Pass,
    /// Suspicious but not blocking.
    Warning,
    /// Broken; the suite does not pass.
    Failure,
}

impl Severity {
    /// Tag printed by the text report.
    pub const fn label(self) -> &'static str {
        match self {
            Severity::Pass => "PASS",
            Severity::Warning => "WARN",
            Severity::Failure => "FAIL",
        }
    }
}

/// One check outcome, named `<artifact>/<check>`.
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    /// Which check produced this.
    pub validator: String,
    /// One-line summary.
    pub message: String,
    /// Outcome.
    pub severity: Severity,
    /// Offending items, when there are any worth listing.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl TestResult {
    /// Outcome with no details.
    pub fn new(
        severity: Severity,
        validator: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            validator: validator.into(),
            message: message.into(),
            severity,
            details: Vec::new(),
        }
    }

    /// Passing outcome.
    pub fn pass(validator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Pass, validator, message)
    }

    /// Warning outcome.
    pub fn warn(validator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, validator, message)
    }

    /// Passes on `ok`, otherwise fails listing `details`.
    pub fn check(
        validator: impl Into<String>,
        ok: bool,
        message: impl Into<String>,
        details: Vec<String>,
    ) -> Self {
        if ok {
            Self::pass(validator, message)
        } else {
            Self::new(Severity::Failure, validator, message).with_details(details)
        }
    }

    /// Attaches detail lines.
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    /// True for [`Severity::Failure`].
    pub fn is_failure(&self) -> bool {
        self.severity == Severity::Failure
    }
}

/// Every outcome of a run, in the order the checks ran.
#[derive(Debug, Default, Serialize)]
pub struct ConformanceReport {
    /// The outcomes.
    pub results: Vec<TestResult>,
}

impl ConformanceReport {
    /// Empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one outcome.
    pub fn push(&mut self, result: TestResult) {
        self.results.push(result);
    }

    /// Number of outcomes with `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.results.iter().filter(|r| r.severity == severity).count()
    }

    /// Number of failures.
    pub fn failure_count(&self) -> usize {
        self.count(Severity::Failure)
    }

    /// Number of warnings.
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// No failures; warnings are allowed.
    pub fn all_passed(&self) -> bool {
        self.failure_count() == 0
    }
}

impl Extend<TestResult> for ConformanceReport {
    fn extend<I: IntoIterator<Item = TestResult>>(&mut self, iter: I) {
        self.results.extend(iter);
    }
}

impl IntoIterator for ConformanceReport {
    type Item = TestResult;
    type IntoIter = std::vec::IntoIter<TestResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl FromIterator<TestResult> for ConformanceReport {
    fn from_iter<I: IntoIterator<Item = TestResult>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}
