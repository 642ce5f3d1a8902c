use std::time::Duration;

/// Possible test unit results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestResult {
    Passed,
    Failed,
}

impl TestResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestResult::Passed => "PASSED",
            TestResult::Failed => "FAILED",
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, TestResult::Passed)
    }
}

impl std::fmt::Display for TestResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The recorded result of executing one test unit.
#[derive(Debug, Clone, PartialEq)]
pub struct TestOutcome {
    pub name: String,             // name of the unit this outcome belongs to.
    pub status: TestResult,       // passed or failed.
    pub detail: Option<String>,   // failure description, only set when failed.
    pub duration: Duration,       // wall time spent inside the action.
}

impl TestOutcome {
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        TestOutcome {
            name: name.into(),
            status: TestResult::Passed,
            detail: None,
            duration,
        }
    }

    /// Builds a failed outcome. An empty detail is replaced so that every
    /// failure carries something to diagnose.
    pub fn failed(name: impl Into<String>, detail: impl Into<String>, duration: Duration) -> Self {
        let detail = detail.into();
        let detail = if detail.trim().is_empty() {
            String::from("unit failed without an error message")
        } else {
            detail
        };
        TestOutcome {
            name: name.into(),
            status: TestResult::Failed,
            detail: Some(detail),
            duration,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status.is_passed()
    }
}
