use colored::Colorize;
use std::time::Duration;

use crate::test_unit::{TestOutcome, TestResult};

/// Ordered outcomes of one run plus the aggregate tally.
#[derive(Debug, Clone)]
pub struct RunReport {
    iteration_id: String,
    outcomes: Vec<TestOutcome>,
    passed: usize,
    failed: usize,
    exec_duration: Duration,
}

impl RunReport {
    pub fn new(iteration_id: impl Into<String>, outcomes: Vec<TestOutcome>, exec_duration: Duration) -> Self {
        let passed = outcomes.iter().filter(|o| o.is_passed()).count();
        let failed = outcomes.len() - passed;
        RunReport {
            iteration_id: iteration_id.into(),
            outcomes,
            passed,
            failed,
            exec_duration,
        }
    }

    pub fn iteration_id(&self) -> &str {
        &self.iteration_id
    }

    pub fn outcomes(&self) -> &[TestOutcome] {
        &self.outcomes
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn exec_duration(&self) -> Duration {
        self.exec_duration
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestOutcome> {
        self.outcomes.iter().filter(|o| !o.is_passed())
    }

    /// Prints every outcome followed by the summary line.
    pub fn print(&self, verbose: bool) {
        for (index, outcome) in self.outcomes.iter().enumerate() {
            print_outcome(index + 1, outcome, verbose);
            println!("------------------------------");
        }
        self.print_stats();
    }

    pub fn print_stats(&self) {
        let summary = format!(
            "Summary: {{ Total: {}, Passed: {}, Failed: {}, Duration: {:.2?} }}",
            self.total(),
            self.passed,
            self.failed,
            self.exec_duration
        );
        if self.all_passed() {
            println!("{}", summary.green());
        } else {
            println!("{}", summary.red());
        }
    }
}

fn print_outcome(position: usize, outcome: &TestOutcome, verbose: bool) {
    println!("{:<15}: {}", "Test #", position);
    println!("{:<15}: {}", "Test Case", outcome.name);
    if verbose {
        println!("{:<15}: {:.2?}", "Duration", outcome.duration);
    }
    match outcome.status {
        TestResult::Passed => println!("{:<15}: {}", "Result", "✅ PASSED".green()),
        TestResult::Failed => {
            println!("{:<15}: {}", "Result", "❌ FAILED".red());
            if let Some(detail) = &outcome.detail {
                println!("{:<15}: {}", "Error", detail.yellow());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_outcomes() -> Vec<TestOutcome> {
        vec![
            TestOutcome::passed("a", Duration::ZERO),
            TestOutcome::failed("b", "bad id", Duration::ZERO),
            TestOutcome::passed("c", Duration::ZERO),
        ]
    }

    #[test]
    fn test_counts_match_outcomes() {
        let report = RunReport::new("run-1", sample_outcomes(), Duration::from_secs(1));
        assert_eq!(report.total(), 3);
        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.passed() + report.failed(), report.total());
        assert!(!report.all_passed());
        assert_eq!(report.iteration_id(), "run-1");
    }

    #[test]
    fn test_failures_iterates_failed_only() {
        let report = RunReport::new("run-1", sample_outcomes(), Duration::ZERO);
        let names: Vec<&str> = report.failures().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn test_empty_report() {
        let report = RunReport::new("run-1", Vec::new(), Duration::ZERO);
        assert_eq!(report.total(), 0);
        assert_eq!(report.passed(), 0);
        assert_eq!(report.failed(), 0);
        assert!(report.all_passed());
        report.print(true);
    }
}
