// test_suite.rs
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::RunnerError;
use crate::report::RunReport;
use crate::test_events::{TestEvent, TestSuiteBegin, TestSuiteEnd, TestUnitBegin, TestUnitEnd};
use crate::test_unit::{ProgressDisplay, TestOutcome, TestUnit};

/// Executes an ordered list of test units one after another.
///
/// Every unit produces exactly one outcome, in submission order, and a
/// failing unit never stops the run. The only error the suite reports is a
/// malformed unit, detected in [`TestSuite::new`] before anything executes.
pub struct TestSuite {
    test_units: Vec<TestUnit>,
    iteration_id: String,
    show_progress: bool,
    tx: Option<Sender<TestEvent>>,
}

impl TestSuite {
    pub fn new(test_units: Vec<TestUnit>) -> Result<Self, RunnerError> {
        validate(&test_units)?;
        Ok(TestSuite {
            test_units,
            iteration_id: Uuid::new_v4().to_string(),
            show_progress: false,
            tx: None,
        })
    }

    /// Same as [`TestSuite::new`], also returning the receiving end of the
    /// event channel. Dropping the receiver is fine; events are then discarded.
    pub fn with_listener(test_units: Vec<TestUnit>) -> Result<(Self, Receiver<TestEvent>), RunnerError> {
        let (tx, rx) = mpsc::channel();
        let mut suite = Self::new(test_units)?;
        suite.tx = Some(tx);
        Ok((suite, rx))
    }

    /// Enables the per-unit spinner.
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    pub fn iteration_id(&self) -> &str {
        &self.iteration_id
    }

    pub fn len(&self) -> usize {
        self.test_units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.test_units.is_empty()
    }

    pub fn run(self) -> RunReport {
        let TestSuite {
            test_units,
            iteration_id,
            show_progress,
            tx,
        } = self;

        let total = test_units.len();
        info!(iteration_id = %iteration_id, total, "running the test suite");
        fire(
            &tx,
            TestEvent::EvtTestSuiteBegin(TestSuiteBegin {
                timestamp: Instant::now(),
                iteration_id: iteration_id.clone(),
                total,
            }),
        );

        let start = Instant::now();
        let mut outcomes: Vec<TestOutcome> = Vec::with_capacity(total);

        for (index, unit) in test_units.into_iter().enumerate() {
            let unit_name = unit.name().to_owned();
            debug!(index, unit = %unit_name, "running test unit");
            fire(
                &tx,
                TestEvent::EvtTestUnitBegin(TestUnitBegin {
                    timestamp: Instant::now(),
                    iteration_id: iteration_id.clone(),
                    index,
                    unit_name: unit_name.clone(),
                }),
            );

            let spinner = ProgressDisplay::start(&unit_name, show_progress);
            let outcome = unit.invoke();
            ProgressDisplay::stop(&spinner);

            match &outcome.detail {
                None => info!(unit = %outcome.name, elapsed = ?outcome.duration, "passed"),
                Some(detail) => warn!(unit = %outcome.name, elapsed = ?outcome.duration, error = %detail, "failed"),
            }

            fire(
                &tx,
                TestEvent::EvtTestUnitEnd(TestUnitEnd {
                    timestamp: Instant::now(),
                    iteration_id: iteration_id.clone(),
                    index,
                    unit_name,
                    exec_duration: outcome.duration,
                    status: outcome.status,
                    detail: outcome.detail.clone(),
                }),
            );
            outcomes.push(outcome);
        }

        let report = RunReport::new(iteration_id.clone(), outcomes, start.elapsed());
        info!(
            iteration_id = %iteration_id,
            passed = report.passed(),
            failed = report.failed(),
            "done running the test suite"
        );
        fire(
            &tx,
            TestEvent::EvtTestSuiteEnd(TestSuiteEnd {
                timestamp: Instant::now(),
                iteration_id,
                exec_duration: report.exec_duration(),
                passed: report.passed(),
                failed: report.failed(),
            }),
        );
        report
    }
}

/// Runs the given units in order and returns the report.
pub fn run(test_units: Vec<TestUnit>) -> Result<RunReport, RunnerError> {
    Ok(TestSuite::new(test_units)?.run())
}

fn validate(test_units: &[TestUnit]) -> Result<(), RunnerError> {
    for (index, unit) in test_units.iter().enumerate() {
        if unit.name().trim().is_empty() {
            return Err(RunnerError::Configuration {
                index,
                reason: String::from("test unit name must not be empty"),
            });
        }
    }
    Ok(())
}

fn fire(tx: &Option<Sender<TestEvent>>, event: TestEvent) {
    if let Some(tx) = tx {
        // A dropped listener only means nobody is interested any more.
        let _ = tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_unit::TestResult;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_unit(name: &str, log: &Rc<RefCell<Vec<String>>>, fail: bool) -> TestUnit {
        let log = Rc::clone(log);
        let owned = name.to_owned();
        TestUnit::new(name, move || {
            log.borrow_mut().push(owned.clone());
            if fail {
                Err(anyhow!("{} failed", owned))
            } else {
                Ok(())
            }
        })
    }

    #[test]
    fn test_mixed_outcomes_scenario() {
        let units = vec![
            TestUnit::new("A", || Ok(())),
            TestUnit::new("B", || Err(anyhow!("bad id"))),
            TestUnit::new("C", || Ok(())),
        ];
        let report = run(units).unwrap();

        let summary: Vec<(&str, TestResult, Option<&str>)> = report
            .outcomes()
            .iter()
            .map(|o| (o.name.as_str(), o.status, o.detail.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("A", TestResult::Passed, None),
                ("B", TestResult::Failed, Some("bad id")),
                ("C", TestResult::Passed, None),
            ]
        );
        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn test_empty_run() {
        let report = run(Vec::new()).unwrap();
        assert!(report.outcomes().is_empty());
        assert_eq!((report.passed(), report.failed(), report.total()), (0, 0, 0));
    }

    #[test]
    fn test_empty_name_fails_before_any_unit_runs() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let units = vec![recording_unit("first", &log, false), recording_unit("", &log, false)];
        let err = run(units).unwrap_err();
        match err {
            RunnerError::Configuration { index, .. } => assert_eq!(index, 1),
        }
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_whitespace_name_is_rejected() {
        let units = vec![TestUnit::new("   ", || Ok(()))];
        assert!(TestSuite::new(units).is_err());
    }

    #[test]
    fn test_failures_do_not_stop_later_units() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let units = vec![
            recording_unit("one", &log, true),
            recording_unit("two", &log, true),
            recording_unit("three", &log, false),
            recording_unit("four", &log, true),
        ];
        let report = run(units).unwrap();

        assert_eq!(*log.borrow(), vec!["one", "two", "three", "four"]);
        let names: Vec<&str> = report.outcomes().iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two", "three", "four"]);
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 3);
        for failure in report.failures() {
            assert!(!failure.detail.as_deref().unwrap_or_default().is_empty());
        }
    }

    #[test]
    fn test_panicking_unit_is_recorded_and_run_continues() {
        let units = vec![
            TestUnit::new("panics", || panic!("assertion failed")),
            TestUnit::new("after", || Ok(())),
        ];
        let report = run(units).unwrap();
        assert_eq!(report.outcomes()[0].status, TestResult::Failed);
        assert_eq!(report.outcomes()[1].status, TestResult::Passed);
    }

    #[test]
    fn test_duplicate_names_are_allowed() {
        let units = vec![TestUnit::new("same", || Ok(())), TestUnit::new("same", || Ok(()))];
        let report = run(units).unwrap();
        assert_eq!(report.total(), 2);
    }

    #[test]
    fn test_events_follow_submission_order() {
        let units = vec![TestUnit::new("A", || Ok(())), TestUnit::new("B", || Err(anyhow!("nope")))];
        let (suite, listener) = TestSuite::with_listener(units).unwrap();
        let iteration_id = suite.iteration_id().to_owned();
        assert_eq!(suite.len(), 2);
        let report = suite.run();
        assert_eq!(report.iteration_id(), iteration_id);

        let events: Vec<TestEvent> = listener.try_iter().collect();
        assert_eq!(events.len(), 6);
        assert!(matches!(&events[0], TestEvent::EvtTestSuiteBegin(e) if e.total == 2));
        assert!(matches!(&events[1], TestEvent::EvtTestUnitBegin(e) if e.unit_name == "A" && e.index == 0));
        assert!(matches!(&events[2], TestEvent::EvtTestUnitEnd(e) if e.status == TestResult::Passed));
        assert!(matches!(&events[3], TestEvent::EvtTestUnitBegin(e) if e.unit_name == "B" && e.index == 1));
        assert!(
            matches!(&events[4], TestEvent::EvtTestUnitEnd(e) if e.status == TestResult::Failed && e.detail.as_deref() == Some("nope"))
        );
        assert!(matches!(&events[5], TestEvent::EvtTestSuiteEnd(e) if e.passed == 1 && e.failed == 1));
    }

    #[test]
    fn test_dropped_listener_does_not_break_the_run() {
        let units = vec![TestUnit::new("A", || Ok(()))];
        let (suite, listener) = TestSuite::with_listener(units).unwrap();
        drop(listener);
        let report = suite.show_progress(false).run();
        assert!(report.all_passed());
    }
}
