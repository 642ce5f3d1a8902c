//
// Define test events.  Test events are fired by the runner
// whenever certain actions occur: when a run starts, when a
// unit starts, when a unit ends and when the run ends.
// Listeners receive them over an mpsc channel.
//
use std::time::{Duration, Instant};

use crate::test_unit::TestResult;

#[derive(Debug)]
pub struct TestSuiteBegin {
    pub timestamp: Instant,
    pub iteration_id: String,
    pub total: usize,
}

#[derive(Debug)]
pub struct TestSuiteEnd {
    pub timestamp: Instant,
    pub iteration_id: String,
    pub exec_duration: Duration,
    pub passed: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub struct TestUnitBegin {
    pub timestamp: Instant,
    pub iteration_id: String,
    pub index: usize,
    pub unit_name: String,
}

#[derive(Debug)]
pub struct TestUnitEnd {
    pub timestamp: Instant,
    pub iteration_id: String,
    pub index: usize,
    pub unit_name: String,
    pub exec_duration: Duration,
    pub status: TestResult,
    pub detail: Option<String>,
}

#[derive(Debug)]
pub enum TestEvent {
    EvtTestSuiteBegin(TestSuiteBegin),
    EvtTestSuiteEnd(TestSuiteEnd),
    EvtTestUnitBegin(TestUnitBegin),
    EvtTestUnitEnd(TestUnitEnd),
}
