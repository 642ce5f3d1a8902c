pub mod config;
pub mod error;
pub mod logging;
pub mod petstore;
pub mod report;
pub mod test_context;
pub mod test_events;
pub mod test_suite;
pub mod test_unit;

use std::rc::Rc;

use anyhow::Result;

pub use crate::config::Config;
pub use crate::error::{ConfigError, RunnerError};
pub use crate::report::RunReport;
pub use crate::test_suite::{run, TestSuite};
pub use crate::test_unit::{TestOutcome, TestResult, TestUnit};

/// Assembles the pet store suite selected by `config` and runs it.
pub fn exec(config: &Config) -> Result<RunReport> {
    let ctx = Rc::new(test_context::TestCtx::new(config)?);
    let units = petstore::build_units(config, &ctx)?;
    let suite = TestSuite::new(units)?.show_progress(config.progress);
    Ok(suite.run())
}
