pub mod data;
pub mod progress;

pub use data::*;
pub use progress::*;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// The invocable part of a unit. Per-test parameters are captured by the
/// closure when the suite is assembled.
pub type TestAction = Box<dyn FnOnce() -> anyhow::Result<()>>;

/// One independently executed test action with a name.
pub struct TestUnit {
    name: String,
    action: TestAction,
}

impl TestUnit {
    pub fn new<F>(name: impl Into<String>, action: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<()> + 'static,
    {
        TestUnit {
            name: name.into(),
            action: Box::new(action),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the action once and converts whatever happens into an outcome.
    /// Errors and panics both become `Failed`; nothing escapes.
    pub fn invoke(self) -> TestOutcome {
        let TestUnit { name, action } = self;
        let start = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(action));
        let duration = start.elapsed();

        match result {
            Ok(Ok(())) => TestOutcome::passed(name, duration),
            // {:#} renders the whole context chain on one line.
            Ok(Err(err)) => TestOutcome::failed(name, format!("{:#}", err), duration),
            Err(payload) => {
                TestOutcome::failed(name, format!("panicked: {}", panic_message(&*payload)), duration)
            }
        }
    }
}

impl std::fmt::Debug for TestUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestUnit").field("name", &self.name).finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("non-string panic payload")
    }
}
