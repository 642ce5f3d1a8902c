use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

// The spinner currently drawing, if any. Log output is routed around it.
static ACTIVE: Mutex<Option<ProgressBar>> = Mutex::new(None);

/// Spinner shown while a test unit is executing.
pub struct ProgressDisplay;

impl ProgressDisplay {
    /// Starts a spinner labelled with the unit name. Returns a hidden bar
    /// when progress display is turned off, so callers can stop it either way.
    pub fn start(unit_name: &str, enabled: bool) -> ProgressBar {
        if !enabled {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
            pb.set_style(style);
        }
        pb.set_message(format!("Running {}...", unit_name));
        pb.enable_steady_tick(Duration::from_millis(100));
        set_active(Some(pb.clone()));
        pb
    }

    /// Stops the spinner and clears it from the terminal.
    pub fn stop(pb: &ProgressBar) {
        set_active(None);
        pb.disable_steady_tick();
        pb.finish_and_clear();
    }
}

fn set_active(pb: Option<ProgressBar>) {
    if let Ok(mut active) = ACTIVE.lock() {
        *active = pb;
    }
}

/// Runs `f` with the active spinner hidden, so whatever `f` prints does not
/// interleave with the spinner line. Without a spinner `f` just runs.
pub fn suspend_progress<R>(f: impl FnOnce() -> R) -> R {
    let active = ACTIVE.lock().ok().and_then(|active| active.clone());
    match active {
        Some(pb) => pb.suspend(f),
        None => f(),
    }
}

/// Returns at most the first `n` lines of `text`, joined with newlines.
/// Used to keep response bodies readable in the logs.
pub fn first_n_lines(text: &str, n: usize) -> String {
    text.lines().take(n).collect::<Vec<_>>().join("\n")
}
