use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use tokio_util::sync::CancellationToken;

/// Lifecycle of a diagnostic run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Cancelling,
    Completed,
}

struct ActiveRun {
    cancel: CancellationToken,
    state: Arc<Mutex<RunState>>,
    handle: JoinHandle<()>,
}

/// Owner of the process-wide single-run invariant.
///
/// At most one run is active at a time: starting a new run first cancels
/// the previous one and waits for it to fully unwind, so no two runs'
/// resources ever overlap in time. Only `start`, `cancel`, `wait` and
/// `current_state` are exposed; the underlying thread handle never leaves
/// this module.
pub struct RunController {
    active: Option<ActiveRun>,
}

impl RunController {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// State of the most recent run, `Idle` when none is tracked.
    pub fn current_state(&self) -> RunState {
        match &self.active {
            Some(run) => run.state.lock().map(|state| *state).unwrap_or(RunState::Completed),
            None => RunState::Idle,
        }
    }

    /// Launch a run on a worker thread, replacing any active run.
    ///
    /// `cancel` is the token already wired into the run's components; the
    /// controller owns it from here on and triggers it on `cancel()` or on
    /// the next `start`.
    pub fn start<F>(&mut self, cancel: CancellationToken, run_fn: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let state = Arc::new(Mutex::new(RunState::Running));
        let run_state = Arc::clone(&state);
        let handle = thread::spawn(move || {
            run_fn();
            if let Ok(mut state) = run_state.lock() {
                *state = RunState::Completed;
            }
        });
        self.active = Some(ActiveRun {
            cancel,
            state,
            handle,
        });
    }

    /// Request cooperative cancellation and wait for the run to unwind.
    pub fn cancel(&mut self) {
        if let Some(run) = self.active.take() {
            if let Ok(mut state) = run.state.lock() {
                if *state == RunState::Running {
                    *state = RunState::Cancelling;
                }
            }
            run.cancel.cancel();
            let _ = run.handle.join();
        }
    }

    /// Block until the active run finishes on its own.
    pub fn wait(&mut self) {
        if let Some(run) = self.active.take() {
            let _ = run.handle.join();
        }
    }
}

impl Default for RunController {
    fn default() -> Self {
        Self::new()
    }
}
