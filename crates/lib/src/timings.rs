//! Per-step wall-clock timings.
//!
//! [`StepTimings`] is the [`BuildListener`] installed by default. It only
//! observes; the executor never reads anything back from it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::graph::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepOutcome {
  Succeeded,
  Failed,
  Skipped,
}

impl fmt::Display for StepOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StepOutcome::Succeeded => write!(f, "succeeded"),
      StepOutcome::Failed => write!(f, "failed"),
      StepOutcome::Skipped => write!(f, "skipped"),
    }
  }
}

/// Hooks called by the executor around every step it runs.
pub trait BuildListener: Send + Sync {
  fn on_step_start(&self, step: &TaskId);
  fn on_step_end(&self, step: &TaskId, outcome: StepOutcome);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepTiming {
  pub step: TaskId,
  pub outcome: StepOutcome,
  pub duration: Duration,
}

/// Timings of every step that ended, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimingReport {
  pub steps: Vec<StepTiming>,
}

impl TimingReport {
  pub fn total(&self) -> Duration {
    self.steps.iter().map(|s| s.duration).sum()
  }

  pub fn get(&self, step: &TaskId) -> Option<&StepTiming> {
    self.steps.iter().find(|s| &s.step == step)
  }
}

impl fmt::Display for TimingReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for timing in &self.steps {
      writeln!(f, "{:>8}ms  {}", timing.duration.as_millis(), timing.step)?;
    }
    Ok(())
  }
}

#[derive(Debug, Default)]
struct State {
  started: HashMap<TaskId, Instant>,
  finished: Vec<StepTiming>,
}

#[derive(Debug, Default)]
pub struct StepTimings {
  state: Mutex<State>,
}

impl StepTimings {
  pub fn new() -> Self {
    Self::default()
  }

  /// Produce the report. Steps that started but never ended are left out.
  pub fn on_build_finished(&self) -> TimingReport {
    let mut state = self.lock();
    if !state.started.is_empty() {
      debug!(unfinished = state.started.len(), "steps without an end event");
      state.started.clear();
    }

    let steps = std::mem::take(&mut state.finished);
    for timing in &steps {
      info!(step = %timing.step, outcome = %timing.outcome, elapsed_ms = timing.duration.as_millis() as u64, "step timing");
    }
    TimingReport { steps }
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, State> {
    self.state.lock().unwrap_or_else(|e| e.into_inner())
  }
}

impl BuildListener for StepTimings {
  fn on_step_start(&self, step: &TaskId) {
    self.lock().started.insert(step.clone(), Instant::now());
  }

  fn on_step_end(&self, step: &TaskId, outcome: StepOutcome) {
    let mut state = self.lock();
    let Some(start) = state.started.remove(step) else {
      debug!(step = %step, "end event without start, ignoring");
      return;
    };
    state.finished.push(StepTiming {
      step: step.clone(),
      outcome,
      duration: start.elapsed(),
    });
  }
}
