//! Types for plan execution.

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::graph::TaskId;
use crate::publish::{PublishError, PublishOutcome};
use crate::registry::ModulePath;
use crate::timings::StepOutcome;

/// Errors that can occur while running a task.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// Assemble command exited unsuccessfully.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Publish(#[from] PublishError),

  #[error("module not found: {0}")]
  ModuleNotFound(ModulePath),

  #[error("no publication for task {0}")]
  PublicationNotFound(TaskId),

  #[error("task panicked: {0}")]
  Panicked(String),
}

/// Execution configuration.
#[derive(Debug, Clone)]
pub struct ExecuteConfig {
  /// Maximum number of tasks running at once.
  pub parallelism: usize,
}

impl Default for ExecuteConfig {
  fn default() -> Self {
    Self {
      parallelism: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4),
    }
  }
}

/// What a completed task produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutput {
  /// Expected output location of the assembled variant.
  Assembled(PathBuf),
  Published(PublishOutcome),
  /// The task belongs to a module served by artifacts and was not run.
  Disabled,
}

impl TaskOutput {
  pub fn step_outcome(&self) -> StepOutcome {
    match self {
      TaskOutput::Assembled(_) | TaskOutput::Published(PublishOutcome::Published(_)) => StepOutcome::Succeeded,
      TaskOutput::Published(_) | TaskOutput::Disabled => StepOutcome::Skipped,
    }
  }
}

/// Result of executing a frozen plan.
#[derive(Debug, Default)]
pub struct ExecutionResult {
  pub completed: BTreeMap<TaskId, TaskOutput>,
  pub failed: BTreeMap<TaskId, ExecuteError>,
  /// Skipped task -> the failed or skipped dependency that caused it.
  pub skipped: BTreeMap<TaskId, TaskId>,
}

impl ExecutionResult {
  pub fn is_success(&self) -> bool {
    self.failed.is_empty() && self.skipped.is_empty()
  }

  /// Paths written to any repository.
  pub fn published(&self) -> Vec<&PathBuf> {
    self
      .completed
      .values()
      .filter_map(|o| match o {
        TaskOutput::Published(PublishOutcome::Published(path)) => Some(path),
        _ => None,
      })
      .collect()
  }
}
