//! Two-phase build plan.
//!
//! The configuration phase works on a [`DraftGraph`]: declared dependencies
//! are rewritten, publications are prepared and publish tasks are wired.
//! [`DraftGraph::freeze`] ends that phase and yields a [`FrozenGraph`], the
//! only type the execution phase accepts.

mod draft;
mod frozen;
mod task;
mod types;

use thiserror::Error;

pub use draft::DraftGraph;
pub use frozen::FrozenGraph;
pub use task::{Task, TaskId, TaskKind, publish_task_prefix};
pub use types::{Configuration, Dependency, DependencyTarget, Exclusion};

#[derive(Debug, Error)]
pub enum GraphError {
  #[error("unknown task: {0}")]
  UnknownTask(TaskId),

  #[error("task dependency cycle detected")]
  CycleDetected,
}
