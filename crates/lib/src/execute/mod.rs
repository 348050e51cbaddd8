//! Execution phase.
//!
//! Runs the tasks of a [`FrozenGraph`] wave by wave. Tasks of one wave run
//! in parallel up to [`ExecuteConfig::parallelism`]. A failed task causes
//! every task depending on it, directly or transitively, to be skipped;
//! independent tasks still run.

mod assemble;
mod types;

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::context::BuildContext;
use crate::graph::{FrozenGraph, TaskId, TaskKind};
use crate::publish::{Publication, PublicationKey, Repository, publish};
use crate::registry::{Module, Variant};
use crate::timings::{BuildListener, StepOutcome};

pub use assemble::assemble;
pub use types::{ExecuteConfig, ExecuteError, ExecutionResult, TaskOutput};

/// Everything a spawned task needs, owned.
enum Step {
  Assemble {
    root: PathBuf,
    module: Module,
    variant: Variant,
    extension: String,
  },
  Publish {
    publication: Publication,
    repository: Repository,
  },
}

impl Step {
  async fn run(self) -> Result<TaskOutput, ExecuteError> {
    match self {
      Step::Assemble {
        root,
        module,
        variant,
        extension,
      } => assemble(&root, &module, &variant, &extension)
        .await
        .map(TaskOutput::Assembled),
      Step::Publish {
        publication,
        repository,
      } => Ok(TaskOutput::Published(publish(&publication, repository).await?)),
    }
  }
}

/// Execute every task of `graph`.
pub async fn execute(
  ctx: &BuildContext,
  graph: &FrozenGraph,
  config: &ExecuteConfig,
  listener: Arc<dyn BuildListener>,
) -> ExecutionResult {
  info!(
    task_count = graph.task_count(),
    wave_count = graph.waves().len(),
    "starting execution"
  );

  let mut result = ExecutionResult::default();
  let mut failed: HashSet<TaskId> = HashSet::new();
  let semaphore = Arc::new(Semaphore::new(config.parallelism.max(1)));

  for (wave_idx, wave) in graph.waves().iter().enumerate() {
    debug!(wave = wave_idx, tasks = wave.len(), "executing wave");

    let mut ready = Vec::new();
    for id in wave {
      if let Some(dep) = graph.task_dependencies(id).into_iter().find(|d| failed.contains(d)) {
        warn!(task = %id, failed_dep = %dep, "skipping task due to failed dependency");
        failed.insert(id.clone());
        result.skipped.insert(id.clone(), dep);
        continue;
      }

      let Some(task) = graph.task(id) else {
        continue;
      };
      if !task.enabled {
        debug!(task = %id, "task disabled");
        result.completed.insert(id.clone(), TaskOutput::Disabled);
        continue;
      }

      match step_for(ctx, graph, id, &task.kind) {
        Ok(step) => ready.push((id.clone(), step)),
        Err(e) => {
          error!(task = %id, error = %e, "task failed");
          failed.insert(id.clone());
          result.failed.insert(id.clone(), e);
        }
      }
    }

    for (id, outcome) in execute_wave(ready, semaphore.clone(), listener.clone()).await {
      match outcome {
        Ok(output) => {
          info!(task = %id, "task succeeded");
          result.completed.insert(id, output);
        }
        Err(e) => {
          error!(task = %id, error = %e, "task failed");
          failed.insert(id.clone());
          result.failed.insert(id, e);
        }
      }
    }
  }

  info!(
    completed = result.completed.len(),
    failed = result.failed.len(),
    skipped = result.skipped.len(),
    "execution complete"
  );

  result
}

fn step_for(ctx: &BuildContext, graph: &FrozenGraph, id: &TaskId, kind: &TaskKind) -> Result<Step, ExecuteError> {
  match kind {
    TaskKind::Assemble { module, variant } => {
      let module = ctx
        .registry()
        .get(module)
        .ok_or_else(|| ExecuteError::ModuleNotFound(module.clone()))?;
      Ok(Step::Assemble {
        root: ctx.root().to_path_buf(),
        module: module.clone(),
        variant: variant.clone(),
        extension: ctx.registry().publishing().extension.clone(),
      })
    }
    TaskKind::Publish {
      module,
      variant,
      repository,
    } => {
      let key = PublicationKey {
        module: module.clone(),
        variant: variant.clone(),
      };
      let publication = graph
        .publication(&key)
        .ok_or_else(|| ExecuteError::PublicationNotFound(id.clone()))?;
      Ok(Step::Publish {
        publication: publication.clone(),
        repository: *repository,
      })
    }
  }
}

async fn execute_wave(
  steps: Vec<(TaskId, Step)>,
  semaphore: Arc<Semaphore>,
  listener: Arc<dyn BuildListener>,
) -> Vec<(TaskId, Result<TaskOutput, ExecuteError>)> {
  let mut join_set = JoinSet::new();
  let mut spawned = HashMap::new();

  for (id, step) in steps {
    let semaphore = semaphore.clone();
    let listener = listener.clone();
    let task_id = id.clone();

    let handle = join_set.spawn(async move {
      let _permit = semaphore.acquire_owned().await;
      listener.on_step_start(&id);
      let outcome = step.run().await;
      let step_outcome = match &outcome {
        Ok(output) => output.step_outcome(),
        Err(_) => StepOutcome::Failed,
      };
      listener.on_step_end(&id, step_outcome);
      (id, outcome)
    });
    spawned.insert(handle.id(), task_id);
  }

  let mut results = Vec::new();
  while let Some(joined) = join_set.join_next().await {
    match joined {
      Ok(result) => results.push(result),
      Err(e) => match spawned.remove(&e.id()) {
        Some(id) => results.push((id, Err(ExecuteError::Panicked(e.to_string())))),
        None => error!(error = %e, "unknown task panicked"),
      },
    }
  }
  results
}
