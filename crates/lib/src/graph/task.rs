use std::fmt;

use serde::Serialize;

use crate::publish::Repository;
use crate::registry::{ModulePath, Variant};

/// Identity of a build step: `<module path>:<task name>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
  pub fn new(module: &ModulePath, name: &str) -> Self {
    Self(format!("{}:{}", module, name))
  }

  pub fn assemble(module: &ModulePath, variant: &Variant) -> Self {
    Self::new(module, &format!("assemble{}", variant.capitalized()))
  }

  pub fn publish(module: &ModulePath, variant: &Variant, repository: Repository) -> Self {
    Self::new(
      module,
      &format!("{}{}", publish_task_prefix(variant), repository.task_suffix()),
    )
  }

  /// Task name without the module path.
  pub fn name(&self) -> &str {
    self.0.rsplit(':').next().unwrap_or(&self.0)
  }
}

impl fmt::Display for TaskId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Every publish task of `variant` has a name starting with this prefix.
pub fn publish_task_prefix(variant: &Variant) -> String {
  format!("publish{}PublicationTo", variant.capitalized())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TaskKind {
  Assemble { module: ModulePath, variant: Variant },
  Publish {
    module: ModulePath,
    variant: Variant,
    repository: Repository,
  },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
  pub id: TaskId,
  pub kind: TaskKind,
  /// Disabled tasks stay in the graph but are skipped at execution.
  pub enabled: bool,
}

impl Task {
  pub fn assemble(module: &ModulePath, variant: &Variant) -> Self {
    Self {
      id: TaskId::assemble(module, variant),
      kind: TaskKind::Assemble {
        module: module.clone(),
        variant: variant.clone(),
      },
      enabled: true,
    }
  }

  pub fn publish(module: &ModulePath, variant: &Variant, repository: Repository) -> Self {
    Self {
      id: TaskId::publish(module, variant, repository),
      kind: TaskKind::Publish {
        module: module.clone(),
        variant: variant.clone(),
        repository,
      },
      enabled: true,
    }
  }

  pub fn module(&self) -> &ModulePath {
    match self.kind {
      TaskKind::Assemble { ref module, .. } | TaskKind::Publish { ref module, .. } => module,
    }
  }
}
