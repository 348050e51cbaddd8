//! Artifact publishing.
//!
//! A publication packages one module variant's assembled output under
//! deterministic coordinates. Every publication goes to the local artifact
//! store, which later builds scan; modules with a remote repository
//! configured for their version kind also go there.
//!
//! Publish tasks always run after the assemble task of the same variant. A
//! publication whose assemble task does not exist is dropped from the plan.

mod execute;

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::context::BuildContext;
use crate::graph::{DraftGraph, GraphError, Task, TaskId, publish_task_prefix};
use crate::registry::{Coordinate, Module, ModulePath, ModuleSetting, Variant};
use crate::store::artifact_file_name;

pub use execute::{PublishOutcome, publish};

#[derive(Debug, Error)]
pub enum PublishError {
  #[error("module {0} has no module setting")]
  NoModuleSetting(ModulePath),

  #[error(transparent)]
  Graph(#[from] GraphError),

  #[error("failed to publish to {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Where a publication is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Repository {
  /// The artifact store scanned by later builds.
  LocalStore,
  Release,
  Snapshot,
}

impl Repository {
  pub fn task_suffix(self) -> &'static str {
    match self {
      Repository::LocalStore => "LocalStore",
      Repository::Release => "ReleaseRepository",
      Repository::Snapshot => "SnapshotRepository",
    }
  }
}

impl fmt::Display for Repository {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Repository::LocalStore => write!(f, "local store"),
      Repository::Release => write!(f, "release repository"),
      Repository::Snapshot => write!(f, "snapshot repository"),
    }
  }
}

/// Remote repository for a setting: snapshot for pre-release versions, release otherwise.
pub fn remote_repository_for(setting: &ModuleSetting) -> Repository {
  if setting.is_snapshot() {
    Repository::Snapshot
  } else {
    Repository::Release
  }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PublicationKey {
  pub module: ModulePath,
  pub variant: Variant,
}

impl fmt::Display for PublicationKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}[{}]", self.module, self.variant)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Publication {
  pub key: PublicationKey,
  /// Module component of the store file name.
  pub name: String,
  pub coordinate: Coordinate,
  /// Assembled output. Only checked when the publish task runs.
  pub output: PathBuf,
  /// Resolved file path per repository.
  pub destinations: Vec<(Repository, PathBuf)>,
}

impl Publication {
  pub fn destination(&self, repository: Repository) -> Option<&PathBuf> {
    self.destinations.iter().find(|(r, _)| *r == repository).map(|(_, p)| p)
  }
}

/// Result of wiring a publication to its assemble task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireOutcome {
  /// This many publish tasks now wait on the assemble task.
  Wired(usize),
  /// No assemble task: the publication and its tasks were removed.
  Skipped { removed: Vec<TaskId> },
}

pub struct Publisher<'a> {
  ctx: &'a BuildContext,
}

impl<'a> Publisher<'a> {
  pub fn new(ctx: &'a BuildContext) -> Self {
    Self { ctx }
  }

  /// Create the publication for `module`/`variant`, or return the existing one.
  ///
  /// Adds one publish task per destination repository.
  pub fn prepare_publication<'d>(
    &self,
    draft: &'d mut DraftGraph,
    module: &Module,
    variant: &Variant,
  ) -> Result<&'d Publication, PublishError> {
    let registry = self.ctx.registry();
    let setting = registry
      .setting_for(&module.path)
      .ok_or_else(|| PublishError::NoModuleSetting(module.path.clone()))?;

    let key = PublicationKey {
      module: module.path.clone(),
      variant: variant.clone(),
    };

    let publishing = registry.publishing();
    let extension = &publishing.extension;
    let coordinate = setting.coordinate(variant);

    let mut destinations = vec![(
      Repository::LocalStore,
      self
        .ctx
        .store_root()
        .join(artifact_file_name(&setting.name, variant, &setting.version, extension)),
    )];

    let remote = remote_repository_for(setting);
    let remote_root = match remote {
      Repository::Snapshot => publishing.snapshot_repo.as_ref(),
      _ => publishing.release_repo.as_ref(),
    };
    match remote_root {
      Some(root) => destinations.push((remote, maven_path(root, &coordinate, extension))),
      None => debug!(publication = %key, repository = %remote, "no repository configured"),
    }

    let publication = Publication {
      key: key.clone(),
      name: setting.name.clone(),
      coordinate,
      output: module.output_path(self.ctx.root(), variant, extension),
      destinations,
    };

    for (repository, _) in &publication.destinations {
      draft.add_task(Task::publish(&module.path, variant, *repository));
    }

    let (publication, created) = draft.insert_publication(publication);
    if created {
      info!(publication = %key, coordinate = %publication.coordinate, "created publication");
    } else {
      debug!(publication = %key, "reusing existing publication");
    }
    Ok(publication)
  }

  /// Make every publish task of `module`/`variant` wait for its assemble task.
  ///
  /// When the assemble task does not exist the publish tasks and the
  /// publication are removed instead.
  pub fn wire_assemble_dependency(
    &self,
    draft: &mut DraftGraph,
    module: &ModulePath,
    variant: &Variant,
  ) -> Result<WireOutcome, PublishError> {
    let prefix = publish_task_prefix(variant);
    let publish_tasks = draft.module_tasks_matching(module, |name| name.starts_with(&prefix));
    let assemble = TaskId::assemble(module, variant);

    if !draft.has_task(&assemble) {
      warn!(module = %module, variant = %variant, "no assemble task, skipping publication");
      for task in &publish_tasks {
        draft.remove_task(task);
      }
      draft.remove_publication(&PublicationKey {
        module: module.clone(),
        variant: variant.clone(),
      });
      return Ok(WireOutcome::Skipped { removed: publish_tasks });
    }

    for task in &publish_tasks {
      draft.add_task_dependency(task, &assemble)?;
      debug!(task = %task, depends_on = %assemble, "wired publish task");
    }

    Ok(WireOutcome::Wired(publish_tasks.len()))
  }
}

/// `<root>/<group as dirs>/<artifact>/<version>/<artifact>-<version>.<ext>`.
fn maven_path(root: &std::path::Path, coordinate: &Coordinate, extension: &str) -> PathBuf {
  let dir = coordinate
    .group
    .split('.')
    .fold(root.to_path_buf(), |acc, part| acc.join(part))
    .join(&coordinate.artifact)
    .join(&coordinate.version);
  dir.join(format!("{}-{}.{}", coordinate.artifact, coordinate.version, extension))
}
