//! Per-invocation build context.
//!
//! Everything the engine decides on is computed once here: the
//! configuration, the module registry, the workspace classification and the
//! artifact store snapshot. The context is immutable afterwards and is
//! passed by reference into the configuration phase.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::classify::{WorkspaceClassification, classify};
use crate::config::AcceleratorConfig;
use crate::manifest::{ManifestError, WorkspaceManifest};
use crate::registry::{ModuleRegistry, RegistryError};
use crate::store::ArtifactStore;

#[derive(Debug, Error)]
pub enum ContextError {
  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error(transparent)]
  Registry(#[from] RegistryError),
}

#[derive(Debug, Clone)]
pub struct BuildContext {
  config: AcceleratorConfig,
  registry: ModuleRegistry,
  classification: WorkspaceClassification,
  store: ArtifactStore,
}

impl BuildContext {
  /// Load configuration, declarations and the store snapshot of a workspace.
  ///
  /// Only invalid declarations are errors. Configuration problems disable the
  /// engine and an unreadable store is treated as empty.
  pub fn load(root: &Path) -> Result<Self, ContextError> {
    let root = dunce::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    let config = AcceleratorConfig::load(&root);
    let manifest = WorkspaceManifest::load(&root)?;
    let registry = ModuleRegistry::from_manifest(&root, &manifest)?;

    let store = if config.enabled {
      let store_root = config.store_root();
      ArtifactStore::scan(&store_root, &registry.publishing().extension).unwrap_or_else(|e| {
        warn!(error = %e, "artifact store unreadable, treating as empty");
        ArtifactStore::from_artifacts(&store_root, Vec::new())
      })
    } else {
      ArtifactStore::from_artifacts(&config.store_root(), Vec::new())
    };

    Ok(Self::new(config, registry, store))
  }

  /// Assemble a context from parts. The store must already be scanned.
  pub fn new(config: AcceleratorConfig, registry: ModuleRegistry, store: ArtifactStore) -> Self {
    let classification = if config.enabled {
      classify(&registry, &config)
    } else {
      info!("accelerator disabled, building every module from source");
      WorkspaceClassification::default()
    };

    Self {
      config,
      registry,
      classification,
      store,
    }
  }

  pub fn is_enabled(&self) -> bool {
    self.config.enabled
  }

  pub fn root(&self) -> &Path {
    self.registry.root()
  }

  pub fn config(&self) -> &AcceleratorConfig {
    &self.config
  }

  pub fn registry(&self) -> &ModuleRegistry {
    &self.registry
  }

  pub fn classification(&self) -> &WorkspaceClassification {
    &self.classification
  }

  pub fn store(&self) -> &ArtifactStore {
    &self.store
  }

  pub fn store_root(&self) -> PathBuf {
    self.store.root().to_path_buf()
  }
}
