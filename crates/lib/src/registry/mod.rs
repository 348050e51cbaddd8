//! Module registry.
//!
//! The registry is the static, validated view of every module in the
//! workspace. It is built once from the declaration file; module kinds are
//! decided here and never re-derived later.

mod types;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::consts::DEFAULT_OUTPUT_TEMPLATE;
use crate::manifest::WorkspaceManifest;

pub use types::*;

#[derive(Debug, Error)]
pub enum RegistryError {
  #[error("invalid module path: {0:?}")]
  InvalidPath(String),

  #[error("invalid variant name {0:?}: must be non-empty and must not contain '-'")]
  InvalidVariant(String),

  #[error("invalid coordinate {0:?}: expected group:artifact:version")]
  InvalidCoordinate(String),

  #[error("module {0} is declared more than once")]
  DuplicateModule(ModulePath),

  #[error("module {module} depends on undeclared module {dependency}")]
  UnknownDependency { module: ModulePath, dependency: ModulePath },

  #[error("module {module} depends on non-buildable module {dependency}")]
  UnbuildableDependency { module: ModulePath, dependency: ModulePath },
}

/// Where published artifacts go besides the local store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishingConfig {
  pub release_repo: Option<PathBuf>,
  pub snapshot_repo: Option<PathBuf>,
  pub extension: String,
}

#[derive(Debug, Clone)]
pub struct ModuleRegistry {
  root: PathBuf,
  modules: BTreeMap<ModulePath, Module>,
  settings: BTreeMap<String, ModuleSetting>,
  publishing: PublishingConfig,
}

impl ModuleRegistry {
  /// Validate declarations and build the registry.
  ///
  /// Grouping parents implied by nested paths are added as
  /// [`ModuleKind::Unbuildable`] modules.
  pub fn from_manifest(root: &Path, manifest: &WorkspaceManifest) -> Result<Self, RegistryError> {
    let mut modules = BTreeMap::new();

    for decl in &manifest.modules {
      let path = ModulePath::parse(&decl.path)?;
      let dependencies = decl
        .dependencies
        .iter()
        .map(|d| DeclaredDependency::parse(d))
        .collect::<Result<Vec<_>, _>>()?;

      let variants = decl
        .variants
        .iter()
        .map(|v| Variant::parse(v))
        .collect::<Result<BTreeSet<_>, _>>()?;

      let module = Module {
        path: path.clone(),
        kind: decl.kind,
        variants,
        dependencies,
        assemble: decl.assemble.clone(),
        output: decl.output.clone().unwrap_or_else(|| DEFAULT_OUTPUT_TEMPLATE.to_string()),
      };

      if modules.insert(path.clone(), module).is_some() {
        return Err(RegistryError::DuplicateModule(path));
      }
    }

    let implied: BTreeSet<ModulePath> = modules.keys().flat_map(|p| p.ancestors()).collect();
    for parent in implied {
      modules.entry(parent.clone()).or_insert_with(|| {
        debug!(path = %parent, "adding implied grouping module");
        Module::grouping(parent)
      });
    }

    for module in modules.values() {
      for dependency in module.module_dependencies() {
        match modules.get(dependency) {
          None => {
            return Err(RegistryError::UnknownDependency {
              module: module.path.clone(),
              dependency: dependency.clone(),
            });
          }
          Some(target) if !target.kind.is_buildable() => {
            return Err(RegistryError::UnbuildableDependency {
              module: module.path.clone(),
              dependency: dependency.clone(),
            });
          }
          Some(_) => {}
        }
      }
    }

    let mut by_key: BTreeMap<String, Vec<&ModulePath>> = BTreeMap::new();
    for module in modules.values().filter(|m| m.kind.is_buildable()) {
      by_key.entry(module.path.setting_key()).or_default().push(&module.path);
    }
    for (key, paths) in by_key.iter().filter(|(_, paths)| paths.len() > 1) {
      let paths: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
      warn!(
        setting = %key,
        modules = %paths.join(", "),
        "modules share a setting name and store file names"
      );
    }

    let known_keys: BTreeSet<String> = modules.keys().map(|p| p.setting_key()).collect();
    let mut settings = BTreeMap::new();
    for (name, decl) in &manifest.settings {
      if !known_keys.contains(name) {
        warn!(setting = %name, "module setting does not match any module, ignoring");
        continue;
      }
      let variants = decl
        .variants
        .iter()
        .map(|v| Variant::parse(v))
        .collect::<Result<Vec<_>, _>>()?;
      settings.insert(
        name.clone(),
        ModuleSetting {
          name: name.clone(),
          group: decl.group.clone(),
          artifact: decl.artifact.clone(),
          version: decl.version.clone(),
          always_use_artifact: decl.always_use_artifact,
          variants,
        },
      );
    }

    let publishing = PublishingConfig {
      release_repo: manifest.publishing.release_repo.as_ref().map(|p| root.join(p)),
      snapshot_repo: manifest.publishing.snapshot_repo.as_ref().map(|p| root.join(p)),
      extension: manifest.publishing.extension.clone(),
    };

    Ok(Self {
      root: root.to_path_buf(),
      modules,
      settings,
      publishing,
    })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn get(&self, path: &ModulePath) -> Option<&Module> {
    self.modules.get(path)
  }

  /// All modules in path order, grouping nodes included.
  pub fn modules(&self) -> impl Iterator<Item = &Module> {
    self.modules.values()
  }

  pub fn setting_for(&self, path: &ModulePath) -> Option<&ModuleSetting> {
    self.settings.get(&path.setting_key())
  }

  pub fn publishing(&self) -> &PublishingConfig {
    &self.publishing
  }

  /// Variants a module publishes: the explicit list of its setting, or its own.
  pub fn published_variants(&self, module: &Module) -> BTreeSet<Variant> {
    match self.setting_for(&module.path) {
      Some(setting) if !setting.variants.is_empty() => setting.variants.iter().cloned().collect(),
      _ => module.variants.clone(),
    }
  }
}
