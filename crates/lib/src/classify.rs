//! Workspace classification.
//!
//! Splits the buildable modules into *active* ones, built from source, and
//! *stable* ones, which may be replaced by pre-built artifacts. The split is a
//! pure function of the configuration and the registry.
//!
//! Policy:
//! - With `modswap.workspace` set, listed modules are active and every other
//!   module is stable.
//! - Without it, `modswap.defaultClassification` (stable unless configured)
//!   applies to every module.
//! - A module whose setting has `always_use_artifact = true` is stable even
//!   when listed.
//! - Grouping paths (`modswap.skipParents` and unbuildable modules) are in
//!   neither set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AcceleratorConfig;
use crate::registry::{ModulePath, ModuleRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
  Active,
  Stable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkspaceClassification {
  pub active: BTreeSet<ModulePath>,
  pub stable: BTreeSet<ModulePath>,
}

impl WorkspaceClassification {
  pub fn is_active(&self, path: &ModulePath) -> bool {
    self.active.contains(path)
  }

  pub fn is_stable(&self, path: &ModulePath) -> bool {
    self.stable.contains(path)
  }

  pub fn get(&self, path: &ModulePath) -> Option<Classification> {
    if self.is_active(path) {
      Some(Classification::Active)
    } else if self.is_stable(path) {
      Some(Classification::Stable)
    } else {
      None
    }
  }
}

pub fn classify(registry: &ModuleRegistry, config: &AcceleratorConfig) -> WorkspaceClassification {
  let mut result = WorkspaceClassification::default();

  if let Some(ref listed) = config.workspace {
    for path in listed {
      if registry.get(path).is_none() {
        warn!(path = %path, "workspace entry does not match any module");
      }
    }
  }

  for module in registry.modules() {
    let path = &module.path;
    if !module.kind.is_buildable() || config.skip_parents.contains(path) {
      debug!(path = %path, "skipping grouping module");
      continue;
    }

    let mut class = match config.workspace {
      Some(ref listed) if listed.contains(path) => Classification::Active,
      Some(_) => Classification::Stable,
      None => config.default_classification,
    };

    if class == Classification::Active
      && let Some(setting) = registry.setting_for(path)
      && setting.always_use_artifact
    {
      info!(path = %path, "module pinned to its artifact, treating as stable");
      class = Classification::Stable;
    }

    match class {
      Classification::Active => result.active.insert(path.clone()),
      Classification::Stable => result.stable.insert(path.clone()),
    };
  }

  info!(
    active = result.active.len(),
    stable = result.stable.len(),
    "classified workspace modules"
  );

  result
}
