use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_ARTIFACT_EXTENSION;
use crate::registry::ModuleKind;

/// Root of `modswap.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceManifest {
  #[serde(default)]
  pub publishing: PublishingDecl,

  #[serde(default, rename = "module")]
  pub modules: Vec<ModuleDecl>,

  /// Publishing settings keyed by camel-cased module name.
  #[serde(default)]
  pub settings: BTreeMap<String, SettingDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishingDecl {
  pub release_repo: Option<String>,
  pub snapshot_repo: Option<String>,
  #[serde(default = "default_extension")]
  pub extension: String,
}

impl Default for PublishingDecl {
  fn default() -> Self {
    Self {
      release_repo: None,
      snapshot_repo: None,
      extension: default_extension(),
    }
  }
}

fn default_extension() -> String {
  DEFAULT_ARTIFACT_EXTENSION.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDecl {
  pub path: String,
  pub kind: ModuleKind,
  #[serde(default)]
  pub variants: Vec<String>,
  #[serde(default)]
  pub dependencies: Vec<String>,
  pub assemble: Option<String>,
  pub output: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingDecl {
  pub group: String,
  pub artifact: String,
  pub version: String,
  #[serde(default)]
  pub always_use_artifact: bool,
  #[serde(default)]
  pub variants: Vec<String>,
}
