//! Workspace declaration file.
//!
//! `modswap.toml` is the static description of every module in the workspace:
//! kind, variants, source dependencies and the optional publishing settings.
//! It is read once per build invocation and converted into a
//! [`ModuleRegistry`](crate::registry::ModuleRegistry).

mod types;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::WORKSPACE_FILE;

pub use types::*;

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

impl WorkspaceManifest {
  /// Load `modswap.toml` from the workspace root.
  pub fn load(root: &Path) -> Result<Self, ManifestError> {
    let path = root.join(WORKSPACE_FILE);
    let content = std::fs::read_to_string(&path).map_err(|source| ManifestError::Read {
      path: path.clone(),
      source,
    })?;
    let manifest = Self::parse(&content).map_err(|source| ManifestError::Parse { path, source })?;
    debug!(
      modules = manifest.modules.len(),
      settings = manifest.settings.len(),
      "loaded workspace declarations"
    );
    Ok(manifest)
  }

  pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(content)
  }
}
