//! Artifact store.
//!
//! The store is a flat directory tree of pre-built module outputs. It is
//! scanned exactly once per build invocation; every query afterwards works on
//! that in-memory snapshot and never touches the filesystem again.
//!
//! # Layout
//!
//! ```text
//! store/
//! ├── home-debug-1.0.0.aar
//! ├── home-release-1.0.0.aar
//! └── network-debug-2.1.0-SNAPSHOT.aar
//! ```
//!
//! Files are named `<module>-<variant>-<version>.<ext>`. Publishers write to a
//! `.part` file and rename it into place, so a scan only ever sees complete
//! artifacts.

mod artifact;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::registry::Variant;

pub use artifact::{Artifact, artifact_file_name, artifact_stem, parse_artifact_stem};

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("failed to scan artifact store {path}: {message}")]
  Scan { path: PathBuf, message: String },
}

/// Immutable snapshot of the artifacts present in a store root.
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
  root: PathBuf,
  artifacts: Vec<Artifact>,
}

impl ArtifactStore {
  /// Walk `root` once and collect every file with the given extension.
  ///
  /// A missing root is an empty store. Files whose names do not follow the
  /// naming convention are skipped with a warning.
  pub fn scan(root: &Path, extension: &str) -> Result<Self, StoreError> {
    let mut artifacts = Vec::new();

    if !root.exists() {
      info!(root = %root.display(), "artifact store does not exist yet");
      return Ok(Self {
        root: root.to_path_buf(),
        artifacts,
      });
    }

    for entry in WalkDir::new(root).follow_links(true) {
      let entry = entry.map_err(|e| StoreError::Scan {
        path: root.to_path_buf(),
        message: e.to_string(),
      })?;

      if !entry.file_type().is_file() {
        continue;
      }

      let path = entry.path();
      if path.extension().and_then(|e| e.to_str()) != Some(extension) {
        continue;
      }

      let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        warn!(path = %path.display(), "skipping artifact with non UTF-8 name");
        continue;
      };

      match parse_artifact_stem(stem) {
        Some((module, variant, version)) => {
          debug!(module = %module, variant = %variant, version = %version, "found artifact");
          artifacts.push(Artifact {
            module,
            variant,
            version,
            path: path.to_path_buf(),
          });
        }
        None => {
          warn!(path = %path.display(), "skipping artifact with malformed name");
        }
      }
    }

    artifacts.sort();
    info!(root = %root.display(), count = artifacts.len(), "scanned artifact store");

    Ok(Self {
      root: root.to_path_buf(),
      artifacts,
    })
  }

  /// Build a snapshot from known artifacts.
  pub fn from_artifacts(root: &Path, mut artifacts: Vec<Artifact>) -> Self {
    artifacts.sort();
    Self {
      root: root.to_path_buf(),
      artifacts,
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn all(&self) -> &[Artifact] {
    &self.artifacts
  }

  pub fn len(&self) -> usize {
    self.artifacts.len()
  }

  pub fn is_empty(&self) -> bool {
    self.artifacts.is_empty()
  }

  /// Artifacts of `module`, optionally restricted to one variant.
  pub fn query(&self, module: &str, variant: Option<&Variant>) -> Vec<&Artifact> {
    self
      .artifacts
      .iter()
      .filter(|a| a.module == module)
      .filter(|a| variant.is_none_or(|v| &a.variant == v))
      .collect()
  }

  /// Whether the variants stored for `module` at `version` are exactly `required`.
  ///
  /// A partial match counts as absent: substitution is all variants or none.
  pub fn all_variants_present(&self, module: &str, required: &BTreeSet<Variant>, version: &str) -> bool {
    if required.is_empty() {
      return false;
    }

    let present: BTreeSet<&Variant> = self
      .artifacts
      .iter()
      .filter(|a| a.module == module && a.version == version)
      .map(|a| &a.variant)
      .collect();

    present.len() == required.len() && required.iter().all(|v| present.contains(v))
  }

  /// Required variants with no artifact at `version`.
  pub fn missing_variants(&self, module: &str, required: &BTreeSet<Variant>, version: &str) -> Vec<Variant> {
    required
      .iter()
      .filter(|v| {
        !self
          .artifacts
          .iter()
          .any(|a| a.module == module && a.version == version && &a.variant == *v)
      })
      .cloned()
      .collect()
  }
}
