use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::consts::SEPARATOR;
use crate::registry::Variant;

/// A previously produced build output for one module, variant and version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Artifact {
  pub module: String,
  pub variant: Variant,
  pub version: String,
  pub path: PathBuf,
}

impl fmt::Display for Artifact {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", artifact_stem(&self.module, &self.variant, &self.version))
  }
}

/// `<module>-<variant>-<version>`, the part of a store file name before the extension.
pub fn artifact_stem(module: &str, variant: &Variant, version: &str) -> String {
  format!("{module}{SEPARATOR}{variant}{SEPARATOR}{version}")
}

/// `<module>-<variant>-<version>.<ext>`.
///
/// This is the naming contract shared by the publisher and the store scan.
pub fn artifact_file_name(module: &str, variant: &Variant, version: &str, extension: &str) -> String {
  format!("{}.{}", artifact_stem(module, variant, version), extension)
}

/// Split a file stem into `(module, variant, version)`.
///
/// At most three components are taken, so separators inside the version
/// (`1.0.0-SNAPSHOT`) stay part of the version.
pub fn parse_artifact_stem(stem: &str) -> Option<(String, Variant, String)> {
  let mut parts = stem.splitn(3, SEPARATOR);
  let module = parts.next().filter(|s| !s.is_empty())?;
  let variant = parts.next().filter(|s| !s.is_empty())?;
  let version = parts.next().filter(|s| !s.is_empty())?;
  Some((module.to_string(), Variant::new(variant), version.to_string()))
}
