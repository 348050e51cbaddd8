use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{SEPARATOR, SNAPSHOT_MARKER};

use super::RegistryError;

/// Unique, `:`-separated path of a module, e.g. `:feature:home`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModulePath(pub String);

impl ModulePath {
  pub fn parse(raw: &str) -> Result<Self, RegistryError> {
    let raw = raw.trim();
    let valid = raw.starts_with(':') && raw.len() > 1 && raw[1..].split(':').all(|s| !s.is_empty());
    if !valid {
      return Err(RegistryError::InvalidPath(raw.to_string()));
    }
    Ok(Self(raw.to_string()))
  }

  pub fn segments(&self) -> impl Iterator<Item = &str> {
    self.0[1..].split(':')
  }

  /// Last path segment.
  pub fn name(&self) -> &str {
    self.0.rsplit(':').next().unwrap_or(&self.0)
  }

  /// Every strict ancestor, outermost first (`:a:b:c` yields `:a`, `:a:b`).
  pub fn ancestors(&self) -> Vec<ModulePath> {
    let segments: Vec<&str> = self.segments().collect();
    (1..segments.len())
      .map(|n| ModulePath(format!(":{}", segments[..n].join(":"))))
      .collect()
  }

  /// Key used to match a [`ModuleSetting`]: the camel-cased module name.
  ///
  /// `payment-gateway` becomes `paymentGateway`. The result never contains the
  /// artifact file name separator.
  pub fn setting_key(&self) -> String {
    let joined: String = self
      .name()
      .split(SEPARATOR)
      .filter(|part| !part.is_empty())
      .map(|part| capitalize(&part.to_lowercase()))
      .collect();
    decapitalize(&joined)
  }

  /// Directory of the module relative to the workspace root.
  pub fn dir(&self, root: &Path) -> PathBuf {
    self.segments().fold(root.to_path_buf(), |acc, s| acc.join(s))
  }
}

impl fmt::Display for ModulePath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// What kind of build unit a module is, decided once from its declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
  Application,
  Library,
  /// Grouping node that only exists for nesting.
  Unbuildable,
}

impl ModuleKind {
  pub fn is_buildable(self) -> bool {
    !matches!(self, ModuleKind::Unbuildable)
  }
}

/// A named build configuration axis value, e.g. `debug` or `hkRelease`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variant(pub String);

impl Variant {
  pub fn new(name: &str) -> Self {
    Self(name.to_string())
  }

  /// Validated variant name: non-empty and free of the artifact file name
  /// separator, so `<key>-<variant>-<version>` splits back unambiguously.
  pub fn parse(raw: &str) -> Result<Self, RegistryError> {
    let name = raw.trim();
    if name.is_empty() || name.contains(SEPARATOR) || name.chars().any(char::is_whitespace) {
      return Err(RegistryError::InvalidVariant(raw.to_string()));
    }
    Ok(Self::new(name))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Variant name with the first letter upper-cased, used in task names.
  pub fn capitalized(&self) -> String {
    capitalize(&self.0)
  }
}

impl fmt::Display for Variant {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// External `group:artifact:version` coordinate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
  pub group: String,
  pub artifact: String,
  pub version: String,
}

impl Coordinate {
  pub fn parse(raw: &str) -> Result<Self, RegistryError> {
    let parts: Vec<&str> = raw.trim().split(':').collect();
    match parts.as_slice() {
      [group, artifact, version] if !group.is_empty() && !artifact.is_empty() && !version.is_empty() => Ok(Self {
        group: group.to_string(),
        artifact: artifact.to_string(),
        version: version.to_string(),
      }),
      _ => Err(RegistryError::InvalidCoordinate(raw.to_string())),
    }
  }
}

impl fmt::Display for Coordinate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
  }
}

/// A dependency as written in the declaration file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclaredDependency {
  Module(ModulePath),
  External(Coordinate),
}

impl DeclaredDependency {
  /// Module paths start with `:`, everything else is a coordinate.
  pub fn parse(raw: &str) -> Result<Self, RegistryError> {
    if raw.trim().starts_with(':') {
      ModulePath::parse(raw).map(DeclaredDependency::Module)
    } else {
      Coordinate::parse(raw).map(DeclaredDependency::External)
    }
  }
}

/// One buildable unit of the workspace. Immutable for a build invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Module {
  pub path: ModulePath,
  pub kind: ModuleKind,
  pub variants: BTreeSet<Variant>,
  pub dependencies: Vec<DeclaredDependency>,
  /// Shell command run by the assemble step.
  pub assemble: Option<String>,
  /// Output template, relative to the module directory.
  pub output: String,
}

impl Module {
  pub fn grouping(path: ModulePath) -> Self {
    Self {
      path,
      kind: ModuleKind::Unbuildable,
      variants: BTreeSet::new(),
      dependencies: Vec::new(),
      assemble: None,
      output: String::new(),
    }
  }

  pub fn name(&self) -> &str {
    self.path.name()
  }

  /// Module paths this module depends on at source level.
  pub fn module_dependencies(&self) -> impl Iterator<Item = &ModulePath> {
    self.dependencies.iter().filter_map(|d| match d {
      DeclaredDependency::Module(path) => Some(path),
      DeclaredDependency::External(_) => None,
    })
  }

  /// Location of the assembled output of `variant`.
  ///
  /// The file does not need to exist; it is only checked when publishing.
  pub fn output_path(&self, root: &Path, variant: &Variant, extension: &str) -> PathBuf {
    let relative = self
      .output
      .replace("{name}", &self.path.setting_key())
      .replace("{variant}", variant.as_str())
      .replace("{ext}", extension);
    self.path.dir(root).join(relative)
  }
}

/// Publishing metadata of a module.
///
/// A module without a setting is never substituted and never published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSetting {
  pub name: String,
  pub group: String,
  pub artifact: String,
  pub version: String,
  /// Treat the module as stable even when it is listed in the workspace.
  pub always_use_artifact: bool,
  /// Variants to publish. Empty means "the module's own variants".
  pub variants: Vec<Variant>,
}

impl ModuleSetting {
  /// Coordinate of the artifact published for `variant`.
  pub fn coordinate(&self, variant: &Variant) -> Coordinate {
    Coordinate {
      group: self.group.clone(),
      artifact: format!("{}{}{}", self.artifact, SEPARATOR, variant),
      version: self.version.clone(),
    }
  }

  /// Whether the version carries the pre-release marker.
  pub fn is_snapshot(&self) -> bool {
    self.version.ends_with(SNAPSHOT_MARKER)
  }
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

fn decapitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_lowercase().chain(chars).collect(),
    None => String::new(),
  }
}
