use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::registry::{Coordinate, ModulePath, Variant};

/// Dependency configuration a dependency is declared in.
///
/// Artifact dependencies are always variant-scoped so that resolution of one
/// variant only ever sees that variant's artifact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Configuration {
  /// `implementation`, shared by every variant.
  Implementation,
  /// `<variant>Implementation`.
  Variant(Variant),
}

impl Configuration {
  pub fn applies_to(&self, variant: &Variant) -> bool {
    match self {
      Configuration::Implementation => true,
      Configuration::Variant(v) => v == variant,
    }
  }
}

impl fmt::Display for Configuration {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Configuration::Implementation => write!(f, "implementation"),
      Configuration::Variant(v) => write!(f, "{}Implementation", v),
    }
  }
}

/// Coordinates that must never be resolved through an artifact edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Exclusion {
  pub group: String,
  pub artifact: String,
}

impl fmt::Display for Exclusion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.group, self.artifact)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DependencyTarget {
  /// Source-level edge to another module of the workspace.
  Module(ModulePath),
  /// Third-party library coordinate.
  External(Coordinate),
  /// Pre-built artifact standing in for a stable module.
  Artifact { module: ModulePath, coordinate: Coordinate },
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Dependency {
  pub configuration: Configuration,
  pub target: DependencyTarget,
  pub excludes: BTreeSet<Exclusion>,
}

impl Dependency {
  pub fn module(path: ModulePath) -> Self {
    Self {
      configuration: Configuration::Implementation,
      target: DependencyTarget::Module(path),
      excludes: BTreeSet::new(),
    }
  }

  pub fn external(coordinate: Coordinate) -> Self {
    Self {
      configuration: Configuration::Implementation,
      target: DependencyTarget::External(coordinate),
      excludes: BTreeSet::new(),
    }
  }

  pub fn module_target(&self) -> Option<&ModulePath> {
    match self.target {
      DependencyTarget::Module(ref path) => Some(path),
      _ => None,
    }
  }

  pub fn is_artifact(&self) -> bool {
    matches!(self.target, DependencyTarget::Artifact { .. })
  }
}

impl fmt::Display for Dependency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.target {
      DependencyTarget::Module(ref path) => write!(f, "{}(project(\"{}\"))", self.configuration, path),
      DependencyTarget::External(ref c) => write!(f, "{}(\"{}\")", self.configuration, c),
      DependencyTarget::Artifact { ref coordinate, .. } => write!(f, "{}(\"{}\")", self.configuration, coordinate),
    }
  }
}
