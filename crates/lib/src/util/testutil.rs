//! Test fixtures for modswap-lib.
//!
//! Builds registries, store snapshots and contexts without touching the
//! filesystem.

use std::path::Path;

use crate::config::AcceleratorConfig;
use crate::context::BuildContext;
use crate::manifest::WorkspaceManifest;
use crate::registry::{ModulePath, ModuleRegistry};
use crate::store::{Artifact, ArtifactStore, parse_artifact_stem};

/// App depending on two libraries, one of which depends on the other.
/// `:infra:analytics` has no publishing setting.
pub const WORKSPACE: &str = r#"
[publishing]
release_repo = "repo/releases"
snapshot_repo = "repo/snapshots"

[[module]]
path = ":app"
kind = "application"
variants = ["debug", "release"]
dependencies = [":feature:home", ":infra:network", ":infra:analytics", "androidx.core:core-ktx:1.9.0"]

[[module]]
path = ":feature:home"
kind = "library"
variants = ["debug", "release"]
dependencies = [":infra:network"]

[[module]]
path = ":infra:network"
kind = "library"
variants = ["debug", "release"]

[[module]]
path = ":infra:analytics"
kind = "library"
variants = ["debug", "release"]

[settings.home]
group = "cn.behring"
artifact = "home"
version = "1.0.0"

[settings.network]
group = "cn.behring"
artifact = "network"
version = "2.0.0-SNAPSHOT"
"#;

pub const ROOT: &str = "/ws";

pub fn path(p: &str) -> ModulePath {
  ModulePath(p.to_string())
}

pub fn registry(toml: &str) -> ModuleRegistry {
  let manifest = WorkspaceManifest::parse(toml).unwrap();
  ModuleRegistry::from_manifest(Path::new(ROOT), &manifest).unwrap()
}

/// Store snapshot from `<module>-<variant>-<version>` stems.
pub fn store(stems: &[&str]) -> ArtifactStore {
  let root = Path::new("/store");
  let artifacts = stems
    .iter()
    .map(|stem| {
      let (module, variant, version) = parse_artifact_stem(stem).unwrap();
      Artifact {
        module,
        variant,
        version,
        path: root.join(format!("{stem}.aar")),
      }
    })
    .collect();
  ArtifactStore::from_artifacts(root, artifacts)
}

pub fn enabled_config(workspace: Option<&[&str]>) -> AcceleratorConfig {
  AcceleratorConfig {
    enabled: true,
    workspace: workspace.map(|w| w.iter().map(|p| path(p)).collect()),
    ..AcceleratorConfig::disabled()
  }
}

/// Enabled context over [`WORKSPACE`] with `:app` active.
pub fn context(stems: &[&str]) -> BuildContext {
  BuildContext::new(enabled_config(Some(&[":app"])), registry(WORKSPACE), store(stems))
}

/// Every artifact [`WORKSPACE`] needs for full substitution.
pub const ALL_ARTIFACTS: &[&str] = &[
  "home-debug-1.0.0",
  "home-release-1.0.0",
  "network-debug-2.0.0-SNAPSHOT",
  "network-release-2.0.0-SNAPSHOT",
];
