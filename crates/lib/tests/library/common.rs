//! Shared helpers for library integration tests.

use std::path::{Path, PathBuf};

use modswap_lib::context::BuildContext;
use tempfile::TempDir;

/// Application with two libraries, every module assembling with a shell command.
pub const MANIFEST: &str = r#"
[publishing]
release_repo = "repo/releases"
snapshot_repo = "repo/snapshots"

[[module]]
path = ":app"
kind = "application"
variants = ["debug", "release"]
dependencies = [":feature:home", ":infra:network"]
assemble = 'printf app > "$MODSWAP_OUTPUT"'

[[module]]
path = ":feature:home"
kind = "library"
variants = ["debug", "release"]
dependencies = [":infra:network"]
assemble = 'printf "$MODSWAP_MODULE $MODSWAP_VARIANT" > "$MODSWAP_OUTPUT"'

[[module]]
path = ":infra:network"
kind = "library"
variants = ["debug", "release"]
assemble = 'printf "$MODSWAP_MODULE $MODSWAP_VARIANT" > "$MODSWAP_OUTPUT"'

[settings.home]
group = "cn.behring"
artifact = "home"
version = "1.0.0"

[settings.network]
group = "cn.behring"
artifact = "network"
version = "2.0.0-SNAPSHOT"
"#;

/// Isolated workspace with its own store under `<root>/store`.
pub struct Workspace {
  pub temp: TempDir,
}

impl Workspace {
  pub fn new(manifest: &str, active: &str) -> Self {
    let ws = Self {
      temp: TempDir::new().unwrap(),
    };
    ws.write_file("modswap.toml", manifest);
    ws.write_file(
      "local.properties",
      &format!("modswap.enable=true\nmodswap.workspace={active}\nmodswap.store=store\n"),
    );
    ws
  }

  pub fn root(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap_or_else(|_| self.temp.path().to_path_buf())
  }

  pub fn store(&self) -> PathBuf {
    self.root().join("store")
  }

  pub fn write_file(&self, relative: &str, content: &str) {
    let path = self.temp.path().join(relative);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Context for a new build invocation; scans the store again.
  pub fn context(&self) -> BuildContext {
    BuildContext::load(&self.root()).unwrap()
  }
}

pub fn exists(path: &Path) -> bool {
  path.is_file()
}
