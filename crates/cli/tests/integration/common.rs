//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated workspace.
///
/// Each test gets its own temporary directory holding the declarations, the
/// properties file and the artifact store.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create from a declaration fixture with the given active modules.
  pub fn from_fixture(name: &str, active: &str) -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    env.write_file("modswap.toml", &fixture_content(name));
    env.write_file(
      "local.properties",
      &format!("modswap.enable=true\nmodswap.workspace={active}\nmodswap.store=store\n"),
    );
    env
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn root_path(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap_or_else(|_| self.temp.path().to_path_buf())
  }

  pub fn store_path(&self) -> PathBuf {
    self.root_path().join("store")
  }

  /// Cache path, so a missing store setting never touches the real cache.
  pub fn cache_path(&self) -> PathBuf {
    let p = self.temp.path().join("cache");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Get a pre-configured Command for the modswap binary.
  ///
  /// Runs against this workspace with an isolated cache and no store override.
  pub fn modswap_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("modswap");
    cmd.arg("--root").arg(self.root_path());
    cmd.env("XDG_CACHE_HOME", self.cache_path());
    cmd.env_remove("MODSWAP_STORE");
    cmd.env("RUST_LOG", "warn");
    cmd
  }
}
