use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use modswap_lib::platform::host_triple;

use super::load_context;
use crate::output::{OutputFormat, print_json, print_stat};

#[derive(Serialize)]
struct InfoOutput {
  version: &'static str,
  platform: String,
  root: PathBuf,
  store: PathBuf,
  enabled: bool,
  modules: usize,
  artifacts: usize,
}

pub fn cmd_info(root: &Path, output: OutputFormat) -> Result<()> {
  let ctx = load_context(root)?;

  let info = InfoOutput {
    version: env!("CARGO_PKG_VERSION"),
    platform: host_triple(),
    root: ctx.root().to_path_buf(),
    store: ctx.store_root(),
    enabled: ctx.is_enabled(),
    modules: ctx.registry().modules().filter(|m| m.kind.is_buildable()).count(),
    artifacts: ctx.store().len(),
  };

  if output.is_json() {
    return print_json(&info);
  }

  println!("modswap {}", info.version);
  print_stat("Platform", &info.platform);
  print_stat("Workspace", &info.root.display().to_string());
  print_stat("Store", &info.store.display().to_string());
  print_stat("Enabled", &info.enabled.to_string());
  print_stat("Modules", &info.modules.to_string());
  print_stat("Artifacts", &info.artifacts.to_string());
  Ok(())
}
