//! Implementation of the `modswap artifacts` command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use modswap_lib::store::Artifact;

use super::load_context;
use crate::output::{OutputFormat, format_bytes, print_info, print_json, print_stat};

#[derive(Serialize)]
struct ArtifactsOutput<'a> {
  root: PathBuf,
  artifacts: Vec<&'a Artifact>,
}

pub fn cmd_artifacts(root: &Path, module: Option<&str>, verbose: bool, output: OutputFormat) -> Result<()> {
  let ctx = load_context(root)?;
  let store = ctx.store();

  let artifacts: Vec<&Artifact> = match module {
    Some(name) => store.query(name, None),
    None => store.all().iter().collect(),
  };

  if output.is_json() {
    return print_json(&ArtifactsOutput {
      root: store.root().to_path_buf(),
      artifacts,
    });
  }

  print_stat("Store", &store.root().display().to_string());
  if !ctx.is_enabled() {
    print_info("Accelerator disabled, the store was not scanned");
    return Ok(());
  }
  if artifacts.is_empty() {
    print_info("No artifacts found");
    return Ok(());
  }

  for artifact in &artifacts {
    if verbose {
      let size = std::fs::metadata(&artifact.path).map(|m| m.len()).unwrap_or(0);
      println!("  {} ({}) {}", artifact, format_bytes(size), artifact.path.display());
    } else {
      println!("  {}", artifact);
    }
  }

  print_info(&format!("{} artifact(s)", artifacts.len()));
  Ok(())
}
