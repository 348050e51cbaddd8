//! Implementation of the `modswap classify` command.

use std::path::Path;

use anyhow::Result;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use modswap_lib::registry::ModulePath;

use super::load_context;
use crate::output::{OutputFormat, print_info, print_json, print_warning};

#[derive(Serialize)]
struct ClassifyOutput<'a> {
  enabled: bool,
  active: Vec<&'a ModulePath>,
  stable: Vec<&'a ModulePath>,
}

pub fn cmd_classify(root: &Path, output: OutputFormat) -> Result<()> {
  let ctx = load_context(root)?;
  let classification = ctx.classification();

  if output.is_json() {
    return print_json(&ClassifyOutput {
      enabled: ctx.is_enabled(),
      active: classification.active.iter().collect(),
      stable: classification.stable.iter().collect(),
    });
  }

  if !ctx.is_enabled() {
    print_warning("Accelerator disabled, every module builds from source");
    return Ok(());
  }

  println!("Active:");
  for path in &classification.active {
    println!("  {}", path.if_supports_color(Stream::Stdout, |s| s.green()));
  }
  println!("Stable:");
  for path in &classification.stable {
    let marker = match ctx.registry().setting_for(path) {
      Some(setting) => format!(" ({})", setting.version),
      None => " (no setting)".to_string(),
    };
    println!(
      "  {}{}",
      path,
      marker.if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
  }

  print_info(&format!(
    "{} active, {} stable",
    classification.active.len(),
    classification.stable.len()
  ));
  Ok(())
}
