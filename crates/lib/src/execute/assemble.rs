//! Assemble step: run a module's build command for one variant.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, info};

use crate::platform::shell;
use crate::registry::{Module, Variant};

use super::types::ExecuteError;

/// Run the assemble command of `module` for `variant`.
///
/// The command runs in the module directory (the workspace root if that does
/// not exist) with `MODSWAP_MODULE`, `MODSWAP_VARIANT` and `MODSWAP_OUTPUT`
/// set. The parent directory of the output is created beforehand. Returns the
/// expected output location; whether a file is there is checked by the
/// publish step.
pub async fn assemble(root: &Path, module: &Module, variant: &Variant, extension: &str) -> Result<PathBuf, ExecuteError> {
  let output = module.output_path(root, variant, extension);

  let Some(cmd) = module.assemble.as_deref() else {
    debug!(module = %module.path, variant = %variant, "no assemble command");
    return Ok(output);
  };

  if let Some(parent) = output.parent() {
    tokio::fs::create_dir_all(parent).await?;
  }

  let dir = module.path.dir(root);
  let working_dir = if dir.is_dir() { dir } else { root.to_path_buf() };
  let (shell_cmd, shell_args) = shell();

  info!(module = %module.path, variant = %variant, cmd = %cmd, "assembling");

  let result = Command::new(shell_cmd)
    .args(shell_args)
    .arg(cmd)
    .current_dir(&working_dir)
    .env("MODSWAP_MODULE", module.path.to_string())
    .env("MODSWAP_VARIANT", variant.as_str())
    .env("MODSWAP_OUTPUT", &output)
    .output()
    .await?;

  if !result.status.success() {
    let stderr = String::from_utf8_lossy(&result.stderr);
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "command stderr");
    }
    return Err(ExecuteError::CmdFailed {
      cmd: cmd.to_string(),
      code: result.status.code(),
    });
  }

  let stdout = String::from_utf8_lossy(&result.stdout);
  if !stdout.trim().is_empty() {
    debug!(stdout = %stdout.trim(), "command output");
  }

  Ok(output)
}
