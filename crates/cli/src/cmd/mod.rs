mod artifacts;
mod build;
mod classify;
mod info;
mod plan;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use modswap_lib::context::BuildContext;

pub use artifacts::cmd_artifacts;
pub use build::cmd_build;
pub use classify::cmd_classify;
pub use info::cmd_info;
pub use plan::cmd_plan;

/// Load the per-invocation context of the workspace at `root`.
fn load_context(root: &Path) -> Result<BuildContext> {
  debug!(root = %root.display(), "loading workspace");
  BuildContext::load(root).with_context(|| format!("Failed to load workspace: {}", root.display()))
}
