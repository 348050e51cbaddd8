//! Writing a publication to a repository.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::consts::PARTIAL_SUFFIX;
use crate::util::hash::hash_file;

use super::{Publication, PublishError, Repository};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
  Published(PathBuf),
  /// The assembled output was not there; nothing was written.
  MissingOutput(PathBuf),
  /// No destination is configured for the repository.
  NoDestination,
}

/// Copy the assembled output of `publication` into `repository`.
///
/// The file is written under a partial name and renamed into place, so a
/// reader of the repository never sees a half-written artifact. Remote
/// repositories also get a `.sha256` sidecar.
pub async fn publish(publication: &Publication, repository: Repository) -> Result<PublishOutcome, PublishError> {
  let Some(dest) = publication.destination(repository) else {
    debug!(publication = %publication.key, repository = %repository, "no destination");
    return Ok(PublishOutcome::NoDestination);
  };

  if !tokio::fs::try_exists(&publication.output).await.unwrap_or(false) {
    warn!(
      publication = %publication.key,
      output = %publication.output.display(),
      "assembled output missing, skipping publish"
    );
    return Ok(PublishOutcome::MissingOutput(publication.output.clone()));
  }

  if let Some(parent) = dest.parent() {
    tokio::fs::create_dir_all(parent).await.map_err(|e| io_error(parent, e))?;
  }

  let partial = partial_path(dest);
  if let Err(e) = tokio::fs::copy(&publication.output, &partial).await {
    let _ = tokio::fs::remove_file(&partial).await;
    return Err(io_error(&partial, e));
  }
  if let Err(e) = tokio::fs::rename(&partial, dest).await {
    let _ = tokio::fs::remove_file(&partial).await;
    return Err(io_error(dest, e));
  }

  if repository != Repository::LocalStore {
    let target = dest.clone();
    let hash = tokio::task::spawn_blocking(move || hash_file(&target))
      .await
      .map_err(|e| io_error(dest, e.into()))?
      .map_err(|e| io_error(dest, e))?;
    let sidecar = sidecar_path(dest);
    tokio::fs::write(&sidecar, format!("{}\n", hash.0))
      .await
      .map_err(|e| io_error(&sidecar, e))?;
  }

  info!(
    publication = %publication.key,
    repository = %repository,
    path = %dest.display(),
    "published artifact"
  );
  Ok(PublishOutcome::Published(dest.clone()))
}

fn partial_path(dest: &Path) -> PathBuf {
  let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
  name.push(format!(".{PARTIAL_SUFFIX}"));
  dest.with_file_name(name)
}

fn sidecar_path(dest: &Path) -> PathBuf {
  let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
  name.push(".sha256");
  dest.with_file_name(name)
}

fn io_error(path: &Path, source: std::io::Error) -> PublishError {
  PublishError::Io {
    path: path.to_path_buf(),
    source,
  }
}
