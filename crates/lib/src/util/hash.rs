//! Checksums written next to published artifacts.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Full lowercase hex SHA-256 of some content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Hash a file in chunks.
pub fn hash_file(path: &Path) -> io::Result<ContentHash> {
  let mut file = File::open(path)?;
  let mut hasher = Sha256::new();
  let mut buf = [0u8; 8192];

  loop {
    let n = file.read(&mut buf)?;
    if n == 0 {
      break;
    }
    hasher.update(&buf[..n]);
  }

  Ok(ContentHash(hex::encode(hasher.finalize())))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::tempdir;

  #[test]
  fn hash_file_known_digest() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("home-debug-1.0.aar");
    fs::write(&path, "hello world").unwrap();

    let hash = hash_file(&path).unwrap();
    assert_eq!(
      hash.0,
      "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
    );
  }

  #[test]
  fn empty_file_digest() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("empty.aar");
    fs::write(&path, "").unwrap();

    assert_eq!(
      hash_file(&path).unwrap().0,
      "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
  }
}
