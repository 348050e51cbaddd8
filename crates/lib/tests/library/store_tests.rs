//! Artifact store scans over real directories.

use std::collections::BTreeSet;

use modswap_lib::registry::Variant;
use modswap_lib::store::ArtifactStore;
use tempfile::TempDir;

fn variants(names: &[&str]) -> BTreeSet<Variant> {
  names.iter().map(|n| Variant::new(n)).collect()
}

fn touch(temp: &TempDir, relative: &str) {
  let path = temp.path().join(relative);
  std::fs::create_dir_all(path.parent().unwrap()).unwrap();
  std::fs::write(path, b"x").unwrap();
}

#[test]
fn scan_finds_both_variants() {
  let temp = TempDir::new().unwrap();
  touch(&temp, "featureA-debug-1.0.0.aar");
  touch(&temp, "featureA-release-1.0.0.aar");

  let store = ArtifactStore::scan(temp.path(), "aar").unwrap();

  assert_eq!(store.len(), 2);
  assert!(store.all().iter().all(|a| a.module == "featureA"));
  assert!(store.all_variants_present("featureA", &variants(&["debug", "release"]), "1.0.0"));
  assert!(!store.all_variants_present("featureA", &variants(&["debug", "release"]), "2.0.0"));
}

#[test]
fn scan_skips_malformed_partial_and_foreign_files() {
  let temp = TempDir::new().unwrap();
  touch(&temp, "featureA-debug-1.0.0.aar");
  touch(&temp, "featureA.aar");
  touch(&temp, "featureA-release-1.0.0.aar.part");
  touch(&temp, "featureA-release-1.0.0.jar");

  let store = ArtifactStore::scan(temp.path(), "aar").unwrap();

  assert_eq!(store.len(), 1);
  assert!(!store.all_variants_present("featureA", &variants(&["debug", "release"]), "1.0.0"));
}

#[test]
fn scan_walks_nested_directories() {
  let temp = TempDir::new().unwrap();
  touch(&temp, "cn/behring/home-debug-1.0.0-SNAPSHOT.aar");

  let store = ArtifactStore::scan(temp.path(), "aar").unwrap();

  let found = store.query("home", Some(&Variant::new("debug")));
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].version, "1.0.0-SNAPSHOT");
}

#[test]
fn missing_root_is_an_empty_store() {
  let temp = TempDir::new().unwrap();

  let store = ArtifactStore::scan(&temp.path().join("nope"), "aar").unwrap();

  assert!(store.is_empty());
}
