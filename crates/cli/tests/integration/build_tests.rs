//! Build command integration tests.
#![cfg(unix)]

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn build_publishes_then_substitutes() {
  let env = TestEnv::from_fixture("basic.toml", ":app");

  env
    .modswap_cmd()
    .arg("build")
    .assert()
    .success()
    .stdout(predicate::str::contains("Build complete"));

  assert!(env.store_path().join("home-debug-1.0.0.aar").is_file());
  assert!(env.store_path().join("network-release-2.0.0-SNAPSHOT.aar").is_file());
  assert!(
    env
      .root_path()
      .join("repo/releases/cn/behring/home-release/1.0.0/home-release-1.0.0.aar.sha256")
      .is_file()
  );

  let output = env.modswap_cmd().args(["build", "-o", "json"]).output().unwrap();
  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["substituted"], 3);
  assert_eq!(json["disabled"], 2);
  assert_eq!(json["published"].as_array().unwrap().len(), 0);
}

#[test]
fn failed_assemble_fails_build() {
  let env = TestEnv::from_fixture("failing.toml", ":app");

  env
    .modswap_cmd()
    .args(["build", "-j", "1"])
    .assert()
    .failure()
    .stderr(predicate::str::contains(":lib:assembleDebug"))
    .stderr(predicate::str::contains("exit code Some(7)"))
    .stderr(predicate::str::contains("1 task(s) failed, 2 skipped"));

  assert!(!env.store_path().join("lib-debug-1.0.0.aar").exists());
}

#[test]
fn timing_report_lists_each_step() {
  let env = TestEnv::from_fixture("basic.toml", ":app");

  env
    .modswap_cmd()
    .args(["build", "--slow", "0ms"])
    .assert()
    .success()
    .stdout(predicate::str::contains(":app:assembleDebug"))
    .stdout(predicate::str::contains(":feature:home:publishReleasePublicationToLocalStore"));
}
