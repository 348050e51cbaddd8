//! Plan command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn plan_empty_store_publishes_stable_modules() {
  let env = TestEnv::from_fixture("basic.toml", ":app");

  env
    .modswap_cmd()
    .arg("plan")
    .assert()
    .success()
    .stdout(predicate::str::contains("Kept from source"))
    .stdout(predicate::str::contains("artifacts missing"))
    .stdout(predicate::str::contains("cn.behring:home-debug:1.0.0"))
    .stdout(predicate::str::contains("4 publication(s)"));
}

#[test]
fn plan_with_full_store_substitutes() {
  let env = TestEnv::from_fixture("basic.toml", ":app");
  for name in [
    "home-debug-1.0.0.aar",
    "home-release-1.0.0.aar",
    "network-debug-2.0.0-SNAPSHOT.aar",
    "network-release-2.0.0-SNAPSHOT.aar",
  ] {
    env.write_file(&format!("store/{name}"), "x");
  }

  env
    .modswap_cmd()
    .arg("plan")
    .assert()
    .success()
    .stdout(predicate::str::contains("Substituted"))
    .stdout(predicate::str::contains("debugImplementation(\"cn.behring:home-debug:1.0.0\")"))
    .stdout(predicate::str::contains("Disabled"))
    .stdout(predicate::str::contains("0 publication(s)"));
}

#[test]
fn plan_json_lists_waves() {
  let env = TestEnv::from_fixture("basic.toml", ":app");

  let output = env.modswap_cmd().args(["plan", "-o", "json"]).output().unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["enabled"], true);
  assert!(!json["waves"].as_array().unwrap().is_empty());
  assert_eq!(json["report"]["publications"].as_array().unwrap().len(), 4);
}

#[test]
fn classify_lists_active_and_stable() {
  let env = TestEnv::from_fixture("basic.toml", ":app");

  let output = env.modswap_cmd().args(["classify", "-o", "json"]).output().unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["active"], serde_json::json!([":app"]));
  assert_eq!(json["stable"], serde_json::json!([":feature:home", ":infra:network"]));
}

#[test]
fn missing_properties_disables_accelerator() {
  let env = TestEnv::from_fixture("basic.toml", ":app");
  std::fs::remove_file(env.temp.path().join("local.properties")).unwrap();

  env
    .modswap_cmd()
    .arg("classify")
    .assert()
    .success()
    .stderr(predicate::str::contains("Accelerator disabled"));
}

#[test]
fn artifacts_filters_by_module() {
  let env = TestEnv::from_fixture("basic.toml", ":app");
  env.write_file("store/home-debug-1.0.0.aar", "x");
  env.write_file("store/network-debug-2.0.0-SNAPSHOT.aar", "x");

  env
    .modswap_cmd()
    .args(["artifacts", "home"])
    .assert()
    .success()
    .stdout(predicate::str::contains("home-debug-1.0.0"))
    .stdout(predicate::str::contains("network").not());
}
