//! Configure and execute whole workspaces: first build publishes, the next
//! one substitutes.
#![cfg(unix)]

use std::sync::Arc;

use modswap_lib::execute::{ExecuteConfig, TaskOutput, execute};
use modswap_lib::graph::TaskId;
use modswap_lib::plan::configure;
use modswap_lib::registry::{ModulePath, Variant};
use modswap_lib::rewrite::Ineligibility;
use modswap_lib::timings::StepTimings;
use serial_test::serial;

use super::common::{MANIFEST, Workspace, exists};

fn path(p: &str) -> ModulePath {
  ModulePath(p.to_string())
}

async fn build(ws: &Workspace) -> (modswap_lib::plan::PlanReport, modswap_lib::execute::ExecutionResult) {
  let ctx = ws.context();
  let plan = configure(&ctx).unwrap();
  let result = execute(&ctx, &plan.graph, &ExecuteConfig::default(), Arc::new(StepTimings::new())).await;
  (plan.report, result)
}

#[tokio::test]
#[serial]
async fn first_build_publishes_stable_modules() {
  let ws = Workspace::new(MANIFEST, ":app");

  let (report, result) = build(&ws).await;

  assert!(result.is_success(), "failed: {:?}", result.failed);
  assert_eq!(report.publications.len(), 4);
  assert!(exists(&ws.store().join("home-debug-1.0.0.aar")));
  assert!(exists(&ws.store().join("home-release-1.0.0.aar")));
  assert!(exists(&ws.store().join("network-debug-2.0.0-SNAPSHOT.aar")));
  assert!(exists(&ws.store().join("network-release-2.0.0-SNAPSHOT.aar")));

  let content = std::fs::read_to_string(ws.store().join("home-release-1.0.0.aar")).unwrap();
  assert_eq!(content, ":feature:home release");

  let snapshot = ws
    .root()
    .join("repo/snapshots/cn/behring/network-debug/2.0.0-SNAPSHOT/network-debug-2.0.0-SNAPSHOT.aar");
  assert!(exists(&snapshot));
  assert!(exists(&snapshot.with_file_name("network-debug-2.0.0-SNAPSHOT.aar.sha256")));
  assert!(exists(
    &ws.root().join("repo/releases/cn/behring/home-debug/1.0.0/home-debug-1.0.0.aar")
  ));
}

#[tokio::test]
#[serial]
async fn second_build_substitutes_published_modules() {
  let ws = Workspace::new(MANIFEST, ":app");
  build(&ws).await;

  let (report, result) = build(&ws).await;

  assert!(result.is_success());
  assert_eq!(report.rewrites.substituted.len(), 3);
  assert_eq!(report.disabled, vec![path(":feature:home"), path(":infra:network")]);
  assert!(report.publications.is_empty());
  assert_eq!(
    result.completed.get(&TaskId::assemble(&path(":feature:home"), &Variant::new("debug"))),
    Some(&TaskOutput::Disabled)
  );
}

#[tokio::test]
#[serial]
async fn partial_store_keeps_source_dependency() {
  let ws = Workspace::new(MANIFEST, ":app");
  build(&ws).await;
  std::fs::remove_file(ws.store().join("home-release-1.0.0.aar")).unwrap();

  let (report, result) = build(&ws).await;

  assert!(result.is_success());
  let retained = report
    .rewrites
    .retained
    .iter()
    .find(|r| r.consumer == path(":app") && r.target == path(":feature:home"))
    .unwrap();
  assert!(matches!(
    &retained.reason,
    Ineligibility::ArtifactsMissing { missing, .. } if missing == &vec![Variant::new("release")]
  ));
  assert_eq!(report.disabled, vec![path(":infra:network")]);
  assert!(exists(&ws.store().join("home-release-1.0.0.aar")));
}

#[tokio::test]
#[serial]
async fn active_module_is_always_built_from_source() {
  let ws = Workspace::new(MANIFEST, ":app,:infra:network");
  build(&ws).await;

  let (report, _) = build(&ws).await;

  assert!(
    report
      .rewrites
      .retained
      .iter()
      .any(|r| r.target == path(":infra:network") && r.reason == Ineligibility::NotStable)
  );
  assert!(!report.disabled.contains(&path(":infra:network")));
  assert!(!exists(&ws.store().join("network-debug-2.0.0-SNAPSHOT.aar")));
}

#[tokio::test]
#[serial]
async fn failed_assemble_skips_dependents() {
  let manifest = MANIFEST.replacen(
    "assemble = 'printf \"$MODSWAP_MODULE $MODSWAP_VARIANT\" > \"$MODSWAP_OUTPUT\"'\n\n[settings.home]",
    "assemble = 'exit 1'\n\n[settings.home]",
    1,
  );
  let ws = Workspace::new(&manifest, ":app");

  let (_, result) = build(&ws).await;

  let network = TaskId::assemble(&path(":infra:network"), &Variant::new("debug"));
  let home = TaskId::assemble(&path(":feature:home"), &Variant::new("debug"));
  assert!(result.failed.contains_key(&network));
  assert_eq!(result.skipped.get(&home), Some(&network));
  assert!(!exists(&ws.store().join("network-debug-2.0.0-SNAPSHOT.aar")));
}

#[tokio::test]
#[serial]
async fn disabled_accelerator_builds_everything_from_source() {
  let ws = Workspace::new(MANIFEST, ":app");
  build(&ws).await;
  ws.write_file("local.properties", "modswap.enable=false\nmodswap.store=store\n");

  let (report, result) = build(&ws).await;

  assert!(result.is_success());
  assert!(report.rewrites.is_empty());
  assert!(report.disabled.is_empty());
  assert!(result.published().is_empty());
}
