//! Configuration phase.
//!
//! [`configure`] turns a [`BuildContext`] into the frozen plan the executor
//! runs: module edges are rewritten against the store snapshot, modules that
//! are fully served by artifacts are disabled, stable modules built from
//! source get publications, and the draft is frozen.

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::context::BuildContext;
use crate::graph::{DraftGraph, FrozenGraph, GraphError};
use crate::publish::{PublicationKey, PublishError, Publisher, WireOutcome};
use crate::registry::{Module, ModulePath};
use crate::rewrite::{DependencyRewriter, RewriteReport};

#[derive(Debug, Error)]
pub enum PlanError {
  #[error(transparent)]
  Graph(#[from] GraphError),

  #[error(transparent)]
  Publish(#[from] PublishError),
}

/// Decisions taken while configuring, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanReport {
  pub rewrites: RewriteReport,
  /// Modules whose tasks are skipped because artifacts replace them everywhere.
  pub disabled: Vec<ModulePath>,
  pub publications: Vec<PublicationKey>,
  /// Publications dropped because their assemble task does not exist.
  pub skipped_publications: Vec<PublicationKey>,
}

#[derive(Debug)]
pub struct Plan {
  pub graph: FrozenGraph,
  pub report: PlanReport,
}

/// Run the configuration phase over every module of the context.
pub fn configure(ctx: &BuildContext) -> Result<Plan, PlanError> {
  let registry = ctx.registry();
  let mut draft = DraftGraph::from_registry(registry);
  let mut report = PlanReport::default();

  if !ctx.is_enabled() {
    info!("plain source build");
    let graph = draft.freeze()?;
    return Ok(Plan { graph, report });
  }

  let rewriter = DependencyRewriter::new(ctx);
  for module in registry.modules().filter(|m| m.kind.is_buildable()) {
    let mut deps = std::mem::take(draft.dependencies_mut(&module.path));
    report.rewrites.extend(rewriter.rewrite(module, &mut deps));
    *draft.dependencies_mut(&module.path) = deps;
  }

  for path in substituted_modules(ctx, &draft) {
    info!(module = %path, "module served by artifacts, disabling its tasks");
    draft.disable_module(&path);
    report.disabled.push(path);
  }

  let publisher = Publisher::new(ctx);
  let publishing: Vec<&Module> = registry.modules().filter(|m| publishes(ctx, &draft, m)).collect();
  for module in publishing {
    for variant in registry.published_variants(module) {
      let key = publisher.prepare_publication(&mut draft, module, &variant)?.key.clone();
      match publisher.wire_assemble_dependency(&mut draft, &module.path, &variant)? {
        WireOutcome::Wired(_) => report.publications.push(key),
        WireOutcome::Skipped { .. } => report.skipped_publications.push(key),
      }
    }
  }

  info!(
    substituted = report.rewrites.substituted.len(),
    retained = report.rewrites.retained.len(),
    disabled = report.disabled.len(),
    publications = report.publications.len(),
    "configuration finished"
  );

  let graph = draft.freeze()?;
  Ok(Plan { graph, report })
}

/// Stable modules that no enabled module still consumes from source and
/// whose own artifacts are all in the store.
///
/// Disabling one module can release its upstream modules, so this runs to a
/// fixed point.
fn substituted_modules(ctx: &BuildContext, draft: &DraftGraph) -> Vec<ModulePath> {
  let registry = ctx.registry();
  let candidates: Vec<&Module> = registry
    .modules()
    .filter(|m| m.kind.is_buildable() && ctx.classification().is_stable(&m.path))
    .filter(|m| {
      registry.setting_for(&m.path).is_some_and(|s| {
        ctx
          .store()
          .all_variants_present(&s.name, &registry.published_variants(m), &s.version)
      })
    })
    .collect();

  let mut disabled: BTreeSet<ModulePath> = BTreeSet::new();
  loop {
    let consumed: BTreeSet<&ModulePath> = registry
      .modules()
      .filter(|m| !disabled.contains(&m.path))
      .flat_map(|m| draft.dependencies(&m.path).iter().filter_map(|d| d.module_target()))
      .collect();

    let newly: Vec<ModulePath> = candidates
      .iter()
      .filter(|m| !disabled.contains(&m.path) && !consumed.contains(&m.path))
      .map(|m| m.path.clone())
      .collect();
    if newly.is_empty() {
      break;
    }
    debug!(count = newly.len(), "modules released from source");
    disabled.extend(newly);
  }

  disabled.into_iter().collect()
}

/// Stable modules that are built from source and have a setting publish.
fn publishes(ctx: &BuildContext, draft: &DraftGraph, module: &Module) -> bool {
  module.kind.is_buildable()
    && ctx.classification().is_stable(&module.path)
    && !draft.is_disabled(&module.path)
    && ctx.registry().setting_for(&module.path).is_some()
}
