//! Dependency rewriting.
//!
//! For every source-level edge from a consumer to a stable module, the
//! rewriter decides whether the edge can be served by pre-built artifacts.
//! If so, it adds one variant-scoped artifact dependency per consumer variant
//! and removes the module edge, so both forms never coexist. Otherwise the
//! edge is left untouched and the reason is reported.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::context::BuildContext;
use crate::graph::{Configuration, Dependency, DependencyTarget, Exclusion};
use crate::registry::{Module, ModulePath, ModuleSetting, Variant};

/// Why a module edge was kept as a source dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Ineligibility {
  /// The target is under active development.
  NotStable,
  /// The target has no publishing setting.
  NoModuleSetting,
  /// The consumer declares no variants to resolve.
  NoVariants,
  /// The target does not publish exactly the consumer's variants.
  VariantMismatch {
    required: Vec<Variant>,
    published: Vec<Variant>,
  },
  /// Some required variants have no artifact at the declared version.
  ArtifactsMissing { version: String, missing: Vec<Variant> },
  /// The store holds variants beyond the required set at the declared version.
  UnexpectedArtifacts { version: String },
}

impl fmt::Display for Ineligibility {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Ineligibility::NotStable => write!(f, "module is not stable"),
      Ineligibility::NoModuleSetting => write!(f, "no module setting"),
      Ineligibility::NoVariants => write!(f, "consumer has no variants"),
      Ineligibility::VariantMismatch { required, published } => write!(
        f,
        "variants differ: required [{}], published [{}]",
        join(required),
        join(published)
      ),
      Ineligibility::ArtifactsMissing { version, missing } => {
        write!(f, "artifacts missing for variant(s) {} at version {}", join(missing), version)
      }
      Ineligibility::UnexpectedArtifacts { version } => {
        write!(f, "stored variants at version {} do not match the required set", version)
      }
    }
  }
}

fn join(variants: &[Variant]) -> String {
  variants.iter().map(Variant::as_str).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Substitution {
  pub consumer: ModulePath,
  pub target: ModulePath,
  pub artifacts: Vec<Dependency>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetainedDependency {
  pub consumer: ModulePath,
  pub target: ModulePath,
  pub reason: Ineligibility,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewriteReport {
  pub substituted: Vec<Substitution>,
  pub retained: Vec<RetainedDependency>,
}

impl RewriteReport {
  pub fn is_empty(&self) -> bool {
    self.substituted.is_empty() && self.retained.is_empty()
  }

  pub fn extend(&mut self, other: RewriteReport) {
    self.substituted.extend(other.substituted);
    self.retained.extend(other.retained);
  }
}

pub struct DependencyRewriter<'a> {
  ctx: &'a BuildContext,
}

impl<'a> DependencyRewriter<'a> {
  pub fn new(ctx: &'a BuildContext) -> Self {
    Self { ctx }
  }

  /// Check whether `target` can be consumed as artifacts by `consumer`.
  ///
  /// On success returns the target's setting and the variants to substitute.
  pub fn eligibility(
    &self,
    consumer: &Module,
    target: &ModulePath,
  ) -> Result<(&'a ModuleSetting, BTreeSet<Variant>), Ineligibility> {
    let registry = self.ctx.registry();

    if !self.ctx.classification().is_stable(target) {
      return Err(Ineligibility::NotStable);
    }

    let setting = registry.setting_for(target).ok_or(Ineligibility::NoModuleSetting)?;

    let required = consumer.variants.clone();
    if required.is_empty() {
      return Err(Ineligibility::NoVariants);
    }

    let published = registry
      .get(target)
      .map(|m| registry.published_variants(m))
      .unwrap_or_default();
    if published != required {
      return Err(Ineligibility::VariantMismatch {
        required: required.into_iter().collect(),
        published: published.into_iter().collect(),
      });
    }

    let store = self.ctx.store();
    if !store.all_variants_present(&setting.name, &required, &setting.version) {
      let missing = store.missing_variants(&setting.name, &required, &setting.version);
      return Err(if missing.is_empty() {
        Ineligibility::UnexpectedArtifacts {
          version: setting.version.clone(),
        }
      } else {
        Ineligibility::ArtifactsMissing {
          version: setting.version.clone(),
          missing,
        }
      });
    }

    Ok((setting, required))
  }

  /// Rewrite the module edges of `consumer` in place.
  ///
  /// Running it again on an already rewritten list changes nothing: the
  /// substituted module edges are gone and artifact edges are never touched.
  pub fn rewrite(&self, consumer: &Module, dependencies: &mut Vec<Dependency>) -> RewriteReport {
    let mut report = RewriteReport::default();

    if !self.ctx.is_enabled() || !consumer.kind.is_buildable() {
      return report;
    }

    let targets: BTreeSet<ModulePath> = dependencies
      .iter()
      .filter_map(Dependency::module_target)
      .cloned()
      .collect();

    for target in targets {
      match self.eligibility(consumer, &target) {
        Ok((setting, variants)) => {
          let artifacts = self.artifact_dependencies(&target, setting, &variants);

          for dep in &artifacts {
            info!(consumer = %consumer.path, target = %target, dependency = %dep, "converting module dependency to artifact");
            if !dependencies.contains(dep) {
              dependencies.push(dep.clone());
            }
          }
          dependencies.retain(|d| d.module_target() != Some(&target));

          report.substituted.push(Substitution {
            consumer: consumer.path.clone(),
            target,
            artifacts,
          });
        }
        Err(reason) => {
          info!(consumer = %consumer.path, target = %target, reason = %reason, "keeping module dependency");
          report.retained.push(RetainedDependency {
            consumer: consumer.path.clone(),
            target,
            reason,
          });
        }
      }
    }

    report
  }

  fn artifact_dependencies(
    &self,
    target: &ModulePath,
    setting: &ModuleSetting,
    variants: &BTreeSet<Variant>,
  ) -> Vec<Dependency> {
    variants
      .iter()
      .map(|variant| Dependency {
        configuration: Configuration::Variant(variant.clone()),
        target: DependencyTarget::Artifact {
          module: target.clone(),
          coordinate: setting.coordinate(variant),
        },
        excludes: self.exclusions(variant),
      })
      .collect()
  }

  /// Artifact coordinates of active modules, which must come from source.
  fn exclusions(&self, variant: &Variant) -> BTreeSet<Exclusion> {
    let registry = self.ctx.registry();
    let excludes: BTreeSet<Exclusion> = self
      .ctx
      .classification()
      .active
      .iter()
      .filter_map(|path| registry.setting_for(path))
      .map(|setting| {
        let coordinate = setting.coordinate(variant);
        Exclusion {
          group: coordinate.group,
          artifact: coordinate.artifact,
        }
      })
      .collect();
    debug!(variant = %variant, count = excludes.len(), "computed artifact exclusions");
    excludes
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::context::BuildContext;
  use crate::util::testutil::{ALL_ARTIFACTS, WORKSPACE, context, enabled_config, path, registry, store};

  fn rewrite(ctx: &BuildContext, consumer: &str) -> (Vec<Dependency>, RewriteReport) {
    let module = ctx.registry().get(&path(consumer)).unwrap().clone();
    let mut deps: Vec<Dependency> = crate::graph::DraftGraph::from_registry(ctx.registry())
      .dependencies(&module.path)
      .to_vec();
    let report = DependencyRewriter::new(ctx).rewrite(&module, &mut deps);
    (deps, report)
  }

  fn module_targets(deps: &[Dependency]) -> Vec<&str> {
    deps.iter().filter_map(|d| d.module_target()).map(|p| p.0.as_str()).collect()
  }

  #[test]
  fn substitutes_stable_module_with_all_variants() {
    let ctx = context(ALL_ARTIFACTS);
    let (deps, report) = rewrite(&ctx, ":app");

    assert_eq!(module_targets(&deps), vec![":infra:analytics"]);
    let home: Vec<_> = deps
      .iter()
      .filter(|d| matches!(d.target, DependencyTarget::Artifact { ref module, .. } if module.0 == ":feature:home"))
      .collect();
    assert_eq!(home.len(), 2);
    assert_eq!(home[0].to_string(), "debugImplementation(\"cn.behring:home-debug:1.0.0\")");
    assert_eq!(home[1].to_string(), "releaseImplementation(\"cn.behring:home-release:1.0.0\")");
    assert_eq!(report.substituted.len(), 2);
  }

  #[test]
  fn external_dependencies_are_untouched() {
    let ctx = context(ALL_ARTIFACTS);
    let (deps, _) = rewrite(&ctx, ":app");

    assert!(
      deps
        .iter()
        .any(|d| matches!(d.target, DependencyTarget::External(ref c) if c.artifact == "core-ktx"))
    );
  }

  #[test]
  fn module_without_setting_is_retained() {
    let ctx = context(ALL_ARTIFACTS);
    let (_, report) = rewrite(&ctx, ":app");

    let analytics = report
      .retained
      .iter()
      .find(|r| r.target.0 == ":infra:analytics")
      .unwrap();
    assert_eq!(analytics.reason, Ineligibility::NoModuleSetting);
  }

  #[test]
  fn partial_variants_keep_source_edge() {
    let ctx = context(&["home-debug-1.0.0", "network-debug-2.0.0-SNAPSHOT", "network-release-2.0.0-SNAPSHOT"]);
    let (deps, report) = rewrite(&ctx, ":app");

    assert!(module_targets(&deps).contains(&":feature:home"));
    assert!(!deps.iter().any(|d| matches!(d.target, DependencyTarget::Artifact { ref module, .. } if module.0 == ":feature:home")));
    let home = report.retained.iter().find(|r| r.target.0 == ":feature:home").unwrap();
    assert_eq!(
      home.reason,
      Ineligibility::ArtifactsMissing {
        version: "1.0.0".into(),
        missing: vec![Variant::new("release")],
      }
    );
  }

  #[test]
  fn wrong_version_is_missing() {
    let ctx = context(&["home-debug-0.9.0", "home-release-0.9.0"]);
    let (_, report) = rewrite(&ctx, ":feature:home");

    assert!(matches!(
      report.retained[0].reason,
      Ineligibility::ArtifactsMissing { ref missing, .. } if missing.len() == 2
    ));
  }

  #[test]
  fn active_target_is_not_substituted() {
    let ctx = BuildContext::new(
      enabled_config(Some(&[":app", ":infra:network"])),
      registry(WORKSPACE),
      store(ALL_ARTIFACTS),
    );
    let (deps, report) = rewrite(&ctx, ":feature:home");

    assert_eq!(module_targets(&deps), vec![":infra:network"]);
    assert_eq!(report.retained[0].reason, Ineligibility::NotStable);
  }

  #[test]
  fn artifact_edges_exclude_active_modules() {
    let ctx = BuildContext::new(
      enabled_config(Some(&[":app", ":infra:network"])),
      registry(WORKSPACE),
      store(ALL_ARTIFACTS),
    );
    let (deps, _) = rewrite(&ctx, ":app");

    let home_debug = deps
      .iter()
      .find(|d| d.configuration == Configuration::Variant(Variant::new("debug")) && d.is_artifact())
      .unwrap();
    assert!(home_debug.excludes.contains(&Exclusion {
      group: "cn.behring".into(),
      artifact: "network-debug".into(),
    }));
  }

  #[test]
  fn rewrite_is_idempotent() {
    let ctx = context(ALL_ARTIFACTS);
    let module = ctx.registry().get(&path(":app")).unwrap().clone();
    let mut deps = crate::graph::DraftGraph::from_registry(ctx.registry())
      .dependencies(&module.path)
      .to_vec();
    let rewriter = DependencyRewriter::new(&ctx);

    rewriter.rewrite(&module, &mut deps);
    let once = deps.clone();
    let second = rewriter.rewrite(&module, &mut deps);

    assert_eq!(deps, once);
    assert!(second.substituted.is_empty());
  }

  #[test]
  fn disabled_context_is_a_no_op() {
    let ctx = BuildContext::new(
      crate::config::AcceleratorConfig::disabled(),
      registry(WORKSPACE),
      store(ALL_ARTIFACTS),
    );
    let (deps, report) = rewrite(&ctx, ":app");

    assert!(report.is_empty());
    assert_eq!(module_targets(&deps).len(), 3);
  }

  #[test]
  fn variant_mismatch_refuses_substitution() {
    let toml = WORKSPACE.replace(
      "path = \":app\"\nkind = \"application\"\nvariants = [\"debug\", \"release\"]",
      "path = \":app\"\nkind = \"application\"\nvariants = [\"hkDebug\", \"hkRelease\"]",
    );
    let ctx = BuildContext::new(enabled_config(Some(&[":app"])), registry(&toml), store(ALL_ARTIFACTS));
    let (_, report) = rewrite(&ctx, ":app");

    let home = report.retained.iter().find(|r| r.target.0 == ":feature:home").unwrap();
    assert!(matches!(home.reason, Ineligibility::VariantMismatch { .. }));
  }

  #[test]
  fn extra_stored_variant_refuses_substitution() {
    let mut stems = ALL_ARTIFACTS.to_vec();
    stems.push("home-staging-1.0.0");
    let ctx = context(&stems);
    let (_, report) = rewrite(&ctx, ":feature:home");

    assert!(report.retained.is_empty());
    let (_, report) = rewrite(&ctx, ":app");
    let home = report.retained.iter().find(|r| r.target.0 == ":feature:home").unwrap();
    assert!(matches!(home.reason, Ineligibility::UnexpectedArtifacts { .. }));
  }
}
