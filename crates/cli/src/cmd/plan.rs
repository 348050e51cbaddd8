//! Implementation of the `modswap plan` command.
//!
//! Runs the configuration phase only and prints its decisions: which module
//! edges became artifact edges, which stayed and why, which modules are
//! disabled, what will be published and in which waves tasks run.

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use modswap_lib::graph::{FrozenGraph, TaskId};
use modswap_lib::plan::{PlanReport, configure};
use modswap_lib::publish::Publication;

use super::load_context;
use crate::output::{OutputFormat, print_info, print_json, symbols};

#[derive(Serialize)]
struct PlanOutput<'a> {
  enabled: bool,
  report: &'a PlanReport,
  publications: Vec<&'a Publication>,
  waves: &'a [Vec<TaskId>],
}

pub fn cmd_plan(root: &Path, verbose: bool, output: OutputFormat) -> Result<()> {
  let ctx = load_context(root)?;
  let plan = configure(&ctx).context("Failed to configure build")?;

  if output.is_json() {
    return print_json(&PlanOutput {
      enabled: ctx.is_enabled(),
      report: &plan.report,
      publications: plan.graph.publications().collect(),
      waves: plan.graph.waves(),
    });
  }

  if !ctx.is_enabled() {
    print_info("Accelerator disabled, plain source build");
  }
  print_report(&plan.report, &plan.graph);

  if verbose {
    println!();
    println!("Waves:");
    for (idx, wave) in plan.graph.waves().iter().enumerate() {
      println!("  {}:", idx + 1);
      for id in wave {
        let enabled = plan.graph.task(id).is_some_and(|t| t.enabled);
        if enabled {
          println!("    {}", id);
        } else {
          println!(
            "    {}",
            format!("{} (disabled)", id).if_supports_color(Stream::Stdout, |s| s.dimmed())
          );
        }
      }
    }
  }

  println!();
  print_info(&format!(
    "{} substituted, {} kept from source, {} publication(s), {} task(s) in {} wave(s)",
    plan.report.rewrites.substituted.len(),
    plan.report.rewrites.retained.len(),
    plan.report.publications.len(),
    plan.graph.task_count(),
    plan.graph.waves().len()
  ));
  Ok(())
}

fn print_report(report: &PlanReport, graph: &FrozenGraph) {
  if !report.rewrites.substituted.is_empty() {
    println!("Substituted:");
    for sub in &report.rewrites.substituted {
      println!(
        "  {} {} {} {}",
        symbols::ADD.if_supports_color(Stream::Stdout, |s| s.green()),
        sub.consumer,
        symbols::ARROW,
        sub.target
      );
      for dep in &sub.artifacts {
        println!("      {}", dep.if_supports_color(Stream::Stdout, |s| s.dimmed()));
      }
    }
  }

  if !report.rewrites.retained.is_empty() {
    println!("Kept from source:");
    for kept in &report.rewrites.retained {
      println!(
        "  {} {} {} {} {}",
        symbols::MODIFY.if_supports_color(Stream::Stdout, |s| s.yellow()),
        kept.consumer,
        symbols::ARROW,
        kept.target,
        format!("({})", kept.reason).if_supports_color(Stream::Stdout, |s| s.dimmed())
      );
    }
  }

  if !report.disabled.is_empty() {
    println!("Disabled:");
    for path in &report.disabled {
      println!(
        "  {} {}",
        symbols::REMOVE.if_supports_color(Stream::Stdout, |s| s.red()),
        path
      );
    }
  }

  if !report.publications.is_empty() {
    println!("Publications:");
    for key in &report.publications {
      let Some(publication) = graph.publication(key) else {
        continue;
      };
      let repositories: Vec<String> = publication.destinations.iter().map(|(r, _)| r.to_string()).collect();
      println!(
        "  {} {} {} {}",
        symbols::ADD.if_supports_color(Stream::Stdout, |s| s.green()),
        key,
        publication.coordinate,
        format!("[{}]", repositories.join(", ")).if_supports_color(Stream::Stdout, |s| s.dimmed())
      );
    }
  }

  for key in &report.skipped_publications {
    println!(
      "  {} {} skipped: no assemble task",
      symbols::WARNING.if_supports_color(Stream::Stdout, |s| s.yellow()),
      key
    );
  }
}
