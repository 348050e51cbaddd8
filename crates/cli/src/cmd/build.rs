//! Implementation of the `modswap build` command.
//!
//! Configures the workspace, runs every enabled task and prints the per-step
//! timing report.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use modswap_lib::execute::{ExecuteConfig, execute};
use modswap_lib::plan::configure;
use modswap_lib::timings::{StepOutcome, StepTimings, TimingReport};

use super::load_context;
use crate::output::{OutputFormat, format_duration, print_error, print_json, print_stat, print_success, symbols};

#[derive(Serialize)]
struct BuildOutput<'a> {
  success: bool,
  substituted: usize,
  disabled: usize,
  published: Vec<&'a PathBuf>,
  failed: Vec<FailedTask>,
  skipped: Vec<String>,
  timings: &'a TimingReport,
}

#[derive(Serialize)]
struct FailedTask {
  task: String,
  error: String,
}

pub fn cmd_build(root: &Path, jobs: Option<usize>, slow: Option<Duration>, output: OutputFormat) -> Result<()> {
  let ctx = load_context(root)?;
  let plan = configure(&ctx).context("Failed to configure build")?;

  let config = match jobs {
    Some(parallelism) => ExecuteConfig { parallelism },
    None => ExecuteConfig::default(),
  };
  let timings = Arc::new(StepTimings::new());

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let result = rt.block_on(execute(&ctx, &plan.graph, &config, timings.clone()));
  let report = timings.on_build_finished();

  if output.is_json() {
    print_json(&BuildOutput {
      success: result.is_success(),
      substituted: plan.report.rewrites.substituted.len(),
      disabled: plan.report.disabled.len(),
      published: result.published(),
      failed: result
        .failed
        .iter()
        .map(|(id, e)| FailedTask {
          task: id.to_string(),
          error: e.to_string(),
        })
        .collect(),
      skipped: result.skipped.keys().map(|id| id.to_string()).collect(),
      timings: &report,
    })?;
  } else {
    print_timings(&report, slow);
    println!();
    print_stat("Substituted", &plan.report.rewrites.substituted.len().to_string());
    print_stat("Disabled modules", &plan.report.disabled.len().to_string());
    print_stat("Published", &result.published().len().to_string());
    print_stat("Total step time", &format_duration(report.total()));

    for (id, err) in &result.failed {
      print_error(&format!("{}: {}", id, err));
    }
    for (id, dep) in &result.skipped {
      eprintln!("  {} {} (after {})", symbols::MINUS, id, dep);
    }
  }

  if !result.is_success() {
    bail!(
      "Build failed: {} task(s) failed, {} skipped",
      result.failed.len(),
      result.skipped.len()
    );
  }
  if !output.is_json() {
    print_success("Build complete");
  }
  Ok(())
}

fn print_timings(report: &TimingReport, slow: Option<Duration>) {
  for timing in &report.steps {
    let duration = format!("{:>8}", format_duration(timing.duration));
    let is_slow = slow.is_some_and(|limit| timing.duration >= limit);
    let symbol = match timing.outcome {
      StepOutcome::Succeeded => symbols::SUCCESS,
      StepOutcome::Failed => symbols::ERROR,
      StepOutcome::Skipped => symbols::INFO,
    };
    if is_slow {
      println!(
        "{} {} {}",
        symbol,
        duration.if_supports_color(Stream::Stdout, |s| s.yellow()),
        timing.step
      );
    } else {
      println!("{} {} {}", symbol, duration, timing.step);
    }
  }
}
