//! modswap-lib: artifact substitution for multi-module builds.
//!
//! Modules that are not under active development are consumed as pre-built
//! artifacts instead of being compiled from source:
//! - `registry`: declared modules, variants and publishing settings
//! - `classify`: the active / stable partition of a workspace
//! - `store`: the snapshot of previously published artifacts
//! - `rewrite`: replacing module edges with variant-scoped artifact edges
//! - `publish`: publications of freshly assembled stable modules
//! - `plan` and `execute`: the configuration and execution phases
//! - `timings`: per-step wall-clock durations

pub mod classify;
pub mod config;
pub mod consts;
pub mod context;
pub mod execute;
pub mod graph;
pub mod manifest;
pub mod plan;
pub mod platform;
pub mod publish;
pub mod registry;
pub mod rewrite;
pub mod store;
pub mod timings;
pub mod util;
