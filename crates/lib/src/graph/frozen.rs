//! Read-only plan consumed by the execution phase.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};

use crate::publish::{Publication, PublicationKey};
use crate::registry::ModulePath;

use super::GraphError;
use super::task::{Task, TaskId};
use super::types::Dependency;

/// The finalized dependency, task and publication plan.
///
/// Created only by [`DraftGraph::freeze`](super::DraftGraph::freeze) and has no
/// mutating methods.
#[derive(Debug)]
pub struct FrozenGraph {
  dependencies: BTreeMap<ModulePath, Vec<Dependency>>,
  tasks: BTreeMap<TaskId, Task>,
  graph: StableDiGraph<TaskId, ()>,
  nodes: HashMap<TaskId, NodeIndex>,
  publications: BTreeMap<PublicationKey, Publication>,
  disabled: BTreeSet<ModulePath>,
  waves: Vec<Vec<TaskId>>,
}

impl FrozenGraph {
  pub(super) fn new(
    dependencies: BTreeMap<ModulePath, Vec<Dependency>>,
    tasks: BTreeMap<TaskId, Task>,
    graph: StableDiGraph<TaskId, ()>,
    nodes: HashMap<TaskId, NodeIndex>,
    publications: BTreeMap<PublicationKey, Publication>,
    disabled: BTreeSet<ModulePath>,
  ) -> Result<Self, GraphError> {
    toposort(&graph, None).map_err(|_| GraphError::CycleDetected)?;
    let waves = compute_waves(&graph)?;

    Ok(Self {
      dependencies,
      tasks,
      graph,
      nodes,
      publications,
      disabled,
      waves,
    })
  }

  pub fn dependencies(&self, module: &ModulePath) -> &[Dependency] {
    self.dependencies.get(module).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn task(&self, id: &TaskId) -> Option<&Task> {
    self.tasks.get(id)
  }

  pub fn tasks(&self) -> impl Iterator<Item = &Task> {
    self.tasks.values()
  }

  pub fn task_count(&self) -> usize {
    self.tasks.len()
  }

  /// Direct prerequisites of `task`, sorted.
  pub fn task_dependencies(&self, task: &TaskId) -> Vec<TaskId> {
    let Some(&idx) = self.nodes.get(task) else {
      return Vec::new();
    };
    let mut deps: Vec<TaskId> = self
      .graph
      .neighbors_directed(idx, Direction::Incoming)
      .map(|n| self.graph[n].clone())
      .collect();
    deps.sort();
    deps
  }

  /// Groups of tasks that can run in parallel; every task's prerequisites are
  /// in earlier waves.
  pub fn waves(&self) -> &[Vec<TaskId>] {
    &self.waves
  }

  pub fn publication(&self, key: &PublicationKey) -> Option<&Publication> {
    self.publications.get(key)
  }

  pub fn publications(&self) -> impl Iterator<Item = &Publication> {
    self.publications.values()
  }

  pub fn is_disabled(&self, module: &ModulePath) -> bool {
    self.disabled.contains(module)
  }
}

/// Level every node by its longest distance from a root (Kahn's algorithm).
fn compute_waves(graph: &StableDiGraph<TaskId, ()>) -> Result<Vec<Vec<TaskId>>, GraphError> {
  let mut in_degree: HashMap<NodeIndex, usize> = graph
    .node_indices()
    .map(|idx| (idx, graph.neighbors_directed(idx, Direction::Incoming).count()))
    .collect();
  let mut remaining: HashSet<NodeIndex> = graph.node_indices().collect();
  let mut waves = Vec::new();

  while !remaining.is_empty() {
    let mut ready: Vec<NodeIndex> = remaining.iter().filter(|idx| in_degree[*idx] == 0).copied().collect();

    if ready.is_empty() {
      return Err(GraphError::CycleDetected);
    }

    ready.sort_by(|a, b| graph[*a].cmp(&graph[*b]));

    for &idx in &ready {
      remaining.remove(&idx);
      for neighbor in graph.neighbors_directed(idx, Direction::Outgoing) {
        if let Some(deg) = in_degree.get_mut(&neighbor) {
          *deg = deg.saturating_sub(1);
        }
      }
    }

    waves.push(ready.into_iter().map(|idx| graph[idx].clone()).collect());
  }

  Ok(waves)
}
