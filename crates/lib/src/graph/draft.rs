//! Mutable plan of the configuration phase.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use tracing::debug;

use crate::publish::{Publication, PublicationKey};
use crate::registry::{DeclaredDependency, ModulePath, ModuleRegistry, Variant};

use super::frozen::FrozenGraph;
use super::task::{Task, TaskId, TaskKind};
use super::types::Dependency;
use super::GraphError;

/// Dependency, task and publication plan while modules are being configured.
///
/// Only the configuration phase holds a `DraftGraph`. It is turned into a
/// [`FrozenGraph`] by [`DraftGraph::freeze`], which consumes it, so nothing
/// can be changed once execution starts.
#[derive(Debug, Default)]
pub struct DraftGraph {
  dependencies: BTreeMap<ModulePath, Vec<Dependency>>,
  tasks: BTreeMap<TaskId, Task>,
  /// Edges point from a dependency to its dependent.
  graph: StableDiGraph<TaskId, ()>,
  nodes: HashMap<TaskId, NodeIndex>,
  publications: BTreeMap<PublicationKey, Publication>,
  disabled: BTreeSet<ModulePath>,
}

impl DraftGraph {
  /// Seed the draft with declared dependencies and one assemble task per
  /// buildable module variant.
  pub fn from_registry(registry: &ModuleRegistry) -> Self {
    let mut draft = Self::default();

    for module in registry.modules().filter(|m| m.kind.is_buildable()) {
      let deps = module
        .dependencies
        .iter()
        .map(|d| match d {
          DeclaredDependency::Module(path) => Dependency::module(path.clone()),
          DeclaredDependency::External(coordinate) => Dependency::external(coordinate.clone()),
        })
        .collect();
      draft.dependencies.insert(module.path.clone(), deps);

      for variant in &module.variants {
        draft.add_task(Task::assemble(&module.path, variant));
      }
    }

    debug!(
      modules = draft.dependencies.len(),
      tasks = draft.tasks.len(),
      "created draft graph"
    );
    draft
  }

  pub fn dependencies(&self, module: &ModulePath) -> &[Dependency] {
    self.dependencies.get(module).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn dependencies_mut(&mut self, module: &ModulePath) -> &mut Vec<Dependency> {
    self.dependencies.entry(module.clone()).or_default()
  }

  /// Add a task. Returns `false` if a task with the same id already exists.
  pub fn add_task(&mut self, task: Task) -> bool {
    if self.tasks.contains_key(&task.id) {
      return false;
    }
    let idx = self.graph.add_node(task.id.clone());
    self.nodes.insert(task.id.clone(), idx);
    self.tasks.insert(task.id.clone(), task);
    true
  }

  pub fn task(&self, id: &TaskId) -> Option<&Task> {
    self.tasks.get(id)
  }

  pub fn has_task(&self, id: &TaskId) -> bool {
    self.tasks.contains_key(id)
  }

  /// Remove a task and all of its edges.
  pub fn remove_task(&mut self, id: &TaskId) -> Option<Task> {
    let idx = self.nodes.remove(id)?;
    self.graph.remove_node(idx);
    self.tasks.remove(id)
  }

  /// Ids of the tasks of `module` whose name satisfies `predicate`.
  pub fn module_tasks_matching(&self, module: &ModulePath, predicate: impl Fn(&str) -> bool) -> Vec<TaskId> {
    self
      .tasks
      .values()
      .filter(|t| t.module() == module && predicate(t.id.name()))
      .map(|t| t.id.clone())
      .collect()
  }

  /// Record that `task` must run after `depends_on`.
  pub fn add_task_dependency(&mut self, task: &TaskId, depends_on: &TaskId) -> Result<(), GraphError> {
    let &to = self
      .nodes
      .get(task)
      .ok_or_else(|| GraphError::UnknownTask(task.clone()))?;
    let &from = self
      .nodes
      .get(depends_on)
      .ok_or_else(|| GraphError::UnknownTask(depends_on.clone()))?;
    if self.graph.find_edge(from, to).is_none() {
      self.graph.add_edge(from, to, ());
    }
    Ok(())
  }

  /// Direct prerequisites of `task`.
  pub fn task_dependencies(&self, task: &TaskId) -> Vec<TaskId> {
    let Some(&idx) = self.nodes.get(task) else {
      return Vec::new();
    };
    let mut deps: Vec<TaskId> = self
      .graph
      .neighbors_directed(idx, petgraph::Direction::Incoming)
      .map(|n| self.graph[n].clone())
      .collect();
    deps.sort();
    deps
  }

  pub fn publication(&self, key: &PublicationKey) -> Option<&Publication> {
    self.publications.get(key)
  }

  /// Insert a publication unless one exists for the key; returns the stored one.
  pub fn insert_publication(&mut self, publication: Publication) -> (&Publication, bool) {
    use std::collections::btree_map::Entry;

    match self.publications.entry(publication.key.clone()) {
      Entry::Occupied(entry) => (&*entry.into_mut(), false),
      Entry::Vacant(entry) => (&*entry.insert(publication), true),
    }
  }

  pub fn remove_publication(&mut self, key: &PublicationKey) -> Option<Publication> {
    self.publications.remove(key)
  }

  pub fn publications(&self) -> impl Iterator<Item = &Publication> {
    self.publications.values()
  }

  /// Mark every task of `module` as skipped at execution.
  pub fn disable_module(&mut self, module: &ModulePath) {
    self.disabled.insert(module.clone());
  }

  pub fn is_disabled(&self, module: &ModulePath) -> bool {
    self.disabled.contains(module)
  }

  /// End the configuration phase.
  ///
  /// Every surviving source-level edge orders the consumer's assemble task
  /// after the same-variant assemble task of the target. The task graph must
  /// be acyclic.
  pub fn freeze(mut self) -> Result<FrozenGraph, GraphError> {
    let assemble: HashMap<(ModulePath, Variant), TaskId> = self
      .tasks
      .values()
      .filter_map(|t| match t.kind {
        TaskKind::Assemble {
          ref module,
          ref variant,
        } => Some(((module.clone(), variant.clone()), t.id.clone())),
        TaskKind::Publish { .. } => None,
      })
      .collect();

    let mut ordering = Vec::new();
    for (consumer, deps) in &self.dependencies {
      for target in deps.iter().filter_map(Dependency::module_target) {
        for ((module, variant), task) in &assemble {
          if module != consumer {
            continue;
          }
          if let Some(upstream) = assemble.get(&(target.clone(), variant.clone())) {
            ordering.push((task.clone(), upstream.clone()));
          }
        }
      }
    }
    for (task, upstream) in ordering {
      self.add_task_dependency(&task, &upstream)?;
    }

    for task in self.tasks.values_mut() {
      if self.disabled.contains(task.module()) {
        task.enabled = false;
      }
    }

    FrozenGraph::new(
      self.dependencies,
      self.tasks,
      self.graph,
      self.nodes,
      self.publications,
      self.disabled,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn module(path: &str) -> ModulePath {
    ModulePath(path.to_string())
  }

  #[test]
  fn add_task_is_idempotent() {
    let mut draft = DraftGraph::default();
    let task = Task::assemble(&module(":lib"), &Variant::new("debug"));

    assert!(draft.add_task(task.clone()));
    assert!(!draft.add_task(task));
  }

  #[test]
  fn edges_require_known_tasks() {
    let mut draft = DraftGraph::default();
    let a = Task::assemble(&module(":a"), &Variant::new("debug"));
    draft.add_task(a.clone());

    let missing = TaskId(":b:assembleDebug".into());
    assert!(matches!(
      draft.add_task_dependency(&a.id, &missing),
      Err(GraphError::UnknownTask(_))
    ));
  }

  #[test]
  fn removing_a_task_drops_its_edges() {
    let mut draft = DraftGraph::default();
    let a = Task::assemble(&module(":a"), &Variant::new("debug"));
    let b = Task::assemble(&module(":b"), &Variant::new("debug"));
    draft.add_task(a.clone());
    draft.add_task(b.clone());
    draft.add_task_dependency(&a.id, &b.id).unwrap();

    draft.remove_task(&b.id);

    assert!(draft.task_dependencies(&a.id).is_empty());
    assert!(!draft.has_task(&b.id));
  }

  #[test]
  fn freeze_orders_assemble_tasks_by_module_edges() {
    let mut draft = DraftGraph::default();
    let debug = Variant::new("debug");
    draft.add_task(Task::assemble(&module(":app"), &debug));
    draft.add_task(Task::assemble(&module(":lib"), &debug));
    draft
      .dependencies_mut(&module(":app"))
      .push(Dependency::module(module(":lib")));

    let frozen = draft.freeze().unwrap();

    assert_eq!(
      frozen.task_dependencies(&TaskId::assemble(&module(":app"), &debug)),
      vec![TaskId::assemble(&module(":lib"), &debug)]
    );
    assert_eq!(frozen.waves().len(), 2);
  }

  #[test]
  fn freeze_rejects_cycles() {
    let mut draft = DraftGraph::default();
    let debug = Variant::new("debug");
    draft.add_task(Task::assemble(&module(":a"), &debug));
    draft.add_task(Task::assemble(&module(":b"), &debug));
    draft.dependencies_mut(&module(":a")).push(Dependency::module(module(":b")));
    draft.dependencies_mut(&module(":b")).push(Dependency::module(module(":a")));

    assert!(matches!(draft.freeze(), Err(GraphError::CycleDetected)));
  }

  #[test]
  fn freeze_disables_tasks_of_disabled_modules() {
    let mut draft = DraftGraph::default();
    let debug = Variant::new("debug");
    draft.add_task(Task::assemble(&module(":lib"), &debug));
    draft.disable_module(&module(":lib"));

    let frozen = draft.freeze().unwrap();

    assert!(!frozen.task(&TaskId::assemble(&module(":lib"), &debug)).unwrap().enabled);
  }
}
