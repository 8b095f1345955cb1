// src/dag/graph.rs

use std::collections::{BTreeMap, HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::dag::task::TaskAction;
use crate::engine::TaskName;
use crate::errors::{AssetflowError, Result};

/// A task as declared, before validation.
#[derive(Debug, Clone)]
struct TaskSpec {
    prerequisites: Vec<TaskName>,
    action: TaskAction,
}

/// Collects task declarations; [`build`](Self::build) validates them into a [`TaskGraph`].
#[derive(Debug, Default)]
pub struct TaskGraphBuilder {
    tasks: BTreeMap<TaskName, TaskSpec>,
    duplicates: Vec<TaskName>,
}

impl TaskGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a task, its prerequisites and its action.
    ///
    /// Repeated prerequisite names are collapsed. Declaring the same task name
    /// twice is reported by [`build`](Self::build).
    pub fn declare(
        &mut self,
        name: impl Into<TaskName>,
        prerequisites: &[&str],
        action: TaskAction,
    ) -> &mut Self {
        let name = name.into();

        let mut seen = HashSet::new();
        let prerequisites: Vec<TaskName> = prerequisites
            .iter()
            .filter(|p| seen.insert(**p))
            .map(|p| p.to_string())
            .collect();

        if self.tasks.contains_key(&name) {
            self.duplicates.push(name.clone());
        }
        self.tasks.insert(
            name,
            TaskSpec {
                prerequisites,
                action,
            },
        );
        self
    }

    /// Validate the declarations and freeze them into a DAG.
    ///
    /// Rejects duplicate names, unknown prerequisites, self-prerequisites and
    /// cycles, before anything can execute.
    pub fn build(self) -> Result<TaskGraph> {
        if let Some(dup) = self.duplicates.first() {
            return Err(AssetflowError::DuplicateTask(dup.clone()));
        }
        validate_prerequisites(&self.tasks)?;
        let order = topological_order(&self.tasks)?;

        let mut nodes: HashMap<TaskName, DagNode> = self
            .tasks
            .iter()
            .map(|(name, spec)| {
                (
                    name.clone(),
                    DagNode {
                        deps: spec.prerequisites.clone(),
                        dependents: Vec::new(),
                        position: 0,
                    },
                )
            })
            .collect();

        for (position, name) in order.iter().enumerate() {
            if let Some(node) = nodes.get_mut(name) {
                node.position = position;
            }
        }

        // Populate dependents from deps.
        for (name, spec) in self.tasks.iter() {
            for dep in &spec.prerequisites {
                if let Some(dep_node) = nodes.get_mut(dep) {
                    dep_node.dependents.push(name.clone());
                }
            }
        }

        let actions = self
            .tasks
            .into_iter()
            .map(|(name, spec)| (name, spec.action))
            .collect();

        debug!(tasks = order.len(), "task graph validated");

        Ok(TaskGraph {
            nodes,
            actions,
            order,
        })
    }
}

fn validate_prerequisites(tasks: &BTreeMap<TaskName, TaskSpec>) -> Result<()> {
    for (name, spec) in tasks.iter() {
        for dep in spec.prerequisites.iter() {
            if dep == name {
                return Err(AssetflowError::DagCycle(format!(
                    "task '{name}' lists itself as a prerequisite"
                )));
            }
            if !tasks.contains_key(dep) {
                return Err(AssetflowError::UnknownPrerequisite {
                    task: name.clone(),
                    prerequisite: dep.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Prerequisites first. Fails on a cycle.
fn topological_order(tasks: &BTreeMap<TaskName, TaskSpec>) -> Result<Vec<TaskName>> {
    // Edge direction: prerequisite -> dependent.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in tasks.keys() {
        graph.add_node(name.as_str());
    }

    for (name, spec) in tasks.iter() {
        for dep in spec.prerequisites.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().map(str::to_string).collect()),
        Err(cycle) => Err(AssetflowError::DagCycle(format!(
            "cycle detected in task graph involving task '{}'",
            cycle.node_id()
        ))),
    }
}

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone)]
struct DagNode {
    deps: Vec<TaskName>,
    dependents: Vec<TaskName>,
    /// Index in the topological order.
    position: usize,
}

/// The validated, immutable task DAG.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    nodes: HashMap<TaskName, DagNode>,
    actions: HashMap<TaskName, TaskAction>,
    order: Vec<TaskName>,
}

impl TaskGraph {
    /// All task names, prerequisites before dependents.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Declared prerequisites of a task, in declaration order.
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Tasks that list this one as a prerequisite.
    pub fn dependents_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    pub fn action_of(&self, name: &str) -> Option<&TaskAction> {
        self.actions.get(name)
    }

    /// Index of a task in the topological order.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.nodes.get(name).map(|n| n.position)
    }

    /// `name` and all of its transitive prerequisites, prerequisites first.
    pub fn execution_plan(&self, name: &str) -> Result<Vec<TaskName>> {
        if !self.contains(name) {
            return Err(AssetflowError::TaskNotFound(name.to_string()));
        }

        let mut stack = vec![name];
        let mut included: HashSet<&str> = HashSet::new();
        while let Some(current) = stack.pop() {
            if !included.insert(current) {
                continue;
            }
            stack.extend(self.dependencies_of(current).iter().map(|s| s.as_str()));
        }

        Ok(self
            .order
            .iter()
            .filter(|t| included.contains(t.as_str()))
            .cloned()
            .collect())
    }
}
