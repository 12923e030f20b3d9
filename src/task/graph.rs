//! Dependency graph with level-by-level execution.
//!
//! Tasks are grouped into topological levels (Kahn's algorithm). Every task
//! of a level runs in parallel; a level starts only after the previous one
//! finished without error.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rayon::prelude::*;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("dependency cycle between: {}", .0.join(", "))]
    Cycle(Vec<String>),
}

/// Tasks and the tasks each one depends on.
#[derive(Debug, Clone)]
pub struct TaskGraph<T> {
    deps: BTreeMap<T, BTreeSet<T>>,
}

impl<T> Default for TaskGraph<T> {
    fn default() -> Self {
        Self {
            deps: BTreeMap::new(),
        }
    }
}

impl<T> TaskGraph<T>
where
    T: Copy + Ord + fmt::Display + Send + Sync,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `task` depending on `deps`; dependencies become tasks themselves.
    pub fn add(&mut self, task: T, deps: &[T]) -> &mut Self {
        for dep in deps {
            self.deps.entry(*dep).or_default();
        }
        self.deps.entry(task).or_default().extend(deps.iter().copied());
        self
    }

    #[cfg(test)]
    pub fn contains(&self, task: T) -> bool {
        self.deps.contains_key(&task)
    }

    /// Topological levels, each sorted. Fails on a cycle.
    pub fn levels(&self) -> Result<Vec<Vec<T>>, GraphError> {
        let mut remaining: BTreeMap<T, usize> =
            self.deps.iter().map(|(task, deps)| (*task, deps.len())).collect();
        let mut levels = Vec::new();

        while !remaining.is_empty() {
            let ready: Vec<T> = remaining
                .iter()
                .filter(|(_, pending)| **pending == 0)
                .map(|(task, _)| *task)
                .collect();

            if ready.is_empty() {
                return Err(GraphError::Cycle(
                    remaining.keys().map(ToString::to_string).collect(),
                ));
            }

            for task in &ready {
                remaining.remove(task);
            }
            for (task, pending) in remaining.iter_mut() {
                let done = self.deps[task].iter().filter(|d| ready.contains(d)).count();
                *pending -= done;
            }
            levels.push(ready);
        }
        Ok(levels)
    }

    /// Run every task with `run`, level by level.
    ///
    /// All tasks of a failing level finish; later levels never start. The
    /// first error (in task order) is returned.
    pub fn execute<E, F>(&self, run: F) -> Result<(), E>
    where
        E: From<GraphError> + Send,
        F: Fn(T) -> Result<(), E> + Sync,
    {
        for level in self.levels()? {
            crate::debug!("task"; "level: {}", join(&level));
            let results: Vec<Result<(), E>> = level.par_iter().map(|task| run(*task)).collect();
            results.into_iter().collect::<Result<Vec<()>, E>>()?;
        }
        Ok(())
    }
}

fn join<T: fmt::Display>(tasks: &[T]) -> String {
    tasks.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_levels() {
        let mut graph = TaskGraph::new();
        graph
            .add("styles", &["clean"])
            .add("scripts", &["clean"])
            .add("package", &["styles", "scripts"]);

        assert_eq!(
            graph.levels().unwrap(),
            vec![vec!["clean"], vec!["scripts", "styles"], vec!["package"]]
        );
    }

    #[test]
    fn test_cycle_detected() {
        let mut graph = TaskGraph::new();
        graph.add("a", &["b"]).add("b", &["c"]).add("c", &["a"]).add("d", &[]);

        let Err(GraphError::Cycle(tasks)) = graph.levels() else {
            panic!("expected a cycle");
        };
        assert_eq!(tasks, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_execute_respects_levels() {
        let mut graph = TaskGraph::new();
        graph.add("images", &["clean"]).add("styles", &["clean"]);

        let order = Mutex::new(Vec::new());
        graph
            .execute(|task| {
                order.lock().push(task);
                Ok::<(), GraphError>(())
            })
            .unwrap();

        let order = order.into_inner();
        assert_eq!(order[0], "clean");
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn test_execute_stops_after_failing_level() {
        let mut graph = TaskGraph::new();
        graph.add("deploy", &["build"]);

        let ran = Mutex::new(Vec::new());
        let result = graph.execute(|task| {
            ran.lock().push(task);
            if task == "build" {
                return Err(anyhow::anyhow!("build failed"));
            }
            Ok(())
        });

        assert!(result.is_err());
        assert_eq!(ran.into_inner(), vec!["build"]);
    }
}
