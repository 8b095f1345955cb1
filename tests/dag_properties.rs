// tests/dag_properties.rs

//! Randomised DAGs driven through the scheduler.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use assetflow::dag::{Scheduler, TaskAction, TaskGraph, TaskGraphBuilder};
use assetflow::engine::TaskOutcome;
use proptest::prelude::*;

// Acyclic by construction: task N may only depend on tasks 0..N-1.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<BTreeSet<usize>>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, picks)| {
                    if i == 0 {
                        BTreeSet::new()
                    } else {
                        picks.into_iter().map(|p| p % i).collect()
                    }
                })
                .collect()
        })
    })
}

fn name(i: usize) -> String {
    format!("task_{i}")
}

fn build_graph(deps: &[BTreeSet<usize>]) -> Arc<TaskGraph> {
    let mut builder = TaskGraphBuilder::new();
    for (i, prereqs) in deps.iter().enumerate() {
        let names: Vec<String> = prereqs.iter().map(|d| name(*d)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        builder.declare(name(i), &refs, TaskAction::noop());
    }
    Arc::new(builder.build().expect("generated graph is acyclic"))
}

/// Drive a run to completion, completing one running task at a time in an
/// order chosen by `picks`. Returns the order in which tasks were scheduled.
fn simulate(
    scheduler: &mut Scheduler,
    picks: &[usize],
    failing: &HashSet<String>,
) -> Result<Vec<String>, TestCaseError> {
    let mut running: Vec<String> = scheduler
        .start()
        .newly_scheduled
        .into_iter()
        .map(|t| t.name)
        .collect();
    let mut scheduled = running.clone();

    let mut step = 0;
    while !running.is_empty() {
        prop_assert!(step < 1000, "simulation did not terminate");
        let pick = picks.get(step % picks.len().max(1)).copied().unwrap_or(0);
        let task = running.remove(pick % running.len());
        step += 1;

        let outcome = if failing.contains(&task) {
            TaskOutcome::Failed(format!("{task} failed"))
        } else {
            TaskOutcome::Success
        };
        let next = scheduler.handle_completion(&task, outcome);
        scheduled.extend(next.iter().cloned());
        running.extend(next);
    }

    prop_assert!(scheduler.is_finished(), "run stalled with nothing running");
    Ok(scheduled)
}

proptest! {
    #[test]
    fn every_prerequisite_completes_before_its_dependent(
        deps in dag_strategy(10),
        target_pick in any::<usize>(),
        picks in proptest::collection::vec(any::<usize>(), 1..20),
    ) {
        let graph = build_graph(&deps);
        let target = name(target_pick % deps.len());
        let mut scheduler = Scheduler::for_target(Arc::clone(&graph), &target, 1).unwrap();

        let scheduled = simulate(&mut scheduler, &picks, &HashSet::new())?;

        // Exactly the closure of the target, each task once.
        let plan: BTreeSet<String> = graph.execution_plan(&target).unwrap().into_iter().collect();
        let unique: BTreeSet<String> = scheduled.iter().cloned().collect();
        prop_assert_eq!(unique.len(), scheduled.len());
        prop_assert_eq!(&unique, &plan);

        for (pos, task) in scheduled.iter().enumerate() {
            for dep in graph.dependencies_of(task) {
                let dep_pos = scheduled.iter().position(|t| t == dep);
                prop_assert!(
                    dep_pos.is_some_and(|p| p < pos),
                    "{} was scheduled before its prerequisite {}", task, dep
                );
            }
        }

        let completed = scheduler.into_result().unwrap();
        prop_assert_eq!(completed.len(), plan.len());
    }

    #[test]
    fn failures_terminate_the_run_and_are_reported(
        deps in dag_strategy(10),
        picks in proptest::collection::vec(any::<usize>(), 1..20),
        failing_picks in proptest::collection::vec(any::<usize>(), 1..4),
    ) {
        let graph = build_graph(&deps);
        let target = name(deps.len() - 1);
        let failing: HashSet<String> = failing_picks
            .iter()
            .map(|p| name(p % deps.len()))
            .collect();

        let mut scheduler = Scheduler::for_target(Arc::clone(&graph), &target, 7).unwrap();
        let scheduled = simulate(&mut scheduler, &picks, &failing)?;

        let failed_in_run = scheduled.iter().any(|t| failing.contains(t));
        let reported: Vec<String> = scheduler.failures().iter().map(|f| f.task.clone()).collect();
        for task in &reported {
            prop_assert!(failing.contains(task));
        }

        // A task never starts while one of its prerequisites failed.
        for task in &scheduled {
            for dep in graph.dependencies_of(task) {
                prop_assert!(!reported.contains(dep));
            }
        }

        prop_assert_eq!(scheduler.into_result().is_err(), failed_in_run);
    }
}
