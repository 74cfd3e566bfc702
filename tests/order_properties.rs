// tests/order_properties.rs

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use proptest::prelude::*;

use assetflow::dag::{NoopAction, Scheduler, TaskGraph, TaskOutcome};
use assetflow::exec::SessionId;
use assetflow::order::{order, order_units, CompiledScriptUnit};

// Acyclic by construction: node N may only depend on nodes 0..N-1. The
// dependency lists are raw indices reduced modulo N.
fn dag_strategy(max_nodes: usize) -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1..=max_nodes).prop_flat_map(|n| {
        proptest::collection::vec(proptest::collection::vec(any::<usize>(), 0..4), n).prop_map(
            |raw| {
                raw.into_iter()
                    .enumerate()
                    .map(|(i, deps)| {
                        if i == 0 {
                            return Vec::new();
                        }
                        let set: BTreeSet<usize> = deps.into_iter().map(|d| d % i).collect();
                        set.into_iter().collect()
                    })
                    .collect()
            },
        )
    })
}

fn units_for(deps: &[Vec<usize>], permutation: &[usize]) -> Vec<CompiledScriptUnit> {
    permutation
        .iter()
        .map(|&i| {
            CompiledScriptUnit::new(format!("m{i}.js"))
                .with_module(format!("m{i}"))
                .with_dependencies(deps[i].iter().map(|d| format!("m{d}")))
        })
        .collect()
}

proptest! {
    #[test]
    fn order_is_topological_and_idempotent(
        (deps, permutation) in dag_strategy(12).prop_flat_map(|deps| {
            let n = deps.len();
            (Just(deps), Just((0..n).collect::<Vec<_>>()).prop_shuffle())
        })
    ) {
        let units = units_for(&deps, &permutation);

        let ordered = order_units(&units).expect("acyclic input orders");
        prop_assert_eq!(ordered.len(), units.len());

        let position: HashMap<String, usize> = ordered
            .iter()
            .enumerate()
            .filter_map(|(pos, u)| u.module.clone().map(|m| (m, pos)))
            .collect();
        for unit in &ordered {
            let own = position[unit.module.as_deref().unwrap_or_default()];
            for dep in &unit.dependencies {
                prop_assert!(position[dep] < own, "{} loads before its dependency {}", unit.label(), dep);
            }
        }

        let again = order(&ordered).expect("ordered input orders");
        let first: Vec<_> = ordered.iter().map(|u| u.path.clone()).collect();
        prop_assert_eq!(first, again);
    }

    #[test]
    fn scheduler_runs_each_prerequisite_once_and_in_order(deps in dag_strategy(10)) {
        let mut graph = TaskGraph::new();
        for (i, prereqs) in deps.iter().enumerate() {
            let names: Vec<String> = prereqs.iter().map(|d| format!("t{d}")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            graph
                .register(format!("t{i}"), &refs, Arc::new(NoopAction))
                .expect("unique names");
        }
        graph.validate().expect("acyclic by construction");

        let entry = format!("t{}", deps.len() - 1);
        let closure = graph.closure(&entry).expect("entry exists");
        let mut scheduler = Scheduler::for_entry(&graph, &entry, SessionId(1)).expect("entry exists");

        let mut running: Vec<String> = scheduler.start().into_iter().map(|t| t.name).collect();
        let mut done: HashSet<String> = HashSet::new();
        let mut order_seen = Vec::new();

        while let Some(task) = running.pop() {
            for prerequisite in graph.prerequisites_of(&task) {
                prop_assert!(done.contains(prerequisite), "{} started before {}", task, prerequisite);
            }
            prop_assert!(done.insert(task.clone()), "{} ran twice", task);
            order_seen.push(task.clone());

            let step = scheduler.complete(&task, TaskOutcome::Success);
            running.extend(step.newly_scheduled.into_iter().map(|t| t.name));
        }

        prop_assert!(scheduler.is_finished());
        let seen: BTreeSet<String> = order_seen.into_iter().collect();
        prop_assert_eq!(seen, closure);
    }
}
