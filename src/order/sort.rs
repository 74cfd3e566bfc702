// src/order/sort.rs

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tracing::{debug, warn};

use crate::errors::{AssetflowError, Result};
use crate::order::scanner::CompiledScriptUnit;

/// Order compiled scripts so that every module is loaded after the modules
/// it depends on.
///
/// Among simultaneously ready units the one earliest in the input wins, so
/// the result is deterministic and ordering an already ordered list returns
/// it unchanged. Dependencies on identifiers no unit declares are treated as
/// externally satisfied.
pub fn order(units: &[CompiledScriptUnit]) -> Result<Vec<PathBuf>> {
    Ok(order_indices(units)?
        .into_iter()
        .map(|i| units[i].path.clone())
        .collect())
}

/// Same as [`order`], returning the units themselves.
pub fn order_units(units: &[CompiledScriptUnit]) -> Result<Vec<CompiledScriptUnit>> {
    Ok(order_indices(units)?
        .into_iter()
        .map(|i| units[i].clone())
        .collect())
}

fn order_indices(units: &[CompiledScriptUnit]) -> Result<Vec<usize>> {
    let graph = build_graph(units);

    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
        .collect();

    let mut ready: BTreeSet<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, deg)| **deg == 0)
        .map(|(i, _)| i)
        .collect();

    let mut ordered = Vec::with_capacity(units.len());

    while let Some(next) = ready.pop_first() {
        ordered.push(next);
        for succ in graph.neighbors_directed(NodeIndex::new(next), Direction::Outgoing) {
            let i = succ.index();
            in_degree[i] -= 1;
            if in_degree[i] == 0 {
                ready.insert(i);
            }
        }
    }

    if ordered.len() < units.len() {
        let emitted: BTreeSet<usize> = ordered.into_iter().collect();
        let remaining: Vec<String> = (0..units.len())
            .filter(|i| !emitted.contains(i))
            .map(|i| units[i].label())
            .collect();
        return Err(AssetflowError::CyclicScriptDependency(remaining));
    }

    Ok(ordered)
}

/// Edge `a -> b` when `b` depends on the module `a` declares. Node `i` is
/// input unit `i`.
fn build_graph(units: &[CompiledScriptUnit]) -> DiGraph<(), ()> {
    let mut graph: DiGraph<(), ()> = DiGraph::with_capacity(units.len(), 0);
    for _ in units {
        graph.add_node(());
    }

    let mut declarers: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, unit) in units.iter().enumerate() {
        if let Some(module) = &unit.module {
            declarers.entry(module.as_str()).or_default().push(i);
        }
    }

    for (module, files) in &declarers {
        if files.len() > 1 {
            let paths: Vec<_> = files.iter().map(|i| units[*i].path.display().to_string()).collect();
            warn!(module = %module, ?paths, "module declared by more than one script");
        }
    }

    for (i, unit) in units.iter().enumerate() {
        for dep in &unit.dependencies {
            match declarers.get(dep.as_str()) {
                Some(files) => {
                    for &j in files.iter().filter(|&&j| j != i) {
                        graph.update_edge(NodeIndex::new(j), NodeIndex::new(i), ());
                    }
                }
                None => {
                    debug!(path = ?unit.path, dependency = %dep, "dependency not declared by any script; treating as external");
                }
            }
        }
    }

    graph
}
