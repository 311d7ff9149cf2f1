//! Dependency ordering of translated activities.

use crate::core::ir::Activity;
use crate::core::translator::context::TranslationContext;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Order activities so every dependency precedes its dependents.
///
/// Among the activities that are ready, the one that came first in the input goes first, so
/// an already ordered list is returned unchanged. Dependency cycles are reported; inside a
/// cycle only dependencies on activities that come earlier in the input are kept.
pub fn order_activities(activities: Vec<Activity>, ctx: &mut TranslationContext) -> Vec<Activity> {
    let position: HashMap<String, usize> = activities
        .iter()
        .enumerate()
        .map(|(index, activity)| (activity.task_key().to_string(), index))
        .collect();

    let mut graph = DiGraph::<usize, ()>::with_capacity(activities.len(), activities.len());
    let nodes: Vec<NodeIndex> = (0..activities.len()).map(|index| graph.add_node(index)).collect();
    for (index, activity) in activities.iter().enumerate() {
        for dependency in &activity.base.depends_on {
            if let Some(&upstream) = position.get(&dependency.task_key) {
                graph.add_edge(nodes[upstream], nodes[index], ());
            }
        }
    }

    let mut component = vec![usize::MAX; activities.len()];
    for (id, members) in tarjan_scc(&graph).into_iter().enumerate() {
        for node in &members {
            component[graph[*node]] = id;
        }
        let cyclic = members.len() > 1
            || members
                .first()
                .is_some_and(|node| graph.contains_edge(*node, *node));
        if cyclic {
            report_cycle(&activities, &members, &graph, ctx);
        }
    }

    let mut activities = activities;
    for index in 0..activities.len() {
        let own_component = component[index];
        let task_key = activities[index].task_key().to_string();
        activities[index].base.depends_on.retain(|dependency| {
            match position.get(&dependency.task_key) {
                Some(&upstream) if component[upstream] == own_component => {
                    upstream < index && dependency.task_key != task_key
                }
                Some(_) => true,
                None => false,
            }
        });
    }

    stable_topological_order(activities, &position)
}

fn report_cycle(
    activities: &[Activity],
    members: &[NodeIndex],
    graph: &DiGraph<usize, ()>,
    ctx: &mut TranslationContext,
) {
    let mut indices: Vec<usize> = members.iter().map(|node| graph[*node]).collect();
    indices.sort_unstable();
    let keys: Vec<&str> = indices
        .iter()
        .map(|index| activities[*index].task_key())
        .collect();
    let first = &activities[indices[0]].base;
    let message = format!(
        "Dependency cycle between {}; dependencies closing the cycle were dropped",
        keys.join(", ")
    );
    ctx.scoped(&first.name, &first.activity_type, |ctx| {
        ctx.warn("dependsOn", message)
    });
}

fn stable_topological_order(
    activities: Vec<Activity>,
    position: &HashMap<String, usize>,
) -> Vec<Activity> {
    let count = activities.len();
    let mut pending = vec![0usize; count];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (index, activity) in activities.iter().enumerate() {
        for dependency in &activity.base.depends_on {
            if let Some(&upstream) = position.get(&dependency.task_key) {
                pending[index] += 1;
                dependents[upstream].push(index);
            }
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = pending
        .iter()
        .enumerate()
        .filter(|(_, count)| **count == 0)
        .map(|(index, _)| Reverse(index))
        .collect();
    let mut order = Vec::with_capacity(count);
    while let Some(Reverse(index)) = ready.pop() {
        order.push(index);
        for &dependent in &dependents[index] {
            pending[dependent] -= 1;
            if pending[dependent] == 0 {
                ready.push(Reverse(dependent));
            }
        }
    }

    let mut slots: Vec<Option<Activity>> = activities.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect()
}
