use itertools::Itertools;
use rayon::prelude::*;

use super::cost::CostModifier;
use super::heuristic::Heuristic;
use super::search::{extract_path_from_parents, run_search};
use super::state::VectorState;
use crate::graph::Graph;
use crate::model::{GraphError, NodeId};

/// runs a goal-less Dijkstra from every given source and caches the
/// resulting parent vectors on the graph, enabling O(path length)
/// extraction via [`shortest_path_from_dijkstra_state`].
///
/// per-source cost is O(V log V + E), so precomputing every source is
/// O(V^2 log V) on sparse road networks; callers opt in per source set.
/// with `parallelize` the sources are solved on the rayon pool; each
/// task writes its own output slot and the graph is only read.
pub fn set_dijkstra_state(
    graph: &mut Graph,
    sources: &[NodeId],
    parallelize: bool,
) -> Result<(), GraphError> {
    let source_indices = sources
        .iter()
        .map(|id| graph.index_for_node(id))
        .collect::<Result<Vec<_>, _>>()?;

    let computed: Vec<(usize, Vec<Option<usize>>)> = {
        let shared: &Graph = graph;
        if parallelize {
            source_indices
                .par_iter()
                .map(|source| (*source, solve_parents(shared, *source)))
                .collect()
        } else {
            source_indices
                .iter()
                .map(|source| (*source, solve_parents(shared, *source)))
                .collect_vec()
        }
    };

    for (source, parents) in computed.into_iter() {
        graph.dijkstra_states.insert(source, parents);
    }
    log::info!(
        "cached dijkstra states for {} sources ({} total)",
        sources.len(),
        graph.dijkstra_states.len()
    );
    Ok(())
}

fn solve_parents(graph: &Graph, source: usize) -> Vec<Option<usize>> {
    let mut state = VectorState::new(graph.vertex_count());
    run_search(
        &graph.out_adjacency,
        &graph.weights,
        &graph.node_coordinates,
        source,
        None,
        &CostModifier::Zero,
        &Heuristic::Zero,
        None,
        &mut state,
    );
    state.into_parents()
}

/// extracts a shortest path from a previously cached dijkstra state.
/// fails when no state was computed for the origin.
pub fn shortest_path_from_dijkstra_state(
    graph: &Graph,
    origin: NodeId,
    destination: NodeId,
) -> Result<Option<Vec<NodeId>>, GraphError> {
    let origin_idx = graph.index_for_node(&origin)?;
    let destination_idx = graph.index_for_node(&destination)?;
    let parents = graph
        .dijkstra_states
        .get(&origin_idx)
        .ok_or(GraphError::UndefinedCachedState(origin))?;
    match extract_path_from_parents(parents, origin_idx, destination_idx) {
        None => Ok(None),
        Some(vertices) => {
            let path = vertices
                .into_iter()
                .map(|v| graph.node_for_index(v))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(path))
        }
    }
}
