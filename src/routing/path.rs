use itertools::Itertools;

use crate::graph::{Graph, SparseWeights};
use crate::model::{GraphError, NodeId};

/// the per-edge weights along a node path, in traversal order.
pub fn weights_from_path(
    graph: &Graph,
    path: &[NodeId],
    weights: Option<&SparseWeights>,
) -> Result<Vec<f64>, GraphError> {
    let weights = weights.unwrap_or(&graph.weights);
    path.iter()
        .tuple_windows()
        .map(|(u, v)| {
            let u_idx = graph.index_for_node(u)?;
            let v_idx = graph.index_for_node(v)?;
            weights.get(u_idx, v_idx).ok_or(GraphError::MissingEdge(*u, *v))
        })
        .collect()
}

/// the total weight of a node path; 0.0 for paths shorter than one edge.
pub fn total_path_weight(
    graph: &Graph,
    path: &[NodeId],
    weights: Option<&SparseWeights>,
) -> Result<f64, GraphError> {
    Ok(weights_from_path(graph, path, weights)?.iter().sum())
}
