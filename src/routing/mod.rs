//! shortest-path search over a built network: Dijkstra and A* with
//! early exit, pluggable cost adjustment (turn restrictions), and
//! optional per-source state caching.

mod cost;
mod dijkstra_state;
mod heuristic;
mod path;
pub(crate) mod search;
pub mod state;

pub use cost::CostModifier;
pub use dijkstra_state::{set_dijkstra_state, shortest_path_from_dijkstra_state};
pub use heuristic::Heuristic;
pub use path::{total_path_weight, weights_from_path};

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::graph::{Graph, SparseWeights};
use crate::model::{GraphError, NodeId};
use search::{extract_path, run_search, SearchOutcome};
use state::{DictState, SearchState, VectorState};

/// the search variant. Vector variants preallocate dense state arrays
/// of size |V|; Dict variants allocate only for touched vertices.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingAlgorithm {
    #[default]
    DijkstraVector,
    DijkstraDict,
    AStarVector,
    AStarDict,
}

impl RoutingAlgorithm {
    fn is_astar(&self) -> bool {
        matches!(self, RoutingAlgorithm::AStarVector | RoutingAlgorithm::AStarDict)
    }
}

impl Display for RoutingAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RoutingAlgorithm::DijkstraVector => "dijkstra_vector",
            RoutingAlgorithm::DijkstraDict => "dijkstra_dict",
            RoutingAlgorithm::AStarVector => "astar_vector",
            RoutingAlgorithm::AStarDict => "astar_dict",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for RoutingAlgorithm {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dijkstra" | "dijkstra_vector" => Ok(RoutingAlgorithm::DijkstraVector),
            "dijkstra_dict" => Ok(RoutingAlgorithm::DijkstraDict),
            "astar" | "astar_vector" => Ok(RoutingAlgorithm::AStarVector),
            "astar_dict" => Ok(RoutingAlgorithm::AStarDict),
            other => Err(GraphError::UnknownOption(other.to_string(), "algorithm")),
        }
    }
}

/// selects the cost adjustment applied during relaxation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostAdjustmentKind {
    /// no adjustment; turn restrictions are ignored.
    Zero,
    /// enforce the graph's indexed turn restrictions.
    #[default]
    TurnRestrictions,
}

/// per-query options for [`shortest_path`].
#[derive(Debug, Default, Clone, Copy)]
pub struct RouteOptions<'a> {
    /// an alternative weight matrix; the graph's own weights otherwise.
    pub weights: Option<&'a SparseWeights>,
    pub cost_adjustment: CostAdjustmentKind,
    /// heuristic override for the A* variants. when absent, the
    /// admissible default for the graph's weight type is used. ignored by
    /// the Dijkstra variants.
    pub heuristic: Option<Heuristic>,
    /// abandon the search once the minimum tentative distance in the
    /// frontier exceeds this value; the result is then `None`.
    pub max_distance: Option<f64>,
}

/// computes a shortest path between two node ids.
///
/// `Ok(None)` means no path exists or `max_distance` was exceeded; this
/// is a query result, not an error. unknown node ids are errors.
pub fn shortest_path(
    graph: &Graph,
    algorithm: RoutingAlgorithm,
    origin: NodeId,
    destination: NodeId,
    options: &RouteOptions<'_>,
) -> Result<Option<Vec<NodeId>>, GraphError> {
    let origin_idx = graph.index_for_node(&origin)?;
    let destination_idx = graph.index_for_node(&destination)?;
    let weights = options.weights.unwrap_or(&graph.weights);
    let cost = match options.cost_adjustment {
        CostAdjustmentKind::Zero => CostModifier::Zero,
        CostAdjustmentKind::TurnRestrictions => {
            CostModifier::TurnRestrictions(&graph.indexed_restrictions)
        }
    };
    let heuristic = if algorithm.is_astar() {
        options
            .heuristic
            .unwrap_or_else(|| Heuristic::default_for(graph.weight_type))
    } else {
        Heuristic::Zero
    };

    let vertices = match algorithm {
        RoutingAlgorithm::DijkstraVector | RoutingAlgorithm::AStarVector => {
            let mut state = VectorState::new(graph.vertex_count());
            settle(graph, weights, origin_idx, destination_idx, &cost, &heuristic, options, &mut state)
        }
        RoutingAlgorithm::DijkstraDict | RoutingAlgorithm::AStarDict => {
            let mut state = DictState::new();
            settle(graph, weights, origin_idx, destination_idx, &cost, &heuristic, options, &mut state)
        }
    };

    match vertices {
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

#[allow(clippy::too_many_arguments)]
fn settle<S: SearchState>(
    graph: &Graph,
    weights: &SparseWeights,
    origin: usize,
    destination: usize,
    cost: &CostModifier<'_>,
    heuristic: &Heuristic,
    options: &RouteOptions<'_>,
    state: &mut S,
) -> Option<Vec<usize>> {
    let outcome = run_search(
        &graph.out_adjacency,
        weights,
        &graph.node_coordinates,
        origin,
        Some(destination),
        cost,
        heuristic,
        options.max_distance,
        state,
    );
    match outcome {
        SearchOutcome::ExceededMaxDistance => None,
        SearchOutcome::ReachedGoal | SearchOutcome::ExhaustedFrontier => {
            extract_path(state, origin, destination)
        }
    }
}
