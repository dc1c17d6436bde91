//! the in-memory network graph: typed node/way/restriction stores, the
//! dense vertex bijection, directed adjacency with sparse weights, the
//! turn-restriction index, and both spatial indices.

mod builder;
mod components;
mod export;
mod restriction_index;
mod simplify;
mod subgraph;
mod weights;

pub use builder::build_graph;
pub use export::write_csv;
pub use simplify::{simplify_graph, SimplifiedEdge, SimplifiedGraph};
pub use weights::{edge_weight, SparseWeights};

use std::collections::{HashMap, HashSet};

use crate::config::NetworkConfig;
use crate::model::geo::point_segment_distance;
use crate::model::{
    GeoLocation, GraphError, NetworkType, Node, NodeId, RelationId, Restriction, Way, WayId,
    WeightType,
};
use crate::routing::{self, RouteOptions, RoutingAlgorithm};
use crate::spatial::{EdgePoint, NodeIndex, WayIndex};

/// a query-ready road or rail network.
///
/// construction happens through [`build_graph`]; the mutating operations
/// (largest-component trimming, subgraphing, dijkstra-state caching)
/// rebuild every derived structure, so the invariants between the
/// stores, the vertex bijection, the weights, and the spatial indices
/// hold after each of them.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// retained OSM nodes by id.
    pub nodes: HashMap<NodeId, Node>,
    /// retained OSM ways by id.
    pub ways: HashMap<WayId, Way>,
    /// valid turn restrictions by relation id.
    pub restrictions: HashMap<RelationId, Restriction>,
    /// node id -> dense vertex index.
    pub node_to_index: HashMap<NodeId, usize>,
    /// dense vertex index -> node id (the inverse of `node_to_index`).
    pub index_to_node: Vec<NodeId>,
    /// node id -> ids of the ways containing it.
    pub node_to_way: HashMap<NodeId, HashSet<WayId>>,
    /// directed edge (u, v) -> the way carrying it. many-to-one; the
    /// smallest way id wins when parallel ways share a node pair.
    pub edge_to_way: HashMap<(NodeId, NodeId), WayId>,
    /// vertex index -> location, in bijection order.
    pub node_coordinates: Vec<GeoLocation>,
    /// out-neighbors per vertex, sorted; same sparsity as `weights`.
    pub out_adjacency: Vec<Vec<usize>>,
    /// in-neighbors per vertex, sorted.
    pub in_adjacency: Vec<Vec<usize>>,
    /// sparse positive edge weights.
    pub weights: SparseWeights,
    /// via-vertex index -> restricted sequences (see
    /// [`crate::routing::CostModifier`] for the matching rule).
    pub indexed_restrictions: HashMap<usize, Vec<Vec<usize>>>,
    /// nearest-node index over vertex positions.
    pub node_index: NodeIndex,
    /// bounding-volume index over ways.
    pub way_index: WayIndex,
    /// cached parent vectors from [`routing::set_dijkstra_state`], keyed
    /// by source vertex index. cleared on every rebuild.
    pub dijkstra_states: HashMap<usize, Vec<Option<usize>>>,
    pub weight_type: WeightType,
    pub network_type: NetworkType,
    /// the tables the graph was built with, kept for weight rebuilds.
    pub network_config: NetworkConfig,
}

impl Graph {
    pub fn vertex_count(&self) -> usize {
        self.index_to_node.len()
    }

    pub fn edge_count(&self) -> usize {
        self.weights.edge_count()
    }

    /// translates a node id into its dense vertex index.
    pub fn index_for_node(&self, node: &NodeId) -> Result<usize, GraphError> {
        self.node_to_index
            .get(node)
            .copied()
            .ok_or(GraphError::MissingNode(*node))
    }

    /// translates a dense vertex index back into its node id.
    pub fn node_for_index(&self, vertex: usize) -> Result<NodeId, GraphError> {
        self.index_to_node
            .get(vertex)
            .copied()
            .ok_or(GraphError::MissingVertex(vertex, self.vertex_count()))
    }

    pub fn get_node(&self, node: &NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(node).ok_or(GraphError::MissingNode(*node))
    }

    pub fn get_way(&self, way: &WayId) -> Result<&Way, GraphError> {
        self.ways.get(way).ok_or(GraphError::MissingWay(*way))
    }

    /// the closest node to a query location and its straight-line
    /// distance in km. `None` only for an empty graph.
    pub fn nearest_node(&self, query: &GeoLocation) -> Option<(NodeId, f64)> {
        let (vertex, distance) = self.node_index.nearest(query)?;
        Some((self.index_to_node[vertex], distance))
    }

    /// the `k` closest nodes to a query location, nearest first.
    pub fn nearest_nodes(&self, query: &GeoLocation, k: usize) -> Vec<(NodeId, f64)> {
        self.node_index
            .k_nearest(query, k)
            .into_iter()
            .map(|(vertex, distance)| (self.index_to_node[vertex], distance))
            .collect()
    }

    /// the closest node to an existing node, excluding the node itself.
    pub fn nearest_neighbor_of(&self, node: &NodeId) -> Result<Option<(NodeId, f64)>, GraphError> {
        let vertex = self.index_for_node(node)?;
        let location = &self.node_coordinates[vertex];
        let hit = self
            .node_index
            .nearest_filtered(location, |candidate| candidate == vertex)
            .map(|(v, distance)| (self.index_to_node[v], distance));
        Ok(hit)
    }

    /// the closest way to a query location within `search_radius` km
    /// (the distance to the nearest node when omitted), together with
    /// the distance and the position on the closest way segment.
    pub fn nearest_way(
        &self,
        query: &GeoLocation,
        search_radius: Option<f64>,
    ) -> Option<(WayId, f64, EdgePoint)> {
        let radius = match search_radius {
            Some(r) => r,
            None => self.node_index.nearest(query)?.1,
        };
        let q = query.to_cartesian();
        let mut best: Option<(WayId, f64, EdgePoint)> = None;
        for way_id in self.way_index.intersecting_cube(&q, radius) {
            let way = self.ways.get(&way_id)?;
            for pair in way.nodes.windows(2) {
                let (n1, n2) = (pair[0], pair[1]);
                let a = self.nodes.get(&n1)?.location.to_cartesian();
                let b = self.nodes.get(&n2)?.location.to_cartesian();
                let (distance, position) = point_segment_distance(&q, &a, &b);
                let closer = match &best {
                    Some((_, best_distance, _)) => distance < *best_distance,
                    None => true,
                };
                if closer {
                    best = Some((way_id, distance, EdgePoint { n1, n2, position }));
                }
            }
        }
        best
    }

    /// ids of all ways whose bounding box intersects the cube of side
    /// `2 * search_radius` around the query location.
    pub fn nearest_ways(&self, query: &GeoLocation, search_radius: f64) -> Vec<WayId> {
        self.way_index
            .intersecting_cube(&query.to_cartesian(), search_radius)
    }

    /// see [`routing::shortest_path`].
    pub fn shortest_path(
        &self,
        algorithm: RoutingAlgorithm,
        origin: NodeId,
        destination: NodeId,
        options: &RouteOptions<'_>,
    ) -> Result<Option<Vec<NodeId>>, GraphError> {
        routing::shortest_path(self, algorithm, origin, destination, options)
    }

    /// see [`routing::set_dijkstra_state`].
    pub fn set_dijkstra_state(
        &mut self,
        sources: &[NodeId],
        parallelize: bool,
    ) -> Result<(), GraphError> {
        routing::set_dijkstra_state(self, sources, parallelize)
    }

    /// see [`routing::shortest_path_from_dijkstra_state`].
    pub fn shortest_path_from_dijkstra_state(
        &self,
        origin: NodeId,
        destination: NodeId,
    ) -> Result<Option<Vec<NodeId>>, GraphError> {
        routing::shortest_path_from_dijkstra_state(self, origin, destination)
    }

    /// see [`routing::total_path_weight`].
    pub fn total_path_weight(
        &self,
        path: &[NodeId],
        weights: Option<&SparseWeights>,
    ) -> Result<f64, GraphError> {
        routing::total_path_weight(self, path, weights)
    }

    /// see [`routing::weights_from_path`].
    pub fn weights_from_path(
        &self,
        path: &[NodeId],
        weights: Option<&SparseWeights>,
    ) -> Result<Vec<f64>, GraphError> {
        routing::weights_from_path(self, path, weights)
    }
}
