//! topological simplification: contracts chains of degree-two vertices
//! into single edges, preserving path weights, the traversed vertex
//! sequence, and the member ways.

use itertools::Itertools;
use kdam::tqdm;
use std::collections::HashMap;

use super::{Graph, SparseWeights};
use crate::model::{GraphError, WayId};
use crate::routing::search::{extract_path, run_search, SearchOutcome};
use crate::routing::state::{SearchState, VectorState};
use crate::routing::{CostModifier, Heuristic};

/// one contracted edge of the simplified graph.
#[derive(Debug, Clone)]
pub struct SimplifiedEdge {
    /// disambiguates parallel edges between the same endpoint pair;
    /// key 0 is the first edge discovered.
    pub key: usize,
    /// the sum of the original edge weights along the contracted path.
    pub weight: f64,
    /// the traversed original vertex indices, endpoints included.
    pub path: Vec<usize>,
    /// the ways traversed, in path order, deduplicated.
    pub ways: Vec<WayId>,
}

/// a secondary graph whose vertices are only the true intersections and
/// dead-ends of the original. shares the original's node store through
/// the recorded original vertex indices.
#[derive(Debug, Clone, Default)]
pub struct SimplifiedGraph {
    /// original vertex index of each simplified vertex, in simplified
    /// index order.
    pub endpoints: Vec<usize>,
    /// original vertex index -> simplified vertex index.
    pub original_to_simplified: HashMap<usize, usize>,
    /// out-neighbors per simplified vertex, sorted.
    pub out_adjacency: Vec<Vec<usize>>,
    /// primary weights: the minimum over parallel edges.
    pub weights: SparseWeights,
    /// all edges per simplified vertex pair, parallel edges included.
    pub edges: HashMap<(usize, usize), Vec<SimplifiedEdge>>,
}

impl SimplifiedGraph {
    pub fn vertex_count(&self) -> usize {
        self.endpoints.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|parallel| parallel.len()).sum()
    }

    /// the simplified vertex for an original vertex index, when that
    /// vertex survived simplification.
    pub fn simplified_index(&self, original_vertex: usize) -> Option<usize> {
        self.original_to_simplified.get(&original_vertex).copied()
    }

    /// routes between two original vertex indices (both must be
    /// endpoints) on the contracted weights, returning the simplified
    /// vertex sequence and the total weight.
    pub fn shortest_path(
        &self,
        origin_vertex: usize,
        destination_vertex: usize,
    ) -> Result<Option<(Vec<usize>, f64)>, GraphError> {
        let origin = self.simplified_index(origin_vertex).ok_or_else(|| {
            GraphError::GraphSimplificationError(format!(
                "vertex {origin_vertex} is not an endpoint of the simplified graph"
            ))
        })?;
        let destination = self.simplified_index(destination_vertex).ok_or_else(|| {
            GraphError::GraphSimplificationError(format!(
                "vertex {destination_vertex} is not an endpoint of the simplified graph"
            ))
        })?;
        let mut state = VectorState::new(self.vertex_count());
        let outcome = run_search(
            &self.out_adjacency,
            &self.weights,
            &[],
            origin,
            Some(destination),
            &CostModifier::Zero,
            &Heuristic::Zero,
            None,
            &mut state,
        );
        if outcome == SearchOutcome::ExceededMaxDistance {
            return Ok(None);
        }
        match extract_path(&state, origin, destination) {
            None => Ok(None),
            Some(path) => {
                let total = state.dist(destination);
                Ok(Some((path, total)))
            }
        }
    }
}

/// true when a vertex must survive simplification: it self-loops, is a
/// pure source or sink, changes one-way direction between two neighbors,
/// or is a dead-end or true intersection.
fn is_endpoint(graph: &Graph, vertex: usize) -> bool {
    let out = &graph.out_adjacency[vertex];
    let inn = &graph.in_adjacency[vertex];
    if out.contains(&vertex) || inn.contains(&vertex) {
        return true;
    }
    let out_degree = out.len();
    let in_degree = inn.len();
    if out_degree == 0 || in_degree == 0 {
        return true;
    }
    let neighbors = out.iter().chain(inn.iter()).unique().count();
    if neighbors != 2 {
        return true;
    }
    in_degree != out_degree
}

/// walks forward from an endpoint through non-endpoint vertices,
/// choosing the unique non-returning neighbor at each step, until
/// another endpoint is reached. `None` when the walk hits an OSM
/// digitization quirk and cannot complete.
fn walk_chain(
    graph: &Graph,
    endpoint_flags: &[bool],
    endpoint: usize,
    successor: usize,
) -> Result<Option<Vec<usize>>, GraphError> {
    let mut path = vec![endpoint, successor];
    let mut previous = endpoint;
    let mut current = successor;
    while !endpoint_flags[current] {
        let continuations = graph.out_adjacency[current]
            .iter()
            .copied()
            .filter(|n| *n != previous)
            .collect_vec();
        match continuations[..] {
            [next] => {
                path.push(next);
                previous = current;
                current = next;
            }
            [] => {
                log::warn!("unexpected simplify pattern near vertex {current}, skipping chain");
                return Ok(None);
            }
            _ => {
                return Err(GraphError::GraphSimplificationError(format!(
                    "vertex {current} has {} forward continuations but is not an endpoint",
                    continuations.len()
                )))
            }
        }
        if path.len() > graph.vertex_count() + 1 {
            return Err(GraphError::GraphSimplificationError(format!(
                "chain walk from vertex {endpoint} exceeded the vertex count, graph contains an unterminated cycle"
            )));
        }
    }
    Ok(Some(path))
}

/// contracts every degree-two chain of the graph into a single edge.
///
/// for any endpoint pair connected in the original graph, routing on the
/// simplified weights yields the same total weight as routing on the
/// original (within floating tolerance); parallel chains are all
/// recorded, with the primary weight slot taking their minimum.
pub fn simplify_graph(graph: &Graph) -> Result<SimplifiedGraph, GraphError> {
    let vertex_count = graph.vertex_count();
    let endpoint_flags = (0..vertex_count)
        .map(|v| is_endpoint(graph, v))
        .collect_vec();
    let endpoints = (0..vertex_count)
        .filter(|v| endpoint_flags[*v])
        .collect_vec();
    let original_to_simplified: HashMap<usize, usize> = endpoints
        .iter()
        .enumerate()
        .map(|(simplified, original)| (*original, simplified))
        .collect();
    log::info!(
        "simplify: {} endpoints among {} vertices",
        endpoints.len(),
        vertex_count
    );

    let mut weights = SparseWeights::new(endpoints.len());
    let mut edges: HashMap<(usize, usize), Vec<SimplifiedEdge>> = HashMap::new();

    for u in tqdm!(
        endpoints.iter().copied(),
        desc = "simplify: contract chains",
        total = endpoints.len()
    ) {
        for successor in graph.out_adjacency[u].iter().copied() {
            let path = if endpoint_flags[successor] {
                Some(vec![u, successor])
            } else {
                walk_chain(graph, &endpoint_flags, u, successor)?
            };
            let Some(path) = path else {
                continue;
            };

            let mut weight = 0.0;
            let mut ways: Vec<WayId> = vec![];
            for (a, b) in path.iter().tuple_windows() {
                weight += graph.weights.get(*a, *b).ok_or_else(|| {
                    GraphError::InternalError(format!(
                        "chain step ({a}, {b}) has no weight entry"
                    ))
                })?;
                let edge = (graph.index_to_node[*a], graph.index_to_node[*b]);
                if let Some(way_id) = graph.edge_to_way.get(&edge) {
                    ways.push(*way_id);
                }
            }
            ways.dedup();

            let terminal = *path.last().ok_or_else(|| {
                GraphError::InternalError(String::from("contracted chain has no terminal"))
            })?;
            let su = original_to_simplified[&u];
            let sv = original_to_simplified[&terminal];
            let parallel = edges.entry((su, sv)).or_default();
            let replaces_primary = match weights.get(su, sv) {
                None => true,
                Some(existing) => weight < existing,
            };
            if replaces_primary {
                weights.set(su, sv, weight);
            }
            parallel.push(SimplifiedEdge {
                key: parallel.len(),
                weight,
                path,
                ways,
            });
        }
    }
    eprintln!();

    let out_adjacency = (0..endpoints.len())
        .map(|u| match weights.row(u) {
            Some(row) => row.keys().copied().sorted().collect_vec(),
            None => vec![],
        })
        .collect_vec();

    let simplified = SimplifiedGraph {
        endpoints,
        original_to_simplified,
        out_adjacency,
        weights,
        edges,
    };
    log::info!(
        "simplified graph has {} vertices and {} edges",
        simplified.vertex_count(),
        simplified.edge_count()
    );
    Ok(simplified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportConfig;
    use crate::graph::build_graph;
    use crate::model::{NodeId, RawNode, RawOsmData, RawWay};
    use serde_json::json;

    fn raw_node(id: i64, lat: f64, lon: f64) -> RawNode {
        RawNode {
            id,
            lat,
            lon,
            tags: std::collections::HashMap::new(),
        }
    }

    fn raw_way(id: i64, nodes: Vec<i64>) -> RawWay {
        RawWay {
            id,
            nodes,
            tags: [(String::from("highway"), json!("residential"))]
                .into_iter()
                .collect(),
        }
    }

    /// a straight two-way chain 1-2-3-4; only the ends are endpoints.
    fn chain() -> Graph {
        let raw = RawOsmData {
            node: vec![
                raw_node(1, -38.010, 145.010),
                raw_node(2, -38.011, 145.010),
                raw_node(3, -38.012, 145.010),
                raw_node(4, -38.013, 145.010),
            ],
            way: vec![raw_way(10, vec![1, 2, 3, 4])],
            relation: vec![],
        };
        build_graph(raw, &ImportConfig::default()).unwrap()
    }

    #[test]
    fn interior_chain_vertices_are_not_endpoints() {
        let graph = chain();
        let endpoint_ids = (0..graph.vertex_count())
            .filter(|v| is_endpoint(&graph, *v))
            .map(|v| graph.index_to_node[v])
            .sorted()
            .collect_vec();
        assert_eq!(endpoint_ids, vec![NodeId(1), NodeId(4)]);
    }

    #[test]
    fn chain_contracts_to_one_edge_per_direction() {
        let graph = chain();
        let simplified = simplify_graph(&graph).unwrap();
        assert_eq!(simplified.vertex_count(), 2);
        assert_eq!(simplified.edge_count(), 2);

        let v1 = graph.index_for_node(&NodeId(1)).unwrap();
        let v4 = graph.index_for_node(&NodeId(4)).unwrap();
        let s1 = simplified.simplified_index(v1).unwrap();
        let s4 = simplified.simplified_index(v4).unwrap();
        let forward = &simplified.edges[&(s1, s4)][0];
        // the contracted path retains every traversed original vertex
        assert_eq!(forward.path.len(), 4);
        assert_eq!(forward.ways, vec![crate::model::WayId(10)]);

        // contracted weight equals the sum of the original edge weights
        let expected: f64 = forward
            .path
            .windows(2)
            .map(|w| graph.weights.get(w[0], w[1]).unwrap())
            .sum();
        assert!((forward.weight - expected).abs() < 1e-12 * forward.path.len() as f64);
    }

    #[test]
    fn oneway_transition_is_an_endpoint() {
        let mut raw = RawOsmData {
            node: vec![
                raw_node(1, -38.010, 145.010),
                raw_node(2, -38.011, 145.010),
                raw_node(3, -38.012, 145.010),
            ],
            way: vec![raw_way(10, vec![1, 2]), raw_way(11, vec![2, 3])],
            relation: vec![],
        };
        raw.way[1]
            .tags
            .insert(String::from("oneway"), json!("yes"));
        let graph = build_graph(raw, &ImportConfig::default()).unwrap();
        // node 2 has two distinct neighbors but asymmetric degrees
        let v2 = graph.index_for_node(&NodeId(2)).unwrap();
        assert!(is_endpoint(&graph, v2));
    }

    #[test]
    fn parallel_chains_keep_all_edges_and_min_primary_weight() {
        // two chains between endpoints 1 and 3: a short one via 2 and a
        // long one via 4; stub arms 0-1 and 3-5 make 1 and 3 endpoints.
        let raw = RawOsmData {
            node: vec![
                raw_node(0, -38.0100, 145.0090),
                raw_node(1, -38.0100, 145.0100),
                raw_node(2, -38.0105, 145.0105),
                raw_node(3, -38.0100, 145.0110),
                raw_node(4, -38.0130, 145.0105),
                raw_node(5, -38.0100, 145.0120),
            ],
            way: vec![
                raw_way(9, vec![0, 1]),
                raw_way(10, vec![1, 2, 3]),
                raw_way(11, vec![1, 4, 3]),
                raw_way(12, vec![3, 5]),
            ],
            relation: vec![],
        };
        let graph = build_graph(raw, &ImportConfig::default()).unwrap();
        let simplified = simplify_graph(&graph).unwrap();

        let v1 = graph.index_for_node(&NodeId(1)).unwrap();
        let v3 = graph.index_for_node(&NodeId(3)).unwrap();
        let s1 = simplified.simplified_index(v1).unwrap();
        let s3 = simplified.simplified_index(v3).unwrap();
        let parallel = &simplified.edges[&(s1, s3)];
        assert_eq!(parallel.len(), 2);
        assert_eq!(parallel[0].key, 0);
        assert_eq!(parallel[1].key, 1);
        let min_weight = parallel.iter().map(|e| e.weight).fold(f64::INFINITY, f64::min);
        assert_eq!(simplified.weights.get(s1, s3), Some(min_weight));
    }

    #[test]
    fn self_loop_vertex_survives() {
        let raw = RawOsmData {
            node: vec![
                raw_node(1, -38.010, 145.010),
                raw_node(2, -38.011, 145.010),
                raw_node(3, -38.012, 145.011),
                raw_node(4, -38.012, 145.009),
            ],
            way: vec![
                raw_way(10, vec![1, 2]),
                // a loop leaving and re-entering node 2
                raw_way(11, vec![2, 3, 4, 2]),
            ],
            relation: vec![],
        };
        let graph = build_graph(raw, &ImportConfig::default()).unwrap();
        let simplified = simplify_graph(&graph).unwrap();
        let v2 = graph.index_for_node(&NodeId(2)).unwrap();
        let s2 = simplified.simplified_index(v2).unwrap();
        // the loop contracts onto (s2, s2)
        assert!(simplified.edges.contains_key(&(s2, s2)));
    }
}
