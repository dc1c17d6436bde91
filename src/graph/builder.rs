use itertools::Itertools;
use kdam::tqdm;
use std::collections::{HashMap, HashSet};

use super::{restriction_index, weights::edge_weight, Graph, SparseWeights};
use crate::config::ImportConfig;
use crate::model::tag_parse::normalize_way;
use crate::model::{
    GraphError, Node, NodeId, RawOsmData, Restriction, Way, WayId,
};
use crate::spatial::{NodeIndex, WayIndex};

/// assembles a query-ready [`Graph`] from a collaborator-normalized OSM
/// attribute tree.
///
/// the pipeline follows the dataflow: way filtering and tag
/// normalization, node retention, restriction intake, then the derived
/// state (vertex bijection, directed edges and weights, restriction
/// index, spatial indices), optionally followed by largest-component
/// trimming and dijkstra-state precomputation.
pub fn build_graph(raw: RawOsmData, config: &ImportConfig) -> Result<Graph, GraphError> {
    config.network.validate()?;

    let mut ways: HashMap<WayId, Way> = HashMap::new();
    let way_total = raw.way.len();
    for raw_way in tqdm!(
        raw.way.iter(),
        desc = format!("filter ways for '{}' network", config.network_type),
        total = way_total
    ) {
        if let Some(way) = normalize_way(raw_way, config.network_type, &config.network) {
            ways.insert(way.id, way);
        }
    }
    eprintln!();
    if ways.is_empty() {
        return Err(GraphError::NoWaysRetained);
    }

    let referenced: HashSet<NodeId> = ways
        .values()
        .flat_map(|way| way.nodes.iter().copied())
        .collect();

    let mut nodes: HashMap<NodeId, Node> = HashMap::new();
    let mut node_order: Vec<NodeId> = Vec::with_capacity(referenced.len());
    for raw_node in tqdm!(
        raw.node.iter(),
        desc = "retain way-referenced nodes",
        total = raw.node.len()
    ) {
        let id = NodeId(raw_node.id);
        if !referenced.contains(&id) {
            continue;
        }
        let mut node = Node::new(
            id,
            crate::model::GeoLocation::new(raw_node.lat, raw_node.lon),
        );
        node.tags = raw_node
            .tags
            .iter()
            .map(|(k, v)| (k.clone(), crate::model::raw::value_to_string(v)))
            .collect();
        if nodes.insert(id, node).is_none() {
            node_order.push(id);
        }
    }
    eprintln!();

    if nodes.len() != referenced.len() {
        return Err(GraphError::DataQuality(format!(
            "retained ways reference {} distinct nodes but the input supplied {}",
            referenced.len(),
            nodes.len()
        )));
    }

    let mut restrictions = HashMap::new();
    for relation in raw.relation.iter() {
        if !Restriction::is_restriction_relation(relation) {
            continue;
        }
        match Restriction::from_raw(relation) {
            Ok(restriction) => {
                restrictions.insert(restriction.id, restriction);
            }
            Err(e) => log::warn!("dropping restriction relation {}: {e}", relation.id),
        }
    }

    let mut graph = Graph {
        nodes,
        ways,
        restrictions,
        weight_type: config.weight_type,
        network_type: config.network_type,
        network_config: config.network.clone(),
        ..Default::default()
    };
    graph.rebuild(node_order)?;

    if config.largest_connected_component {
        graph.retain_largest_component()?;
    }

    log::info!(
        "built '{}' network with {} nodes, {} edges, {} restrictions",
        graph.network_type,
        graph.vertex_count(),
        graph.edge_count(),
        graph.restrictions.len()
    );

    if config.precompute_dijkstra_states {
        let sources = graph.index_to_node.clone();
        graph.set_dijkstra_state(&sources, config.parallelize)?;
    }

    Ok(graph)
}

impl Graph {
    /// recomputes every derived structure from the node/way/restriction
    /// stores: the vertex bijection (in the given node order), node
    /// coordinates, directed edges with weights, both adjacency
    /// directions, the restriction index, and the spatial indices.
    /// cached dijkstra states are dropped since vertex indices change.
    pub(crate) fn rebuild(&mut self, node_order: Vec<NodeId>) -> Result<(), GraphError> {
        let vertex_count = node_order.len();
        self.node_to_index = node_order
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, index))
            .collect();
        self.node_coordinates = node_order
            .iter()
            .map(|id| self.get_node(id).map(|n| n.location))
            .collect::<Result<Vec<_>, _>>()?;
        self.index_to_node = node_order;

        self.weights = SparseWeights::new(vertex_count);
        self.edge_to_way = HashMap::new();
        self.node_to_way = HashMap::new();

        // iterate ways in ascending id order so the edge -> way mapping
        // resolves parallel-way conflicts to the smallest way id.
        let way_ids = self.ways.keys().copied().sorted().collect_vec();
        for way_id in tqdm!(
            way_ids.iter(),
            desc = "emit directed edges",
            total = way_ids.len()
        ) {
            let way = self
                .ways
                .get(way_id)
                .ok_or(GraphError::MissingWay(*way_id))?;
            for node_id in way.nodes.iter() {
                if !self.node_to_index.contains_key(node_id) {
                    return Err(GraphError::DataQuality(format!(
                        "way {} references node {} missing from the graph",
                        way.id, node_id
                    )));
                }
            }

            let mut edges: Vec<(NodeId, NodeId)> = vec![];
            for pair in way.nodes.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let (src, dst) = if way.reverseway { (b, a) } else { (a, b) };
                edges.push((src, dst));
                if !way.oneway {
                    edges.push((dst, src));
                }
            }
            for (src, dst) in edges.into_iter() {
                let u = self.node_to_index[&src];
                let v = self.node_to_index[&dst];
                let weight = edge_weight(
                    way,
                    &self.node_coordinates[u],
                    &self.node_coordinates[v],
                    self.weight_type,
                    &self.network_config,
                );
                self.weights.set(u, v, weight);
                self.edge_to_way.entry((src, dst)).or_insert(way.id);
            }
            for node_id in way.nodes.iter() {
                self.node_to_way.entry(*node_id).or_default().insert(way.id);
            }
        }
        eprintln!();

        self.out_adjacency = (0..vertex_count)
            .map(|u| match self.weights.row(u) {
                Some(row) => row.keys().copied().sorted().collect_vec(),
                None => vec![],
            })
            .collect();
        let mut in_adjacency: Vec<Vec<usize>> = vec![vec![]; vertex_count];
        for (u, v, _) in self.weights.iter_edges() {
            in_adjacency[v].push(u);
        }
        for neighbors in in_adjacency.iter_mut() {
            neighbors.sort_unstable();
        }
        self.in_adjacency = in_adjacency;

        let (index, invalid) = restriction_index::build_index(self);
        for id in invalid.into_iter() {
            self.restrictions.remove(&id);
        }
        self.indexed_restrictions = index;

        self.node_index = NodeIndex::build(&self.node_coordinates);
        self.way_index = WayIndex::build(&self.ways, &self.nodes);
        self.dijkstra_states.clear();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportConfig;
    use crate::model::{RawNode, RawWay};
    use serde_json::json;

    fn raw_node(id: i64, lat: f64, lon: f64) -> RawNode {
        RawNode {
            id,
            lat,
            lon,
            tags: HashMap::new(),
        }
    }

    fn raw_way(id: i64, nodes: Vec<i64>, tags: Vec<(&str, serde_json::Value)>) -> RawWay {
        RawWay {
            id,
            nodes,
            tags: tags
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    fn two_way_fixture() -> RawOsmData {
        RawOsmData {
            node: vec![
                raw_node(1, -38.0751637, 145.3326838),
                raw_node(2, -38.0752637, 145.3326838),
                raw_node(3, -38.0753637, 145.3326838),
            ],
            way: vec![raw_way(
                10,
                vec![1, 2, 3],
                vec![("highway", json!("residential")), ("maxspeed", json!(50))],
            )],
            relation: vec![],
        }
    }

    #[test]
    fn two_way_way_emits_both_directions() {
        let graph = build_graph(two_way_fixture(), &ImportConfig::default()).unwrap();
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 4);
        let u = graph.index_for_node(&NodeId(1)).unwrap();
        let v = graph.index_for_node(&NodeId(2)).unwrap();
        assert!(graph.weights.get(u, v).is_some());
        assert!(graph.weights.get(v, u).is_some());
        assert_eq!(graph.edge_to_way[&(NodeId(1), NodeId(2))], WayId(10));
    }

    #[test]
    fn oneway_way_emits_single_direction() {
        let mut raw = two_way_fixture();
        raw.way[0]
            .tags
            .insert(String::from("oneway"), json!("yes"));
        let graph = build_graph(raw, &ImportConfig::default()).unwrap();
        let u = graph.index_for_node(&NodeId(1)).unwrap();
        let v = graph.index_for_node(&NodeId(2)).unwrap();
        assert!(graph.weights.get(u, v).is_some());
        assert!(graph.weights.get(v, u).is_none());
    }

    #[test]
    fn reverseway_flips_edge_direction() {
        let mut raw = two_way_fixture();
        raw.way[0].tags.insert(String::from("oneway"), json!("-1"));
        let graph = build_graph(raw, &ImportConfig::default()).unwrap();
        let u = graph.index_for_node(&NodeId(1)).unwrap();
        let v = graph.index_for_node(&NodeId(2)).unwrap();
        assert!(graph.weights.get(u, v).is_none());
        assert!(graph.weights.get(v, u).is_some());
    }

    #[test]
    fn unreferenced_nodes_are_dropped() {
        let mut raw = two_way_fixture();
        raw.node.push(raw_node(99, -38.2, 145.4));
        let graph = build_graph(raw, &ImportConfig::default()).unwrap();
        assert!(graph.nodes.get(&NodeId(99)).is_none());
        assert_eq!(graph.vertex_count(), 3);
    }

    #[test]
    fn missing_way_node_is_a_data_quality_failure() {
        let mut raw = two_way_fixture();
        raw.node.remove(1);
        let result = build_graph(raw, &ImportConfig::default());
        assert!(matches!(result, Err(GraphError::DataQuality(_))));
    }

    #[test]
    fn empty_network_is_rejected() {
        let raw = RawOsmData {
            node: vec![raw_node(1, 0.0, 0.0)],
            way: vec![],
            relation: vec![],
        };
        assert!(matches!(
            build_graph(raw, &ImportConfig::default()),
            Err(GraphError::NoWaysRetained)
        ));
    }

    #[test]
    fn parallel_ways_resolve_edge_to_smallest_way_id() {
        let mut raw = two_way_fixture();
        raw.way.push(raw_way(
            5,
            vec![1, 2],
            vec![("highway", json!("residential"))],
        ));
        let graph = build_graph(raw, &ImportConfig::default()).unwrap();
        assert_eq!(graph.edge_to_way[&(NodeId(1), NodeId(2))], WayId(5));
    }

    #[test]
    fn vertex_bijection_is_dense_and_inverse() {
        let graph = build_graph(two_way_fixture(), &ImportConfig::default()).unwrap();
        for (index, id) in graph.index_to_node.iter().enumerate() {
            assert_eq!(graph.node_to_index[id], index);
        }
        assert_eq!(graph.node_to_index.len(), graph.index_to_node.len());
    }
}
