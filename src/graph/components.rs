//! weakly connected component analysis and largest-component trimming.

use itertools::Itertools;
use kdam::tqdm;
use std::collections::{HashSet, VecDeque};

use super::Graph;
use crate::model::{GraphError, NodeId};

/// finds the weakly connected components of a directed adjacency,
/// treating every edge as undirected for reachability. vertices are
/// visited in index order and neighbors expanded in sorted order, so
/// repeated runs produce identical component lists.
pub(crate) fn weakly_connected_components(
    out_adjacency: &[Vec<usize>],
    in_adjacency: &[Vec<usize>],
) -> Vec<Vec<usize>> {
    let vertex_count = out_adjacency.len();
    let mut assigned = vec![false; vertex_count];
    let mut components: Vec<Vec<usize>> = vec![];

    for start in 0..vertex_count {
        if assigned[start] {
            continue;
        }
        // breadth-first over the union of out- and in-neighbors
        let mut component = vec![];
        let mut frontier: VecDeque<usize> = VecDeque::new();
        assigned[start] = true;
        frontier.push_back(start);
        while let Some(vertex) = frontier.pop_front() {
            component.push(vertex);
            let neighbors = out_adjacency[vertex]
                .iter()
                .chain(in_adjacency[vertex].iter())
                .copied()
                .sorted()
                .dedup();
            for neighbor in neighbors {
                if !assigned[neighbor] {
                    assigned[neighbor] = true;
                    frontier.push_back(neighbor);
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }
    components
}

impl Graph {
    /// reduces the graph to its largest weakly connected component,
    /// cascading deletions to ways, restrictions, and all derived state.
    ///
    /// components are ordered by size descending with the smallest
    /// member vertex as a deterministic tie-break.
    pub fn retain_largest_component(&mut self) -> Result<(), GraphError> {
        let components =
            weakly_connected_components(&self.out_adjacency, &self.in_adjacency);
        if components.len() <= 1 {
            log::info!("graph is already a single weakly connected component");
            return Ok(());
        }

        let largest = components
            .iter()
            .max_by_key(|c| (c.len(), std::cmp::Reverse(c.first().copied())))
            .ok_or_else(|| {
                GraphError::InternalError(String::from("graph has no connected components"))
            })?;
        log::info!(
            "retaining largest of {} components ({} of {} nodes)",
            components.len(),
            largest.len(),
            self.vertex_count()
        );

        let keep: HashSet<NodeId> = largest
            .iter()
            .map(|vertex| self.index_to_node[*vertex])
            .collect();

        let dropped_ways = self
            .ways
            .values()
            .filter(|way| !way.nodes.iter().all(|n| keep.contains(n)))
            .map(|way| way.id)
            .collect_vec();
        for way_id in tqdm!(
            dropped_ways.iter(),
            desc = "drop ways outside the largest component",
            total = dropped_ways.len()
        ) {
            self.ways.remove(way_id);
        }
        eprintln!();

        self.nodes.retain(|id, _| keep.contains(id));
        let retained_ways: HashSet<_> = self.ways.keys().copied().collect();
        self.restrictions.retain(|_, r| {
            retained_ways.contains(&r.from_way)
                && retained_ways.contains(&r.to_way)
                && r.via_ways.iter().all(|w| retained_ways.contains(w))
                && r.via_node.map(|n| keep.contains(&n)).unwrap_or(true)
        });

        // preserve the original vertex ordering among survivors
        let node_order = self
            .index_to_node
            .iter()
            .filter(|id| keep.contains(id))
            .copied()
            .collect_vec();
        self.rebuild(node_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportConfig;
    use crate::graph::build_graph;
    use crate::model::{RawNode, RawOsmData, RawWay};
    use serde_json::json;
    use std::collections::HashMap;

    fn raw_node(id: i64, lat: f64, lon: f64) -> RawNode {
        RawNode {
            id,
            lat,
            lon,
            tags: HashMap::new(),
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

    /// two islands: nodes 1-2-3 connected, nodes 8-9 connected.
    fn two_islands() -> RawOsmData {
        RawOsmData {
            node: vec![
                raw_node(1, -38.01, 145.01),
                raw_node(2, -38.02, 145.01),
                raw_node(3, -38.03, 145.01),
                raw_node(8, -39.01, 146.01),
                raw_node(9, -39.02, 146.01),
            ],
            way: vec![raw_way(10, vec![1, 2, 3]), raw_way(11, vec![8, 9])],
            relation: vec![],
        }
    }

    #[test]
    fn components_split_disconnected_vertices() {
        let mut config = ImportConfig::default();
        config.largest_connected_component = false;
        let graph = build_graph(two_islands(), &config).unwrap();
        let components =
            weakly_connected_components(&graph.out_adjacency, &graph.in_adjacency);
        let mut sizes = components.iter().map(|c| c.len()).collect_vec();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![2, 3]);
    }

    #[test]
    fn oneway_edges_are_weak_connections() {
        let mut raw = two_islands();
        raw.way[1]
            .tags
            .insert(String::from("oneway"), json!("yes"));
        let mut config = ImportConfig::default();
        config.largest_connected_component = false;
        let graph = build_graph(raw, &config).unwrap();
        let components =
            weakly_connected_components(&graph.out_adjacency, &graph.in_adjacency);
        assert_eq!(components.len(), 2);
    }

    #[test]
    fn trim_keeps_largest_island_and_rebuilds() {
        let graph = build_graph(two_islands(), &ImportConfig::default()).unwrap();
        assert_eq!(graph.vertex_count(), 3);
        assert!(graph.nodes.contains_key(&crate::model::NodeId(1)));
        assert!(!graph.nodes.contains_key(&crate::model::NodeId(8)));
        assert!(!graph.ways.contains_key(&crate::model::WayId(11)));
        // bijection is dense again after the rebuild
        for (index, id) in graph.index_to_node.iter().enumerate() {
            assert_eq!(graph.node_to_index[id], index);
        }
        let components =
            weakly_connected_components(&graph.out_adjacency, &graph.in_adjacency);
        assert_eq!(components.len(), 1);
    }
}
