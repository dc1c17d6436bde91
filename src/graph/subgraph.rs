use itertools::Itertools;
use std::collections::HashSet;

use super::Graph;
use crate::model::{GraphError, NodeId};

impl Graph {
    /// extracts the subgraph induced by a node subset: every way with at
    /// least one node in the subset is included, together with all of
    /// its nodes, plus the restrictions whose referenced ways and via
    /// nodes all survive. the result is a fully rebuilt graph sharing
    /// this graph's weight type and configuration; largest-component
    /// trimming is not re-applied.
    pub fn osm_subgraph(&self, node_subset: &[NodeId]) -> Result<Graph, GraphError> {
        let subset: HashSet<NodeId> = node_subset.iter().copied().collect();
        for id in subset.iter() {
            if !self.nodes.contains_key(id) {
                return Err(GraphError::MissingNode(*id));
            }
        }

        let ways: std::collections::HashMap<_, _> = self
            .ways
            .iter()
            .filter(|(_, way)| way.nodes.iter().any(|n| subset.contains(n)))
            .map(|(id, way)| (*id, way.clone()))
            .collect();

        let keep_nodes: HashSet<NodeId> = ways
            .values()
            .flat_map(|way| way.nodes.iter().copied())
            .collect();
        let nodes = keep_nodes
            .iter()
            .map(|id| self.get_node(id).map(|n| (*id, n.clone())))
            .collect::<Result<std::collections::HashMap<_, _>, _>>()?;

        let retained_ways: HashSet<_> = ways.keys().copied().collect();
        let restrictions = self
            .restrictions
            .iter()
            .filter(|(_, r)| {
                retained_ways.contains(&r.from_way)
                    && retained_ways.contains(&r.to_way)
                    && r.via_ways.iter().all(|w| retained_ways.contains(w))
                    && r.via_node.map(|n| keep_nodes.contains(&n)).unwrap_or(true)
            })
            .map(|(id, r)| (*id, r.clone()))
            .collect();

        let node_order = self
            .index_to_node
            .iter()
            .filter(|id| keep_nodes.contains(id))
            .copied()
            .collect_vec();

        let mut subgraph = Graph {
            nodes,
            ways,
            restrictions,
            weight_type: self.weight_type,
            network_type: self.network_type,
            network_config: self.network_config.clone(),
            ..Default::default()
        };
        subgraph.rebuild(node_order)?;
        log::info!(
            "extracted subgraph with {} of {} nodes and {} of {} ways",
            subgraph.vertex_count(),
            self.vertex_count(),
            subgraph.ways.len(),
            self.ways.len()
        );
        Ok(subgraph)
    }
}
