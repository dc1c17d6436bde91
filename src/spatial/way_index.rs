use itertools::Itertools;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};
use std::collections::HashMap;

use crate::model::{Node, NodeId, Way, WayId};

/// a tree entry: the axis-aligned bounding box of a way's node
/// coordinates in Cartesian space, tagged with the way id.
type WayVolume = GeomWithData<Rectangle<[f64; 3]>, WayId>;

/// bounding-volume index over ways, answering box intersection queries
/// for the nearest-way search. rebuilt whenever the node set changes.
#[derive(Clone)]
pub struct WayIndex {
    tree: RTree<WayVolume>,
}

impl Default for WayIndex {
    fn default() -> Self {
        WayIndex { tree: RTree::new() }
    }
}

impl std::fmt::Debug for WayIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WayIndex({} volumes)", self.tree.size())
    }
}

impl WayIndex {
    pub fn build(ways: &HashMap<WayId, Way>, nodes: &HashMap<NodeId, Node>) -> WayIndex {
        let volumes = ways
            .values()
            .filter_map(|way| {
                let mut min = [f64::INFINITY; 3];
                let mut max = [f64::NEG_INFINITY; 3];
                for node_id in way.nodes.iter() {
                    let p = nodes.get(node_id)?.location.to_cartesian();
                    for axis in 0..3 {
                        min[axis] = min[axis].min(p[axis]);
                        max[axis] = max[axis].max(p[axis]);
                    }
                }
                Some(GeomWithData::new(
                    Rectangle::from_corners(min, max),
                    way.id,
                ))
            })
            .collect();
        WayIndex {
            tree: RTree::bulk_load(volumes),
        }
    }

    /// ids of all ways whose bounding box intersects the axis-aligned
    /// cube of half-width `radius_km` centered at `center`, sorted for
    /// deterministic iteration.
    pub fn intersecting_cube(&self, center: &[f64; 3], radius_km: f64) -> Vec<WayId> {
        let lower = [
            center[0] - radius_km,
            center[1] - radius_km,
            center[2] - radius_km,
        ];
        let upper = [
            center[0] + radius_km,
            center[1] + radius_km,
            center[2] + radius_km,
        ];
        let envelope = AABB::from_corners(lower, upper);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data)
            .sorted()
            .collect_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GeoLocation;

    fn fixture() -> (HashMap<WayId, Way>, HashMap<NodeId, Node>) {
        let mut nodes = HashMap::new();
        for (id, lat, lon) in [
            (1, -38.0751637, 145.3326838),
            (2, -38.0752637, 145.3326838),
            (3, -38.2000000, 145.5000000),
            (4, -38.2001000, 145.5000000),
        ] {
            nodes.insert(
                NodeId(id),
                Node::new(NodeId(id), GeoLocation::new(lat, lon)),
            );
        }
        let mut ways = HashMap::new();
        for (id, a, b) in [(10, 1, 2), (11, 3, 4)] {
            ways.insert(
                WayId(id),
                Way {
                    id: WayId(id),
                    nodes: vec![NodeId(a), NodeId(b)],
                    ..Default::default()
                },
            );
        }
        (ways, nodes)
    }

    #[test]
    fn finds_only_ways_near_the_query() {
        let (ways, nodes) = fixture();
        let index = WayIndex::build(&ways, &nodes);
        let q = GeoLocation::new(-38.0752, 145.3327).to_cartesian();
        let hits = index.intersecting_cube(&q, 1.0);
        assert_eq!(hits, vec![WayId(10)]);
    }

    #[test]
    fn large_radius_covers_everything() {
        let (ways, nodes) = fixture();
        let index = WayIndex::build(&ways, &nodes);
        let q = GeoLocation::new(-38.1, 145.4).to_cartesian();
        let hits = index.intersecting_cube(&q, 100.0);
        assert_eq!(hits, vec![WayId(10), WayId(11)]);
    }
}
