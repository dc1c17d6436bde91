use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::model::geo::euclidean_km;
use crate::model::GeoLocation;

/// a tree entry: the node's Cartesian position tagged with its dense
/// vertex index.
type IndexedPoint = GeomWithData<[f64; 3], usize>;

/// nearest-node index over the graph's vertices.
///
/// points are loaded in vertex-index order, so the payload of every tree
/// entry is the vertex index of the corresponding node. rebuilt whenever
/// the node set changes.
#[derive(Clone)]
pub struct NodeIndex {
    tree: RTree<IndexedPoint>,
}

impl Default for NodeIndex {
    fn default() -> Self {
        NodeIndex { tree: RTree::new() }
    }
}

impl std::fmt::Debug for NodeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeIndex({} points)", self.tree.size())
    }
}

impl NodeIndex {
    pub fn build(coordinates: &[GeoLocation]) -> NodeIndex {
        let points = coordinates
            .iter()
            .enumerate()
            .map(|(vertex, loc)| GeomWithData::new(loc.to_cartesian(), vertex))
            .collect();
        NodeIndex {
            tree: RTree::bulk_load(points),
        }
    }

    /// the closest vertex to `query` and its chord distance in km.
    pub fn nearest(&self, query: &GeoLocation) -> Option<(usize, f64)> {
        let q = query.to_cartesian();
        self.tree
            .nearest_neighbor(&q)
            .map(|entry| (entry.data, euclidean_km(entry.geom(), &q)))
    }

    /// the `k` closest vertices to `query`, nearest first.
    pub fn k_nearest(&self, query: &GeoLocation, k: usize) -> Vec<(usize, f64)> {
        let q = query.to_cartesian();
        self.tree
            .nearest_neighbor_iter(&q)
            .take(k)
            .map(|entry| (entry.data, euclidean_km(entry.geom(), &q)))
            .collect()
    }

    /// the closest vertex for which `skip` is false. used to exclude the
    /// origin vertex when querying outward from a known node.
    pub fn nearest_filtered(
        &self,
        query: &GeoLocation,
        skip: impl Fn(usize) -> bool,
    ) -> Option<(usize, f64)> {
        let q = query.to_cartesian();
        self.tree
            .nearest_neighbor_iter(&q)
            .find(|entry| !skip(entry.data))
            .map(|entry| (entry.data, euclidean_km(entry.geom(), &q)))
    }
}
