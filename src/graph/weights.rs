use serde::{Deserialize, Serialize};

use crate::config::NetworkConfig;
use crate::model::{GeoLocation, Way, WeightType};

/// sparse |V|x|V| matrix of edge weights keyed by dense vertex index.
/// rows are dense (one per vertex), columns sparse; an entry is present
/// iff the directed edge exists, so "no edge" is always distinct from
/// "zero-cost edge".
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SparseWeights {
    rows: Vec<std::collections::HashMap<usize, f64>>,
}

impl SparseWeights {
    pub fn new(vertex_count: usize) -> SparseWeights {
        SparseWeights {
            rows: vec![std::collections::HashMap::new(); vertex_count],
        }
    }

    pub fn dimension(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, u: usize, v: usize) -> Option<f64> {
        self.rows.get(u)?.get(&v).copied()
    }

    /// stores a weight, clipping to the smallest positive representable
    /// value so every stored entry stays strictly positive (required by
    /// Dijkstra's optimality argument).
    pub fn set(&mut self, u: usize, v: usize, weight: f64) {
        self.rows[u].insert(v, weight.max(f64::MIN_POSITIVE));
    }

    pub fn row(&self, u: usize) -> Option<&std::collections::HashMap<usize, f64>> {
        self.rows.get(u)
    }

    pub fn edge_count(&self) -> usize {
        self.rows.iter().map(|row| row.len()).sum()
    }

    pub fn iter_edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(u, row)| row.iter().map(move |(v, w)| (u, *v, *w)))
    }
}

/// computes the weight of the directed edge `(u, v)` carried by `way`.
pub fn edge_weight(
    way: &Way,
    from: &GeoLocation,
    to: &GeoLocation,
    weight_type: WeightType,
    config: &NetworkConfig,
) -> f64 {
    let distance_km = from.haversine_km(to);
    match weight_type {
        WeightType::Distance => distance_km,
        WeightType::Time => distance_km / way.maxspeed as f64,
        WeightType::LaneEfficiency => {
            distance_km / (way.maxspeed as f64 * config.lane_efficiency_for(way.lanes))
        }
    }
}
