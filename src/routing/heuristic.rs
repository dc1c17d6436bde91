use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::model::{GeoLocation, GraphError, WeightType};

/// the A* goal-distance estimate. must be admissible (never exceed the
/// true remaining cost) and non-negative for A* to return shortest
/// paths; with an inadmissible heuristic a path is still returned but
/// optimality is not guaranteed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// no estimate; A* degenerates to Dijkstra.
    #[default]
    Zero,
    /// haversine distance in km. admissible for distance weights.
    Distance,
    /// haversine distance at 100 km/h, in hours. admissible for time and
    /// lane-efficiency weights provided no way exceeds 100 km/h.
    Time,
}

impl Heuristic {
    /// the admissible default for a weight type.
    pub fn default_for(weight_type: WeightType) -> Heuristic {
        match weight_type {
            WeightType::Distance => Heuristic::Distance,
            WeightType::Time | WeightType::LaneEfficiency => Heuristic::Time,
        }
    }

    pub fn estimate(&self, vertex: usize, goal: usize, coordinates: &[GeoLocation]) -> f64 {
        match self {
            Heuristic::Zero => 0.0,
            Heuristic::Distance => coordinates[vertex].haversine_km(&coordinates[goal]),
            Heuristic::Time => coordinates[vertex].haversine_km(&coordinates[goal]) / 100.0,
        }
    }
}

impl FromStr for Heuristic {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zero" => Ok(Heuristic::Zero),
            "distance" => Ok(Heuristic::Distance),
            "time" => Ok(Heuristic::Time),
            other => Err(GraphError::UnknownOption(other.to_string(), "heuristic")),
        }
    }
}
