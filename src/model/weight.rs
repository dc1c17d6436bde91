use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use super::GraphError;

/// selects the quantity stored in the edge weight matrix.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightType {
    /// haversine distance in kilometers.
    #[default]
    Distance,
    /// travel time in hours at the way's maxspeed.
    Time,
    /// travel time in hours scaled by a lane-count efficiency factor.
    LaneEfficiency,
}

impl Display for WeightType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WeightType::Distance => "distance",
            WeightType::Time => "time",
            WeightType::LaneEfficiency => "lane_efficiency",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for WeightType {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "distance" => Ok(WeightType::Distance),
            "time" => Ok(WeightType::Time),
            "lane_efficiency" => Ok(WeightType::LaneEfficiency),
            other => Err(GraphError::UnknownOption(other.to_string(), "weight_type")),
        }
    }
}
