//! spatial indices over the network: a 3-D Cartesian point index for
//! nearest-node queries and a 3-D axis-aligned bounding-volume index for
//! nearest-way queries. both operate in the Cartesian space produced by
//! [`crate::model::GeoLocation::to_cartesian`], so all distances are
//! straight-line chord distances in kilometers.

mod node_index;
mod way_index;

pub use node_index::NodeIndex;
pub use way_index::WayIndex;

use serde::{Deserialize, Serialize};

use crate::model::NodeId;

/// a position along a way: the fraction `position` in [0, 1] of the way
/// segment between two consecutive nodes `n1` and `n2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgePoint {
    pub n1: NodeId,
    pub n2: NodeId,
    pub position: f64,
}
