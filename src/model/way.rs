use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{NodeId, WayId};

/// an OSM way retained in the network after tag normalization.
///
/// the typed routing fields (`maxspeed`, `lanes`, `oneway`, `reverseway`)
/// are always populated, either from parsed tags or from the per-class
/// defaults. the remaining raw tags are kept as strings in `tags`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Way {
    pub id: WayId,
    /// ordered node ids, at least two after consecutive-duplicate removal.
    pub nodes: Vec<NodeId>,
    /// `highway` classification; present for all non-rail networks.
    pub highway: Option<String>,
    /// `railway` classification; present for rail networks.
    pub railway: Option<String>,
    /// speed limit in km/h.
    pub maxspeed: u32,
    /// lane count, at least 1.
    pub lanes: u32,
    /// traversable only along the stored node order (or only against it
    /// when `reverseway` is also set).
    pub oneway: bool,
    /// the raw `oneway` tag was `-1`: traversal runs against the stored
    /// node order.
    pub reverseway: bool,
    /// rail-specific attributes, present iff this way was selected by a
    /// rail network type.
    pub rail: Option<RailInfo>,
    /// residual tags not captured by the typed fields.
    pub tags: HashMap<String, String>,
}

/// attributes carried by rail ways. missing values default to the
/// literal string `"unknown"`, except `gauge` which stays null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RailInfo {
    pub rail_type: String,
    pub electrified: String,
    pub gauge: Option<String>,
    pub usage: String,
    pub name: String,
}

impl Default for RailInfo {
    fn default() -> Self {
        RailInfo {
            rail_type: String::from("unknown"),
            electrified: String::from("unknown"),
            gauge: None,
            usage: String::from("unknown"),
            name: String::from("unknown"),
        }
    }
}

impl Way {
    /// the first and last node of the way. these are the only positions a
    /// via node of a turn restriction may occupy.
    pub fn trailing_nodes(&self) -> Vec<NodeId> {
        match (self.nodes.first(), self.nodes.last()) {
            (Some(a), Some(b)) if a == b => vec![*a],
            (Some(a), Some(b)) => vec![*a, *b],
            _ => vec![],
        }
    }

    pub fn is_trailing(&self, node: &NodeId) -> bool {
        self.nodes.first() == Some(node) || self.nodes.last() == Some(node)
    }

    /// whether the stored node order `nodes[i] -> nodes[i+1]` is a legal
    /// traversal direction.
    pub fn forward_traversable(&self) -> bool {
        !self.reverseway
    }

    /// whether traversal against the stored node order is legal.
    pub fn backward_traversable(&self) -> bool {
        !self.oneway || self.reverseway
    }
}
