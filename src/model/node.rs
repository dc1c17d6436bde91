use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{GeoLocation, NodeId};

/// an OSM node retained in the network: a position plus its raw tags.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub location: GeoLocation,
    pub tags: HashMap<String, String>,
}

impl Node {
    pub fn new(id: NodeId, location: GeoLocation) -> Node {
        Node {
            id,
            location,
            tags: HashMap::new(),
        }
    }
}
