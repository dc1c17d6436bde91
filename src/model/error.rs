use thiserror::Error;

use super::{NodeId, RelationId, WayId};

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("invalid network configuration: {0}")]
    ConfigurationError(String),
    #[error("unsupported value for tag '{0}': {1}")]
    BadTag(String, String),
    #[error("invalid turn restriction '{0}': {1}")]
    BadRestriction(RelationId, String),
    #[error("structure of OSM data is invalid: {0}")]
    DataQuality(String),
    #[error("unrecognized {1} option '{0}'")]
    UnknownOption(String, &'static str),
    #[error("no dijkstra state computed for origin node '{0}'")]
    UndefinedCachedState(NodeId),
    #[error("attempting to get node '{0}' not in graph")]
    MissingNode(NodeId),
    #[error("attempting to get way '{0}' not in graph")]
    MissingWay(WayId),
    #[error("vertex index {0} exceeds graph size {1}")]
    MissingVertex(usize, usize),
    #[error("no edge between nodes '{0}' and '{1}'")]
    MissingEdge(NodeId, NodeId),
    #[error("input contains no ways after applying the network type filter")]
    NoWaysRetained,
    #[error("failure simplifying graph: {0}")]
    GraphSimplificationError(String),
    #[error("failure writing to file {0}: {1}")]
    CsvWriteError(String, csv::Error),
    #[error("{0}")]
    InternalError(String),
}
