pub mod cli_error;
pub mod error;
pub mod geo;
mod id;
pub mod network_type;
pub mod node;
pub mod raw;
pub mod restriction;
pub mod tag_parse;
pub mod way;
mod weight;

pub use cli_error::CliError;
pub use error::GraphError;
pub use geo::GeoLocation;
pub use id::{NodeId, RelationId, WayId};
pub use network_type::NetworkType;
pub use node::Node;
pub use raw::{RawMember, RawNode, RawOsmData, RawRelation, RawWay};
pub use restriction::{Restriction, RestrictionKind};
pub use way::{RailInfo, Way};
pub use weight::WeightType;
