//! Compact, query-ready road and rail networks from OpenStreetMap extracts.
//!
//! The crate ingests a collaborator-normalized OSM attribute tree (nodes,
//! ways, and turn-restriction relations) and produces an in-memory
//! [`Graph`] supporting tagged edge-weighted routing with turn
//! restrictions, nearest-node and nearest-way spatial queries, and
//! topological simplification of degree-two chains.
//!
//! ```no_run
//! use osmnet::config::ImportConfig;
//!
//! let raw: osmnet::model::RawOsmData =
//!     serde_json::from_str(&std::fs::read_to_string("melbourne.json").unwrap()).unwrap();
//! let graph = osmnet::graph::build_graph(raw, &ImportConfig::default()).unwrap();
//! let path = graph
//!     .shortest_path(
//!         osmnet::routing::RoutingAlgorithm::DijkstraVector,
//!         osmnet::model::NodeId(1001),
//!         osmnet::model::NodeId(1004),
//!         &osmnet::routing::RouteOptions::default(),
//!     )
//!     .unwrap();
//! println!("{path:?}");
//! ```

pub mod config;
pub mod graph;
pub mod model;
pub mod routing;
pub mod spatial;

pub use graph::{build_graph, Graph};
pub use model::{GraphError, NetworkType, NodeId, RelationId, WayId, WeightType};
pub use routing::{RouteOptions, RoutingAlgorithm};
