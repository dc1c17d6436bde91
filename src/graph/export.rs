//! CSV export of a built network: one file for vertices, one for
//! directed edges with WKT geometry, suitable for loading into
//! geo-dataframe tooling.

use geo::{Coord, LineString};
use itertools::Itertools;
use kdam::tqdm;
use serde::Serialize;
use std::path::Path;
use wkt::ToWkt;

use super::Graph;
use crate::model::GraphError;

#[derive(Serialize)]
struct NodeRow {
    vertex: usize,
    node_id: i64,
    lat: f64,
    lon: f64,
}

#[derive(Serialize)]
struct EdgeRow {
    src_node_id: i64,
    dst_node_id: i64,
    way_id: i64,
    weight: f64,
    geometry: String,
}

/// writes `nodes.csv` and `edges.csv` into `output_directory`,
/// creating it if necessary. rows are sorted for reproducible output.
pub fn write_csv(graph: &Graph, output_directory: &Path) -> Result<(), GraphError> {
    std::fs::create_dir_all(output_directory).map_err(|e| {
        GraphError::InternalError(format!(
            "cannot create output directory {}: {e}",
            output_directory.display()
        ))
    })?;

    let nodes_path = output_directory.join("nodes.csv");
    let mut nodes_writer = csv::Writer::from_path(&nodes_path)
        .map_err(|e| GraphError::CsvWriteError(nodes_path.display().to_string(), e))?;
    for (vertex, node_id) in tqdm!(
        graph.index_to_node.iter().enumerate(),
        desc = "write nodes.csv",
        total = graph.vertex_count()
    ) {
        let location = &graph.node_coordinates[vertex];
        nodes_writer
            .serialize(NodeRow {
                vertex,
                node_id: node_id.0,
                lat: location.lat,
                lon: location.lon,
            })
            .map_err(|e| GraphError::CsvWriteError(nodes_path.display().to_string(), e))?;
    }
    nodes_writer
        .flush()
        .map_err(|e| GraphError::InternalError(format!("flushing nodes.csv: {e}")))?;
    eprintln!();

    let edges_path = output_directory.join("edges.csv");
    let mut edges_writer = csv::Writer::from_path(&edges_path)
        .map_err(|e| GraphError::CsvWriteError(edges_path.display().to_string(), e))?;
    let edges = graph
        .weights
        .iter_edges()
        .sorted_by_key(|(u, v, _)| (*u, *v))
        .collect_vec();
    for (u, v, weight) in tqdm!(
        edges.iter().copied(),
        desc = "write edges.csv",
        total = edges.len()
    ) {
        let src = graph.index_to_node[u];
        let dst = graph.index_to_node[v];
        let way_id = graph
            .edge_to_way
            .get(&(src, dst))
            .copied()
            .ok_or_else(|| {
                GraphError::InternalError(format!("edge ({src}, {dst}) has no way mapping"))
            })?;
        let geometry: LineString<f64> = LineString::new(vec![
            Coord::from((graph.node_coordinates[u].lon, graph.node_coordinates[u].lat)),
            Coord::from((graph.node_coordinates[v].lon, graph.node_coordinates[v].lat)),
        ]);
        edges_writer
            .serialize(EdgeRow {
                src_node_id: src.0,
                dst_node_id: dst.0,
                way_id: way_id.0,
                weight,
                geometry: geometry.to_wkt().to_string(),
            })
            .map_err(|e| GraphError::CsvWriteError(edges_path.display().to_string(), e))?;
    }
    edges_writer
        .flush()
        .map_err(|e| GraphError::InternalError(format!("flushing edges.csv: {e}")))?;
    eprintln!();

    log::info!(
        "wrote {} nodes and {} edges to {}",
        graph.vertex_count(),
        edges.len(),
        output_directory.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportConfig;
    use crate::graph::build_graph;
    use crate::model::{RawNode, RawOsmData, RawWay};
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn writes_both_files_with_headers() {
        let raw = RawOsmData {
            node: vec![
                RawNode {
                    id: 1,
                    lat: -38.01,
                    lon: 145.01,
                    tags: HashMap::new(),
                },
                RawNode {
                    id: 2,
                    lat: -38.02,
                    lon: 145.01,
                    tags: HashMap::new(),
                },
            ],
            way: vec![RawWay {
                id: 10,
                nodes: vec![1, 2],
                tags: [(String::from("highway"), json!("residential"))]
                    .into_iter()
                    .collect(),
            }],
            relation: vec![],
        };
        let graph = build_graph(raw, &ImportConfig::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        write_csv(&graph, dir.path()).unwrap();

        let nodes = std::fs::read_to_string(dir.path().join("nodes.csv")).unwrap();
        assert!(nodes.starts_with("vertex,node_id,lat,lon"));
        assert_eq!(nodes.lines().count(), 3);

        let edges = std::fs::read_to_string(dir.path().join("edges.csv")).unwrap();
        assert!(edges.starts_with("src_node_id,dst_node_id,way_id,weight,geometry"));
        assert_eq!(edges.lines().count(), 3);
        assert!(edges.contains("LINESTRING"));
    }
}
