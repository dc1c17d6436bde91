use clap::{Parser, Subcommand};
use osmnet::config::ImportConfig;
use osmnet::model::{CliError, NodeId, RawOsmData};
use osmnet::routing::{RouteOptions, RoutingAlgorithm};
use std::path::Path;
use std::str::FromStr;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct OsmnetArguments {
    #[command(subcommand)]
    app: App,
}

#[derive(Subcommand)]
pub enum App {
    /// build a network graph from a normalized OSM extract and export it as CSV
    Graph {
        #[arg(long, help = "path to normalized OSM JSON file for import")]
        osm_file: String,
        #[arg(long, help = "path to file with osmnet import parameters")]
        configuration_file: Option<String>,
        #[arg(long, help = "output path for network dataset")]
        output_directory: String,
    },
    /// answer a single shortest-path query against a freshly built network
    Route {
        #[arg(long, help = "path to normalized OSM JSON file for import")]
        osm_file: String,
        #[arg(long, help = "path to file with osmnet import parameters")]
        configuration_file: Option<String>,
        #[arg(long, help = "origin OSM node id")]
        origin: i64,
        #[arg(long, help = "destination OSM node id")]
        destination: i64,
        #[arg(
            long,
            default_value = "dijkstra_vector",
            help = "dijkstra_vector | dijkstra_dict | astar_vector | astar_dict"
        )]
        algorithm: String,
        #[arg(long, help = "abandon the search beyond this total weight")]
        max_distance: Option<f64>,
    },
}

fn load_config(configuration_file: &Option<String>) -> Result<ImportConfig, CliError> {
    match configuration_file {
        None => Ok(ImportConfig::default()),
        Some(f) => {
            log::info!("reading osmnet configuration from {f}");
            Ok(ImportConfig::try_from(f)?)
        }
    }
}

fn load_osm(osm_file: &str) -> Result<RawOsmData, CliError> {
    let payload = std::fs::read_to_string(osm_file)
        .map_err(|e| CliError::InputReadError(osm_file.to_string(), e.to_string()))?;
    serde_json::from_str(&payload)
        .map_err(|e| CliError::InputReadError(osm_file.to_string(), e.to_string()))
}

pub fn run(app: &App) -> Result<(), CliError> {
    env_logger::init();
    match app {
        App::Graph {
            osm_file,
            configuration_file,
            output_directory,
        } => {
            let config = load_config(configuration_file)?;
            let raw = load_osm(osm_file)?;
            let graph = osmnet::graph::build_graph(raw, &config)?;
            osmnet::graph::write_csv(&graph, Path::new(output_directory))?;
            eprintln!("finished.");
            Ok(())
        }
        App::Route {
            osm_file,
            configuration_file,
            origin,
            destination,
            algorithm,
            max_distance,
        } => {
            let config = load_config(configuration_file)?;
            let algorithm = RoutingAlgorithm::from_str(algorithm)?;
            let raw = load_osm(osm_file)?;
            let graph = osmnet::graph::build_graph(raw, &config)?;
            let options = RouteOptions {
                max_distance: *max_distance,
                ..Default::default()
            };
            let path = graph.shortest_path(
                algorithm,
                NodeId(*origin),
                NodeId(*destination),
                &options,
            )?;
            match path {
                None => println!("no path found"),
                Some(path) => {
                    let total = graph.total_path_weight(&path, None)?;
                    let ids = path
                        .iter()
                        .map(|id| id.to_string())
                        .collect::<Vec<_>>()
                        .join(" -> ");
                    println!("{ids}");
                    println!("total {} weight: {total}", graph.weight_type);
                }
            }
            Ok(())
        }
    }
}

fn main() {
    let args = OsmnetArguments::parse();
    if let Err(e) = run(&args.app) {
        log::error!("osmnet failed: {e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
}
