use thiserror::Error;

use super::GraphError;

/// application-level failures for the CLI entry points.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("invalid configuration: {0}")]
    ConfigurationError(String),
    #[error("failure reading OSM input {0}: {1}")]
    InputReadError(String, String),
    #[error(transparent)]
    GraphError(#[from] GraphError),
}
