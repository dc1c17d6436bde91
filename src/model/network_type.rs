use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use super::GraphError;

/// the kind of transport network to extract from an OSM attribute tree.
/// each variant selects a set of way exclusion rules (see
/// [`crate::config::NetworkConfig::exclusions`]).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkType {
    #[default]
    Drive,
    DriveService,
    Walk,
    Bike,
    All,
    AllPrivate,
    None,
    Rail,
    DriveMainroads,
}

impl NetworkType {
    pub const ALL_TYPES: [NetworkType; 9] = [
        NetworkType::Drive,
        NetworkType::DriveService,
        NetworkType::Walk,
        NetworkType::Bike,
        NetworkType::All,
        NetworkType::AllPrivate,
        NetworkType::None,
        NetworkType::Rail,
        NetworkType::DriveMainroads,
    ];

    /// rail networks select ways by their `railway` tag instead of `highway`.
    pub fn is_rail(&self) -> bool {
        matches!(self, NetworkType::Rail)
    }

    /// the tag a way must carry to be considered part of this network.
    pub fn class_tag(&self) -> &'static str {
        if self.is_rail() {
            "railway"
        } else {
            "highway"
        }
    }
}

impl Display for NetworkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NetworkType::Drive => "drive",
            NetworkType::DriveService => "drive_service",
            NetworkType::Walk => "walk",
            NetworkType::Bike => "bike",
            NetworkType::All => "all",
            NetworkType::AllPrivate => "all_private",
            NetworkType::None => "none",
            NetworkType::Rail => "rail",
            NetworkType::DriveMainroads => "drive_mainroads",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for NetworkType {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drive" => Ok(NetworkType::Drive),
            "drive_service" => Ok(NetworkType::DriveService),
            "walk" => Ok(NetworkType::Walk),
            "bike" => Ok(NetworkType::Bike),
            "all" => Ok(NetworkType::All),
            "all_private" => Ok(NetworkType::AllPrivate),
            "none" => Ok(NetworkType::None),
            "rail" => Ok(NetworkType::Rail),
            "drive_mainroads" => Ok(NetworkType::DriveMainroads),
            other => Err(GraphError::UnknownOption(
                other.to_string(),
                "network_type",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_names() {
        for nt in NetworkType::ALL_TYPES {
            assert_eq!(NetworkType::from_str(&nt.to_string()).unwrap(), nt);
        }
    }

    #[test]
    fn rejects_unknown_name() {
        assert!(matches!(
            NetworkType::from_str("horse"),
            Err(GraphError::UnknownOption(_, "network_type"))
        ));
    }
}
