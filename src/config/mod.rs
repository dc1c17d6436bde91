//! import configuration: per-class default tables, network exclusion
//! rules, and build behavior flags, loadable from TOML or JSON.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::model::{GraphError, NetworkType, WeightType};

/// a single way exclusion: ways whose `key` tag takes one of the
/// `disallowed` values are dropped from the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionRule {
    pub key: String,
    pub disallowed: HashSet<String>,
}

impl ExclusionRule {
    pub fn new(key: &str, disallowed: &[&str]) -> ExclusionRule {
        ExclusionRule {
            key: key.to_string(),
            disallowed: disallowed.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// the tables consulted during tag normalization and weight computation.
/// `maxspeeds`, `lanes`, and `oneway` are keyed by highway class and must
/// contain an `"other"` entry for unknown classes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// default speed limit by highway class, km/h.
    pub maxspeeds: HashMap<String, u32>,
    /// default lane count by highway class.
    pub lanes: HashMap<String, u32>,
    /// efficiency factor by lane count; counts outside the table use 1.0.
    pub lane_efficiency: HashMap<u32, f64>,
    /// default oneway flag by highway class.
    pub oneway: HashMap<String, bool>,
    /// meters per building level. consumed by the buildings extractor,
    /// carried here because it shares the configuration file.
    pub building_height_per_level: f64,
    /// cap on building levels for the same collaborator.
    pub max_building_levels: u32,
    /// per-network-type way exclusion rules, applied as a
    /// conjunction-of-exclusions.
    pub exclusions: HashMap<NetworkType, Vec<ExclusionRule>>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            maxspeeds: default_maxspeeds(),
            lanes: default_lanes(),
            lane_efficiency: default_lane_efficiency(),
            oneway: default_oneway(),
            building_height_per_level: 3.0,
            max_building_levels: 6,
            exclusions: default_exclusions(),
        }
    }
}

impl NetworkConfig {
    /// checks the table shape requirements: the per-class tables must
    /// carry an `"other"` fallback and lane counts must be positive.
    pub fn validate(&self) -> Result<(), GraphError> {
        for (name, has_other) in [
            ("maxspeeds", self.maxspeeds.contains_key("other")),
            ("lanes", self.lanes.contains_key("other")),
            ("oneway", self.oneway.contains_key("other")),
        ] {
            if !has_other {
                return Err(GraphError::ConfigurationError(format!(
                    "the '{name}' table must include an 'other' entry"
                )));
            }
        }
        if self.lanes.values().any(|l| *l == 0) {
            return Err(GraphError::ConfigurationError(String::from(
                "lane defaults must be at least 1",
            )));
        }
        if self
            .lane_efficiency
            .values()
            .any(|e| !(*e > 0.0 && *e <= 1.0))
        {
            return Err(GraphError::ConfigurationError(String::from(
                "lane efficiency factors must lie in (0, 1]",
            )));
        }
        Ok(())
    }

    /// the efficiency factor for a lane count; 1.0 when unlisted.
    pub fn lane_efficiency_for(&self, lanes: u32) -> f64 {
        self.lane_efficiency.get(&lanes).copied().unwrap_or(1.0)
    }
}

/// defines behaviors for a network import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub network_type: NetworkType,
    pub weight_type: WeightType,
    /// reduce the graph to its largest weakly connected component.
    pub largest_connected_component: bool,
    /// run a full Dijkstra from every node at build time. O(V^2 + VE log V),
    /// so off unless path extraction latency matters more than build time.
    pub precompute_dijkstra_states: bool,
    /// parallelize the state precomputation across sources.
    pub parallelize: bool,
    pub network: NetworkConfig,
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            network_type: NetworkType::Drive,
            weight_type: WeightType::Distance,
            largest_connected_component: true,
            precompute_dijkstra_states: false,
            parallelize: true,
            network: NetworkConfig::default(),
        }
    }
}

impl TryFrom<&String> for ImportConfig {
    type Error = GraphError;

    fn try_from(f: &String) -> Result<Self, Self::Error> {
        let config: ImportConfig = if f.ends_with(".toml") {
            let s = std::fs::read_to_string(f).map_err(|e| {
                GraphError::ConfigurationError(format!("failure reading {f}: {e}"))
            })?;
            toml::from_str(&s).map_err(|e| {
                GraphError::ConfigurationError(format!("failure decoding {f}: {e}"))
            })?
        } else if f.ends_with(".json") {
            let s = std::fs::read_to_string(f).map_err(|e| {
                GraphError::ConfigurationError(format!("failure reading {f}: {e}"))
            })?;
            serde_json::from_str(&s).map_err(|e| {
                GraphError::ConfigurationError(format!("failure decoding {f}: {e}"))
            })?
        } else {
            return Err(GraphError::ConfigurationError(format!(
                "unsupported file type: {f}"
            )));
        };
        config.network.validate()?;
        Ok(config)
    }
}

fn default_maxspeeds() -> HashMap<String, u32> {
    [
        ("motorway", 100),
        ("trunk", 100),
        ("primary", 100),
        ("secondary", 100),
        ("tertiary", 50),
        ("unclassified", 50),
        ("residential", 50),
        ("other", 50),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn default_lanes() -> HashMap<String, u32> {
    [
        ("motorway", 3),
        ("trunk", 3),
        ("primary", 2),
        ("secondary", 2),
        ("tertiary", 1),
        ("unclassified", 1),
        ("residential", 1),
        ("other", 1),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn default_lane_efficiency() -> HashMap<u32, f64> {
    [(1, 0.7), (2, 0.8), (3, 0.9), (4, 1.0)].into_iter().collect()
}

fn default_oneway() -> HashMap<String, bool> {
    [
        ("motorway", false),
        ("trunk", false),
        ("primary", false),
        ("secondary", false),
        ("tertiary", false),
        ("unclassified", false),
        ("residential", false),
        ("other", false),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// per-network-type exclusion tables, following the osmnx filter
/// definitions for the drive/walk/bike families.
fn default_exclusions() -> HashMap<NetworkType, Vec<ExclusionRule>> {
    let unused_highway = [
        "abandoned",
        "construction",
        "no",
        "planned",
        "platform",
        "proposed",
        "raceway",
        "razed",
    ];
    let mut exclusions: HashMap<NetworkType, Vec<ExclusionRule>> = HashMap::new();

    let drive_highway: Vec<&str> = unused_highway
        .iter()
        .chain(
            [
                "bridleway",
                "bus_guideway",
                "corridor",
                "cycleway",
                "elevator",
                "escalator",
                "footway",
                "path",
                "pedestrian",
                "steps",
                "track",
            ]
            .iter(),
        )
        .copied()
        .collect();

    exclusions.insert(
        NetworkType::Drive,
        vec![
            ExclusionRule::new("highway", &drive_highway),
            ExclusionRule::new("area", &["yes"]),
            ExclusionRule::new("access", &["private"]),
            ExclusionRule::new(
                "service",
                &["alley", "driveway", "emergency_access", "parking", "parking_aisle", "private"],
            ),
        ],
    );
    exclusions.insert(
        NetworkType::DriveService,
        vec![
            ExclusionRule::new("highway", &drive_highway),
            ExclusionRule::new("area", &["yes"]),
            ExclusionRule::new("access", &["private"]),
            ExclusionRule::new("service", &["emergency_access", "private"]),
        ],
    );
    exclusions.insert(
        NetworkType::Walk,
        vec![
            ExclusionRule::new(
                "highway",
                &unused_highway
                    .iter()
                    .chain(["bus_guideway", "cycleway", "motorway", "motorway_link"].iter())
                    .copied()
                    .collect::<Vec<_>>(),
            ),
            ExclusionRule::new("area", &["yes"]),
            ExclusionRule::new("access", &["private"]),
            ExclusionRule::new("foot", &["no"]),
        ],
    );
    exclusions.insert(
        NetworkType::Bike,
        vec![
            ExclusionRule::new(
                "highway",
                &unused_highway
                    .iter()
                    .chain(
                        [
                            "bus_guideway",
                            "corridor",
                            "elevator",
                            "escalator",
                            "footway",
                            "motorway",
                            "motorway_link",
                            "steps",
                        ]
                        .iter(),
                    )
                    .copied()
                    .collect::<Vec<_>>(),
            ),
            ExclusionRule::new("area", &["yes"]),
            ExclusionRule::new("access", &["private"]),
            ExclusionRule::new("bicycle", &["no"]),
        ],
    );
    exclusions.insert(
        NetworkType::All,
        vec![
            ExclusionRule::new("highway", &unused_highway),
            ExclusionRule::new("area", &["yes"]),
            ExclusionRule::new("access", &["private"]),
        ],
    );
    exclusions.insert(
        NetworkType::AllPrivate,
        vec![
            ExclusionRule::new("highway", &unused_highway),
            ExclusionRule::new("area", &["yes"]),
        ],
    );
    exclusions.insert(NetworkType::None, vec![]);
    exclusions.insert(
        NetworkType::Rail,
        vec![ExclusionRule::new(
            "railway",
            &[
                "abandoned",
                "construction",
                "disused",
                "planned",
                "platform",
                "proposed",
                "razed",
            ],
        )],
    );
    exclusions.insert(
        NetworkType::DriveMainroads,
        vec![
            ExclusionRule::new(
                "highway",
                &drive_highway
                    .iter()
                    .chain(["living_street", "residential", "road", "service", "unclassified"].iter())
                    .copied()
                    .collect::<Vec<_>>(),
            ),
            ExclusionRule::new("area", &["yes"]),
            ExclusionRule::new("access", &["private"]),
        ],
    );
    exclusions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        NetworkConfig::default().validate().unwrap();
    }

    #[test]
    fn default_tables_cover_all_network_types() {
        let config = NetworkConfig::default();
        for nt in NetworkType::ALL_TYPES {
            assert!(config.exclusions.contains_key(&nt), "missing rules for {nt}");
        }
    }

    #[test]
    fn lane_efficiency_defaults_to_one() {
        let config = NetworkConfig::default();
        assert_eq!(config.lane_efficiency_for(2), 0.8);
        assert_eq!(config.lane_efficiency_for(9), 1.0);
    }

    #[test]
    fn missing_other_entry_is_rejected() {
        let mut config = NetworkConfig::default();
        config.maxspeeds.remove("other");
        assert!(matches!(
            config.validate(),
            Err(GraphError::ConfigurationError(_))
        ));
    }

    #[test]
    fn loads_toml_overrides() {
        use std::io::Write;
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "network_type = \"walk\"\nweight_type = \"time\"\nlargest_connected_component = false"
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();
        let config = ImportConfig::try_from(&path).unwrap();
        assert_eq!(config.network_type, NetworkType::Walk);
        assert_eq!(config.weight_type, WeightType::Time);
        assert!(!config.largest_connected_component);
        assert!(config.parallelize);
    }
}
