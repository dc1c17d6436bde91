//! normalization of raw OSM way tags into the typed routing fields.
//!
//! OSM tag values are free text: speeds appear with units, ranges, and
//! lists ("50", "40 mph", "60;80", "50-70"), lane counts come as lists,
//! and oneway has half a dozen spellings. the parsers here reduce each
//! to a single typed value, falling back to the per-highway-class
//! defaults in [`crate::config::NetworkConfig`] when a tag is absent or
//! unusable. see <https://wiki.openstreetmap.org/wiki/Key:maxspeed>.

use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

use super::raw::{value_to_string, RawWay};
use super::{GraphError, NetworkType, NodeId, RailInfo, Way, WayId};
use crate::config::NetworkConfig;

/// delimiters that separate list and range entries inside a tag value.
pub const TAG_DELIMITERS: [char; 7] = ['+', '^', ':', ';', ',', '|', '-'];

/// mph to km/h.
const MPH_TO_KPH: f64 = 1.60934;

/// posted "walking speed" (Austria/Germany), in km/h.
const WALK_SPEED_KPH: f64 = 5.0;

/// values that legitimately appear in `maxspeed` but carry no usable
/// number. treated as absent rather than as parse failures.
const SPEED_SENTINELS: [&str; 7] = [
    "none",
    "signals",
    "variable",
    "unknown",
    "unposted",
    "default",
    "national",
];

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]+(\.[0-9]+)?").expect("invalid number pattern"))
}

/// splits a composite tag value and extracts one number per usable
/// fragment. fragments without digits are ignored; fragments carrying an
/// `mph` suffix are converted to km/h.
fn numeric_fragments(s: &str, convert_mph: bool) -> Vec<f64> {
    let mut values = vec![];
    for fragment in s.split(TAG_DELIMITERS.as_slice()) {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        if SPEED_SENTINELS.contains(&fragment) {
            continue;
        }
        if convert_mph && fragment == "walk" {
            values.push(WALK_SPEED_KPH);
            continue;
        }
        if let Some(m) = number_pattern().find(fragment) {
            if let Ok(number) = m.as_str().parse::<f64>() {
                if convert_mph && fragment.contains("mph") {
                    values.push(number * MPH_TO_KPH);
                } else {
                    values.push(number);
                }
            }
        }
    }
    values
}

fn mean_rounded(values: &[f64]) -> Option<u32> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some(mean.round() as u32)
}

/// looks up a per-highway-class default, falling back to the mandatory
/// `"other"` entry.
fn class_default<T: Copy>(class: &str, table: &HashMap<String, T>, fallback: T) -> T {
    table
        .get(class)
        .or_else(|| table.get("other"))
        .copied()
        .unwrap_or(fallback)
}

/// parses a raw `maxspeed` value into km/h, using the class default when
/// the tag is absent or unusable.
pub fn parse_maxspeed(
    raw: Option<&Value>,
    class: &str,
    defaults: &HashMap<String, u32>,
) -> Result<u32, GraphError> {
    let fallback = class_default(class, defaults, 50);
    let speed = match raw {
        None => fallback,
        Some(Value::Number(n)) => {
            let value = n.as_f64().ok_or_else(|| {
                GraphError::BadTag(String::from("maxspeed"), n.to_string())
            })?;
            value.round() as u32
        }
        Some(Value::String(s)) => {
            // strip conditional clauses, e.g. "100; 80 @ conditional ..."
            let s = match s.find("conditional") {
                Some(at) => &s[..at],
                None => s.as_str(),
            };
            mean_rounded(&numeric_fragments(s, true)).unwrap_or(fallback)
        }
        Some(other) => {
            return Err(GraphError::BadTag(
                String::from("maxspeed"),
                other.to_string(),
            ))
        }
    };
    Ok(speed.max(1))
}

/// parses a raw `lanes` value, using the class default when the tag is
/// absent or unusable. lane counts are at least 1.
pub fn parse_lanes(
    raw: Option<&Value>,
    class: &str,
    defaults: &HashMap<String, u32>,
) -> Result<u32, GraphError> {
    let fallback = class_default(class, defaults, 1);
    let lanes = match raw {
        None => fallback,
        Some(Value::Number(n)) => {
            let value = n
                .as_f64()
                .ok_or_else(|| GraphError::BadTag(String::from("lanes"), n.to_string()))?;
            value.round() as u32
        }
        Some(Value::String(s)) => mean_rounded(&numeric_fragments(s, false)).unwrap_or(fallback),
        Some(other) => {
            return Err(GraphError::BadTag(String::from("lanes"), other.to_string()))
        }
    };
    Ok(lanes.max(1))
}

/// decides whether a way is one-way. explicit truthy/falsy spellings of
/// the `oneway` tag win; roundabouts are one-way even without the tag;
/// everything else falls back to the per-class default.
pub fn parse_oneway(
    raw: Option<&Value>,
    junction: Option<&str>,
    class: &str,
    defaults: &HashMap<String, bool>,
) -> Result<bool, GraphError> {
    match raw {
        Some(Value::String(s)) => match s.trim() {
            "yes" | "true" | "1" | "-1" => return Ok(true),
            "no" | "false" | "0" => return Ok(false),
            _ => {}
        },
        Some(Value::Number(n)) => match n.as_i64() {
            Some(1) | Some(-1) => return Ok(true),
            Some(0) => return Ok(false),
            _ => {}
        },
        Some(Value::Bool(b)) => return Ok(*b),
        Some(other) => {
            return Err(GraphError::BadTag(
                String::from("oneway"),
                other.to_string(),
            ))
        }
        None => {}
    }
    if junction == Some("roundabout") {
        return Ok(true);
    }
    Ok(class_default(class, defaults, false))
}

/// true iff the raw `oneway` tag indicates travel against the stored
/// node order.
pub fn parse_reverseway(raw: Option<&Value>) -> bool {
    match raw {
        Some(Value::String(s)) => s.trim() == "-1",
        Some(Value::Number(n)) => n.as_i64() == Some(-1),
        _ => false,
    }
}

/// filters and normalizes one raw way for the chosen network type.
///
/// returns `Ok(None)` when the way is not part of the network (missing
/// class tag, matching an exclusion rule, or degenerate after duplicate
/// removal). bad tag values are recovered by falling back to defaults
/// with a warning, per the parse-layer tolerance policy.
pub fn normalize_way(
    raw: &RawWay,
    network_type: NetworkType,
    config: &NetworkConfig,
) -> Option<Way> {
    let tags: HashMap<String, String> = raw
        .tags
        .iter()
        .map(|(k, v)| (k.clone(), value_to_string(v)))
        .collect();

    let class_tag = network_type.class_tag();
    let class = tags.get(class_tag)?.clone();

    if let Some(rules) = config.exclusions.get(&network_type) {
        for rule in rules {
            if let Some(value) = tags.get(&rule.key) {
                if rule.disallowed.contains(value) {
                    return None;
                }
            }
        }
    }

    let mut nodes: Vec<NodeId> = raw.nodes.iter().map(|id| NodeId(*id)).collect();
    nodes.dedup();
    if nodes.len() < 2 {
        log::warn!(
            "way {} has fewer than two distinct consecutive nodes, dropping",
            raw.id
        );
        return None;
    }

    let maxspeed = parse_maxspeed(raw.tags.get("maxspeed"), &class, &config.maxspeeds)
        .unwrap_or_else(|e| {
            log::warn!("way {}: {e}, falling back to default maxspeed", raw.id);
            class_default(&class, &config.maxspeeds, 50)
        });
    let lanes =
        parse_lanes(raw.tags.get("lanes"), &class, &config.lanes).unwrap_or_else(|e| {
            log::warn!("way {}: {e}, falling back to default lanes", raw.id);
            class_default(&class, &config.lanes, 1)
        });
    let oneway = parse_oneway(
        raw.tags.get("oneway"),
        tags.get("junction").map(String::as_str),
        &class,
        &config.oneway,
    )
    .unwrap_or_else(|e| {
        log::warn!("way {}: {e}, falling back to default oneway", raw.id);
        class_default(&class, &config.oneway, false)
    });
    let reverseway = parse_reverseway(raw.tags.get("oneway"));

    let rail = if network_type.is_rail() {
        let field =
            |key: &str| -> String { tags.get(key).cloned().unwrap_or_else(|| String::from("unknown")) };
        Some(RailInfo {
            rail_type: field("railway"),
            electrified: field("electrified"),
            gauge: tags.get("gauge").cloned(),
            usage: field("usage"),
            name: field("name"),
        })
    } else {
        None
    };

    let mut residual = tags;
    let highway = residual.remove("highway");
    let railway = residual.remove("railway");
    residual.remove("maxspeed");
    residual.remove("lanes");
    residual.remove("oneway");

    Some(Way {
        id: WayId(raw.id),
        nodes,
        highway,
        railway,
        maxspeed,
        lanes,
        oneway,
        reverseway,
        rail,
        tags: residual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn speed_defaults() -> HashMap<String, u32> {
        [
            (String::from("motorway"), 100),
            (String::from("residential"), 50),
            (String::from("other"), 50),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn maxspeed_plain_number() {
        let v = json!(60);
        assert_eq!(
            parse_maxspeed(Some(&v), "residential", &speed_defaults()).unwrap(),
            60
        );
    }

    #[test]
    fn maxspeed_rounds_float() {
        let v = json!(59.6);
        assert_eq!(
            parse_maxspeed(Some(&v), "residential", &speed_defaults()).unwrap(),
            60
        );
    }

    #[test]
    fn maxspeed_string_with_mph_unit() {
        let v = json!("40 mph");
        assert_eq!(
            parse_maxspeed(Some(&v), "residential", &speed_defaults()).unwrap(),
            64
        );
    }

    #[test]
    fn maxspeed_list_takes_mean() {
        let v = json!("40;60");
        assert_eq!(
            parse_maxspeed(Some(&v), "residential", &speed_defaults()).unwrap(),
            50
        );
    }

    #[test]
    fn maxspeed_strips_conditional_suffix() {
        let v = json!("100 conditional 80 @ (22:00-06:00)");
        assert_eq!(
            parse_maxspeed(Some(&v), "residential", &speed_defaults()).unwrap(),
            100
        );
    }

    #[test]
    fn maxspeed_sentinel_falls_back_to_class_default() {
        let v = json!("none");
        assert_eq!(
            parse_maxspeed(Some(&v), "motorway", &speed_defaults()).unwrap(),
            100
        );
    }

    #[test]
    fn maxspeed_walk_value() {
        let v = json!("walk");
        assert_eq!(
            parse_maxspeed(Some(&v), "residential", &speed_defaults()).unwrap(),
            5
        );
    }

    #[test]
    fn maxspeed_missing_uses_unknown_class_fallback() {
        assert_eq!(
            parse_maxspeed(None, "bridleway", &speed_defaults()).unwrap(),
            50
        );
    }

    #[test]
    fn maxspeed_rejects_array_value() {
        let v = json!([50, 60]);
        assert!(matches!(
            parse_maxspeed(Some(&v), "residential", &speed_defaults()),
            Err(GraphError::BadTag(_, _))
        ));
    }

    #[test]
    fn lanes_mean_rounds_up() {
        let defaults: HashMap<String, u32> = [(String::from("other"), 1)].into_iter().collect();
        let v = json!("2;3");
        assert_eq!(parse_lanes(Some(&v), "residential", &defaults).unwrap(), 3);
    }

    #[test]
    fn lanes_minimum_is_one() {
        let defaults: HashMap<String, u32> = [(String::from("other"), 1)].into_iter().collect();
        let v = json!(0);
        assert_eq!(parse_lanes(Some(&v), "residential", &defaults).unwrap(), 1);
    }

    #[test]
    fn oneway_spellings() {
        let defaults: HashMap<String, bool> =
            [(String::from("other"), false)].into_iter().collect();
        for truthy in [json!("yes"), json!("true"), json!("1"), json!("-1"), json!(1), json!(-1)] {
            assert!(parse_oneway(Some(&truthy), None, "x", &defaults).unwrap());
        }
        for falsy in [json!("no"), json!("false"), json!("0"), json!(0)] {
            assert!(!parse_oneway(Some(&falsy), None, "x", &defaults).unwrap());
        }
    }

    #[test]
    fn roundabout_is_oneway_without_tag() {
        let defaults: HashMap<String, bool> =
            [(String::from("other"), false)].into_iter().collect();
        assert!(parse_oneway(None, Some("roundabout"), "x", &defaults).unwrap());
    }

    #[test]
    fn reverseway_only_for_minus_one() {
        assert!(parse_reverseway(Some(&json!("-1"))));
        assert!(parse_reverseway(Some(&json!(-1))));
        assert!(!parse_reverseway(Some(&json!("yes"))));
        assert!(!parse_reverseway(None));
    }

    #[test]
    fn normalize_drops_way_without_class_tag() {
        let config = NetworkConfig::default();
        let raw = RawWay {
            id: 10,
            nodes: vec![1, 2],
            tags: [(String::from("waterway"), json!("river"))].into_iter().collect(),
        };
        assert!(normalize_way(&raw, NetworkType::Drive, &config).is_none());
    }

    #[test]
    fn normalize_dedups_consecutive_nodes() {
        let config = NetworkConfig::default();
        let raw = RawWay {
            id: 10,
            nodes: vec![1, 1, 2, 2, 3],
            tags: [(String::from("highway"), json!("residential"))]
                .into_iter()
                .collect(),
        };
        let way = normalize_way(&raw, NetworkType::Drive, &config).unwrap();
        assert_eq!(way.nodes, vec![NodeId(1), NodeId(2), NodeId(3)]);
        assert_eq!(way.highway.as_deref(), Some("residential"));
    }

    #[test]
    fn normalize_applies_exclusion_rules() {
        let config = NetworkConfig::default();
        let raw = RawWay {
            id: 10,
            nodes: vec![1, 2],
            tags: [(String::from("highway"), json!("footway"))]
                .into_iter()
                .collect(),
        };
        assert!(normalize_way(&raw, NetworkType::Drive, &config).is_none());
        assert!(normalize_way(&raw, NetworkType::Walk, &config).is_some());
    }

    #[test]
    fn normalize_populates_rail_fields() {
        let config = NetworkConfig::default();
        let raw = RawWay {
            id: 10,
            nodes: vec![1, 2],
            tags: [
                (String::from("railway"), json!("rail")),
                (String::from("gauge"), json!("1435")),
            ]
            .into_iter()
            .collect(),
        };
        let way = normalize_way(&raw, NetworkType::Rail, &config).unwrap();
        let rail = way.rail.unwrap();
        assert_eq!(rail.rail_type, "rail");
        assert_eq!(rail.gauge.as_deref(), Some("1435"));
        assert_eq!(rail.usage, "unknown");
        assert_eq!(rail.name, "unknown");
    }
}
