use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// the logical OSM attribute tree handed over by the download/deserialize
/// collaborator. both on-the-wire flavors (XML-ish and JSON-ish) are
/// normalized into this shape before reaching the graph builder.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RawOsmData {
    #[serde(default)]
    pub node: Vec<RawNode>,
    #[serde(default)]
    pub way: Vec<RawWay>,
    #[serde(default)]
    pub relation: Vec<RawRelation>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RawNode {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tags: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RawWay {
    pub id: i64,
    #[serde(default)]
    pub nodes: Vec<i64>,
    #[serde(default)]
    pub tags: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RawRelation {
    pub id: i64,
    #[serde(default)]
    pub members: Vec<RawMember>,
    #[serde(default)]
    pub tags: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RawMember {
    #[serde(rename = "type")]
    pub member_type: String,
    #[serde(rename = "ref")]
    pub member_ref: i64,
    #[serde(default)]
    pub role: String,
}

/// renders a raw tag value as the string form used for residual tag
/// storage. strings pass through unquoted; everything else keeps its
/// JSON rendering.
pub fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_collaborator_payload() {
        let payload = r#"{
            "node": [{"id": 1, "lat": -38.0, "lon": 145.0, "tags": {"highway": "crossing"}}],
            "way": [{"id": 2, "nodes": [1, 3], "tags": {"highway": "residential", "maxspeed": 50}}],
            "relation": [{"id": 4, "members": [{"type": "way", "ref": 2, "role": "from"}], "tags": {"type": "restriction"}}]
        }"#;
        let raw: RawOsmData = serde_json::from_str(payload).unwrap();
        assert_eq!(raw.node.len(), 1);
        assert_eq!(raw.way[0].nodes, vec![1, 3]);
        assert_eq!(raw.relation[0].members[0].role, "from");
    }

    #[test]
    fn stringifies_scalar_tag_values() {
        assert_eq!(value_to_string(&serde_json::json!("yes")), "yes");
        assert_eq!(value_to_string(&serde_json::json!(50)), "50");
        assert_eq!(value_to_string(&serde_json::json!(true)), "true");
    }
}
