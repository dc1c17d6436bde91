use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::raw::{value_to_string, RawRelation};
use super::{GraphError, NodeId, RelationId, WayId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionKind {
    /// the maneuver pivots on a single node shared by the from and to ways.
    ViaNode,
    /// the maneuver traverses a chain of one or more via ways.
    ViaWay,
}

/// a turn restriction relation. exactly one of `is_exclusion` ("no_"
/// prefix) and `is_exclusive` ("only_" prefix) is true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restriction {
    pub id: RelationId,
    pub kind: RestrictionKind,
    /// the raw restriction value, e.g. `no_right_turn` or `only_straight_on`.
    pub restriction_type: String,
    pub from_way: WayId,
    pub to_way: WayId,
    pub via_node: Option<NodeId>,
    pub via_ways: Vec<WayId>,
    pub is_exclusion: bool,
    pub is_exclusive: bool,
    pub tags: HashMap<String, String>,
}

impl Restriction {
    /// whether a relation's tags mark it as a turn restriction.
    pub fn is_restriction_relation(relation: &RawRelation) -> bool {
        relation
            .tags
            .get("type")
            .map(|v| value_to_string(v) == "restriction")
            .unwrap_or(false)
    }

    /// decodes a raw relation into a [`Restriction`], checking only the
    /// member shape; checks against the way store happen at indexing time.
    pub fn from_raw(relation: &RawRelation) -> Result<Restriction, GraphError> {
        let id = RelationId(relation.id);
        let restriction_type = relation
            .tags
            .get("restriction")
            .map(value_to_string)
            .ok_or_else(|| {
                GraphError::BadRestriction(id, String::from("relation has no 'restriction' tag"))
            })?;

        let is_exclusion = restriction_type.starts_with("no_");
        let is_exclusive = restriction_type.starts_with("only_");
        if !is_exclusion && !is_exclusive {
            return Err(GraphError::BadRestriction(
                id,
                format!("unsupported restriction value '{restriction_type}'"),
            ));
        }

        let mut from_ways: Vec<WayId> = vec![];
        let mut to_ways: Vec<WayId> = vec![];
        let mut via_nodes: Vec<NodeId> = vec![];
        let mut via_ways: Vec<WayId> = vec![];
        for member in relation.members.iter() {
            match (member.member_type.as_str(), member.role.as_str()) {
                ("way", "from") => from_ways.push(WayId(member.member_ref)),
                ("way", "to") => to_ways.push(WayId(member.member_ref)),
                ("way", "via") => via_ways.push(WayId(member.member_ref)),
                ("node", "via") => via_nodes.push(NodeId(member.member_ref)),
                _ => {}
            }
        }

        let (from_way, to_way) = match (&from_ways[..], &to_ways[..]) {
            ([f], [t]) => (*f, *t),
            _ => {
                return Err(GraphError::BadRestriction(
                    id,
                    format!(
                        "expected exactly one 'from' and one 'to' way member, found {} and {}",
                        from_ways.len(),
                        to_ways.len()
                    ),
                ))
            }
        };

        let kind = match (&via_nodes[..], &via_ways[..]) {
            ([_], []) => RestrictionKind::ViaNode,
            ([], [_, ..]) => RestrictionKind::ViaWay,
            _ => {
                return Err(GraphError::BadRestriction(
                    id,
                    format!(
                        "expected exactly one 'via' node or at least one 'via' way, found {} nodes and {} ways",
                        via_nodes.len(),
                        via_ways.len()
                    ),
                ))
            }
        };

        let tags = relation
            .tags
            .iter()
            .map(|(k, v)| (k.clone(), value_to_string(v)))
            .collect();

        Ok(Restriction {
            id,
            kind,
            restriction_type,
            from_way,
            to_way,
            via_node: via_nodes.first().copied(),
            via_ways,
            is_exclusion,
            is_exclusive,
            tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::raw::RawMember;
    use serde_json::json;

    fn member(member_type: &str, member_ref: i64, role: &str) -> RawMember {
        RawMember {
            member_type: member_type.to_string(),
            member_ref,
            role: role.to_string(),
        }
    }

    fn relation(restriction: &str, members: Vec<RawMember>) -> RawRelation {
        RawRelation {
            id: 9000,
            members,
            tags: [
                (String::from("type"), json!("restriction")),
                (String::from("restriction"), json!(restriction)),
            ]
            .into_iter()
            .collect(),
        }
    }

    #[test]
    fn decodes_via_node_exclusion() {
        let rel = relation(
            "no_right_turn",
            vec![
                member("way", 1, "from"),
                member("way", 2, "to"),
                member("node", 3, "via"),
            ],
        );
        let r = Restriction::from_raw(&rel).unwrap();
        assert_eq!(r.kind, RestrictionKind::ViaNode);
        assert!(r.is_exclusion);
        assert!(!r.is_exclusive);
        assert_eq!(r.via_node, Some(NodeId(3)));
    }

    #[test]
    fn decodes_via_way_chain() {
        let rel = relation(
            "no_u_turn",
            vec![
                member("way", 1, "from"),
                member("way", 2, "to"),
                member("way", 3, "via"),
                member("way", 4, "via"),
            ],
        );
        let r = Restriction::from_raw(&rel).unwrap();
        assert_eq!(r.kind, RestrictionKind::ViaWay);
        assert_eq!(r.via_ways, vec![WayId(3), WayId(4)]);
    }

    #[test]
    fn rejects_mixed_via_members() {
        let rel = relation(
            "no_left_turn",
            vec![
                member("way", 1, "from"),
                member("way", 2, "to"),
                member("node", 3, "via"),
                member("way", 4, "via"),
            ],
        );
        assert!(matches!(
            Restriction::from_raw(&rel),
            Err(GraphError::BadRestriction(_, _))
        ));
    }

    #[test]
    fn rejects_unknown_prefix() {
        let rel = relation(
            "mandatory_left_turn",
            vec![
                member("way", 1, "from"),
                member("way", 2, "to"),
                member("node", 3, "via"),
            ],
        );
        assert!(Restriction::from_raw(&rel).is_err());
    }
}
