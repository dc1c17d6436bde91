//! converts validated turn-restriction relations into the via-vertex
//! sequence index consumed by the routing cost adjustment.
//!
//! every produced sequence has the shape `[to, via_1, .., via_m, from]`
//! in vertex indices, keyed by `via_1` (the via vertex adjacent to the
//! "to" end), so the routing loop can test a candidate move `via_1 -> to`
//! against the searcher's parent chain in a single pass.

use itertools::Itertools;
use std::collections::HashMap;

use super::Graph;
use crate::model::{GraphError, NodeId, RelationId, Restriction, RestrictionKind, Way};

type SequenceIndex = HashMap<usize, Vec<Vec<usize>>>;

/// encodes every restriction in the graph. returns the sequence index
/// and the ids of restrictions that failed validation; the caller drops
/// those from the graph.
pub(crate) fn build_index(graph: &Graph) -> (SequenceIndex, Vec<RelationId>) {
    let mut index: SequenceIndex = HashMap::new();
    let mut invalid: Vec<RelationId> = vec![];
    for (id, restriction) in graph
        .restrictions
        .iter()
        .sorted_by_key(|(id, _)| **id)
    {
        match encode(graph, restriction) {
            Ok(sequences) => {
                for sequence in sequences.into_iter() {
                    index.entry(sequence[1]).or_default().push(sequence);
                }
            }
            Err(e) => {
                log::warn!("dropping turn restriction: {e}");
                invalid.push(*id);
            }
        }
    }
    (index, invalid)
}

fn bad(r: &Restriction, message: String) -> GraphError {
    GraphError::BadRestriction(r.id, message)
}

fn encode(graph: &Graph, r: &Restriction) -> Result<Vec<Vec<usize>>, GraphError> {
    let from_way = graph
        .ways
        .get(&r.from_way)
        .ok_or_else(|| bad(r, format!("from way {} not in graph", r.from_way)))?;
    let to_way = graph
        .ways
        .get(&r.to_way)
        .ok_or_else(|| bad(r, format!("to way {} not in graph", r.to_way)))?;

    let mut referenced = vec![r.from_way, r.to_way];
    referenced.extend(r.via_ways.iter().copied());
    if !referenced.iter().all_unique() {
        return Err(bad(r, String::from("referenced ways are not distinct")));
    }

    let node_sequences = match r.kind {
        RestrictionKind::ViaNode => encode_via_node(graph, r, from_way, to_way)?,
        RestrictionKind::ViaWay => encode_via_way(graph, r, from_way, to_way)?,
    };

    // translate to vertex indices, keeping only sequences whose every
    // step is an actual directed edge (walking to -> from against edge
    // direction); anything else can never match a parent chain.
    let mut sequences = vec![];
    for node_sequence in node_sequences.into_iter() {
        let indices = node_sequence
            .iter()
            .map(|id| graph.index_for_node(id))
            .collect::<Result<Vec<_>, _>>()?;
        let traversable = indices
            .iter()
            .tuple_windows()
            .all(|(a, b)| graph.weights.get(*b, *a).is_some());
        if traversable {
            sequences.push(indices);
        } else {
            log::debug!(
                "turn restriction {} sequence {:?} is not traversable, skipping",
                r.id,
                node_sequence
            );
        }
    }
    Ok(sequences)
}

fn encode_via_node(
    graph: &Graph,
    r: &Restriction,
    from_way: &Way,
    to_way: &Way,
) -> Result<Vec<Vec<NodeId>>, GraphError> {
    let via = r
        .via_node
        .ok_or_else(|| bad(r, String::from("via node restriction has no via node")))?;
    if !from_way.is_trailing(&via) || !to_way.is_trailing(&via) {
        return Err(bad(
            r,
            format!("via node {via} is not a trailing node of both the from and to ways"),
        ));
    }
    let from_neighbors = approach_neighbors(from_way, &via);
    if from_neighbors.is_empty() {
        return Err(bad(
            r,
            format!("from way {} cannot reach via node {via}", from_way.id),
        ));
    }

    let mut sequences = vec![];
    if r.is_exclusion {
        let to_neighbors = exit_neighbors(to_way, &via);
        if to_neighbors.is_empty() {
            return Err(bad(
                r,
                format!("to way {} cannot leave via node {via}", to_way.id),
            ));
        }
        for from_n in from_neighbors.iter() {
            for to_n in to_neighbors.iter() {
                sequences.push(vec![*to_n, via, *from_n]);
            }
        }
    } else {
        // exclusive: every other way incident to the via node becomes an
        // implicit exclusion. an interior via position on a two-way
        // alternative yields one sequence per leaving direction.
        let incident = graph
            .node_to_way
            .get(&via)
            .map(|set| set.iter().copied().sorted().collect_vec())
            .unwrap_or_default();
        for way_id in incident.into_iter() {
            if way_id == r.from_way || way_id == r.to_way {
                continue;
            }
            let alternative = graph
                .ways
                .get(&way_id)
                .ok_or(GraphError::MissingWay(way_id))?;
            for to_n in exit_neighbors(alternative, &via).into_iter() {
                for from_n in from_neighbors.iter() {
                    sequences.push(vec![to_n, via, *from_n]);
                }
            }
        }
    }
    Ok(sequences)
}

fn encode_via_way(
    graph: &Graph,
    r: &Restriction,
    from_way: &Way,
    to_way: &Way,
) -> Result<Vec<Vec<NodeId>>, GraphError> {
    if r.is_exclusive {
        return Err(bad(
            r,
            String::from("exclusive ('only_') restrictions over via ways are not supported"),
        ));
    }

    let via_ways = r
        .via_ways
        .iter()
        .map(|id| {
            graph
                .ways
                .get(id)
                .ok_or_else(|| bad(r, format!("via way {id} not in graph")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let chain = join_via_chain(r, from_way, to_way, &via_ways)?;
    let from_junction = *chain
        .first()
        .ok_or_else(|| bad(r, String::from("via chain is empty")))?;
    let to_junction = *chain
        .last()
        .ok_or_else(|| bad(r, String::from("via chain is empty")))?;

    let from_neighbors = approach_neighbors(from_way, &from_junction);
    if from_neighbors.is_empty() {
        return Err(bad(
            r,
            format!("from way {} cannot reach the via chain", from_way.id),
        ));
    }
    let to_neighbors = exit_neighbors(to_way, &to_junction);
    if to_neighbors.is_empty() {
        return Err(bad(
            r,
            format!("to way {} cannot leave the via chain", to_way.id),
        ));
    }

    // sequence order runs from the "to" end backwards: the via node
    // adjacent to the to way comes first and carries the index key.
    let reversed_chain = chain.iter().rev().copied().collect_vec();
    let mut sequences = vec![];
    for from_n in from_neighbors.iter() {
        for to_n in to_neighbors.iter() {
            let mut sequence = vec![*to_n];
            sequence.extend(reversed_chain.iter().copied());
            sequence.push(*from_n);
            sequences.push(sequence);
        }
    }
    Ok(sequences)
}

/// joins the via ways into a single node chain leading from a trailing
/// node of the from way to a trailing node of the to way.
fn join_via_chain(
    r: &Restriction,
    from_way: &Way,
    to_way: &Way,
    via_ways: &[&Way],
) -> Result<Vec<NodeId>, GraphError> {
    let mut remaining: Vec<&Way> = via_ways.to_vec();
    let start = from_way
        .trailing_nodes()
        .into_iter()
        .find(|n| remaining.iter().any(|w| w.is_trailing(n)))
        .ok_or_else(|| bad(r, String::from("via ways do not join the from way")))?;

    let mut chain: Vec<NodeId> = vec![start];
    let mut current = start;
    while !remaining.is_empty() {
        let matches = remaining
            .iter()
            .positions(|w| w.is_trailing(&current))
            .collect_vec();
        let position = match matches[..] {
            [position] => position,
            [] => {
                return Err(bad(
                    r,
                    format!("via ways do not continue the chain at node {current}"),
                ))
            }
            _ => {
                return Err(bad(
                    r,
                    format!("via chain is ambiguous at node {current}"),
                ))
            }
        };
        let way = remaining.remove(position);
        let oriented: Vec<NodeId> = if way.nodes.first() == Some(&current) {
            way.nodes.clone()
        } else {
            way.nodes.iter().rev().copied().collect_vec()
        };
        chain.extend(oriented.into_iter().skip(1));
        current = *chain.last().ok_or_else(|| {
            GraphError::InternalError(String::from("non-empty via chain has no tail"))
        })?;
    }

    if !to_way.is_trailing(&current) {
        return Err(bad(
            r,
            format!("via chain ends at node {current} which is not a trailing node of the to way"),
        ));
    }
    Ok(chain)
}

/// the neighbors of `x` along `way` from which `x` can be entered,
/// honoring the way's one-way and reverse-way flags.
fn approach_neighbors(way: &Way, x: &NodeId) -> Vec<NodeId> {
    let mut neighbors = vec![];
    for (position, _) in way.nodes.iter().enumerate().filter(|(_, n)| *n == x) {
        if position > 0 && way.forward_traversable() {
            neighbors.push(way.nodes[position - 1]);
        }
        if position + 1 < way.nodes.len() && way.backward_traversable() {
            neighbors.push(way.nodes[position + 1]);
        }
    }
    neighbors.into_iter().unique().collect_vec()
}

/// the neighbors of `x` along `way` toward which `x` can be left,
/// honoring the way's one-way and reverse-way flags.
fn exit_neighbors(way: &Way, x: &NodeId) -> Vec<NodeId> {
    let mut neighbors = vec![];
    for (position, _) in way.nodes.iter().enumerate().filter(|(_, n)| *n == x) {
        if position + 1 < way.nodes.len() && way.forward_traversable() {
            neighbors.push(way.nodes[position + 1]);
        }
        if position > 0 && way.backward_traversable() {
            neighbors.push(way.nodes[position - 1]);
        }
    }
    neighbors.into_iter().unique().collect_vec()
}
