use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::cost::CostModifier;
use super::heuristic::Heuristic;
use super::state::SearchState;
use crate::graph::SparseWeights;
use crate::model::GeoLocation;

/// a frontier element ordered by f-value (tentative distance plus
/// heuristic estimate). the heap does not support decrease-key; stale
/// entries are skipped via the visited flag when popped.
#[derive(Debug, Clone, Copy)]
struct FrontierEntry {
    f_value: f64,
    vertex: usize,
    hops: usize,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f_value.total_cmp(&other.f_value) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl Ord for FrontierEntry {
    /// reversed comparison so the std max-heap pops the smallest f-value.
    fn cmp(&self, other: &Self) -> Ordering {
        other.f_value.total_cmp(&self.f_value)
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// how a search run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SearchOutcome {
    /// the goal vertex was settled.
    ReachedGoal,
    /// the frontier drained without settling the goal (or no goal was given).
    ExhaustedFrontier,
    /// the minimum tentative distance in the frontier exceeded the cap.
    ExceededMaxDistance,
}

/// the shared Dijkstra/A* loop. with a `Zero` heuristic this is plain
/// Dijkstra; `goal = None` settles every reachable vertex (used for
/// cached dijkstra states).
///
/// weights must be strictly positive; a cost modifier returning
/// `f64::INFINITY` suppresses the corresponding relaxation.
#[allow(clippy::too_many_arguments)]
pub(crate) fn run_search<S: SearchState>(
    out_adjacency: &[Vec<usize>],
    weights: &SparseWeights,
    coordinates: &[GeoLocation],
    origin: usize,
    goal: Option<usize>,
    cost: &CostModifier<'_>,
    heuristic: &Heuristic,
    max_distance: Option<f64>,
    state: &mut S,
) -> SearchOutcome {
    let mut frontier: BinaryHeap<FrontierEntry> = BinaryHeap::new();
    state.set_dist(origin, 0.0);
    frontier.push(FrontierEntry {
        f_value: 0.0,
        vertex: origin,
        hops: 0,
    });

    while let Some(entry) = frontier.pop() {
        let u = entry.vertex;
        if state.is_visited(u) {
            continue;
        }
        state.mark_visited(u);

        if goal == Some(u) {
            return SearchOutcome::ReachedGoal;
        }

        let dist_u = state.dist(u);
        if let Some(limit) = max_distance {
            if dist_u > limit {
                return SearchOutcome::ExceededMaxDistance;
            }
        }

        for v in out_adjacency[u].iter().copied() {
            if state.is_visited(v) {
                continue;
            }
            let Some(weight) = weights.get(u, v) else {
                continue;
            };
            let alt = dist_u + weight + cost.adjust(u, v, state);
            if alt < state.dist(v) {
                state.set_dist(v, alt);
                state.set_parent(v, u);
                let estimate = match goal {
                    Some(g) => heuristic.estimate(v, g, coordinates),
                    None => 0.0,
                };
                frontier.push(FrontierEntry {
                    f_value: alt + estimate,
                    vertex: v,
                    hops: entry.hops + 1,
                });
            }
        }
    }

    SearchOutcome::ExhaustedFrontier
}

/// walks parent pointers from `goal` back to `origin` and reverses.
/// `None` when the goal was never reached. a single-vertex path is
/// returned when origin and goal coincide.
pub(crate) fn extract_path<S: SearchState>(
    state: &S,
    origin: usize,
    goal: usize,
) -> Option<Vec<usize>> {
    if origin == goal {
        return Some(vec![origin]);
    }
    state.parent(goal)?;
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(parent) = state.parent(current) {
        path.push(parent);
        current = parent;
        if current == origin {
            break;
        }
    }
    if current != origin {
        return None;
    }
    path.reverse();
    Some(path)
}

/// walks a cached parent vector the same way.
pub(crate) fn extract_path_from_parents(
    parents: &[Option<usize>],
    origin: usize,
    goal: usize,
) -> Option<Vec<usize>> {
    if origin == goal {
        return Some(vec![origin]);
    }
    parents.get(goal).copied().flatten()?;
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(parent) = parents.get(current).copied().flatten() {
        path.push(parent);
        current = parent;
        if current == origin {
            break;
        }
    }
    if current != origin {
        return None;
    }
    path.reverse();
    Some(path)
}
