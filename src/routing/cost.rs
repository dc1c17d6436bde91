use std::collections::HashMap;

use super::state::SearchState;

/// an additional cost applied when the search relaxes the edge
/// `(u, v)`. returning `f64::INFINITY` prohibits the move: the candidate
/// distance can never undercut an existing tentative distance.
#[derive(Debug, Clone, Copy)]
pub enum CostModifier<'a> {
    /// no adjustment.
    Zero,
    /// turn-restriction enforcement against the indexed via sequences.
    TurnRestrictions(&'a HashMap<usize, Vec<Vec<usize>>>),
}

impl CostModifier<'_> {
    /// evaluates the adjustment for the move `u -> v` given the current
    /// parent chain.
    ///
    /// each sequence stored at key `u` has the shape
    /// `[to, via_1, .., via_m, from]` with `via_1 = u`. the move is
    /// prohibited when `v` matches the `to` entry and walking the parent
    /// chain upward from `u` reproduces `via_2, .., via_m, from`
    /// end-to-end.
    pub fn adjust(&self, u: usize, v: usize, state: &impl SearchState) -> f64 {
        match self {
            CostModifier::Zero => 0.0,
            CostModifier::TurnRestrictions(index) => {
                let Some(sequences) = index.get(&u) else {
                    return 0.0;
                };
                for sequence in sequences.iter() {
                    if sequence.len() < 3 || sequence[0] != v {
                        continue;
                    }
                    let mut current = u;
                    let mut matched = true;
                    for expected in sequence[2..].iter() {
                        match state.parent(current) {
                            Some(parent) if parent == *expected => current = parent,
                            _ => {
                                matched = false;
                                break;
                            }
                        }
                    }
                    if matched {
                        return f64::INFINITY;
                    }
                }
                0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::state::{DictState, SearchState};

    #[test]
    fn via_node_sequence_blocks_matching_parent_chain() {
        // sequence [to=3, via=1, from=0] keyed at 1: moving 1 -> 3 is
        // prohibited when vertex 1 was reached from vertex 0.
        let index: HashMap<usize, Vec<Vec<usize>>> =
            [(1, vec![vec![3, 1, 0]])].into_iter().collect();
        let modifier = CostModifier::TurnRestrictions(&index);

        let mut state = DictState::new();
        state.set_parent(1, 0);
        assert_eq!(modifier.adjust(1, 3, &state), f64::INFINITY);
        // a different destination is unaffected
        assert_eq!(modifier.adjust(1, 4, &state), 0.0);
    }

    #[test]
    fn different_approach_is_not_blocked() {
        let index: HashMap<usize, Vec<Vec<usize>>> =
            [(1, vec![vec![3, 1, 0]])].into_iter().collect();
        let modifier = CostModifier::TurnRestrictions(&index);

        let mut state = DictState::new();
        state.set_parent(1, 7);
        assert_eq!(modifier.adjust(1, 3, &state), 0.0);
    }

    #[test]
    fn via_way_sequence_requires_full_chain_match() {
        // forbidden maneuver from=9 -> 5 -> 4 -> to=3, keyed at 4
        let index: HashMap<usize, Vec<Vec<usize>>> =
            [(4, vec![vec![3, 4, 5, 9]])].into_iter().collect();
        let modifier = CostModifier::TurnRestrictions(&index);

        let mut state = DictState::new();
        state.set_parent(4, 5);
        state.set_parent(5, 9);
        assert_eq!(modifier.adjust(4, 3, &state), f64::INFINITY);

        // truncated chain (5 has no parent) does not match
        let mut partial = DictState::new();
        partial.set_parent(4, 5);
        assert_eq!(modifier.adjust(4, 3, &partial), 0.0);
    }
}
