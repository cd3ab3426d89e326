use std::collections::VecDeque;

use tracing::debug;

use crate::core::automaton::{StateId, SymbolId};
use crate::core::nfa::Nfa;
use crate::core::relation::Relation;

/// Computes the maximal simulation preorder of `nfa` as a relation over
/// its state ids.
///
/// `(p, q)` holds in the result exactly when `q` simulates `p`: `q` is
/// final whenever `p` is, and every transition of `p` can be matched by a
/// transition of `q` into a simulating successor. The preorder refines
/// language inclusion between states, which makes it a sound subsumption
/// for the antichain engines.
#[must_use]
pub fn maximal(nfa: &Nfa) -> Relation {
    if nfa.state_bound() == 0 {
        return Relation::new(0, false);
    }
    Simulator::new(nfa).run()
}

/// The diagonal relation sized to `nfa`, the degenerate subsumption used
/// when simulation is not requested.
#[must_use]
pub fn identity(nfa: &Nfa) -> Relation {
    Relation::identity(nfa.state_bound())
}

/// Counter-based fixpoint in the style of Henzinger, Henzinger and Kopke.
///
/// Works on the complement of the simulation: a pair enters `complement`
/// (and the worklist) once it is known that the second state cannot
/// simulate the first, and the complement is flipped in place at the end.
/// `counters[(a, p, q)]` tracks how many a-successors of `q` might still
/// simulate `p`; when it hits zero, every a-predecessor of `p` is refuted
/// against `q`.
struct Simulator<'a> {
    nfa: &'a Nfa,
    /// Arc-flipped copy of the automaton for predecessor lookups.
    reversed: Nfa,
    /// Pairs known not to be in the simulation.
    complement: Relation,
    /// Flat counter array indexed `(a * bound + p) * bound + q`.
    counters: Vec<u32>,
    /// Refuted pairs whose consequences are still to be propagated.
    worklist: VecDeque<(StateId, StateId)>,
    bound: usize,
}

impl<'a> Simulator<'a> {
    fn new(nfa: &'a Nfa) -> Self {
        let bound = nfa.state_bound();
        let mut simulator = Self {
            nfa,
            reversed: nfa.reverse(),
            complement: Relation::new(bound, false),
            counters: vec![0; nfa.symbol_bound() * bound * bound],
            worklist: VecDeque::new(),
            bound,
        };
        simulator.seed();
        simulator
    }

    /// Initial refinement: a final state is never simulated by a
    /// non-final one, and a state with an a-transition is never simulated
    /// by one without. Also initializes the counters to |δ(q, a)|.
    ///
    /// The finals condition is checked outside the symbol loop so it
    /// applies to automata with an empty alphabet as well.
    fn seed(&mut self) {
        for p in 0..self.bound as StateId {
            if !self.nfa.is_final(p) {
                continue;
            }
            for q in 0..self.bound as StateId {
                if !self.nfa.is_final(q) {
                    self.refute(p, q);
                }
            }
        }

        for symbol in self.nfa.symbols() {
            for q in 0..self.bound as StateId {
                let fanout = self.nfa.post(q, symbol).len() as u32;
                if fanout == 0 {
                    continue;
                }
                for p in 0..self.bound as StateId {
                    let cell = self.cell(symbol, p, q);
                    self.counters[cell] = fanout;
                }
            }
            for p in 0..self.bound as StateId {
                if self.nfa.post(p, symbol).is_empty() {
                    continue;
                }
                for q in 0..self.bound as StateId {
                    if self.nfa.post(q, symbol).is_empty() {
                        self.refute(p, q);
                    }
                }
            }
        }
    }

    fn run(mut self) -> Relation {
        let mut propagated = 0usize;
        while let Some((p1, q1)) = self.worklist.pop_front() {
            propagated += 1;
            for symbol in self.nfa.symbols() {
                let pred_q: Vec<StateId> = self.reversed.post(q1, symbol).iter().copied().collect();
                if pred_q.is_empty() {
                    continue;
                }
                let pred_p: Vec<StateId> = self.reversed.post(p1, symbol).iter().copied().collect();
                for q in pred_q {
                    let cell = self.cell(symbol, p1, q);
                    self.counters[cell] -= 1;
                    if self.counters[cell] == 0 {
                        // No a-successor of q can simulate p1 any more, so
                        // q refutes every a-predecessor of p1.
                        for &p in &pred_p {
                            self.refute(p, q);
                        }
                    }
                }
            }
        }

        debug!(states = self.bound, pairs = propagated, "simulation fixpoint reached");
        self.complement.complement();
        self.complement
    }

    /// Records that `q` does not simulate `p`, enqueueing the pair once.
    fn refute(&mut self, p: StateId, q: StateId) {
        if !self.complement.get(p, q) {
            self.complement.set(p, q, true);
            self.worklist.push_back((p, q));
        }
    }

    fn cell(&self, symbol: SymbolId, p: StateId, q: StateId) -> usize {
        (symbol as usize * self.bound + p as usize) * self.bound + q as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_automaton_yields_empty_relation() {
        let relation = maximal(&Nfa::new());
        assert_eq!(relation.size(), 0);
    }

    #[test]
    fn empty_alphabet_still_refines_by_finals() {
        let mut nfa = Nfa::new();
        nfa.insert_state("p");
        nfa.mark_final("q");

        let relation = maximal(&nfa);
        let p = nfa.state_id("p").unwrap();
        let q = nfa.state_id("q").unwrap();
        assert!(relation.get(p, q));
        assert!(!relation.get(q, p));
        assert!(relation.get(p, p));
        assert!(relation.get(q, q));
    }
}
