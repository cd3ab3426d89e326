use std::collections::BTreeSet;

use tracing::debug;

use crate::core::automaton::{MacroState, ProductState, StateId, SymbolId};
use crate::core::nfa::Nfa;
use crate::core::relation::Relation;

/// Decides whether `nfa` accepts every finite word.
///
/// `subsumption` must be a preorder on the automaton's states that
/// refines language inclusion, sized to at least `nfa.state_bound()`;
/// both [`simulation::maximal`](crate::core::simulation::maximal) and
/// [`Relation::identity`] qualify. The search enumerates macro-states
/// on-the-fly and keeps only an antichain of ≼-minimal ones: a frontier
/// set can be dropped as soon as a kept set is covered by it, because any
/// rejected word reachable through the dropped set is also reachable
/// through the kept one.
#[must_use]
pub fn is_universal(nfa: &Nfa, subsumption: &Relation) -> bool {
    assert!(
        subsumption.size() >= nfa.state_bound(),
        "subsumption relation smaller than the automaton"
    );
    Universality {
        nfa,
        subsumption,
        processed: Vec::new(),
        next: Vec::new(),
    }
    .run()
}

/// Decides whether the language of `left` is included in the language of
/// `right`.
///
/// `subsumption` is a relation over the disjoint union of the two
/// automata, with `right`'s ids shifted past `left.state_bound()` exactly
/// as [`Nfa::union`] numbers them. Compute it with
/// [`simulation::maximal`](crate::core::simulation::maximal) over
/// `left.union(right)`, or use the identity of the same size.
#[must_use]
pub fn is_included(left: &Nfa, right: &Nfa, subsumption: &Relation) -> bool {
    let offset = left.state_bound() as StateId;
    let union = left.union(right);
    assert!(
        subsumption.size() >= union.state_bound(),
        "subsumption relation smaller than the union automaton"
    );

    let right_initials: BTreeSet<StateId> =
        right.initials().iter().map(|&state| state + offset).collect();
    Inclusion {
        union: &union,
        subsumption,
        processed: Vec::new(),
        next: Vec::new(),
    }
    .run(left.initials(), right_initials)
}

/// Universality frontier search over macro-states.
struct Universality<'a> {
    nfa: &'a Nfa,
    subsumption: &'a Relation,
    processed: Vec<MacroState>,
    next: Vec<MacroState>,
}

impl Universality<'_> {
    fn run(mut self) -> bool {
        // The empty word: rejected already when no initial state accepts.
        if !self.accepting(self.nfa.initials().iter().copied()) {
            return false;
        }

        let seed = minimize(self.nfa.initials().clone(), self.subsumption);
        self.next.push(seed);

        while let Some(frontier) = self.next.pop() {
            self.processed.push(frontier.clone());
            for symbol in self.nfa.symbols() {
                let image = minimize(post_of(self.nfa, &frontier, symbol), self.subsumption);
                if !self.accepting(image.iter().copied()) {
                    return false;
                }
                if self.subsumed(&image) {
                    continue;
                }
                self.evict(&image);
                self.next.push(image);
            }
        }

        debug!(explored = self.processed.len(), "universality frontier exhausted");
        true
    }

    fn accepting(&self, mut members: impl Iterator<Item = StateId>) -> bool {
        members.any(|state| self.nfa.is_final(state))
    }

    /// Whether a kept macro-state is covered by `image`, making the image
    /// redundant.
    fn subsumed(&self, image: &MacroState) -> bool {
        self.processed
            .iter()
            .chain(&self.next)
            .any(|kept| macro_leq(kept, image, self.subsumption))
    }

    /// Drops every kept macro-state that covers `image`.
    fn evict(&mut self, image: &MacroState) {
        let subsumption = self.subsumption;
        self.processed.retain(|kept| !macro_leq(image, kept, subsumption));
        self.next.retain(|kept| !macro_leq(image, kept, subsumption));
    }
}

/// Inclusion frontier search over product-states, run on the union
/// automaton so one relation covers both sides.
struct Inclusion<'a> {
    union: &'a Nfa,
    subsumption: &'a Relation,
    processed: Vec<ProductState>,
    next: Vec<ProductState>,
}

impl Inclusion<'_> {
    fn run(mut self, left_initials: &BTreeSet<StateId>, right_initials: BTreeSet<StateId>) -> bool {
        let seed_set = minimize(right_initials, self.subsumption);
        for &state in left_initials {
            let candidate = ProductState {
                state,
                set: seed_set.clone(),
            };
            if self.rejects(&candidate) {
                return false;
            }
            if self.vacuous(&candidate) {
                continue;
            }
            self.next.push(candidate);
        }
        self.filter_seed();

        while let Some(product) = self.next.pop() {
            self.processed.push(product.clone());
            for symbol in self.union.symbols() {
                let left_posts = self.union.post(product.state, symbol);
                if left_posts.is_empty() {
                    continue;
                }
                let image = minimize(post_of(self.union, &product.set, symbol), self.subsumption);
                for &succ in left_posts {
                    let candidate = ProductState {
                        state: succ,
                        set: image.clone(),
                    };
                    if self.rejects(&candidate) {
                        return false;
                    }
                    if self.vacuous(&candidate) {
                        continue;
                    }
                    if self.dominated(&candidate) {
                        continue;
                    }
                    self.evict(&candidate);
                    self.next.push(candidate);
                }
            }
        }

        debug!(explored = self.processed.len(), "inclusion frontier exhausted");
        true
    }

    /// Counterexample test: the left state accepts but no member of the
    /// right macro-state does.
    fn rejects(&self, candidate: &ProductState) -> bool {
        self.union.is_final(candidate.state)
            && !candidate.set.iter().any(|&m| self.union.is_final(m))
    }

    /// A product-state whose left state is simulated by a member of its
    /// own right macro-state can never reach a counterexample.
    fn vacuous(&self, candidate: &ProductState) -> bool {
        candidate
            .set
            .iter()
            .any(|&m| self.subsumption.get(candidate.state, m))
    }

    /// Whether a kept product-state dominates `candidate`: anything the
    /// candidate can reject is already rejected through the kept state,
    /// whose left state simulates the candidate's and whose right
    /// macro-state is covered by the candidate's.
    fn dominated(&self, candidate: &ProductState) -> bool {
        self.processed.iter().chain(&self.next).any(|kept| {
            self.subsumption.get(candidate.state, kept.state)
                && macro_leq(&kept.set, &candidate.set, self.subsumption)
        })
    }

    /// Drops every kept product-state dominated by `candidate`.
    fn evict(&mut self, candidate: &ProductState) {
        let subsumption = self.subsumption;
        let dominated = |kept: &ProductState| {
            subsumption.get(kept.state, candidate.state)
                && macro_leq(&candidate.set, &kept.set, subsumption)
        };
        self.processed.retain(|kept| !dominated(kept));
        self.next.retain(|kept| !dominated(kept));
    }

    /// Pairwise antichain filter over the seeded product-states.
    fn filter_seed(&mut self) {
        let subsumption = self.subsumption;
        let seeds = std::mem::take(&mut self.next);
        let mut keep = vec![true; seeds.len()];
        for i in 0..seeds.len() {
            if !keep[i] {
                continue;
            }
            for j in 0..seeds.len() {
                if i != j
                    && keep[j]
                    && subsumption.get(seeds[j].state, seeds[i].state)
                    && macro_leq(&seeds[i].set, &seeds[j].set, subsumption)
                {
                    keep[j] = false;
                }
            }
        }
        self.next = seeds
            .into_iter()
            .zip(keep)
            .filter_map(|(seed, kept)| kept.then_some(seed))
            .collect();
    }
}

/// The quasi-order on macro-states: every member of `lhs` is related to
/// some member of `rhs`. Trivially true for an empty `lhs`.
fn macro_leq(lhs: &[StateId], rhs: &[StateId], relation: &Relation) -> bool {
    lhs.iter()
        .all(|&m| rhs.iter().any(|&m2| relation.get(m, m2)))
}

/// Reduces a state set to a macro-state by dropping every member related
/// to a distinct kept member. Preserves the recognized language and all
/// subsumption comparisons.
fn minimize(members: BTreeSet<StateId>, relation: &Relation) -> MacroState {
    let members: Vec<StateId> = members.into_iter().collect();
    let mut keep = vec![true; members.len()];
    for i in 0..members.len() {
        if !keep[i] {
            continue;
        }
        for j in 0..members.len() {
            if i != j && keep[j] && relation.get(members[j], members[i]) {
                keep[j] = false;
            }
        }
    }
    members
        .into_iter()
        .zip(keep)
        .filter_map(|(member, kept)| kept.then_some(member))
        .collect()
}

/// Post-image of a macro-state: the union of δ(m, symbol) over members.
fn post_of(nfa: &Nfa, members: &[StateId], symbol: SymbolId) -> BTreeSet<StateId> {
    let mut image = BTreeSet::new();
    for &member in members {
        image.extend(nfa.post(member, symbol).iter().copied());
    }
    image
}
