use std::collections::BTreeSet;

use indexmap::IndexMap;
use tracing::debug;

use crate::core::automaton::{StateId, SymbolId};

/// Shared lookup result for states with no outgoing transitions.
static EMPTY: BTreeSet<StateId> = BTreeSet::new();

/// A nondeterministic finite automaton over a named alphabet.
///
/// States and symbols are addressed externally by string name and
/// internally by dense ids assigned in insertion order. The transition
/// table is a lazily grown two-dimensional array of sorted sets indexed by
/// `(state, symbol)`; the empty set is the default for every pair.
///
/// An automaton is built up by the insert operations and then treated as
/// read-only by the decision engines.
#[derive(Debug, Clone, Default)]
pub struct Nfa {
    /// Automaton name from the `%Name` header, if any.
    name: Option<String>,
    /// Name → id dictionary for live states.
    state_ids: IndexMap<String, StateId>,
    /// Id → name dictionary for live states; the inverse of `state_ids`.
    state_names: IndexMap<StateId, String>,
    /// Name → id dictionary for symbols.
    symbol_ids: IndexMap<String, SymbolId>,
    /// Id → name dictionary for symbols; the inverse of `symbol_ids`.
    symbol_names: IndexMap<SymbolId, String>,
    /// Transition table rows, indexed by state id then symbol id.
    delta: Vec<Vec<BTreeSet<StateId>>>,
    /// Initial state ids.
    start: BTreeSet<StateId>,
    /// Final state ids.
    accept: BTreeSet<StateId>,
    /// Next state id to hand out. Never decremented, so retired ids are
    /// not reused.
    next_state: StateId,
    /// Next symbol id to hand out.
    next_symbol: SymbolId,
}

impl Nfa {
    /// Creates an empty automaton.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Automaton name, if one was set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Sets the automaton name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Adds a state under `name`.
    ///
    /// # Returns
    ///
    /// - `bool` - Whether the state was newly added. The state is live
    ///   afterwards either way.
    pub fn insert_state(&mut self, name: &str) -> bool {
        if self.state_ids.contains_key(name) {
            return false;
        }
        let id = self.next_state;
        self.next_state += 1;
        self.state_ids.insert(name.to_owned(), id);
        self.state_names.insert(id, name.to_owned());
        true
    }

    /// Adds a symbol under `name`.
    ///
    /// # Returns
    ///
    /// - `bool` - Whether the symbol was newly added.
    pub fn insert_symbol(&mut self, name: &str) -> bool {
        if self.symbol_ids.contains_key(name) {
            return false;
        }
        let id = self.next_symbol;
        self.next_symbol += 1;
        self.symbol_ids.insert(name.to_owned(), id);
        self.symbol_names.insert(id, name.to_owned());
        true
    }

    /// Adds the transition `src --sym--> dst`, auto-inserting any of the
    /// three endpoints that are not yet declared.
    ///
    /// # Returns
    ///
    /// - `bool` - Whether the transition was new.
    pub fn insert_transition(&mut self, src: &str, sym: &str, dst: &str) -> bool {
        let s1 = self.intern_state(src);
        let a = self.intern_symbol(sym);
        let s2 = self.intern_state(dst);
        self.link(s1, a, s2)
    }

    /// Marks `name` as an initial state, auto-inserting it if needed.
    pub fn mark_initial(&mut self, name: &str) {
        let id = self.intern_state(name);
        self.start.insert(id);
    }

    /// Marks `name` as a final state, auto-inserting it if needed.
    pub fn mark_final(&mut self, name: &str) {
        let id = self.intern_state(name);
        self.accept.insert(id);
    }

    /// Deletes the state `name`, scrubbing it from the initial and final
    /// sets and from every transition-table row and column. The id is
    /// retired, not reused.
    ///
    /// # Returns
    ///
    /// - `bool` - Whether the state existed.
    pub fn delete_state(&mut self, name: &str) -> bool {
        let Some(id) = self.state_ids.shift_remove(name) else {
            return false;
        };
        self.state_names.shift_remove(&id);
        self.start.remove(&id);
        self.accept.remove(&id);
        if let Some(row) = self.delta.get_mut(id as usize) {
            row.clear();
        }
        for row in &mut self.delta {
            for targets in row {
                targets.remove(&id);
            }
        }
        true
    }

    /// Live state ids, in insertion (and therefore ascending id) order.
    pub fn states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.state_names.keys().copied()
    }

    /// Symbol ids, in insertion order.
    pub fn symbols(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.symbol_names.keys().copied()
    }

    /// Number of live states.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.state_ids.len()
    }

    /// Number of symbols in the alphabet.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.symbol_ids.len()
    }

    /// One past the largest state id ever assigned. Relations over this
    /// automaton are sized to this bound.
    #[must_use]
    pub fn state_bound(&self) -> usize {
        self.next_state as usize
    }

    /// One past the largest symbol id assigned.
    #[must_use]
    pub fn symbol_bound(&self) -> usize {
        self.next_symbol as usize
    }

    /// Id of the state called `name`, if it is live.
    #[must_use]
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.state_ids.get(name).copied()
    }

    /// Name of the live state `id`.
    #[must_use]
    pub fn state_name(&self, id: StateId) -> Option<&str> {
        self.state_names.get(&id).map(String::as_str)
    }

    /// Id of the symbol called `name`.
    #[must_use]
    pub fn symbol_id(&self, name: &str) -> Option<SymbolId> {
        self.symbol_ids.get(name).copied()
    }

    /// Name of the symbol `id`.
    #[must_use]
    pub fn symbol_name(&self, id: SymbolId) -> Option<&str> {
        self.symbol_names.get(&id).map(String::as_str)
    }

    /// The set δ(state, symbol). Pairs without transitions answer the
    /// empty set.
    #[must_use]
    pub fn post(&self, state: StateId, symbol: SymbolId) -> &BTreeSet<StateId> {
        self.delta
            .get(state as usize)
            .and_then(|row| row.get(symbol as usize))
            .unwrap_or(&EMPTY)
    }

    /// The initial state set.
    #[must_use]
    pub fn initials(&self) -> &BTreeSet<StateId> {
        &self.start
    }

    /// The final state set.
    #[must_use]
    pub fn finals(&self) -> &BTreeSet<StateId> {
        &self.accept
    }

    /// Whether `state` is initial.
    #[must_use]
    pub fn is_initial(&self, state: StateId) -> bool {
        self.start.contains(&state)
    }

    /// Whether `state` is final.
    #[must_use]
    pub fn is_final(&self, state: StateId) -> bool {
        self.accept.contains(&state)
    }

    /// Builds the automaton with every arc flipped. Dictionaries and the
    /// initial/final sets carry over unchanged.
    #[must_use]
    pub fn reverse(&self) -> Nfa {
        let mut reversed = self.clone();
        reversed.delta = Vec::new();
        for (src, row) in self.delta.iter().enumerate() {
            for (sym, targets) in row.iter().enumerate() {
                for &dst in targets {
                    reversed.link(dst, sym as SymbolId, src as StateId);
                }
            }
        }
        reversed
    }

    /// Builds the union automaton of `self` and `other`.
    ///
    /// The two state sets are made disjoint by shifting every id of
    /// `other` past `self.state_bound()`; names of `other` that clash
    /// with existing names are uniquified by appending primes. The result
    /// has the union of the alphabets, initial sets, final sets, and
    /// transition tables.
    #[must_use]
    pub fn union(&self, other: &Nfa) -> Nfa {
        let offset = self.state_bound() as StateId;
        let mut result = self.clone();
        result.name = None;

        for (&id, other_name) in &other.state_names {
            let mut name = other_name.clone();
            while result.state_ids.contains_key(&name) {
                name.push('\'');
            }
            result.state_ids.insert(name.clone(), id + offset);
            result.state_names.insert(id + offset, name);
        }
        result.next_state = offset + other.next_state;

        let mut symbol_map = vec![0; other.symbol_bound()];
        for (name, &id) in &other.symbol_ids {
            symbol_map[id as usize] = result.intern_symbol(name);
        }

        for &state in &other.start {
            result.start.insert(state + offset);
        }
        for &state in &other.accept {
            result.accept.insert(state + offset);
        }

        for (src, row) in other.delta.iter().enumerate() {
            for (sym, targets) in row.iter().enumerate() {
                for &dst in targets {
                    result.link(src as StateId + offset, symbol_map[sym], dst + offset);
                }
            }
        }
        result
    }

    /// Deletes every state that is not both reachable from the initial
    /// set and co-reachable to the final set. Preserves the recognized
    /// language, hence also every universality or inclusion verdict.
    ///
    /// # Returns
    ///
    /// - `usize` - The number of states removed.
    pub fn prune(&mut self) -> usize {
        let forward = self.closure_from(self.start.clone());
        let backward = self.reverse().closure_from(self.accept.clone());

        let dead: Vec<String> = self
            .state_names
            .iter()
            .filter(|(id, _)| !forward.contains(id) || !backward.contains(id))
            .map(|(_, name)| name.clone())
            .collect();
        for name in &dead {
            self.delete_state(name);
        }
        if !dead.is_empty() {
            debug!(removed = dead.len(), "pruned dead states");
        }
        dead.len()
    }

    /// Fixpoint of `seed` under the transition table.
    fn closure_from(&self, seed: BTreeSet<StateId>) -> BTreeSet<StateId> {
        let mut seen = seed;
        let mut stack: Vec<StateId> = seen.iter().copied().collect();
        while let Some(state) = stack.pop() {
            for symbol in self.symbols() {
                for &next in self.post(state, symbol) {
                    if seen.insert(next) {
                        stack.push(next);
                    }
                }
            }
        }
        seen
    }

    /// Looks up or inserts the state `name`.
    pub(crate) fn intern_state(&mut self, name: &str) -> StateId {
        self.insert_state(name);
        self.state_ids[name]
    }

    /// Looks up or inserts the symbol `name`.
    pub(crate) fn intern_symbol(&mut self, name: &str) -> SymbolId {
        self.insert_symbol(name);
        self.symbol_ids[name]
    }

    /// Adds `src --sym--> dst` by id, growing the table as needed.
    fn link(&mut self, src: StateId, sym: SymbolId, dst: StateId) -> bool {
        let row = src as usize;
        if self.delta.len() <= row {
            self.delta.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.delta[row];
        let col = sym as usize;
        if cells.len() <= col {
            cells.resize_with(col + 1, BTreeSet::new);
        }
        cells[col].insert(dst)
    }
}
