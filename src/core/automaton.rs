/// Identifier type for automaton states.
///
/// Ids are dense, assigned in insertion order, and stable for the lifetime
/// of the automaton: deleting a state retires its id without renumbering
/// the rest.
pub type StateId = u32;

/// Identifier type for alphabet symbols. Assigned in insertion order
/// starting at 0; symbols are never deleted.
pub type SymbolId = u32;

/// A set of states used as a node in the on-the-fly subset traversal.
///
/// Always sorted and duplicate-free, so two macro-states are equal exactly
/// when they contain the same states. Macro-states are value objects: they
/// are built fresh by each post-image computation and never mutated after
/// entering a frontier.
pub type MacroState = Vec<StateId>;

/// A pair of a state of the left automaton and a macro-state over the
/// right automaton, used during the inclusion search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductState {
    /// State of the left automaton.
    pub state: StateId,
    /// Macro-state over the right automaton, in union-automaton numbering.
    pub set: MacroState,
}
