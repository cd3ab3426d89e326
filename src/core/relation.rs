use std::fmt::Write as _;

use crate::core::automaton::StateId;
use crate::core::nfa::Nfa;

/// Dense binary relation over state ids, stored as a flat boolean matrix.
///
/// A relation is allocated with a fixed size and never resized. Reads
/// outside the allocated square answer `false` and writes outside it are
/// ignored, so callers may probe with retired ids safely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    size: usize,
    cells: Vec<bool>,
}

impl Relation {
    /// Creates an `n`×`n` relation with every cell set to `default`.
    #[must_use]
    pub fn new(size: usize, default: bool) -> Self {
        Self {
            size,
            cells: vec![default; size * size],
        }
    }

    /// Creates the `n`×`n` relation that holds exactly on the diagonal.
    #[must_use]
    pub fn identity(size: usize) -> Self {
        let mut relation = Self::new(size, false);
        for i in 0..size as StateId {
            relation.set(i, i, true);
        }
        relation
    }

    /// Number of rows (and columns) of the matrix.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Looks up the cell `(p, q)`. Out-of-range lookups answer `false`.
    #[must_use]
    pub fn get(&self, p: StateId, q: StateId) -> bool {
        let (p, q) = (p as usize, q as usize);
        if p >= self.size || q >= self.size {
            return false;
        }
        self.cells[p * self.size + q]
    }

    /// Writes the cell `(p, q)`. Out-of-range writes are ignored.
    pub fn set(&mut self, p: StateId, q: StateId, value: bool) {
        let (p, q) = (p as usize, q as usize);
        if p < self.size && q < self.size {
            self.cells[p * self.size + q] = value;
        }
    }

    /// Flips every cell in place.
    pub fn complement(&mut self) {
        for cell in &mut self.cells {
            *cell = !*cell;
        }
    }
}

/// Renders `relation` as a matrix with the live state names of `nfa` as
/// row and column headers.
#[must_use]
pub fn render(relation: &Relation, nfa: &Nfa) -> String {
    let mut out = String::new();
    for state in nfa.states() {
        let name = nfa.state_name(state).unwrap_or_default();
        let _ = write!(out, " {name}");
    }
    out.push('\n');

    for row in nfa.states() {
        let name = nfa.state_name(row).unwrap_or_default();
        let _ = write!(out, "{name}");
        for col in nfa.states() {
            let _ = write!(out, " {}", u8::from(relation.get(row, col)));
        }
        out.push('\n');
    }
    out
}
