//! Antichain-based decision procedures for nondeterministic finite
//! automata.
//!
//! The crate loads automata from a simple line-oriented text format and
//! decides **universality** (does the automaton accept every word?) and
//! **language inclusion** on-the-fly, pruning the exponential subset
//! frontier with an antichain kept under a subsumption quasi-order. The
//! subsumption is either the identity or the maximal simulation preorder,
//! computed with the counter-based Henzinger–Henzinger–Kopke fixpoint.

pub mod core;
pub mod errors;

pub use crate::core::antichain::{is_included, is_universal};
pub use crate::core::automaton::{MacroState, ProductState, StateId, SymbolId};
pub use crate::core::format::parse;
pub use crate::core::nfa::Nfa;
pub use crate::core::relation::Relation;
pub use crate::errors::{ParseError, ParseErrorKind};
