use std::collections::BTreeSet;

use facheck::core::simulation;
use facheck::{Nfa, StateId, SymbolId, parse};

/// Simple deterministic generator so the property tests are reproducible
/// without a randomness dependency.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn chance(&mut self, percent: u64) -> bool {
        self.next() % 100 < percent
    }
}

fn random_nfa(seed: u64, states: usize, symbols: usize) -> Nfa {
    let mut rng = Lcg(seed);
    let mut nfa = Nfa::new();
    let names: Vec<String> = (0..states).map(|i| format!("q{i}")).collect();
    let alphabet: Vec<String> = (0..symbols).map(|i| format!("s{i}")).collect();
    for name in &names {
        nfa.insert_state(name);
    }
    for symbol in &alphabet {
        nfa.insert_symbol(symbol);
    }
    nfa.mark_initial(&names[0]);
    for name in &names {
        if rng.chance(40) {
            nfa.mark_final(name);
        }
    }
    for src in &names {
        for symbol in &alphabet {
            for dst in &names {
                if rng.chance(30) {
                    nfa.insert_transition(src, symbol, dst);
                }
            }
        }
    }
    nfa
}

/// Whether the automaton accepts `word` when started from `start` alone.
fn accepts_from(nfa: &Nfa, start: StateId, word: &[SymbolId]) -> bool {
    let mut current = BTreeSet::from([start]);
    for &symbol in word {
        let mut next = BTreeSet::new();
        for &state in &current {
            next.extend(nfa.post(state, symbol).iter().copied());
        }
        current = next;
    }
    current.iter().any(|&state| nfa.is_final(state))
}

/// All words over the automaton's alphabet up to `max_len` symbols.
fn short_words(nfa: &Nfa, max_len: usize) -> Vec<Vec<SymbolId>> {
    let symbols: Vec<SymbolId> = nfa.symbols().collect();
    let mut words: Vec<Vec<SymbolId>> = vec![Vec::new()];
    let mut frontier = vec![Vec::new()];
    for _ in 0..max_len {
        let mut longer = Vec::new();
        for word in &frontier {
            for &symbol in &symbols {
                let mut extended = word.clone();
                extended.push(symbol);
                longer.push(extended);
            }
        }
        words.extend(longer.iter().cloned());
        frontier = longer;
    }
    words
}

#[test]
fn branching_state_is_simulated_by_looping_accepters() {
    let nfa = parse(
        "%States p q r\n\
         %Final q r\n\
         p a q\n\
         p a r\n\
         q a q\n\
         r a r\n",
    )
    .unwrap();
    let relation = simulation::maximal(&nfa);

    let p = nfa.state_id("p").unwrap();
    let q = nfa.state_id("q").unwrap();
    let r = nfa.state_id("r").unwrap();

    // q and r are language-equivalent, and each covers p.
    assert!(relation.get(q, r));
    assert!(relation.get(r, q));
    assert!(relation.get(p, q));
    assert!(relation.get(p, r));
    // A final state is never simulated by a non-final one.
    assert!(!relation.get(q, p));
    assert!(!relation.get(r, p));
    for state in nfa.states() {
        assert!(relation.get(state, state));
    }
}

#[test]
fn simulation_is_a_preorder() {
    for seed in 0..25 {
        let nfa = random_nfa(seed, 5, 2);
        let relation = simulation::maximal(&nfa);
        let states: Vec<StateId> = nfa.states().collect();

        for &p in &states {
            assert!(relation.get(p, p), "not reflexive at {p} (seed {seed})");
        }
        for &p in &states {
            for &q in &states {
                for &r in &states {
                    if relation.get(p, q) && relation.get(q, r) {
                        assert!(
                            relation.get(p, r),
                            "not transitive at ({p},{q},{r}) (seed {seed})"
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn simulation_respects_final_states() {
    for seed in 0..25 {
        let nfa = random_nfa(seed, 5, 2);
        let relation = simulation::maximal(&nfa);
        for p in nfa.states() {
            for q in nfa.states() {
                if relation.get(p, q) && nfa.is_final(p) {
                    assert!(nfa.is_final(q), "finals violated at ({p},{q}) (seed {seed})");
                }
            }
        }
    }
}

#[test]
fn simulation_implies_language_inclusion() {
    for seed in 0..10 {
        let nfa = random_nfa(seed, 4, 2);
        let relation = simulation::maximal(&nfa);
        let words = short_words(&nfa, 5);
        for p in nfa.states() {
            for q in nfa.states() {
                if !relation.get(p, q) {
                    continue;
                }
                for word in &words {
                    if accepts_from(&nfa, p, word) {
                        assert!(
                            accepts_from(&nfa, q, word),
                            "({p},{q}) related but word {word:?} separates them (seed {seed})"
                        );
                    }
                }
            }
        }
    }
}
