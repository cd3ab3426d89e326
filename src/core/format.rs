use std::fmt;

use crate::core::nfa::Nfa;
use crate::errors::{ParseError, ParseErrorKind};

/// Parses an automaton from its line-oriented textual form.
///
/// `@`-prefixed type lines are skipped. Recognized directives are
/// `%Name`, `%States`, `%Initial`, `%Final`, and `%Alphabet`; every other
/// non-blank line, recognized directive or not, is a `src sym dst`
/// transition. `#` starts a comment running to the end of the line,
/// surrounding whitespace is ignored, and states or symbols referenced
/// before (or without) their declaration are auto-declared.
///
/// # Arguments
///
/// - `text` (`&str`) - The automaton file contents.
///
/// # Returns
///
/// - `Result<Nfa, ParseError>` - The populated automaton, or the first
///   malformed line.
pub fn parse(text: &str) -> Result<Nfa, ParseError> {
    let mut nfa = Nfa::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() || line.starts_with('@') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let directive = tokens.next().unwrap_or_default();
        match directive {
            "%Name" => {
                let rest = line[directive.len()..].trim();
                if rest.is_empty() {
                    return Err(ParseError::new(
                        index + 1,
                        ParseErrorKind::MissingArgument {
                            directive: directive.to_owned(),
                        },
                    ));
                }
                nfa.set_name(rest);
            }
            "%States" => {
                for token in tokens {
                    nfa.insert_state(token);
                }
            }
            "%Initial" => {
                for token in tokens {
                    nfa.mark_initial(token);
                }
            }
            "%Final" => {
                for token in tokens {
                    nfa.mark_final(token);
                }
            }
            "%Alphabet" => {
                for token in tokens {
                    nfa.insert_symbol(token);
                }
            }
            // Any other line, directive-looking or not, is a transition.
            _ => {
                let tokens: Vec<&str> = line.split_whitespace().collect();
                let &[src, sym, dst] = tokens.as_slice() else {
                    return Err(ParseError::new(
                        index + 1,
                        ParseErrorKind::MalformedTransition {
                            found: tokens.len(),
                        },
                    ));
                };
                nfa.insert_transition(src, sym, dst);
            }
        }
    }

    Ok(nfa)
}

/// Serializes the automaton back into the textual form accepted by
/// [`parse`]: a `@NFA` type line, the headers, a blank separator, then
/// one transition per line in state-id and symbol-id order.
impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "@NFA")?;
        if let Some(name) = self.name() {
            writeln!(f, "%Name {name}")?;
        }

        write!(f, "%States")?;
        for state in self.states() {
            write!(f, " {}", self.state_name(state).unwrap_or_default())?;
        }
        writeln!(f)?;

        write!(f, "%Alphabet")?;
        for symbol in self.symbols() {
            write!(f, " {}", self.symbol_name(symbol).unwrap_or_default())?;
        }
        writeln!(f)?;

        write!(f, "%Initial")?;
        for &state in self.initials() {
            write!(f, " {}", self.state_name(state).unwrap_or_default())?;
        }
        writeln!(f)?;

        write!(f, "%Final")?;
        for &state in self.finals() {
            write!(f, " {}", self.state_name(state).unwrap_or_default())?;
        }
        writeln!(f)?;
        writeln!(f)?;

        for state in self.states() {
            for symbol in self.symbols() {
                for &dst in self.post(state, symbol) {
                    writeln!(
                        f,
                        "{} {} {}",
                        self.state_name(state).unwrap_or_default(),
                        self.symbol_name(symbol).unwrap_or_default(),
                        self.state_name(dst).unwrap_or_default(),
                    )?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let nfa = parse("# header\n\n  q0 a q1  # trailing\n").unwrap();
        assert_eq!(nfa.state_count(), 2);
        assert_eq!(nfa.symbol_count(), 1);
    }

    #[test]
    fn initial_and_final_may_precede_states() {
        let nfa = parse("%Initial q0\n%Final q1\n%States q0 q1\n").unwrap();
        assert_eq!(nfa.state_count(), 2);
        assert!(nfa.is_initial(nfa.state_id("q0").unwrap()));
        assert!(nfa.is_final(nfa.state_id("q1").unwrap()));
    }

    #[test]
    fn malformed_transition_is_reported_with_its_line() {
        let err = parse("@NFA\nq0 a\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, ParseErrorKind::MalformedTransition { found: 2 });
    }

    #[test]
    fn unrecognized_directive_falls_through_to_transition() {
        let nfa = parse("%Bogus a q0\n").unwrap();
        assert_eq!(nfa.state_count(), 2);
        assert!(nfa.state_id("%Bogus").is_some());
        assert!(nfa.symbol_id("a").is_some());
    }
}
