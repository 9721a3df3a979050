//! Token classification: one symbol per raw token, computed in a
//! single left-to-right pass with no side effects.

use crate::registry::Parser;
use crate::resolve::Lookup;

/// Classification symbol for one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Symbol {
    /// Looks like an option (registered or not).
    Opt,
    /// A plain argument.
    Arg,
    /// The literal `--` separator.
    Sep,
}

impl Symbol {
    fn as_char(self) -> char {
        match self {
            Symbol::Opt => 'O',
            Symbol::Arg => 'A',
            Symbol::Sep => '-',
        }
    }
}

/// Render a pattern for logs and assertions, e.g. `"OAA-A"`.
pub(crate) fn pattern_string(pattern: &[Symbol]) -> String {
    pattern.iter().map(|s| s.as_char()).collect()
}

impl Parser {
    /// Label every token `O`, `A`, or `-`.
    ///
    /// The first separator wins: everything after it is `A`
    /// unconditionally, option-shaped or not.
    pub(crate) fn classify(&self, tokens: &[String]) -> Vec<Symbol> {
        let mut pattern = Vec::with_capacity(tokens.len());
        let mut seen_separator = false;
        for token in tokens {
            let symbol = if seen_separator {
                Symbol::Arg
            } else if token == "--" {
                seen_separator = true;
                Symbol::Sep
            } else if matches!(self.lookup_option(token), Lookup::NotAnOption) {
                Symbol::Arg
            } else {
                Symbol::Opt
            };
            pattern.push(symbol);
        }
        pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{OptionDef, Parser};

    fn toks(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn parser() -> Parser {
        let mut p = Parser::new();
        p.add_option(OptionDef::flag(["-x", "--extra"], "extra"));
        p.add_option(OptionDef::value(["-f", "--fields"], "fields"));
        p
    }

    #[test]
    fn options_and_arguments() {
        let p = parser();
        let pattern = p.classify(&toks(&["-x", "file", "--fields", "a,b"]));
        assert_eq!(pattern_string(&pattern), "OAOA");
    }

    #[test]
    fn separator_forces_arguments() {
        let p = parser();
        let pattern = p.classify(&toks(&["a", "--", "-x", "--fields"]));
        assert_eq!(pattern_string(&pattern), "A-AA");
    }

    #[test]
    fn second_separator_is_a_plain_argument() {
        let p = parser();
        let pattern = p.classify(&toks(&["--", "--"]));
        assert_eq!(pattern_string(&pattern), "-A");
    }

    #[test]
    fn unknown_option_shapes_still_classify_as_options() {
        let p = parser();
        let pattern = p.classify(&toks(&["--bogus", "-z"]));
        assert_eq!(pattern_string(&pattern), "OO");
    }

    #[test]
    fn negative_numbers_are_arguments_without_numeric_options() {
        let p = parser();
        let pattern = p.classify(&toks(&["-5", "-5.5", "-x"]));
        assert_eq!(pattern_string(&pattern), "AAO");
    }

    #[test]
    fn negative_numbers_are_options_with_numeric_options() {
        let mut p = parser();
        p.add_option(OptionDef::flag(["-1"], "oneshot"));
        let pattern = p.classify(&toks(&["-5"]));
        assert_eq!(pattern_string(&pattern), "O");
    }

    #[test]
    fn lone_dash_is_an_argument() {
        let p = parser();
        let pattern = p.classify(&toks(&["-"]));
        assert_eq!(pattern_string(&pattern), "A");
    }
}
