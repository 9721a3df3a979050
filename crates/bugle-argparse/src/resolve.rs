//! Option resolution: spelling lookup (exact, inline `=value`,
//! attached short value, unambiguous long abbreviation), plus the
//! arity-matching rules over the classification pattern.
//!
//! Each special case the classic parsers accrete (abbreviations,
//! negative numbers, `=`-joined values) lives here as a named,
//! independently testable rule rather than inside the consumption
//! loop.

use crate::classify::Symbol;
use crate::registry::{Arity, Parser};

/// Outcome of resolving one token against the option registry.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Lookup {
    /// Not option-shaped at all; classifies as a plain argument.
    NotAnOption,
    /// Option-shaped but unregistered; routed to extras, not fatal.
    Unknown,
    Matched {
        opt: usize,
        spelling: String,
        inline: Option<String>,
    },
    /// A long abbreviation matching several registered options.
    Ambiguous {
        spelling: String,
        candidates: Vec<String>,
    },
}

impl Parser {
    pub(crate) fn lookup_option(&self, token: &str) -> Lookup {
        if !token.starts_with('-') || token == "-" {
            return Lookup::NotAnOption;
        }

        // Exact spelling.
        if let Some(&opt) = self.spellings.get(token) {
            return Lookup::Matched {
                opt,
                spelling: token.to_string(),
                inline: None,
            };
        }

        // `=`-joined inline value.
        if let Some((flag, value)) = token.split_once('=') {
            if let Some(&opt) = self.spellings.get(flag) {
                return Lookup::Matched {
                    opt,
                    spelling: flag.to_string(),
                    inline: Some(value.to_string()),
                };
            }
        }

        if token.starts_with("--") {
            return self.lookup_abbreviation(token);
        }

        // Short option with an attached value or cluster: `-fVALUE`.
        if token.len() > 2 {
            let (prefix, rest) = token.split_at(2);
            if let Some(&opt) = self.spellings.get(prefix) {
                return Lookup::Matched {
                    opt,
                    spelling: prefix.to_string(),
                    inline: Some(rest.to_string()),
                };
            }
        }

        // Negative numbers only act as options when some registered
        // spelling looks like one.
        if looks_like_negative_number(token) && !self.has_negative_number_options {
            return Lookup::NotAnOption;
        }

        if token.contains(char::is_whitespace) {
            return Lookup::NotAnOption;
        }

        Lookup::Unknown
    }

    /// Unambiguous prefix match against registered long spellings.
    fn lookup_abbreviation(&self, token: &str) -> Lookup {
        let (flag, inline) = match token.split_once('=') {
            Some((flag, value)) => (flag, Some(value.to_string())),
            None => (token, None),
        };
        let mut candidates: Vec<(&str, usize)> = self
            .spellings
            .iter()
            .filter(|(spelling, _)| spelling.starts_with("--") && spelling.starts_with(flag))
            .map(|(spelling, &opt)| (spelling.as_str(), opt))
            .collect();
        candidates.sort_by_key(|(spelling, _)| *spelling);
        match candidates.as_slice() {
            [] => Lookup::Unknown,
            [(spelling, opt)] => Lookup::Matched {
                opt: *opt,
                spelling: spelling.to_string(),
                inline,
            },
            many => Lookup::Ambiguous {
                spelling: flag.to_string(),
                candidates: many.iter().map(|(s, _)| s.to_string()).collect(),
            },
        }
    }
}

pub(crate) fn looks_like_negative_number(token: &str) -> bool {
    let Some(body) = token.strip_prefix('-') else {
        return false;
    };
    if body.is_empty() {
        return false;
    }
    let mut seen_dot = false;
    let mut seen_digit = false;
    for c in body.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    seen_digit
}

/// How many of the following tokens the arity consumes, looking ahead
/// in the pattern so variable arities never swallow option-shaped
/// tokens. The separator may interleave the run (`--fields -- a`); it
/// is consumed with the run but never collected as a value. `None`
/// means the arity cannot be satisfied here.
pub(crate) fn match_arity(arity: Arity, pattern: &[Symbol]) -> Option<usize> {
    let window = pattern
        .iter()
        .take_while(|s| !matches!(s, Symbol::Opt))
        .count();
    let available = pattern[..window]
        .iter()
        .filter(|s| matches!(s, Symbol::Arg))
        .count();
    let needed = match arity {
        Arity::None => return Some(0),
        Arity::Exact(n) => (available >= n).then_some(n)?,
        Arity::Optional => available.min(1),
        Arity::ZeroOrMore => available,
        Arity::OneOrMore => (available >= 1).then_some(available)?,
    };
    if needed == 0 {
        return Some(0);
    }
    let mut seen = 0;
    for (i, symbol) in pattern[..window].iter().enumerate() {
        if matches!(symbol, Symbol::Arg) {
            seen += 1;
            if seen == needed {
                return Some(i + 1);
            }
        }
    }
    None
}

/// Allocate the window's argument tokens to pending positionals in
/// declaration order: greedy, but always leaving enough for the
/// minimum counts of the positionals still downstream.
///
/// Returns one count per satisfiable leading positional; a positional
/// whose minimum cannot be met stops the allocation (the shortfall is
/// reported once, at finalization).
pub(crate) fn allocate_positionals(arities: &[Arity], window: &[Symbol]) -> Vec<usize> {
    let mut avail = window
        .iter()
        .filter(|s| matches!(s, Symbol::Arg))
        .count();
    let mut counts = Vec::new();
    for (i, &arity) in arities.iter().enumerate() {
        let min = arity.min_count();
        if avail < min {
            break;
        }
        let downstream_min: usize = arities[i + 1..].iter().map(|a| a.min_count()).sum();
        let spare = avail.saturating_sub(min + downstream_min);
        let take = match arity {
            Arity::Exact(n) => n,
            Arity::Optional => (min + spare).min(1),
            Arity::ZeroOrMore | Arity::OneOrMore => min + spare,
            Arity::None => 0,
        };
        counts.push(take);
        avail -= take;
    }
    counts
}
