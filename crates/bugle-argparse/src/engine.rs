//! The consumption engine: a single left-to-right pass that
//! alternates between positional runs and single option invocations,
//! tracks non-default invocations for exclusion groups, and validates
//! required arguments once the stream is exhausted.

use std::collections::{HashSet, VecDeque};

use crate::classify::{Symbol, pattern_string};
use crate::error::ParseError;
use crate::namespace::{Namespace, Value};
use crate::registry::{Action, Arity, OptionDef, Parser, PositionalDef};
use crate::resolve::{Lookup, allocate_positionals, match_arity};
use crate::stdin::InputSource;

/// Result of a successful parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    pub namespace: Namespace,
    /// Tokens matched by nothing; never fatal by themselves. The
    /// caller decides whether they are a usage problem or input for a
    /// second-stage parser.
    pub extras: Vec<String>,
}

/// Record of the one option (or positional) that claimed stdin.
#[derive(Debug, Clone)]
struct StdinClaim {
    option: String,
}

struct ParseState {
    namespace: Namespace,
    seen: HashSet<usize>,
    seen_non_default: HashSet<usize>,
    pending_positionals: VecDeque<usize>,
    extras: Vec<String>,
    stdin_claim: Option<StdinClaim>,
}

/// View over the fields shared by option and positional definitions,
/// so one action path serves both.
struct SpecView<'a> {
    dest: &'a str,
    arity: Arity,
    action: &'a Action,
    converter: Option<&'a String>,
    const_value: Option<&'a Value>,
    display: String,
}

impl OptionDef {
    fn spec(&self, spelling: &str) -> SpecView<'_> {
        SpecView {
            dest: &self.dest,
            arity: self.arity,
            action: &self.action,
            converter: self.converter.as_ref(),
            const_value: self.const_value.as_ref(),
            display: spelling.to_string(),
        }
    }
}

impl PositionalDef {
    fn spec(&self) -> SpecView<'_> {
        SpecView {
            dest: &self.dest,
            arity: self.arity,
            action: &self.action,
            converter: self.converter.as_ref(),
            const_value: None,
            display: self.dest.clone(),
        }
    }
}

impl Parser {
    /// Parse a token stream against the registry.
    ///
    /// Every token ends up in exactly one place: matched to a
    /// definition, consumed as a value, consumed as the separator, or
    /// pushed to `extras`. A fatal error discards the namespace; the
    /// caller never sees a partially committed result.
    pub fn parse(
        &self,
        tokens: &[String],
        input: &mut dyn InputSource,
    ) -> Result<ParseOutput, ParseError> {
        let pattern = self.classify(tokens);
        tracing::debug!(pattern = %pattern_string(&pattern), "classified argument stream");

        let option_indices: Vec<usize> = pattern
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s, Symbol::Opt))
            .map(|(i, _)| i)
            .collect();

        let mut st = ParseState {
            namespace: Namespace::new(),
            seen: HashSet::new(),
            seen_non_default: HashSet::new(),
            pending_positionals: (0..self.positionals.len()).collect(),
            extras: Vec::new(),
            stdin_claim: None,
        };

        let mut start = 0;
        if let Some(&max_opt) = option_indices.last() {
            while start <= max_opt {
                let next_opt = option_indices
                    .iter()
                    .copied()
                    .find(|&i| i >= start)
                    .unwrap_or(max_opt);
                if start != next_opt {
                    let pos_end = self.consume_positionals(&mut st, tokens, &pattern, start, input)?;
                    if pos_end > start {
                        start = pos_end;
                        continue;
                    }
                    if self.halt_at_first_positional {
                        // Two-phase dispatch: the rest of the stream
                        // belongs to whatever the first extra names.
                        st.extras.extend(tokens[start..].iter().cloned());
                        return self.finalize(st);
                    }
                    st.extras
                        .extend(tokens[start..next_opt].iter().cloned());
                    start = next_opt;
                }
                start = self.consume_optional(&mut st, tokens, &pattern, start, input)?;
            }
        }

        // One final positional pass over whatever remains.
        let stop = self.consume_positionals(&mut st, tokens, &pattern, start, input)?;
        st.extras.extend(tokens[stop..].iter().cloned());
        self.finalize(st)
    }

    fn finalize(&self, st: ParseState) -> Result<ParseOutput, ParseError> {
        if !st.pending_positionals.is_empty() {
            return Err(ParseError::TooFewArguments);
        }
        for (idx, def) in self.options.iter().enumerate() {
            if def.required && !st.seen.contains(&idx) {
                return Err(ParseError::RequiredMissing {
                    name: def.display_name(),
                });
            }
        }
        for group in &self.groups {
            if group.required
                && !group
                    .members
                    .iter()
                    .any(|m| st.seen_non_default.contains(m))
            {
                return Err(ParseError::RequiredGroupMissing {
                    options: group
                        .members
                        .iter()
                        .map(|&m| self.options[m].display_name())
                        .collect(),
                });
            }
        }
        if !st.extras.is_empty() {
            tracing::debug!(extras = ?st.extras, "unmatched tokens left for the caller");
        }
        Ok(ParseOutput {
            namespace: st.namespace,
            extras: st.extras,
        })
    }

    /// Consume the run of positional-eligible tokens starting at
    /// `start`, assigning them to pending positionals in declaration
    /// order. Returns the index of the first unconsumed token.
    fn consume_positionals(
        &self,
        st: &mut ParseState,
        tokens: &[String],
        pattern: &[Symbol],
        start: usize,
        input: &mut dyn InputSource,
    ) -> Result<usize, ParseError> {
        let window_len = pattern[start..]
            .iter()
            .take_while(|s| !matches!(s, Symbol::Opt))
            .count();
        let window = &pattern[start..start + window_len];
        let arities: Vec<Arity> = st
            .pending_positionals
            .iter()
            .map(|&i| self.positionals[i].arity)
            .collect();
        let counts = allocate_positionals(&arities, window);

        let mut i = start;
        for &count in &counts {
            let def_idx = st
                .pending_positionals
                .pop_front()
                .expect("allocation cannot outrun pending positionals");
            let mut values = Vec::with_capacity(count);
            while values.len() < count {
                if matches!(pattern[i], Symbol::Sep) {
                    i += 1;
                    continue;
                }
                values.push(tokens[i].clone());
                i += 1;
            }
            let def = &self.positionals[def_idx];
            // A zero-width match satisfies the positional without
            // touching the namespace.
            if values.is_empty() && def.arity.min_count() == 0 {
                continue;
            }
            self.take_action(st, None, def.spec(), values, input)?;
        }
        // The separator itself is consumed, never an extra.
        while i < start + window_len && matches!(pattern[i], Symbol::Sep) {
            i += 1;
        }
        Ok(i)
    }

    /// Consume exactly one option invocation at `start` (which is
    /// classified `O`), including any clustered flags sharing the
    /// token and any following value tokens its arity demands.
    fn consume_optional(
        &self,
        st: &mut ParseState,
        tokens: &[String],
        pattern: &[Symbol],
        start: usize,
        input: &mut dyn InputSource,
    ) -> Result<usize, ParseError> {
        let mut lookup = self.lookup_option(&tokens[start]);
        let mut invocations: Vec<(usize, Vec<String>, String)> = Vec::new();
        let stop;
        loop {
            match lookup {
                Lookup::Unknown | Lookup::NotAnOption => {
                    st.extras.push(tokens[start].clone());
                    return Ok(start + 1);
                }
                Lookup::Ambiguous {
                    spelling,
                    candidates,
                } => {
                    return Err(ParseError::AmbiguousOption {
                        option: spelling,
                        candidates,
                    });
                }
                Lookup::Matched {
                    opt,
                    spelling,
                    inline,
                } => {
                    let def = &self.options[opt];
                    match inline {
                        Some(explicit) => {
                            if matches!(def.arity, Arity::None) {
                                if is_single_dash_short(&spelling) && !explicit.is_empty() {
                                    // Reinterpret the remainder as
                                    // another clustered short option.
                                    invocations.push((opt, Vec::new(), spelling));
                                    let mut rest = explicit.chars();
                                    let head = rest
                                        .next()
                                        .expect("clustered remainder is non-empty");
                                    let next_spelling = format!("-{head}");
                                    let next_rest: String = rest.collect();
                                    match self.spellings.get(&next_spelling) {
                                        Some(&next_opt) => {
                                            lookup = Lookup::Matched {
                                                opt: next_opt,
                                                spelling: next_spelling,
                                                inline: (!next_rest.is_empty())
                                                    .then_some(next_rest),
                                            };
                                            continue;
                                        }
                                        None => {
                                            return Err(ParseError::ArityMismatch {
                                                option: next_spelling,
                                                message: format!(
                                                    "unrecognized clustered flag in '{}'",
                                                    tokens[start]
                                                ),
                                            });
                                        }
                                    }
                                }
                                return Err(ParseError::ExplicitArgumentNotAllowed {
                                    option: spelling,
                                    value: explicit,
                                });
                            }
                            if def.arity.accepts_single() {
                                invocations.push((opt, vec![explicit], spelling));
                                stop = start + 1;
                                break;
                            }
                            return Err(ParseError::ExplicitArgumentNotAllowed {
                                option: spelling,
                                value: explicit,
                            });
                        }
                        None => {
                            let count = match_arity(def.arity, &pattern[start + 1..])
                                .ok_or_else(|| ParseError::ArityMismatch {
                                    option: spelling.clone(),
                                    message: arity_demand(def.arity),
                                })?;
                            // A separator inside the run is consumed
                            // but never a value.
                            let values: Vec<String> = (start + 1..start + 1 + count)
                                .filter(|&i| !matches!(pattern[i], Symbol::Sep))
                                .map(|i| tokens[i].clone())
                                .collect();
                            invocations.push((opt, values, spelling));
                            stop = start + 1 + count;
                            break;
                        }
                    }
                }
            }
        }

        for (opt, values, spelling) in invocations {
            let def = &self.options[opt];
            st.seen.insert(opt);
            tracing::trace!(option = %spelling, values = ?values, "matched option");
            self.take_action(st, Some(opt), def.spec(&spelling), values, input)?;
            if st.seen_non_default.contains(&opt) {
                self.check_conflicts(st, opt, &spelling)?;
            }
        }
        Ok(stop)
    }

    /// Run one matched definition's action: stdin claim, value
    /// conversion and arity shaping, then the namespace mutation.
    fn take_action(
        &self,
        st: &mut ParseState,
        opt: Option<usize>,
        spec: SpecView<'_>,
        mut values: Vec<String>,
        input: &mut dyn InputSource,
    ) -> Result<(), ParseError> {
        let mut claimed = false;
        if spec.action.wants_stdin()
            && values.len() == 1
            && values[0] == "-"
            && !input.is_terminal()
        {
            if let Some(claim) = &st.stdin_claim {
                return Err(ParseError::StdinAlreadyClaimed {
                    option: spec.display.clone(),
                    claimed_by: claim.option.clone(),
                });
            }
            st.stdin_claim = Some(StdinClaim {
                option: spec.display.clone(),
            });
            values = input
                .claim_lines()
                .map_err(|e| ParseError::Stdin(e.to_string()))?;
            claimed = true;
            tracing::debug!(argument = %spec.display, "claimed standard input");
        }

        let value = if claimed {
            // Stdin supplies a line-per-value list regardless of the
            // declared arity.
            Value::List(
                values
                    .iter()
                    .map(|raw| self.convert_one(spec.converter, &spec.display, raw))
                    .collect::<Result<Vec<_>, _>>()?,
            )
        } else {
            self.produce_value(&spec, &values)?
        };

        // A pure-default invocation does not count as "present" for
        // exclusion-group purposes.
        if let Some(idx) = opt {
            if Some(&value) != self.options[idx].default.as_ref() {
                st.seen_non_default.insert(idx);
            }
        }

        match spec.action.inner() {
            Action::Append => st.namespace.append(spec.dest, value),
            _ => st.namespace.insert(spec.dest, value),
        }
        Ok(())
    }

    fn check_conflicts(
        &self,
        st: &ParseState,
        opt: usize,
        spelling: &str,
    ) -> Result<(), ParseError> {
        for group in self.groups.iter().filter(|g| g.members.contains(&opt)) {
            for &other in &group.members {
                if other != opt && st.seen_non_default.contains(&other) {
                    return Err(ParseError::MutuallyExclusiveConflict {
                        option: spelling.to_string(),
                        other: self.options[other].display_name(),
                    });
                }
            }
        }
        Ok(())
    }

    fn produce_value(
        &self,
        spec: &SpecView<'_>,
        values: &[String],
    ) -> Result<Value, ParseError> {
        match spec.arity {
            Arity::None => Ok(match spec.action.inner() {
                Action::StoreFalse => Value::Bool(false),
                Action::StoreConst(v) => v.clone(),
                _ => Value::Bool(true),
            }),
            Arity::Optional if values.is_empty() => Ok(spec
                .const_value
                .cloned()
                .expect("optional arity requires a const value")),
            Arity::Exact(1) | Arity::Optional => {
                self.convert_one(spec.converter, &spec.display, &values[0])
            }
            _ => Ok(Value::List(
                values
                    .iter()
                    .map(|raw| self.convert_one(spec.converter, &spec.display, raw))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
        }
    }
}

fn is_single_dash_short(spelling: &str) -> bool {
    spelling.len() == 2 && spelling.starts_with('-') && !spelling.starts_with("--")
}

fn arity_demand(arity: Arity) -> String {
    match arity {
        Arity::Exact(n) => format!("expected {n} argument(s)"),
        Arity::OneOrMore => "expected at least one argument".to_string(),
        _ => "expected no arguments here".to_string(),
    }
}
