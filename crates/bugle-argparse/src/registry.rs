//! The static registry parsing runs against: option and positional
//! definitions, exclusion groups, and the converter table.
//!
//! Registration is a build-time concern, so malformed definitions
//! (bad spellings, duplicate spellings, unknown converter keys) panic
//! rather than surfacing as parse errors.

use std::collections::HashMap;

use crate::convert::{BUILTIN_CONVERTERS, Convert};
use crate::namespace::{Namespace, Value};

/// How many values an option or positional consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// A bare flag; never consumes a value.
    None,
    Exact(usize),
    /// Zero or one value; a bare invocation assigns the const value.
    Optional,
    ZeroOrMore,
    OneOrMore,
}

impl Arity {
    pub(crate) fn min_count(self) -> usize {
        match self {
            Arity::None | Arity::Optional | Arity::ZeroOrMore => 0,
            Arity::Exact(n) => n,
            Arity::OneOrMore => 1,
        }
    }

    /// Whether an inline `=value` satisfies this arity.
    pub(crate) fn accepts_single(self) -> bool {
        matches!(
            self,
            Arity::Exact(1) | Arity::Optional | Arity::ZeroOrMore | Arity::OneOrMore
        )
    }
}

/// What a successful match does to the namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Assign the produced value; a repeat invocation overwrites.
    Store,
    StoreConst(Value),
    StoreTrue,
    StoreFalse,
    /// Extend a list across repeated invocations.
    Append,
    /// Like the inner action, but a sole `-` value claims the
    /// process's standard input when it is not a terminal.
    StdinOr(Box<Action>),
}

impl Action {
    pub(crate) fn wants_stdin(&self) -> bool {
        matches!(self, Action::StdinOr(_))
    }

    pub(crate) fn inner(&self) -> &Action {
        match self {
            Action::StdinOr(inner) => inner,
            other => other,
        }
    }
}

/// Handle returned by [`Parser::add_option`], used to build groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionId(pub(crate) usize);

#[derive(Debug, Clone)]
pub struct OptionDef {
    pub(crate) spellings: Vec<String>,
    pub(crate) dest: String,
    pub(crate) arity: Arity,
    pub(crate) action: Action,
    pub(crate) default: Option<Value>,
    pub(crate) const_value: Option<Value>,
    pub(crate) required: bool,
    pub(crate) converter: Option<String>,
}

impl OptionDef {
    fn base<'a>(
        spellings: impl IntoIterator<Item = &'a str>,
        dest: &str,
        arity: Arity,
        action: Action,
    ) -> Self {
        Self {
            spellings: spellings.into_iter().map(str::to_string).collect(),
            dest: dest.to_string(),
            arity,
            action,
            default: None,
            const_value: None,
            required: false,
            converter: None,
        }
    }

    /// A boolean flag; defaults to `false`, stores `true` when seen.
    pub fn flag<'a>(spellings: impl IntoIterator<Item = &'a str>, dest: &str) -> Self {
        Self::base(spellings, dest, Arity::None, Action::StoreTrue)
            .default(Value::Bool(false))
    }

    /// The inverse flag; defaults to `true`, stores `false` when seen.
    pub fn flag_off<'a>(spellings: impl IntoIterator<Item = &'a str>, dest: &str) -> Self {
        Self::base(spellings, dest, Arity::None, Action::StoreFalse)
            .default(Value::Bool(true))
    }

    /// An option taking exactly one value.
    pub fn value<'a>(spellings: impl IntoIterator<Item = &'a str>, dest: &str) -> Self {
        Self::base(spellings, dest, Arity::Exact(1), Action::Store)
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Value assigned by a bare invocation under [`Arity::Optional`].
    pub fn const_value(mut self, value: Value) -> Self {
        self.const_value = Some(value);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Key of a converter registered on the parser.
    pub fn converter(mut self, key: &str) -> Self {
        self.converter = Some(key.to_string());
        self
    }

    /// Let a sole `-` value redirect and consume standard input.
    pub fn stdin(mut self) -> Self {
        let inner = std::mem::replace(&mut self.action, Action::Store);
        self.action = Action::StdinOr(Box::new(inner));
        self
    }

    /// Name used in error messages, e.g. `-B/--browser`.
    pub(crate) fn display_name(&self) -> String {
        self.spellings.join("/")
    }

    /// Spelling used when re-serializing a namespace; longs win.
    pub(crate) fn canonical_spelling(&self) -> &str {
        self.spellings
            .iter()
            .find(|s| s.starts_with("--"))
            .unwrap_or(&self.spellings[0])
    }
}

#[derive(Debug, Clone)]
pub struct PositionalDef {
    pub(crate) dest: String,
    pub(crate) arity: Arity,
    pub(crate) action: Action,
    pub(crate) converter: Option<String>,
}

impl PositionalDef {
    pub fn new(dest: &str, arity: Arity) -> Self {
        Self {
            dest: dest.to_string(),
            arity,
            action: Action::Store,
            converter: None,
        }
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    pub fn converter(mut self, key: &str) -> Self {
        self.converter = Some(key.to_string());
        self
    }

    pub fn stdin(mut self) -> Self {
        let inner = std::mem::replace(&mut self.action, Action::Store);
        self.action = Action::StdinOr(Box::new(inner));
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ExclusionGroup {
    pub(crate) members: Vec<usize>,
    pub(crate) required: bool,
}

/// A fully declared argument registry, ready to parse token streams.
#[derive(Clone)]
pub struct Parser {
    pub(crate) options: Vec<OptionDef>,
    pub(crate) positionals: Vec<PositionalDef>,
    pub(crate) groups: Vec<ExclusionGroup>,
    pub(crate) spellings: HashMap<String, usize>,
    pub(crate) converters: HashMap<String, Convert>,
    pub(crate) has_negative_number_options: bool,
    pub(crate) halt_at_first_positional: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        let converters = BUILTIN_CONVERTERS
            .iter()
            .map(|&(key, f)| (key.to_string(), f))
            .collect();
        Self {
            options: Vec::new(),
            positionals: Vec::new(),
            groups: Vec::new(),
            spellings: HashMap::new(),
            converters,
            has_negative_number_options: false,
            halt_at_first_positional: false,
        }
    }

    /// Register a converter callable under a string key.
    ///
    /// Must happen before any definition referring to the key.
    pub fn register_converter(&mut self, key: &str, f: Convert) -> &mut Self {
        self.converters.insert(key.to_string(), f);
        self
    }

    /// Stop consuming at the first positional token and route it and
    /// everything after it to `extras`.
    ///
    /// Used by two-phase dispatch: the top-level parser collects its
    /// own options, then hands the remainder to the subcommand parser
    /// named by the first extra.
    pub fn halt_at_first_positional(&mut self, halt: bool) -> &mut Self {
        self.halt_at_first_positional = halt;
        self
    }

    pub fn add_option(&mut self, def: OptionDef) -> OptionId {
        assert!(!def.dest.is_empty(), "option destination must not be empty");
        assert!(!def.spellings.is_empty(), "option needs at least one spelling");
        for spelling in &def.spellings {
            assert!(
                spelling.len() >= 2
                    && spelling.starts_with('-')
                    && spelling != "--"
                    && !spelling.contains(char::is_whitespace),
                "invalid option spelling {spelling:?}"
            );
        }
        if matches!(def.arity, Arity::Optional) {
            assert!(
                def.const_value.is_some(),
                "option {} with optional arity needs a const value",
                def.display_name()
            );
        }
        if matches!(def.arity, Arity::None) {
            assert!(
                matches!(
                    def.action.inner(),
                    Action::StoreTrue | Action::StoreFalse | Action::StoreConst(_)
                ),
                "flag option {} needs a store-const style action",
                def.display_name()
            );
        }
        if let Some(key) = &def.converter {
            assert!(
                self.converters.contains_key(key),
                "unknown converter key {key:?} for option {}",
                def.display_name()
            );
        }

        let idx = self.options.len();
        for spelling in &def.spellings {
            let prev = self.spellings.insert(spelling.clone(), idx);
            assert!(prev.is_none(), "conflicting option spelling {spelling:?}");
            if spelling[1..].starts_with(|c: char| c.is_ascii_digit()) {
                self.has_negative_number_options = true;
            }
        }
        self.options.push(def);
        OptionId(idx)
    }

    pub fn add_positional(&mut self, def: PositionalDef) {
        assert!(!def.dest.is_empty(), "positional destination must not be empty");
        assert!(
            !matches!(def.arity, Arity::None),
            "positional {} cannot have flag arity",
            def.dest
        );
        assert!(
            !matches!(def.arity, Arity::Optional),
            "positional {} cannot use optional-with-const arity",
            def.dest
        );
        if let Some(key) = &def.converter {
            assert!(
                self.converters.contains_key(key),
                "unknown converter key {key:?} for positional {}",
                def.dest
            );
        }
        self.positionals.push(def);
    }

    /// Declare a set of options of which at most one may be supplied
    /// with a non-default value; when `required`, exactly one must be.
    pub fn add_exclusion_group(
        &mut self,
        required: bool,
        members: impl IntoIterator<Item = OptionId>,
    ) {
        let members: Vec<usize> = members.into_iter().map(|id| id.0).collect();
        assert!(members.len() >= 2, "exclusion group needs at least two members");
        self.groups.push(ExclusionGroup { members, required });
    }

    pub(crate) fn convert_one(
        &self,
        converter: Option<&String>,
        target: &str,
        raw: &str,
    ) -> Result<Value, crate::ParseError> {
        match converter {
            None => Ok(Value::Str(raw.to_string())),
            Some(key) => {
                let f = self.converters[key.as_str()];
                f(raw).map_err(|message| crate::ParseError::InvalidValue {
                    target: target.to_string(),
                    value: raw.to_string(),
                    message,
                })
            }
        }
    }

    /// Re-serialize a finalized namespace into canonical flag form.
    ///
    /// Parsing the returned tokens again produces an equal namespace
    /// (extras excepted, of course, since they never made it in).
    pub fn canonical_args(&self, ns: &Namespace) -> Vec<String> {
        let mut out = Vec::new();
        for def in &self.options {
            let Some(value) = ns.get(&def.dest) else { continue };
            let spelling = def.canonical_spelling().to_string();
            match def.arity {
                Arity::None => out.push(spelling),
                Arity::Optional if Some(value) == def.const_value.as_ref() => {
                    out.push(spelling);
                }
                // An appended list came from repeated invocations, so
                // replay one invocation per element.
                _ if matches!(def.action.inner(), Action::Append) => match value {
                    Value::List(items) => {
                        for item in items {
                            out.push(spelling.clone());
                            out.push(render_scalar(item));
                        }
                    }
                    scalar => {
                        out.push(spelling);
                        out.push(render_scalar(scalar));
                    }
                },
                _ => {
                    out.push(spelling);
                    out.extend(render_values(def.arity, value));
                }
            }
        }
        let mut tail = Vec::new();
        for def in &self.positionals {
            if let Some(value) = ns.get(&def.dest) {
                tail.extend(render_values(def.arity, value));
            }
        }
        // Positional values that look like options must ride behind
        // the separator.
        if tail.iter().any(|t| t.starts_with('-') && t != "-") {
            out.push("--".to_string());
        }
        out.extend(tail);
        out
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::Str(s) => s.clone(),
        Value::Int(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::List(items) => items
            .iter()
            .map(render_scalar)
            .collect::<Vec<_>>()
            .join(","),
    }
}

fn render_values(arity: Arity, value: &Value) -> Vec<String> {
    match (arity, value) {
        // A converter fanned one token out into a list; fold it back.
        (Arity::Exact(1) | Arity::Optional, Value::List(items)) => vec![
            items
                .iter()
                .map(render_scalar)
                .collect::<Vec<_>>()
                .join(","),
        ],
        (_, Value::List(items)) => items.iter().map(render_scalar).collect(),
        (_, scalar) => vec![render_scalar(scalar)],
    }
}
