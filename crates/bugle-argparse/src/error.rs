//! Parse failure taxonomy.
//!
//! Unknown options are deliberately absent here: they are non-fatal
//! and flow into the `extras` list of a successful parse. Everything
//! below aborts the parse immediately; the caller gets exactly one
//! error and no partial namespace.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A `--flag=value` (or clustered short) carried a value the
    /// option's arity cannot use.
    #[error("option {option}: ignored explicit argument '{value}'")]
    ExplicitArgumentNotAllowed { option: String, value: String },

    /// The option could not collect the values its arity demands.
    #[error("option {option}: {message}")]
    ArityMismatch { option: String, message: String },

    /// A long-option abbreviation matched more than one definition.
    #[error("ambiguous option {option}: could be {}", candidates.join(", "))]
    AmbiguousOption {
        option: String,
        candidates: Vec<String>,
    },

    /// Two members of an exclusion group were both supplied with
    /// non-default values.
    #[error("option {option}: not allowed with option {other}")]
    MutuallyExclusiveConflict { option: String, other: String },

    /// A `required` option was never seen.
    #[error("argument {name} is required")]
    RequiredMissing { name: String },

    /// No member of a `required` exclusion group was supplied.
    #[error("one of the arguments {} is required", options.join(" "))]
    RequiredGroupMissing { options: Vec<String> },

    /// A second option tried to claim the already-claimed stdin pipe.
    #[error(
        "option {option}: data from standard input already being used for argument {claimed_by}"
    )]
    StdinAlreadyClaimed { option: String, claimed_by: String },

    /// One or more positionals were left unsatisfied. Reported once
    /// for the whole parse, with no per-field detail.
    #[error("too few arguments")]
    TooFewArguments,

    /// A registered converter rejected a raw token.
    #[error("argument {target}: invalid value '{value}': {message}")]
    InvalidValue {
        target: String,
        value: String,
        message: String,
    },

    /// Reading the claimed stdin pipe failed.
    #[error("failed to read standard input: {0}")]
    Stdin(String),
}

impl ParseError {
    /// Conflict errors name two supplied arguments that cannot
    /// coexist; everything else is a usage error (print usage, exit
    /// non-zero).
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ParseError::MutuallyExclusiveConflict { .. } | ParseError::StdinAlreadyClaimed { .. }
        )
    }

    pub fn is_usage(&self) -> bool {
        !self.is_conflict()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_classification() {
        let conflict = ParseError::MutuallyExclusiveConflict {
            option: "--url".into(),
            other: "-B/--browser".into(),
        };
        assert!(conflict.is_conflict());
        assert!(!conflict.is_usage());
        assert!(ParseError::TooFewArguments.is_usage());
    }

    #[test]
    fn stdin_claim_error_names_both_arguments() {
        let err = ParseError::StdinAlreadyClaimed {
            option: "-b".into(),
            claimed_by: "-a".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("-b") && msg.contains("-a"), "unexpected: {msg}");
    }
}
