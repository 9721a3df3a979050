//! Streaming argument tokenization and dispatch for the bugle CLI.
//!
//! This crate is the one piece of real machinery under the bugle
//! bug-tracker client: everything around it (service backends, output
//! formatting) is ordinary glue. The engine classifies raw tokens,
//! interleaves positional and option consumption in stream order,
//! expands clustered short flags (`-xyz` == `-x -y -z`), enforces
//! mutually-exclusive groups only among options that were actually
//! supplied with non-default values, and collects unrecognized tokens
//! as `extras` instead of failing outright, so callers can re-dispatch
//! them (e.g. to a subcommand parser).
//!
//! The entry point is [`Parser::parse`], which takes the raw token
//! list plus an [`InputSource`] so the single-use stdin claim can be
//! tested without a real pipe.

mod classify;
mod engine;
mod resolve;

pub mod convert;
pub mod error;
pub mod namespace;
pub mod registry;
pub mod stdin;

pub use engine::ParseOutput;
pub use error::ParseError;
pub use namespace::{Namespace, Value};
pub use registry::{Action, Arity, OptionDef, OptionId, Parser, PositionalDef};
pub use stdin::{InputSource, PipedInput, ProcessInput, TerminalInput};
