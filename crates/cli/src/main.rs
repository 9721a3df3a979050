mod commands;

use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use bugle_argparse::{InputSource, ParseError, ProcessInput, Value};
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    init_tracing(&args);

    let mut input = ProcessInput::new();
    match run(&args, &mut input) {
        Ok(rendered) => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("bugle: {err:#}");
            ExitCode::from(failure_code(&err))
        }
    }
}

/// Two-phase dispatch: global options up to the subcommand name, then
/// the rest of the line against that subcommand's registry. Returns
/// the merged namespace rendered as pretty JSON.
fn run(args: &[String], input: &mut dyn InputSource) -> Result<String> {
    let first = commands::global_parser().parse(args, input)?;

    let mut rest = first.extras;
    if rest.is_empty() {
        return Err(anyhow!(
            "missing subcommand (expected one of: {})",
            commands::SUBCOMMANDS.join(", ")
        ));
    }
    let name = rest.remove(0);
    let sub = commands::subcommand_parser(&name).ok_or_else(|| {
        anyhow!(
            "unknown subcommand '{name}' (expected one of: {})",
            commands::SUBCOMMANDS.join(", ")
        )
    })?;

    let second = sub.parse(&rest, input)?;
    if !second.extras.is_empty() {
        tracing::warn!(extras = ?second.extras, subcommand = %name, "unrecognized arguments");
        return Err(anyhow!(
            "unrecognized arguments: {}",
            second.extras.join(" ")
        ));
    }

    let mut namespace = first.namespace;
    namespace.merge(second.namespace);
    namespace.insert("command", Value::Str(name));
    serde_json::to_string_pretty(&namespace).context("failed to render parsed arguments")
}

/// Conflicting arguments exit 1; every other failure is a usage
/// problem and exits 2.
fn failure_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ParseError>() {
        Some(parse) if parse.is_conflict() => 1,
        _ => 2,
    }
}

fn init_tracing(args: &[String]) {
    let quiet = args.iter().any(|a| a == "-q" || a == "--quiet");
    let default = if quiet { "error" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
