//! Static argument registries for the global options and each
//! subcommand.
//!
//! Dispatch is two-phase: the global parser halts at the first
//! positional token, and the remainder of the command line is handed
//! to the registry named by that token.

use bugle_argparse::{Arity, OptionDef, Parser, PositionalDef, Value};

pub const SUBCOMMANDS: &[&str] = &[
    "search",
    "get",
    "comments",
    "changes",
    "attachments",
    "attach",
    "modify",
    "create",
];

/// Sentinel comment value meaning "spawn an editor later".
pub const EDITOR_SENTINEL: &str = "__BUGLE_EDITOR__";

/// Top-level options shared by every subcommand. Halts at the
/// subcommand name so its arguments reach the second-phase parser
/// untouched.
pub fn global_parser() -> Parser {
    let mut p = Parser::new();
    p.add_option(OptionDef::value(["-c", "--connection"], "connection"));
    p.add_option(OptionDef::value(["-s", "--service"], "service"));
    p.add_option(OptionDef::flag(["-q", "--quiet"], "quiet"));
    p.add_option(OptionDef::value(["--config-file"], "config_file"));
    p.halt_at_first_positional(true);
    p
}

pub fn subcommand_parser(name: &str) -> Option<Parser> {
    let mut p = Parser::new();
    match name {
        "search" => {
            receive_opts(&mut p);
            p.add_option(OptionDef::value(["--limit"], "limit").converter("int"));
            p.add_option(OptionDef::value(["--offset"], "offset").converter("int"));
            p.add_positional(
                PositionalDef::new("terms", Arity::ZeroOrMore).stdin(),
            );
        }
        "get" => {
            receive_opts(&mut p);
            let browser = p.add_option(OptionDef::flag(["-B", "--browser"], "browser"));
            let url = p.add_option(OptionDef::flag(["-U", "--url"], "output_url"));
            p.add_exclusion_group(false, [browser, url]);
            p.add_option(OptionDef::flag_off(
                ["-A", "--no-attachments"],
                "get_attachments",
            ));
            p.add_option(OptionDef::flag_off(["-C", "--no-comments"], "get_comments"));
            ids_positional(&mut p);
        }
        "comments" => {
            receive_opts(&mut p);
            p.add_option(
                OptionDef::value(["-n", "--number"], "comment_num")
                    .converter("id_list")
                    .stdin(),
            );
            p.add_option(
                OptionDef::value(["-r", "--creator"], "creator")
                    .converter("string_list")
                    .stdin(),
            );
            ids_positional(&mut p);
        }
        "changes" => {
            receive_opts(&mut p);
            p.add_option(
                OptionDef::value(["-n", "--number"], "change_num")
                    .converter("id_list")
                    .stdin(),
            );
            p.add_option(
                OptionDef::value(["-r", "--creator"], "creator")
                    .converter("string_list")
                    .stdin(),
            );
            ids_positional(&mut p);
        }
        "attachments" => {
            let browser = p.add_option(OptionDef::flag(["-B", "--browser"], "browser"));
            let url = p.add_option(OptionDef::flag(["-U", "--url"], "output_url"));
            let view = p.add_option(OptionDef::flag(["-V", "--view"], "view_attachment"));
            p.add_exclusion_group(false, [browser, url, view]);
            p.add_option(OptionDef::value(["--save-to"], "save_to"));
            ids_positional(&mut p);
        }
        "attach" => {
            send_opts(&mut p);
            p.add_option(OptionDef::value(["-d", "--description"], "comment"));
            p.add_option(OptionDef::value(["-t", "--title"], "summary"));
        }
        "modify" => {
            send_opts(&mut p);
            p.add_option(
                OptionDef::value(["-c", "--comment"], "comment")
                    .arity(Arity::Optional)
                    .const_value(Value::Str(EDITOR_SENTINEL.to_string()))
                    .stdin(),
            );
            ids_positional(&mut p);
        }
        "create" => {
            send_opts(&mut p);
            p.add_option(OptionDef::value(["-F", "--description-from"], "description_from"));
            p.add_option(OptionDef::value(["--append-command"], "append_command"));
            p.add_option(OptionDef::flag(["--batch"], "batch"));
        }
        _ => return None,
    }
    Some(p)
}

fn request_opts(p: &mut Parser) {
    p.add_option(OptionDef::flag(["--dry-run"], "dry_run"));
}

fn receive_opts(p: &mut Parser) {
    request_opts(p);
    p.add_option(OptionDef::value(["-f", "--fields"], "fields").converter("string_list"));
}

fn send_opts(p: &mut Parser) {
    request_opts(p);
    p.add_option(OptionDef::flag(["--ask"], "ask"));
}

fn ids_positional(p: &mut Parser) {
    p.add_positional(
        PositionalDef::new("ids", Arity::OneOrMore)
            .converter("ids")
            .stdin(),
    );
}
