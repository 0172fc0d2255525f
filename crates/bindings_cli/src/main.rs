use std::env;
use std::io;
use std::process::ExitCode;

use bindings_cli::{run, CommandKind, CommonOptions};

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

fn run_cli() -> Result<(), String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        return Err(usage_text());
    }
    if args[0] == "-h" || args[0] == "--help" {
        print_usage();
        return Ok(());
    }

    let mut options = CommonOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--language" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --language".to_string())?;
                options.language = Some(value.clone());
                index += 2;
            }
            _ => break,
        }
    }

    let command = args
        .get(index)
        .ok_or_else(|| "missing subcommand".to_string())?
        .as_str();
    let command_args = &args[(index + 1)..];

    let kind = match command {
        "check" => CommandKind::Check {
            path: single_path("check", command_args)?,
        },
        "list" => CommandKind::List {
            path: single_path("list", command_args)?,
        },
        "merge" => {
            if command_args.len() < 2 {
                return Err("merge requires a base file and an extra file".to_string());
            }
            CommandKind::Merge {
                base: command_args[0].clone(),
                extra: command_args[1].clone(),
                out: parse_out("merge", &command_args[2..])?,
            }
        }
        "normalize" => {
            if command_args.is_empty() {
                return Err("normalize requires a file path".to_string());
            }
            CommandKind::Normalize {
                path: command_args[0].clone(),
                out: parse_out("normalize", &command_args[1..])?,
            }
        }
        other => return Err(format!("unknown subcommand '{other}'")),
    };

    run(kind, options, &mut io::stdout())
}

fn single_path(command: &str, args: &[String]) -> Result<String, String> {
    match args {
        [path] => Ok(path.clone()),
        [] => Err(format!("{command} requires a file path")),
        _ => Err(format!("{command} takes exactly one file path")),
    }
}

fn parse_out(command: &str, args: &[String]) -> Result<Option<String>, String> {
    match args {
        [] => Ok(None),
        [flag, path] if flag == "--out" => Ok(Some(path.clone())),
        [flag] if flag == "--out" => Err("missing value for --out".to_string()),
        [other, ..] => Err(format!(
            "unknown {command} argument '{other}' (expected --out <file>)"
        )),
    }
}

fn print_usage() {
    println!("{}", usage_text());
}

fn usage_text() -> String {
    [
        "bindings_cli - check and edit control binding files",
        "",
        "Usage:",
        "  bindings_cli [--language <file>] check <file>",
        "  bindings_cli [--language <file>] list <file>",
        "  bindings_cli [--language <file>] merge <base> <extra> [--out <file>]",
        "  bindings_cli [--language <file>] normalize <file> [--out <file>]",
        "",
        "check exits non-zero when a line names an unknown command.",
        "merge keeps every binding of <base> and adds commands only <extra> binds.",
    ]
    .join("\n")
}
