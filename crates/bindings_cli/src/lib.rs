use std::fs;
use std::io::Write;
use std::path::Path;

use railcab::controls::{
    bound_commands, describe_binding, merge_bindings, parse_bindings, render_bindings, save_bindings,
    CommandKind as BindingKind, CommandRegistry, InterfaceStrings, LoadedBindings,
};

#[derive(Debug, Clone, Default)]
pub struct CommonOptions {
    /// Language file used for command and key descriptions.
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Check {
        path: String,
    },
    List {
        path: String,
    },
    Merge {
        base: String,
        extra: String,
        out: Option<String>,
    },
    Normalize {
        path: String,
        out: Option<String>,
    },
}

pub fn run<W: Write>(kind: CommandKind, opts: CommonOptions, stdout: &mut W) -> Result<(), String> {
    let strings = match &opts.language {
        Some(path) => InterfaceStrings::load(Path::new(path))
            .map_err(|error| format!("failed to read language file '{path}': {error}"))?,
        None => InterfaceStrings::default(),
    };
    let registry = CommandRegistry::with_descriptions(&strings);

    match kind {
        CommandKind::Check { path } => {
            let loaded = read_bindings(&path, &registry)?;
            for diagnostic in &loaded.diagnostics {
                emit(stdout, &format!("{path}: {diagnostic}"))?;
            }
            let errors = loaded
                .diagnostics
                .iter()
                .filter(|diagnostic| diagnostic.severity == railcab::DiagnosticSeverity::Error)
                .count();
            emit(
                stdout,
                &format!(
                    "{path}: {} controls for {} commands, {} diagnostics, {errors} errors",
                    loaded.controls.len(),
                    bound_commands(&loaded.controls).len(),
                    loaded.diagnostics.len()
                ),
            )?;
            if loaded.has_errors() {
                return Err(format!("{path} has {errors} binding error(s)"));
            }
            Ok(())
        }
        CommandKind::List { path } => {
            let loaded = read_bindings(&path, &registry)?;
            emit_diagnostics(stdout, &path, &loaded)?;
            for line in list_lines(&loaded, &registry, &strings) {
                emit(stdout, &line)?;
            }
            Ok(())
        }
        CommandKind::Merge { base, extra, out } => {
            let mut merged = read_bindings(&base, &registry)?;
            let additional = read_bindings(&extra, &registry)?;
            emit_diagnostics(stdout, &base, &merged)?;
            emit_diagnostics(stdout, &extra, &additional)?;
            let added = merge_bindings(&mut merged.controls, additional.controls);
            write_result(stdout, &merged, &registry, out.as_deref())?;
            if let Some(out) = out {
                emit(stdout, &format!("added {added} controls from {extra}, wrote {out}"))?;
            }
            Ok(())
        }
        CommandKind::Normalize { path, out } => {
            let loaded = read_bindings(&path, &registry)?;
            emit_diagnostics(stdout, &path, &loaded)?;
            write_result(stdout, &loaded, &registry, out.as_deref())
        }
    }
}

/// One line per control: command name, kind and where it is bound.
pub fn list_lines(
    loaded: &LoadedBindings,
    registry: &CommandRegistry,
    strings: &InterfaceStrings,
) -> Vec<String> {
    loaded
        .controls
        .iter()
        .map(|control| match control.command {
            Some(command) => {
                let info = registry.info(command);
                format!(
                    "{:<24} {:<10} {}",
                    info.name,
                    kind_label(info.kind),
                    describe_binding(control, strings)
                )
            }
            None => format!(
                "{:<24} {:<10} {}",
                "(unresolved)",
                "-",
                control.placeholder.as_deref().unwrap_or_default()
            ),
        })
        .collect()
}

fn kind_label(kind: BindingKind) -> &'static str {
    match kind {
        BindingKind::Digital => "digital",
        BindingKind::AnalogHalf => "half-axis",
        BindingKind::AnalogFull => "full-axis",
    }
}

fn read_bindings(path: &str, registry: &CommandRegistry) -> Result<LoadedBindings, String> {
    let text = fs::read_to_string(path)
        .map_err(|error| format!("failed to read bindings file '{path}': {error}"))?;
    Ok(parse_bindings(&text, registry))
}

/// Diagnostics go out as `;` comments so rendered output stays loadable.
fn emit_diagnostics<W: Write>(
    stdout: &mut W,
    path: &str,
    loaded: &LoadedBindings,
) -> Result<(), String> {
    for diagnostic in &loaded.diagnostics {
        emit(stdout, &format!("; {path}: {diagnostic}"))?;
    }
    Ok(())
}

fn write_result<W: Write>(
    stdout: &mut W,
    loaded: &LoadedBindings,
    registry: &CommandRegistry,
    out: Option<&str>,
) -> Result<(), String> {
    match out {
        Some(out) => save_bindings(Path::new(out), &loaded.controls, registry)
            .map_err(|error| error.to_string()),
        None => stdout
            .write_all(render_bindings(&loaded.controls, registry).as_bytes())
            .map_err(|error| format!("failed to write output: {error}")),
    }
}

fn emit<W: Write>(stdout: &mut W, line: &str) -> Result<(), String> {
    writeln!(stdout, "{line}").map_err(|error| format!("failed to write output: {error}"))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const BASE: &str = "\
POWER_INCREASE, keyboard, 90, 0
BRAKE_FULLAXIS, joystick, 0, axis, 1, 1
";

    const EXTRA: &str = "\
POWER_INCREASE, keyboard, 81, 0
MISC_PAUSE, keyboard, 80, 0
";

    fn write(temp: &TempDir, name: &str, text: &str) -> String {
        let path = temp.path().join(name);
        fs::write(&path, text).expect("write");
        path.to_string_lossy().into_owned()
    }

    fn run_to_string(kind: CommandKind) -> (Result<(), String>, String) {
        let mut out = Vec::new();
        let result = run(kind, CommonOptions::default(), &mut out);
        (result, String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn check_passes_clean_file() {
        let temp = TempDir::new().expect("temp");
        let path = write(&temp, "controls.cfg", BASE);
        let (result, output) = run_to_string(CommandKind::Check { path });
        assert!(result.is_ok());
        assert!(output.contains("2 controls for 2 commands, 0 diagnostics, 0 errors"));
    }

    #[test]
    fn check_counts_each_command_once() {
        let temp = TempDir::new().expect("temp");
        let path = write(
            &temp,
            "controls.cfg",
            "POWER_INCREASE, keyboard, 90, 0\nPOWER_INCREASE, keyboard, 81, 0\n",
        );
        let (result, output) = run_to_string(CommandKind::Check { path });
        assert!(result.is_ok());
        assert!(output.contains("2 controls for 1 commands"));
    }

    #[test]
    fn check_fails_on_unknown_command_but_not_on_warnings() {
        let temp = TempDir::new().expect("temp");
        let warn_only = write(&temp, "warn.cfg", "POWER_INCREASE, keyboard, x, 0\n");
        let (result, output) = run_to_string(CommandKind::Check { path: warn_only });
        assert!(result.is_ok());
        assert!(output.contains("line 1: warning"));

        let broken = write(&temp, "broken.cfg", "TELEPORT, keyboard, 65, 0\n");
        let (result, output) = run_to_string(CommandKind::Check { path: broken });
        assert!(result.is_err());
        assert!(output.contains("line 1: error"));
    }

    #[test]
    fn list_shows_kind_and_binding() {
        let temp = TempDir::new().expect("temp");
        let path = write(&temp, "controls.cfg", BASE);
        let (result, output) = run_to_string(CommandKind::List { path });
        assert!(result.is_ok());
        let lines = output.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("POWER_INCREASE"));
        assert!(lines[0].contains("digital"));
        assert!(lines[1].contains("full-axis"));
    }

    #[test]
    fn merge_keeps_base_bindings_and_adds_missing_commands() {
        let temp = TempDir::new().expect("temp");
        let base = write(&temp, "base.cfg", BASE);
        let extra = write(&temp, "extra.cfg", EXTRA);
        let out = temp.path().join("merged.cfg").to_string_lossy().into_owned();

        let (result, output) = run_to_string(CommandKind::Merge {
            base,
            extra,
            out: Some(out.clone()),
        });
        assert!(result.is_ok());
        assert!(output.contains("added 1 controls"));

        let merged = fs::read_to_string(&out).expect("merged");
        assert!(merged.contains("POWER_INCREASE, keyboard, 90, 0"));
        assert!(!merged.contains("POWER_INCREASE, keyboard, 81, 0"));
        assert!(merged.contains("MISC_PAUSE, keyboard, 80, 0"));
    }

    #[test]
    fn normalize_renders_the_canonical_form() {
        let temp = TempDir::new().expect("temp");
        let path = write(&temp, "messy.cfg", "  power_increase ,KEYBOARD, 90,0  \n");
        let (result, output) = run_to_string(CommandKind::Normalize { path, out: None });
        assert!(result.is_ok());
        assert!(output.starts_with(';'));
        assert!(output.contains("POWER_INCREASE, keyboard, 90, 0"));
    }

    #[test]
    fn missing_file_is_reported() {
        let (result, _) = run_to_string(CommandKind::List {
            path: "/definitely/not/here.cfg".to_string(),
        });
        assert!(result
            .expect_err("missing file")
            .contains("failed to read bindings file"));
    }
}
