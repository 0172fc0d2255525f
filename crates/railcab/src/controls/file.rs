use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::atomic_io::write_text_atomic;

use super::binding::{Control, ControlSet, InputBinding, JoystickComponent, KeyModifiers};
use super::command::{Command, CommandRegistry};
use super::keys::describe_key;
use super::strings::InterfaceStrings;

#[derive(Debug, Error)]
pub enum BindingsError {
    #[error("failed to read bindings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write bindings file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    /// The line was kept in a degraded form.
    Warning,
    /// A required value could not be resolved; a built-in default stands in.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingDiagnostic {
    /// 1-based line number.
    pub line: usize,
    pub severity: DiagnosticSeverity,
    pub message: String,
}

impl fmt::Display for BindingDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Error => "error",
        };
        write!(f, "line {}: {severity}: {}", self.line, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedBindings {
    pub controls: ControlSet,
    pub diagnostics: Vec<BindingDiagnostic>,
}

impl LoadedBindings {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity == DiagnosticSeverity::Error)
    }
}

pub fn parse_bindings(text: &str, registry: &CommandRegistry) -> LoadedBindings {
    let mut loaded = LoadedBindings::default();
    for (index, raw_line) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        let terms = line.split(',').map(str::trim).collect::<Vec<_>>();
        if terms.len() < 2 {
            loaded.diagnostics.push(BindingDiagnostic {
                line: line_number,
                severity: DiagnosticSeverity::Warning,
                message: format!("expected at least a command and an input method in '{line}'"),
            });
            continue;
        }

        let Some(command) = registry.find_by_name(terms[0]) else {
            loaded.diagnostics.push(BindingDiagnostic {
                line: line_number,
                severity: DiagnosticSeverity::Error,
                message: format!("unknown command '{}'; line kept as a placeholder", terms[0]),
            });
            loaded.controls.push(Control::unresolved(line));
            continue;
        };

        let binding = match parse_input_binding(&terms[1..]) {
            Ok(binding) => binding,
            Err(reason) => {
                loaded.diagnostics.push(BindingDiagnostic {
                    line: line_number,
                    severity: DiagnosticSeverity::Warning,
                    message: format!("{reason}; binding for {} disabled", terms[0]),
                });
                InputBinding::Invalid
            }
        };
        loaded.controls.push(Control::new(registry, command, binding));
    }
    loaded
}

fn parse_input_binding(terms: &[&str]) -> Result<InputBinding, String> {
    let method = terms[0].to_ascii_lowercase();
    match method.as_str() {
        "keyboard" => {
            if terms.len() != 3 {
                return Err(format!(
                    "keyboard binding needs 2 values, found {}",
                    terms.len() - 1
                ));
            }
            let key = parse_int::<i32>(terms[1], "key")?;
            let bits = parse_int::<u8>(terms[2], "modifier")?;
            let modifiers = KeyModifiers::from_bits(bits)
                .ok_or_else(|| format!("modifier bitmask {bits} has unknown bits"))?;
            Ok(InputBinding::Keyboard { key, modifiers })
        }
        "joystick" => {
            if terms.len() < 3 {
                return Err("joystick binding needs a device and a component".to_string());
            }
            let device = parse_int::<usize>(terms[1], "device")?;
            let component = terms[2].to_ascii_lowercase();
            let (component, expected) = match component.as_str() {
                "axis" => (JoystickComponent::Axis, 5),
                "hat" => (JoystickComponent::Hat, 5),
                "button" => (JoystickComponent::Button, 4),
                other => return Err(format!("unknown joystick component '{other}'")),
            };
            if terms.len() != expected {
                return Err(format!(
                    "joystick {} binding needs {} values, found {}",
                    component.file_token(),
                    expected - 1,
                    terms.len() - 1
                ));
            }
            let element = parse_int::<usize>(terms[3], "element")?;
            let direction = match component {
                JoystickComponent::Button => 0,
                JoystickComponent::Axis => {
                    let direction = parse_int::<i32>(terms[4], "direction")?;
                    if direction != -1 && direction != 1 {
                        return Err(format!("axis direction must be -1 or 1, found {direction}"));
                    }
                    direction
                }
                JoystickComponent::Hat => parse_int::<i32>(terms[4], "direction")?,
            };
            Ok(InputBinding::Joystick {
                device,
                component,
                element,
                direction,
            })
        }
        other => Err(format!("unknown input method '{other}'")),
    }
}

fn parse_int<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, String> {
    raw.parse::<T>()
        .map_err(|_| format!("invalid {what} value '{raw}'"))
}

pub fn load_bindings(path: &Path, registry: &CommandRegistry) -> Result<LoadedBindings, BindingsError> {
    let text = fs::read_to_string(path).map_err(|source| BindingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded = parse_bindings(&text, registry);
    for diagnostic in &loaded.diagnostics {
        warn!(
            path = %path.display(),
            line = diagnostic.line,
            severity = ?diagnostic.severity,
            message = diagnostic.message.as_str(),
            "binding_diagnostic"
        );
    }
    info!(
        path = %path.display(),
        controls = loaded.controls.len(),
        diagnostics = loaded.diagnostics.len(),
        "bindings_loaded"
    );
    Ok(loaded)
}

/// Appends every control of `additional` whose command has no binding in
/// `base`. Existing bindings are never replaced. Returns the number added.
pub fn merge_bindings(base: &mut ControlSet, additional: ControlSet) -> usize {
    let mut added = 0usize;
    for control in additional.into_vec() {
        let Some(command) = control.command else {
            continue;
        };
        if base.contains_command(command) {
            continue;
        }
        base.push(control);
        added += 1;
    }
    added
}

pub fn render_bindings(controls: &ControlSet, registry: &CommandRegistry) -> String {
    let mut out = String::new();
    out.push_str("; Current control configuration\n");
    out.push_str("; =============================\n");
    out.push_str("; This file was automatically generated. Please modify only if you know what you're doing.\n");
    out.push('\n');
    for control in controls.iter() {
        out.push_str(&render_control(control, registry));
        out.push('\n');
    }
    out
}

fn render_control(control: &Control, registry: &CommandRegistry) -> String {
    let Some(command) = control.command else {
        return control.placeholder.clone().unwrap_or_default();
    };
    let name = registry.info(command).name;
    match control.binding {
        InputBinding::Invalid => format!("{name}, invalid"),
        InputBinding::Keyboard { key, modifiers } => {
            format!("{name}, keyboard, {key}, {}", modifiers.bits())
        }
        InputBinding::Joystick {
            device,
            component: JoystickComponent::Button,
            element,
            ..
        } => format!("{name}, joystick, {device}, button, {element}"),
        InputBinding::Joystick {
            device,
            component,
            element,
            direction,
        } => format!(
            "{name}, joystick, {device}, {}, {element}, {direction}",
            component.file_token()
        ),
    }
}

pub fn save_bindings(
    path: &Path,
    controls: &ControlSet,
    registry: &CommandRegistry,
) -> Result<(), BindingsError> {
    write_text_atomic(path, &render_bindings(controls, registry)).map_err(|source| {
        BindingsError::Write {
            path: path.to_path_buf(),
            source,
        }
    })?;
    info!(path = %path.display(), controls = controls.len(), "bindings_saved");
    Ok(())
}

/// Loads the user file and fills in commands it lacks from the defaults file.
/// Without a user file the defaults are loaded and written out as the user
/// file.
pub fn load_with_defaults(
    user_path: &Path,
    defaults_path: &Path,
    registry: &CommandRegistry,
) -> Result<LoadedBindings, BindingsError> {
    if !user_path.is_file() {
        let defaults = load_bindings(defaults_path, registry)?;
        if let Err(error) = save_bindings(user_path, &defaults.controls, registry) {
            warn!(error = %error, "bindings_save_failed");
        }
        return Ok(defaults);
    }

    let mut loaded = load_bindings(user_path, registry)?;
    if defaults_path.is_file() {
        let defaults = load_bindings(defaults_path, registry)?;
        let added = merge_bindings(&mut loaded.controls, defaults.controls);
        if added > 0 {
            info!(added, "bindings_merged_from_defaults");
        }
    }
    Ok(loaded)
}

/// Human-readable description of where a control is bound.
pub fn describe_binding(control: &Control, strings: &InterfaceStrings) -> String {
    match control.binding {
        InputBinding::Invalid => "not bound".to_string(),
        InputBinding::Keyboard { key, modifiers } => {
            let mut text = String::new();
            if modifiers.contains(KeyModifiers::CTRL) {
                text.push_str("Ctrl+");
            }
            if modifiers.contains(KeyModifiers::SHIFT) {
                text.push_str("Shift+");
            }
            if modifiers.contains(KeyModifiers::ALT) {
                text.push_str("Alt+");
            }
            text.push_str(&describe_key(key, strings));
            text
        }
        InputBinding::Joystick {
            device,
            component,
            element,
            direction,
        } => match component {
            JoystickComponent::Axis => {
                let sign = if direction < 0 { '-' } else { '+' };
                format!("joystick {device} axis {element} {sign}")
            }
            JoystickComponent::Hat => format!("joystick {device} hat {element} position {direction}"),
            JoystickComponent::Button => format!("joystick {device} button {element}"),
        },
    }
}

/// Commands bound in `controls`, in first-binding order.
pub fn bound_commands(controls: &ControlSet) -> Vec<Command> {
    let mut commands = Vec::new();
    for command in controls.iter().filter_map(|control| control.command) {
        if !commands.contains(&command) {
            commands.push(command);
        }
    }
    commands
}
