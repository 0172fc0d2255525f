mod binding;
mod command;
mod file;
mod keys;
mod strings;

pub use binding::{
    Control, ControlSet, DigitalState, InputBinding, InputMethod, JoystickComponent, KeyModifiers,
};
pub use command::{Command, CommandInfo, CommandKind, CommandRegistry};
pub use file::{
    bound_commands, describe_binding, load_bindings, load_with_defaults, merge_bindings,
    parse_bindings, render_bindings, save_bindings, BindingDiagnostic, BindingsError,
    DiagnosticSeverity, LoadedBindings,
};
pub use keys::{describe_key, find_key, find_key_by_name, KeyInfo, KEYS};
pub use strings::{HandleLabels, InterfaceStrings};
