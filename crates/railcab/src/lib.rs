use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

mod atomic_io;
pub mod config;
pub mod controls;
pub mod host;
pub mod input;
pub mod interaction;
pub mod session;
pub mod sim;

pub use config::{
    load_options, load_options_or_default, parse_options, save_options, GameMode, Options,
    OptionsError, OPTIONS_FILE_NAME,
};
pub use controls::{
    load_with_defaults, BindingDiagnostic, BindingsError, Command, CommandKind, CommandRegistry,
    Control, ControlSet, DiagnosticSeverity, InterfaceStrings, LoadedBindings,
};
pub use host::{run_app, HostError, LoopConfig, FPS_ENV_VAR};
pub use input::{InputEvent, JoystickSource, NoJoysticks};
pub use interaction::{
    CabEvent, CabSpecs, CameraRestriction, InteractionMode, QuitRequest, RegisterError,
};
pub use session::{FrameOutcome, FrameView, Frontend, Session, SessionSetup};
pub use sim::{MetricsHandle, Simulation, SimulationMetrics, Station};

pub const ROOT_ENV_VAR: &str = "RAILCAB_ROOT";
pub const DEFAULT_CONTROLS_FILE_NAME: &str = "default.controls";
pub const USER_CONTROLS_FILE_NAME: &str = "controls.cfg";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub data_dir: PathBuf,
    pub settings_dir: PathBuf,
}

impl AppPaths {
    pub fn options_file(&self) -> PathBuf {
        self.settings_dir.join(OPTIONS_FILE_NAME)
    }

    pub fn user_controls_file(&self) -> PathBuf {
        self.settings_dir.join(USER_CONTROLS_FILE_NAME)
    }

    pub fn default_controls_file(&self) -> PathBuf {
        self.data_dir.join(DEFAULT_CONTROLS_FILE_NAME)
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("failed to create settings directory at {path}: {source}")]
    CreateSettingsDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("RAILCAB_ROOT does not point at a railcab root: {path}")]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "no railcab root (Cargo.toml plus crates/ or data/) above {start_dir}; set {env_var} \
to the checkout directory"
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    app_paths_under(root)
}

fn app_paths_under(root: PathBuf) -> Result<AppPaths, StartupError> {
    let data_dir = root.join("data");
    let settings_dir = root.join("settings");

    fs::create_dir_all(&settings_dir).map_err(|source| StartupError::CreateSettingsDir {
        path: settings_dir.clone(),
        source,
    })?;

    Ok(AppPaths {
        root,
        data_dir,
        settings_dir,
    })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var_os(ROOT_ENV_VAR) {
        Some(value) => root_from_env(PathBuf::from(value)),
        None => root_above_exe(),
    }
}

fn root_from_env(raw: PathBuf) -> Result<PathBuf, StartupError> {
    let root = normalize_path(&raw);
    if !is_repo_marker(&root) {
        return Err(StartupError::InvalidEnvRoot { path: root });
    }
    Ok(root)
}

fn root_above_exe() -> Result<PathBuf, StartupError> {
    let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
    let Some(exe_dir) = exe.parent() else {
        return Err(StartupError::ExeHasNoParent(exe));
    };
    exe_dir
        .ancestors()
        .find(|candidate| is_repo_marker(candidate))
        .map(normalize_path)
        .ok_or_else(|| StartupError::RootNotFound {
            start_dir: normalize_path(exe_dir),
            env_var: ROOT_ENV_VAR,
        })
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_data = path.join("data").is_dir();

    cargo_toml && (has_crates || has_data)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn repo_marker_requires_cargo_toml() {
        let cwd = env::current_dir().expect("cwd");
        assert!(!is_repo_marker(&cwd.join("definitely_not_a_marker")));
    }

    #[test]
    fn repo_marker_accepts_data_dir() {
        let temp = TempDir::new().expect("temp");
        fs::write(temp.path().join("Cargo.toml"), "[workspace]\n").expect("write");
        assert!(!is_repo_marker(temp.path()));
        fs::create_dir(temp.path().join("data")).expect("mkdir");
        assert!(is_repo_marker(temp.path()));
    }

    #[test]
    fn app_paths_create_settings_dir() {
        let temp = TempDir::new().expect("temp");
        let paths = app_paths_under(temp.path().to_path_buf()).expect("paths");
        assert!(paths.settings_dir.is_dir());
        assert_eq!(paths.options_file(), temp.path().join("settings").join("options.json"));
        assert_eq!(
            paths.default_controls_file(),
            temp.path().join("data").join("default.controls")
        );
    }
}
