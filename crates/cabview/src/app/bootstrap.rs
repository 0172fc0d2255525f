use std::env;
use std::path::{Path, PathBuf};

use railcab::{
    load_options_or_default, load_with_defaults, resolve_app_paths, AppPaths, BindingsError,
    CommandRegistry, InterfaceStrings, LoopConfig, Options, RegisterError, Session, SessionSetup,
    Simulation, StartupError,
};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::demo_route::{DemoRoute, RouteError};

const ROUTE_ENV_VAR: &str = "RAILCAB_ROUTE";
const DEFAULT_ROUTE_FILE_NAME: &str = "demo_route.json";
const DEFAULT_LANGUAGE_FILE_NAME: &str = "en-US.lang";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) session: Session,
    pub(crate) route: DemoRoute,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Bindings(#[from] BindingsError),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Handlers(#[from] RegisterError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== cabview startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        data_dir = %paths.data_dir.display(),
        settings_dir = %paths.settings_dir.display(),
        "startup"
    );

    let options = load_options_or_default(&paths.options_file());
    let strings = load_strings(&paths, &options);
    let registry = CommandRegistry::with_descriptions(&strings);
    let bindings = load_with_defaults(
        &paths.user_controls_file(),
        &paths.default_controls_file(),
        &registry,
    )?;
    if bindings.has_errors() {
        warn!(
            diagnostics = bindings.diagnostics.len(),
            "bindings_loaded_with_errors"
        );
    }

    let mut route = load_route(&paths)?;
    info!(
        route = route.name(),
        stations = route.stations().len(),
        "route_loaded"
    );

    let config = LoopConfig {
        window_title: format!("cabview - {}", route.name()),
        window_width: options.window_width,
        window_height: options.window_height,
        options_file: Some(paths.options_file()),
        ..LoopConfig::default()
    };
    let setup = SessionSetup {
        registry,
        controls: bindings.controls,
        strings,
        options,
        cab: route.cab_specs().clone(),
        camera_restriction: route.camera_restriction(),
        has_custom_timetable: route.has_custom_timetable(),
    };
    let session = Session::start(setup, &mut route)?;

    Ok(AppWiring {
        config,
        session,
        route,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Language file from the options, else the shipped default; a file that
/// cannot be read leaves every string as its key.
fn load_strings(paths: &AppPaths, options: &Options) -> InterfaceStrings {
    let path = language_file_path(&paths.data_dir, options.language_file.as_deref());
    if !path.is_file() {
        info!(path = %path.display(), "language_file_missing_using_keys");
        return InterfaceStrings::default();
    }
    match InterfaceStrings::load(&path) {
        Ok(strings) => {
            info!(path = %path.display(), strings = strings.len(), "language_file_loaded");
            strings
        }
        Err(error) => {
            warn!(path = %path.display(), error = %error, "language_file_unreadable");
            InterfaceStrings::default()
        }
    }
}

fn language_file_path(data_dir: &Path, configured: Option<&Path>) -> PathBuf {
    match configured {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => data_dir.join(path),
        None => data_dir.join(DEFAULT_LANGUAGE_FILE_NAME),
    }
}

fn load_route(paths: &AppPaths) -> Result<DemoRoute, RouteError> {
    match route_file_path(&paths.data_dir, env::var_os(ROUTE_ENV_VAR).map(PathBuf::from)) {
        Some(path) => DemoRoute::load(&path),
        None => {
            info!("route_file_missing_using_builtin");
            Ok(DemoRoute::builtin())
        }
    }
}

/// An explicit route path is always used, so a typo surfaces as a read
/// error; the shipped route is optional.
fn route_file_path(data_dir: &Path, from_env: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = from_env {
        return Some(path);
    }
    let shipped = data_dir.join(DEFAULT_ROUTE_FILE_NAME);
    shipped.is_file().then_some(shipped)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn language_file_resolves_against_data_dir() {
        let data = Path::new("/srv/railcab/data");
        assert_eq!(
            language_file_path(data, None),
            data.join(DEFAULT_LANGUAGE_FILE_NAME)
        );
        assert_eq!(
            language_file_path(data, Some(Path::new("lang/de-DE.lang"))),
            data.join("lang/de-DE.lang")
        );
    }

    #[test]
    fn route_env_override_wins_over_shipped_file() {
        let temp = TempDir::new().expect("temp");
        fs::write(temp.path().join(DEFAULT_ROUTE_FILE_NAME), "{}").expect("write");
        let custom = temp.path().join("custom.json");
        assert_eq!(
            route_file_path(temp.path(), Some(custom.clone())),
            Some(custom)
        );
        assert_eq!(
            route_file_path(temp.path(), None),
            Some(temp.path().join(DEFAULT_ROUTE_FILE_NAME))
        );
    }

    #[test]
    fn missing_shipped_route_falls_back_to_builtin() {
        let temp = TempDir::new().expect("temp");
        assert_eq!(route_file_path(temp.path(), None), None);
    }

    fn shipped_data_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data")
    }

    #[test]
    fn shipped_default_bindings_parse_cleanly() {
        let registry = CommandRegistry::builtin();
        let text = fs::read_to_string(shipped_data_dir().join(railcab::DEFAULT_CONTROLS_FILE_NAME))
            .expect("default controls");
        let loaded = railcab::controls::parse_bindings(&text, &registry);
        assert!(loaded.diagnostics.is_empty(), "{:?}", loaded.diagnostics);
        assert!(loaded.controls.contains_command(railcab::Command::MiscPause));
        assert!(loaded.controls.contains_command(railcab::Command::MenuEnter));
    }

    #[test]
    fn shipped_route_and_language_file_load() {
        let route = DemoRoute::load(&shipped_data_dir().join(DEFAULT_ROUTE_FILE_NAME))
            .expect("route");
        assert_eq!(route.stations().len(), 5);
        assert_eq!(route.next_stop_station(), Some(1));

        let strings = InterfaceStrings::load(&shipped_data_dir().join(DEFAULT_LANGUAGE_FILE_NAME))
            .expect("language file");
        assert_eq!(strings.get("menu_resume"), "Resume");
        assert_eq!(strings.get("notification_exterior"), "Exterior view");
    }
}
