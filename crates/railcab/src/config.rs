use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::atomic_io::write_text_atomic;
use crate::input::{NormalizerConfig, DEFAULT_REPEAT_DELAY, DEFAULT_REPEAT_INTERVAL};

pub const OPTIONS_FILE_NAME: &str = "options.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Arcade,
    #[default]
    Normal,
    /// No AI, no time acceleration, no station jumps.
    Expert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub key_repeat_delay: f64,
    pub key_repeat_interval: f64,
    pub joystick_axis_threshold: f64,
    pub use_joysticks: bool,
    pub game_mode: GameMode,
    pub limit_frame_rate: bool,
    pub language_file: Option<PathBuf>,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            key_repeat_delay: DEFAULT_REPEAT_DELAY,
            key_repeat_interval: DEFAULT_REPEAT_INTERVAL,
            joystick_axis_threshold: 0.0,
            use_joysticks: true,
            game_mode: GameMode::Normal,
            limit_frame_rate: false,
            language_file: None,
            window_width: 960,
            window_height: 600,
        }
    }
}

impl Options {
    /// Clamps values a hand-edited file may have put out of range.
    pub fn normalized(mut self) -> Self {
        self.key_repeat_delay = non_negative_or(self.key_repeat_delay, DEFAULT_REPEAT_DELAY);
        self.key_repeat_interval =
            non_negative_or(self.key_repeat_interval, DEFAULT_REPEAT_INTERVAL);
        if self.key_repeat_interval == 0.0 {
            self.key_repeat_interval = DEFAULT_REPEAT_INTERVAL;
        }
        self.joystick_axis_threshold = non_negative_or(self.joystick_axis_threshold, 0.0).min(1.0);
        self.window_width = self.window_width.max(1);
        self.window_height = self.window_height.max(1);
        self
    }

    pub fn normalizer_config(&self) -> NormalizerConfig {
        NormalizerConfig {
            use_joysticks: self.use_joysticks,
            axis_threshold: self.joystick_axis_threshold,
        }
    }
}

fn non_negative_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        fallback
    }
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("failed to read options file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse options file {path} at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode options: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write options file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub fn parse_options(raw: &str, path: &Path) -> Result<Options, OptionsError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, Options>(&mut deserializer) {
        Ok(options) => Ok(options.normalized()),
        Err(error) => {
            let field = error.path().to_string();
            Err(OptionsError::Parse {
                path: path.to_path_buf(),
                field,
                source: error.into_inner(),
            })
        }
    }
}

/// Reads the options file. A missing file yields the defaults.
pub fn load_options(path: &Path) -> Result<Options, OptionsError> {
    if !path.exists() {
        info!(path = %path.display(), "options_missing_using_defaults");
        return Ok(Options::default());
    }
    let raw = fs::read_to_string(path).map_err(|source| OptionsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_options(&raw, path)
}

/// Like [`load_options`], but a broken file only costs a warning.
pub fn load_options_or_default(path: &Path) -> Options {
    match load_options(path) {
        Ok(options) => options,
        Err(error) => {
            warn!(error = %error, "options_invalid_using_defaults");
            Options::default()
        }
    }
}

pub fn save_options(path: &Path, options: &Options) -> Result<(), OptionsError> {
    let text = serde_json::to_string_pretty(options).map_err(OptionsError::Encode)?;
    write_text_atomic(path, &text).map_err(|source| OptionsError::Write {
        path: path.to_path_buf(),
        source,
    })
}
