mod hud;
mod keymap;
mod loop_runner;
mod window;

pub use loop_runner::{run_app, HostError, LoopConfig, FPS_ENV_VAR, LIMITED_FPS, PAUSED_SLEEP};
