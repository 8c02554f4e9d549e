// App registry and per-app behaviour
pub mod apps;

// Boot log sequence
pub mod boot;

// Configuration file
pub mod config;

// Title bar drag state machine
pub mod drag;

// Remote text and wallpaper generation
pub mod generation;

// Window geometry under the global scale
pub mod layout;

// Display and personalization settings
pub mod settings;

// Desktop controller: taskbar, start menu and every user intent
pub mod shell;

// Window collection and focus
pub mod state;

// Tauri commands and events
#[cfg(feature = "desktop")]
mod commands;

use tracing_subscriber::EnvFilter;

pub use config::ShellConfig;
pub use shell::{DesktopSnapshot, ShellController};
pub use state::window::{SnapSide, WindowId, WindowInstance};
pub use state::StateManager;

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// `info` level. Safe to call more than once.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    commands::run();
}
