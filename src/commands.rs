// Tauri host binding
//
// Every command locks the controller, applies one intent and emits the new
// snapshot as `desktop-changed`. Drag capture requests go out as
// `pointer-capture` so the frontend attaches its window-level listeners.

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tauri::{AppHandle, Emitter, Manager, State};
use tauri_plugin_opener::OpenerExt;
use tracing::{error, info, warn};

use crate::apps::physics::ProjectileStats;
use crate::apps::terminal::ShellCommand;
use crate::config::{ShellConfig, CONFIG_FILE_NAME};
use crate::generation::GenerationClient;
use crate::settings::{FullscreenHost, FullscreenMode, SettingsTab};
use crate::shell::{DesktopSnapshot, ShellController};
use crate::state::window::{Point, SnapSide, WindowId};

const CONFIG_PATH_ENV: &str = "ZENITH_CONFIG";
const BOOT_TICK: Duration = Duration::from_millis(50);

type Shell<'a> = State<'a, Mutex<ShellController>>;

fn emit_snapshot(app: &AppHandle, shell: &mut ShellController) -> Result<(), String> {
    app.emit("desktop-changed", shell.snapshot())
        .map_err(|e| e.to_string())?;
    for effect in shell.take_pointer_effects() {
        app.emit("pointer-capture", effect)
            .map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Lock, apply `f`, publish the new state.
fn mutate<T>(
    app: &AppHandle,
    state: &Mutex<ShellController>,
    f: impl FnOnce(&mut ShellController) -> T,
) -> Result<T, String> {
    let mut shell = state.lock().map_err(|e| e.to_string())?;
    let out = f(&mut shell);
    emit_snapshot(app, &mut shell)?;
    Ok(out)
}

/// Main webview as seen by the fullscreen setting.
struct MainWindow(Option<tauri::WebviewWindow>);

impl FullscreenHost for MainWindow {
    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), String> {
        let window = self
            .0
            .as_ref()
            .ok_or_else(|| "Main window not found".to_string())?;
        window
            .set_fullscreen(fullscreen)
            .map_err(|e| format!("Failed to set fullscreen: {}", e))
    }
}

// ===== Desktop =====

#[tauri::command]
fn get_desktop(state: Shell) -> Result<DesktopSnapshot, String> {
    let shell = state.lock().map_err(|e| e.to_string())?;
    Ok(shell.snapshot())
}

#[tauri::command]
fn boot_start(app: AppHandle, state: Shell) -> Result<(), String> {
    mutate(&app, &state, |shell| shell.start_boot())
}

#[tauri::command]
fn set_viewport(width: f64, height: f64, app: AppHandle, state: Shell) -> Result<(), String> {
    mutate(&app, &state, |shell| shell.set_viewport(width, height))
}

#[tauri::command]
fn toggle_start_menu(app: AppHandle, state: Shell) -> Result<bool, String> {
    mutate(&app, &state, |shell| shell.toggle_start_menu())
}

// ===== Window Management Commands =====

#[tauri::command]
fn launch_app(app_id: String, app: AppHandle, state: Shell) -> Result<Option<WindowId>, String> {
    mutate(&app, &state, |shell| shell.launch(&app_id))
}

#[tauri::command]
fn focus_window(id: WindowId, app: AppHandle, state: Shell) -> Result<(), String> {
    mutate(&app, &state, |shell| shell.focus(id))
}

#[tauri::command]
fn close_window(id: WindowId, app: AppHandle, state: Shell) -> Result<(), String> {
    mutate(&app, &state, |shell| shell.close(id))
}

#[tauri::command]
fn minimize_window(id: WindowId, app: AppHandle, state: Shell) -> Result<(), String> {
    mutate(&app, &state, |shell| shell.minimize(id))
}

#[tauri::command]
fn toggle_maximize(id: WindowId, app: AppHandle, state: Shell) -> Result<(), String> {
    mutate(&app, &state, |shell| shell.toggle_maximize(id))
}

#[tauri::command]
fn snap_window(id: WindowId, side: String, app: AppHandle, state: Shell) -> Result<(), String> {
    let side = SnapSide::from_str(&side).ok_or_else(|| format!("Invalid snap side: {}", side))?;
    mutate(&app, &state, |shell| shell.snap(id, side))
}

#[tauri::command]
fn restore_window(id: WindowId, app: AppHandle, state: Shell) -> Result<(), String> {
    mutate(&app, &state, |shell| shell.restore(id))
}

#[tauri::command]
fn taskbar_click(id: WindowId, app: AppHandle, state: Shell) -> Result<(), String> {
    mutate(&app, &state, |shell| shell.taskbar_click(id))
}

// ===== Pointer Commands =====

#[tauri::command]
fn pointer_down(id: WindowId, x: f64, y: f64, app: AppHandle, state: Shell) -> Result<(), String> {
    mutate(&app, &state, |shell| shell.pointer_down(id, Point::new(x, y)))
}

#[tauri::command]
fn pointer_move(x: f64, y: f64, app: AppHandle, state: Shell) -> Result<(), String> {
    mutate(&app, &state, |shell| shell.pointer_move(Point::new(x, y)))
}

#[tauri::command]
fn pointer_up(app: AppHandle, state: Shell) -> Result<(), String> {
    mutate(&app, &state, |shell| shell.pointer_up())
}

// ===== Settings Commands =====

#[tauri::command]
fn set_scale(scale: f64, app: AppHandle, state: Shell) -> Result<f64, String> {
    mutate(&app, &state, |shell| shell.set_scale(scale))
}

#[tauri::command]
fn set_settings_tab(tab: SettingsTab, app: AppHandle, state: Shell) -> Result<(), String> {
    mutate(&app, &state, |shell| shell.set_settings_tab(tab))
}

#[tauri::command]
fn toggle_fullscreen(app: AppHandle, state: Shell) -> Result<FullscreenMode, String> {
    let mut host = MainWindow(app.get_webview_window("main"));
    mutate(&app, &state, |shell| shell.toggle_fullscreen(&mut host))
}

/// Generate a wallpaper and apply it. Returns whether the wallpaper changed.
#[tauri::command]
async fn generate_wallpaper(
    prompt: String,
    app: AppHandle,
    state: Shell<'_>,
    client: State<'_, GenerationClient>,
) -> Result<bool, String> {
    let Some(ticket) = mutate(&app, &state, |shell| shell.begin_wallpaper_generation(&prompt))?
    else {
        return Ok(false);
    };

    let result = client.generate_wallpaper(&prompt).await;
    mutate(&app, &state, |shell| shell.finish_wallpaper_generation(ticket, result))
}

// ===== App Commands =====

#[tauri::command]
fn browser_navigate(
    id: WindowId,
    input: String,
    app: AppHandle,
    state: Shell,
) -> Result<Option<String>, String> {
    mutate(&app, &state, |shell| shell.browser_navigate(id, &input))
}

#[tauri::command]
fn browser_back(id: WindowId, app: AppHandle, state: Shell) -> Result<Option<String>, String> {
    mutate(&app, &state, |shell| shell.browser_back(id))
}

#[tauri::command]
fn browser_home(id: WindowId, app: AppHandle, state: Shell) -> Result<Option<String>, String> {
    mutate(&app, &state, |shell| shell.browser_home(id))
}

#[tauri::command]
fn browser_dismiss_notice(id: WindowId, app: AppHandle, state: Shell) -> Result<(), String> {
    mutate(&app, &state, |shell| shell.browser_dismiss_notice(id))
}

/// Open the browser window's current page in the system browser.
#[tauri::command]
fn browser_open_external(id: WindowId, app: AppHandle, state: Shell) -> Result<(), String> {
    let url = {
        let shell = state.lock().map_err(|e| e.to_string())?;
        shell.browser_url(id).map(str::to_string)
    };
    let url = url.ok_or_else(|| format!("Window {} is not a browser", id))?;
    app.opener()
        .open_url(url, None::<&str>)
        .map_err(|e| e.to_string())
}

/// Submit a shell line. `ask <prompt>` is answered asynchronously; the answer
/// is dropped if the terminal has been closed by then.
#[tauri::command]
fn terminal_submit(
    id: WindowId,
    input: String,
    app: AppHandle,
    state: Shell,
    client: State<GenerationClient>,
) -> Result<(), String> {
    let command = mutate(&app, &state, |shell| shell.terminal_submit(id, &input))?;
    if let ShellCommand::Ask(prompt) = command {
        let client = client.inner().clone();
        tauri::async_runtime::spawn(async move {
            let text = match client.generate_text(&prompt).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Assistant request failed: {}", e);
                    format!("Error: {}", e)
                }
            };
            let state = app.state::<Mutex<ShellController>>();
            if let Err(e) = mutate(&app, &state, |shell| shell.terminal_print(id, text)) {
                warn!("Failed to deliver assistant reply: {}", e);
            }
        });
    }
    Ok(())
}

#[tauri::command]
fn physics_set(
    id: WindowId,
    angle: f64,
    velocity: f64,
    app: AppHandle,
    state: Shell,
) -> Result<Option<ProjectileStats>, String> {
    mutate(&app, &state, |shell| shell.physics_set(id, angle, velocity))
}

#[tauri::command]
fn notes_set_text(id: WindowId, text: String, app: AppHandle, state: Shell) -> Result<(), String> {
    mutate(&app, &state, |shell| shell.notes_set_text(id, &text))
}

// ===== Setup =====

fn load_config() -> ShellConfig {
    let path = std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    match ShellConfig::load(&path) {
        Ok(config) => config,
        Err(e) => {
            error!("{}; falling back to defaults", e);
            ShellConfig::default()
        }
    }
}

/// One boot tick. Returns true once the boot screen is done.
fn advance_boot(app: &AppHandle, delta: Duration) -> bool {
    let state = app.state::<Mutex<ShellController>>();
    let Ok(mut shell) = state.lock() else {
        return true;
    };
    if shell.tick_boot(delta) {
        if let Err(e) = emit_snapshot(app, &mut shell) {
            warn!("Failed to emit boot progress: {}", e);
        }
    }
    shell.is_booted()
}

pub fn run() {
    crate::init_logging();

    let config = load_config();
    let client = GenerationClient::new(config.generation.clone());
    let shell = ShellController::new(&config);

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .manage(Mutex::new(shell))
        .manage(client)
        .setup(|app| {
            let handle = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                let mut interval = tokio::time::interval(BOOT_TICK);
                let mut last = tokio::time::Instant::now();
                loop {
                    interval.tick().await;
                    let now = tokio::time::Instant::now();
                    if advance_boot(&handle, now - last) {
                        break;
                    }
                    last = now;
                }
            });
            info!("Zenith shell initialized");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Desktop
            get_desktop,
            boot_start,
            set_viewport,
            toggle_start_menu,
            // Window management
            launch_app,
            focus_window,
            close_window,
            minimize_window,
            toggle_maximize,
            snap_window,
            restore_window,
            taskbar_click,
            // Pointer
            pointer_down,
            pointer_move,
            pointer_up,
            // Settings
            set_scale,
            set_settings_tab,
            toggle_fullscreen,
            generate_wallpaper,
            // Apps
            browser_navigate,
            browser_back,
            browser_home,
            browser_dismiss_notice,
            browser_open_external,
            terminal_submit,
            physics_set,
            notes_set_text,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
