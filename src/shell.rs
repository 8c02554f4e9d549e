// Shell surface: the single controller that owns all desktop state
//
// Every user intent is a method here. The host renders `snapshot()` after
// each call and performs any queued pointer capture effects.

use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::apps::browser::BrowserState;
use crate::apps::notes::NotesState;
use crate::apps::physics::{ProjectileLab, ProjectileStats};
use crate::apps::terminal::{ShellCommand, TerminalState};
use crate::apps::{AppDescriptor, AppIcon, AppKind, AppRegistry};
use crate::boot::{BootSequence, BootView};
use crate::config::ShellConfig;
use crate::drag::{DragController, PointerCapture};
use crate::layout::{compute_geometry, content_box, ContentBox, Rect, Viewport};
use crate::settings::{
    FullscreenHost, FullscreenMode, Settings, SettingsTab, WallpaperTicket,
};
use crate::state::window::{Point, SnapSide, WindowId};
use crate::state::StateManager;

/// Per-window state for apps that keep any.
#[derive(Debug, Clone)]
enum AppState {
    Browser(BrowserState),
    Terminal(TerminalState),
    Physics(ProjectileLab),
    Notes(NotesState),
}

impl AppState {
    fn for_kind(kind: AppKind) -> Option<Self> {
        match kind {
            AppKind::Browser => Some(AppState::Browser(BrowserState::new())),
            AppKind::Terminal => Some(AppState::Terminal(TerminalState::new())),
            AppKind::Physics => Some(AppState::Physics(ProjectileLab::new())),
            AppKind::Notes => Some(AppState::Notes(NotesState::default())),
            AppKind::Settings | AppKind::Maths => None,
        }
    }
}

// ===== Render snapshot =====

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "state")]
pub enum AppView {
    Browser(BrowserState),
    Terminal(TerminalState),
    Physics {
        lab: ProjectileLab,
        stats: ProjectileStats,
    },
    Notes(NotesState),
    Settings {
        tab: SettingsTab,
        scale: f64,
        fullscreen: FullscreenMode,
        generating: bool,
    },
    Maths,
}

#[derive(Debug, Clone, Serialize)]
pub struct WindowView {
    pub id: WindowId,
    pub app_id: String,
    pub title: String,
    pub icon: Option<AppIcon>,
    pub rect: Rect,
    pub content: ContentBox,
    pub active: bool,
    pub maximized: bool,
    pub snapped: Option<SnapSide>,
    pub z_order: u32,
    pub draggable: bool,
    pub app: AppView,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskbarEntry {
    pub window_id: WindowId,
    pub app_id: String,
    pub title: String,
    pub icon: Option<AppIcon>,
    pub active: bool,
    pub minimized: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LauncherEntry {
    pub app_id: &'static str,
    pub title: &'static str,
    pub icon: AppIcon,
}

impl From<&AppDescriptor> for LauncherEntry {
    fn from(app: &AppDescriptor) -> Self {
        Self {
            app_id: app.id,
            title: app.title,
            icon: app.icon,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DesktopSnapshot {
    /// Present while the boot screen is showing
    pub boot: Option<BootView>,
    pub wallpaper: String,
    pub scale: f64,
    pub font_size: f64,
    pub fullscreen: FullscreenMode,
    pub start_menu_open: bool,
    /// Visible windows in creation order
    pub windows: Vec<WindowView>,
    pub taskbar: Vec<TaskbarEntry>,
    pub start_menu: Vec<LauncherEntry>,
    pub desktop_icons: Vec<LauncherEntry>,
}

// ===== Controller =====

pub struct ShellController {
    viewport: Viewport,
    windows: StateManager,
    drag: DragController,
    settings: Settings,
    boot: BootSequence,
    start_menu_open: bool,
    apps: HashMap<WindowId, AppState>,
    pointer_effects: Vec<PointerCapture>,
}

impl ShellController {
    pub fn new(config: &ShellConfig) -> Self {
        let desktop = &config.desktop;
        let boot = if desktop.skip_boot {
            BootSequence::skipped()
        } else {
            BootSequence::new()
        };
        Self {
            viewport: desktop.viewport(),
            windows: StateManager::with_cascade(AppRegistry::builtin(), desktop.cascade()),
            drag: DragController::new(),
            settings: Settings::new(),
            boot,
            start_menu_open: false,
            apps: HashMap::new(),
            pointer_effects: Vec::new(),
        }
    }

    pub fn windows(&self) -> &StateManager {
        &self.windows
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_start_menu_open(&self) -> bool {
        self.start_menu_open
    }

    // ----- Window lifecycle -----

    /// Launch from a desktop icon or the start menu. Any launch closes the
    /// start menu.
    pub fn launch(&mut self, app_id: &str) -> Option<WindowId> {
        self.start_menu_open = false;
        let id = self.windows.launch(app_id)?;
        if !self.apps.contains_key(&id) {
            let kind = self.windows.registry().get(app_id).map(|a| a.kind);
            if let Some(state) = kind.and_then(AppState::for_kind) {
                self.apps.insert(id, state);
            }
        }
        Some(id)
    }

    pub fn launch_from_start_menu(&mut self, app_id: &str) -> Option<WindowId> {
        self.launch(app_id)
    }

    pub fn focus(&mut self, id: WindowId) {
        self.windows.focus(id);
    }

    pub fn close(&mut self, id: WindowId) {
        if let Some(win) = self.windows.close(id) {
            info!(window = %id, app_id = %win.app_id, "window closed");
            self.apps.remove(&id);
        }
        self.sync_drag();
    }

    pub fn minimize(&mut self, id: WindowId) {
        self.windows.minimize(id);
        self.sync_drag();
    }

    pub fn toggle_maximize(&mut self, id: WindowId) {
        self.windows.toggle_maximize(id);
        self.sync_drag();
    }

    pub fn snap(&mut self, id: WindowId, side: SnapSide) {
        self.windows.snap(id, side);
        self.sync_drag();
    }

    pub fn restore(&mut self, id: WindowId) {
        self.windows.restore(id);
    }

    /// Taskbar entries always restore and focus their window.
    pub fn taskbar_click(&mut self, id: WindowId) {
        self.restore(id);
    }

    pub fn toggle_start_menu(&mut self) -> bool {
        self.start_menu_open = !self.start_menu_open;
        self.start_menu_open
    }

    // ----- Pointer -----

    pub fn pointer_down(&mut self, id: WindowId, pointer: Point) {
        if let Some(effect) = self.drag.pointer_down(&mut self.windows, id, pointer) {
            self.pointer_effects.push(effect);
        }
    }

    pub fn pointer_move(&mut self, pointer: Point) {
        self.drag.pointer_move(&mut self.windows, pointer);
    }

    pub fn pointer_up(&mut self) {
        if let Some(effect) = self.drag.pointer_up() {
            self.pointer_effects.push(effect);
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Capture/release requests produced since the last call.
    pub fn take_pointer_effects(&mut self) -> Vec<PointerCapture> {
        std::mem::take(&mut self.pointer_effects)
    }

    fn sync_drag(&mut self) {
        if let Some(effect) = self.drag.sync(&self.windows) {
            self.pointer_effects.push(effect);
        }
    }

    // ----- Settings -----

    pub fn set_scale(&mut self, scale: f64) -> f64 {
        let applied = self.settings.set_scale(scale);
        debug!(requested = scale, applied, "scale changed");
        applied
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport.width = width.max(0.0);
        self.viewport.height = height.max(0.0);
    }

    pub fn set_settings_tab(&mut self, tab: SettingsTab) {
        self.settings.set_tab(tab);
    }

    pub fn toggle_fullscreen(&mut self, host: &mut dyn FullscreenHost) -> FullscreenMode {
        self.settings.toggle_fullscreen(host)
    }

    pub fn begin_wallpaper_generation(&mut self, prompt: &str) -> Option<WallpaperTicket> {
        self.settings.begin_wallpaper_generation(prompt)
    }

    pub fn finish_wallpaper_generation<E: std::fmt::Display>(
        &mut self,
        ticket: WallpaperTicket,
        result: Result<String, E>,
    ) -> bool {
        self.settings.finish_wallpaper_generation(ticket, result)
    }

    // ----- Boot -----

    pub fn start_boot(&mut self) {
        self.boot.start();
    }

    pub fn tick_boot(&mut self, delta: Duration) -> bool {
        let changed = self.boot.tick(delta);
        if changed && self.boot.is_complete() {
            info!("Boot sequence complete");
        }
        changed
    }

    pub fn is_booted(&self) -> bool {
        self.boot.is_complete()
    }

    // ----- Apps -----

    pub fn browser_navigate(&mut self, id: WindowId, input: &str) -> Option<String> {
        self.browser(id).map(|b| b.navigate(input).to_string())
    }

    pub fn browser_back(&mut self, id: WindowId) -> Option<String> {
        self.browser(id).map(|b| b.back().to_string())
    }

    pub fn browser_home(&mut self, id: WindowId) -> Option<String> {
        self.browser(id).map(|b| b.home().to_string())
    }

    pub fn browser_dismiss_notice(&mut self, id: WindowId) {
        if let Some(browser) = self.browser(id) {
            browser.dismiss_notice();
        }
    }

    pub fn browser_url(&self, id: WindowId) -> Option<&str> {
        match self.apps.get(&id) {
            Some(AppState::Browser(b)) => Some(b.url()),
            _ => None,
        }
    }

    fn browser(&mut self, id: WindowId) -> Option<&mut BrowserState> {
        match self.apps.get_mut(&id) {
            Some(AppState::Browser(b)) => Some(b),
            _ => None,
        }
    }

    pub fn terminal_submit(&mut self, id: WindowId, input: &str) -> ShellCommand {
        match self.apps.get_mut(&id) {
            Some(AppState::Terminal(t)) => t.submit(input),
            _ => ShellCommand::None,
        }
    }

    /// Deliver late output. Returns false when the terminal is gone and the
    /// output was dropped.
    pub fn terminal_print(&mut self, id: WindowId, text: impl Into<String>) -> bool {
        match self.apps.get_mut(&id) {
            Some(AppState::Terminal(t)) => {
                t.print(text);
                true
            }
            _ => {
                debug!(window = %id, "terminal closed, dropping output");
                false
            }
        }
    }

    pub fn physics_set(&mut self, id: WindowId, angle: f64, velocity: f64) -> Option<ProjectileStats> {
        match self.apps.get_mut(&id) {
            Some(AppState::Physics(lab)) => {
                lab.set_angle(angle);
                lab.set_velocity(velocity);
                Some(lab.stats())
            }
            _ => None,
        }
    }

    pub fn notes_set_text(&mut self, id: WindowId, text: &str) {
        if let Some(AppState::Notes(notes)) = self.apps.get_mut(&id) {
            notes.set_text(text);
        }
    }

    // ----- Rendering -----

    pub fn snapshot(&self) -> DesktopSnapshot {
        let registry = self.windows.registry();
        let scale = self.settings.scale();
        let icon = |app_id: &str| registry.get(app_id).map(|a| a.icon);

        let windows = self
            .windows
            .windows()
            .iter()
            .filter(|w| !w.minimized)
            .map(|w| {
                let rect = compute_geometry(w, scale, &self.viewport);
                let kind = registry.get(&w.app_id).map(|a| a.kind);
                WindowView {
                    id: w.id,
                    app_id: w.app_id.clone(),
                    title: w.title.clone(),
                    icon: icon(&w.app_id),
                    rect,
                    content: content_box(&rect, scale),
                    active: self.windows.is_active(w.id),
                    maximized: w.maximized(),
                    snapped: w.snapped(),
                    z_order: w.z_order,
                    draggable: w.is_free_floating(),
                    app: self.app_view(w.id, kind),
                }
            })
            .collect();

        let taskbar = self
            .windows
            .windows()
            .iter()
            .map(|w| TaskbarEntry {
                window_id: w.id,
                app_id: w.app_id.clone(),
                title: w.title.clone(),
                icon: icon(&w.app_id),
                active: self.windows.is_active(w.id),
                minimized: w.minimized,
            })
            .collect();

        DesktopSnapshot {
            boot: (!self.boot.is_complete()).then(|| self.boot.view()),
            wallpaper: self.settings.wallpaper().to_string(),
            scale,
            font_size: self.settings.font_size(),
            fullscreen: self.settings.fullscreen(),
            start_menu_open: self.start_menu_open,
            windows,
            taskbar,
            start_menu: registry.all().iter().map(LauncherEntry::from).collect(),
            desktop_icons: registry.desktop_icons().iter().map(LauncherEntry::from).collect(),
        }
    }

    fn app_view(&self, id: WindowId, kind: Option<AppKind>) -> AppView {
        match (self.apps.get(&id), kind) {
            (Some(AppState::Browser(b)), _) => AppView::Browser(b.clone()),
            (Some(AppState::Terminal(t)), _) => AppView::Terminal(t.clone()),
            (Some(AppState::Physics(lab)), _) => AppView::Physics {
                lab: *lab,
                stats: lab.stats(),
            },
            (Some(AppState::Notes(n)), _) => AppView::Notes(n.clone()),
            (None, Some(AppKind::Settings)) => AppView::Settings {
                tab: self.settings.tab(),
                scale: self.settings.scale(),
                fullscreen: self.settings.fullscreen(),
                generating: self.settings.is_generating(),
            },
            (None, _) => AppView::Maths,
        }
    }
}

impl Default for ShellController {
    fn default() -> Self {
        Self::new(&ShellConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn booted() -> ShellController {
        let mut config = ShellConfig::default();
        config.desktop.skip_boot = true;
        ShellController::new(&config)
    }

    #[test]
    fn test_launch_closes_start_menu() {
        let mut shell = booted();
        assert!(shell.toggle_start_menu());
        shell.launch_from_start_menu("settings");
        assert!(!shell.is_start_menu_open());
        assert!(shell.toggle_start_menu());
    }

    #[test]
    fn test_taskbar_lists_windows_in_creation_order() {
        let mut shell = booted();
        let a = shell.launch("browser").unwrap();
        let b = shell.launch("terminal").unwrap();
        shell.focus(a);
        shell.minimize(b);

        let snap = shell.snapshot();
        let ids: Vec<_> = snap.taskbar.iter().map(|t| t.window_id).collect();
        assert_eq!(ids, vec![a, b]);
        assert!(snap.taskbar[0].active);
        assert!(snap.taskbar[1].minimized);
        // Minimized windows are not drawn
        assert_eq!(snap.windows.len(), 1);
        assert_eq!(snap.windows[0].id, a);
    }

    #[test]
    fn test_snapshot_lists_launchers() {
        let snap = booted().snapshot();
        assert_eq!(snap.start_menu.len(), 6);
        assert_eq!(snap.desktop_icons.len(), 5);
        assert!(snap.boot.is_none());
        assert_eq!(snap.font_size, 16.0);
    }

    #[test]
    fn test_snapshot_applies_scale_to_free_windows() {
        let mut shell = booted();
        let id = shell.launch("terminal").unwrap();
        shell.set_scale(1.2);
        let snap = shell.snapshot();
        let view = &snap.windows[0];
        assert_eq!(view.id, id);
        assert!((view.rect.width - 720.0).abs() < 1e-9);
        assert!((view.content.width - 600.0).abs() < 1e-9);
        assert!(view.draggable);
    }

    #[test]
    fn test_app_state_follows_window_lifetime() {
        let mut shell = booted();
        let id = shell.launch("browser").unwrap();
        assert_eq!(shell.browser_navigate(id, "docs.rs").as_deref(), Some("https://docs.rs"));

        // Relaunching keeps the same browser session
        shell.launch("browser");
        assert_eq!(shell.browser_url(id), Some("https://docs.rs"));

        shell.close(id);
        assert_eq!(shell.browser_url(id), None);
        let reopened = shell.launch("browser").unwrap();
        assert_eq!(shell.browser_url(reopened), Some(crate::apps::browser::HOME_URL));
    }

    #[test]
    fn test_late_terminal_output_is_dropped_after_close() {
        let mut shell = booted();
        let id = shell.launch("terminal").unwrap();
        assert_eq!(
            shell.terminal_submit(id, "ask status"),
            ShellCommand::Ask("status".to_string())
        );
        assert!(shell.terminal_print(id, "nominal"));
        shell.close(id);
        assert!(!shell.terminal_print(id, "too late"));
    }

    #[test]
    fn test_settings_window_view() {
        let mut shell = booted();
        shell.launch("settings");
        shell.set_settings_tab(SettingsTab::System);
        match &shell.snapshot().windows[0].app {
            AppView::Settings { tab, scale, .. } => {
                assert_eq!(*tab, SettingsTab::System);
                assert_eq!(*scale, 1.0);
            }
            other => panic!("unexpected view {:?}", other),
        }
    }

    #[test]
    fn test_physics_updates_stats() {
        let mut shell = booted();
        let id = shell.launch("physics").unwrap();
        let stats = shell.physics_set(id, 45.0, 20.0).unwrap();
        assert_eq!(stats.range, 40.82);
        let other = shell.launch("notes").unwrap();
        assert!(shell.physics_set(other, 30.0, 10.0).is_none());
    }

    #[test]
    fn test_notes_text_reaches_snapshot() {
        let mut shell = booted();
        let id = shell.launch("notes").unwrap();
        shell.notes_set_text(id, "orbit at 0400");
        match &shell.snapshot().windows[0].app {
            AppView::Notes(notes) => assert_eq!(notes.text, "orbit at 0400"),
            other => panic!("unexpected view {:?}", other),
        }

        // Other windows ignore note edits
        let term = shell.launch("terminal").unwrap();
        shell.notes_set_text(term, "lost");
        shell.close(id);
        let reopened = shell.launch("notes").unwrap();
        let snap = shell.snapshot();
        let view = snap.windows.iter().find(|w| w.id == reopened).unwrap();
        match &view.app {
            AppView::Notes(notes) => assert_eq!(notes.text, ""),
            other => panic!("unexpected view {:?}", other),
        }
    }

    #[test]
    fn test_boot_gates_desktop() {
        let mut shell = ShellController::default();
        assert!(shell.snapshot().boot.is_some());
        shell.start_boot();
        shell.tick_boot(Duration::from_millis(350 * 8));
        shell.tick_boot(Duration::from_millis(1200));
        assert!(shell.is_booted());
        assert!(shell.snapshot().boot.is_none());
    }

    #[test]
    fn test_snapping_mid_drag_releases_pointer() {
        let mut shell = booted();
        let id = shell.launch("notes").unwrap();
        shell.pointer_down(id, Point::new(120.0, 60.0));
        assert_eq!(shell.take_pointer_effects(), vec![PointerCapture::Capture]);
        shell.snap(id, SnapSide::Left);
        assert!(!shell.is_dragging());
        assert_eq!(shell.take_pointer_effects(), vec![PointerCapture::Release]);
        shell.pointer_up();
        assert!(shell.take_pointer_effects().is_empty());
    }
}
