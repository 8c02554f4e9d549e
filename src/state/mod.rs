use tracing::{debug, warn};

use self::window::{Point, SnapSide, WindowId, WindowInstance};
use crate::apps::AppRegistry;

pub mod window;

/// Where new windows open and how far each further window is shifted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cascade {
    pub origin: Point,
    pub step: f64,
}

impl Default for Cascade {
    fn default() -> Self {
        Self {
            origin: Point::new(100.0, 50.0),
            step: 30.0,
        }
    }
}

/// Owns every open window, the active window and the focus history.
///
/// Operations on ids that are not open are no-ops.
pub struct StateManager {
    registry: AppRegistry,
    cascade: Cascade,
    windows: Vec<WindowInstance>, // Creation order
    window_stack: Vec<WindowId>,  // Focus history, most recent last
    active: Option<WindowId>,
}

impl StateManager {
    pub fn new(registry: AppRegistry) -> Self {
        Self::with_cascade(registry, Cascade::default())
    }

    pub fn with_cascade(registry: AppRegistry, cascade: Cascade) -> Self {
        Self {
            registry,
            cascade,
            windows: Vec::new(),
            window_stack: Vec::new(),
            active: None,
        }
    }

    pub fn registry(&self) -> &AppRegistry {
        &self.registry
    }

    /// Focus the existing window for `app_id`, or open a new one.
    /// Returns the id of the window that ends up active, `None` for unknown apps.
    pub fn launch(&mut self, app_id: &str) -> Option<WindowId> {
        if let Some(existing) = self.find_by_app(app_id).map(|w| w.id) {
            debug!(app_id, window = %existing, "launch focuses existing window");
            self.restore(existing);
            return Some(existing);
        }

        let Some(descriptor) = self.registry.get(app_id) else {
            warn!(app_id, "launch requested for unknown app");
            return None;
        };

        let shift = self.windows.len() as f64 * self.cascade.step;
        let position = Point::new(self.cascade.origin.x + shift, self.cascade.origin.y + shift);
        let window = WindowInstance::new(
            descriptor.id.to_string(),
            descriptor.title.to_string(),
            position,
            descriptor.default_size,
        );
        let id = window.id;
        debug!(app_id, window = %id, x = position.x, y = position.y, "window created");

        self.windows.push(window);
        self.focus(id);
        Some(id)
    }

    pub fn focus(&mut self, id: WindowId) {
        if self.get(id).is_none() {
            return;
        }
        self.window_stack.retain(|w| *w != id);
        self.window_stack.push(id);
        self.active = Some(id);
        self.normalize_stack();
    }

    /// Remove a window. If it was active, the most recently focused visible
    /// window left over becomes active.
    pub fn close(&mut self, id: WindowId) -> Option<WindowInstance> {
        let index = self.windows.iter().position(|w| w.id == id)?;
        let removed = self.windows.remove(index);
        self.window_stack.retain(|w| *w != id);

        if self.active == Some(id) {
            self.active = self
                .window_stack
                .iter()
                .rev()
                .copied()
                .find(|w| self.get(*w).is_some_and(|win| !win.minimized));
            debug!(closed = %id, next = ?self.active, "active window closed");
        }

        self.normalize_stack();
        Some(removed)
    }

    /// Hide a window. The active window stays logically focused.
    pub fn minimize(&mut self, id: WindowId) {
        if let Some(win) = self.get_mut(id) {
            win.minimized = true;
        }
    }

    pub fn toggle_maximize(&mut self, id: WindowId) {
        if let Some(win) = self.get_mut(id) {
            let maximized = !win.maximized();
            win.set_maximized(maximized);
        }
    }

    /// Dock to `side`; snapping to the side it is already on undocks it.
    pub fn snap(&mut self, id: WindowId, side: SnapSide) {
        if let Some(win) = self.get_mut(id) {
            if win.snapped() == Some(side) {
                win.set_snapped(None);
            } else {
                win.set_snapped(Some(side));
            }
        }
    }

    pub fn restore(&mut self, id: WindowId) {
        if let Some(win) = self.get_mut(id) {
            win.minimized = false;
            self.focus(id);
        }
    }

    pub fn move_to(&mut self, id: WindowId, position: Point) {
        if let Some(win) = self.get_mut(id) {
            win.position = position;
        }
    }

    pub fn get(&self, id: WindowId) -> Option<&WindowInstance> {
        self.windows.iter().find(|w| w.id == id)
    }

    fn get_mut(&mut self, id: WindowId) -> Option<&mut WindowInstance> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    pub fn find_by_app(&self, app_id: &str) -> Option<&WindowInstance> {
        self.windows.iter().find(|w| w.app_id == app_id)
    }

    /// All open windows in creation order.
    pub fn windows(&self) -> &[WindowInstance] {
        &self.windows
    }

    pub fn active(&self) -> Option<WindowId> {
        self.active
    }

    pub fn is_active(&self, id: WindowId) -> bool {
        self.active == Some(id)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    fn normalize_stack(&mut self) {
        for (i, win_id) in self.window_stack.iter().enumerate() {
            if let Some(win) = self.windows.iter_mut().find(|w| w.id == *win_id) {
                win.z_order = (i as u32) + 1;
            }
        }
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new(AppRegistry::builtin())
    }
}
