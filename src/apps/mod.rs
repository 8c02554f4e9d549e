// App registry and per-app behaviour
// Each launchable app is described once at startup; its content is a tagged kind

pub mod browser;
pub mod notes;
pub mod physics;
pub mod terminal;

use serde::{Deserialize, Serialize};

use crate::state::window::Size;

/// Number of registry entries shown as desktop icons.
pub const DESKTOP_ICON_COUNT: usize = 5;

/// Which built-in app a descriptor renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppKind {
    Browser,
    Settings,
    Terminal,
    Physics,
    Maths,
    Notes,
}

/// Icon handle passed through to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppIcon {
    pub name: &'static str,
    pub accent: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AppDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    pub icon: AppIcon,
    pub kind: AppKind,
    pub default_size: Size,
}

const fn app(
    id: &'static str,
    title: &'static str,
    icon: &'static str,
    accent: Option<&'static str>,
    kind: AppKind,
    w: f64,
    h: f64,
) -> AppDescriptor {
    AppDescriptor {
        id,
        title,
        icon: AppIcon { name: icon, accent },
        kind,
        default_size: Size::new(w, h),
    }
}

static APPS: [AppDescriptor; 6] = [
    app("browser", "Nexus Browser", "globe", Some("text-blue-500"), AppKind::Browser, 900.0, 600.0),
    app("settings", "Settings", "settings", None, AppKind::Settings, 600.0, 500.0),
    app("terminal", "Terminal", "terminal", Some("text-green-500"), AppKind::Terminal, 600.0, 400.0),
    app("physics", "Physics Lab", "flame", Some("text-blue-400"), AppKind::Physics, 450.0, 500.0),
    app("maths", "Maths Lab", "function-square", Some("text-purple-400"), AppKind::Maths, 400.0, 450.0),
    app("notes", "Notes", "notebook", Some("text-yellow-400"), AppKind::Notes, 400.0, 500.0),
];

/// Static list of launchable apps, in start menu order.
#[derive(Debug, Clone, Copy)]
pub struct AppRegistry {
    apps: &'static [AppDescriptor],
}

impl AppRegistry {
    pub fn builtin() -> Self {
        Self { apps: &APPS }
    }

    pub fn all(&self) -> &'static [AppDescriptor] {
        self.apps
    }

    pub fn get(&self, app_id: &str) -> Option<&'static AppDescriptor> {
        self.apps.iter().find(|a| a.id == app_id)
    }

    pub fn desktop_icons(&self) -> &'static [AppDescriptor] {
        &self.apps[..DESKTOP_ICON_COUNT.min(self.apps.len())]
    }
}

impl Default for AppRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
