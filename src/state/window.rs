use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of one open window. Time-ordered and never reused.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct WindowId(Uuid);

impl WindowId {
    pub fn new() -> Self {
        WindowId(Uuid::now_v7())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(WindowId)
    }
}

impl Default for WindowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset_from(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Size {
    pub w: f64,
    pub h: f64,
}

impl Size {
    pub const fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }
}

/// Half of the desktop a window is docked to.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SnapSide {
    Left,
    Right,
}

impl SnapSide {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "left" => Some(SnapSide::Left),
            "right" => Some(SnapSide::Right),
            _ => None,
        }
    }
}

/// Serialize-only: `maximized` and `snapped` change through the setters so
/// they never hold at the same time.
#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct WindowInstance {
    pub id: WindowId,
    pub app_id: String,          // Registry id this window was launched from
    pub title: String,           // Window title, copied from the descriptor
    pub position: Point,         // Free-floating origin
    pub size: Size,              // Free-floating size before scaling
    pub minimized: bool,
    maximized: bool,
    snapped: Option<SnapSide>,
    pub z_order: u32,            // 1-based rank in the focus history
}

impl WindowInstance {
    pub fn new(app_id: String, title: String, position: Point, size: Size) -> Self {
        Self {
            id: WindowId::new(),
            app_id,
            title,
            position,
            size,
            minimized: false,
            maximized: false,
            snapped: None,
            z_order: 0,
        }
    }

    pub fn maximized(&self) -> bool {
        self.maximized
    }

    pub fn snapped(&self) -> Option<SnapSide> {
        self.snapped
    }

    /// True when the window uses its own position and size.
    pub fn is_free_floating(&self) -> bool {
        !self.maximized && self.snapped.is_none()
    }

    /// Maximizing clears any snap.
    pub fn set_maximized(&mut self, maximized: bool) {
        self.maximized = maximized;
        if maximized {
            self.snapped = None;
        }
    }

    /// Snapping clears maximize.
    pub fn set_snapped(&mut self, side: Option<SnapSide>) {
        self.snapped = side;
        if side.is_some() {
            self.maximized = false;
        }
    }
}
