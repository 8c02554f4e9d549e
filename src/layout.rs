// Screen geometry for windows under the global scale factor

use serde::{Deserialize, Serialize};

use crate::state::window::{SnapSide, WindowInstance};

/// Height kept free at the bottom of the desktop for the taskbar.
pub const TASKBAR_RESERVE: f64 = 72.0;

/// Absolute placement of a window on the desktop, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Size of the page the desktop is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub taskbar_reserve: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            taskbar_reserve: TASKBAR_RESERVE,
        }
    }

    /// Height available to maximized and snapped windows.
    pub fn available_height(&self) -> f64 {
        (self.height - self.taskbar_reserve).max(0.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1920.0, 1080.0)
    }
}

/// Logical size of a window's content before the scale transform is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentBox {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

/// Where `window` is drawn. Maximized and snapped layouts ignore `scale`;
/// free-floating windows scale their size but not their position.
pub fn compute_geometry(window: &WindowInstance, scale: f64, viewport: &Viewport) -> Rect {
    let height = viewport.available_height();
    let half = viewport.width / 2.0;

    if window.maximized() {
        return Rect { top: 0.0, left: 0.0, width: viewport.width, height };
    }

    match window.snapped() {
        Some(SnapSide::Left) => Rect { top: 0.0, left: 0.0, width: half, height },
        Some(SnapSide::Right) => Rect { top: 0.0, left: half, width: half, height },
        None => Rect {
            top: window.position.y,
            left: window.position.x,
            width: window.size.w * scale,
            height: window.size.h * scale,
        },
    }
}

/// Content is laid out at `rect / scale` and scaled back up, so it fills the
/// rect exactly in every layout.
pub fn content_box(rect: &Rect, scale: f64) -> ContentBox {
    let scale = if scale > 0.0 { scale } else { 1.0 };
    ContentBox {
        width: rect.width / scale,
        height: rect.height / scale,
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::window::{Point, Size};

    fn window() -> WindowInstance {
        WindowInstance::new(
            "browser".to_string(),
            "Nexus Browser".to_string(),
            Point::new(130.0, 80.0),
            Size::new(900.0, 600.0),
        )
    }

    #[test]
    fn test_free_floating_scales_size_only() {
        let win = window();
        let viewport = Viewport::new(1600.0, 900.0);
        let rect = compute_geometry(&win, 1.2, &viewport);
        assert_eq!(rect.top, 80.0);
        assert_eq!(rect.left, 130.0);
        assert!((rect.width - 1080.0).abs() < 1e-9);
        assert!((rect.height - 720.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_input_same_rect() {
        let win = window();
        let viewport = Viewport::default();
        assert_eq!(
            compute_geometry(&win, 0.85, &viewport),
            compute_geometry(&win, 0.85, &viewport)
        );
    }

    #[test]
    fn test_maximized_ignores_scale() {
        let mut win = window();
        win.set_maximized(true);
        let viewport = Viewport::new(1600.0, 900.0);
        let expected = Rect { top: 0.0, left: 0.0, width: 1600.0, height: 828.0 };
        assert_eq!(compute_geometry(&win, 0.8, &viewport), expected);
        assert_eq!(compute_geometry(&win, 1.2, &viewport), expected);
    }

    #[test]
    fn test_snapped_halves() {
        let mut win = window();
        let viewport = Viewport::new(1600.0, 900.0);

        win.set_snapped(Some(SnapSide::Left));
        assert_eq!(
            compute_geometry(&win, 1.1, &viewport),
            Rect { top: 0.0, left: 0.0, width: 800.0, height: 828.0 }
        );

        win.set_snapped(Some(SnapSide::Right));
        assert_eq!(
            compute_geometry(&win, 1.1, &viewport),
            Rect { top: 0.0, left: 800.0, width: 800.0, height: 828.0 }
        );
    }

    #[test]
    fn test_snapped_ignores_scale() {
        let mut win = window();
        let viewport = Viewport::new(1600.0, 900.0);
        for side in [SnapSide::Left, SnapSide::Right] {
            win.set_snapped(Some(side));
            assert_eq!(
                compute_geometry(&win, 0.8, &viewport),
                compute_geometry(&win, 1.2, &viewport)
            );
        }
    }

    #[test]
    fn test_tiny_viewport_clamps_height() {
        let mut win = window();
        win.set_maximized(true);
        let rect = compute_geometry(&win, 1.0, &Viewport::new(300.0, 50.0));
        assert_eq!(rect.height, 0.0);
    }

    #[test]
    fn test_content_box_inverts_scale() {
        let rect = Rect { top: 0.0, left: 0.0, width: 800.0, height: 828.0 };
        let content = content_box(&rect, 1.25);
        assert_eq!(content.width, 640.0);
        assert!((content.height * 1.25 - 828.0).abs() < 1e-9);

        let free = compute_geometry(&window(), 0.8, &Viewport::default());
        let content = content_box(&free, 0.8);
        assert!((content.width - 900.0).abs() < 1e-9);
        assert!((content.height - 600.0).abs() < 1e-9);
    }
}
