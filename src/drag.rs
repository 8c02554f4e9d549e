// Title bar dragging as an explicit two-state machine
//
// Entering `Dragging` asks the host to capture pointer events at the
// process-wide level; leaving it asks for the release. Every capture is
// matched by exactly one release.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state::window::{Point, WindowId};
use crate::state::StateManager;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DragState {
    Idle,
    Dragging {
        window_id: WindowId,
        /// Pointer position relative to the window origin at drag start
        offset: Point,
    },
}

/// Listener (de)registration the host performs on state entry and exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerCapture {
    Capture,
    Release,
}

#[derive(Debug)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Pointer pressed on a title bar. Focuses the window and starts a drag
    /// unless the window is maximized or snapped.
    pub fn pointer_down(
        &mut self,
        windows: &mut StateManager,
        window_id: WindowId,
        pointer: Point,
    ) -> Option<PointerCapture> {
        if self.is_dragging() {
            return None;
        }
        let win = windows.get(window_id)?;
        let draggable = win.is_free_floating() && !win.minimized;
        let offset = pointer.offset_from(win.position);

        windows.focus(window_id);
        if !draggable {
            return None;
        }

        debug!(window = %window_id, ?offset, "drag started");
        self.state = DragState::Dragging { window_id, offset };
        Some(PointerCapture::Capture)
    }

    pub fn pointer_move(&mut self, windows: &mut StateManager, pointer: Point) {
        if let DragState::Dragging { window_id, offset } = self.state {
            windows.move_to(window_id, pointer.offset_from(offset));
        }
    }

    /// Pointer released anywhere.
    pub fn pointer_up(&mut self) -> Option<PointerCapture> {
        self.end()
    }

    /// End the session if the dragged window stopped being draggable.
    pub fn sync(&mut self, windows: &StateManager) -> Option<PointerCapture> {
        let DragState::Dragging { window_id, .. } = self.state else {
            return None;
        };
        let still_draggable = windows
            .get(window_id)
            .is_some_and(|w| w.is_free_floating() && !w.minimized);
        if still_draggable {
            None
        } else {
            debug!(window = %window_id, "drag target changed layout, ending drag");
            self.end()
        }
    }

    fn end(&mut self) -> Option<PointerCapture> {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => None,
            DragState::Dragging { window_id, .. } => {
                debug!(window = %window_id, "drag ended");
                Some(PointerCapture::Release)
            }
        }
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}
