//! Split-pane layout: the draggable divider between the question flow and
//! the chat pane.

/// Narrowest the chat pane may be dragged.
pub const MIN_PANE_WIDTH: u32 = 300;
/// Widest the chat pane may be dragged.
pub const MAX_PANE_WIDTH: u32 = 800;
/// Width before any drag.
pub const INITIAL_PANE_WIDTH: u32 = 400;

/// Tracks a divider drag and derives the right-hand pane width.
///
/// Width is measured from the right edge of the container, so the pane grows
/// as the pointer moves left. Nothing persists across instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneResizer {
    width: u32,
    dragging: bool,
}

impl Default for PaneResizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PaneResizer {
    pub fn new() -> Self {
        Self {
            width: INITIAL_PANE_WIDTH,
            dragging: false,
        }
    }

    pub fn pointer_down(&mut self) {
        self.dragging = true;
    }

    /// Updates the width while a drag is active; ignored otherwise.
    ///
    /// Returns the width after the move.
    pub fn pointer_move(&mut self, container_width: i64, pointer_x: i64) -> u32 {
        if self.dragging {
            let proposed = container_width.saturating_sub(pointer_x);
            self.width =
                proposed.clamp(i64::from(MIN_PANE_WIDTH), i64::from(MAX_PANE_WIDTH)) as u32;
        }
        self.width
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
}
