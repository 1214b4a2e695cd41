//! Pointer interaction: drag, resize and snap
//!
//! Each window gets its own `WindowInteraction`, which owns one drag
//! controller, one resize controller and one snap resolver. A window can run
//! at most one gesture at a time; different windows are independent.

pub mod drag;
pub mod resize;
pub mod snap;

pub use drag::{DragCommit, DragController};
pub use resize::{ResizeCommit, ResizeController, ResizeHandle};
pub use snap::{SnapZone, SnapZoneResolver};

use crate::config::SnapConfig;
use crate::geometry::{Point, Rect, Size, Viewport};
use crate::window::Window;
use serde::{Deserialize, Serialize};

/// Part of a window the pointer went down on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "handle")]
pub enum PointerTarget {
    TitleBar,
    Resize(ResizeHandle),
    Content,
}

/// Gesture a window is currently running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize(ResizeHandle),
}

/// Geometry produced when a gesture finishes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureCommit {
    Drag(DragCommit),
    Resize(ResizeCommit),
}

/// Gesture state for a single window
#[derive(Debug, Clone)]
pub struct WindowInteraction {
    drag: DragController,
    resize: ResizeController,
    snap: SnapZoneResolver,
}

impl WindowInteraction {
    pub fn new(snap_config: &SnapConfig) -> Self {
        Self {
            drag: DragController::new(),
            resize: ResizeController::new(),
            snap: SnapZoneResolver::new(snap_config),
        }
    }

    pub fn active(&self) -> Option<GestureKind> {
        if self.drag.is_active() {
            Some(GestureKind::Drag)
        } else {
            self.resize.handle().map(GestureKind::Resize)
        }
    }

    pub fn is_active(&self) -> bool {
        self.active().is_some()
    }

    /// Start the gesture matching `target`. Content presses start nothing.
    pub fn begin(&mut self, window: &Window, target: PointerTarget, pointer: Point, min: Size) -> bool {
        if self.is_active() {
            return false;
        }
        match target {
            PointerTarget::TitleBar => self.drag.begin(window, pointer),
            PointerTarget::Resize(handle) => self.resize.begin(window, handle, pointer, min),
            PointerTarget::Content => false,
        }
    }

    pub fn update(&mut self, pointer: Point, viewport: &Viewport) -> Option<Rect> {
        match self.active()? {
            GestureKind::Drag => self.drag.update(pointer, viewport, &mut self.snap),
            GestureKind::Resize(_) => self.resize.update(pointer, viewport),
        }
    }

    /// Geometry to render while the gesture runs
    pub fn live_rect(&self) -> Option<Rect> {
        self.drag.live_rect().or_else(|| self.resize.live_rect())
    }

    /// Snap preview for an active drag
    pub fn snap_preview(&self, viewport: &Viewport) -> Option<Rect> {
        if self.drag.is_active() {
            self.snap.preview(viewport)
        } else {
            None
        }
    }

    pub fn end(&mut self, viewport: &Viewport) -> Option<GestureCommit> {
        match self.active()? {
            GestureKind::Drag => self.drag.end(viewport, &mut self.snap).map(GestureCommit::Drag),
            GestureKind::Resize(_) => self.resize.end().map(GestureCommit::Resize),
        }
    }

    /// Abandon the gesture, returning the geometry the window had before it
    pub fn cancel(&mut self) -> Option<Rect> {
        match self.active()? {
            GestureKind::Drag => self.drag.cancel(&mut self.snap),
            GestureKind::Resize(_) => self.resize.cancel(),
        }
    }
}
