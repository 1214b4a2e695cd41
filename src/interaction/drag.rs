//! Title-bar drag sessions
//!
//! Pointer movement updates a live rectangle owned by the controller; the
//! window manager only sees the final commit on pointer-up.

use crate::geometry::{self, Point, Rect, Viewport};
use crate::interaction::snap::{SnapZone, SnapZoneResolver};
use crate::window::{Window, WindowId};
use log::debug;

#[derive(Debug, Clone, PartialEq)]
struct DragSession {
    window_id: WindowId,
    start_pointer: Point,
    start_rect: Rect,
    live: Rect,
}

/// Final geometry of a drag. `snap` is set when the drop landed in a zone, in
/// which case `rect` carries the zone's position and size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragCommit {
    pub window_id: WindowId,
    pub rect: Rect,
    pub snap: Option<SnapZone>,
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Position shown while dragging, bypassing the window manager
    pub fn live_rect(&self) -> Option<Rect> {
        self.session.as_ref().map(|s| s.live)
    }

    /// Start dragging on pointer-down. Maximized windows cannot be dragged.
    pub fn begin(&mut self, window: &Window, pointer: Point) -> bool {
        if window.maximized || self.session.is_some() {
            return false;
        }

        debug!("Starting drag for window {} at ({:.1}, {:.1})", window.id, pointer.x, pointer.y);
        self.session = Some(DragSession {
            window_id: window.id,
            start_pointer: pointer,
            start_rect: window.rect,
            live: window.rect,
        });
        true
    }

    /// Apply a pointer move: translate by the pointer delta, keep the window
    /// inside the work area, and let the resolver track the pointer.
    pub fn update(
        &mut self,
        pointer: Point,
        viewport: &Viewport,
        snap: &mut SnapZoneResolver,
    ) -> Option<Rect> {
        let session = self.session.as_mut()?;

        let dx = (pointer.x - session.start_pointer.x).round() as i64;
        let dy = (pointer.y - session.start_pointer.y).round() as i64;
        let moved = Rect {
            x: (session.start_rect.x as i64 + dx).clamp(i32::MIN as i64, i32::MAX as i64) as i32,
            y: (session.start_rect.y as i64 + dy).clamp(i32::MIN as i64, i32::MAX as i64) as i32,
            ..session.start_rect
        };
        session.live = geometry::clamp_position(moved, &viewport.work_area());

        snap.update(pointer, viewport);
        Some(session.live)
    }

    /// Finish on pointer-up
    pub fn end(&mut self, viewport: &Viewport, snap: &mut SnapZoneResolver) -> Option<DragCommit> {
        let session = self.session.take()?;

        let commit = match snap.commit(viewport) {
            Some((zone, rect)) => DragCommit {
                window_id: session.window_id,
                rect,
                snap: Some(zone),
            },
            None => DragCommit {
                window_id: session.window_id,
                rect: session.live,
                snap: None,
            },
        };

        debug!(
            "Drag of window {} ended at ({}, {}) snap={:?}",
            commit.window_id, commit.rect.x, commit.rect.y, commit.snap
        );
        Some(commit)
    }

    /// Abandon the drag. Returns the pre-drag geometry so the view can snap
    /// back; nothing was committed, so the window manager needs no update.
    pub fn cancel(&mut self, snap: &mut SnapZoneResolver) -> Option<Rect> {
        let session = self.session.take()?;
        snap.clear();
        debug!("Drag of window {} cancelled", session.window_id);
        Some(session.start_rect)
    }
}
