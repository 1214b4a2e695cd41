//! Edge and corner resize sessions
//!
//! Every intermediate frame enforces the window's minimum size and keeps the
//! moving edges inside the work area. The edge opposite a handle never moves.

use crate::geometry::{Point, Rect, Size, Viewport};
use crate::window::{Window, WindowId};
use log::debug;
use serde::{Deserialize, Serialize};

/// Which edges a resize handle drags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeHandle {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ResizeHandle {
    pub fn moves_left(self) -> bool {
        matches!(self, ResizeHandle::West | ResizeHandle::NorthWest | ResizeHandle::SouthWest)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, ResizeHandle::East | ResizeHandle::NorthEast | ResizeHandle::SouthEast)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, ResizeHandle::North | ResizeHandle::NorthEast | ResizeHandle::NorthWest)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, ResizeHandle::South | ResizeHandle::SouthEast | ResizeHandle::SouthWest)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ResizeSession {
    window_id: WindowId,
    handle: ResizeHandle,
    start_pointer: Point,
    start_rect: Rect,
    min: Size,
    live: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeCommit {
    pub window_id: WindowId,
    pub rect: Rect,
}

#[derive(Debug, Clone, Default)]
pub struct ResizeController {
    session: Option<ResizeSession>,
}

/// Resize one axis. Returns the new `(start, length)`.
///
/// The minimum length wins over the work-area bound when the two conflict.
fn resize_axis(
    start: i64,
    len: i64,
    delta: i64,
    bounds: (i64, i64),
    min: i64,
    moves_start: bool,
    moves_end: bool,
) -> (i64, i64) {
    let (lo, hi) = bounds;
    if moves_end {
        let end = (start + len + delta).min(hi).max(start + min);
        (start, end - start)
    } else if moves_start {
        let end = start + len;
        let new_start = (start + delta).max(lo).min(end - min);
        (new_start, end - new_start)
    } else {
        (start, len)
    }
}

impl ResizeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn live_rect(&self) -> Option<Rect> {
        self.session.as_ref().map(|s| s.live)
    }

    pub fn handle(&self) -> Option<ResizeHandle> {
        self.session.as_ref().map(|s| s.handle)
    }

    /// Start resizing from `handle`. Maximized windows cannot be resized.
    pub fn begin(&mut self, window: &Window, handle: ResizeHandle, pointer: Point, min: Size) -> bool {
        if window.maximized || self.session.is_some() {
            return false;
        }

        debug!("Starting {:?} resize for window {}", handle, window.id);
        self.session = Some(ResizeSession {
            window_id: window.id,
            handle,
            start_pointer: pointer,
            start_rect: window.rect,
            min: Size::new(min.width.max(1), min.height.max(1)),
            live: window.rect,
        });
        true
    }

    /// Apply a pointer move and return the clamped live geometry
    pub fn update(&mut self, pointer: Point, viewport: &Viewport) -> Option<Rect> {
        let session = self.session.as_mut()?;
        let area = viewport.work_area();
        let handle = session.handle;
        let start = session.start_rect;

        let dx = (pointer.x - session.start_pointer.x).round() as i64;
        let dy = (pointer.y - session.start_pointer.y).round() as i64;

        let (x, width) = resize_axis(
            start.x as i64,
            start.width as i64,
            dx,
            (area.x as i64, area.right()),
            session.min.width as i64,
            handle.moves_left(),
            handle.moves_right(),
        );
        let (y, height) = resize_axis(
            start.y as i64,
            start.height as i64,
            dy,
            (area.y as i64, area.bottom()),
            session.min.height as i64,
            handle.moves_top(),
            handle.moves_bottom(),
        );

        session.live = Rect::new(x as i32, y as i32, width.max(0) as u32, height.max(0) as u32);
        Some(session.live)
    }

    /// Finish on pointer-up, yielding the full geometry to commit
    pub fn end(&mut self) -> Option<ResizeCommit> {
        let session = self.session.take()?;
        debug!(
            "Resize of window {} ended at {}x{}",
            session.window_id, session.live.width, session.live.height
        );
        Some(ResizeCommit {
            window_id: session.window_id,
            rect: session.live,
        })
    }

    /// Abandon the resize, returning the pre-gesture geometry
    pub fn cancel(&mut self) -> Option<Rect> {
        self.session.take().map(|s| s.start_rect)
    }
}
