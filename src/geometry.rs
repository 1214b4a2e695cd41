//! Geometry primitives and the pure clamp/placement helpers
//!
//! Everything here is a pure function of its inputs. The viewport is passed
//! in on every call so nothing derived from it survives a resize.

use serde::{Deserialize, Serialize};

/// Rectangle for window positioning and sizing, in device-independent pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_loc_and_size((x, y): (i32, i32), size: Size) -> Self {
        Self::new(x, y, size.width, size.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// True when `other` lies entirely inside `self`
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x as f64 && y >= self.y as f64 && x < self.right() as f64 && y < self.bottom() as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Pointer position in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Live browser viewport plus the two reserved bands (menu bar on top, dock at
/// the bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub top_band: u32,
    pub bottom_band: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32, top_band: u32, bottom_band: u32) -> Self {
        Self {
            width,
            height,
            top_band,
            bottom_band,
        }
    }

    /// The area windows may occupy: the full width, minus both bands vertically
    pub fn work_area(&self) -> Rect {
        let reserved = self.top_band.saturating_add(self.bottom_band);
        Rect::new(
            0,
            self.top_band as i32,
            self.width,
            self.height.saturating_sub(reserved),
        )
    }
}

/// Cascade offset for the `slot`-th placement, wrapping after `wrap` steps so
/// successive windows never walk off-screen.
pub fn cascade_offset(slot: u64, step: u32, wrap: u32) -> i32 {
    let wrap = wrap.max(1) as u64;
    i32::try_from((slot % wrap) * step as u64).unwrap_or(i32::MAX)
}

/// Shrink `size` so it fits inside `area` with `margin` pixels on every side.
/// Never returns a zero dimension.
pub fn clamp_size(size: Size, area: &Rect, margin: u32) -> Size {
    let max_w = area.width.saturating_sub(margin.saturating_mul(2)).max(1);
    let max_h = area.height.saturating_sub(margin.saturating_mul(2)).max(1);
    Size::new(size.width.clamp(1, max_w), size.height.clamp(1, max_h))
}

/// Translate `rect` so that it lies entirely inside `area`. A rectangle larger
/// than the area is pinned to the area's top-left corner.
pub fn clamp_position(rect: Rect, area: &Rect) -> Rect {
    let max_x = (area.right() - rect.width as i64).max(area.x as i64);
    let max_y = (area.bottom() - rect.height as i64).max(area.y as i64);
    let x = (rect.x as i64).clamp(area.x as i64, max_x) as i32;
    let y = (rect.y as i64).clamp(area.y as i64, max_y) as i32;
    Rect { x, y, ..rect }
}

/// Size clamp followed by position clamp, the order initial placement uses
pub fn clamp_to_area(rect: Rect, area: &Rect, margin: u32) -> Rect {
    let size = clamp_size(rect.size(), area, margin);
    clamp_position(Rect::from_loc_and_size((rect.x, rect.y), size), area)
}

/// Raise `size` to at least `min` on both axes
pub fn enforce_min_size(size: Size, min: Size) -> Size {
    Size::new(size.width.max(min.width), size.height.max(min.height))
}

/// Linear interpolation between two rectangles, `t` in `[0, 1]`
pub fn lerp_rect(from: &Rect, to: &Rect, t: f32) -> Rect {
    let t = t.clamp(0.0, 1.0) as f64;
    let mix = |a: f64, b: f64| a + (b - a) * t;
    Rect {
        x: mix(from.x as f64, to.x as f64).round() as i32,
        y: mix(from.y as f64, to.y as f64).round() as i32,
        width: mix(from.width as f64, to.width as f64).round().max(0.0) as u32,
        height: mix(from.height as f64, to.height as f64).round().max(0.0) as u32,
    }
}
