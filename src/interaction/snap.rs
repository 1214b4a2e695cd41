//! Snap zone resolution during drags
//!
//! Maps the pointer to a screen region near the viewport edges. The geometry
//! of each zone is recomputed from the live viewport on every call.

use crate::config::SnapConfig;
use crate::geometry::{Point, Rect, Viewport};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnapZone {
    LeftHalf,
    RightHalf,
    Maximize,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl SnapZone {
    /// Target geometry of this zone inside the work area of `viewport`
    pub fn geometry(self, viewport: &Viewport) -> Rect {
        let area = viewport.work_area();
        let left_w = area.width / 2;
        let right_w = area.width - left_w;
        let top_h = area.height / 2;
        let bottom_h = area.height - top_h;
        let mid_x = area.x + left_w as i32;
        let mid_y = area.y + top_h as i32;

        match self {
            SnapZone::LeftHalf => Rect::new(area.x, area.y, left_w, area.height),
            SnapZone::RightHalf => Rect::new(mid_x, area.y, right_w, area.height),
            SnapZone::Maximize => area,
            SnapZone::TopLeft => Rect::new(area.x, area.y, left_w, top_h),
            SnapZone::TopRight => Rect::new(mid_x, area.y, right_w, top_h),
            SnapZone::BottomLeft => Rect::new(area.x, mid_y, left_w, bottom_h),
            SnapZone::BottomRight => Rect::new(mid_x, mid_y, right_w, bottom_h),
        }
    }
}

/// Active zone for one drag session
#[derive(Debug, Clone)]
pub struct SnapZoneResolver {
    config: SnapConfig,
    active: Option<SnapZone>,
}

impl SnapZoneResolver {
    pub fn new(config: &SnapConfig) -> Self {
        Self {
            config: config.clone(),
            active: None,
        }
    }

    pub fn active(&self) -> Option<SnapZone> {
        self.active
    }

    /// Pure mapping from a pointer position to a zone
    pub fn zone_at(&self, pointer: Point, viewport: &Viewport) -> Option<SnapZone> {
        if !self.config.enabled {
            return None;
        }

        let area = viewport.work_area();
        let threshold = self.config.threshold;
        let corner = self.config.corner_size;

        let near_left = pointer.x <= area.x as f64 + threshold;
        let near_right = pointer.x >= area.right() as f64 - threshold;
        let near_top = pointer.y <= area.y as f64 + threshold;
        let in_top_corner = pointer.y <= area.y as f64 + corner;
        let in_bottom_corner = pointer.y >= area.bottom() as f64 - corner;

        let zone = match (near_left, near_right) {
            (true, _) if in_top_corner => SnapZone::TopLeft,
            (true, _) if in_bottom_corner => SnapZone::BottomLeft,
            (true, _) => SnapZone::LeftHalf,
            (_, true) if in_top_corner => SnapZone::TopRight,
            (_, true) if in_bottom_corner => SnapZone::BottomRight,
            (_, true) => SnapZone::RightHalf,
            _ if near_top => SnapZone::Maximize,
            _ => return None,
        };
        Some(zone)
    }

    /// Feed a pointer position; returns the zone now active
    pub fn update(&mut self, pointer: Point, viewport: &Viewport) -> Option<SnapZone> {
        self.active = self.zone_at(pointer, viewport);
        self.active
    }

    /// Geometry the active zone would commit, for the drag preview overlay
    pub fn preview(&self, viewport: &Viewport) -> Option<Rect> {
        self.active.map(|zone| zone.geometry(viewport))
    }

    /// Take the active zone and its geometry, leaving no zone active
    pub fn commit(&mut self, viewport: &Viewport) -> Option<(SnapZone, Rect)> {
        self.active.take().map(|zone| (zone, zone.geometry(viewport)))
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(1280, 800, 28, 64)
    }

    fn resolver() -> SnapZoneResolver {
        SnapZoneResolver::new(&SnapConfig::default())
    }

    #[test]
    fn test_zone_geometry() {
        let vp = viewport();
        assert_eq!(SnapZone::LeftHalf.geometry(&vp), Rect::new(0, 28, 640, 708));
        assert_eq!(SnapZone::RightHalf.geometry(&vp), Rect::new(640, 28, 640, 708));
        assert_eq!(SnapZone::Maximize.geometry(&vp), Rect::new(0, 28, 1280, 708));
        assert_eq!(SnapZone::TopLeft.geometry(&vp), Rect::new(0, 28, 640, 354));
        assert_eq!(SnapZone::BottomRight.geometry(&vp), Rect::new(640, 382, 640, 354));
    }

    #[test]
    fn test_odd_dimensions_cover_whole_area() {
        let vp = Viewport::new(1001, 501, 0, 0);
        let left = SnapZone::LeftHalf.geometry(&vp);
        let right = SnapZone::RightHalf.geometry(&vp);
        assert_eq!(left.width + right.width, 1001);
        assert_eq!(right.right(), 1001);
    }

    #[test]
    fn test_edges_map_to_zones() {
        let r = resolver();
        let vp = viewport();
        assert_eq!(r.zone_at(Point::new(5.0, 400.0), &vp), Some(SnapZone::LeftHalf));
        assert_eq!(r.zone_at(Point::new(1275.0, 400.0), &vp), Some(SnapZone::RightHalf));
        assert_eq!(r.zone_at(Point::new(640.0, 30.0), &vp), Some(SnapZone::Maximize));
        assert_eq!(r.zone_at(Point::new(3.0, 40.0), &vp), Some(SnapZone::TopLeft));
        assert_eq!(r.zone_at(Point::new(1279.0, 40.0), &vp), Some(SnapZone::TopRight));
        assert_eq!(r.zone_at(Point::new(3.0, 730.0), &vp), Some(SnapZone::BottomLeft));
        assert_eq!(r.zone_at(Point::new(1279.0, 730.0), &vp), Some(SnapZone::BottomRight));
        assert_eq!(r.zone_at(Point::new(640.0, 400.0), &vp), None);
    }

    #[test]
    fn test_disabled_resolver_never_snaps() {
        let r = SnapZoneResolver::new(&SnapConfig {
            enabled: false,
            ..SnapConfig::default()
        });
        assert_eq!(r.zone_at(Point::new(0.0, 400.0), &viewport()), None);
    }

    #[test]
    fn test_commit_clears_active_zone() {
        let mut r = resolver();
        let vp = viewport();
        r.update(Point::new(2.0, 400.0), &vp);
        assert_eq!(r.preview(&vp), Some(Rect::new(0, 28, 640, 708)));

        let committed = r.commit(&vp);
        assert_eq!(committed, Some((SnapZone::LeftHalf, Rect::new(0, 28, 640, 708))));
        assert_eq!(r.active(), None);
        assert_eq!(r.commit(&vp), None);
    }

    #[test]
    fn test_geometry_follows_viewport_changes() {
        let mut r = resolver();
        r.update(Point::new(2.0, 400.0), &viewport());
        let resized = Viewport::new(1000, 700, 28, 64);
        assert_eq!(r.preview(&resized), Some(Rect::new(0, 28, 500, 608)));
    }
}
