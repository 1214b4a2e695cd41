//! Dock model and the dock anchor registry
//!
//! The dock lays its icons out in the bottom band and publishes each icon's
//! rectangle into the `DockAnchorRegistry`. Minimize/restore animations read
//! those rectangles through the `AnchorLookup` trait and never talk to the
//! dock directly.

use crate::config::DockConfig;
use crate::geometry::{Rect, Viewport};
use log::debug;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// On-screen rectangle of one dock icon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockAnchor {
    pub app_id: String,
    pub rect: Rect,
}

/// Read side of the anchor registry
#[cfg_attr(test, mockall::automock)]
pub trait AnchorLookup {
    fn anchor(&self, app_id: &str) -> Option<Rect>;
}

/// Shared map from app id to its current dock icon rectangle.
///
/// Cloning yields another handle onto the same map. Only the dock layout step
/// writes; everything else reads.
#[derive(Debug, Clone, Default)]
pub struct DockAnchorRegistry {
    anchors: Arc<RwLock<HashMap<String, Rect>>>,
}

impl DockAnchorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, app_id: &str, rect: Rect) {
        self.anchors.write().insert(app_id.to_string(), rect);
    }

    pub fn remove(&self, app_id: &str) -> Option<Rect> {
        self.anchors.write().remove(app_id)
    }

    /// Replace every anchor at once, as a fresh layout pass does
    pub fn replace_all(&self, anchors: &[DockAnchor]) {
        let mut map = self.anchors.write();
        map.clear();
        for anchor in anchors {
            map.insert(anchor.app_id.clone(), anchor.rect);
        }
    }

    pub fn get(&self, app_id: &str) -> Option<Rect> {
        self.anchors.read().get(app_id).copied()
    }

    pub fn len(&self) -> usize {
        self.anchors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.read().is_empty()
    }
}

impl AnchorLookup for DockAnchorRegistry {
    fn anchor(&self, app_id: &str) -> Option<Rect> {
        self.get(app_id)
    }
}

/// Pinned items plus whatever is running
#[derive(Debug, Clone)]
pub struct Dock {
    config: DockConfig,
    pinned: Vec<String>,
}

impl Dock {
    pub fn new(config: &DockConfig) -> Self {
        let mut dock = Self {
            config: config.clone(),
            pinned: Vec::new(),
        };
        dock.set_pinned(config.default_pinned.clone());
        dock
    }

    pub fn pinned(&self) -> &[String] {
        &self.pinned
    }

    /// Replace the pinned list, dropping duplicates but keeping first order
    pub fn set_pinned(&mut self, items: Vec<String>) {
        self.pinned.clear();
        for item in items {
            if !self.pinned.contains(&item) {
                self.pinned.push(item);
            }
        }
    }

    /// Returns false if the app was already pinned
    pub fn pin(&mut self, app_id: &str) -> bool {
        if self.is_pinned(app_id) {
            return false;
        }
        self.pinned.push(app_id.to_string());
        debug!("Pinned {} to the dock", app_id);
        true
    }

    pub fn unpin(&mut self, app_id: &str) -> bool {
        let before = self.pinned.len();
        self.pinned.retain(|id| id != app_id);
        self.pinned.len() != before
    }

    pub fn is_pinned(&self, app_id: &str) -> bool {
        self.pinned.iter().any(|id| id == app_id)
    }

    /// Move a pinned item to `index` (clamped to the list)
    pub fn reorder(&mut self, app_id: &str, index: usize) -> bool {
        let Some(current) = self.pinned.iter().position(|id| id == app_id) else {
            return false;
        };
        let item = self.pinned.remove(current);
        let index = index.min(self.pinned.len());
        self.pinned.insert(index, item);
        true
    }

    /// Icons shown: pinned apps first, then running apps that are not pinned
    pub fn items(&self, running: &[String]) -> Vec<String> {
        let mut items = self.pinned.clone();
        for app in running {
            if !items.contains(app) {
                items.push(app.clone());
            }
        }
        items
    }

    /// Centre the icons horizontally inside the bottom band
    pub fn layout(&self, running: &[String], viewport: &Viewport) -> Vec<DockAnchor> {
        let items = self.items(running);
        if items.is_empty() {
            return Vec::new();
        }

        let size = self.config.icon_size;
        let gap = self.config.icon_gap;
        let count = items.len() as i64;
        let total = count * size as i64 + (count - 1) * gap as i64;
        let start_x = (viewport.width as i64 - total) / 2;

        let band_top = viewport.height.saturating_sub(viewport.bottom_band) as i64;
        let y = band_top + (viewport.bottom_band as i64 - size as i64) / 2;

        items
            .into_iter()
            .enumerate()
            .map(|(i, app_id)| DockAnchor {
                app_id,
                rect: Rect::new(
                    (start_x + i as i64 * (size + gap) as i64) as i32,
                    y as i32,
                    size,
                    size,
                ),
            })
            .collect()
    }
}
