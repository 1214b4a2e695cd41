//! Core Window Management System
//!
//! The `WindowManager` owns the authoritative list of open windows, their
//! geometry and stacking order, and performs every window transition:
//! - open (registry lookup, plan gate, singleton and capacity policy, cascade placement)
//! - close, focus, minimize, maximize, restore
//! - raw move/resize commits coming from the interaction controllers
//!
//! Z-indexes come from a strictly increasing counter owned by the manager, so
//! two desktops never share allocation state. Operations on unknown ids are
//! silent no-ops: windows can disappear while gestures or animations that
//! reference them are still in flight.

use crate::config::{PlacementConfig, WindowConfig};
use crate::geometry::{self, Rect, Size, Viewport};
use crate::registry::{AppDescriptor, AppRegistry, PlanGate, Session};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Opaque window identifier, never reused within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(u64);

impl WindowId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "win-{}", self.0)
    }
}

/// One open instance of an application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub id: WindowId,
    pub app_id: String,
    pub title: String,
    pub rect: Rect,
    pub z_index: u64,
    pub minimized: bool,
    pub maximized: bool,

    /// Geometry right before maximizing, cleared on restore
    pub pre_maximize: Option<Rect>,

    /// Minimum size declared by the app, if any
    pub min_size: Option<Size>,
}

/// Snapshot of a closed window, enough to reopen it in place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedWindow {
    pub app_id: String,
    pub title: String,
    pub rect: Rect,
}

/// Why a launch did not create a window. The `Display` text is user-facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchRejection {
    #[error("\"{0}\" is not an installed application")]
    UnknownApp(String),

    #[error("{name} is not available on your current plan")]
    PlanLocked { app_id: String, name: String },

    #[error("Too many windows open ({limit}). Close or minimize one to continue")]
    CapacityReached { limit: usize },
}

/// Result of an open request. Rejections are policy outcomes, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum OpenOutcome {
    Opened(WindowId),
    FocusedExisting(WindowId),
    Rejected(LaunchRejection),
}

impl OpenOutcome {
    /// Window that ended up focused, if any
    pub fn window_id(&self) -> Option<WindowId> {
        match self {
            OpenOutcome::Opened(id) | OpenOutcome::FocusedExisting(id) => Some(*id),
            OpenOutcome::Rejected(_) => None,
        }
    }
}

pub struct WindowManager {
    window_config: WindowConfig,
    placement: PlacementConfig,

    registry: Arc<dyn AppRegistry>,
    gate: Arc<dyn PlanGate>,
    session: Session,

    /// Live viewport; every placement/clamp/maximize reads it afresh
    viewport: Viewport,

    /// Window tracking by ID
    windows: BTreeMap<WindowId, Window>,

    /// Next window ID
    next_window_id: u64,

    /// Last allocated z-index
    z_counter: u64,

    /// Number of cascade placements performed so far
    placements: u64,

    /// Currently focused window
    focused_window: Option<WindowId>,
}

impl fmt::Debug for WindowManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowManager")
            .field("viewport", &self.viewport)
            .field("windows", &self.windows.len())
            .field("z_counter", &self.z_counter)
            .field("focused_window", &self.focused_window)
            .finish()
    }
}

impl WindowManager {
    pub fn new(
        window_config: &WindowConfig,
        placement: &PlacementConfig,
        viewport: Viewport,
        registry: Arc<dyn AppRegistry>,
        gate: Arc<dyn PlanGate>,
        session: Session,
    ) -> Self {
        Self {
            window_config: window_config.clone(),
            placement: placement.clone(),
            registry,
            gate,
            session,
            viewport,
            windows: BTreeMap::new(),
            next_window_id: 1,
            z_counter: 0,
            placements: 0,
            focused_window: None,
        }
    }

    pub fn registry(&self) -> &Arc<dyn AppRegistry> {
        &self.registry
    }

    pub fn gate(&self) -> &Arc<dyn PlanGate> {
        &self.gate
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn set_session(&mut self, session: Session) {
        self.session = session;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Update the live viewport. Existing windows are left untouched.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        debug!(
            "Viewport changed to {}x{} (bands {}/{})",
            viewport.width, viewport.height, viewport.top_band, viewport.bottom_band
        );
        self.viewport = viewport;
    }

    pub fn work_area(&self) -> Rect {
        self.viewport.work_area()
    }

    /// Geometry a maximized window takes: the full viewport minus both bands
    pub fn maximize_target(&self) -> Rect {
        self.work_area()
    }

    /// Minimum size for a window: the app's own or the configured floor
    pub fn min_size_for(&self, window: &Window) -> Size {
        window.min_size.unwrap_or_else(|| self.window_config.min_size())
    }

    /// Launch an application through the full policy chain
    pub fn open_window(&mut self, app_id: &str) -> OpenOutcome {
        let Some(app) = self.registry.resolve(app_id) else {
            debug!("Refusing to open unknown app {}", app_id);
            return OpenOutcome::Rejected(LaunchRejection::UnknownApp(app_id.to_string()));
        };

        if self.gate.is_locked(&app, &self.session) {
            debug!("App {} is locked for plan {}", app_id, self.session.plan);
            return OpenOutcome::Rejected(LaunchRejection::PlanLocked {
                app_id: app.id.clone(),
                name: app.name.clone(),
            });
        }

        if let Some(outcome) = self.check_policy(&app, true) {
            return outcome;
        }

        let rect = self.cascade_rect(app.default_size);
        let id = self.insert_window(&app, app.name.clone(), rect, false);
        OpenOutcome::Opened(id)
    }

    /// Reopen a window at an exact geometry, bypassing the cascade. The plan
    /// gate is not consulted again; singleton and capacity policy still apply.
    pub fn open_window_at(&mut self, app_id: &str, title: &str, rect: Rect) -> OpenOutcome {
        self.reopen_at(app_id, title, rect, false)
    }

    /// Like `open_window_at`, but the window starts minimized and keeps the
    /// current focus. Minimized windows do not count against the limit, so
    /// only the singleton rule applies.
    pub fn open_minimized_at(&mut self, app_id: &str, title: &str, rect: Rect) -> OpenOutcome {
        self.reopen_at(app_id, title, rect, true)
    }

    fn reopen_at(&mut self, app_id: &str, title: &str, rect: Rect, minimized: bool) -> OpenOutcome {
        let Some(app) = self.registry.resolve(app_id) else {
            return OpenOutcome::Rejected(LaunchRejection::UnknownApp(app_id.to_string()));
        };

        if let Some(outcome) = self.check_policy(&app, !minimized) {
            return outcome;
        }

        let area = self.work_area();
        let rect = geometry::clamp_to_area(rect, &area, 0);
        let id = self.insert_window(&app, title.to_string(), rect, minimized);
        OpenOutcome::Opened(id)
    }

    /// Singleton and capacity checks shared by every open path
    fn check_policy(
        &mut self,
        app: &AppDescriptor,
        counts_toward_limit: bool,
    ) -> Option<OpenOutcome> {
        if app.singleton {
            if let Some(existing) = self.find_by_app(&app.id) {
                debug!("Singleton app {} already open as {}", app.id, existing);
                self.focus_window(existing);
                return Some(OpenOutcome::FocusedExisting(existing));
            }
        }

        let limit = self.window_config.max_open_windows;
        if counts_toward_limit && self.visible_count() >= limit {
            debug!("Window limit {} reached, refusing {}", limit, app.id);
            return Some(OpenOutcome::Rejected(LaunchRejection::CapacityReached { limit }));
        }

        None
    }

    /// Next cascade slot, with the size clamped before the position
    fn cascade_rect(&mut self, default_size: Size) -> Rect {
        let area = self.work_area();
        let offset = geometry::cascade_offset(
            self.placements,
            self.placement.cascade_step,
            self.placement.cascade_wrap,
        );
        self.placements += 1;

        let size = geometry::clamp_size(default_size, &area, self.placement.size_margin);
        let x = self.placement.origin_x.saturating_add(offset);
        let y = area.y.saturating_add(self.placement.origin_y).saturating_add(offset);
        geometry::clamp_position(Rect::from_loc_and_size((x, y), size), &area)
    }

    fn insert_window(
        &mut self,
        app: &AppDescriptor,
        title: String,
        rect: Rect,
        minimized: bool,
    ) -> WindowId {
        let id = WindowId(self.next_window_id);
        self.next_window_id += 1;

        let z_index = self.allocate_z();
        self.windows.insert(
            id,
            Window {
                id,
                app_id: app.id.clone(),
                title,
                rect,
                z_index,
                minimized,
                maximized: false,
                pre_maximize: None,
                min_size: app.min_size,
            },
        );
        if !minimized {
            self.focused_window = Some(id);
        }

        debug!(
            "Opened window {} for {} at ({}, {}) {}x{} z={}",
            id, app.id, rect.x, rect.y, rect.width, rect.height, z_index
        );
        id
    }

    fn allocate_z(&mut self) -> u64 {
        self.z_counter += 1;
        self.z_counter
    }

    /// Remove a window, returning what is needed to reopen it
    pub fn close_window(&mut self, id: WindowId) -> Option<ClosedWindow> {
        let window = self.windows.remove(&id)?;
        if self.focused_window == Some(id) {
            self.focused_window = None;
        }
        debug!("Closed window {}", id);
        Some(ClosedWindow {
            app_id: window.app_id,
            title: window.title,
            rect: window.rect,
        })
    }

    /// Raise and focus a window. Already-focused windows keep their z-index.
    pub fn focus_window(&mut self, id: WindowId) -> bool {
        if !self.windows.contains_key(&id) {
            return false;
        }
        if self.focused_window == Some(id) {
            return true;
        }

        let z_index = self.allocate_z();
        if let Some(window) = self.windows.get_mut(&id) {
            window.z_index = z_index;
        }
        self.focused_window = Some(id);
        debug!("Focused window {} (z={})", id, z_index);
        true
    }

    /// Minimize a window. Focus is left for the caller to reassign.
    pub fn minimize_window(&mut self, id: WindowId) -> bool {
        match self.windows.get_mut(&id) {
            Some(window) => {
                window.minimized = true;
                debug!("Minimized window {}", id);
                true
            }
            None => false,
        }
    }

    /// Maximize a window to `target`, remembering where it came from
    pub fn maximize_window(&mut self, id: WindowId, target: Rect) -> bool {
        match self.windows.get_mut(&id) {
            Some(window) => {
                if !window.maximized {
                    window.pre_maximize = Some(window.rect);
                    window.maximized = true;
                    window.rect = target;
                    debug!("Maximized window {}", id);
                }
                true
            }
            None => false,
        }
    }

    /// Restore a window. A minimized window is un-minimized first (keeping a
    /// maximized layout); otherwise a maximized window returns to its
    /// pre-maximize geometry.
    pub fn restore_window(&mut self, id: WindowId) -> bool {
        let Some(window) = self.windows.get_mut(&id) else {
            return false;
        };

        if window.minimized {
            window.minimized = false;
            debug!("Restored window {} from minimized", id);
        } else if window.maximized {
            if let Some(saved) = window.pre_maximize.take() {
                window.rect = saved;
            }
            window.maximized = false;
            debug!("Restored window {} from maximized", id);
        }
        true
    }

    /// Commit a new position. No clamping happens here.
    pub fn move_window(&mut self, id: WindowId, x: i32, y: i32) -> bool {
        match self.windows.get_mut(&id) {
            Some(window) => {
                window.rect.x = x;
                window.rect.y = y;
                debug!("Moved window {} to ({}, {})", id, x, y);
                true
            }
            None => false,
        }
    }

    /// Commit a new size, and optionally a new origin. No clamping happens here.
    pub fn resize_window(
        &mut self,
        id: WindowId,
        width: u32,
        height: u32,
        origin: Option<(i32, i32)>,
    ) -> bool {
        match self.windows.get_mut(&id) {
            Some(window) => {
                window.rect.width = width;
                window.rect.height = height;
                if let Some((x, y)) = origin {
                    window.rect.x = x;
                    window.rect.y = y;
                }
                debug!("Resized window {} to {}x{}", id, width, height);
                true
            }
            None => false,
        }
    }

    /// Get a window by ID
    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    /// All windows, bottom to top
    pub fn windows(&self) -> Vec<&Window> {
        let mut windows: Vec<&Window> = self.windows.values().collect();
        windows.sort_by_key(|w| w.z_index);
        windows
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Number of windows counting against the capacity limit
    pub fn visible_count(&self) -> usize {
        self.windows.values().filter(|w| !w.minimized).count()
    }

    /// Get the currently focused window id
    pub fn focused_window_id(&self) -> Option<WindowId> {
        self.focused_window
    }

    /// Leave no window focused
    pub fn clear_focus(&mut self) {
        self.focused_window = None;
    }

    pub fn focused_window(&self) -> Option<&Window> {
        self.focused_window.and_then(|id| self.windows.get(&id))
    }

    /// Top-most window that is not minimized
    pub fn topmost_visible(&self) -> Option<WindowId> {
        self.windows
            .values()
            .filter(|w| !w.minimized)
            .max_by_key(|w| w.z_index)
            .map(|w| w.id)
    }

    /// First window (by id) running `app_id`
    pub fn find_by_app(&self, app_id: &str) -> Option<WindowId> {
        self.windows
            .values()
            .find(|w| w.app_id == app_id)
            .map(|w| w.id)
    }

    /// Ids of the distinct apps with at least one window, in first-open order
    pub fn running_apps(&self) -> Vec<String> {
        let mut apps: Vec<String> = Vec::new();
        for window in self.windows.values() {
            if !apps.contains(&window.app_id) {
                apps.push(window.app_id.clone());
            }
        }
        apps
    }

    pub fn shutdown(&mut self) {
        self.windows.clear();
        self.focused_window = None;
    }
}
