//! Desktop shell orchestration
//!
//! `Desktop` wires the window manager to everything around it: the dock and
//! its anchor registry, the minimize/restore animations, per-window pointer
//! gestures, the undo slot, user-facing advisories and workspace persistence.
//! Shell policy lives here (what gets focused after a close, when the dock is
//! laid out again); the window manager itself stays policy-free beyond launch
//! rules.

use crate::animation::{AnimationController, AnimationPhase, AnimationSettings};
use crate::config::CanopyConfig;
use crate::dock::{Dock, DockAnchorRegistry};
use crate::geometry::{Point, Rect, Viewport};
use crate::interaction::{GestureCommit, PointerTarget, SnapZone, WindowInteraction};
use crate::launcher::{self, SearchHit};
use crate::registry::{AppRegistry, PlanGate, TierGate};
use crate::undo::{RedoFn, UndoStack, UndoToast};
use crate::window::{ClosedWindow, LaunchRejection, OpenOutcome, Window, WindowId, WindowManager};
use crate::workspace::{WorkspaceSnapshot, WorkspaceStore};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Short-lived message shown to the user, e.g. a refused launch
#[derive(Debug, Clone, PartialEq)]
pub struct Advisory {
    pub message: String,
    pub raised_at: Instant,
}

/// One window as it should be drawn on a given frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderItem {
    pub window_id: WindowId,
    pub app_id: String,
    pub title: String,
    pub rect: Rect,
    pub z_index: u64,
    pub focused: bool,
    pub phase: AnimationPhase,
    pub scale: f32,
    pub opacity: f32,

    /// Snap zone outline while this window is being dragged over one
    pub snap_preview: Option<Rect>,
}

/// Serializable summary of the whole desktop
#[derive(Debug, Clone, Serialize)]
pub struct DesktopState {
    pub viewport: Viewport,
    pub wallpaper: String,
    pub pinned: Vec<String>,
    pub focused: Option<WindowId>,
    pub windows: Vec<Window>,
    pub render: Vec<RenderItem>,
    pub advisories: Vec<String>,
    pub undo: Option<String>,
}

/// Result of reopening a closed window. A refusal hands the snapshot back so
/// the undo entry can be offered again.
type Reopen = Result<WindowId, (LaunchRejection, ClosedWindow)>;

fn reopen(closed: ClosedWindow) -> RedoFn<WindowManager, Reopen> {
    Box::new(move |wm: &mut WindowManager| {
        match wm.open_window_at(&closed.app_id, &closed.title, closed.rect) {
            OpenOutcome::Opened(id) | OpenOutcome::FocusedExisting(id) => Ok(id),
            OpenOutcome::Rejected(rejection) => Err((rejection, closed)),
        }
    })
}

pub struct Desktop {
    config: CanopyConfig,
    wm: WindowManager,
    undo: UndoStack<WindowManager, Reopen>,
    dock: Dock,
    anchors: DockAnchorRegistry,
    animations: AnimationController,
    interactions: HashMap<WindowId, WindowInteraction>,
    advisories: Vec<Advisory>,
    store: Box<dyn WorkspaceStore>,
    wallpaper: String,
}

impl Desktop {
    pub fn new(
        config: CanopyConfig,
        registry: Arc<dyn AppRegistry>,
        gate: Arc<dyn PlanGate>,
        store: Box<dyn WorkspaceStore>,
    ) -> Self {
        info!("🏗️ Initializing desktop for tenant '{}'", config.workspace.tenant);

        let wm = WindowManager::new(
            &config.window,
            &config.placement,
            config.viewport.to_viewport(),
            registry,
            gate,
            config.session.clone(),
        );
        let undo = UndoStack::new(Duration::from_millis(config.notifications.undo_toast_ms));
        let dock = Dock::new(&config.dock);
        let animations = AnimationController::new(AnimationSettings::from_config(&config.animation));
        let wallpaper = config.workspace.default_wallpaper.clone();

        let mut desktop = Self {
            config,
            wm,
            undo,
            dock,
            anchors: DockAnchorRegistry::new(),
            animations,
            interactions: HashMap::new(),
            advisories: Vec::new(),
            store,
            wallpaper,
        };
        desktop.relayout_dock();
        desktop
    }

    /// Desktop using the registry described by `config` and the tier gate
    pub fn from_config(config: CanopyConfig, store: Box<dyn WorkspaceStore>) -> Self {
        let registry = Arc::new(config.registry());
        Self::new(config, registry, Arc::new(TierGate), store)
    }

    pub fn window_manager(&self) -> &WindowManager {
        &self.wm
    }

    pub fn dock(&self) -> &Dock {
        &self.dock
    }

    /// Shared handle onto the dock icon rectangles
    pub fn anchors(&self) -> &DockAnchorRegistry {
        &self.anchors
    }

    pub fn animations(&self) -> &AnimationController {
        &self.animations
    }

    pub fn wallpaper(&self) -> &str {
        &self.wallpaper
    }

    pub fn config(&self) -> &CanopyConfig {
        &self.config
    }

    /// Launch an app. Refusals are turned into advisories.
    pub fn launch(&mut self, app_id: &str, now: Instant) -> OpenOutcome {
        let outcome = self.wm.open_window(app_id);
        match &outcome {
            OpenOutcome::Opened(id) => {
                info!("🚀 Launched {} as {}", app_id, id);
                self.relayout_dock();
            }
            OpenOutcome::FocusedExisting(id) => {
                debug!("{} already running as {}", app_id, id);
            }
            OpenOutcome::Rejected(rejection) => {
                warn!("🚫 Launch of {} refused: {}", app_id, rejection);
                self.raise_advisory(rejection.to_string(), now);
            }
        }
        outcome
    }

    /// Close a window and offer to reopen it. Focus moves on only when the
    /// closed window had it.
    pub fn close(&mut self, id: WindowId, now: Instant) -> bool {
        let was_focused = self.wm.focused_window_id() == Some(id);
        let Some(closed) = self.wm.close_window(id) else {
            return false;
        };
        self.interactions.remove(&id);

        let name = if closed.title.is_empty() {
            self.wm
                .registry()
                .resolve(&closed.app_id)
                .map(|app| app.name)
                .unwrap_or_else(|| closed.app_id.clone())
        } else {
            closed.title.clone()
        };
        let label = format!("Reopen {}", name);

        self.undo.push(label, reopen(closed), now);

        info!("🗑️ Closed window {}", id);
        if was_focused {
            self.focus_topmost();
        }
        self.relayout_dock();
        true
    }

    /// Run the pending undo entry. Returns its label once the window is back.
    /// A refused reopen raises an advisory and leaves the entry pending.
    pub fn undo(&mut self, now: Instant) -> Option<String> {
        let (label, outcome) = self.undo.undo(&mut self.wm)?;
        match outcome {
            Ok(id) => {
                info!("↩️ {} as {}", label, id);
                self.relayout_dock();
                Some(label)
            }
            Err((rejection, closed)) => {
                warn!("🚫 {} refused: {}", label, rejection);
                self.raise_advisory(rejection.to_string(), now);
                self.undo.requeue(label, reopen(closed), now);
                None
            }
        }
    }

    pub fn undo_toast(&self, now: Instant) -> Option<UndoToast> {
        self.undo.toast(now)
    }

    pub fn dismiss_undo_toast(&mut self) {
        self.undo.dismiss_toast();
    }

    pub fn focus(&mut self, id: WindowId) -> bool {
        self.wm.focus_window(id)
    }

    /// Minimize a window and hand focus to the top visible one
    pub fn minimize(&mut self, id: WindowId) -> bool {
        self.cancel_gesture(id);
        if !self.wm.minimize_window(id) {
            return false;
        }
        if self.wm.focused_window_id() == Some(id) {
            self.focus_topmost();
        }
        true
    }

    /// Restore a window. A window coming back from the dock is also raised.
    pub fn restore(&mut self, id: WindowId) -> bool {
        let was_minimized = match self.wm.window(id) {
            Some(window) => window.minimized,
            None => return false,
        };
        self.cancel_gesture(id);
        self.wm.restore_window(id);
        if was_minimized {
            self.wm.focus_window(id);
        }
        true
    }

    /// Maximize a normal window, or restore a maximized one
    pub fn toggle_maximize(&mut self, id: WindowId) -> bool {
        let maximized = match self.wm.window(id) {
            Some(window) if !window.minimized => window.maximized,
            _ => return false,
        };
        self.cancel_gesture(id);

        if maximized {
            self.wm.restore_window(id);
        } else {
            let target = self.wm.maximize_target();
            self.wm.maximize_window(id, target);
        }
        self.wm.focus_window(id);
        true
    }

    /// Pointer pressed on part of a window. Focuses the window and starts a
    /// drag or resize when the press landed on the title bar or an edge.
    pub fn pointer_down(&mut self, id: WindowId, target: PointerTarget, pointer: Point) -> bool {
        let Some(window) = self.wm.window(id) else {
            return false;
        };
        if window.minimized {
            return false;
        }
        let min = self.wm.min_size_for(window);
        let window = window.clone();

        self.wm.focus_window(id);

        let snap_config = &self.config.snap;
        let interaction = self
            .interactions
            .entry(id)
            .or_insert_with(|| WindowInteraction::new(snap_config));
        interaction.begin(&window, target, pointer, min)
    }

    /// Returns the live geometry when a gesture is running on `id`
    pub fn pointer_move(&mut self, id: WindowId, pointer: Point) -> Option<Rect> {
        let viewport = self.wm.viewport();
        self.interactions.get_mut(&id)?.update(pointer, &viewport)
    }

    /// Finish the gesture on `id` and commit its geometry. Returns the
    /// window's geometry afterwards.
    pub fn pointer_up(&mut self, id: WindowId) -> Option<Rect> {
        let viewport = self.wm.viewport();
        let commit = self.interactions.get_mut(&id)?.end(&viewport)?;

        match commit {
            GestureCommit::Drag(drag) => match drag.snap {
                Some(SnapZone::Maximize) => {
                    let target = self.wm.maximize_target();
                    self.wm.maximize_window(drag.window_id, target);
                }
                Some(zone) => {
                    debug!("Snapping window {} to {:?}", drag.window_id, zone);
                    self.wm.move_window(drag.window_id, drag.rect.x, drag.rect.y);
                    self.wm
                        .resize_window(drag.window_id, drag.rect.width, drag.rect.height, None);
                }
                None => {
                    self.wm.move_window(drag.window_id, drag.rect.x, drag.rect.y);
                }
            },
            GestureCommit::Resize(resize) => {
                let rect = resize.rect;
                self.wm
                    .resize_window(resize.window_id, rect.width, rect.height, Some((rect.x, rect.y)));
            }
        }

        self.wm.window(id).map(|w| w.rect)
    }

    /// Abandon the gesture on `id`. Nothing was committed, so the window keeps
    /// its pre-gesture geometry, which is returned.
    pub fn pointer_cancel(&mut self, id: WindowId) -> Option<Rect> {
        self.cancel_gesture(id)
    }

    fn cancel_gesture(&mut self, id: WindowId) -> Option<Rect> {
        self.interactions.get_mut(&id)?.cancel()
    }

    /// Apply a new viewport. Maximized windows follow it; the dock is laid out
    /// again.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.wm.set_viewport(viewport);

        let target = self.wm.maximize_target();
        let maximized: Vec<WindowId> = self
            .wm
            .windows()
            .iter()
            .filter(|w| w.maximized)
            .map(|w| w.id)
            .collect();
        for id in maximized {
            self.wm
                .resize_window(id, target.width, target.height, Some((target.x, target.y)));
        }

        self.relayout_dock();
    }

    pub fn pin(&mut self, app_id: &str) -> bool {
        if self.wm.registry().resolve(app_id).is_none() {
            return false;
        }
        let pinned = self.dock.pin(app_id);
        if pinned {
            self.relayout_dock();
        }
        pinned
    }

    pub fn unpin(&mut self, app_id: &str) -> bool {
        let unpinned = self.dock.unpin(app_id);
        if unpinned {
            self.relayout_dock();
        }
        unpinned
    }

    /// Move a pinned dock item to `index`
    pub fn reorder_pin(&mut self, app_id: &str, index: usize) -> bool {
        let moved = self.dock.reorder(app_id, index);
        if moved {
            self.relayout_dock();
        }
        moved
    }

    pub fn set_wallpaper(&mut self, wallpaper: &str) {
        debug!("Wallpaper set to {}", wallpaper);
        self.wallpaper = wallpaper.to_string();
    }

    /// Spotlight search over the registry for the current session
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        launcher::search(
            self.wm.registry().as_ref(),
            self.wm.gate().as_ref(),
            self.wm.session(),
            query,
            limit,
        )
    }

    /// Advance animations and expire advisories
    pub fn tick(&mut self, now: Instant) -> Vec<(WindowId, AnimationPhase)> {
        let lifetime = self.advisory_lifetime();
        self.advisories
            .retain(|a| now.saturating_duration_since(a.raised_at) < lifetime);

        self.animations.sync(&self.wm, &self.anchors, now)
    }

    /// Windows to draw at `now`, bottom to top. Live gestures win over the
    /// committed geometry; hidden windows are left out.
    pub fn render_list(&self, now: Instant) -> Vec<RenderItem> {
        let viewport = self.wm.viewport();
        let focused = self.wm.focused_window_id();

        self.wm
            .windows()
            .into_iter()
            .filter_map(|w| {
                let phase = self.animations.phase(w.id).unwrap_or(if w.minimized {
                    AnimationPhase::Hidden
                } else {
                    AnimationPhase::Visible
                });
                if phase == AnimationPhase::Hidden {
                    return None;
                }

                let interaction = self.interactions.get(&w.id);
                let frame = self
                    .animations
                    .frame(w.id, now)
                    .filter(|_| phase.is_transition());
                let rect = interaction
                    .and_then(|i| i.live_rect())
                    .or(frame.map(|f| f.rect))
                    .unwrap_or(w.rect);

                Some(RenderItem {
                    window_id: w.id,
                    app_id: w.app_id.clone(),
                    title: w.title.clone(),
                    rect,
                    z_index: w.z_index,
                    focused: focused == Some(w.id),
                    phase,
                    scale: frame.map_or(1.0, |f| f.scale),
                    opacity: frame.map_or(1.0, |f| f.opacity),
                    snap_preview: interaction.and_then(|i| i.snap_preview(&viewport)),
                })
            })
            .collect()
    }

    /// Messages still visible at `now`
    pub fn advisories(&self, now: Instant) -> Vec<String> {
        let lifetime = self.advisory_lifetime();
        self.advisories
            .iter()
            .filter(|a| now.saturating_duration_since(a.raised_at) < lifetime)
            .map(|a| a.message.clone())
            .collect()
    }

    pub fn state(&self, now: Instant) -> DesktopState {
        DesktopState {
            viewport: self.wm.viewport(),
            wallpaper: self.wallpaper.clone(),
            pinned: self.dock.pinned().to_vec(),
            focused: self.wm.focused_window_id(),
            windows: self.wm.windows().into_iter().cloned().collect(),
            render: self.render_list(now),
            advisories: self.advisories(now),
            undo: self.undo.pending_label().map(str::to_string),
        }
    }

    /// Save the workspace. Store failures are logged, never propagated.
    pub fn persist(&self) -> bool {
        let snapshot = WorkspaceSnapshot::capture(&self.wm, self.dock.pinned(), &self.wallpaper);
        match self.store.save(&snapshot) {
            Ok(()) => {
                info!("💾 Saved workspace ({} windows)", snapshot.windows.len());
                true
            }
            Err(e) => {
                warn!("Failed to save workspace: {:#}", e);
                false
            }
        }
    }

    /// Load the saved workspace and reopen its windows on top of whatever is
    /// already open. Minimized windows come back minimized and never count
    /// against the window limit. Returns the number of windows reopened.
    pub fn restore_layout(&mut self) -> usize {
        let snapshot = match self.store.load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Failed to load workspace, using defaults: {:#}", e);
                return 0;
            }
        };

        if let Some(pinned) = snapshot.pinned {
            self.dock.set_pinned(pinned);
        }
        if let Some(wallpaper) = snapshot.wallpaper {
            self.wallpaper = wallpaper;
        }

        let mut reopened = 0;
        for layout in snapshot.windows {
            let rect = if layout.maximized {
                layout.pre_maximize.unwrap_or(layout.rect)
            } else {
                layout.rect
            };

            let outcome = if layout.minimized {
                self.wm.open_minimized_at(&layout.app_id, &layout.title, rect)
            } else {
                self.wm.open_window_at(&layout.app_id, &layout.title, rect)
            };
            let id = match outcome {
                OpenOutcome::Opened(id) => id,
                other => {
                    warn!("Skipping saved {} window: {:?}", layout.app_id, other);
                    continue;
                }
            };

            if layout.maximized {
                let target = self.wm.maximize_target();
                self.wm.maximize_window(id, target);
            }
            reopened += 1;
        }

        self.focus_topmost();
        self.relayout_dock();
        info!("📂 Restored workspace with {} windows", reopened);
        reopened
    }

    pub fn shutdown(&mut self) {
        info!("🛑 Shutting down desktop");
        self.interactions.clear();
        self.undo.clear();
        self.wm.shutdown();
        self.relayout_dock();
    }

    fn focus_topmost(&mut self) {
        match self.wm.topmost_visible() {
            Some(top) => {
                self.wm.focus_window(top);
            }
            None => self.wm.clear_focus(),
        }
    }

    fn relayout_dock(&mut self) {
        let anchors = self.dock.layout(&self.wm.running_apps(), &self.wm.viewport());
        self.anchors.replace_all(&anchors);
    }

    fn raise_advisory(&mut self, message: String, now: Instant) {
        self.advisories.push(Advisory {
            message,
            raised_at: now,
        });
    }

    fn advisory_lifetime(&self) -> Duration {
        Duration::from_millis(self.config.notifications.advisory_ms)
    }
}
