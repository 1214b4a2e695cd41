//! Minimize/restore animation phases
//!
//! Every window has a `WindowAnimator` that follows its minimized flag:
//!
//! ```text
//!   Visible --minimize--> Minimizing --done--> Hidden
//!      ^                    |    ^                |
//!      |                  restore minimize     restore
//!      |                    v    |                |
//!      +--------done---- Restoring <--------------+
//! ```
//!
//! Progress is a single scalar running from 0 (at the window's rect) to 1 (at
//! its dock icon), so an interrupted transition reverses from wherever it
//! currently is. The animator only reads the window manager and anchor
//! registry; it never writes to either.

use crate::config::AnimationConfig;
use crate::dock::AnchorLookup;
use crate::geometry::{self, Rect};
use crate::window::{WindowId, WindowManager};
use anyhow::Result;
use cgmath::Vector2;
use log::debug;
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationPhase {
    Visible,
    Minimizing,
    Hidden,
    Restoring,
}

impl AnimationPhase {
    /// Whether the phase is heading towards (or already at) the dock
    pub fn is_minimized(self) -> bool {
        matches!(self, AnimationPhase::Minimizing | AnimationPhase::Hidden)
    }

    pub fn is_transition(self) -> bool {
        matches!(self, AnimationPhase::Minimizing | AnimationPhase::Restoring)
    }
}

/// Animation curve types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EasingCurve {
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl EasingCurve {
    pub fn apply(self, progress: f32) -> f32 {
        let t = progress.clamp(0.0, 1.0);

        match self {
            EasingCurve::Linear => t,
            EasingCurve::Ease => t * t * (3.0 - 2.0 * t),
            EasingCurve::EaseIn => t * t,
            EasingCurve::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            EasingCurve::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }
}

impl FromStr for EasingCurve {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear" => Ok(EasingCurve::Linear),
            "ease" => Ok(EasingCurve::Ease),
            "ease-in" => Ok(EasingCurve::EaseIn),
            "ease-out" => Ok(EasingCurve::EaseOut),
            "ease-in-out" => Ok(EasingCurve::EaseInOut),
            other => anyhow::bail!("Unknown animation curve: {}", other),
        }
    }
}

/// Resolved animation preferences
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSettings {
    pub enabled: bool,
    pub duration: Duration,
    pub curve: EasingCurve,
    pub reduced_motion: bool,
}

impl AnimationSettings {
    /// Build from config. An unknown curve falls back to ease-out.
    pub fn from_config(config: &AnimationConfig) -> Self {
        let curve = config.curve.parse().unwrap_or(EasingCurve::EaseOut);
        Self {
            enabled: config.enabled,
            duration: Duration::from_millis(config.duration as u64),
            curve,
            reduced_motion: config.reduced_motion,
        }
    }

    /// Transitions jump straight to their end state
    pub fn is_instant(&self) -> bool {
        !self.enabled || self.reduced_motion || self.duration.is_zero()
    }
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self::from_config(&AnimationConfig::default())
    }
}

/// What to draw for a window on one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationFrame {
    /// Interpolated on-screen rectangle
    pub rect: Rect,

    /// Offset of `rect`'s centre from the window's own centre
    pub translate: Vector2<f32>,

    /// Width of `rect` relative to the window's width
    pub scale: f32,

    pub opacity: f32,
}

#[derive(Debug, Clone)]
struct Transition {
    from: f32,
    to: f32,
    started: Instant,
    duration: Duration,
}

impl Transition {
    fn progress(&self, now: Instant, curve: EasingCurve) -> f32 {
        let t = if self.duration.is_zero() {
            1.0
        } else {
            now.saturating_duration_since(self.started).as_secs_f32() / self.duration.as_secs_f32()
        };
        self.from + (self.to - self.from) * curve.apply(t)
    }

    fn is_done(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }
}

/// Phase machine for a single window
#[derive(Debug, Clone)]
pub struct WindowAnimator {
    settings: AnimationSettings,
    phase: AnimationPhase,
    window_rect: Rect,
    anchor: Option<Rect>,
    transition: Option<Transition>,
}

impl WindowAnimator {
    /// Start settled in the phase matching `minimized`
    pub fn new(settings: AnimationSettings, minimized: bool, rect: Rect) -> Self {
        Self {
            settings,
            phase: if minimized {
                AnimationPhase::Hidden
            } else {
                AnimationPhase::Visible
            },
            window_rect: rect,
            anchor: None,
            transition: None,
        }
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    /// Distance travelled towards the dock, 0 at the window and 1 at the icon
    pub fn progress(&self, now: Instant) -> f32 {
        match (&self.transition, self.phase) {
            (Some(transition), _) => transition.progress(now, self.settings.curve),
            (None, AnimationPhase::Hidden | AnimationPhase::Minimizing) => 1.0,
            (None, _) => 0.0,
        }
    }

    /// React to the window's minimized flag. Returns the phase afterwards.
    pub fn set_minimized(
        &mut self,
        minimized: bool,
        rect: Rect,
        anchor: Option<Rect>,
        now: Instant,
    ) -> AnimationPhase {
        if minimized == self.phase.is_minimized() {
            if !minimized {
                self.window_rect = rect;
            }
            return self.phase;
        }

        let current = self.progress(now);
        self.window_rect = rect;
        self.anchor = anchor.or(self.anchor);

        let (target, moving, settled) = if minimized {
            (1.0, AnimationPhase::Minimizing, AnimationPhase::Hidden)
        } else {
            (0.0, AnimationPhase::Restoring, AnimationPhase::Visible)
        };

        let remaining = (target - current).abs();
        let duration = self.settings.duration.mul_f64(remaining as f64);
        if self.settings.is_instant() || self.anchor.is_none() || duration.is_zero() {
            self.phase = settled;
            self.transition = None;
        } else {
            self.phase = moving;
            self.transition = Some(Transition {
                from: current,
                to: target,
                started: now,
                duration,
            });
        }
        self.phase
    }

    /// Advance time. Returns the new phase when a transition completed.
    pub fn tick(&mut self, now: Instant) -> Option<AnimationPhase> {
        let done = self.transition.as_ref().is_some_and(|t| t.is_done(now));
        if !done {
            return None;
        }

        self.transition = None;
        self.phase = match self.phase {
            AnimationPhase::Minimizing => AnimationPhase::Hidden,
            AnimationPhase::Restoring => AnimationPhase::Visible,
            settled => settled,
        };
        Some(self.phase)
    }

    /// Frame to render, or `None` while hidden
    pub fn frame(&self, now: Instant) -> Option<AnimationFrame> {
        if self.phase == AnimationPhase::Hidden {
            return None;
        }

        let window = self.window_rect;
        let rect = match (self.phase.is_transition(), self.anchor) {
            (true, Some(anchor)) => geometry::lerp_rect(&window, &anchor, self.progress(now)),
            _ => window,
        };
        let p = self.progress(now);

        let (wx, wy) = window.center();
        let (fx, fy) = rect.center();
        let scale = if window.width == 0 {
            1.0
        } else {
            rect.width as f32 / window.width as f32
        };

        Some(AnimationFrame {
            rect,
            translate: Vector2::new((fx - wx) as f32, (fy - wy) as f32),
            scale,
            opacity: 1.0 - p,
        })
    }
}

/// Animators for every window, kept in step with the window manager
#[derive(Debug, Clone)]
pub struct AnimationController {
    settings: AnimationSettings,
    animators: HashMap<WindowId, WindowAnimator>,
}

impl AnimationController {
    pub fn new(settings: AnimationSettings) -> Self {
        Self {
            settings,
            animators: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    /// Pick up minimized-flag flips, advance transitions, and drop animators
    /// for windows that no longer exist. Returns every phase change.
    pub fn sync(
        &mut self,
        wm: &WindowManager,
        anchors: &dyn AnchorLookup,
        now: Instant,
    ) -> Vec<(WindowId, AnimationPhase)> {
        let mut changes = Vec::new();

        self.animators.retain(|id, _| wm.contains(*id));

        for window in wm.windows() {
            let settings = self.settings;
            let animator = self
                .animators
                .entry(window.id)
                .or_insert_with(|| WindowAnimator::new(settings, window.minimized, window.rect));

            let before = animator.phase();
            if window.minimized != before.is_minimized() {
                let anchor = anchors.anchor(&window.app_id);
                let after = animator.set_minimized(window.minimized, window.rect, anchor, now);
                debug!("Window {} animation {:?} -> {:?}", window.id, before, after);
                changes.push((window.id, after));
            } else if !window.minimized {
                animator.window_rect = window.rect;
            }

            if let Some(phase) = animator.tick(now) {
                debug!("Window {} animation settled in {:?}", window.id, phase);
                changes.push((window.id, phase));
            }
        }

        changes
    }

    pub fn phase(&self, id: WindowId) -> Option<AnimationPhase> {
        self.animators.get(&id).map(|a| a.phase())
    }

    pub fn frame(&self, id: WindowId, now: Instant) -> Option<AnimationFrame> {
        self.animators.get(&id).and_then(|a| a.frame(now))
    }

    /// Any window mid-transition
    pub fn is_animating(&self) -> bool {
        self.animators.values().any(|a| a.phase().is_transition())
    }

    pub fn len(&self) -> usize {
        self.animators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlacementConfig, WindowConfig};
    use crate::dock::MockAnchorLookup;
    use crate::geometry::Viewport;
    use crate::registry::{Session, StaticRegistry, TierGate};
    use std::sync::Arc;

    const WINDOW: Rect = Rect::new(100, 100, 400, 300);
    const ICON: Rect = Rect::new(588, 744, 48, 48);

    fn settings() -> AnimationSettings {
        AnimationSettings {
            enabled: true,
            duration: Duration::from_millis(300),
            curve: EasingCurve::Linear,
            reduced_motion: false,
        }
    }

    fn ms(start: Instant, millis: u64) -> Instant {
        start + Duration::from_millis(millis)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_minimize_shrinks_towards_icon() {
        let t0 = Instant::now();
        let mut animator = WindowAnimator::new(settings(), false, WINDOW);

        assert_eq!(animator.set_minimized(true, WINDOW, Some(ICON), t0), AnimationPhase::Minimizing);

        let frame = animator.frame(ms(t0, 150)).unwrap();
        assert_eq!(frame.rect, Rect::new(344, 422, 224, 174));
        assert!(close(frame.scale, 0.56));
        assert!(close(frame.translate.x, 156.0) && close(frame.translate.y, 259.0));
        assert!(close(frame.opacity, 0.5));

        assert_eq!(animator.tick(ms(t0, 200)), None);
        assert_eq!(animator.tick(ms(t0, 400)), Some(AnimationPhase::Hidden));
        assert!(animator.frame(ms(t0, 400)).is_none());
    }

    #[test]
    fn test_restore_mid_flight_reverses_from_current_frame() {
        let t0 = Instant::now();
        let mut animator = WindowAnimator::new(settings(), false, WINDOW);
        animator.set_minimized(true, WINDOW, Some(ICON), t0);

        let phase = animator.set_minimized(false, WINDOW, Some(ICON), ms(t0, 150));
        assert_eq!(phase, AnimationPhase::Restoring);
        assert!(close(animator.progress(ms(t0, 150)), 0.5));
        assert!(close(animator.progress(ms(t0, 225)), 0.25));

        assert_eq!(animator.tick(ms(t0, 450)), Some(AnimationPhase::Visible));
        assert_eq!(animator.frame(ms(t0, 450)).unwrap().rect, WINDOW);
    }

    #[test]
    fn test_restore_from_hidden_starts_at_icon() {
        let t0 = Instant::now();
        let mut animator = WindowAnimator::new(settings(), true, WINDOW);
        assert_eq!(animator.phase(), AnimationPhase::Hidden);

        animator.set_minimized(false, WINDOW, Some(ICON), t0);
        assert_eq!(animator.frame(t0).unwrap().rect, ICON);
    }

    #[test]
    fn test_reduced_motion_collapses_transitions() {
        let t0 = Instant::now();
        let mut animator = WindowAnimator::new(
            AnimationSettings {
                reduced_motion: true,
                ..settings()
            },
            false,
            WINDOW,
        );

        assert_eq!(animator.set_minimized(true, WINDOW, Some(ICON), t0), AnimationPhase::Hidden);
        assert!(animator.frame(t0).is_none());
        assert_eq!(animator.set_minimized(false, WINDOW, Some(ICON), t0), AnimationPhase::Visible);
        assert_eq!(animator.tick(t0), None);
    }

    #[test]
    fn test_missing_anchor_collapses_transitions() {
        let mut animator = WindowAnimator::new(settings(), false, WINDOW);
        assert_eq!(
            animator.set_minimized(true, WINDOW, None, Instant::now()),
            AnimationPhase::Hidden
        );
    }

    #[test]
    fn test_repeated_flag_is_ignored() {
        let t0 = Instant::now();
        let mut animator = WindowAnimator::new(settings(), false, WINDOW);
        animator.set_minimized(true, WINDOW, Some(ICON), t0);
        animator.set_minimized(true, WINDOW, Some(ICON), ms(t0, 100));
        assert!(close(animator.progress(ms(t0, 150)), 0.5));
    }

    #[test]
    fn test_curves() -> Result<()> {
        for name in ["linear", "ease", "ease-in", "ease-out", "ease-in-out"] {
            let curve: EasingCurve = name.parse()?;
            assert_eq!(curve.apply(0.0), 0.0);
            assert!(close(curve.apply(1.0), 1.0));
        }
        assert!("bounce".parse::<EasingCurve>().is_err());
        assert!(EasingCurve::EaseOut.apply(0.5) > EasingCurve::EaseIn.apply(0.5));
        Ok(())
    }

    #[test]
    fn test_controller_follows_window_manager() {
        let mut wm = WindowManager::new(
            &WindowConfig::default(),
            &PlacementConfig::default(),
            Viewport::new(1280, 800, 28, 64),
            Arc::new(StaticRegistry::builtin()),
            Arc::new(TierGate),
            Session::default(),
        );
        let mut anchors = MockAnchorLookup::new();
        anchors.expect_anchor().returning(|_| Some(ICON));

        let mut controller = AnimationController::new(settings());
        let t0 = Instant::now();
        let id = wm.open_window("notes").window_id().unwrap();

        assert!(controller.sync(&wm, &anchors, t0).is_empty());
        assert_eq!(controller.phase(id), Some(AnimationPhase::Visible));

        wm.minimize_window(id);
        assert_eq!(controller.sync(&wm, &anchors, t0), vec![(id, AnimationPhase::Minimizing)]);
        assert!(controller.is_animating());

        assert_eq!(controller.sync(&wm, &anchors, ms(t0, 400)), vec![(id, AnimationPhase::Hidden)]);
        assert!(controller.frame(id, ms(t0, 400)).is_none());

        // The controller never touches the window record
        assert!(wm.window(id).unwrap().minimized);

        wm.close_window(id);
        controller.sync(&wm, &anchors, ms(t0, 500));
        assert!(controller.is_empty());
    }
}
