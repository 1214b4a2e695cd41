//! Scripted session replay
//!
//! A script is a JSON array of commands replayed against a `Desktop` on a
//! simulated clock, so a whole session (including animations and toast
//! expiry) runs deterministically and instantly.
//!
//! ```json
//! [
//!   { "op": "launch", "app": "notes" },
//!   { "op": "drag", "window": 1, "from": [300, 80], "to": [2, 400] },
//!   { "op": "wait", "ms": 500 }
//! ]
//! ```

use crate::desktop::Desktop;
use crate::geometry::{Point, Viewport};
use crate::interaction::{PointerTarget, ResizeHandle};
use crate::window::{OpenOutcome, WindowId};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

/// Simulated time between two consecutive commands
pub const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Launch { app: String },
    Close { window: WindowId },
    Undo,
    Focus { window: WindowId },
    Minimize { window: WindowId },
    Restore { window: WindowId },
    ToggleMaximize { window: WindowId },

    /// Title-bar drag from `from` to `to`, released at `to`
    Drag {
        window: WindowId,
        from: (f64, f64),
        to: (f64, f64),
    },

    /// Edge or corner resize from `from` to `to`, released at `to`
    Resize {
        window: WindowId,
        handle: ResizeHandle,
        from: (f64, f64),
        to: (f64, f64),
    },

    PointerDown {
        window: WindowId,
        target: PointerTarget,
        x: f64,
        y: f64,
    },
    PointerMove { window: WindowId, x: f64, y: f64 },
    PointerUp { window: WindowId },
    PointerCancel { window: WindowId },

    Viewport {
        width: u32,
        height: u32,
        #[serde(default)]
        top_band: Option<u32>,
        #[serde(default)]
        bottom_band: Option<u32>,
    },
    Pin { app: String },
    Unpin { app: String },

    /// Move a pinned dock item to a new position
    ReorderPin { app: String, index: usize },
    Wallpaper { name: String },
    DismissToast,
    Persist,

    /// Let simulated time pass
    Wait { ms: u64 },
}

/// Parse a script from JSON text
pub fn parse(json: &str) -> Result<Vec<Command>> {
    serde_json::from_str(json).context("Failed to parse script")
}

/// Read and parse a script file
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Command>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    parse(&contents)
}

/// Replays commands against a desktop on its own clock
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    now: Instant,
}

impl ScriptRunner {
    pub fn new(start: Instant) -> Self {
        Self { now: start }
    }

    /// Current simulated time
    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn run(&mut self, desktop: &mut Desktop, commands: &[Command]) {
        info!("🎬 Replaying {} script commands", commands.len());
        for command in commands {
            self.step(desktop, command);
        }
    }

    /// Apply one command, then advance the clock and tick the desktop
    pub fn step(&mut self, desktop: &mut Desktop, command: &Command) {
        debug!("Script: {:?}", command);
        let now = self.now;

        match command {
            Command::Launch { app } => {
                if let OpenOutcome::Rejected(rejection) = desktop.launch(app, now) {
                    debug!("Script launch refused: {}", rejection);
                }
            }
            Command::Close { window } => {
                desktop.close(*window, now);
            }
            Command::Undo => {
                desktop.undo(now);
            }
            Command::Focus { window } => {
                desktop.focus(*window);
            }
            Command::Minimize { window } => {
                desktop.minimize(*window);
            }
            Command::Restore { window } => {
                desktop.restore(*window);
            }
            Command::ToggleMaximize { window } => {
                desktop.toggle_maximize(*window);
            }
            Command::Drag { window, from, to } => {
                self.gesture(desktop, *window, PointerTarget::TitleBar, *from, *to);
            }
            Command::Resize {
                window,
                handle,
                from,
                to,
            } => {
                self.gesture(desktop, *window, PointerTarget::Resize(*handle), *from, *to);
            }
            Command::PointerDown { window, target, x, y } => {
                desktop.pointer_down(*window, *target, Point::new(*x, *y));
            }
            Command::PointerMove { window, x, y } => {
                desktop.pointer_move(*window, Point::new(*x, *y));
            }
            Command::PointerUp { window } => {
                desktop.pointer_up(*window);
            }
            Command::PointerCancel { window } => {
                desktop.pointer_cancel(*window);
            }
            Command::Viewport {
                width,
                height,
                top_band,
                bottom_band,
            } => {
                let current = desktop.window_manager().viewport();
                desktop.set_viewport(Viewport::new(
                    *width,
                    *height,
                    top_band.unwrap_or(current.top_band),
                    bottom_band.unwrap_or(current.bottom_band),
                ));
            }
            Command::Pin { app } => {
                desktop.pin(app);
            }
            Command::Unpin { app } => {
                desktop.unpin(app);
            }
            Command::ReorderPin { app, index } => {
                desktop.reorder_pin(app, *index);
            }
            Command::Wallpaper { name } => {
                desktop.set_wallpaper(name);
            }
            Command::DismissToast => {
                desktop.dismiss_undo_toast();
            }
            Command::Persist => {
                desktop.persist();
            }
            Command::Wait { ms } => {
                self.now += Duration::from_millis(*ms);
                desktop.tick(self.now);
                return;
            }
        }

        self.now += FRAME;
        desktop.tick(self.now);
    }

    fn gesture(
        &mut self,
        desktop: &mut Desktop,
        window: WindowId,
        target: PointerTarget,
        from: (f64, f64),
        to: (f64, f64),
    ) {
        if !desktop.pointer_down(window, target, Point::new(from.0, from.1)) {
            return;
        }
        desktop.pointer_move(window, Point::new(to.0, to.1));
        desktop.pointer_up(window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanopyConfig;
    use crate::geometry::Rect;
    use crate::workspace::MemoryStore;
    use anyhow::Result;
    use tempfile::tempdir;

    fn desktop() -> Desktop {
        Desktop::from_config(CanopyConfig::default(), Box::new(MemoryStore::new()))
    }

    #[test]
    fn test_parse_commands() -> Result<()> {
        let commands = parse(
            r#"[
                { "op": "launch", "app": "notes" },
                { "op": "resize", "window": 1, "handle": "south-east", "from": [680, 468], "to": [700, 500] },
                { "op": "pointer_down", "window": 1, "target": { "kind": "title-bar" }, "x": 1, "y": 2 },
                { "op": "viewport", "width": 1024, "height": 768 },
                { "op": "undo" }
            ]"#,
        )?;

        assert_eq!(commands.len(), 5);
        assert_eq!(commands[0], Command::Launch { app: "notes".into() });
        assert!(matches!(
            commands[1],
            Command::Resize {
                handle: ResizeHandle::SouthEast,
                ..
            }
        ));
        assert!(matches!(
            commands[2],
            Command::PointerDown {
                target: PointerTarget::TitleBar,
                ..
            }
        ));
        assert_eq!(commands[4], Command::Undo);

        Ok(())
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        assert!(parse(r#"[{ "op": "explode" }]"#).is_err());
    }

    #[test]
    fn test_replay_snap_close_and_undo() -> Result<()> {
        let commands = parse(
            r#"[
                { "op": "launch", "app": "notes" },
                { "op": "drag", "window": 1, "from": [300, 80], "to": [2, 400] },
                { "op": "close", "window": 1 },
                { "op": "wait", "ms": 5000 },
                { "op": "undo" }
            ]"#,
        )?;

        let mut desktop = desktop();
        let start = Instant::now();
        let mut runner = ScriptRunner::new(start);
        runner.run(&mut desktop, &commands);

        let windows = desktop.window_manager().windows();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].rect, Rect::new(0, 28, 640, 708));
        assert_eq!(runner.now(), start + FRAME * 4 + Duration::from_millis(5000));

        Ok(())
    }

    #[test]
    fn test_viewport_command_keeps_bands() {
        let mut desktop = desktop();
        let mut runner = ScriptRunner::new(Instant::now());
        runner.step(
            &mut desktop,
            &Command::Viewport {
                width: 1024,
                height: 768,
                top_band: None,
                bottom_band: None,
            },
        );
        assert_eq!(desktop.window_manager().viewport(), Viewport::new(1024, 768, 28, 64));
    }

    #[test]
    fn test_reorder_pin_command() -> Result<()> {
        let commands = parse(r#"[{ "op": "reorder_pin", "app": "terminal", "index": 0 }]"#)?;
        let mut desktop = desktop();
        ScriptRunner::new(Instant::now()).run(&mut desktop, &commands);
        assert_eq!(desktop.dock().pinned()[0], "terminal");

        Ok(())
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("session.json");
        fs::write(&path, r#"[{ "op": "launch", "app": "finder" }]"#)?;

        assert_eq!(load(&path)?, vec![Command::Launch { app: "finder".into() }]);
        assert!(load(dir.path().join("missing.json")).is_err());

        Ok(())
    }
}
