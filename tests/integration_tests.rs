//! Integration tests for Canopy
//!
//! These tests drive the public API end to end: launches through the desktop
//! shell, pointer gestures, undo, script replay and file-backed workspaces.

use anyhow::Result;
use std::time::Instant;
use tempfile::tempdir;

use canopy::{
    config::CanopyConfig,
    geometry::{Point, Rect, Viewport},
    interaction::PointerTarget,
    script::{self, ScriptRunner},
    Desktop, JsonFileStore, MemoryStore, OpenOutcome, WindowId,
};

fn desktop() -> Desktop {
    Desktop::from_config(CanopyConfig::default(), Box::new(MemoryStore::new()))
}

fn opened(outcome: OpenOutcome) -> WindowId {
    match outcome {
        OpenOutcome::Opened(id) => id,
        other => panic!("expected a new window, got {:?}", other),
    }
}

/// Two launches on the default 1280x800 viewport cascade by 30px
#[test]
fn test_cascade_placement() -> Result<()> {
    let now = Instant::now();
    let mut desktop = desktop();

    let first = opened(desktop.launch("notes", now));
    let second = opened(desktop.launch("notes", now));

    let wm = desktop.window_manager();
    assert_eq!(wm.window(first).map(|w| w.rect), Some(Rect::new(80, 68, 600, 400)));
    assert_eq!(wm.window(second).map(|w| w.rect), Some(Rect::new(110, 98, 600, 400)));
    assert!(wm.window(second).unwrap().z_index > wm.window(first).unwrap().z_index);

    Ok(())
}

/// Minimized windows free up room under the window limit
#[test]
fn test_capacity_counts_visible_windows_only() -> Result<()> {
    let now = Instant::now();
    let mut desktop = desktop();
    let ids: Vec<WindowId> = (0..10).map(|_| opened(desktop.launch("notes", now))).collect();

    assert!(matches!(desktop.launch("notes", now), OpenOutcome::Rejected(_)));
    assert_eq!(desktop.window_manager().visible_count(), 10);

    desktop.minimize(ids[0]);
    opened(desktop.launch("notes", now));
    assert_eq!(desktop.window_manager().len(), 11);

    Ok(())
}

/// Singleton apps are focused instead of opened twice
#[test]
fn test_singleton_launch_focuses_existing() -> Result<()> {
    let now = Instant::now();
    let mut desktop = desktop();
    let settings = opened(desktop.launch("settings", now));
    opened(desktop.launch("notes", now));

    assert_eq!(desktop.launch("settings", now), OpenOutcome::FocusedExisting(settings));
    assert_eq!(desktop.window_manager().focused_window_id(), Some(settings));
    assert_eq!(desktop.window_manager().len(), 2);

    Ok(())
}

/// Dropping a window at the left edge commits the left half of the work area
#[test]
fn test_left_half_snap() -> Result<()> {
    let now = Instant::now();
    let mut desktop = desktop();
    let id = opened(desktop.launch("finder", now));

    assert!(desktop.pointer_down(id, PointerTarget::TitleBar, Point::new(400.0, 80.0)));
    desktop.pointer_move(id, Point::new(200.0, 300.0));
    desktop.pointer_move(id, Point::new(3.0, 420.0));
    desktop.pointer_up(id);

    assert_eq!(
        desktop.window_manager().window(id).map(|w| w.rect),
        Some(Rect::new(0, 28, 640, 708))
    );

    Ok(())
}

/// Close, undo, and a second undo that does nothing
#[test]
fn test_close_undo_roundtrip() -> Result<()> {
    let now = Instant::now();
    let mut desktop = desktop();
    let id = opened(desktop.launch("terminal", now));
    let before = desktop.window_manager().window(id).cloned().unwrap();

    desktop.close(id, now);
    assert_eq!(desktop.undo(now).as_deref(), Some("Reopen Terminal"));
    assert_eq!(desktop.undo(now), None);

    let windows = desktop.window_manager().windows();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].app_id, before.app_id);
    assert_eq!(windows[0].title, before.title);
    assert_eq!(windows[0].rect, before.rect);

    Ok(())
}

/// A replayed script persists to the tenant's file and a fresh desktop
/// picks the layout back up
#[test]
fn test_script_replay_with_file_store() -> Result<()> {
    let dir = tempdir()?;
    let commands = script::parse(
        r#"[
            { "op": "launch", "app": "notes" },
            { "op": "launch", "app": "finder" },
            { "op": "toggle_maximize", "window": 2 },
            { "op": "minimize", "window": 1 },
            { "op": "wallpaper", "name": "dunes" },
            { "op": "wait", "ms": 1000 },
            { "op": "persist" }
        ]"#,
    )?;

    let mut first = Desktop::from_config(
        CanopyConfig::default(),
        Box::new(JsonFileStore::for_tenant(dir.path(), "acme")),
    );
    let mut runner = ScriptRunner::new(Instant::now());
    runner.run(&mut first, &commands);
    assert!(first.render_list(runner.now()).iter().all(|item| item.app_id == "finder"));

    let mut second = Desktop::from_config(
        CanopyConfig::default(),
        Box::new(JsonFileStore::for_tenant(dir.path(), "acme")),
    );
    assert_eq!(second.restore_layout(), 2);
    assert_eq!(second.wallpaper(), "dunes");

    let windows = second.window_manager().windows();
    assert!(windows[0].minimized);
    assert!(windows[1].maximized);
    assert_eq!(windows[1].rect, Rect::new(0, 28, 1280, 708));

    // Other tenants start empty
    let mut other = Desktop::from_config(
        CanopyConfig::default(),
        Box::new(JsonFileStore::for_tenant(dir.path(), "globex")),
    );
    assert_eq!(other.restore_layout(), 0);

    Ok(())
}

/// Shrinking the viewport never moves committed windows, but new launches
/// and maximize use the new work area
#[test]
fn test_viewport_is_read_live() -> Result<()> {
    let now = Instant::now();
    let mut desktop = desktop();
    let first = opened(desktop.launch("blog", now));

    desktop.set_viewport(Viewport::new(800, 600, 28, 64));
    let second = opened(desktop.launch("notes", now));

    let wm = desktop.window_manager();
    assert_eq!(wm.window(first).map(|w| w.rect), Some(Rect::new(80, 68, 900, 600)));

    let area = wm.work_area();
    assert_eq!(area, Rect::new(0, 28, 800, 508));
    assert!(area.contains_rect(&wm.window(second).unwrap().rect));

    desktop.toggle_maximize(second);
    assert_eq!(desktop.window_manager().window(second).map(|w| w.rect), Some(area));

    Ok(())
}
