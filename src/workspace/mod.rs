//! Workspace persistence
//!
//! A workspace snapshot holds what a tenant expects to find again on the next
//! visit: pinned dock items, the wallpaper, and the window layout. Stores are
//! reached through the `WorkspaceStore` trait so the desktop never knows
//! whether it talks to a file or to memory.

use crate::geometry::Rect;
use crate::window::WindowManager;
use anyhow::{Context, Result};
use log::debug;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Saved state of one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowLayout {
    pub app_id: String,
    pub title: String,
    pub rect: Rect,
    #[serde(default)]
    pub minimized: bool,
    #[serde(default)]
    pub maximized: bool,
    #[serde(default)]
    pub pre_maximize: Option<Rect>,
}

/// Everything persisted for a tenant. Missing fields mean "use the defaults".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    #[serde(default)]
    pub pinned: Option<Vec<String>>,
    #[serde(default)]
    pub wallpaper: Option<String>,

    /// Windows bottom to top
    #[serde(default)]
    pub windows: Vec<WindowLayout>,
}

impl WorkspaceSnapshot {
    /// Capture the current layout of `wm`
    pub fn capture(wm: &WindowManager, pinned: &[String], wallpaper: &str) -> Self {
        let windows = wm
            .windows()
            .into_iter()
            .map(|w| WindowLayout {
                app_id: w.app_id.clone(),
                title: w.title.clone(),
                rect: w.rect,
                minimized: w.minimized,
                maximized: w.maximized,
                pre_maximize: w.pre_maximize,
            })
            .collect();

        Self {
            pinned: Some(pinned.to_vec()),
            wallpaper: Some(wallpaper.to_string()),
            windows,
        }
    }
}

/// Persistence backend for a single tenant's workspace
#[cfg_attr(test, mockall::automock)]
pub trait WorkspaceStore {
    /// Load the saved snapshot; an empty default when nothing was saved yet
    fn load(&self) -> Result<WorkspaceSnapshot>;

    fn save(&self, snapshot: &WorkspaceSnapshot) -> Result<()>;
}

/// One JSON file per tenant inside a store directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store for `tenant` under `dir`. Characters outside `[A-Za-z0-9_-]`
    /// in the tenant id are replaced so it is always a plain file name.
    pub fn for_tenant<P: AsRef<Path>>(dir: P, tenant: &str) -> Self {
        let file_name: String = tenant
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        Self::new(dir.as_ref().join(format!("{}.json", file_name)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WorkspaceStore for JsonFileStore {
    fn load(&self) -> Result<WorkspaceSnapshot> {
        if !self.path.exists() {
            debug!("No workspace at {}, starting fresh", self.path.display());
            return Ok(WorkspaceSnapshot::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read workspace file {}", self.path.display()))?;

        let snapshot: WorkspaceSnapshot =
            serde_json::from_str(&contents).context("Failed to parse workspace file")?;

        debug!(
            "Loaded workspace from {} ({} windows)",
            self.path.display(),
            snapshot.windows.len()
        );
        Ok(snapshot)
    }

    fn save(&self, snapshot: &WorkspaceSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create workspace directory")?;
        }

        let contents =
            serde_json::to_string_pretty(snapshot).context("Failed to serialize workspace")?;

        // Write then rename so a crash never leaves a truncated file behind
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).context("Failed to write workspace file")?;
        fs::rename(&tmp, &self.path).context("Failed to replace workspace file")?;

        Ok(())
    }
}

/// In-memory store; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<WorkspaceSnapshot>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: WorkspaceSnapshot) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(snapshot))),
        }
    }

    /// Last saved snapshot, if any
    pub fn snapshot(&self) -> Option<WorkspaceSnapshot> {
        self.slot.lock().clone()
    }
}

impl WorkspaceStore for MemoryStore {
    fn load(&self) -> Result<WorkspaceSnapshot> {
        Ok(self.slot.lock().clone().unwrap_or_default())
    }

    fn save(&self, snapshot: &WorkspaceSnapshot) -> Result<()> {
        *self.slot.lock() = Some(snapshot.clone());
        Ok(())
    }
}
