//! Configuration management for Canopy
//!
//! This module handles loading, parsing, and validating configuration
//! from TOML files. It combines settings for the viewport bands, window
//! placement, snapping, animations, the dock, and the launch session.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::geometry::{Size, Viewport};
use crate::registry::{AppDescriptor, Session, StaticRegistry};

/// Main configuration struct containing all Canopy settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CanopyConfig {
    /// Viewport and reserved bands
    #[serde(default)]
    pub viewport: ViewportConfig,

    /// Cascade placement of new windows
    #[serde(default)]
    pub placement: PlacementConfig,

    /// Window policy (capacity, minimum sizes)
    #[serde(default)]
    pub window: WindowConfig,

    /// Snap zones during drags
    #[serde(default)]
    pub snap: SnapConfig,

    /// Minimize/restore animations
    #[serde(default)]
    pub animation: AnimationConfig,

    /// Dock icon layout
    #[serde(default)]
    pub dock: DockConfig,

    /// Toasts for undo and advisories
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Plan and tenant whitelist used by the plan gate
    #[serde(default)]
    pub session: Session,

    /// Workspace persistence
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// Application catalog override; the built-in catalog is used when empty
    #[serde(default)]
    pub apps: Vec<AppDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewportConfig {
    /// Initial viewport width (pixels)
    pub width: u32,

    /// Initial viewport height (pixels)
    pub height: u32,

    /// Height of the menu bar band at the top (pixels)
    pub top_band: u32,

    /// Height of the dock band at the bottom (pixels)
    pub bottom_band: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlacementConfig {
    /// Left offset of the first cascade slot (pixels)
    pub origin_x: i32,

    /// Offset of the first cascade slot below the menu bar (pixels)
    pub origin_y: i32,

    /// Shift per cascade step on both axes (pixels)
    pub cascade_step: u32,

    /// Number of steps before the cascade wraps back to the origin
    pub cascade_wrap: u32,

    /// Margin kept around new windows when shrinking them to fit (pixels)
    pub size_margin: u32,
}

/// Window management configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowConfig {
    /// Maximum number of non-minimized windows
    pub max_open_windows: usize,

    /// Fallback minimum width when an app declares none (pixels)
    pub min_width: u32,

    /// Fallback minimum height when an app declares none (pixels)
    pub min_height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapConfig {
    /// Enable snap zones
    pub enabled: bool,

    /// Distance from an edge that activates a zone (pixels)
    pub threshold: f64,

    /// Distance from the top/bottom of the work area that turns a side zone
    /// into a quadrant (pixels)
    pub corner_size: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimationConfig {
    /// Enable animations
    pub enabled: bool,

    /// Minimize/restore duration (milliseconds)
    pub duration: u32,

    /// Animation curve ("linear", "ease", "ease-in", "ease-out", "ease-in-out")
    pub curve: String,

    /// Honour the user's reduced-motion preference
    #[serde(default)]
    pub reduced_motion: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DockConfig {
    /// Icon edge length (pixels)
    pub icon_size: u32,

    /// Gap between icons (pixels)
    pub icon_gap: u32,

    /// Apps pinned on a fresh workspace
    #[serde(default)]
    pub default_pinned: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationConfig {
    /// How long the undo toast stays visible (milliseconds)
    pub undo_toast_ms: u64,

    /// How long policy advisories stay visible (milliseconds)
    pub advisory_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory holding one snapshot file per tenant
    pub store_dir: Option<PathBuf>,

    /// Tenant whose workspace is loaded
    pub tenant: String,

    /// Wallpaper used when the store has none
    pub default_wallpaper: String,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            top_band: 28,
            bottom_band: 64,
        }
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            origin_x: 80,
            origin_y: 40,
            cascade_step: 30,
            cascade_wrap: 8,
            size_margin: 16,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            max_open_windows: 10,
            min_width: 240,
            min_height: 160,
        }
    }
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 16.0,
            corner_size: 64.0,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration: 300,
            curve: "ease-out".to_string(),
            reduced_motion: false,
        }
    }
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            icon_size: 48,
            icon_gap: 8,
            default_pinned: vec![
                "finder".to_string(),
                "notes".to_string(),
                "terminal".to_string(),
                "settings".to_string(),
            ],
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            undo_toast_ms: 3000,
            advisory_ms: 3000,
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            store_dir: None,
            tenant: "default".to_string(),
            default_wallpaper: "aurora".to_string(),
        }
    }
}

impl ViewportConfig {
    pub fn to_viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height, self.top_band, self.bottom_band)
    }
}

impl WindowConfig {
    pub fn min_size(&self) -> Size {
        Size::new(self.min_width, self.min_height)
    }
}

impl CanopyConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let expanded_path = expand_home(path.as_ref())?;

        let contents = fs::read_to_string(&expanded_path)
            .with_context(|| format!("Failed to read config file: {}", expanded_path.display()))?;

        let config: CanopyConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", expanded_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let reserved = self.viewport.top_band as u64 + self.viewport.bottom_band as u64;
        if reserved >= self.viewport.height as u64 {
            anyhow::bail!(
                "Reserved bands ({}px) leave no room in a {}px tall viewport",
                reserved,
                self.viewport.height
            );
        }

        if self.placement.cascade_wrap == 0 {
            anyhow::bail!("Invalid cascade_wrap: must be at least 1");
        }

        let span = self.placement.cascade_step as u64 * (self.placement.cascade_wrap as u64 - 1);
        let work_height = self.viewport.height as u64 - reserved;
        if span > self.viewport.width as u64 || span > work_height {
            anyhow::bail!(
                "Invalid cascade_step: {} steps of {}px do not fit in the {}x{} work area",
                self.placement.cascade_wrap - 1,
                self.placement.cascade_step,
                self.viewport.width,
                work_height
            );
        }

        if self.window.max_open_windows == 0 {
            anyhow::bail!("Invalid max_open_windows: must be at least 1");
        }

        if self.window.min_width == 0 || self.window.min_height == 0 {
            anyhow::bail!("Invalid minimum window size: both dimensions must be positive");
        }

        if self.snap.threshold < 0.0 || self.snap.corner_size < 0.0 {
            anyhow::bail!("Invalid snap distances: must not be negative");
        }

        let valid_curves = ["linear", "ease", "ease-in", "ease-out", "ease-in-out"];
        if !valid_curves.contains(&self.animation.curve.as_str()) {
            anyhow::bail!("Invalid animation curve: {}", self.animation.curve);
        }

        if self.workspace.tenant.trim().is_empty() {
            anyhow::bail!("Invalid tenant: must not be empty");
        }

        for app in &self.apps {
            if app.default_size.width == 0 || app.default_size.height == 0 {
                anyhow::bail!("App '{}' has an empty default size", app.id);
            }
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, contents).context("Failed to write configuration file")?;

        Ok(())
    }

    /// Merge a partial configuration into this one
    /// Non-default sections from the partial config override this config
    pub fn merge_partial(mut self, partial: CanopyConfig) -> Self {
        let default_config = CanopyConfig::default();

        if partial.viewport != default_config.viewport {
            self.viewport = partial.viewport;
        }
        if partial.placement != default_config.placement {
            self.placement = partial.placement;
        }
        if partial.window != default_config.window {
            self.window = partial.window;
        }
        if partial.snap != default_config.snap {
            self.snap = partial.snap;
        }
        if partial.animation != default_config.animation {
            self.animation = partial.animation;
        }
        if partial.dock != default_config.dock {
            self.dock = partial.dock;
        }
        if partial.notifications != default_config.notifications {
            self.notifications = partial.notifications;
        }
        if partial.session != default_config.session {
            self.session = partial.session;
        }
        if partial.workspace != default_config.workspace {
            self.workspace = partial.workspace;
        }
        if !partial.apps.is_empty() {
            self.apps = partial.apps;
        }

        self
    }

    /// Registry built from `apps`, or the built-in catalog when none are listed
    pub fn registry(&self) -> StaticRegistry {
        if self.apps.is_empty() {
            StaticRegistry::builtin()
        } else {
            StaticRegistry::new(self.apps.clone())
        }
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    if path.to_string_lossy().starts_with('~') {
        let home = std::env::var("HOME").context("Failed to get HOME environment variable")?;
        let rest = path.strip_prefix("~").unwrap_or(path);
        Ok(Path::new(&home).join(rest))
    } else {
        Ok(path.to_path_buf())
    }
}
