//! # Canopy desktop window manager
//!
//! The headless core of a browser-hosted desktop: windows that can be
//! launched, dragged, resized, snapped, minimized into a dock and restored,
//! plus the undo slot and workspace persistence around them.
//!
//! ## Architecture
//!
//! Canopy is built on a modular architecture:
//! - `geometry`: Rectangles, the viewport and the pure clamp helpers
//! - `window`: The authoritative window list, stacking order and launch policy
//! - `interaction`: Per-window drag/resize sessions and snap zones
//! - `dock`: Dock layout and the anchor registry animations read from
//! - `animation`: Minimize/restore phase machines
//! - `undo`: Single-slot undo for destructive window actions
//! - `registry`: Application catalog and plan gate
//! - `launcher`: Spotlight-style search
//! - `workspace`: Workspace snapshots and their stores
//! - `desktop`: The shell tying everything together
//! - `script`: Deterministic session replay
//! - `config`: Configuration parsing and management
//!
//! ## Usage
//!
//! ```rust,no_run
//! use canopy::{CanopyConfig, Desktop, MemoryStore};
//! use std::time::Instant;
//!
//! let mut desktop = Desktop::from_config(CanopyConfig::default(), Box::new(MemoryStore::new()));
//! let outcome = desktop.launch("notes", Instant::now());
//! println!("{:?}", outcome);
//! ```

pub mod animation;
pub mod config;
pub mod desktop;
pub mod dock;
pub mod geometry;
pub mod interaction;
pub mod launcher;
pub mod registry;
pub mod script;
pub mod undo;
pub mod window;
pub mod workspace;

// Re-export main types for easy access
pub use config::CanopyConfig;
pub use desktop::Desktop;
pub use geometry::{Point, Rect, Size, Viewport};
pub use window::{OpenOutcome, WindowId, WindowManager};
pub use workspace::{JsonFileStore, MemoryStore, WorkspaceStore};

// Re-export common error types
pub use anyhow::{Context, Error, Result};

/// Version information for Canopy
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
