//! Application registry and plan gate
//!
//! Both are external collaborators of the window manager. The core only sees
//! the two traits; `StaticRegistry` and `TierGate` are the stock adapters the
//! desktop uses when nothing else is plugged in.

use crate::geometry::Size;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Subscription tier of the signed-in tenant. Ordered from least to most
/// privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
    Business,
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
            Plan::Business => "business",
        };
        f.write_str(name)
    }
}

/// Static catalog entry for a launchable application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppDescriptor {
    pub id: String,
    pub name: String,
    pub default_size: Size,
    #[serde(default)]
    pub min_size: Option<Size>,
    #[serde(default)]
    pub singleton: bool,
    #[serde(default)]
    pub min_plan: Option<Plan>,
}

impl AppDescriptor {
    pub fn new(id: &str, name: &str, width: u32, height: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            default_size: Size::new(width, height),
            min_size: None,
            singleton: false,
            min_plan: None,
        }
    }

    pub fn singleton(mut self) -> Self {
        self.singleton = true;
        self
    }

    pub fn with_min_size(mut self, width: u32, height: u32) -> Self {
        self.min_size = Some(Size::new(width, height));
        self
    }

    pub fn with_min_plan(mut self, plan: Plan) -> Self {
        self.min_plan = Some(plan);
        self
    }
}

/// Who is launching: their plan and, for tenants with a whitelist, the apps
/// they may open.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub plan: Plan,
    #[serde(default)]
    pub enabled_apps: Option<Vec<String>>,
}

/// Read-only lookup of launchable applications
#[cfg_attr(test, mockall::automock)]
pub trait AppRegistry {
    fn resolve(&self, app_id: &str) -> Option<AppDescriptor>;

    /// Every registered application, in catalog order
    fn apps(&self) -> Vec<AppDescriptor>;
}

/// Decides whether an application is locked for a session
#[cfg_attr(test, mockall::automock)]
pub trait PlanGate {
    fn is_locked(&self, app: &AppDescriptor, session: &Session) -> bool;
}

/// In-memory registry preserving catalog order
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    apps: Vec<AppDescriptor>,
    index: HashMap<String, usize>,
}

impl StaticRegistry {
    pub fn new(apps: Vec<AppDescriptor>) -> Self {
        let mut registry = Self::default();
        for app in apps {
            registry.insert(app);
        }
        registry
    }

    /// Add or replace an application. Replacing keeps the original catalog slot.
    pub fn insert(&mut self, app: AppDescriptor) {
        match self.index.get(&app.id) {
            Some(&slot) => self.apps[slot] = app,
            None => {
                self.index.insert(app.id.clone(), self.apps.len());
                self.apps.push(app);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// The catalog shipped with the desktop
    pub fn builtin() -> Self {
        Self::new(vec![
            AppDescriptor::new("finder", "Finder", 720, 480).with_min_size(360, 240),
            AppDescriptor::new("notes", "Notes", 600, 400),
            AppDescriptor::new("terminal", "Terminal", 640, 420).with_min_size(320, 200),
            AppDescriptor::new("settings", "Settings", 680, 520).singleton(),
            AppDescriptor::new("blog", "Blog Studio", 900, 600).singleton(),
            AppDescriptor::new("crm", "Contacts CRM", 960, 640).with_min_plan(Plan::Pro),
            AppDescriptor::new("marketing", "Marketing", 960, 640).with_min_plan(Plan::Pro),
            AppDescriptor::new("analytics", "Analytics", 1024, 680)
                .singleton()
                .with_min_plan(Plan::Business),
        ])
    }
}

impl AppRegistry for StaticRegistry {
    fn resolve(&self, app_id: &str) -> Option<AppDescriptor> {
        self.index.get(app_id).and_then(|&slot| self.apps.get(slot)).cloned()
    }

    fn apps(&self) -> Vec<AppDescriptor> {
        self.apps.clone()
    }
}

/// Locks apps above the session's plan, and apps missing from a tenant
/// whitelist when one is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct TierGate;

impl PlanGate for TierGate {
    fn is_locked(&self, app: &AppDescriptor, session: &Session) -> bool {
        if let Some(enabled) = &session.enabled_apps {
            if !enabled.iter().any(|id| id == &app.id) {
                return true;
            }
        }
        app.min_plan.is_some_and(|required| session.plan < required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_resolves() {
        let registry = StaticRegistry::builtin();
        let settings = registry.resolve("settings").unwrap();
        assert!(settings.singleton);
        assert!(registry.resolve("does-not-exist").is_none());
        assert_eq!(registry.apps().first().map(|a| a.id.as_str()), Some("finder"));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut registry = StaticRegistry::new(vec![
            AppDescriptor::new("a", "A", 100, 100),
            AppDescriptor::new("b", "B", 100, 100),
        ]);
        registry.insert(AppDescriptor::new("a", "Renamed", 200, 200));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.apps()[0].name, "Renamed");
    }

    #[test]
    fn test_tier_gate_plan_ordering() {
        let gate = TierGate;
        let crm = AppDescriptor::new("crm", "CRM", 100, 100).with_min_plan(Plan::Pro);
        let free = Session::default();
        let pro = Session {
            plan: Plan::Pro,
            enabled_apps: None,
        };
        assert!(gate.is_locked(&crm, &free));
        assert!(!gate.is_locked(&crm, &pro));
    }

    #[test]
    fn test_tier_gate_whitelist() {
        let gate = TierGate;
        let notes = AppDescriptor::new("notes", "Notes", 100, 100);
        let session = Session {
            plan: Plan::Business,
            enabled_apps: Some(vec!["finder".to_string()]),
        };
        assert!(gate.is_locked(&notes, &session));
        assert!(!gate.is_locked(&AppDescriptor::new("finder", "Finder", 1, 1), &session));
    }

    #[test]
    fn test_plan_deserializes_lowercase() {
        let session: Session = toml::from_str("plan = \"business\"").unwrap();
        assert_eq!(session.plan, Plan::Business);
        assert_eq!(Plan::Pro.to_string(), "pro");
    }
}
