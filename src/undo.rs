//! Single-slot undo for destructive window actions
//!
//! Pushing a new entry discards whatever was pending. The toast announcing an
//! entry expires on its own timer, but the entry stays undoable until it is
//! used or replaced. An action that reports failure can be put back with
//! `requeue` so the user can retry it.

use log::debug;
use std::fmt;
use std::time::{Duration, Instant};

/// Deferred action that reverses a destructive operation on `T`, reporting
/// its outcome as `R`
pub type RedoFn<T, R = ()> = Box<dyn FnOnce(&mut T) -> R>;

struct UndoEntry<T, R> {
    label: String,
    redo: RedoFn<T, R>,
    pushed_at: Instant,
}

/// Toast announcing the pending undo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoToast {
    pub label: String,
    pub remaining: Duration,
}

pub struct UndoStack<T, R = ()> {
    entry: Option<UndoEntry<T, R>>,
    toast_duration: Duration,
    toast_dismissed: bool,
}

impl<T, R> fmt::Debug for UndoStack<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoStack")
            .field("pending", &self.entry.as_ref().map(|e| e.label.as_str()))
            .field("toast_duration", &self.toast_duration)
            .finish()
    }
}

impl<T, R> UndoStack<T, R> {
    pub fn new(toast_duration: Duration) -> Self {
        Self {
            entry: None,
            toast_duration,
            toast_dismissed: false,
        }
    }

    /// Record an undoable action, superseding any pending one
    pub fn push(&mut self, label: impl Into<String>, redo: RedoFn<T, R>, now: Instant) {
        let label = label.into();
        if let Some(previous) = &self.entry {
            debug!("Undo entry '{}' superseded by '{}'", previous.label, label);
        }
        self.entry = Some(UndoEntry {
            label,
            redo,
            pushed_at: now,
        });
        self.toast_dismissed = false;
    }

    /// Run the pending action once. Returns its label and outcome, or `None`
    /// when nothing is pending.
    pub fn undo(&mut self, target: &mut T) -> Option<(String, R)> {
        let entry = self.entry.take()?;
        let outcome = (entry.redo)(target);
        debug!("Ran undo '{}'", entry.label);
        Some((entry.label, outcome))
    }

    /// Put back an action whose run was refused. The toast stays hidden.
    /// Ignored when something newer was pushed in the meantime.
    pub fn requeue(&mut self, label: impl Into<String>, redo: RedoFn<T, R>, now: Instant) {
        if self.entry.is_some() {
            return;
        }
        self.entry = Some(UndoEntry {
            label: label.into(),
            redo,
            pushed_at: now,
        });
        self.toast_dismissed = true;
    }

    pub fn has_pending(&self) -> bool {
        self.entry.is_some()
    }

    pub fn pending_label(&self) -> Option<&str> {
        self.entry.as_ref().map(|e| e.label.as_str())
    }

    /// Toast to show at `now`, if it has not expired or been dismissed
    pub fn toast(&self, now: Instant) -> Option<UndoToast> {
        if self.toast_dismissed {
            return None;
        }
        let entry = self.entry.as_ref()?;
        let elapsed = now.saturating_duration_since(entry.pushed_at);
        if elapsed >= self.toast_duration {
            return None;
        }
        Some(UndoToast {
            label: entry.label.clone(),
            remaining: self.toast_duration - elapsed,
        })
    }

    /// Hide the toast. The entry itself stays undoable.
    pub fn dismiss_toast(&mut self) {
        self.toast_dismissed = true;
    }

    /// Drop the pending entry without running it
    pub fn clear(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack() -> UndoStack<Vec<String>> {
        UndoStack::new(Duration::from_secs(3))
    }

    #[test]
    fn test_undo_runs_once() {
        let mut undo = stack();
        let mut log: Vec<String> = Vec::new();

        undo.push("Reopen Notes", Box::new(|log: &mut Vec<String>| log.push("notes".into())), Instant::now());
        assert_eq!(undo.undo(&mut log).map(|(label, _)| label).as_deref(), Some("Reopen Notes"));
        assert!(undo.undo(&mut log).is_none());
        assert_eq!(log, vec!["notes"]);
    }

    #[test]
    fn test_push_supersedes_pending() {
        let mut undo = stack();
        let mut log: Vec<String> = Vec::new();
        let now = Instant::now();

        undo.push("Reopen Notes", Box::new(|log: &mut Vec<String>| log.push("notes".into())), now);
        undo.push("Reopen Finder", Box::new(|log: &mut Vec<String>| log.push("finder".into())), now);

        assert_eq!(undo.pending_label(), Some("Reopen Finder"));
        undo.undo(&mut log);
        assert_eq!(log, vec!["finder"]);
    }

    #[test]
    fn test_toast_expires_but_entry_survives() {
        let mut undo = stack();
        let now = Instant::now();
        undo.push("Reopen Notes", Box::new(|_: &mut Vec<String>| {}), now);

        let toast = undo.toast(now + Duration::from_secs(1)).unwrap();
        assert_eq!(toast.remaining, Duration::from_secs(2));
        assert!(undo.toast(now + Duration::from_secs(3)).is_none());
        assert!(undo.has_pending());
    }

    #[test]
    fn test_dismiss_hides_toast_until_next_push() {
        let mut undo = stack();
        let now = Instant::now();
        undo.push("Reopen Notes", Box::new(|_: &mut Vec<String>| {}), now);
        undo.dismiss_toast();
        assert!(undo.toast(now).is_none());
        assert!(undo.has_pending());

        undo.push("Reopen Finder", Box::new(|_: &mut Vec<String>| {}), now);
        assert_eq!(undo.toast(now).map(|t| t.label), Some("Reopen Finder".to_string()));
    }

    #[test]
    fn test_refused_action_can_be_requeued() {
        let mut undo: UndoStack<Vec<String>, Result<(), String>> = UndoStack::new(Duration::from_secs(3));
        let mut log: Vec<String> = Vec::new();
        let now = Instant::now();

        undo.push("Reopen Notes", Box::new(|_: &mut Vec<String>| -> Result<(), String> { Err("full".to_string()) }), now);
        let (label, outcome) = undo.undo(&mut log).unwrap();
        assert_eq!(outcome, Err("full".to_string()));
        assert!(!undo.has_pending());

        undo.requeue(
            label,
            Box::new(|log: &mut Vec<String>| -> Result<(), String> {
                log.push("notes".into());
                Ok(())
            }),
            now,
        );
        assert_eq!(undo.pending_label(), Some("Reopen Notes"));
        assert!(undo.toast(now).is_none());

        let (_, outcome) = undo.undo(&mut log).unwrap();
        assert_eq!(outcome, Ok(()));
        assert_eq!(log, vec!["notes"]);
    }

    #[test]
    fn test_requeue_never_replaces_newer_entry() {
        let mut undo = stack();
        let now = Instant::now();
        undo.push("Reopen Finder", Box::new(|_: &mut Vec<String>| {}), now);
        undo.requeue("Reopen Notes", Box::new(|_: &mut Vec<String>| {}), now);
        assert_eq!(undo.pending_label(), Some("Reopen Finder"));
    }
}
