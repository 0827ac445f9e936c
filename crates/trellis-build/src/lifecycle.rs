//! On-create and on-close callbacks.
//!
//! Callbacks are stored on the tag's construction record, one [`Lifecycle`]
//! per entity or component, and never on the entity itself.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::entity::Entity;
use crate::error::{BuildError, Result};

/// A user callback run against a constructed entity.
pub type Action = Rc<dyn Fn(&mut dyn Entity)>;

// ── Actions ───────────────────────────────────────────────────────────────

/// Named actions markup can reference, e.g. `on_create="register_panel"`.
///
/// The table is per-parse and not `Send`; the syntax registry stays shareable.
#[derive(Clone, Default)]
pub struct Actions {
    named: HashMap<String, Action>,
}

impl Actions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, action: impl Fn(&mut dyn Entity) + 'static) -> Self {
        self.insert(name, action);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, action: impl Fn(&mut dyn Entity) + 'static) {
        self.named.insert(name.into(), Rc::new(action));
    }

    pub fn get(&self, name: &str) -> Option<Action> {
        self.named.get(name).cloned()
    }

    /// Like [`get`](Actions::get), but an unknown name is an error.
    pub fn resolve(&self, name: &str) -> Result<Action> {
        self.get(name).ok_or_else(|| BuildError::UnknownAction { name: name.to_string() })
    }

    pub fn len(&self) -> usize {
        self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty()
    }
}

impl fmt::Debug for Actions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.named.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Actions").field("named", &names).finish()
    }
}

// ── Lifecycle ─────────────────────────────────────────────────────────────

/// Callbacks declared for a single entity.
#[derive(Clone, Default)]
pub struct Lifecycle {
    on_create: Vec<Action>,
    on_close: Vec<Action>,
}

impl Lifecycle {
    pub fn push_on_create(&mut self, action: Action) {
        self.on_create.push(action);
    }

    pub fn push_on_close(&mut self, action: Action) {
        self.on_close.push(action);
    }

    pub fn is_empty(&self) -> bool {
        self.on_create.is_empty() && self.on_close.is_empty()
    }
}

/// Run the on-create actions, if any were declared.
pub(crate) fn invoke_on_create(lifecycle: Option<&Lifecycle>, entity: &mut dyn Entity) {
    if let Some(lifecycle) = lifecycle {
        for action in &lifecycle.on_create {
            action(&mut *entity);
        }
    }
}

/// Run the on-close actions, if any were declared.
pub(crate) fn invoke_on_close(lifecycle: Option<&Lifecycle>, entity: &mut dyn Entity) {
    if let Some(lifecycle) = lifecycle {
        for action in &lifecycle.on_close {
            action(&mut *entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::entity::TextLeaf;

    #[test]
    fn resolve_reports_unknown_names() {
        let actions = Actions::new().with("known", |_| {});
        assert!(actions.resolve("known").is_ok());
        let err = actions.resolve("missing").err().unwrap();
        assert!(matches!(err, BuildError::UnknownAction { name } if name == "missing"));
    }

    #[test]
    fn tables_start_empty() {
        let mut actions = Actions::new();
        assert!(actions.is_empty());
        actions.insert("a", |_| {});
        actions.insert("a", |_| {});
        actions.insert("b", |_| {});
        assert_eq!(actions.len(), 2);

        let mut lifecycle = Lifecycle::default();
        assert!(lifecycle.is_empty());
        lifecycle.push_on_close(Rc::new(|_: &mut dyn Entity| {}));
        assert!(!lifecycle.is_empty());
    }

    #[test]
    fn actions_run_in_declaration_order() {
        let seen = Rc::new(Cell::new(0u32));
        let mut lifecycle = Lifecycle::default();
        let first = Rc::clone(&seen);
        lifecycle.push_on_create(Rc::new(move |_: &mut dyn Entity| first.set(first.get() * 10 + 1)));
        let second = Rc::clone(&seen);
        lifecycle.push_on_create(Rc::new(move |_: &mut dyn Entity| second.set(second.get() * 10 + 2)));

        invoke_on_create(Some(&lifecycle), &mut TextLeaf::new("x"));
        assert_eq!(seen.get(), 12);

        invoke_on_close(Some(&lifecycle), &mut TextLeaf::new("x"));
        assert_eq!(seen.get(), 12);
    }

    #[test]
    fn actions_can_mutate_the_entity() {
        let mut lifecycle = Lifecycle::default();
        lifecycle.push_on_close(Rc::new(|e: &mut dyn Entity| {
            if let Some(leaf) = e.downcast_mut::<TextLeaf>() {
                leaf.text.push('!');
            }
        }));
        let mut leaf = TextLeaf::new("done");
        invoke_on_close(Some(&lifecycle), &mut leaf);
        assert_eq!(leaf.text, "done!");
    }
}
