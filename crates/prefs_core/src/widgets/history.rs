use shared::{domain::Scope, error::PrefsError};

use crate::{accessor::ValueAccessor, registry::PrefsRegistry};

type Validator = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;
type SelectionHook = Box<dyn Fn(&str) + Send + Sync>;

/// Bounded, de-duplicated input history backing an editable combo box.
///
/// Entries are persisted oldest first under `key`; the last accepted entry is
/// kept under `{key}_selected`.
pub struct HistoryField {
    history: ValueAccessor<Vec<String>>,
    selected: ValueAccessor<String>,
    max_history: usize,
    validate: Option<Validator>,
    on_select: Option<SelectionHook>,
}

impl HistoryField {
    pub fn declare(
        registry: &PrefsRegistry,
        key: &str,
        max_history: usize,
    ) -> Result<Self, PrefsError> {
        let history = registry.declare_value(key, Scope::Extension, Vec::new(), None)?;
        let selected = registry.declare_value(
            &format!("{key}_selected"),
            Scope::Extension,
            String::new(),
            None,
        )?;
        Ok(Self {
            history,
            selected,
            max_history,
            validate: None,
            on_select: None,
        })
    }

    /// `validate` may rewrite a proposed entry or reject it with `None`.
    pub fn with_validator(
        mut self,
        validate: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.validate = Some(Box::new(validate));
        self
    }

    /// `on_select` receives every value accepted by [`HistoryField::select`].
    /// Silent selections do not trigger it.
    pub fn on_select(mut self, on_select: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_select = Some(Box::new(on_select));
        self
    }

    pub fn key(&self) -> &str {
        self.history.key()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Adds `entry` as most recent, dropping the oldest beyond the limit.
    /// Re-adding an existing entry moves it to the end; blank input is ignored.
    pub fn push(&self, entry: &str) {
        if entry.trim().is_empty() {
            return;
        }
        let max_history = self.max_history;
        self.history.update(|history| {
            history.retain(|existing| existing != entry);
            history.push(entry.to_string());
            if history.len() > max_history {
                let excess = history.len() - max_history;
                history.drain(..excess);
            }
        });
    }

    /// Validates, records and selects a user-entered value.
    /// Returns the accepted value, or `None` if the validator rejected it.
    pub fn select(&self, proposed: &str) -> Option<String> {
        let accepted = match &self.validate {
            Some(validate) => validate(proposed)?,
            None => proposed.to_string(),
        };
        self.push(&accepted);
        self.selected.set(accepted.clone());
        if let Some(on_select) = &self.on_select {
            on_select(&accepted);
        }
        Some(accepted)
    }

    /// Programmatic selection: skips validation but still records the value.
    pub fn select_silently(&self, value: &str) {
        self.push(value);
        self.selected.set(value.to_string());
    }

    pub fn selected(&self) -> String {
        self.selected.get()
    }

    /// Persisted order, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.history.get()
    }

    /// Display order for the dropdown.
    pub fn entries_newest_first(&self) -> Vec<String> {
        let mut entries = self.history.get();
        entries.reverse();
        entries
    }
}

#[cfg(test)]
#[path = "../tests/history_tests.rs"]
mod tests;
