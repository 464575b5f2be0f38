//! Typed handles consumers use to read, write and observe one preference.

use std::sync::Arc;

use shared::domain::Scope;

use crate::record::{PrefValue, RecordHandle};

/// Accessor for a preference that always has a value.
#[derive(Clone)]
pub struct ValueAccessor<T> {
    record: RecordHandle<T>,
    default: T,
}

impl<T: PrefValue> ValueAccessor<T> {
    pub(crate) fn new(record: RecordHandle<T>, default: T) -> Self {
        Self { record, default }
    }

    pub fn key(&self) -> &str {
        self.record.key()
    }

    pub fn scope(&self) -> Scope {
        self.record.scope()
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn get(&self) -> T {
        self.record
            .current()
            .unwrap_or_else(|| self.default.clone())
    }

    pub fn set(&self, value: T) {
        self.record.write(Some(value));
    }

    /// Applies `f` to the current value and writes the result back atomically.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let default = &self.default;
        self.record.update(|current| {
            let mut value = current.unwrap_or_else(|| default.clone());
            f(&mut value);
            Some(value)
        });
    }

    /// Observes changes; a cleared value is reported as this accessor's default.
    pub fn on_change(&self, listener: impl Fn(&T, &T) + Send + Sync + 'static) {
        let default = self.default.clone();
        self.record.add_listener(Arc::new(move |old: Option<&T>, new: Option<&T>| {
            listener(old.unwrap_or(&default), new.unwrap_or(&default))
        }));
    }

    pub fn record(&self) -> &RecordHandle<T> {
        &self.record
    }
}

/// Accessor for a preference that may be unset.
#[derive(Clone)]
pub struct OptionalAccessor<T> {
    record: RecordHandle<T>,
}

impl<T: PrefValue> OptionalAccessor<T> {
    pub(crate) fn new(record: RecordHandle<T>) -> Self {
        Self { record }
    }

    pub fn key(&self) -> &str {
        self.record.key()
    }

    pub fn scope(&self) -> Scope {
        self.record.scope()
    }

    pub fn get(&self) -> Option<T> {
        self.record.current()
    }

    /// `None` clears the value and deletes the stored entry.
    pub fn set(&self, value: Option<T>) {
        self.record.write(value);
    }

    pub fn clear(&self) {
        self.record.write(None);
    }

    pub fn on_change(&self, listener: impl Fn(Option<&T>, Option<&T>) + Send + Sync + 'static) {
        self.record.add_listener(Arc::new(listener));
    }

    pub fn record(&self) -> &RecordHandle<T> {
        &self.record
    }
}

/// Accessor bound to a preference declared by another component. It cannot
/// choose the scope or default; it only observes and writes.
#[derive(Clone)]
pub struct ProxyAccessor<T> {
    record: RecordHandle<T>,
}

impl<T: PrefValue> ProxyAccessor<T> {
    pub(crate) fn new(record: RecordHandle<T>) -> Self {
        Self { record }
    }

    pub fn key(&self) -> &str {
        self.record.key()
    }

    /// Current value, or the declaring component's default when unset.
    pub fn get(&self) -> Option<T> {
        self.record
            .current()
            .or_else(|| self.record.default_value().cloned())
    }

    pub fn set(&self, value: T) {
        self.record.write(Some(value));
    }

    pub fn on_change(&self, listener: impl Fn(&T, &T) + Send + Sync + 'static) {
        self.record.add_listener(Arc::new(move |old: Option<&T>, new: Option<&T>| {
            let Some(new) = new else {
                return;
            };
            listener(old.unwrap_or(new), new)
        }));
    }

    pub fn record(&self) -> &RecordHandle<T> {
        &self.record
    }
}

#[cfg(test)]
#[path = "tests/accessor_tests.rs"]
mod tests;
