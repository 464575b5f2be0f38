use std::{
    any::{type_name, Any},
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use parking_lot::{Mutex, ReentrantMutex, RwLock};
use shared::{
    domain::Scope,
    error::{PrefsError, StorageError},
};
use storage::StorageBackend;
use tracing::{debug, error, warn};

use crate::codec::{CodecRegistry, SharedCodec};

/// Bound shared by every value type the store can hold.
pub trait PrefValue: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> PrefValue for T {}

pub type RecordHandle<T> = Arc<PreferenceRecord<T>>;

/// Change observer receiving `(old, new)`; either side is `None` when the
/// preference had, or now has, no value.
pub type Listener<T> = Arc<dyn Fn(Option<&T>, Option<&T>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No codec resolved and no load attempted yet.
    Uninitialized,
    /// Codec known, stored blob being read.
    Loading,
    /// Cache populated; writes notify and persist.
    Ready,
}

struct RecordState<T> {
    phase: Phase,
    cached: Option<T>,
    codec: Option<SharedCodec<T>>,
    reported_missing_codec: bool,
    /// Stored blob failed to decode and nothing has been written since.
    unreadable_blob: bool,
}

/// Canonical state for one preference key, shared by every accessor bound to it.
///
/// The state lock covers the load sequence and cache access. Writes are
/// serialized by a separate gate that the writing thread may re-enter, so a
/// listener can read or write the preference it is being notified about.
/// Listeners never run while the state lock is held.
pub struct PreferenceRecord<T> {
    key: String,
    scope: Scope,
    default: Option<T>,
    backend: Arc<dyn StorageBackend>,
    codecs: Arc<CodecRegistry>,
    state: Mutex<RecordState<T>>,
    write_gate: ReentrantMutex<()>,
    listeners: RwLock<Vec<Listener<T>>>,
}

impl<T: PrefValue> PreferenceRecord<T> {
    pub(crate) fn new(
        key: impl Into<String>,
        scope: Scope,
        default: Option<T>,
        codec: Option<SharedCodec<T>>,
        backend: Arc<dyn StorageBackend>,
        codecs: Arc<CodecRegistry>,
    ) -> Self {
        Self {
            key: key.into(),
            scope,
            default,
            backend,
            codecs,
            state: Mutex::new(RecordState {
                phase: Phase::Uninitialized,
                cached: None,
                codec,
                reported_missing_codec: false,
                unreadable_blob: false,
            }),
            write_gate: ReentrantMutex::new(()),
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Default given by the declaration that created this record.
    pub fn default_value(&self) -> Option<&T> {
        self.default.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    pub fn has_codec(&self) -> bool {
        self.state.lock().codec.is_some()
    }

    /// Installs `codec` unless one is already set. Returns whether it was used.
    pub(crate) fn install_codec(&self, codec: SharedCodec<T>) -> bool {
        let mut state = self.state.lock();
        if state.codec.is_some() {
            return false;
        }
        state.codec = Some(codec);
        true
    }

    pub fn add_listener(&self, listener: Listener<T>) {
        self.listeners.write().push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Current value, loading it first if needed.
    ///
    /// Before the record is ready (no codec available yet) the declared
    /// default stands in for a value that was never loaded.
    pub fn current(&self) -> Option<T> {
        self.ensure_ready();
        let state = self.state.lock();
        match state.phase {
            Phase::Ready => state.cached.clone(),
            _ => state.cached.clone().or_else(|| self.default.clone()),
        }
    }

    /// Replaces the value, notifies listeners and persists.
    ///
    /// `None` clears the value and removes the stored entry.
    pub fn write(&self, new: Option<T>) {
        let _gate = self.write_gate.lock();
        self.ensure_ready();

        let (old, ready) = {
            let mut state = self.state.lock();
            let old = std::mem::replace(&mut state.cached, new.clone());
            state.unreadable_blob = false;
            (old, state.phase == Phase::Ready)
        };
        if !ready {
            debug!(key = %self.key, "preference not ready; write kept in memory only");
            return;
        }

        self.notify(old.as_ref(), new.as_ref());
        self.persist();
    }

    /// Read-modify-write under the write gate, so concurrent updates are not lost.
    pub fn update(&self, f: impl FnOnce(Option<T>) -> Option<T>) {
        let _gate = self.write_gate.lock();
        let next = f(self.current());
        self.write(next);
    }

    fn ensure_ready(&self) {
        let mut state = self.state.lock();
        if state.phase == Phase::Ready {
            return;
        }

        if state.codec.is_none() {
            state.codec = self.codecs.resolve::<T>();
        }
        let Some(codec) = state.codec.clone() else {
            if !state.reported_missing_codec {
                state.reported_missing_codec = true;
                warn!(
                    key = %self.key,
                    value_type = type_name::<T>(),
                    "no codec known for preference; keeping value in memory until one is registered"
                );
            }
            return;
        };

        state.phase = Phase::Loading;
        let stored = if self.scope.is_persistent() && self.backend.exists(&self.key) {
            self.backend.get(&self.key)
        } else {
            None
        };

        match stored {
            Some(blob) => match codec.decode(&blob) {
                Ok(value) => state.cached = Some(value),
                Err(source) => {
                    state.unreadable_blob = true;
                    let err = PrefsError::Decode {
                        key: self.key.clone(),
                        source,
                    };
                    error!(key = %self.key, error = %err, "stored preference unreadable; using in-memory value");
                }
            },
            None => state.cached = self.default.clone(),
        }

        state.phase = Phase::Ready;
        debug!(key = %self.key, scope = %self.scope, "preference loaded");
    }

    fn notify(&self, old: Option<&T>, new: Option<&T>) {
        let listeners = self.listeners.read().clone();
        for (index, listener) in listeners.iter().enumerate() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener(old, new)));
            if let Err(payload) = outcome {
                let err = PrefsError::Listener {
                    key: self.key.clone(),
                    message: panic_message(payload.as_ref()),
                };
                error!(key = %self.key, listener = index, error = %err, "preference listener failed");
            }
        }
    }

    fn persist(&self) {
        if !self.scope.is_persistent() {
            return;
        }

        let state = self.state.lock();
        if state.phase != Phase::Ready {
            return;
        }
        let result = match (&state.cached, &state.codec) {
            (None, _) => self.backend.delete(&self.key),
            (Some(value), Some(codec)) => codec
                .encode(value)
                .map_err(StorageError::from)
                .and_then(|blob| self.backend.set(&self.key, &blob)),
            (Some(_), None) => return,
        };

        if let Err(source) = result {
            let err = PrefsError::Persist {
                key: self.key.clone(),
                source,
            };
            error!(key = %self.key, scope = %self.scope, error = %err, "failed to persist preference");
        }
    }
}

impl<T> fmt::Debug for PreferenceRecord<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceRecord")
            .field("key", &self.key)
            .field("scope", &self.scope)
            .field("value_type", &type_name::<T>())
            .finish_non_exhaustive()
    }
}

/// Type-erased view the registry keeps for every record.
pub(crate) trait ErasedRecord: Send + Sync {
    fn key(&self) -> &str;
    fn value_type(&self) -> &'static str;
    fn flush(&self);
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: PrefValue> ErasedRecord for PreferenceRecord<T> {
    fn key(&self) -> &str {
        &self.key
    }

    fn value_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn flush(&self) {
        if self.state.lock().unreadable_blob {
            debug!(key = %self.key, "keeping unreadable stored blob on flush");
            return;
        }
        self.persist();
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "listener panicked".to_string()
    }
}

#[cfg(test)]
#[path = "tests/record_tests.rs"]
mod tests;
