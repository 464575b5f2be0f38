use std::{
    any::type_name,
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;
use shared::{domain::Scope, error::PrefsError};
use storage::StorageBackends;
use tracing::{debug, info};

use crate::{
    accessor::{OptionalAccessor, ProxyAccessor, ValueAccessor},
    codec::{CodecRegistry, SharedCodec},
    record::{ErasedRecord, PrefValue, PreferenceRecord, RecordHandle},
};

/// Process-wide map from preference key to its record.
///
/// Construct one at plugin start, share it as `Arc<PrefsRegistry>`, and call
/// [`PrefsRegistry::shutdown`] from the host's unload hook.
pub struct PrefsRegistry {
    backends: StorageBackends,
    codecs: Arc<CodecRegistry>,
    records: Mutex<HashMap<String, Arc<dyn ErasedRecord>>>,
    shut_down: AtomicBool,
}

impl PrefsRegistry {
    pub fn new(backends: StorageBackends) -> Self {
        Self::with_codecs(backends, CodecRegistry::with_builtin_codecs())
    }

    pub fn with_codecs(backends: StorageBackends, codecs: CodecRegistry) -> Self {
        Self {
            backends,
            codecs: Arc::new(codecs),
            records: Mutex::new(HashMap::new()),
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn backends(&self) -> &StorageBackends {
        &self.backends
    }

    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.lock().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.records.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Returns the record for `key`, creating it on first use.
    ///
    /// The first declaration's scope and default win. A later `codec` is only
    /// installed when the record has none yet.
    ///
    /// # Errors
    ///
    /// [`PrefsError::TypeMismatch`] when `key` already holds another type.
    pub fn get_or_create<T: PrefValue>(
        &self,
        key: &str,
        scope: Scope,
        default: Option<T>,
        codec: Option<SharedCodec<T>>,
    ) -> Result<RecordHandle<T>, PrefsError> {
        let mut records = self.records.lock();
        if let Some(existing) = records.get(key) {
            let record = downcast::<T>(existing)?;
            if let Some(codec) = codec {
                record.install_codec(codec);
            }
            return Ok(record);
        }

        let record = Arc::new(PreferenceRecord::new(
            key,
            scope,
            default,
            codec,
            self.backends.for_scope(scope),
            self.codecs.clone(),
        ));
        records.insert(key.to_string(), record.clone());
        debug!(key, scope = %scope, value_type = type_name::<T>(), "declared preference");
        Ok(record)
    }

    /// Returns the record for a key some other component already declared.
    ///
    /// # Errors
    ///
    /// [`PrefsError::UndeclaredKey`] if nothing declared `key`, or
    /// [`PrefsError::TypeMismatch`] when it holds another type.
    pub fn bind_existing<T: PrefValue>(&self, key: &str) -> Result<RecordHandle<T>, PrefsError> {
        let records = self.records.lock();
        let existing = records.get(key).ok_or_else(|| PrefsError::UndeclaredKey {
            key: key.to_string(),
        })?;
        downcast::<T>(existing)
    }

    /// Persists every loaded, non-transient record.
    pub fn flush_all(&self) {
        let records: Vec<Arc<dyn ErasedRecord>> = self.records.lock().values().cloned().collect();
        for record in &records {
            record.flush();
        }
        debug!(records = records.len(), "flushed preferences");
    }

    /// Flushes once for the host's unload hook; repeat calls do nothing.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            debug!("preference registry already shut down");
            return;
        }
        self.flush_all();
        info!("preference registry shut down");
    }

    pub fn declare_value<T: PrefValue>(
        &self,
        key: &str,
        scope: Scope,
        default: T,
        codec: Option<SharedCodec<T>>,
    ) -> Result<ValueAccessor<T>, PrefsError> {
        let record = self.get_or_create(key, scope, Some(default.clone()), codec)?;
        Ok(ValueAccessor::new(record, default))
    }

    pub fn declare_optional<T: PrefValue>(
        &self,
        key: &str,
        scope: Scope,
        default: Option<T>,
        codec: Option<SharedCodec<T>>,
    ) -> Result<OptionalAccessor<T>, PrefsError> {
        let record = self.get_or_create(key, scope, default, codec)?;
        Ok(OptionalAccessor::new(record))
    }

    /// Binds to a preference declared elsewhere and attaches `on_change`.
    ///
    /// `on_change` receives `(old, new)`; `old` falls back to `new` when the
    /// preference had no value, and clearing the preference is not reported.
    pub fn observe_existing<T, F>(&self, key: &str, on_change: F) -> Result<ProxyAccessor<T>, PrefsError>
    where
        T: PrefValue,
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        let record = self.bind_existing::<T>(key)?;
        let proxy = ProxyAccessor::new(record);
        proxy.on_change(on_change);
        Ok(proxy)
    }
}

fn downcast<T: PrefValue>(existing: &Arc<dyn ErasedRecord>) -> Result<RecordHandle<T>, PrefsError> {
    existing
        .clone()
        .into_any()
        .downcast::<PreferenceRecord<T>>()
        .map_err(|_| PrefsError::TypeMismatch {
            key: existing.key().to_string(),
            declared: existing.value_type(),
            requested: type_name::<T>(),
        })
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
