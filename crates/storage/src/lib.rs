//! Scoped key → string blob stores backing the preference registry.

use std::{collections::HashMap, fmt, sync::Arc};

use parking_lot::RwLock;
use shared::{domain::Scope, error::StorageError};

mod file;

pub use file::FileBackend;

/// Key/blob store for one persistence scope.
///
/// Absence of a key means "nothing stored", never "stored empty string".
pub trait StorageBackend: Send + Sync {
    fn exists(&self, key: &str) -> bool;
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, blob: &str) -> Result<(), StorageError>;
    fn delete(&self, key: &str) -> Result<(), StorageError>;
    /// Keys currently stored, in no particular order.
    fn keys(&self) -> Vec<String>;
}

/// Null backend for [`Scope::Transient`]: stores nothing, reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransientBackend;

impl StorageBackend for TransientBackend {
    fn exists(&self, _key: &str) -> bool {
        false
    }

    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _blob: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn delete(&self, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        Vec::new()
    }
}

/// In-memory backend. Clones share the same map, so a clone handed to a fresh
/// registry behaves like the host store surviving a reload.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl StorageBackend for MemoryBackend {
    fn exists(&self, key: &str) -> bool {
        self.inner.read().contains_key(key)
    }

    fn get(&self, key: &str) -> Option<String> {
        self.inner.read().get(key).cloned()
    }

    fn set(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        self.inner
            .write()
            .insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.inner.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.inner.read().keys().cloned().collect()
    }
}

/// The backend used for each scope. `Transient` is always the null backend.
#[derive(Clone)]
pub struct StorageBackends {
    extension: Arc<dyn StorageBackend>,
    project: Arc<dyn StorageBackend>,
    transient: Arc<dyn StorageBackend>,
}

impl StorageBackends {
    pub fn new(extension: Arc<dyn StorageBackend>, project: Arc<dyn StorageBackend>) -> Self {
        Self {
            extension,
            project,
            transient: Arc::new(TransientBackend),
        }
    }

    /// Fresh, unshared in-memory stores for both persistent scopes.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryBackend::new()),
            Arc::new(MemoryBackend::new()),
        )
    }

    pub fn for_scope(&self, scope: Scope) -> Arc<dyn StorageBackend> {
        match scope {
            Scope::Extension => self.extension.clone(),
            Scope::Project => self.project.clone(),
            Scope::Transient => self.transient.clone(),
        }
    }
}

impl fmt::Debug for StorageBackends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageBackends").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
