use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    marker::PhantomData,
    sync::Arc,
};

use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use shared::error::CodecError;

/// Converts a typed value to and from the string blob kept by a backend.
///
/// Implementations must round-trip: `decode(&encode(x)?)? == x`.
pub trait Codec<T>: Send + Sync {
    fn encode(&self, value: &T) -> Result<String, CodecError>;
    fn decode(&self, blob: &str) -> Result<T, CodecError>;
}

pub type SharedCodec<T> = Arc<dyn Codec<T>>;

/// JSON codec over serde; unknown fields in stored objects are ignored.
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned + 'static> JsonCodec<T> {
    pub fn shared() -> SharedCodec<T> {
        Arc::new(Self::new())
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsonCodec<{}>", std::any::type_name::<T>())
    }
}

impl<T: Serialize + DeserializeOwned> Codec<T> for JsonCodec<T> {
    fn encode(&self, value: &T) -> Result<String, CodecError> {
        serde_json::to_string(value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(&self, blob: &str) -> Result<T, CodecError> {
        serde_json::from_str(blob).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

/// Type-keyed codec table consulted when a preference is declared without an
/// explicit codec. Lookups happen lazily on a record's first access, so codecs
/// registered after a declaration are still picked up.
#[derive(Default)]
pub struct CodecRegistry {
    codecs: RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// JSON codecs for the scalar and collection types widgets commonly persist.
    pub fn with_builtin_codecs() -> Self {
        let registry = Self::new();
        registry.register_json::<String>();
        registry.register_json::<bool>();
        registry.register_json::<i32>();
        registry.register_json::<i64>();
        registry.register_json::<u32>();
        registry.register_json::<u64>();
        registry.register_json::<f64>();
        registry.register_json::<Vec<String>>();
        registry.register_json::<serde_json::Value>();
        registry
    }

    /// Registers `codec` for `T`, replacing any earlier registration.
    pub fn register<T: 'static>(&self, codec: SharedCodec<T>) {
        self.codecs
            .write()
            .insert(TypeId::of::<T>(), Box::new(codec));
    }

    pub fn register_json<T>(&self)
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        self.register::<T>(JsonCodec::<T>::shared());
    }

    pub fn resolve<T: 'static>(&self) -> Option<SharedCodec<T>> {
        self.codecs
            .read()
            .get(&TypeId::of::<T>())
            .and_then(|codec| codec.downcast_ref::<SharedCodec<T>>())
            .cloned()
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.codecs.read().contains_key(&TypeId::of::<T>())
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("registered", &self.codecs.read().len())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/codec_tests.rs"]
mod tests;
