//! Typed, scoped, observable preference store backing plugin UI state.
//!
//! A [`PrefsRegistry`] owns one [`PreferenceRecord`] per key. Consumers hold
//! typed accessors returned by `declare_value`, `declare_optional` and
//! `observe_existing`; every accessor bound to a key shares its record.

pub mod accessor;
pub mod codec;
pub mod record;
pub mod registry;
pub mod ui_dispatch;
pub mod widgets;

pub use accessor::{OptionalAccessor, ProxyAccessor, ValueAccessor};
pub use codec::{Codec, CodecRegistry, JsonCodec, SharedCodec};
pub use record::{Listener, Phase, PrefValue, PreferenceRecord, RecordHandle};
pub use registry::PrefsRegistry;
pub use shared::{
    domain::Scope,
    error::{CodecError, PrefsError, StorageError},
};
pub use ui_dispatch::{UiDispatcher, UiHandle};
