//! Headless widget-state models persisted through the preference store.

pub mod history;
pub mod toggle;
pub mod view_mode;

pub use history::HistoryField;
pub use toggle::ToggleBinding;
pub use view_mode::{ViewMode, ViewModeSelector};
