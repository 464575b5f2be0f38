use serde::{Deserialize, Serialize};
use shared::{domain::Scope, error::PrefsError};

use crate::{accessor::ValueAccessor, codec::JsonCodec, registry::PrefsRegistry};

/// Layout of a two-pane panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewMode {
    Horizontal,
    #[default]
    Vertical,
    Tabs,
}

impl ViewMode {
    pub fn next(self) -> Self {
        match self {
            ViewMode::Horizontal => ViewMode::Vertical,
            ViewMode::Vertical => ViewMode::Tabs,
            ViewMode::Tabs => ViewMode::Horizontal,
        }
    }
}

/// Remembers which layout a split/tab panel was last shown in.
#[derive(Clone)]
pub struct ViewModeSelector {
    pref: ValueAccessor<ViewMode>,
}

impl ViewModeSelector {
    pub fn declare(
        registry: &PrefsRegistry,
        key: &str,
        default: ViewMode,
    ) -> Result<Self, PrefsError> {
        let pref = registry.declare_value(
            key,
            Scope::Extension,
            default,
            Some(JsonCodec::<ViewMode>::shared()),
        )?;
        Ok(Self { pref })
    }

    pub fn view(&self) -> ViewMode {
        self.pref.get()
    }

    pub fn set_view(&self, view: ViewMode) {
        if self.pref.get() != view {
            self.pref.set(view);
        }
    }

    /// Advances to the next layout and returns it.
    pub fn cycle(&self) -> ViewMode {
        let mut next = ViewMode::default();
        self.pref.update(|view| {
            *view = view.next();
            next = *view;
        });
        next
    }

    pub fn on_change(&self, listener: impl Fn(ViewMode, ViewMode) + Send + Sync + 'static) {
        self.pref.on_change(move |old, new| listener(*old, *new));
    }
}

#[cfg(test)]
#[path = "../tests/view_mode_tests.rs"]
mod tests;
