use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::error::PrefsError;

use crate::{accessor::ProxyAccessor, registry::PrefsRegistry, ui_dispatch::UiHandle};

type Veto = Box<dyn Fn(bool) -> bool + Send + Sync>;

/// Toggle button state bound to a boolean preference declared elsewhere.
///
/// The displayed state follows the preference; changes made off the UI thread
/// reach it through the dispatcher.
pub struct ToggleBinding {
    pref: ProxyAccessor<bool>,
    displayed: Arc<AtomicBool>,
    veto: Option<Veto>,
}

impl ToggleBinding {
    pub fn bind(registry: &PrefsRegistry, key: &str, ui: &UiHandle) -> Result<Self, PrefsError> {
        let displayed = Arc::new(AtomicBool::new(false));
        let shown = displayed.clone();
        let pref = registry.observe_existing::<bool, _>(
            key,
            ui.listener(move |_old: bool, new: bool| {
                shown.store(new, Ordering::SeqCst);
            }),
        )?;
        displayed.store(pref.get().unwrap_or(false), Ordering::SeqCst);

        Ok(Self {
            pref,
            displayed,
            veto: None,
        })
    }

    /// `veto` sees the requested state and returns whether to commit it.
    pub fn with_veto(mut self, veto: impl Fn(bool) -> bool + Send + Sync + 'static) -> Self {
        self.veto = Some(Box::new(veto));
        self
    }

    pub fn key(&self) -> &str {
        self.pref.key()
    }

    /// What the button currently shows.
    pub fn is_selected(&self) -> bool {
        self.displayed.load(Ordering::SeqCst)
    }

    /// Handles a user click. Returns whether the new state was committed.
    pub fn toggle(&self, requested: bool) -> bool {
        if let Some(veto) = &self.veto {
            if !veto(requested) {
                return false;
            }
        }
        self.pref.set(requested);
        true
    }
}

#[cfg(test)]
#[path = "../tests/toggle_tests.rs"]
mod tests;
