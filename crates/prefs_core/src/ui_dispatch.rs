//! Delivery of preference change effects onto the UI thread.
//!
//! Listeners fire on whichever thread performed the write. UI-facing
//! listeners route through [`UiHandle::deliver`] (or wrap themselves with
//! [`UiHandle::listener`]) so widget state is only touched by the UI loop.

use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread::{self, ThreadId},
};

use crossbeam_channel::{Receiver, Sender};
use tracing::{error, warn};

use crate::record::PrefValue;

type UiJob = Box<dyn FnOnce() + Send>;

/// Owned by the UI loop; drains queued jobs with [`UiDispatcher::run_pending`].
pub struct UiDispatcher {
    rx: Receiver<UiJob>,
    handle: UiHandle,
}

/// Cloneable sender side, safe to move into listeners on any thread.
#[derive(Clone)]
pub struct UiHandle {
    ui_thread: ThreadId,
    tx: Sender<UiJob>,
}

impl UiDispatcher {
    /// Creates a dispatcher whose UI thread is the calling thread.
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            rx,
            handle: UiHandle {
                ui_thread: thread::current().id(),
                tx,
            },
        }
    }

    pub fn handle(&self) -> UiHandle {
        self.handle.clone()
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Runs every queued job on the calling thread and returns how many ran.
    pub fn run_pending(&self) -> usize {
        if !self.handle.is_ui_thread() {
            warn!("ui jobs drained off the ui thread");
        }

        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                error!("ui job panicked");
            }
            ran += 1;
        }
        ran
    }
}

impl Default for UiDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl UiHandle {
    pub fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.ui_thread
    }

    /// Runs `job` now when called on the UI thread, otherwise queues it.
    pub fn deliver(&self, job: impl FnOnce() + Send + 'static) {
        if self.is_ui_thread() {
            job();
            return;
        }
        if self.tx.send(Box::new(job)).is_err() {
            warn!("ui dispatcher is gone; dropping ui update");
        }
    }

    /// Wraps `f` into an `(old, new)` listener that runs on the UI thread.
    pub fn listener<T, F>(&self, f: F) -> impl Fn(&T, &T) + Send + Sync + 'static
    where
        T: PrefValue,
        F: Fn(T, T) + Send + Sync + 'static,
    {
        let ui = self.clone();
        let f = Arc::new(f);
        move |old: &T, new: &T| {
            let f = f.clone();
            let (old, new) = (old.clone(), new.clone());
            ui.deliver(move || f(old, new));
        }
    }
}

#[cfg(test)]
#[path = "tests/ui_dispatch_tests.rs"]
mod tests;
