//! Single-slot cancellable timers.

use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;

/// Holds at most one pending timeout. Arming replaces (and so cancels) the
/// previous one.
#[derive(Default)]
pub struct TimerSlot {
    handle: Option<Timeout>,
    pending: Rc<Cell<bool>>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, millis: u32, callback: impl FnOnce() + 'static) {
        self.cancel();
        let pending = Rc::new(Cell::new(true));
        let flag = pending.clone();
        self.handle = Some(Timeout::new(millis, move || {
            flag.set(false);
            callback();
        }));
        self.pending = pending;
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.cancel();
        }
        self.pending.set(false);
    }

    /// True between `arm` and the callback firing or `cancel`.
    pub fn is_armed(&self) -> bool {
        self.handle.is_some() && self.pending.get()
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}
