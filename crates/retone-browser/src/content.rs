//! Content-script wiring.
//!
//! Owns the page context, the surface mount and both timers, listens to
//! page events and runtime messages, and carries out the effects the surface
//! state machine asks for.

use std::cell::{OnceCell, RefCell};
use std::rc::{Rc, Weak};

use gloo_events::{EventListener, EventListenerOptions, EventListenerPhase};
use wasm_bindgen::JsCast;
use web_sys::{Event, KeyboardEvent};

use retone_core::control::STATUS_SERVICE_UNREACHABLE;
use retone_core::protocol::REWRITE_FAILED;
use retone_core::{
    Effects, PageContext, PlatformError, PreferenceStore, Preferences, Request, RewriteMode,
    RewriteReply, SelectionTrigger, SurfaceEffect,
};

use crate::chrome::{self, Handled};
use crate::host::{DomSelectionHost, viewport};
use crate::mount::{SurfaceAction, SurfaceMount};
use crate::timer::TimerSlot;
use crate::transport::ChromeStore;

struct Inner {
    page: RefCell<PageContext<DomSelectionHost>>,
    mount: OnceCell<SurfaceMount>,
    debounce: RefCell<TimerSlot>,
    hide: RefCell<TimerSlot>,
    listeners: RefCell<Vec<EventListener>>,
}

impl Inner {
    fn apply(self: &Rc<Self>, effects: Effects) {
        for effect in effects {
            match effect {
                SurfaceEffect::Render => {
                    if let Some(mount) = self.mount.get() {
                        mount.render(self.page.borrow().surface.state());
                    }
                }
                SurfaceEffect::ArmDebounce(ms) => {
                    let weak = Rc::downgrade(self);
                    self.debounce.borrow_mut().arm(ms, move || {
                        with_inner(&weak, |inner| {
                            let effects = inner.page.borrow_mut().on_debounce_elapsed();
                            inner.apply(effects);
                        })
                    });
                }
                SurfaceEffect::CancelDebounce => self.debounce.borrow_mut().cancel(),
                SurfaceEffect::ArmHide(ms) => {
                    let weak = Rc::downgrade(self);
                    self.hide.borrow_mut().arm(ms, move || {
                        with_inner(&weak, |inner| {
                            let effects = inner.page.borrow_mut().on_hide_elapsed();
                            inner.apply(effects);
                        })
                    });
                }
                SurfaceEffect::CancelHide => self.hide.borrow_mut().cancel(),
                SurfaceEffect::RequestRewrite { text, mode } => self.request_rewrite(text, mode),
            }
        }
    }

    fn request_rewrite(self: &Rc<Self>, text: String, mode: RewriteMode) {
        let weak = Rc::downgrade(self);
        wasm_bindgen_futures::spawn_local(async move {
            let message = Request::rewrite(text, mode).to_value();
            let outcome = match chrome::send_to_runtime(&message).await {
                Ok(reply) => serde_json::from_value::<RewriteReply>(reply)
                    .unwrap_or_else(|_| RewriteReply::failed(REWRITE_FAILED))
                    .into_result(),
                Err(e) => {
                    tracing::warn!(target: "retone::content", "background unreachable: {e}");
                    Err(STATUS_SERVICE_UNREACHABLE.to_string())
                }
            };
            with_inner(&weak, |inner| {
                let effects = inner.page.borrow_mut().on_rewrite_response(outcome);
                inner.apply(effects);
            });
        });
    }

    fn on_action(self: &Rc<Self>, action: SurfaceAction) {
        let effects = {
            let mut page = self.page.borrow_mut();
            match action {
                SurfaceAction::Mode(mode) => page.on_mode_selected(mode),
                SurfaceAction::Rewrite => page.on_rewrite_clicked(),
                SurfaceAction::Close => page.on_close(),
            }
        };
        self.apply(effects);
    }

    fn on_message(self: &Rc<Self>, request: Request) -> Option<serde_json::Value> {
        let (reply, effects) = self.page.borrow_mut().handle_message(request);
        self.apply(effects);
        reply.map(|r| r.to_value())
    }

    fn set_enabled(self: &Rc<Self>, enabled: bool) {
        let effects = self.page.borrow_mut().surface.set_enabled(enabled);
        self.apply(effects);
    }

    fn is_own_event(&self, event: &Event) -> bool {
        self.mount.get().is_some_and(|mount| mount.contains_event(event))
    }

    fn teardown(self: &Rc<Self>) {
        let effects = self.page.borrow_mut().teardown();
        self.apply(effects);
        self.listeners.borrow_mut().clear();
        if let Some(mount) = self.mount.get() {
            mount.detach();
        }
        tracing::debug!(target: "retone::content", "content script torn down");
    }
}

fn with_inner(weak: &Weak<Inner>, f: impl FnOnce(&Rc<Inner>)) {
    if let Some(inner) = weak.upgrade() {
        f(&inner);
    }
}

/// The running content script. Dropping it detaches page listeners; the
/// runtime listeners hold only weak references.
pub struct ContentScript {
    inner: Rc<Inner>,
}

impl ContentScript {
    pub fn start() -> Result<Self, PlatformError> {
        let host = DomSelectionHost::from_global()
            .ok_or_else(|| PlatformError::from("no window or document"))?;
        let document = host.document().clone();
        let window = web_sys::window().ok_or_else(|| PlatformError::from("no window"))?;

        let inner = Rc::new(Inner {
            page: RefCell::new(PageContext::new(
                host,
                Preferences::default().inline_bubble_enabled,
                viewport(),
            )),
            mount: OnceCell::new(),
            debounce: RefCell::new(TimerSlot::new()),
            hide: RefCell::new(TimerSlot::new()),
            listeners: RefCell::new(Vec::new()),
        });

        let weak = Rc::downgrade(&inner);
        let mount = SurfaceMount::attach(&document, move |action| {
            with_inner(&weak, |inner| inner.on_action(action))
        })?;
        let _ = inner.mount.set(mount);

        let mut listeners = Vec::new();

        let weak = Rc::downgrade(&inner);
        listeners.push(EventListener::new(&document, "mouseup", move |event| {
            with_inner(&weak, |inner| {
                if inner.is_own_event(event) {
                    return;
                }
                let effects = inner.page.borrow_mut().on_selection_event(SelectionTrigger::MouseUp);
                inner.apply(effects);
            })
        }));

        let weak = Rc::downgrade(&inner);
        listeners.push(EventListener::new(&document, "keyup", move |event| {
            with_inner(&weak, |inner| {
                if inner.is_own_event(event) {
                    return;
                }
                let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
                    return;
                };
                let effects = inner.page.borrow_mut().on_key_up(&key);
                inner.apply(effects);
            })
        }));

        let weak = Rc::downgrade(&inner);
        listeners.push(EventListener::new(&document, "selectionchange", move |_| {
            with_inner(&weak, |inner| {
                let effects = inner
                    .page
                    .borrow_mut()
                    .on_selection_event(SelectionTrigger::SelectionChange);
                inner.apply(effects);
            })
        }));

        let passive_capture = EventListenerOptions {
            phase: EventListenerPhase::Capture,
            passive: true,
        };
        for event_type in ["scroll", "resize"] {
            let weak = Rc::downgrade(&inner);
            listeners.push(EventListener::new_with_options(
                &window,
                event_type,
                passive_capture,
                move |_| {
                    with_inner(&weak, |inner| {
                        let effects = inner.page.borrow_mut().on_viewport_change(viewport());
                        inner.apply(effects);
                    })
                },
            ));
        }

        let weak = Rc::downgrade(&inner);
        listeners.push(EventListener::new(&window, "pagehide", move |_| {
            with_inner(&weak, |inner| inner.teardown())
        }));

        *inner.listeners.borrow_mut() = listeners;

        let weak = Rc::downgrade(&inner);
        chrome::on_runtime_message(move |message, responder| {
            let Some(request) = Request::from_value(&message) else {
                return Handled::Ignored;
            };
            let Some(inner) = weak.upgrade() else {
                return Handled::Ignored;
            };
            match inner.on_message(request) {
                Some(reply) => {
                    responder.send(&reply);
                    Handled::Replied
                }
                None => Handled::Ignored,
            }
        })?;

        let weak = Rc::downgrade(&inner);
        chrome::on_sync_storage_changed(move |changes| {
            let Some(prefs) = Preferences::from_change(&changes) else {
                return;
            };
            with_inner(&weak, |inner| inner.set_enabled(prefs.inline_bubble_enabled));
        })?;

        let weak = Rc::downgrade(&inner);
        wasm_bindgen_futures::spawn_local(async move {
            let prefs = match ChromeStore.load().await {
                Ok(prefs) => prefs,
                Err(e) => {
                    tracing::debug!(target: "retone::content", "using default preferences: {e}");
                    Preferences::default()
                }
            };
            with_inner(&weak, |inner| inner.set_enabled(prefs.inline_bubble_enabled));
        });

        tracing::info!(target: "retone::content", "content script started");
        Ok(Self { inner })
    }

    /// Apply a preference change to this page.
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.set_enabled(enabled);
    }

    pub fn teardown(&self) {
        self.inner.teardown();
    }
}
