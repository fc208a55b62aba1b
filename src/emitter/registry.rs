//! # Listener registry: registration, removal, derived views.
//!
//! Two keyed registries back every emitter: persistent listeners and
//! once-listeners (cleared per dispatch pass for their type). All
//! registration entry points reduce to [`Emitter::add_listener`], which
//! notifies `newListener` *before* inserting — so a listener registering
//! itself recursively during that notification lands in a well-defined
//! spot and never corrupts the insertion.
//!
//! Rust closures have no identity, so registration hands back a
//! [`ListenerId`] token used for targeted removal, where the original
//! design compared function references.
//!
//! ## Example
//! ```
//! use serde_json::json;
//! use treevent::{Emitter, Event};
//!
//! # fn main() -> Result<(), treevent::EmitError> {
//! let em = Emitter::named("demo");
//! let id = em.on("ping", |_, ev| {
//!     ev.set_result(json!("pong"));
//!     Ok(())
//! })?;
//! assert_eq!(em.listener_count("ping"), 1);
//!
//! em.off("ping", Some(id))?;
//! assert_eq!(em.listener_count("ping"), 0);
//! # Ok(())
//! # }
//! ```

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use serde_json::Value;

use super::Emitter;
use crate::error::{EmitError, ListenerError};
use crate::events::{names, Event};

/// Global sequence counter for listener identity tokens.
static LISTENER_SEQ: AtomicU64 = AtomicU64::new(0);

/// What a listener callback returns; an `Err` is contained at the
/// dispatching emitter and re-emitted there as a local `error` event.
pub type ListenerResult = Result<(), ListenerError>;

pub(crate) type Callback = Rc<dyn Fn(&Emitter, &mut Event) -> ListenerResult>;

/// Identity token for a registered listener, returned at registration and
/// accepted by [`Emitter::off`] for targeted removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        ListenerId(LISTENER_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

pub(crate) struct Registration {
    pub(crate) id: ListenerId,
    pub(crate) callback: Callback,
}

impl Emitter {
    /// Appends a persistent listener for `event_type`.
    pub fn on(
        &self,
        event_type: &str,
        callback: impl Fn(&Emitter, &mut Event) -> ListenerResult + 'static,
    ) -> Result<ListenerId, EmitError> {
        self.add_listener(event_type, callback, false, false)
    }

    /// Appends a listener that is consumed after its first dispatch pass.
    pub fn once(
        &self,
        event_type: &str,
        callback: impl Fn(&Emitter, &mut Event) -> ListenerResult + 'static,
    ) -> Result<ListenerId, EmitError> {
        self.add_listener(event_type, callback, true, false)
    }

    /// Prepends a persistent listener (runs before existing ones).
    pub fn prepend_listener(
        &self,
        event_type: &str,
        callback: impl Fn(&Emitter, &mut Event) -> ListenerResult + 'static,
    ) -> Result<ListenerId, EmitError> {
        self.add_listener(event_type, callback, false, true)
    }

    /// Prepends a once-listener.
    pub fn prepend_once_listener(
        &self,
        event_type: &str,
        callback: impl Fn(&Emitter, &mut Event) -> ListenerResult + 'static,
    ) -> Result<ListenerId, EmitError> {
        self.add_listener(event_type, callback, true, true)
    }

    /// Registers a listener; every other registration entry point reduces
    /// to this.
    ///
    /// Emits [`names::NEW_LISTENER`] (payload: the event-type name) before
    /// the insertion. A callback reacting to that notification may register
    /// further listeners; the pending insertion still lands at the front or
    /// back position it asked for, relative to the registry state left
    /// behind by the notification.
    pub fn add_listener(
        &self,
        event_type: &str,
        callback: impl Fn(&Emitter, &mut Event) -> ListenerResult + 'static,
        once: bool,
        prepend: bool,
    ) -> Result<ListenerId, EmitError> {
        self.emit(names::NEW_LISTENER, Value::String(event_type.to_string()))?;

        let id = ListenerId::next();
        let registration = Registration {
            id,
            callback: Rc::new(callback),
        };
        let mut inner = self.inner().borrow_mut();
        let slot = inner
            .listeners_mut(once)
            .entry(event_type.to_string())
            .or_default();
        if prepend {
            slot.insert(0, registration);
        } else {
            slot.push(registration);
        }
        Ok(id)
    }

    /// Removes listeners for `event_type`.
    ///
    /// With `id = None`, clears every registration (both registries) for the
    /// type silently. With an id, removes its first match from whichever
    /// registry holds it and emits [`names::REMOVE_LISTENER`]. Returns
    /// whether anything was removed; a missing match is a silent no-op.
    pub fn off(&self, event_type: &str, id: Option<ListenerId>) -> Result<bool, EmitError> {
        let Some(id) = id else {
            let mut inner = self.inner().borrow_mut();
            let had_persistent = inner.listeners_mut(false).remove(event_type).is_some();
            let had_once = inner.listeners_once_mut().remove(event_type).is_some();
            return Ok(had_persistent || had_once);
        };

        let removed = {
            let mut inner = self.inner().borrow_mut();
            let mut removed = false;
            for once in [false, true] {
                if let Some(slot) = inner.listeners_mut(once).get_mut(event_type) {
                    if let Some(pos) = slot.iter().position(|r| r.id == id) {
                        slot.remove(pos);
                        removed = true;
                        break;
                    }
                }
            }
            removed
        };
        if removed {
            self.emit(
                names::REMOVE_LISTENER,
                Value::String(event_type.to_string()),
            )?;
        }
        Ok(removed)
    }

    /// Alias for targeted [`Emitter::off`].
    pub fn remove_listener(&self, event_type: &str, id: ListenerId) -> Result<bool, EmitError> {
        self.off(event_type, Some(id))
    }

    /// Removes all listeners, or only those of the given type.
    pub fn remove_all_listeners(&self, event_type: Option<&str>) {
        let mut inner = self.inner().borrow_mut();
        match event_type {
            Some(t) => {
                inner.listeners_mut(false).remove(t);
                inner.listeners_once_mut().remove(t);
            }
            None => inner.clear_listeners(),
        }
    }

    /// Number of listeners registered for the type, across both registries.
    pub fn listener_count(&self, event_type: &str) -> usize {
        let inner = self.inner().borrow();
        let persistent = inner.listeners().get(event_type).map_or(0, Vec::len);
        let once = inner.listeners_once().get(event_type).map_or(0, Vec::len);
        persistent + once
    }

    /// Copy of the listener ids for the type, persistent first then once.
    pub fn listeners(&self, event_type: &str) -> Vec<ListenerId> {
        let inner = self.inner().borrow();
        let mut ids = Vec::new();
        if let Some(slot) = inner.listeners().get(event_type) {
            ids.extend(slot.iter().map(|r| r.id));
        }
        if let Some(slot) = inner.listeners_once().get(event_type) {
            ids.extend(slot.iter().map(|r| r.id));
        }
        ids
    }

    /// The event types with at least one registration, deduplicated across
    /// both registries. Order is unspecified.
    pub fn event_names(&self) -> Vec<String> {
        let inner = self.inner().borrow();
        let mut names: Vec<String> = inner
            .listeners()
            .iter()
            .filter(|(_, regs)| !regs.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        for (name, regs) in inner.listeners_once() {
            if !regs.is_empty() && !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    /// Snapshots the callbacks to run for one dispatch pass: persistent
    /// listeners cloned, once-listeners drained. The borrow is released
    /// before any callback runs.
    pub(crate) fn snapshot_calls(&self, event_type: &str) -> Vec<Callback> {
        let mut inner = self.inner().borrow_mut();
        let mut calls: Vec<Callback> = inner
            .listeners()
            .get(event_type)
            .map(|slot| slot.iter().map(|r| r.callback.clone()).collect())
            .unwrap_or_default();
        if let Some(consumed) = inner.listeners_once_mut().remove(event_type) {
            calls.extend(consumed.into_iter().map(|r| r.callback));
        }
        calls
    }
}
