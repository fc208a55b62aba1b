//! # The event object carried through an emitter tree.
//!
//! [`Event`] bundles an immutable type name with two listener-mutable values
//! (`payload`, `result`, last-writer-wins) and the propagation state that the
//! walk consults at every boundary: the direction mask, the derived `bubbles`
//! gate, the current phase, and the dispatch mode.
//!
//! ## Mask and bubbles
//! The mask holds the directions still permitted for this emission. `bubbles`
//! is derived: true iff the mask has more than [`Directions::LOCAL`] set. It
//! acts as a master gate over every non-local direction — once false, UP /
//! DOWN / SIBLINGS / SATURATING are all denied even if their bits remain.
//!
//! ## Dispatch mode
//! [`EmitMode`] records which emit path last touched the event and selects
//! the behavior of [`Event::stop_propagation`]:
//! - `Flat` (the single-level [`emit`](crate::Emitter::emit) path): full
//!   stop, the mask is cleared entirely.
//! - `Tree` ([`emit_event`](crate::Emitter::emit_event)): local-only stop,
//!   the mask is restricted to `LOCAL` so current-level listeners still run
//!   but no further tree traversal happens.
//!
//! The mode is last-writer-wins: an event legally passed through `emit` and
//! then `emit_event` (or vice versa) changes its `stop_propagation`
//! semantics accordingly. Events are cheap; construct one per emission
//! rather than sharing an instance across unrelated emissions.
//!
//! ## Example
//! ```
//! use serde_json::json;
//! use treevent::{Directions, Event};
//!
//! let mut ev = Event::new("testevent").with_payload(json!("testpayload"));
//! assert_eq!(ev.propagation(), Directions::LOCAL | Directions::UP | Directions::DOWN);
//! assert!(ev.bubbles());
//!
//! ev.set_propagation(Directions::LOCAL);
//! assert!(!ev.bubbles());
//! assert!(ev.can_propagate_in(Directions::LOCAL));
//! assert!(!ev.can_propagate_in(Directions::DOWN));
//! ```

use std::sync::Arc;

use serde_json::Value;

use super::direction::Directions;

/// Which emit path last dispatched the event.
///
/// Selects [`Event::stop_propagation`] semantics; see the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitMode {
    /// Single-level dispatch (`emit`); `stop_propagation` clears the mask.
    Flat,
    /// Tree-aware dispatch (`emit_event`); `stop_propagation` keeps `LOCAL`.
    Tree,
}

/// A single emission travelling through an emitter tree.
#[derive(Debug, Clone)]
pub struct Event {
    event_type: Arc<str>,
    payload: Value,
    result: Value,
    propagation: Directions,
    bubbles: bool,
    phase: Directions,
    mode: EmitMode,
    target: Option<Arc<str>>,
    current_target: Option<Arc<str>>,
}

fn derives_bubbles(mask: Directions) -> bool {
    !mask.difference(Directions::LOCAL).is_empty()
}

impl Event {
    /// Creates an event of the given type with the default mask
    /// `LOCAL | UP | DOWN`, no payload and no result.
    pub fn new(event_type: impl Into<Arc<str>>) -> Self {
        let propagation = Directions::LOCAL | Directions::UP | Directions::DOWN;
        Self {
            event_type: event_type.into(),
            payload: Value::Null,
            result: Value::Null,
            propagation,
            bubbles: derives_bubbles(propagation),
            phase: Directions::NONE,
            mode: EmitMode::Flat,
            target: None,
            current_target: None,
        }
    }

    /// Attaches a payload.
    #[inline]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Attaches the originating emitter's name.
    ///
    /// Normally set automatically by the first emit entry point.
    #[inline]
    pub fn with_target(mut self, target: impl Into<Arc<str>>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Sets the propagation mask (builder form of [`Event::set_propagation`]).
    #[inline]
    pub fn with_propagation(mut self, mask: Directions) -> Self {
        self.set_propagation(mask);
        self
    }

    /// The immutable type name.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Current payload value.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Replaces the payload (listeners may call this; last writer wins).
    pub fn set_payload(&mut self, payload: Value) {
        self.payload = payload;
    }

    /// Current result value.
    pub fn result(&self) -> &Value {
        &self.result
    }

    /// Replaces the result (listeners may call this; last writer wins).
    pub fn set_result(&mut self, result: Value) {
        self.result = result;
    }

    /// Directions still permitted for this emission.
    pub fn propagation(&self) -> Directions {
        self.propagation
    }

    /// Replaces the mask and recomputes `bubbles`.
    pub fn set_propagation(&mut self, mask: Directions) {
        self.propagation = mask;
        self.bubbles = derives_bubbles(mask);
    }

    /// Master gate over all non-local directions.
    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// Direction currently being processed ([`Directions::NONE`] initially).
    pub fn phase(&self) -> Directions {
        self.phase
    }

    /// Name of the emitter the event was first emitted on.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Name of the emitter currently dispatching the event.
    pub fn current_target(&self) -> Option<&str> {
        self.current_target.as_deref()
    }

    /// Which emit path last dispatched this event.
    pub fn mode(&self) -> EmitMode {
        self.mode
    }

    /// Stops further propagation; semantics depend on [`Event::mode`].
    ///
    /// - `Flat`: clears the mask entirely (remaining local listeners do
    ///   not run).
    /// - `Tree`: restricts the mask to `LOCAL` (current-level listeners
    ///   still run, no further tree traversal).
    ///
    /// `bubbles` is forced false either way.
    pub fn stop_propagation(&mut self) {
        match self.mode {
            EmitMode::Flat => self.propagation = Directions::NONE,
            EmitMode::Tree => self.propagation &= Directions::LOCAL,
        }
        self.bubbles = false;
    }

    /// Zeroes the mask unconditionally: stops remaining listeners at the
    /// current level and every further tree step.
    pub fn cancel_event(&mut self) {
        self.propagation = Directions::NONE;
        self.bubbles = false;
    }

    /// Alias for [`Event::cancel_event`].
    pub fn stop_immediate_propagation(&mut self) {
        self.cancel_event();
    }

    /// True iff any direction is still permitted.
    pub fn can_propagate(&self) -> bool {
        !self.propagation.is_empty()
    }

    /// True iff the given direction is still permitted.
    ///
    /// `LOCAL` only needs its bit; every other direction needs its bit AND
    /// `bubbles`. Passing `NONE` falls back to [`Event::can_propagate`].
    pub fn can_propagate_in(&self, direction: Directions) -> bool {
        if direction.is_empty() {
            return self.can_propagate();
        }
        if direction == Directions::LOCAL {
            return self.propagation.contains(Directions::LOCAL);
        }
        self.bubbles && self.propagation.contains(direction)
    }

    /// Permission check used between listeners of one local dispatch pass:
    /// flat mode checks the whole mask, tree mode checks the current phase.
    pub(crate) fn permits_dispatch(&self) -> bool {
        match self.mode {
            EmitMode::Flat => self.can_propagate(),
            EmitMode::Tree => self.can_propagate_in(self.phase),
        }
    }

    pub(crate) fn mark_flat(&mut self) {
        self.mode = EmitMode::Flat;
    }

    pub(crate) fn mark_tree(&mut self) {
        self.mode = EmitMode::Tree;
    }

    pub(crate) fn set_phase(&mut self, phase: Directions) {
        self.phase = phase;
    }

    pub(crate) fn set_target_if_unset(&mut self, target: Arc<str>) {
        if self.target.is_none() {
            self.target = Some(target);
        }
    }

    pub(crate) fn set_current_target(&mut self, target: Arc<str>) {
        self.current_target = Some(target);
    }
}
