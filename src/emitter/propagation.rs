//! # The propagation engine: flat emit and the tree-aware walk.
//!
//! Two emission entry points coexist:
//!
//! - [`Emitter::emit`] / [`Emitter::emit_prepared`] — single-level dispatch
//!   on one emitter, no tree walk. This is the pre-hierarchy behavior:
//!   `stop_propagation` on the event performs a full stop.
//! - [`Emitter::emit_event`] — the tree-aware walk. The event's direction
//!   mask and the emitter's traversal order together decide which emitters
//!   receive the event and in what order.
//!
//! ## The walk
//! ```text
//! emit_event(ev, skip):
//!   saturating?  ──► origin local, then get_relations() flat broadcast
//!   otherwise, per order slot (skipping `skip` and denied directions):
//!     LOCAL    ──► own listeners
//!     DOWN     ──► each child,   recurse with skip = UP | SIBLINGS
//!     UP       ──► parent,       recurse with skip = DOWN | SIBLINGS
//!     SIBLINGS ──► each sibling, recurse with skip = SIBLINGS | DOWN | UP
//! ```
//! The skip masks keep the event from bouncing back along the edge it just
//! crossed: children do not re-fan upward or sideways, the parent does not
//! cascade back down into the origin's subtree, siblings receive the event
//! locally only. Permission is re-checked before every recursive step, so a
//! listener cancelling the event mid-walk halts every subsequent direction
//! and subtree visit.
//!
//! Saturating mode replaces the ordered, skip-guided walk with one
//! precomputed full-tree list: once every node must be visited, the
//! order-sensitive skip bookkeeping buys nothing.
//!
//! ## Local dispatch
//! Both paths share one helper. It fails fast on an `error` event with no
//! handlers, drains once-listeners for the type before invoking anything
//! (a listener re-registering itself during dispatch is not called twice in
//! the same pass), re-checks the event's permission between listeners, and
//! converts a listener failure into a local `error` emission on the emitter
//! currently dispatching — not the origin of the walk.

use serde_json::Value;

use super::Emitter;
use crate::error::EmitError;
use crate::events::{names, Directions, Event};

impl Emitter {
    /// Emits `event_type` with the given payload on this emitter only.
    ///
    /// Shorthand constructing the [`Event`] internally; see
    /// [`Emitter::emit_prepared`] for the semantics and return value.
    pub fn emit(&self, event_type: &str, payload: Value) -> Result<bool, EmitError> {
        let mut event = Event::new(event_type).with_payload(payload);
        self.emit_prepared(&mut event)
    }

    /// Single-level dispatch of a prepared event: local listeners only, no
    /// tree walk.
    ///
    /// Marks the event [`EmitMode::Flat`](crate::EmitMode::Flat), so
    /// `stop_propagation` performs a full stop. Returns whether any listener
    /// was invoked. Emitting [`names::ERROR`] with zero handlers fails with
    /// [`EmitError::UnhandledError`].
    pub fn emit_prepared(&self, event: &mut Event) -> Result<bool, EmitError> {
        event.mark_flat();
        event.set_target_if_unset(self.name());
        self.dispatch_local(event)
    }

    /// Tree-aware emission: walks the tree from this emitter, guided by the
    /// event's direction mask and this emitter's traversal order.
    ///
    /// Marks the event [`EmitMode::Tree`](crate::EmitMode::Tree), so
    /// `stop_propagation` becomes a local-only stop. An unhandled `error`
    /// event anywhere in the walk aborts it with the error.
    pub fn emit_event(&self, event: &mut Event) -> Result<(), EmitError> {
        self.emit_event_skipping(event, Directions::NONE)
    }

    /// [`Emitter::emit_event`] with directions to skip at this level.
    ///
    /// The walk itself passes skip masks to keep the event from bouncing
    /// back along the edge it arrived on; callers can use the same knob to
    /// suppress directions for one emission without touching the event mask.
    pub fn emit_event_skipping(
        &self,
        event: &mut Event,
        skip: Directions,
    ) -> Result<(), EmitError> {
        event.mark_tree();
        event.set_target_if_unset(self.name());

        if event.can_propagate_in(Directions::SATURATING) {
            return self.saturate(event);
        }

        // A slot may combine several direction bits; each is tried in flag
        // definition order.
        for slot in self.order().slots() {
            for direction in slot.iter() {
                if skip.intersects(direction) {
                    continue;
                }
                if !event.can_propagate_in(direction) {
                    continue;
                }
                if direction == Directions::LOCAL {
                    if event.phase().is_empty() {
                        event.set_phase(Directions::LOCAL);
                    }
                    self.dispatch_local(event)?;
                } else if direction == Directions::DOWN {
                    event.set_phase(Directions::DOWN);
                    for child in self.get_children() {
                        if !event.can_propagate_in(Directions::DOWN) {
                            break;
                        }
                        child.emit_event_skipping(event, Directions::UP | Directions::SIBLINGS)?;
                    }
                } else if direction == Directions::UP {
                    event.set_phase(Directions::UP);
                    if let Some(parent) = self.get_parent() {
                        if event.can_propagate_in(Directions::UP) {
                            parent.emit_event_skipping(
                                event,
                                Directions::DOWN | Directions::SIBLINGS,
                            )?;
                        }
                    }
                } else if direction == Directions::SIBLINGS {
                    event.set_phase(Directions::SIBLINGS);
                    for sibling in self.get_siblings() {
                        if !event.can_propagate_in(Directions::SIBLINGS) {
                            break;
                        }
                        sibling.emit_event_skipping(
                            event,
                            Directions::SIBLINGS | Directions::DOWN | Directions::UP,
                        )?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Flat broadcast: origin locally, then every relation in the connected
    /// tree, aborting the scan the moment saturating propagation is denied.
    fn saturate(&self, event: &mut Event) -> Result<(), EmitError> {
        let relations = self.get_relations(&[]);

        if event.can_propagate_in(Directions::LOCAL) {
            event.set_phase(Directions::LOCAL);
            self.dispatch_local(event)?;
        }

        event.set_phase(Directions::SATURATING);
        for relation in relations {
            if !event.can_propagate_in(Directions::SATURATING) {
                break;
            }
            relation.dispatch_local(event)?;
        }
        Ok(())
    }

    /// Local dispatch shared by both emission paths.
    fn dispatch_local(&self, event: &mut Event) -> Result<bool, EmitError> {
        if event.event_type() == names::ERROR && self.listener_count(names::ERROR) == 0 {
            return Err(EmitError::UnhandledError {
                emitter: self.name().to_string(),
                detail: event.payload().clone(),
            });
        }

        let event_type = event.event_type().to_string();
        let calls = self.snapshot_calls(&event_type);
        event.set_current_target(self.name());
        if calls.is_empty() {
            return Ok(false);
        }

        for callback in calls {
            if !event.permits_dispatch() {
                break;
            }
            if let Err(failure) = callback(self, event) {
                // Contained: surfaced as a local error event on this
                // emitter; remaining listeners at this level are skipped.
                self.emit(names::ERROR, Value::String(failure.as_message()))?;
                break;
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EmitMode;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    fn log() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn tap(emitter: &Emitter, event_type: &str, log: &Log, tag: &'static str) {
        let log = log.clone();
        emitter
            .on(event_type, move |_, _| {
                log.borrow_mut().push(tag.to_string());
                Ok(())
            })
            .unwrap();
    }

    /// parent01 ── tr ── child01 ── {child11, child12}
    ///          └─ sibling1
    fn reference_tree() -> (Emitter, Emitter, Emitter, Emitter, Emitter, Emitter) {
        let tr = Emitter::named("tr");
        let child01 = Emitter::named("child01");
        let child11 = Emitter::named("child11");
        let child12 = Emitter::named("child12");
        let parent01 = Emitter::named("parent01");
        let sibling1 = Emitter::named("sibling1");
        tr.add_child(&child01).unwrap();
        child01.add_child(&child11).unwrap();
        child01.add_child(&child12).unwrap();
        parent01.add_child(&tr).unwrap();
        parent01.add_child(&sibling1).unwrap();
        (tr, child01, child11, child12, parent01, sibling1)
    }

    #[test]
    fn test_flat_emit_reference_scenario() {
        let tr = Emitter::named("base");
        let log = log();

        let log1 = log.clone();
        tr.on("testevent", move |_, ev| {
            log1.borrow_mut().push("event1".into());
            log1.borrow_mut().push(ev.payload().to_string());
            ev.set_payload(Value::Null);
            ev.set_result(json!("hurray"));
            Ok(())
        })
        .unwrap();
        let log2 = log.clone();
        tr.on("testevent", move |_, ev| {
            log2.borrow_mut().push("event2".into());
            log2.borrow_mut().push(ev.payload().to_string());
            log2.borrow_mut().push(ev.result().to_string());
            ev.cancel_event();
            Ok(())
        })
        .unwrap();
        let log3 = log.clone();
        tr.on("testevent", move |_, _| {
            log3.borrow_mut().push("event3".into());
            Ok(())
        })
        .unwrap();

        assert_eq!(tr.listener_count("testevent"), 3);
        assert_eq!(tr.event_names().pop().as_deref(), Some("testevent"));

        let mut ev = Event::new("testevent").with_payload(json!("testpayload"));
        assert!(tr.emit_prepared(&mut ev).unwrap());

        assert_eq!(
            log.borrow().as_slice(),
            &[
                "event1",
                "\"testpayload\"",
                "event2",
                "null",
                "\"hurray\"",
            ]
        );
        assert_eq!(ev.mode(), EmitMode::Flat);
        assert_eq!(ev.current_target(), Some("base"));
    }

    #[test]
    fn test_once_listener_fires_at_most_once() {
        let em = Emitter::new();
        let log = log();
        tap(&em, "tick", &log, "persistent");
        let log_once = log.clone();
        em.once("tick", move |_, _| {
            log_once.borrow_mut().push("once".into());
            Ok(())
        })
        .unwrap();

        em.emit("tick", Value::Null).unwrap();
        em.emit("tick", Value::Null).unwrap();

        assert_eq!(
            log.borrow().as_slice(),
            &["persistent", "once", "persistent"]
        );
        assert_eq!(em.listener_count("tick"), 1);
    }

    #[test]
    fn test_once_cleared_before_invocation() {
        // A once-listener re-registering itself during dispatch must not be
        // called twice in the same pass.
        let em = Emitter::new();
        let count = Rc::new(RefCell::new(0u32));

        fn arm(em: &Emitter, count: Rc<RefCell<u32>>) {
            let em_inner = em.clone();
            em.once("tick", move |_, _| {
                *count.borrow_mut() += 1;
                arm(&em_inner, count.clone());
                Ok(())
            })
            .unwrap();
        }
        arm(&em, count.clone());

        em.emit("tick", Value::Null).unwrap();
        assert_eq!(*count.borrow(), 1);
        em.emit("tick", Value::Null).unwrap();
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_dispatch_order_persistent_before_once() {
        let em = Emitter::new();
        let log = log();
        let log_once = log.clone();
        em.once("t", move |_, _| {
            log_once.borrow_mut().push("once".into());
            Ok(())
        })
        .unwrap();
        tap(&em, "t", &log, "persistent");
        let log_pre = log.clone();
        em.prepend_listener("t", move |_, _| {
            log_pre.borrow_mut().push("prepended".into());
            Ok(())
        })
        .unwrap();
        let log_pre_once = log.clone();
        em.prepend_once_listener("t", move |_, _| {
            log_pre_once.borrow_mut().push("prepended-once".into());
            Ok(())
        })
        .unwrap();

        // Prepending affects position within a registry only: the once
        // registry as a whole still runs after every persistent listener.
        em.emit("t", Value::Null).unwrap();
        assert_eq!(
            log.borrow().as_slice(),
            &["prepended", "persistent", "prepended-once", "once"]
        );
        em.emit("t", Value::Null).unwrap();
        assert_eq!(log.borrow().len(), 6);
    }

    #[test]
    fn test_unhandled_error_event_fails() {
        let em = Emitter::named("lonely");
        let err = em.emit(names::ERROR, json!("boom")).unwrap_err();
        assert_eq!(err.as_label(), "unhandled_error_event");
        match err {
            EmitError::UnhandledError { emitter, detail } => {
                assert_eq!(emitter, "lonely");
                assert_eq!(detail, json!("boom"));
            }
        }
    }

    #[test]
    fn test_listener_failure_reemitted_locally() {
        let em = Emitter::new();
        let log = log();

        em.on("work", |_, _| Err("exploded".into())).unwrap();
        tap(&em, "work", &log, "after-failure");
        let log_err = log.clone();
        em.on(names::ERROR, move |_, ev| {
            log_err.borrow_mut().push(format!("error:{}", ev.payload()));
            Ok(())
        })
        .unwrap();

        // Contained: emit itself succeeds, the failure becomes an error
        // event and remaining work listeners are skipped.
        assert!(em.emit("work", Value::Null).unwrap());
        assert_eq!(
            log.borrow().as_slice(),
            &["error:\"error: exploded\"".to_string()]
        );
    }

    #[test]
    fn test_listener_failure_without_error_handler_escalates() {
        let em = Emitter::new();
        em.on("work", |_, _| Err("exploded".into())).unwrap();
        let err = em.emit("work", Value::Null).unwrap_err();
        assert_eq!(err.as_label(), "unhandled_error_event");
    }

    #[test]
    fn test_local_only_mask_never_leaves_origin() {
        let (tr, child01, child11, child12, parent01, sibling1) = reference_tree();
        let log = log();
        tap(&tr, "t", &log, "tr");
        for (em, tag) in [
            (&child01, "child01"),
            (&child11, "child11"),
            (&child12, "child12"),
            (&parent01, "parent01"),
            (&sibling1, "sibling1"),
        ] {
            tap(em, "t", &log, tag);
        }
        tr.set_order(
            Directions::DOWN,
            Directions::LOCAL,
            Directions::UP,
            Directions::SIBLINGS,
        );

        let mut ev = Event::new("t").with_propagation(Directions::LOCAL);
        tr.emit_event(&mut ev).unwrap();

        assert_eq!(log.borrow().as_slice(), &["tr"]);
    }

    #[test]
    fn test_tree_walk_reference_order() {
        let (tr, child01, child11, child12, parent01, sibling1) = reference_tree();
        tr.set_order(
            Directions::DOWN,
            Directions::LOCAL,
            Directions::UP,
            Directions::SIBLINGS,
        );
        child01.set_order(
            Directions::DOWN,
            Directions::UP,
            Directions::NONE,
            Directions::NONE,
        );

        let log = log();
        // child01 has no LOCAL slot: its own listener must never fire.
        tap(&child01, "testevent2", &log, "child01");
        tap(&child11, "testevent2", &log, "child11");
        tap(&child12, "testevent2", &log, "child12");
        tap(&tr, "testevent2", &log, "tr-1");
        tap(&tr, "testevent2", &log, "tr-2");
        tap(&parent01, "testevent2", &log, "parent01");
        tap(&sibling1, "testevent2", &log, "sibling1");

        let mut ev = Event::new("testevent2").with_propagation(
            Directions::DOWN | Directions::LOCAL | Directions::UP | Directions::SIBLINGS,
        );
        tr.emit_event(&mut ev).unwrap();

        assert_eq!(
            log.borrow().as_slice(),
            &["child11", "child12", "tr-1", "tr-2", "parent01", "sibling1"]
        );
    }

    #[test]
    fn test_combined_order_slot_walks_each_direction() {
        // One slot carrying LOCAL | DOWN must dispatch both directions, in
        // flag definition order.
        let tr = Emitter::named("tr");
        let child01 = Emitter::named("child01");
        tr.add_child(&child01).unwrap();
        tr.set_order(
            Directions::LOCAL | Directions::DOWN,
            Directions::NONE,
            Directions::NONE,
            Directions::NONE,
        );

        let log = log();
        tap(&tr, "t", &log, "tr");
        tap(&child01, "t", &log, "child01");

        let mut ev = Event::new("t").with_propagation(Directions::LOCAL | Directions::DOWN);
        tr.emit_event(&mut ev).unwrap();

        assert_eq!(log.borrow().as_slice(), &["tr", "child01"]);
    }

    #[test]
    fn test_saturating_broadcast_reaches_every_emitter_once() {
        let (tr, child01, child11, child12, parent01, sibling1) = reference_tree();
        // Traversal orders are irrelevant in saturating mode.
        tr.set_order(
            Directions::UP,
            Directions::NONE,
            Directions::NONE,
            Directions::NONE,
        );

        let log = log();
        for (em, tag) in [
            (&tr, "tr"),
            (&sibling1, "sibling1"),
            (&child01, "child01"),
            (&child11, "child11"),
            (&child12, "child12"),
            (&parent01, "parent01"),
        ] {
            tap(em, "satevent", &log, tag);
        }

        let mut ev = Event::new("satevent")
            .with_propagation(Directions::LOCAL | Directions::SATURATING);
        tr.emit_event(&mut ev).unwrap();

        assert_eq!(
            log.borrow().as_slice(),
            &["tr", "sibling1", "child01", "child11", "child12", "parent01"]
        );
    }

    #[test]
    fn test_saturating_scan_aborts_on_cancel() {
        let (tr, child01, child11, _child12, _parent01, sibling1) = reference_tree();
        let log = log();
        tap(&tr, "sat", &log, "tr");
        tap(&sibling1, "sat", &log, "sibling1");
        let log_cancel = log.clone();
        child01
            .on("sat", move |_, ev| {
                log_cancel.borrow_mut().push("child01".into());
                ev.cancel_event();
                Ok(())
            })
            .unwrap();
        tap(&child11, "sat", &log, "child11");

        let mut ev =
            Event::new("sat").with_propagation(Directions::LOCAL | Directions::SATURATING);
        tr.emit_event(&mut ev).unwrap();

        assert_eq!(log.borrow().as_slice(), &["tr", "sibling1", "child01"]);
    }

    #[test]
    fn test_cancel_during_local_halts_same_level_and_walk() {
        let (tr, child01, child11, _child12, _parent01, _sibling1) = reference_tree();
        let log = log();

        let log_cancel = log.clone();
        tr.on("t", move |_, ev| {
            log_cancel.borrow_mut().push("tr-cancel".into());
            ev.cancel_event();
            Ok(())
        })
        .unwrap();
        tap(&tr, "t", &log, "tr-after");
        tap(&child01, "t", &log, "child01");
        tap(&child11, "t", &log, "child11");

        let mut ev = Event::new("t")
            .with_propagation(Directions::LOCAL | Directions::DOWN | Directions::UP);
        tr.emit_event(&mut ev).unwrap();

        assert_eq!(log.borrow().as_slice(), &["tr-cancel"]);
    }

    #[test]
    fn test_stop_propagation_in_tree_mode_keeps_local_level() {
        let (tr, child01, _child11, _child12, _parent01, _sibling1) = reference_tree();
        let log = log();

        let log_stop = log.clone();
        tr.on("t", move |_, ev| {
            log_stop.borrow_mut().push("tr-stop".into());
            ev.stop_propagation();
            Ok(())
        })
        .unwrap();
        tap(&tr, "t", &log, "tr-after");
        tap(&child01, "t", &log, "child01");

        let mut ev = Event::new("t").with_propagation(Directions::LOCAL | Directions::DOWN);
        tr.emit_event(&mut ev).unwrap();

        // Same-level listener still runs; the DOWN step never happens.
        assert_eq!(log.borrow().as_slice(), &["tr-stop", "tr-after"]);
    }

    #[test]
    fn test_up_walk_does_not_cascade_back_down() {
        let (tr, child01, child11, _child12, parent01, _sibling1) = reference_tree();
        let log = log();
        tap(&parent01, "t", &log, "parent01");
        tap(&child01, "t", &log, "child01");
        tap(&child11, "t", &log, "child11");
        tap(&tr, "t", &log, "tr");

        tr.set_order(
            Directions::LOCAL,
            Directions::UP,
            Directions::NONE,
            Directions::NONE,
        );
        let mut ev = Event::new("t").with_propagation(Directions::LOCAL | Directions::UP);
        tr.emit_event(&mut ev).unwrap();

        // The parent's own DOWN slot is suppressed by the skip mask, so the
        // event never re-enters tr's subtree.
        assert_eq!(log.borrow().as_slice(), &["tr", "parent01"]);
    }

    #[test]
    fn test_unhandled_error_mid_walk_aborts_with_error() {
        let (tr, child01, _child11, _child12, _parent01, _sibling1) = reference_tree();
        tr.on(names::ERROR, |_, _| Ok(())).unwrap();
        // child01 has no error handler; walking an error event into it fails.
        let _ = child01;

        let mut ev = Event::new(names::ERROR)
            .with_payload(json!("boom"))
            .with_propagation(Directions::LOCAL | Directions::DOWN);
        let err = tr.emit_event(&mut ev).unwrap_err();
        match err {
            EmitError::UnhandledError { emitter, .. } => assert_eq!(emitter, "child01"),
        }
    }

    #[test]
    fn test_emit_event_skipping_suppresses_direction() {
        let (tr, child01, child11, child12, _parent01, _sibling1) = reference_tree();
        let log = log();
        tap(&tr, "t", &log, "tr");
        tap(&child01, "t", &log, "child01");
        tap(&child11, "t", &log, "child11");
        tap(&child12, "t", &log, "child12");

        let mut ev = Event::new("t").with_propagation(Directions::LOCAL | Directions::DOWN);
        tr.emit_event_skipping(&mut ev, Directions::DOWN).unwrap();

        assert_eq!(log.borrow().as_slice(), &["tr"]);
    }

    #[test]
    fn test_tree_mutation_mid_walk_is_observed() {
        // A LOCAL listener grafting a new child before the DOWN step: the
        // child snapshot is taken per step, so the graft is visited.
        let tr = Emitter::named("tr");
        let log = log();
        let grafted = Emitter::named("grafted");
        tap(&grafted, "t", &log, "grafted");

        let tr_cb = tr.clone();
        let grafted_cb = grafted.clone();
        let log_local = log.clone();
        tr.on("t", move |_, _| {
            log_local.borrow_mut().push("tr".into());
            tr_cb.add_child(&grafted_cb).unwrap();
            Ok(())
        })
        .unwrap();

        let mut ev = Event::new("t").with_propagation(Directions::LOCAL | Directions::DOWN);
        tr.emit_event(&mut ev).unwrap();

        assert_eq!(log.borrow().as_slice(), &["tr", "grafted"]);
    }
}
