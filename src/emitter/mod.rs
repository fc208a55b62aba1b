//! Emitter core: listener registry, tree links, and propagation.
//!
//! The only public type from this module is [`Emitter`], a cheaply-cloneable
//! handle over shared state. Handles compare by identity: two clones of the
//! same emitter are equal, two separately-constructed emitters never are.
//!
//! Internal modules:
//! - [`registry`]: listener storage and bookkeeping (`on` / `once` / `off`);
//! - [`tree`]: parent/children links, siblings, relations;
//! - [`propagation`]: flat `emit` and the tree-aware `emit_event` walk.
//!
//! Everything is single-threaded and synchronous: internals are
//! `Rc<RefCell<..>>`, the parent link is a non-owning `Weak` back reference,
//! and no borrow is held across a listener invocation, so listeners may
//! freely mutate the registry and the tree mid-dispatch.

mod propagation;
mod registry;
mod tree;

pub use registry::{ListenerId, ListenerResult};

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use crate::config::EmitterConfig;
use crate::events::{Directions, TraversalOrder};
use registry::Registration;

/// Global sequence counter for auto-generated emitter names.
static EMITTER_SEQ: AtomicU64 = AtomicU64::new(0);

pub(crate) struct Inner {
    name: Arc<str>,
    listeners: HashMap<String, Vec<Registration>>,
    listeners_once: HashMap<String, Vec<Registration>>,
    parent: Weak<RefCell<Inner>>,
    children: Vec<Emitter>,
    removing: Vec<Emitter>,
    order: TraversalOrder,
    max_listeners: usize,
}

/// A node in an event-propagation tree.
///
/// Created empty (no parent, no children, default traversal order) and
/// linked explicitly via [`Emitter::add_child`]. Removal detaches links but
/// keeps listener state; [`Emitter::shutdown`] clears listeners and detaches
/// from both sides to break reference cycles.
#[derive(Clone)]
pub struct Emitter {
    inner: Rc<RefCell<Inner>>,
}

impl Emitter {
    /// Creates an unnamed emitter with default configuration.
    pub fn new() -> Self {
        Self::with_config(EmitterConfig::default())
    }

    /// Creates a named emitter with default configuration.
    ///
    /// The name shows up in [`Event::target`](crate::Event::target) /
    /// [`Event::current_target`](crate::Event::current_target) and in error
    /// messages.
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self::named_with_config(name, EmitterConfig::default())
    }

    /// Creates an unnamed emitter with the given configuration.
    pub fn with_config(config: EmitterConfig) -> Self {
        let seq = EMITTER_SEQ.fetch_add(1, AtomicOrdering::Relaxed);
        Self::named_with_config(format!("emitter-{seq}").as_str(), config)
    }

    /// Creates a named emitter with the given configuration.
    pub fn named_with_config(name: impl Into<Arc<str>>, config: EmitterConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                name: name.into(),
                listeners: HashMap::new(),
                listeners_once: HashMap::new(),
                parent: Weak::new(),
                children: Vec::new(),
                removing: Vec::new(),
                order: config.order,
                max_listeners: config.max_listeners,
            })),
        }
    }

    /// The emitter's diagnostic name.
    pub fn name(&self) -> Arc<str> {
        self.inner.borrow().name.clone()
    }

    /// Current direction-traversal order.
    pub fn order(&self) -> TraversalOrder {
        self.inner.borrow().order
    }

    /// Replaces the traversal order; duplicate directions are suppressed
    /// after their first occurrence.
    pub fn set_order(&self, d1: Directions, d2: Directions, d3: Directions, d4: Directions) {
        self.inner.borrow_mut().order = TraversalOrder::new(d1, d2, d3, d4);
    }

    /// Advisory listener cap (0 = unlimited). Never enforced.
    pub fn max_listeners(&self) -> usize {
        self.inner.borrow().max_listeners
    }

    /// Updates the advisory listener cap.
    pub fn set_max_listeners(&self, n: usize) {
        self.inner.borrow_mut().max_listeners = n;
    }

    /// Identity comparison: true iff both handles point at the same emitter.
    pub fn same(&self, other: &Emitter) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn inner(&self) -> &Rc<RefCell<Inner>> {
        &self.inner
    }

    pub(crate) fn from_inner(inner: Rc<RefCell<Inner>>) -> Self {
        Self { inner }
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Emitter {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Emitter {}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Emitter")
            .field("name", &inner.name)
            .field("children", &inner.children.len())
            .field("has_parent", &inner.parent.upgrade().is_some())
            .field("order", &inner.order)
            .finish()
    }
}

impl Inner {
    pub(crate) fn listeners_mut(&mut self, once: bool) -> &mut HashMap<String, Vec<Registration>> {
        if once {
            &mut self.listeners_once
        } else {
            &mut self.listeners
        }
    }

    pub(crate) fn listeners(&self) -> &HashMap<String, Vec<Registration>> {
        &self.listeners
    }

    pub(crate) fn listeners_once(&self) -> &HashMap<String, Vec<Registration>> {
        &self.listeners_once
    }

    pub(crate) fn listeners_once_mut(&mut self) -> &mut HashMap<String, Vec<Registration>> {
        &mut self.listeners_once
    }

    pub(crate) fn clear_listeners(&mut self) {
        self.listeners.clear();
        self.listeners_once.clear();
    }

    pub(crate) fn parent(&self) -> Option<Emitter> {
        self.parent.upgrade().map(Emitter::from_inner)
    }

    pub(crate) fn set_parent(&mut self, parent: Weak<RefCell<Inner>>) {
        self.parent = parent;
    }

    pub(crate) fn children(&self) -> &Vec<Emitter> {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Emitter> {
        &mut self.children
    }

    pub(crate) fn removing(&self) -> &Vec<Emitter> {
        &self.removing
    }

    pub(crate) fn removing_mut(&mut self) -> &mut Vec<Emitter> {
        &mut self.removing
    }
}
