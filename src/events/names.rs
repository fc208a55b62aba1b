//! Reserved event-type names with built-in meaning.
//!
//! These types are emitted by the emitter itself on the registry or tree
//! mutation they describe. [`ERROR`] additionally changes emission behavior:
//! dispatching it on an emitter with zero `error` listeners fails the
//! emission (see [`EmitError`](crate::EmitError)).

/// Fatal-by-design error channel; no handler means the emission fails.
pub const ERROR: &str = "error";

/// Emitted before a listener is inserted; payload is the event-type name.
pub const NEW_LISTENER: &str = "newListener";

/// Emitted after a targeted listener removal; payload is the event-type name.
pub const REMOVE_LISTENER: &str = "removeListener";

/// Emitted on a parent after a child was attached; payload is the child name.
pub const CHILD_ADDED: &str = "childAdded";

/// Emitted on both child and parent before a child is detached.
pub const BEFORE_CHILD_REMOVED: &str = "beforeChildRemoved";

/// Emitted on a parent after a child was detached; payload is the child name.
pub const CHILD_REMOVED: &str = "childRemoved";
