//! # Simple logging listener for debugging and demos.
//!
//! [`LogWriter`] registers listeners for the reserved lifecycle events on an
//! emitter and prints them to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [childAdded] emitter=root payload="worker"
//! [newListener] emitter=worker payload="ping"
//! [removeListener] emitter=worker payload="ping"
//! [childRemoved] emitter=root payload="worker"
//! ```
//!
//! It deliberately does not register for `error`: an `error` listener would
//! change the fail-fast semantics of unhandled error events.

use crate::emitter::{Emitter, ListenerId};
use crate::error::EmitError;
use crate::events::names;

/// Simple stdout logging listener.
///
/// Enabled via the `logging` feature. Prints human-readable lines for the
/// reserved lifecycle events, for debugging and demonstration purposes.
///
/// Not intended for production use - register custom listeners for
/// structured logging or metrics collection.
pub struct LogWriter;

impl LogWriter {
    /// Lifecycle events the writer subscribes to.
    const EVENTS: [&'static str; 5] = [
        names::NEW_LISTENER,
        names::REMOVE_LISTENER,
        names::CHILD_ADDED,
        names::BEFORE_CHILD_REMOVED,
        names::CHILD_REMOVED,
    ];

    /// Registers the writer on `emitter` and returns the listener ids, so a
    /// caller can detach it again via [`Emitter::off`].
    pub fn attach(emitter: &Emitter) -> Result<Vec<ListenerId>, EmitError> {
        let mut ids = Vec::with_capacity(Self::EVENTS.len());
        for event_type in Self::EVENTS {
            ids.push(emitter.on(event_type, |target, ev| {
                println!(
                    "[{}] emitter={} payload={}",
                    ev.event_type(),
                    target.name(),
                    ev.payload()
                );
                Ok(())
            })?);
        }
        Ok(ids)
    }
}
