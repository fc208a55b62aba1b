//! # Emitter construction defaults.
//!
//! [`EmitterConfig`] bundles the per-emitter defaults that the original
//! design kept in process-wide globals: the traversal order used for
//! non-saturating walks and the advisory listener limit. The struct is
//! passed at construction; there is no mutable global state.
//!
//! # Example
//! ```
//! use treevent::{Directions, Emitter, EmitterConfig, TraversalOrder};
//!
//! let mut cfg = EmitterConfig::default();
//! cfg.order = TraversalOrder::new(
//!     Directions::DOWN,
//!     Directions::LOCAL,
//!     Directions::UP,
//!     Directions::SIBLINGS,
//! );
//! cfg.max_listeners = 64;
//!
//! let em = Emitter::with_config(cfg);
//! assert_eq!(em.max_listeners(), 64);
//! ```

use crate::events::TraversalOrder;

/// Construction-time configuration for an [`Emitter`](crate::Emitter).
///
/// Controls the default direction-traversal order and the advisory
/// listener limit.
#[derive(Clone, Copy, Debug)]
pub struct EmitterConfig {
    /// Direction-traversal order for tree-aware emissions.
    pub order: TraversalOrder,
    /// Advisory cap on listeners per event type (0 = unlimited).
    ///
    /// Exceeding the cap is not an error; the value exists so callers can
    /// introspect and tune registries, mirroring the accessor pair on the
    /// emitter.
    pub max_listeners: usize,
}

impl Default for EmitterConfig {
    /// Provides a default configuration:
    /// - `order = [LOCAL, DOWN, UP, NONE]`
    /// - `max_listeners = 0` (unlimited)
    fn default() -> Self {
        Self {
            order: TraversalOrder::default(),
            max_listeners: 0,
        }
    }
}
