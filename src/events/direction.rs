//! # Propagation directions and traversal order.
//!
//! [`Directions`] is a bit-flag set describing the axes along which an event
//! may still travel through an emitter tree. Flags combine with `|`:
//!
//! ```
//! use treevent::Directions;
//!
//! let mask = Directions::LOCAL | Directions::DOWN;
//! assert!(mask.contains(Directions::LOCAL));
//! assert!(!mask.contains(Directions::UP));
//! ```
//!
//! [`TraversalOrder`] is the per-emitter sequence of up to four direction
//! slots tried during a non-saturating walk. Slots are deduplicated at
//! assignment time: a direction appearing twice is suppressed after its
//! first occurrence.

use bitflags::bitflags;

bitflags! {
    /// Directions an event may propagate through an emitter tree.
    ///
    /// `SATURATING` overrides everything else: when set (and the event still
    /// bubbles), the emission becomes a flat broadcast to the whole connected
    /// tree and per-emitter traversal order is ignored.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Directions: u8 {
        /// No direction.
        const NONE = 0;
        /// Listeners on the emitter itself.
        const LOCAL = 1;
        /// Toward the parent.
        const UP = 2;
        /// Toward the children.
        const DOWN = 4;
        /// Toward the parent's other children.
        const SIBLINGS = 8;
        /// Flat broadcast to every reachable emitter.
        const SATURATING = 16;
    }
}

impl Default for Directions {
    fn default() -> Self {
        Directions::NONE
    }
}

/// Per-emitter direction-traversal order: up to four slots, walked in
/// sequence during a non-saturating emission.
///
/// Duplicate directions are suppressed at construction: each direction bit is
/// kept only in the first slot that mentions it, later occurrences collapse
/// to [`Directions::NONE`]. `NONE` slots are skipped by the walk. A slot may
/// combine several directions; the walk tries its bits in flag definition
/// order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraversalOrder {
    slots: [Directions; 4],
}

impl TraversalOrder {
    /// Builds an order from four direction slots, deduplicating bits.
    pub fn new(d1: Directions, d2: Directions, d3: Directions, d4: Directions) -> Self {
        let mut seen = Directions::NONE;
        let mut slots = [Directions::NONE; 4];
        for (slot, dir) in slots.iter_mut().zip([d1, d2, d3, d4]) {
            let fresh = dir.difference(seen);
            seen |= fresh;
            *slot = fresh;
        }
        Self { slots }
    }

    /// Returns the slots in walk order.
    pub fn slots(&self) -> [Directions; 4] {
        self.slots
    }
}

impl Default for TraversalOrder {
    /// The default walk: local listeners first, then children, then parent.
    fn default() -> Self {
        Self::new(
            Directions::LOCAL,
            Directions::DOWN,
            Directions::UP,
            Directions::NONE,
        )
    }
}
