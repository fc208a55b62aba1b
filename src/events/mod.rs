//! Event data model: direction flags, traversal order, the event object
//! and the reserved event-type names.
//!
//! ## Contents
//! - [`Directions`], [`TraversalOrder`] — the bit-flag direction set and the
//!   per-emitter walk order built from it
//! - [`Event`], [`EmitMode`] — one emission and its propagation state
//! - [`names`] — reserved event types with built-in meaning
//!
//! The propagation algorithm that consumes these types lives in
//! [`crate::Emitter`].

mod direction;
mod event;
pub mod names;

pub use direction::{Directions, TraversalOrder};
pub use event::{EmitMode, Event};
