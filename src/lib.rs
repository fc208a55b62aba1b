//! # treevent
//!
//! **Treevent** is a hierarchical event-propagation library for Rust.
//!
//! It provides an emitter that can be linked into parent/child/sibling
//! trees and an event object whose propagation direction through that tree
//! is independently controllable. The crate is designed as a building block
//! for component hierarchies that need DOM-style event flow without a DOM.
//!
//! ## Architecture
//! ```text
//!                  ┌───────────────┐
//!                  │   parent01    │◄─── UP
//!                  └──┬─────────┬──┘
//!                     ▼         ▼
//!            ┌────────────┐  ┌──────────┐
//!   origin ─►│     tr     │  │ sibling1 │◄─── SIBLINGS
//!            └─────┬──────┘  └──────────┘
//!                  ▼  DOWN
//!            ┌────────────┐
//!            │  child01   │
//!            └─┬────────┬─┘
//!              ▼        ▼
//!         ┌─────────┐ ┌─────────┐
//!         │ child11 │ │ child12 │
//!         └─────────┘ └─────────┘
//! ```
//!
//! An emission starts at one emitter. The [`Event`] carries a bit-flag mask
//! of [`Directions`] still permitted; each [`Emitter`] holds a
//! [`TraversalOrder`] deciding the sequence in which it tries those
//! directions. Combined, they determine exactly which emitters receive the
//! event and in what order. The `SATURATING` flag replaces the ordered walk
//! with a flat broadcast to every reachable emitter.
//!
//! ## Features
//! | Area            | Description                                             | Key types                        |
//! |-----------------|---------------------------------------------------------|----------------------------------|
//! | **Events**      | Direction-masked event objects with payload and result. | [`Event`], [`Directions`]        |
//! | **Emitters**    | Listener registries plus tree links and traversal.      | [`Emitter`], [`TraversalOrder`]  |
//! | **Errors**      | Typed errors for emissions and listener failures.       | [`EmitError`], [`ListenerError`] |
//! | **Configuration** | Construction-time defaults, no globals.               | [`EmitterConfig`]                |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use serde_json::json;
//! use treevent::{Directions, Emitter, Event};
//!
//! fn main() -> Result<(), treevent::EmitError> {
//!     let root = Emitter::named("root");
//!     let child = Emitter::named("child");
//!     root.add_child(&child)?;
//!
//!     child.on("ping", |target, ev| {
//!         println!("{} got {}", target.name(), ev.payload());
//!         ev.set_result(json!("pong"));
//!         Ok(())
//!     })?;
//!
//!     let mut ev = Event::new("ping")
//!         .with_payload(json!(1))
//!         .with_propagation(Directions::LOCAL | Directions::DOWN);
//!     root.emit_event(&mut ev)?;
//!
//!     assert_eq!(ev.result(), &json!("pong"));
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency model
//! Single-threaded, synchronous, re-entrant: emissions recurse through the
//! tree via direct calls, listeners run to completion one after another,
//! and a listener may mutate the registry or the tree mid-walk. Emitter
//! handles are `Rc`-backed and not `Send`.

mod config;
mod emitter;
mod error;
mod events;

// ---- Public re-exports ----

pub use config::EmitterConfig;
pub use emitter::{Emitter, ListenerId, ListenerResult};
pub use error::{EmitError, ListenerError};
pub use events::{names, Directions, EmitMode, Event, TraversalOrder};

// Optional: expose a simple built-in logging listener (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
mod log;
#[cfg(feature = "logging")]
pub use log::LogWriter;
