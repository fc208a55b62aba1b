//! Error types used by the emitter and by listener callbacks.
//!
//! This module defines two small enums:
//!
//! - [`EmitError`] — errors surfaced out of an emission (`emit` / `emit_event`).
//! - [`ListenerError`] — errors returned by individual listener callbacks.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging
//! and diagnostics.
//!
//! A [`ListenerError`] never unwinds an emission on its own: the dispatching
//! emitter catches it and re-emits it as a local `error` event. Only when that
//! `error` event has no registered handler does the failure escalate into an
//! [`EmitError::UnhandledError`] returned to the original caller.

use serde_json::Value;
use thiserror::Error;

/// # Errors surfaced out of an emission.
///
/// Emitting an `error`-typed event on an emitter with zero `error` listeners
/// is fatal by design: the value is returned to the caller rather than
/// silently dropped, forcing callers to either handle errors or fail visibly.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EmitError {
    /// An `error` event was dispatched on an emitter with no `error` listeners.
    #[error("unhandled 'error' event on `{emitter}`: {detail}")]
    UnhandledError {
        /// Name of the emitter that had no handler.
        emitter: String,
        /// The error payload that would have been delivered.
        detail: Value,
    },
}

impl EmitError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use treevent::EmitError;
    ///
    /// let err = EmitError::UnhandledError {
    ///     emitter: "root".into(),
    ///     detail: serde_json::json!("boom"),
    /// };
    /// assert_eq!(err.as_label(), "unhandled_error_event");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EmitError::UnhandledError { .. } => "unhandled_error_event",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            EmitError::UnhandledError { emitter, detail } => {
                format!("no 'error' handler on emitter={emitter}; detail={detail}")
            }
        }
    }
}

/// # Errors produced by listener callbacks.
///
/// Listeners return `Result<(), ListenerError>`; an `Err` is contained at the
/// emitter currently dispatching and converted into a local `error` emission
/// there, so a failure in one branch cannot unwind a whole propagation walk.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ListenerError {
    /// Listener execution failed with a message.
    #[error("listener failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },
}

impl ListenerError {
    /// Creates a [`ListenerError::Failed`] from a message.
    pub fn failed(error: impl Into<String>) -> Self {
        ListenerError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ListenerError::Failed { .. } => "listener_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ListenerError::Failed { error } => format!("error: {error}"),
        }
    }
}

impl From<String> for ListenerError {
    fn from(error: String) -> Self {
        ListenerError::Failed { error }
    }
}

impl From<&str> for ListenerError {
    fn from(error: &str) -> Self {
        ListenerError::Failed {
            error: error.to_string(),
        }
    }
}
