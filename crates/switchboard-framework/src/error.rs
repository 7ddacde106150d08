//! Error types for the dispatch pipeline.
//!
//! Each pipeline stage has its own enum — parameter resolution
//! ([`InvokeError`]), routing and handler execution ([`DispatchError`]),
//! response dispatch ([`RespondError`]) — composed into the single
//! [`EngineError`] the manager hands to the error handler. Every fatal
//! failure is caught exactly once, at the manager's `process_event`
//! boundary; nothing in the pipeline retries.

use thiserror::Error;

use switchboard_core::{CoerceError, EventKind, PlatformError};

/// Boxed error type carried by user-supplied handlers and interceptors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// =============================================================================
// Invocation Errors
// =============================================================================

/// Errors raised while resolving a handler's declared parameters against a
/// request.
///
/// Any of these signals a declaration error on the route: the request could
/// not satisfy the handler's parameter list under the resolution rules.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The payload carries no parameter under the declared key.
    #[error("request has no parameter named '{key}'")]
    MissingParameter {
        /// The declared payload key.
        key: String,
    },

    /// The payload value could not be coerced into the declared type.
    #[error("parameter '{key}': {source}")]
    Parameter {
        /// The declared payload key.
        key: String,
        /// The underlying coercion failure.
        #[source]
        source: CoerceError,
    },

    /// No attribute is stored under the declared key.
    #[error("request has no attribute named '{key}'")]
    MissingAttribute {
        /// The declared attribute key.
        key: String,
    },

    /// An attribute exists under the key but holds a different type.
    /// Attributes pass through unchanged; there is no coercion to fall
    /// back to.
    #[error("attribute '{key}' does not hold a value of type '{expected}'")]
    AttributeTypeMismatch {
        /// The declared attribute key.
        key: String,
        /// The declared parameter type.
        expected: &'static str,
    },

    /// The handler asked for a concrete event type the live event is not.
    #[error("event type mismatch: expected '{expected}', got '{got}'")]
    EventTypeMismatch {
        /// The declared event type.
        expected: &'static str,
        /// The live event's name.
        got: &'static str,
    },
}

// =============================================================================
// Dispatch Errors
// =============================================================================

/// Errors raised by the router while dispatching a request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Neither the primary table nor any fallback resolver knows the URI.
    #[error("no route registered for '{uri}'")]
    UnknownRoute {
        /// The normalized URI that failed to resolve.
        uri: String,
    },

    /// The resolved endpoint was registered for a different event kind than
    /// the live request carries. Always a registration-time bug surfacing at
    /// runtime; never retried.
    #[error("route '{uri}' accepts {expected} events, but the request carries a {got} event")]
    KindMismatch {
        /// The resolved route.
        uri: String,
        /// The endpoint's accepted kind.
        expected: EventKind,
        /// The live event's kind.
        got: EventKind,
    },

    /// Parameter resolution failed before the handler could run.
    #[error(transparent)]
    Invoke(#[from] InvokeError),

    /// The handler completed without producing a value. Every handler must
    /// explicitly decide what the user sees; "no response" is not a result.
    #[error("handler returned no value")]
    EmptyResult,

    /// The user-supplied handler failed.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),

    /// An interceptor failed around handler invocation.
    #[error("interceptor '{name}' failed: {source}")]
    Interceptor {
        /// The interceptor's registered name.
        name: String,
        /// The underlying failure.
        #[source]
        source: BoxError,
    },
}

// =============================================================================
// Response Errors
// =============================================================================

/// Errors raised while converting a handler result into a platform reply.
#[derive(Debug, Error)]
pub enum RespondError {
    /// The response manager was handed no result. Unreachable through the
    /// normal pipeline (the dispatch stage guarantees a value), guarded
    /// explicitly anyway.
    #[error("response manager received an empty result")]
    NullResult,

    /// No registered response handler matched the result's runtime type.
    #[error("no response handler registered for result type '{type_name}'")]
    HandlerNotFound {
        /// Type name of the unmatched result, for diagnostics.
        type_name: &'static str,
    },

    /// The matched response handler failed while replying.
    #[error("response handler for '{type_name}' failed: {source}")]
    Responder {
        /// The registration's type label.
        type_name: &'static str,
        /// The underlying failure.
        #[source]
        source: BoxError,
    },
}

// =============================================================================
// Engine Error
// =============================================================================

/// The top-level error handed to the [`ErrorHandler`](crate::manager::ErrorHandler).
#[derive(Debug, Error)]
pub enum EngineError {
    /// No adapter is registered for the raw event's runtime type.
    #[error("no adapter registered for event type '{event_name}'")]
    UnsupportedEvent {
        /// The event's name.
        event_name: &'static str,
    },

    /// Routing or handler execution failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Response dispatch failed.
    #[error(transparent)]
    Respond(#[from] RespondError),

    /// A platform call (acknowledgement, reply send) failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Result type for whole-pipeline operations.
pub type EngineResult<T> = Result<T, EngineError>;
