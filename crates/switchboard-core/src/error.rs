//! Error types for the Switchboard core data model.
//!
//! This module only carries the errors the leaf data types can produce
//! themselves. Pipeline-level errors (routing, invocation, response lookup)
//! are defined in `switchboard-framework`.

use thiserror::Error;

// =============================================================================
// URI Errors
// =============================================================================

/// Errors produced while parsing a [`RouteUri`](crate::uri::RouteUri).
///
/// Adapters treat these as a decline, not a failure: an inbound identifier
/// that does not parse as a URI simply does not belong to any registered
/// scheme.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriError {
    /// The input was empty or whitespace-only.
    #[error("URI is empty")]
    Empty,

    /// The input carries no `<scheme>://` prefix.
    #[error("URI '{input}' has no '<scheme>://' prefix")]
    MissingScheme {
        /// The offending input.
        input: String,
    },

    /// Nothing follows the `<scheme>://` prefix.
    #[error("URI '{input}' has no address after the scheme")]
    MissingAddress {
        /// The offending input.
        input: String,
    },
}

// =============================================================================
// Coercion Errors
// =============================================================================

/// Errors produced while coercing a [`ParamValue`](crate::param::ParamValue)
/// into a handler's declared parameter type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    /// The stored value's shape cannot satisfy the declared type at all.
    #[error("expected a {expected} value, got {got}")]
    Mismatch {
        /// Label of the declared type.
        expected: &'static str,
        /// Label of the stored value.
        got: &'static str,
    },

    /// A textual value failed to parse into the declared primitive type.
    #[error("cannot parse '{value}' as {target}")]
    Parse {
        /// The offending text.
        value: String,
        /// Label of the declared type.
        target: &'static str,
    },

    /// A textual value named no member of the declared enumeration.
    #[error("'{value}' is not a member of {enumeration}")]
    InvalidEnumValue {
        /// The offending text.
        value: String,
        /// Name of the target enumeration.
        enumeration: &'static str,
    },
}

// =============================================================================
// Platform Errors
// =============================================================================

/// Errors surfaced by the platform seam ([`Replyable`](crate::event::Replyable)).
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    /// The event cannot be acknowledged ahead of a reply.
    #[error("event does not support an acknowledgeable reply")]
    AckUnsupported,

    /// The synchronous acknowledgement call failed.
    #[error("acknowledgement failed: {0}")]
    AckFailed(String),

    /// An outbound reply could not be delivered.
    #[error("failed to send reply: {0}")]
    SendFailed(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for URI parsing.
pub type UriResult<T> = Result<T, UriError>;

/// Result type for parameter coercion.
pub type CoerceResult<T> = Result<T, CoerceError>;

/// Result type for platform reply operations.
pub type PlatformResult<T> = Result<T, PlatformError>;
