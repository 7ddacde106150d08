//! Event abstractions.
//!
//! Inbound platform events reach the engine type-erased behind
//! [`InboundEvent`]. The trait deliberately asks for very little: a kind tag
//! from the closed [`EventKind`] set, a name for logging, `Any` access for
//! typed extraction, and an optional reply channel.
//!
//! The kind tag replaces the unchecked downcast a generics-heavy design would
//! need: an endpoint records the [`EventKind`] it was written for, and the
//! router checks `accepted.accepts(live)` before the handler ever runs. A
//! failed check is a first-class routing error, not a panic.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PlatformResult;

// =============================================================================
// Event Kinds
// =============================================================================

/// Classification of inbound event families.
///
/// Live events always report a concrete kind; [`EventKind::Any`] exists for
/// the registration side, where an endpoint may accept every family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// Slash-style commands with a structured, typed option set.
    Command,
    /// Clickable components whose identifier is a single opaque token.
    Component,
    /// Value-completion queries; these have no user-facing reply channel.
    Autocomplete,
    /// Registration-side wildcard: accepts any live kind.
    Any,
}

impl EventKind {
    /// Returns `true` if an endpoint accepting `self` may receive a request
    /// whose live event reports `live`.
    pub fn accepts(self, live: EventKind) -> bool {
        self == EventKind::Any || self == live
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventKind::Command => "command",
            EventKind::Component => "component",
            EventKind::Autocomplete => "autocomplete",
            EventKind::Any => "any",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Inbound Event Trait
// =============================================================================

/// The engine's view of one raw platform event.
///
/// Adapters and the hosting process own the concrete types; the engine only
/// needs the kind tag, a name for diagnostics, and downcast access so typed
/// extractors can hand the concrete event to handlers that ask for it.
pub trait InboundEvent: Any + Send + Sync {
    /// The event's family. Live events never report [`EventKind::Any`].
    fn kind(&self) -> EventKind;

    /// Human-readable name of this event type, used in logs and errors.
    fn event_name(&self) -> &'static str;

    /// Returns a reference to self as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// The event's reply channel, when it has one.
    ///
    /// Value-completion events return `None`; the response stage treats a
    /// missing channel as intentional silence.
    fn replyable(&self) -> Option<&dyn Replyable> {
        None
    }
}

/// A shared, type-erased inbound event.
///
/// One `EventArc` is created per raw event; the request produced by the
/// winning adapter holds the only long-lived clone.
pub type EventArc = Arc<dyn InboundEvent>;

// =============================================================================
// Reply Channel
// =============================================================================

/// Platform-implemented reply capability of an inbound event.
///
/// Both methods block (await) until the platform call completes; the engine
/// never fires-and-forgets an acknowledgement or an error reply.
#[async_trait]
pub trait Replyable: Send + Sync {
    /// Acknowledges the event ahead of the real reply, extending the
    /// platform's reply-latency budget.
    ///
    /// Returns the handle the eventual reply must be sent through.
    async fn acknowledge(&self, ephemeral: bool) -> PlatformResult<DeferredReply>;

    /// Sends a best-effort diagnostic reply. Used by the default error
    /// handler; the message must not leak internal detail.
    async fn send_error(&self, message: &str) -> PlatformResult<()>;
}

/// Handle to an acknowledged (deferred) reply.
///
/// The platform decides what the token is — a webhook reference, an
/// interaction id, a channel handle. The engine stores the handle as a typed
/// request attachment so the handler or the response stage can pick it up.
#[derive(Clone)]
pub struct DeferredReply {
    token: Arc<dyn Any + Send + Sync>,
    ephemeral: bool,
}

impl DeferredReply {
    /// Wraps a platform token into a deferred-reply handle.
    pub fn new<T: Send + Sync + 'static>(token: T, ephemeral: bool) -> Self {
        Self {
            token: Arc::new(token),
            ephemeral,
        }
    }

    /// Whether the acknowledgement was made ephemeral.
    pub fn ephemeral(&self) -> bool {
        self.ephemeral
    }

    /// Downcasts the platform token.
    pub fn token<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.token).downcast().ok()
    }
}

impl fmt::Debug for DeferredReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredReply")
            .field("ephemeral", &self.ephemeral)
            .finish_non_exhaustive()
    }
}
