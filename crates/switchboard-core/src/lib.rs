//! # Switchboard Core
//!
//! The data model of the Switchboard dispatch engine.
//!
//! This crate defines the leaf types the pipeline in
//! `switchboard-framework` is built from:
//!
//! - **Route identifiers** — [`RouteUri`], the
//!   `<scheme>://<authority>/<path>?<query>` convention every inbound event
//!   is addressed by, with idempotent lookup-time normalization.
//! - **Events** — the type-erased [`InboundEvent`] trait, the closed
//!   [`EventKind`] tag set, and the optional [`Replyable`] reply channel
//!   with its [`DeferredReply`] acknowledgement handle.
//! - **Parameters** — [`ParamValue`] (the union of shapes platform option
//!   sets produce), [`EntityRef`] platform references, and the [`FromParam`]
//!   coercion contract, including the [`param_enum!`] helper for
//!   choice-style options.
//! - **Requests** — [`Request`], one per inbound event: immutable URI and
//!   parameters plus the interceptor-writable attribute and attachment side
//!   channels.
//! - **Routes** — [`Route`] descriptors carrying the defer/ephemeral reply
//!   flags, configurable through serde via [`RouteOptions`].
//!
//! The crate is deliberately free of routing logic: everything here is data
//! plus the small contracts adapters and platforms implement.

pub mod error;
pub mod event;
pub mod param;
pub mod request;
pub mod route;
pub mod uri;

pub use error::{
    CoerceError, CoerceResult, PlatformError, PlatformResult, UriError, UriResult,
};
pub use event::{DeferredReply, EventArc, EventKind, InboundEvent, Replyable};
pub use param::{EntityKind, EntityRef, FromParam, ParamValue};
pub use request::{Request, RequestBuilder};
pub use route::{Route, RouteOptions};
pub use uri::RouteUri;
