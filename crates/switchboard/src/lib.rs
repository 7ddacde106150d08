//! # Switchboard
//!
//! A request-routing and dispatch engine for interactive platform events.
//!
//! ## Overview
//!
//! Switchboard normalizes heterogeneous inbound events — slash-style
//! commands, clickable components, value-completion queries — into a single
//! `Request` model, routes each request to a registered handler by URI, and
//! converts the handler's typed result into a platform reply through a
//! runtime-type response dispatcher.
//!
//! The engine is a library: the hosting process owns the network connection
//! to the platform and feeds raw events into
//! [`Manager::process_event`](switchboard_framework::Manager::process_event).
//!
//! ## Architecture
//!
//! ```text
//! raw event → Adapter → Request → Router (interceptors + handler)
//!           → result  → ResponseManager → platform reply
//! ```
//!
//! - **Adapters** own one URI scheme each and translate raw events into
//!   requests; the first adapter to claim an event wins it.
//! - The **Router** keeps a normalized-URI route table with ordered fallback
//!   resolvers and wraps every handler in the pre/post interceptor chain
//!   (early acknowledgement of deferrable routes is a built-in pre hook).
//! - **Handlers** are async functions whose parameters are resolved per
//!   invocation from the request: payload coercion, attribute pass-through,
//!   typed attachments, or the request/event itself.
//! - The **ResponseManager** maps a result's runtime type to a registered
//!   response handler, first match in registration order.
//! - Every failure lands in one **ErrorHandler**, exactly once.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use switchboard::prelude::*;
//!
//! let mut router = Router::new();
//! router.register_route(
//!     Route::parse("cmd://ping")?,
//!     EventKind::Command,
//!     handler((), || async { "pong" }),
//! );
//!
//! let mut responses = ResponseManager::new();
//! responses.register_fn::<String, _, _>(|req, text| async move {
//!     // send `text` back through the platform connection
//!     Ok(())
//! });
//!
//! let mut manager = Manager::new(router, responses, Arc::new(DefaultErrorHandler::new()));
//! manager.register_adapter::<MyCommandEvent>(Arc::new(MyCommandAdapter));
//!
//! // hosting process, per inbound event:
//! manager.process_event(event).await;
//! ```

pub use switchboard_core as core;
pub use switchboard_framework as framework;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use switchboard::prelude::*;
/// ```
pub mod prelude {
    // Entry point and error routing
    pub use switchboard_framework::{
        Adapter, DefaultErrorHandler, ErrorHandler, ErrorReplyConfig, Manager, Processed,
    };

    // Routing and interception
    pub use switchboard_framework::{
        DeferralInterceptor, DispatchOutcome, Endpoint, Interceptor, Resolver, Router,
    };

    // Handlers and extractors
    pub use switchboard_framework::extract::{attachment, attribute, event, payload, request};
    pub use switchboard_framework::{BoxedHandler, HandlerReturn, Reply, handler};

    // Response dispatch
    pub use switchboard_framework::{ResponseHandler, ResponseManager};

    // Errors
    pub use switchboard_framework::{
        BoxError, DispatchError, EngineError, EngineResult, InvokeError, RespondError,
    };

    // Core data model
    pub use switchboard_core::{
        DeferredReply, EntityKind, EntityRef, EventArc, EventKind, FromParam, InboundEvent,
        ParamValue, PlatformError, Replyable, Request, RequestBuilder, Route, RouteOptions,
        RouteUri,
    };
    pub use switchboard_core::param_enum;
}
