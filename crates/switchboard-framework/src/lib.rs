//! # Switchboard Framework
//!
//! The routing and dispatch pipeline of the Switchboard engine, built on the
//! data model in `switchboard-core`.
//!
//! ## Pipeline
//!
//! ```text
//! ┌───────────┐    ┌─────────┐    ┌────────────────────────────┐    ┌─────────────────┐
//! │  Manager  │───▶│ Adapter │───▶│ Router                     │───▶│ ResponseManager │
//! │ (entry)   │    │ (first  │    │  resolve → kind check →    │    │  first type     │
//! │           │    │  match) │    │  pre hooks → handler →     │    │  match wins     │
//! │           │    │         │    │  post hooks                │    │                 │
//! └───────────┘    └─────────┘    └────────────────────────────┘    └─────────────────┘
//!       │                                                                    │
//!       └────────────────────── ErrorHandler ◀───────────────────────────────┘
//! ```
//!
//! - [`Manager`] receives raw events, picks the first [`Adapter`] whose
//!   scheme matches, and routes every failure to the single
//!   [`ErrorHandler`].
//! - [`Router`] resolves the request's normalized URI (primary table, then
//!   fallback [`Resolver`]s in order) and runs the [`Interceptor`] chain
//!   around handler invocation.
//! - Handlers are async functions paired at registration with one
//!   [`extract`] resolver per parameter; their non-null results travel as
//!   type-erased [`Reply`] values.
//! - [`ResponseManager`] turns a result into a platform reply via the first
//!   registration whose type match accepts it.
//!
//! Registration happens during the host's startup phase; once events flow,
//! everything here is read-only and safe to share behind an `Arc`.

pub mod error;
pub mod extract;
pub mod handler;
pub mod interceptor;
pub mod manager;
pub mod response;
pub mod router;

pub use error::{BoxError, DispatchError, EngineError, EngineResult, InvokeError, RespondError};
pub use handler::{BoxedHandler, Handler, HandlerReturn, Reply, handler};
pub use interceptor::{DeferralInterceptor, DispatchOutcome, Interceptor};
pub use manager::{
    Adapter, DefaultErrorHandler, ErrorHandler, ErrorReplyConfig, Manager, Processed,
};
pub use response::{ResponseHandler, ResponseManager};
pub use router::{Endpoint, Resolver, Router};
