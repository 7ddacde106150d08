//! Route handlers and their results.
//!
//! A route handler is an async function paired, at registration time, with
//! one [`Extract`] resolver per parameter. The pairing is erased into a
//! [`BoxedHandler`]; at dispatch time the resolvers run in declaration order
//! against the request and the function is invoked with the resolved values.
//! All the per-parameter decision making happens once, at registration — the
//! hot path is a straight walk over the precomputed resolvers.
//!
//! # Results
//!
//! Handlers must produce a value: the framework requires every handler to
//! explicitly decide what the user sees. The result is carried type-erased
//! as a [`Reply`] so any user type can flow to the response stage, where it
//! is matched by runtime type. The [`HandlerReturn`] impls define what a
//! handler may return:
//!
//! - [`Reply`] — any value, wrapped explicitly via [`Reply::new`];
//! - `String` / `&'static str` — convenience, normalized to `String`;
//! - `Option<_>` — `None` is a declaration error ([`DispatchError::EmptyResult`]),
//!   never a silent "no response";
//! - `Result<_, E>` — `Err` propagates as a handler failure.
//!
//! `()` deliberately implements nothing: a handler that produces no value
//! does not compile.
//!
//! # Example
//!
//! ```rust,ignore
//! use switchboard_framework::extract::payload;
//! use switchboard_framework::handler::handler;
//!
//! let echo = handler((payload::<String>("text"),), |text: String| async move {
//!     format!("you said: {text}")
//! });
//! router.register_route(Route::parse("cmd://echo")?, EventKind::Command, echo);
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{self, BoxFuture};

use switchboard_core::Request;

use crate::error::{BoxError, DispatchError};
use crate::extract::Extract;

// =============================================================================
// Reply — the type-erased handler result
// =============================================================================

/// A non-null handler result, erased for runtime-type response dispatch.
pub struct Reply {
    value: Box<dyn std::any::Any + Send + Sync>,
    type_name: &'static str,
}

impl Reply {
    /// Wraps a result value.
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The wrapped value's type name, for logs and diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the wrapped value is a `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Borrows the wrapped value as a `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }
}

impl std::fmt::Debug for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reply")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// HandlerReturn — what a handler function may return
// =============================================================================

/// Conversion from a handler function's return value into the dispatch
/// result.
pub trait HandlerReturn: Send + 'static {
    /// Produces the dispatch result.
    fn into_reply(self) -> Result<Reply, DispatchError>;
}

impl HandlerReturn for Reply {
    fn into_reply(self) -> Result<Reply, DispatchError> {
        Ok(self)
    }
}

impl HandlerReturn for String {
    fn into_reply(self) -> Result<Reply, DispatchError> {
        Ok(Reply::new(self))
    }
}

/// Normalized to `String`, so one response-handler registration covers both
/// spellings.
impl HandlerReturn for &'static str {
    fn into_reply(self) -> Result<Reply, DispatchError> {
        Ok(Reply::new(self.to_string()))
    }
}

/// `None` is a handler-implementation bug, not an empty response.
impl<T: HandlerReturn> HandlerReturn for Option<T> {
    fn into_reply(self) -> Result<Reply, DispatchError> {
        match self {
            Some(value) => value.into_reply(),
            None => Err(DispatchError::EmptyResult),
        }
    }
}

impl<T, E> HandlerReturn for Result<T, E>
where
    T: HandlerReturn,
    E: std::error::Error + Send + Sync + 'static,
{
    fn into_reply(self) -> Result<Reply, DispatchError> {
        match self {
            Ok(value) => value.into_reply(),
            Err(err) => Err(DispatchError::Handler(Box::new(err) as BoxError)),
        }
    }
}

// =============================================================================
// Handler trait
// =============================================================================

/// An invocable endpoint target.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Resolves the declared parameters against `req` and runs the handler.
    async fn invoke(&self, req: &Arc<Request>) -> Result<Reply, DispatchError>;
}

/// A type-erased handler stored in endpoints.
pub type BoxedHandler = Arc<dyn Handler>;

/// Internal closure-backed [`Handler`], produced by [`handler`].
struct ErasedHandler {
    call: Box<dyn Fn(Arc<Request>) -> BoxFuture<'static, Result<Reply, DispatchError>> + Send + Sync>,
}

#[async_trait]
impl Handler for ErasedHandler {
    async fn invoke(&self, req: &Arc<Request>) -> Result<Reply, DispatchError> {
        (self.call)(Arc::clone(req)).await
    }
}

// =============================================================================
// Registration-time pairing of extractors and functions
// =============================================================================

/// Implemented for `(extractor_tuple, async_fn)` pairs of matching arity.
///
/// `Args` is the tuple of resolved parameter types; it ties each extractor
/// to the corresponding function parameter positionally.
pub trait HandlerParts<Args>: Sized {
    /// Erases the pair into a storable handler.
    fn into_handler(self) -> BoxedHandler;
}

/// Builds a [`BoxedHandler`] from an extractor tuple and an async function
/// of the same arity.
///
/// The extractors run in declaration order on every invocation; the first
/// failure aborts the invocation with the corresponding
/// [`InvokeError`](crate::error::InvokeError).
pub fn handler<Ex, F, Args>(extractors: Ex, f: F) -> BoxedHandler
where
    (Ex, F): HandlerParts<Args>,
{
    (extractors, f).into_handler()
}

macro_rules! impl_handler_parts {
    ($(($E:ident, $T:ident)),*) => {
        #[allow(non_snake_case)]
        impl<F, Fut, R, $($E, $T),*> HandlerParts<($($T,)*)> for (($($E,)*), F)
        where
            F: Fn($($T),*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = R> + Send + 'static,
            R: HandlerReturn,
            $($E: Extract<$T> + Send + Sync + 'static,)*
            $($T: Send + 'static,)*
        {
            fn into_handler(self) -> BoxedHandler {
                let (($($E,)*), f) = self;
                let call = move |req: Arc<Request>| -> BoxFuture<'static, Result<Reply, DispatchError>> {
                    let _ = &req;
                    $(
                        let $T = match $E.extract(&req) {
                            Ok(value) => value,
                            Err(err) => return Box::pin(future::ready(Err(err.into()))),
                        };
                    )*
                    let fut = f($($T),*);
                    Box::pin(async move { fut.await.into_reply() })
                };
                Arc::new(ErasedHandler { call: Box::new(call) })
            }
        }
    };
}

// Handlers take 0-8 parameters; wider signatures want a context object anyway.
impl_handler_parts!();
impl_handler_parts!((E1, T1));
impl_handler_parts!((E1, T1), (E2, T2));
impl_handler_parts!((E1, T1), (E2, T2), (E3, T3));
impl_handler_parts!((E1, T1), (E2, T2), (E3, T3), (E4, T4));
impl_handler_parts!((E1, T1), (E2, T2), (E3, T3), (E4, T4), (E5, T5));
impl_handler_parts!((E1, T1), (E2, T2), (E3, T3), (E4, T4), (E5, T5), (E6, T6));
impl_handler_parts!((E1, T1), (E2, T2), (E3, T3), (E4, T4), (E5, T5), (E6, T6), (E7, T7));
impl_handler_parts!(
    (E1, T1),
    (E2, T2),
    (E3, T3),
    (E4, T4),
    (E5, T5),
    (E6, T6),
    (E7, T7),
    (E8, T8)
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{payload, request};
    use std::any::Any;
    use switchboard_core::{EventKind, InboundEvent, RouteUri};

    struct Slash;

    impl InboundEvent for Slash {
        fn kind(&self) -> EventKind {
            EventKind::Command
        }

        fn event_name(&self) -> &'static str {
            "slash"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn req(params: &[(&str, &str)]) -> Arc<Request> {
        let uri: RouteUri = "cmd://t".parse().unwrap();
        let mut builder = Request::builder(Arc::new(Slash), uri);
        for (k, v) in params {
            builder = builder.parameter(*k, *v);
        }
        Arc::new(builder.build())
    }

    #[tokio::test]
    async fn zero_arity_handlers_run() {
        let h = handler((), || async { "pong" });
        let reply = h.invoke(&req(&[])).await.unwrap();
        assert_eq!(reply.downcast_ref::<String>().unwrap(), "pong");
    }

    #[tokio::test]
    async fn resolved_values_arrive_in_declaration_order() {
        let h = handler(
            (request(), payload::<String>("a"), payload::<i64>("b")),
            |req: Arc<Request>, a: String, b: i64| async move {
                format!("{}:{a}:{b}", req.uri().scheme())
            },
        );
        let reply = h.invoke(&req(&[("a", "x"), ("b", "2")])).await.unwrap();
        assert_eq!(reply.downcast_ref::<String>().unwrap(), "cmd:x:2");
    }

    #[tokio::test]
    async fn extraction_failure_aborts_before_the_function_runs() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let h = handler((payload::<i64>("n"),), move |_n: i64| {
            let seen = Arc::clone(&seen);
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                "never"
            }
        });

        let err = h.invoke(&req(&[])).await.unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Invoke(crate::error::InvokeError::MissingParameter { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn returning_none_is_an_empty_result() {
        let h = handler((), || async { Option::<String>::None });
        let err = h.invoke(&req(&[])).await.unwrap_err();
        assert!(matches!(err, DispatchError::EmptyResult));
    }

    #[tokio::test]
    async fn handler_errors_propagate_as_failures() {
        #[derive(Debug, thiserror::Error)]
        #[error("boom")]
        struct Boom;

        let h = handler((), || async { Err::<String, _>(Boom) });
        let err = h.invoke(&req(&[])).await.unwrap_err();
        assert!(matches!(err, DispatchError::Handler(_)));
    }

    #[test]
    fn replies_are_typed() {
        let reply = Reply::new(42u32);
        assert!(reply.is::<u32>());
        assert!(!reply.is::<i64>());
        assert_eq!(reply.downcast_ref::<u32>(), Some(&42));
    }
}
