//! Runtime-type dispatch of handler results.
//!
//! Handlers may return any type; the [`ResponseManager`] maps a result's
//! runtime type to the [`ResponseHandler`] that turns it into a platform
//! reply. The registry is an insertion-ordered sequence scanned linearly —
//! **first structural match wins** — because the result type is open-ended
//! and registration order is the only priority signal available. Callers
//! register the more specific handler first when registrations overlap.
//!
//! Exact-type registrations come from [`register`](ResponseManager::register);
//! broad "family" registrations (the closest thing to matching on an
//! interface type) come from
//! [`register_matching`](ResponseManager::register_matching) with an
//! arbitrary predicate over the result.

use std::any::TypeId;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use switchboard_core::Request;

use crate::error::{BoxError, RespondError};
use crate::handler::Reply;

/// Converts one matched handler result into an outbound platform reply.
#[async_trait]
pub trait ResponseHandler: Send + Sync {
    /// Sends the reply for `result`. Only called when this registration's
    /// match accepted the result.
    async fn respond(&self, req: &Arc<Request>, result: &Reply) -> Result<(), BoxError>;
}

type MatchFn = Box<dyn Fn(&Reply) -> bool + Send + Sync>;

struct Registration {
    matches: MatchFn,
    type_name: &'static str,
    handler: Arc<dyn ResponseHandler>,
}

/// Insertion-ordered result-type → response-handler registry.
#[derive(Default)]
pub struct ResponseManager {
    registrations: Vec<Registration>,
}

impl ResponseManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for results of exactly type `T`.
    ///
    /// Returns `false` (and registers nothing) for the unit type: every
    /// handler is required to produce a real value, so there is no such
    /// thing as a void response handler.
    pub fn register<T: Send + Sync + 'static>(&mut self, handler: Arc<dyn ResponseHandler>) -> bool {
        if TypeId::of::<T>() == TypeId::of::<()>() {
            warn!("refusing to register a response handler for the unit type");
            return false;
        }
        let type_name = std::any::type_name::<T>();
        debug!(result_type = type_name, "response handler registered");
        self.registrations.push(Registration {
            matches: Box::new(|result| result.is::<T>()),
            type_name,
            handler,
        });
        true
    }

    /// Registers an async closure for results of exactly type `T`.
    ///
    /// The closure receives the request and a clone of the result value.
    pub fn register_fn<T, F, Fut>(&mut self, f: F) -> bool
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(Arc<Request>, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.register::<T>(Arc::new(FnResponder {
            f,
            _marker: PhantomData::<fn() -> T>,
        }))
    }

    /// Registers a handler behind an arbitrary match predicate.
    ///
    /// This is the broad-registration form: a predicate can accept a whole
    /// family of result types. `label` names the registration in logs and
    /// failure reports.
    pub fn register_matching(
        &mut self,
        matches: impl Fn(&Reply) -> bool + Send + Sync + 'static,
        label: &'static str,
        handler: Arc<dyn ResponseHandler>,
    ) -> bool {
        debug!(result_type = label, "response handler registered");
        self.registrations.push(Registration {
            matches: Box::new(matches),
            type_name: label,
            handler,
        });
        true
    }

    /// The number of registrations.
    pub fn handler_count(&self) -> usize {
        self.registrations.len()
    }

    /// Dispatches a handler result to the first matching registration.
    ///
    /// - `None` is a programming error upstream and fails with
    ///   [`RespondError::NullResult`] (the dispatch stage already guarantees
    ///   a value; this is guarded anyway).
    /// - An event with no reply channel swallows the result silently — that
    ///   is the contract for value-completion events, not an error.
    /// - No matching registration fails with
    ///   [`RespondError::HandlerNotFound`] naming the result type.
    pub async fn process_result(
        &self,
        req: &Arc<Request>,
        result: Option<Reply>,
    ) -> Result<(), RespondError> {
        let Some(result) = result else {
            return Err(RespondError::NullResult);
        };
        if req.event().replyable().is_none() {
            debug!(uri = %req.uri(), "event has no reply channel, result dropped");
            return Ok(());
        }

        for registration in &self.registrations {
            if (registration.matches)(&result) {
                debug!(
                    result_type = result.type_name(),
                    registration = registration.type_name,
                    "dispatching result"
                );
                return registration
                    .handler
                    .respond(req, &result)
                    .await
                    .map_err(|source| RespondError::Responder {
                        type_name: registration.type_name,
                        source,
                    });
            }
        }

        Err(RespondError::HandlerNotFound {
            type_name: result.type_name(),
        })
    }
}

impl std::fmt::Debug for ResponseManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseManager")
            .field("handlers", &self.registrations.len())
            .finish()
    }
}

/// Closure-backed [`ResponseHandler`] used by
/// [`register_fn`](ResponseManager::register_fn).
struct FnResponder<T, F> {
    f: F,
    _marker: PhantomData<fn() -> T>,
}

#[async_trait]
impl<T, F, Fut> ResponseHandler for FnResponder<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(Arc<Request>, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    async fn respond(&self, req: &Arc<Request>, result: &Reply) -> Result<(), BoxError> {
        let value = result
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| format!("result is not a {}", std::any::type_name::<T>()))?;
        (self.f)(Arc::clone(req), value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use switchboard_core::{
        DeferredReply, EventKind, InboundEvent, PlatformResult, Replyable, RouteUri,
    };

    struct Slash;

    #[async_trait]
    impl Replyable for Slash {
        async fn acknowledge(&self, ephemeral: bool) -> PlatformResult<DeferredReply> {
            Ok(DeferredReply::new((), ephemeral))
        }

        async fn send_error(&self, _message: &str) -> PlatformResult<()> {
            Ok(())
        }
    }

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

        fn replyable(&self) -> Option<&dyn Replyable> {
            Some(self)
        }
    }

    struct CompletionQuery;

    impl InboundEvent for CompletionQuery {
        fn kind(&self) -> EventKind {
            EventKind::Autocomplete
        }

        fn event_name(&self) -> &'static str {
            "completion_query"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn replyable_request() -> Arc<Request> {
        let uri: RouteUri = "cmd://t".parse().unwrap();
        Arc::new(Request::builder(Arc::new(Slash), uri).build())
    }

    struct CountingResponder {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ResponseHandler for CountingResponder {
        async fn respond(&self, _req: &Arc<Request>, _result: &Reply) -> Result<(), BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn first_match_wins_by_registration_order() {
        // A broad registration first, a narrow one second: the broad one
        // takes the result even though the narrow one is more specific.
        let broad = Arc::new(AtomicUsize::new(0));
        let narrow = Arc::new(AtomicUsize::new(0));

        let mut manager = ResponseManager::new();
        manager.register_matching(
            |result| result.is::<String>() || result.is::<&'static str>(),
            "text",
            Arc::new(CountingResponder {
                calls: Arc::clone(&broad),
            }),
        );
        manager.register::<String>(Arc::new(CountingResponder {
            calls: Arc::clone(&narrow),
        }));

        manager
            .process_result(&replyable_request(), Some(Reply::new(String::from("hi"))))
            .await
            .unwrap();

        assert_eq!(broad.load(Ordering::SeqCst), 1);
        assert_eq!(narrow.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unmatched_results_are_an_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut manager = ResponseManager::new();
        manager.register::<String>(Arc::new(CountingResponder {
            calls: Arc::clone(&calls),
        }));

        let err = manager
            .process_result(&replyable_request(), Some(Reply::new(42u32)))
            .await
            .unwrap_err();
        assert!(matches!(err, RespondError::HandlerNotFound { type_name } if type_name == "u32"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_results_hit_the_null_guard() {
        let manager = ResponseManager::new();
        let err = manager
            .process_result(&replyable_request(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RespondError::NullResult));
    }

    #[tokio::test]
    async fn events_without_a_reply_channel_are_silently_skipped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut manager = ResponseManager::new();
        manager.register::<String>(Arc::new(CountingResponder {
            calls: Arc::clone(&calls),
        }));

        let uri: RouteUri = "autocomplete://t".parse().unwrap();
        let req = Arc::new(Request::builder(Arc::new(CompletionQuery), uri).build());

        manager
            .process_result(&req, Some(Reply::new(String::from("choices"))))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unit_registrations_are_refused() {
        let mut manager = ResponseManager::new();
        let calls = Arc::new(AtomicUsize::new(0));
        assert!(!manager.register::<()>(Arc::new(CountingResponder {
            calls: Arc::clone(&calls),
        })));
        assert_eq!(manager.handler_count(), 0);
    }

    #[tokio::test]
    async fn typed_closures_receive_the_result_value() {
        let seen = Arc::new(std::sync::Mutex::new(None));
        let sink = Arc::clone(&seen);

        let mut manager = ResponseManager::new();
        manager.register_fn::<String, _, _>(move |_req, value| {
            let sink = Arc::clone(&sink);
            async move {
                *sink.lock().unwrap() = Some(value);
                Ok(())
            }
        });

        manager
            .process_result(&replyable_request(), Some(Reply::new(String::from("pong"))))
            .await
            .unwrap();
        assert_eq!(seen.lock().unwrap().as_deref(), Some("pong"));
    }
}
