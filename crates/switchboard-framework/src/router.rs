//! URI routing and the dispatch algorithm.
//!
//! The [`Router`] owns three registries, all populated during the host's
//! startup phase and read-only once dispatch begins:
//!
//! - the **primary route table**, keyed by normalized URI, one immutable
//!   [`Endpoint`] per route — duplicates are refused, never overwritten;
//! - **fallback resolvers**, queried in registration order when the primary
//!   table misses. A `Router` is itself a [`Resolver`], so a self-contained
//!   sub-router can be mounted as a fallback without re-implementing
//!   interceptor semantics;
//! - the **interceptor set**, run in registration order around every handler
//!   invocation (see [`Interceptor`] for the short-circuit and replacement
//!   rules).
//!
//! [`dispatch`](Router::dispatch) is the central algorithm: resolve, check
//! the event-kind compatibility, run the pre hooks, invoke the handler, run
//! the post pass, return the final result.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{Instrument, Level, debug, span, warn};

use switchboard_core::{EventKind, Request, Route};

use crate::error::DispatchError;
use crate::handler::{BoxedHandler, Reply};
use crate::interceptor::{DeferralInterceptor, Interceptor};

// =============================================================================
// Endpoint
// =============================================================================

/// A registered (route, handler, accepted-event-kind) triple.
///
/// Created at registration time, immutable afterwards, alive as long as the
/// route table that owns it.
pub struct Endpoint {
    route: Route,
    accepted: EventKind,
    handler: BoxedHandler,
}

impl Endpoint {
    /// Creates an endpoint.
    pub fn new(route: Route, accepted: EventKind, handler: BoxedHandler) -> Self {
        Self {
            route,
            accepted,
            handler,
        }
    }

    /// The route descriptor.
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// The event kind the handler was written for.
    pub fn accepted_kind(&self) -> EventKind {
        self.accepted
    }

    /// The handler.
    pub fn handler(&self) -> &BoxedHandler {
        &self.handler
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("uri", &self.route.uri().normalized())
            .field("accepted", &self.accepted)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Anything capable of mapping a request to an endpoint.
///
/// The router's primary table is the first resolver; registered fallbacks
/// are queried in order when it misses.
pub trait Resolver: Send + Sync {
    /// Resolves the request's normalized URI to an endpoint, or declines.
    fn resolve(&self, req: &Request) -> Option<Arc<Endpoint>>;
}

// =============================================================================
// Router
// =============================================================================

/// The URI-keyed route table and dispatch pipeline.
pub struct Router {
    table: HashMap<String, Arc<Endpoint>>,
    resolvers: Vec<Arc<dyn Resolver>>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates a router with the built-in deferral interceptor registered.
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
            resolvers: Vec::new(),
            interceptors: vec![Arc::new(DeferralInterceptor::new())],
        }
    }

    // ─── Registration (startup phase) ────────────────────────────────────────

    /// Registers a route.
    ///
    /// Returns `false` without touching the table when another route already
    /// normalizes to the same URI — the first registration wins and the
    /// caller is told instead of silently losing it.
    pub fn register_route(
        &mut self,
        route: Route,
        accepted: EventKind,
        handler: BoxedHandler,
    ) -> bool {
        let key = route.uri().normalized();
        if self.table.contains_key(&key) {
            warn!(uri = %key, "route already registered, keeping the first registration");
            return false;
        }
        debug!(uri = %key, kind = %accepted, "route registered");
        self.table
            .insert(key, Arc::new(Endpoint::new(route, accepted, handler)));
        true
    }

    /// Registers an interceptor.
    ///
    /// Set semantics, keyed on [`Interceptor::name`]: returns `false` when an
    /// interceptor under that name is already present.
    pub fn register_interceptor(&mut self, interceptor: Arc<dyn Interceptor>) -> bool {
        if self
            .interceptors
            .iter()
            .any(|existing| existing.name() == interceptor.name())
        {
            warn!(interceptor = interceptor.name(), "interceptor already registered");
            return false;
        }
        debug!(interceptor = interceptor.name(), "interceptor registered");
        self.interceptors.push(interceptor);
        true
    }

    /// Registers a fallback resolver, queried after the primary table in
    /// registration order. Returns `false` when the same resolver instance
    /// is already registered.
    pub fn register_resolver(&mut self, resolver: Arc<dyn Resolver>) -> bool {
        if self
            .resolvers
            .iter()
            .any(|existing| Arc::ptr_eq(existing, &resolver))
        {
            return false;
        }
        self.resolvers.push(resolver);
        true
    }

    /// The number of routes in the primary table.
    pub fn route_count(&self) -> usize {
        self.table.len()
    }

    // ─── Resolution and dispatch ─────────────────────────────────────────────

    /// Resolves a request: normalized lookup in the primary table, then each
    /// fallback resolver in registration order.
    pub fn resolve(&self, req: &Request) -> Option<Arc<Endpoint>> {
        let key = req.uri().normalized();
        if let Some(endpoint) = self.table.get(&key) {
            return Some(Arc::clone(endpoint));
        }
        self.resolvers.iter().find_map(|resolver| resolver.resolve(req))
    }

    /// Dispatches a request to its endpoint through the interceptor chain.
    ///
    /// 1. Resolve; [`DispatchError::UnknownRoute`] when nothing matches.
    /// 2. Check the endpoint accepts the live event's kind;
    ///    [`DispatchError::KindMismatch`] is fatal and skips the handler.
    /// 3. Pre hooks in registration order; the first returned value is the
    ///    dispatch result and the handler never runs.
    /// 4. Invoke the handler. On success the post pass may replace the
    ///    result (first value wins, later hooks still run). On failure the
    ///    post pass runs once for bookkeeping and the original error is
    ///    re-raised.
    pub async fn dispatch(&self, req: &Arc<Request>) -> Result<Reply, DispatchError> {
        let span = span!(Level::DEBUG, "dispatch", uri = %req.uri());
        self.dispatch_inner(req).instrument(span).await
    }

    async fn dispatch_inner(&self, req: &Arc<Request>) -> Result<Reply, DispatchError> {
        let endpoint = self
            .resolve(req)
            .ok_or_else(|| DispatchError::UnknownRoute {
                uri: req.uri().normalized(),
            })?;

        let live = req.event().kind();
        if !endpoint.accepted_kind().accepts(live) {
            return Err(DispatchError::KindMismatch {
                uri: endpoint.route().uri().normalized(),
                expected: endpoint.accepted_kind(),
                got: live,
            });
        }

        let route = endpoint.route();
        for interceptor in &self.interceptors {
            match interceptor.pre_dispatch(route, req).await {
                Ok(Some(reply)) => {
                    debug!(
                        interceptor = interceptor.name(),
                        "pre-interceptor short-circuited dispatch"
                    );
                    return Ok(reply);
                }
                Ok(None) => {}
                Err(source) => {
                    return Err(DispatchError::Interceptor {
                        name: interceptor.name().to_string(),
                        source,
                    });
                }
            }
        }

        match endpoint.handler().invoke(req).await {
            Ok(reply) => {
                let mut replacement: Option<Reply> = None;
                for interceptor in &self.interceptors {
                    match interceptor.post_dispatch(route, req, Ok(&reply)).await {
                        Ok(Some(value)) => {
                            if replacement.is_none() {
                                debug!(
                                    interceptor = interceptor.name(),
                                    "post-interceptor replaced the handler result"
                                );
                                replacement = Some(value);
                            } else {
                                debug!(
                                    interceptor = interceptor.name(),
                                    "post-interceptor value ignored, result already replaced"
                                );
                            }
                        }
                        Ok(None) => {}
                        Err(source) => {
                            return Err(DispatchError::Interceptor {
                                name: interceptor.name().to_string(),
                                source,
                            });
                        }
                    }
                }
                Ok(replacement.unwrap_or(reply))
            }
            Err(err) => {
                // The pass still runs so cross-cutting bookkeeping executes,
                // but it cannot suppress the failure.
                for interceptor in &self.interceptors {
                    if let Err(post_err) =
                        interceptor.post_dispatch(route, req, Err(&err)).await
                    {
                        warn!(
                            interceptor = interceptor.name(),
                            error = %post_err,
                            "post-interceptor failed while observing a handler failure"
                        );
                    }
                }
                Err(err)
            }
        }
    }
}

impl Resolver for Router {
    fn resolve(&self, req: &Request) -> Option<Arc<Endpoint>> {
        Router::resolve(self, req)
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.table.len())
            .field("resolvers", &self.resolvers.len())
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}
