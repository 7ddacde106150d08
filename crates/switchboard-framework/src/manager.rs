//! The engine entry point.
//!
//! [`Manager`] receives raw platform events and drives the full pipeline:
//! pick the first adapter that turns the event into a request, dispatch the
//! request through the [`Router`], hand the result to the
//! [`ResponseManager`], and route any failure along the way to the single
//! [`ErrorHandler`].
//!
//! One call stack per event, start to finish. The manager is built during
//! the host's startup phase and shared immutably (`Arc<Manager>`) once
//! events start flowing; nothing here retries, and every failure is reported
//! exactly once.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use switchboard_core::{EventArc, InboundEvent, Request};

use crate::error::{EngineError, EngineResult};
use crate::response::ResponseManager;
use crate::router::Router;

// =============================================================================
// Adapter
// =============================================================================

/// Translates one raw event kind into zero-or-one [`Request`].
///
/// An adapter owns exactly one URI scheme. It derives the canonical URI from
/// the event's native identifier (honoring an explicit scheme, otherwise
/// prefixing its own), translates the native option set into the parameter
/// map, and opportunistically pre-attaches whatever standard context the
/// event exposes.
///
/// Declining (`None`) is a normal outcome, not a failure: it means the
/// event's identifier does not parse as a URI or belongs to another scheme,
/// and the manager should try the next adapter. Beyond populating the
/// returned request, `create_request` must be side-effect-free.
pub trait Adapter: Send + Sync {
    /// The URI scheme this adapter owns.
    fn scheme(&self) -> &str;

    /// Builds a request from the raw event, or declines.
    fn create_request(&self, event: &EventArc) -> Option<Request>;
}

// =============================================================================
// Error handling
// =============================================================================

/// Central sink for every pipeline failure.
///
/// Receives the error, the raw event, and the request if one existed before
/// the failure. Implementations must not fail themselves; anything they want
/// to tell the user is best-effort.
#[async_trait]
pub trait ErrorHandler: Send + Sync {
    /// Reports one failure.
    async fn handle(&self, err: &EngineError, event: &EventArc, request: Option<&Arc<Request>>);
}

/// User-facing text of the default error reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReplyConfig {
    /// The generic, non-leaking message sent when an event supports replies.
    #[serde(default = "default_error_message")]
    pub message: String,
}

impl Default for ErrorReplyConfig {
    fn default() -> Self {
        Self {
            message: default_error_message(),
        }
    }
}

fn default_error_message() -> String {
    "Something went wrong while handling this interaction.".to_string()
}

/// The stock [`ErrorHandler`]: log the full detail server-side, and send a
/// generic ephemeral-style reply when the event has a reply channel.
#[derive(Debug, Default)]
pub struct DefaultErrorHandler {
    config: ErrorReplyConfig,
}

impl DefaultErrorHandler {
    /// Creates the handler with the stock message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the handler from host configuration.
    pub fn from_config(config: ErrorReplyConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ErrorHandler for DefaultErrorHandler {
    async fn handle(&self, err: &EngineError, event: &EventArc, request: Option<&Arc<Request>>) {
        match request {
            Some(req) => {
                error!(error = %err, event = event.event_name(), uri = %req.uri(), "event processing failed");
            }
            None => {
                error!(error = %err, event = event.event_name(), "event processing failed");
            }
        }

        if let Some(channel) = event.replyable() {
            if let Err(send_err) = channel.send_error(&self.config.message).await {
                warn!(error = %send_err, "failed to deliver the error reply");
            }
        }
    }
}

// =============================================================================
// Manager
// =============================================================================

/// Outcome of [`Manager::process_event`], for host-side observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processed {
    /// An adapter claimed the event and the pipeline completed.
    Handled,
    /// Every adapter declined; the event belonged to no registered scheme.
    Ignored,
    /// A failure occurred and was reported to the error handler.
    Failed,
}

/// The engine entry point: adapters in front, router and response manager
/// behind, one error handler for everything.
pub struct Manager {
    router: Router,
    responses: ResponseManager,
    adapters: HashMap<TypeId, Vec<Arc<dyn Adapter>>>,
    error_handler: Arc<dyn ErrorHandler>,
}

impl Manager {
    /// Creates a manager.
    ///
    /// The error handler is a required collaborator rather than a mutable
    /// global: pass [`DefaultErrorHandler`] for the stock behavior.
    pub fn new(
        router: Router,
        responses: ResponseManager,
        error_handler: Arc<dyn ErrorHandler>,
    ) -> Self {
        Self {
            router,
            responses,
            adapters: HashMap::new(),
            error_handler,
        }
    }

    /// Registers an adapter for the concrete event type `E`.
    ///
    /// Several adapters may be registered for the same event type; they are
    /// tried in registration order and the first one to produce a request
    /// wins the event.
    pub fn register_adapter<E: InboundEvent>(&mut self, adapter: Arc<dyn Adapter>) {
        info!(
            scheme = adapter.scheme(),
            event_type = std::any::type_name::<E>(),
            "adapter registered"
        );
        self.adapters
            .entry(TypeId::of::<E>())
            .or_default()
            .push(adapter);
    }

    /// The router, for startup-phase route registration.
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// The response manager, for startup-phase handler registration.
    pub fn responses_mut(&mut self) -> &mut ResponseManager {
        &mut self.responses
    }

    /// Processes one raw inbound event to completion.
    ///
    /// The adapter scan stops at the first produced request even if the
    /// subsequent dispatch fails — one adapter, one attempt, one report.
    pub async fn process_event(&self, event: EventArc) -> Processed {
        let type_id = event.as_any().type_id();
        let adapters = match self.adapters.get(&type_id) {
            Some(adapters) if !adapters.is_empty() => adapters,
            _ => {
                let err = EngineError::UnsupportedEvent {
                    event_name: event.event_name(),
                };
                self.error_handler.handle(&err, &event, None).await;
                return Processed::Failed;
            }
        };

        for adapter in adapters {
            let Some(request) = adapter.create_request(&event) else {
                continue;
            };
            let request = Arc::new(request);
            debug!(scheme = adapter.scheme(), uri = %request.uri(), "request created");

            return match self.run_pipeline(&request).await {
                Ok(()) => Processed::Handled,
                Err(err) => {
                    self.error_handler.handle(&err, &event, Some(&request)).await;
                    Processed::Failed
                }
            };
        }

        debug!(event = event.event_name(), "no adapter claimed the event, ignored");
        Processed::Ignored
    }

    async fn run_pipeline(&self, request: &Arc<Request>) -> EngineResult<()> {
        let result = self.router.dispatch(request).await?;
        self.responses.process_result(request, Some(result)).await?;
        Ok(())
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("router", &self.router)
            .field("responses", &self.responses)
            .field("adapter_types", &self.adapters.len())
            .finish_non_exhaustive()
    }
}
