//! Built-in early-acknowledgement interceptor.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, trace};

use switchboard_core::{Request, Route};

use crate::error::BoxError;
use crate::handler::Reply;
use crate::interceptor::Interceptor;

/// Acknowledges deferrable routes before their handler runs.
///
/// The platform enforces a hard reply-latency budget on inbound events;
/// acknowledging early converts that hard deadline into a soft one. When the
/// resolved route declares [`defers`](Route::defers) and the live event has
/// a reply channel, this hook acknowledges the event synchronously and
/// attaches the resulting [`DeferredReply`](switchboard_core::DeferredReply)
/// so the handler or the response stage can send the eventual reply through
/// it.
///
/// The hook never short-circuits — its only contribution is the
/// acknowledgement side effect. Routers register it by default.
#[derive(Debug, Default)]
pub struct DeferralInterceptor;

impl DeferralInterceptor {
    /// Creates the interceptor.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Interceptor for DeferralInterceptor {
    fn name(&self) -> &str {
        "defer"
    }

    async fn pre_dispatch(
        &self,
        route: &Route,
        req: &Arc<Request>,
    ) -> Result<Option<Reply>, BoxError> {
        if !route.defers() {
            return Ok(None);
        }
        let Some(channel) = req.event().replyable() else {
            trace!(uri = %route.uri(), "route defers but event has no reply channel");
            return Ok(None);
        };

        let handle = channel.acknowledge(route.ephemeral_reply()).await?;
        debug!(
            uri = %route.uri(),
            ephemeral = route.ephemeral_reply(),
            "event acknowledged ahead of handler"
        );
        req.attach(handle);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use switchboard_core::{
        DeferredReply, EventKind, InboundEvent, PlatformResult, Replyable,
    };

    struct Slash {
        acks: AtomicUsize,
    }

    #[async_trait]
    impl Replyable for Slash {
        async fn acknowledge(&self, ephemeral: bool) -> PlatformResult<DeferredReply> {
            self.acks.fetch_add(1, Ordering::SeqCst);
            Ok(DeferredReply::new("token-1", ephemeral))
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

    fn slash_request() -> (Arc<Request>, Arc<Slash>) {
        let event = Arc::new(Slash {
            acks: AtomicUsize::new(0),
        });
        let event_arc: Arc<dyn InboundEvent> = event.clone();
        let req = Arc::new(Request::builder(event_arc, "cmd://slow".parse().unwrap()).build());
        (req, event)
    }

    #[tokio::test]
    async fn deferring_route_acknowledges_and_attaches() {
        let (req, event) = slash_request();
        let route = Route::parse("cmd://slow").unwrap().defer(true).ephemeral(true);

        let out = DeferralInterceptor::new()
            .pre_dispatch(&route, &req)
            .await
            .unwrap();

        // Never short-circuits.
        assert!(out.is_none());
        assert_eq!(event.acks.load(Ordering::SeqCst), 1);
        let handle = req.attachment::<DeferredReply>().unwrap();
        assert!(handle.ephemeral());
        assert_eq!(*handle.token::<&str>().unwrap(), "token-1");
    }

    #[tokio::test]
    async fn non_deferring_route_is_untouched() {
        let (req, event) = slash_request();
        let route = Route::parse("cmd://fast").unwrap();

        let out = DeferralInterceptor::new()
            .pre_dispatch(&route, &req)
            .await
            .unwrap();

        assert!(out.is_none());
        assert_eq!(event.acks.load(Ordering::SeqCst), 0);
        assert!(req.attachment::<DeferredReply>().is_none());
    }
}
