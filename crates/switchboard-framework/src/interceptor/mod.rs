//! Cross-cutting hooks around handler invocation.
//!
//! Interceptors wrap every dispatch with two optional hooks:
//!
//! - [`pre_dispatch`](Interceptor::pre_dispatch) runs before the handler, in
//!   registration order. The first hook to return a value **short-circuits**:
//!   that value becomes the dispatch result, the handler never runs, and the
//!   remaining pre hooks are skipped. Returning `None` passes control on —
//!   side effects (acknowledging the event, stamping an attribute) are the
//!   usual reason to be here.
//! - [`post_dispatch`](Interceptor::post_dispatch) runs after the handler,
//!   also in registration order, and sees the handler's outcome. On success
//!   the first returned value replaces the handler's result; later hooks
//!   still run (for bookkeeping) but their values are ignored. On a handler
//!   failure the pass still runs once so held resources can be released, but
//!   interceptors cannot suppress the failure — the original error is
//!   re-raised afterwards.
//!
//! The router keeps interceptors as a set keyed on [`name`](Interceptor::name):
//! registering a second interceptor under an existing name is refused.

mod defer;

pub use defer::DeferralInterceptor;

use std::sync::Arc;

use async_trait::async_trait;

use switchboard_core::{Request, Route};

use crate::error::{BoxError, DispatchError};
use crate::handler::Reply;

/// The handler outcome a post hook observes: the result value, or the error
/// about to be re-raised.
pub type DispatchOutcome<'a> = Result<&'a Reply, &'a DispatchError>;

/// A pre/post hook around handler invocation.
///
/// Hooks are expected not to fail for conditions they consider normal; a
/// returned error is treated like a handler failure and ends the dispatch.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Stable identifier. The router's interceptor set is keyed on it.
    fn name(&self) -> &str;

    /// Runs before the handler. `Some` short-circuits the dispatch with the
    /// given value.
    async fn pre_dispatch(
        &self,
        route: &Route,
        req: &Arc<Request>,
    ) -> Result<Option<Reply>, BoxError> {
        let _ = (route, req);
        Ok(None)
    }

    /// Runs after the handler (or after a handler failure). On success,
    /// `Some` replaces the handler's result.
    async fn post_dispatch(
        &self,
        route: &Route,
        req: &Arc<Request>,
        outcome: DispatchOutcome<'_>,
    ) -> Result<Option<Reply>, BoxError> {
        let _ = (route, req, outcome);
        Ok(None)
    }
}
