//! The normalized request model.
//!
//! A [`Request`] is the engine's view of one inbound event: the type-erased
//! event itself, the canonical URI the event resolved to, the parameter map
//! the adapter translated out of the native payload, and two mutable side
//! channels:
//!
//! - **attributes** — string-keyed values written by interceptors and read
//!   back during handler invocation (an authenticated principal, a request
//!   id, ...).
//! - **attachments** — at most one value per runtime type, for commonly
//!   needed context objects (client handle, invoking user, channel, deferred
//!   reply handle). Attaching a second value of the same type replaces the
//!   first.
//!
//! A request is created by exactly one adapter, lives for exactly one
//! dispatch, and is never persisted or reused. The URI is immutable after
//! construction; only the side channels mutate, and only from the single
//! call stack processing the event, so the interior locks are uncontended by
//! design.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::event::{EventArc, InboundEvent};
use crate::param::ParamValue;
use crate::uri::RouteUri;

type AnyArc = Arc<dyn Any + Send + Sync>;

/// The abstracted view of one inbound event.
pub struct Request {
    event: EventArc,
    uri: RouteUri,
    parameters: HashMap<String, ParamValue>,
    attributes: Mutex<HashMap<String, AnyArc>>,
    attachments: Mutex<HashMap<TypeId, AnyArc>>,
}

impl Request {
    /// Starts building a request for the given event and URI.
    pub fn builder(event: EventArc, uri: RouteUri) -> RequestBuilder {
        RequestBuilder {
            event,
            uri,
            parameters: HashMap::new(),
            attachments: Vec::new(),
        }
    }

    /// The originating event.
    pub fn event(&self) -> &dyn InboundEvent {
        &*self.event
    }

    /// A clone of the shared event handle.
    pub fn event_arc(&self) -> EventArc {
        Arc::clone(&self.event)
    }

    /// The canonical URI, query intact.
    pub fn uri(&self) -> &RouteUri {
        &self.uri
    }

    /// The full parameter map.
    pub fn parameters(&self) -> &HashMap<String, ParamValue> {
        &self.parameters
    }

    /// Looks up a single parameter.
    pub fn parameter(&self, key: &str) -> Option<&ParamValue> {
        self.parameters.get(key)
    }

    // ─── Attributes ──────────────────────────────────────────────────────────

    /// Stores a named attribute, replacing any previous value under the key.
    pub fn set_attribute<T: Send + Sync + 'static>(&self, key: impl Into<String>, value: T) {
        self.attributes.lock().insert(key.into(), Arc::new(value));
    }

    /// Retrieves a named attribute, if present and of type `T`.
    pub fn attribute<T: Send + Sync + 'static>(&self, key: &str) -> Option<Arc<T>> {
        self.attributes
            .lock()
            .get(key)
            .cloned()
            .and_then(|value| value.downcast().ok())
    }

    /// Returns `true` if any value is stored under `key`, regardless of type.
    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.lock().contains_key(key)
    }

    // ─── Attachments ─────────────────────────────────────────────────────────

    /// Attaches a context value, replacing any previous attachment of the
    /// same type.
    pub fn attach<T: Send + Sync + 'static>(&self, value: T) {
        self.attachments
            .lock()
            .insert(TypeId::of::<T>(), Arc::new(value));
    }

    /// Retrieves the attachment of type `T`, if one was stored.
    pub fn attachment<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.attachments
            .lock()
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|value| value.downcast().ok())
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("event", &self.event.event_name())
            .field("uri", &self.uri.to_string())
            .field("parameters", &self.parameters.len())
            .finish_non_exhaustive()
    }
}

/// Builder used by adapters to assemble a [`Request`].
pub struct RequestBuilder {
    event: EventArc,
    uri: RouteUri,
    parameters: HashMap<String, ParamValue>,
    attachments: Vec<(TypeId, AnyArc)>,
}

impl RequestBuilder {
    /// Adds one parameter.
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Adds every parameter from the iterator.
    pub fn parameters<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.parameters
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Pre-attaches a context value. Adapters use this for the standard
    /// context set (client handle, invoking user, channel, ...) whenever the
    /// underlying event exposes it.
    pub fn attach<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.attachments.push((TypeId::of::<T>(), Arc::new(value)));
        self
    }

    /// Finishes the request.
    pub fn build(self) -> Request {
        Request {
            event: self.event,
            uri: self.uri,
            parameters: self.parameters,
            attributes: Mutex::new(HashMap::new()),
            attachments: Mutex::new(self.attachments.into_iter().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    struct Click;

    impl InboundEvent for Click {
        fn kind(&self) -> EventKind {
            EventKind::Component
        }

        fn event_name(&self) -> &'static str {
            "click"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn request() -> Request {
        Request::builder(Arc::new(Click), "component://confirm?target=42".parse().unwrap())
            .parameter("target", "42")
            .build()
    }

    #[test]
    fn original_uri_keeps_its_query() {
        let req = request();
        assert_eq!(req.uri().query_value("target"), Some("42"));
        assert_eq!(req.uri().normalized(), "component://confirm");
    }

    #[test]
    fn attributes_are_typed_and_replaceable() {
        let req = request();
        assert!(!req.has_attribute("principal"));

        req.set_attribute("principal", String::from("mod-17"));
        assert!(req.has_attribute("principal"));
        assert_eq!(req.attribute::<String>("principal").unwrap().as_str(), "mod-17");
        // Wrong declared type resolves to nothing, but the key stays present.
        assert!(req.attribute::<u64>("principal").is_none());

        req.set_attribute("principal", String::from("mod-18"));
        assert_eq!(req.attribute::<String>("principal").unwrap().as_str(), "mod-18");
    }

    #[test]
    fn attachments_hold_one_value_per_type() {
        #[derive(Debug, PartialEq)]
        struct Channel(u64);

        let req = request();
        assert!(req.attachment::<Channel>().is_none());

        req.attach(Channel(1));
        req.attach(Channel(2));
        assert_eq!(*req.attachment::<Channel>().unwrap(), Channel(2));
    }

    #[test]
    fn builder_attachments_are_visible() {
        struct Client(&'static str);

        let req = Request::builder(Arc::new(Click), "component://x".parse().unwrap())
            .attach(Client("bot"))
            .build();
        assert_eq!(req.attachment::<Client>().unwrap().0, "bot");
    }
}
