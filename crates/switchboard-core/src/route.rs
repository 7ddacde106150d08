//! Route descriptors.
//!
//! A [`Route`] names the address an endpoint is registered under plus the
//! reply behavior the route declares: whether the event should be
//! acknowledged before the handler runs (deferral) and whether that
//! acknowledgement is ephemeral. The flags can come from code (builder
//! methods) or from a host's configuration file via [`RouteOptions`].

use serde::{Deserialize, Serialize};

use crate::error::UriResult;
use crate::uri::RouteUri;

/// Descriptor of a registered route.
#[derive(Debug, Clone)]
pub struct Route {
    uri: RouteUri,
    defer: bool,
    ephemeral: bool,
}

impl Route {
    /// Creates a route for the given URI with deferral disabled.
    pub fn new(uri: RouteUri) -> Self {
        Self {
            uri,
            defer: false,
            ephemeral: false,
        }
    }

    /// Parses the URI and creates a route for it.
    pub fn parse(input: &str) -> UriResult<Self> {
        input.parse().map(Self::new)
    }

    /// Declares whether the route wants its event acknowledged ahead of the
    /// handler.
    pub fn defer(mut self, defer: bool) -> Self {
        self.defer = defer;
        self
    }

    /// Declares whether the acknowledgement (and reply) should be ephemeral.
    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }

    /// Applies host-configured reply options.
    pub fn with_options(mut self, options: &RouteOptions) -> Self {
        self.defer = options.defer;
        self.ephemeral = options.ephemeral;
        self
    }

    /// The route's address.
    pub fn uri(&self) -> &RouteUri {
        &self.uri
    }

    /// Whether the route asks for early acknowledgement.
    pub fn defers(&self) -> bool {
        self.defer
    }

    /// Whether replies to this route are ephemeral.
    pub fn ephemeral_reply(&self) -> bool {
        self.ephemeral
    }
}

/// Reply options for a route, deserializable from a host's configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteOptions {
    /// Acknowledge the event before the handler runs.
    #[serde(default)]
    pub defer: bool,

    /// Make the acknowledgement and reply visible to the invoker only.
    #[serde(default)]
    pub ephemeral: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_flags() {
        let route = Route::parse("cmd://mod/ban").unwrap().defer(true).ephemeral(true);
        assert!(route.defers());
        assert!(route.ephemeral_reply());
        assert_eq!(route.uri().normalized(), "cmd://mod/ban");
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: RouteOptions = serde_json::from_str("{}").unwrap();
        assert!(!options.defer);
        assert!(!options.ephemeral);

        let options: RouteOptions = serde_json::from_str(r#"{"defer": true}"#).unwrap();
        let route = Route::parse("cmd://ping").unwrap().with_options(&options);
        assert!(route.defers());
        assert!(!route.ephemeral_reply());
    }
}
