//! Canonical route identifiers.
//!
//! Every request is addressed by a [`RouteUri`] of the form
//! `<scheme>://<authority>[/<path>][?<key>=<value>&...][#<fragment>]`.
//!
//! The scheme names the adapter family that produced the request (one scheme
//! per adapter), the authority/path pair is the logical route address, and
//! the query carries inline string arguments for events whose native
//! identifier is a single opaque token (component clicks). Structured events
//! (slash-style commands) don't use the query; their typed options go into
//! the request's parameter map directly.
//!
//! # Normalization
//!
//! Route-table keys are the *normalized* rendering — scheme, authority, and
//! path with query and fragment discarded. Normalization happens at lookup
//! time, never at storage time, so a handler can still read the original
//! query of the URI it was dispatched under. The operation is idempotent:
//! normalizing an already-normalized URI is a no-op.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{UriError, UriResult};

/// A parsed route identifier.
///
/// `RouteUri` keeps the query and fragment it was parsed with; use
/// [`normalized`](Self::normalized) for table keys and comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteUri {
    scheme: String,
    authority: String,
    /// Empty, or begins with `/`.
    path: String,
    query: Vec<(String, String)>,
    fragment: Option<String>,
}

impl RouteUri {
    /// Parses `input`, prefixing `scheme://` when the input carries no scheme
    /// of its own.
    ///
    /// This is the adapter-side constructor: a native identifier that already
    /// names a scheme is honored as-is, anything else is claimed under the
    /// adapter's own scheme.
    pub fn with_default_scheme(input: &str, scheme: &str) -> UriResult<Self> {
        if input.contains("://") {
            input.parse()
        } else {
            format!("{scheme}://{input}").parse()
        }
    }

    /// The (lowercased) scheme.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The first address segment after `://`.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// The remaining address segments; empty or starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The parsed query pairs, in the order they appeared.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Returns the first query value stored under `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The fragment, if one was present.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Renders the normalized form: scheme, authority, and path with query
    /// and fragment discarded.
    ///
    /// This is the route-table key. `normalize(normalize(u)) == normalize(u)`
    /// holds for every parseable `u`.
    pub fn normalized(&self) -> String {
        format!("{}://{}{}", self.scheme, self.authority, self.path)
    }
}

impl FromStr for RouteUri {
    type Err = UriError;

    fn from_str(input: &str) -> UriResult<Self> {
        if input.trim().is_empty() {
            return Err(UriError::Empty);
        }
        let (scheme, rest) = input.split_once("://").ok_or_else(|| UriError::MissingScheme {
            input: input.to_string(),
        })?;
        if scheme.is_empty() {
            return Err(UriError::MissingScheme {
                input: input.to_string(),
            });
        }

        let (rest, fragment) = match rest.split_once('#') {
            Some((r, f)) => (r, Some(f.to_string())),
            None => (rest, None),
        };
        let (address, raw_query) = match rest.split_once('?') {
            Some((a, q)) => (a, Some(q)),
            None => (rest, None),
        };
        if address.is_empty() {
            return Err(UriError::MissingAddress {
                input: input.to_string(),
            });
        }

        let (authority, path) = match address.split_once('/') {
            Some((auth, tail)) => (auth.to_string(), format!("/{tail}")),
            None => (address.to_string(), String::new()),
        };

        let query = raw_query
            .map(|q| {
                q.split('&')
                    .filter(|pair| !pair.is_empty())
                    .map(|pair| match pair.split_once('=') {
                        Some((k, v)) => (k.to_string(), v.to_string()),
                        None => (pair.to_string(), String::new()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            authority,
            path,
            query,
            fragment,
        })
    }
}

impl fmt::Display for RouteUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.path)?;
        for (i, (k, v)) in self.query.iter().enumerate() {
            f.write_str(if i == 0 { "?" } else { "&" })?;
            if v.is_empty() {
                write!(f, "{k}")?;
            } else {
                write!(f, "{k}={v}")?;
            }
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

impl Serialize for RouteUri {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RouteUri {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scheme_and_address() {
        let uri: RouteUri = "cmd://mod/ban".parse().unwrap();
        assert_eq!(uri.scheme(), "cmd");
        assert_eq!(uri.authority(), "mod");
        assert_eq!(uri.path(), "/ban");
        assert!(uri.query().is_empty());
    }

    #[test]
    fn parses_query_and_fragment() {
        let uri: RouteUri = "component://confirm?target=42&flag#anchor".parse().unwrap();
        assert_eq!(uri.query_value("target"), Some("42"));
        assert_eq!(uri.query_value("flag"), Some(""));
        assert_eq!(uri.fragment(), Some("anchor"));
    }

    #[test]
    fn normalization_discards_query_and_fragment() {
        let uri: RouteUri = "cmd://mod/ban?reason=spam#frag".parse().unwrap();
        assert_eq!(uri.normalized(), "cmd://mod/ban");
    }

    #[test]
    fn normalization_is_idempotent() {
        let uri: RouteUri = "CMD://Mod/Ban?x=1#f".parse().unwrap();
        let once = uri.normalized();
        let twice = once.parse::<RouteUri>().unwrap().normalized();
        assert_eq!(once, twice);
    }

    #[test]
    fn scheme_is_lowercased_but_address_is_preserved() {
        let uri: RouteUri = "CMD://Mod/Ban".parse().unwrap();
        assert_eq!(uri.scheme(), "cmd");
        assert_eq!(uri.authority(), "Mod");
        assert_eq!(uri.path(), "/Ban");
    }

    #[test]
    fn default_scheme_honors_existing_scheme() {
        let uri = RouteUri::with_default_scheme("component://confirm", "cmd").unwrap();
        assert_eq!(uri.scheme(), "component");

        let uri = RouteUri::with_default_scheme("ping", "cmd").unwrap();
        assert_eq!(uri.normalized(), "cmd://ping");
    }

    #[test]
    fn display_round_trips_the_original_shape() {
        let raw = "component://confirm?target=42#a";
        let uri: RouteUri = raw.parse().unwrap();
        assert_eq!(uri.to_string(), raw);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!("".parse::<RouteUri>(), Err(UriError::Empty));
        assert!(matches!(
            "ping".parse::<RouteUri>(),
            Err(UriError::MissingScheme { .. })
        ));
        assert!(matches!(
            "://ping".parse::<RouteUri>(),
            Err(UriError::MissingScheme { .. })
        ));
        assert!(matches!(
            "cmd://".parse::<RouteUri>(),
            Err(UriError::MissingAddress { .. })
        ));
    }
}
