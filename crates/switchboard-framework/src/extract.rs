//! Parameter resolvers for handler invocation.
//!
//! Each extractor is a small strategy object built at registration time and
//! applied to the request on every invocation. One extractor per handler
//! parameter, resolved in declaration order, following a fixed precedence of
//! sources:
//!
//! 1. [`request`] — inject the request itself; [`event`] — inject the
//!    concrete live event.
//! 2. [`payload`] — look up a named parameter and coerce it into the
//!    declared type ([`FromParam`]).
//! 3. [`attribute`] — look up a named attribute and pass it through
//!    unchanged; attributes never coerce.
//! 4. [`attachment`] — look up a context value by type; a missing
//!    attachment resolves to `None`, never an error.

use std::marker::PhantomData;
use std::sync::Arc;

use switchboard_core::{FromParam, InboundEvent, Request};

use crate::error::InvokeError;

/// A registration-time resolver for one handler parameter.
pub trait Extract<T>: Send + Sync {
    /// Resolves the parameter against the request.
    fn extract(&self, req: &Arc<Request>) -> Result<T, InvokeError>;
}

// =============================================================================
// Request / event injection
// =============================================================================

/// Injects the request itself.
pub fn request() -> RequestExtractor {
    RequestExtractor
}

/// Extractor produced by [`request`].
pub struct RequestExtractor;

impl Extract<Arc<Request>> for RequestExtractor {
    fn extract(&self, req: &Arc<Request>) -> Result<Arc<Request>, InvokeError> {
        Ok(Arc::clone(req))
    }
}

/// Injects the concrete live event.
///
/// Fails with [`InvokeError::EventTypeMismatch`] when the live event is a
/// different type — which the router's kind check should have ruled out for
/// correctly registered routes.
pub fn event<E: InboundEvent + Clone>() -> EventExtractor<E> {
    EventExtractor {
        _marker: PhantomData,
    }
}

/// Extractor produced by [`event`].
pub struct EventExtractor<E> {
    _marker: PhantomData<fn() -> E>,
}

impl<E: InboundEvent + Clone> Extract<E> for EventExtractor<E> {
    fn extract(&self, req: &Arc<Request>) -> Result<E, InvokeError> {
        req.event()
            .as_any()
            .downcast_ref::<E>()
            .cloned()
            .ok_or_else(|| InvokeError::EventTypeMismatch {
                expected: std::any::type_name::<E>(),
                got: req.event().event_name(),
            })
    }
}

// =============================================================================
// Payload parameters
// =============================================================================

/// Resolves a named payload parameter, coercing it into `T`.
pub fn payload<T: FromParam>(key: impl Into<String>) -> PayloadExtractor<T> {
    PayloadExtractor {
        key: key.into(),
        _marker: PhantomData,
    }
}

/// Extractor produced by [`payload`].
pub struct PayloadExtractor<T> {
    key: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromParam> Extract<T> for PayloadExtractor<T> {
    fn extract(&self, req: &Arc<Request>) -> Result<T, InvokeError> {
        let value = req
            .parameter(&self.key)
            .ok_or_else(|| InvokeError::MissingParameter {
                key: self.key.clone(),
            })?;
        T::from_param(value).map_err(|source| InvokeError::Parameter {
            key: self.key.clone(),
            source,
        })
    }
}

// =============================================================================
// Attributes
// =============================================================================

/// Resolves a named attribute written earlier in the dispatch (typically by
/// an interceptor). Pass-through only: no coercion.
pub fn attribute<T: Send + Sync + 'static>(key: impl Into<String>) -> AttributeExtractor<T> {
    AttributeExtractor {
        key: key.into(),
        _marker: PhantomData,
    }
}

/// Extractor produced by [`attribute`].
pub struct AttributeExtractor<T> {
    key: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Extract<Arc<T>> for AttributeExtractor<T> {
    fn extract(&self, req: &Arc<Request>) -> Result<Arc<T>, InvokeError> {
        if let Some(value) = req.attribute::<T>(&self.key) {
            return Ok(value);
        }
        if req.has_attribute(&self.key) {
            Err(InvokeError::AttributeTypeMismatch {
                key: self.key.clone(),
                expected: std::any::type_name::<T>(),
            })
        } else {
            Err(InvokeError::MissingAttribute {
                key: self.key.clone(),
            })
        }
    }
}

// =============================================================================
// Attachments
// =============================================================================

/// Resolves the typed attachment of type `T`.
///
/// An absent attachment resolves to `None` rather than failing — attachment
/// parameters are optional in spirit, since adapters populate the context
/// set opportunistically.
pub fn attachment<T: Send + Sync + 'static>() -> AttachmentExtractor<T> {
    AttachmentExtractor {
        _marker: PhantomData,
    }
}

/// Extractor produced by [`attachment`].
pub struct AttachmentExtractor<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Extract<Option<Arc<T>>> for AttachmentExtractor<T> {
    fn extract(&self, req: &Arc<Request>) -> Result<Option<Arc<T>>, InvokeError> {
        Ok(req.attachment::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use switchboard_core::{param_enum, CoerceError, EventKind, ParamValue};

    #[derive(Clone)]
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

    param_enum! {
        enum Severity { Low, High }
    }

    fn req(params: &[(&str, ParamValue)]) -> Arc<Request> {
        let mut builder = Request::builder(Arc::new(Slash), "cmd://t".parse().unwrap());
        for (k, v) in params {
            builder = builder.parameter(*k, v.clone());
        }
        Arc::new(builder.build())
    }

    #[test]
    fn payload_coerces_textual_values() {
        let r = req(&[
            ("count", "42".into()),
            ("flag", "true".into()),
            ("ratio", "3.14".into()),
            ("severity", "High".into()),
        ]);
        assert_eq!(payload::<i64>("count").extract(&r).unwrap(), 42);
        assert!(payload::<bool>("flag").extract(&r).unwrap());
        assert_eq!(payload::<f64>("ratio").extract(&r).unwrap(), 3.14);
        assert_eq!(
            payload::<Severity>("severity").extract(&r).unwrap(),
            Severity::High
        );
    }

    #[test]
    fn payload_reports_bad_enum_members() {
        let r = req(&[("severity", "ZZZ".into())]);
        let err = payload::<Severity>("severity").extract(&r).unwrap_err();
        match err {
            InvokeError::Parameter {
                key,
                source: CoerceError::InvalidEnumValue { value, enumeration },
            } => {
                assert_eq!(key, "severity");
                assert_eq!(value, "ZZZ");
                assert_eq!(enumeration, "Severity");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn payload_misses_are_errors() {
        let r = req(&[]);
        assert!(matches!(
            payload::<String>("text").extract(&r),
            Err(InvokeError::MissingParameter { .. })
        ));
    }

    #[test]
    fn attributes_pass_through_without_coercion() {
        let r = req(&[]);
        r.set_attribute("principal", String::from("mod-17"));

        let value = attribute::<String>("principal").extract(&r).unwrap();
        assert_eq!(value.as_str(), "mod-17");

        // Present under the key, wrong type: mismatch, not missing.
        assert!(matches!(
            attribute::<u64>("principal").extract(&r),
            Err(InvokeError::AttributeTypeMismatch { .. })
        ));
        assert!(matches!(
            attribute::<String>("absent").extract(&r),
            Err(InvokeError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn missing_attachments_resolve_to_none() {
        struct Channel(#[allow(dead_code)] u64);

        let r = req(&[]);
        assert!(attachment::<Channel>().extract(&r).unwrap().is_none());

        r.attach(Channel(9));
        assert!(attachment::<Channel>().extract(&r).unwrap().is_some());
    }

    #[test]
    fn event_extraction_checks_the_live_type() {
        let r = req(&[]);
        assert!(event::<Slash>().extract(&r).is_ok());

        let click = Arc::new(
            Request::builder(Arc::new(Click), "component://x".parse().unwrap()).build(),
        );
        assert!(matches!(
            event::<Slash>().extract(&click),
            Err(InvokeError::EventTypeMismatch { got: "click", .. })
        ));
    }
}
