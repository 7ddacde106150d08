//! Parameter values and coercion.
//!
//! A request's parameter map carries the union of value shapes the supported
//! platforms produce: text, integers, floats, booleans, and references to
//! platform entities (users, channels, roles, ...). Adapters translate native
//! option sets into [`ParamValue`]s; the handler invoker coerces them into
//! the types handlers declare via [`FromParam`].
//!
//! Coercion is one-way: textual values parse into primitives and
//! enumerations, already-typed values pass through unchanged, and nothing is
//! ever stringified implicitly.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoerceError, CoerceResult};

// =============================================================================
// Entity References
// =============================================================================

/// The kinds of platform entities a parameter can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    User,
    Channel,
    Role,
    Message,
    Guild,
}

/// An opaque reference to a platform entity.
///
/// The engine never resolves these; they are carried through to handlers
/// as-is, the way the platform delivered them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// What the id points at.
    pub kind: EntityKind,
    /// The platform-side identifier.
    pub id: String,
}

impl EntityRef {
    /// Creates a reference of the given kind.
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Convenience constructor for a user reference.
    pub fn user(id: impl Into<String>) -> Self {
        Self::new(EntityKind::User, id)
    }

    /// Convenience constructor for a channel reference.
    pub fn channel(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Channel, id)
    }

    /// Convenience constructor for a role reference.
    pub fn role(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Role, id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.id)
    }
}

// =============================================================================
// Parameter Values
// =============================================================================

/// One value in a request's parameter map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Textual value; the only shape that coerces into other types.
    Str(String),
    /// Integer option value.
    Int(i64),
    /// Floating-point option value.
    Float(f64),
    /// Boolean option value.
    Bool(bool),
    /// Platform entity reference.
    Entity(EntityRef),
}

impl ParamValue {
    /// Label of the stored shape, used in coercion errors.
    pub fn type_label(&self) -> &'static str {
        match self {
            ParamValue::Str(_) => "string",
            ParamValue::Int(_) => "integer",
            ParamValue::Float(_) => "float",
            ParamValue::Bool(_) => "boolean",
            ParamValue::Entity(_) => "entity",
        }
    }

    /// Returns the textual content, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(v) => f.write_str(v),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Entity(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<EntityRef> for ParamValue {
    fn from(value: EntityRef) -> Self {
        ParamValue::Entity(value)
    }
}

/// Conversion from raw JSON option values, for adapters translating
/// platform-native payloads.
///
/// Nulls, arrays, and objects have no parameter shape and are rejected;
/// numbers become integers when they fit `i64` and floats otherwise.
impl TryFrom<&serde_json::Value> for ParamValue {
    type Error = CoerceError;

    fn try_from(value: &serde_json::Value) -> CoerceResult<Self> {
        use serde_json::Value;
        match value {
            Value::String(s) => Ok(ParamValue::Str(s.clone())),
            Value::Bool(b) => Ok(ParamValue::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(ParamValue::Int)
                .or_else(|| n.as_f64().map(ParamValue::Float))
                .ok_or(CoerceError::Mismatch {
                    expected: "number",
                    got: "number",
                }),
            Value::Null => Err(CoerceError::Mismatch {
                expected: "parameter value",
                got: "null",
            }),
            Value::Array(_) => Err(CoerceError::Mismatch {
                expected: "parameter value",
                got: "array",
            }),
            Value::Object(_) => Err(CoerceError::Mismatch {
                expected: "parameter value",
                got: "object",
            }),
        }
    }
}

// =============================================================================
// Coercion
// =============================================================================

/// Types a handler parameter can be coerced into from a [`ParamValue`].
///
/// Implementations follow the coercion contract above: accept the matching
/// typed shape, parse textual values where the target is a primitive or an
/// enumeration, and reject everything else with a [`CoerceError`].
pub trait FromParam: Sized {
    /// Attempts the coercion.
    fn from_param(value: &ParamValue) -> CoerceResult<Self>;
}

impl FromParam for String {
    fn from_param(value: &ParamValue) -> CoerceResult<Self> {
        match value {
            ParamValue::Str(s) => Ok(s.clone()),
            other => Err(CoerceError::Mismatch {
                expected: "string",
                got: other.type_label(),
            }),
        }
    }
}

impl FromParam for i64 {
    fn from_param(value: &ParamValue) -> CoerceResult<Self> {
        match value {
            ParamValue::Int(v) => Ok(*v),
            ParamValue::Str(s) => s.parse().map_err(|_| CoerceError::Parse {
                value: s.clone(),
                target: "integer",
            }),
            other => Err(CoerceError::Mismatch {
                expected: "integer",
                got: other.type_label(),
            }),
        }
    }
}

impl FromParam for f64 {
    fn from_param(value: &ParamValue) -> CoerceResult<Self> {
        match value {
            ParamValue::Float(v) => Ok(*v),
            ParamValue::Int(v) => Ok(*v as f64),
            ParamValue::Str(s) => s.parse().map_err(|_| CoerceError::Parse {
                value: s.clone(),
                target: "float",
            }),
            other => Err(CoerceError::Mismatch {
                expected: "float",
                got: other.type_label(),
            }),
        }
    }
}

impl FromParam for bool {
    fn from_param(value: &ParamValue) -> CoerceResult<Self> {
        match value {
            ParamValue::Bool(v) => Ok(*v),
            // Strict: only the exact literals coerce.
            ParamValue::Str(s) => match s.as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(CoerceError::Parse {
                    value: s.clone(),
                    target: "boolean",
                }),
            },
            other => Err(CoerceError::Mismatch {
                expected: "boolean",
                got: other.type_label(),
            }),
        }
    }
}

impl FromParam for EntityRef {
    fn from_param(value: &ParamValue) -> CoerceResult<Self> {
        match value {
            ParamValue::Entity(e) => Ok(e.clone()),
            other => Err(CoerceError::Mismatch {
                expected: "entity",
                got: other.type_label(),
            }),
        }
    }
}

/// Defines a unit-variant enumeration coercible from textual parameters.
///
/// Matching is exact and case-sensitive against the member names; any other
/// text fails with [`CoerceError::InvalidEnumValue`] naming the offending
/// text and the target enumeration.
///
/// ```rust,ignore
/// param_enum! {
///     /// Moderation action selected in a command option.
///     pub enum Action { Warn, Kick, Ban }
/// }
/// ```
#[macro_export]
macro_rules! param_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident { $($variant:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::param::FromParam for $name {
            fn from_param(
                value: &$crate::param::ParamValue,
            ) -> $crate::error::CoerceResult<Self> {
                match value {
                    $crate::param::ParamValue::Str(s) => match s.as_str() {
                        $(stringify!($variant) => Ok(Self::$variant),)+
                        _ => Err($crate::error::CoerceError::InvalidEnumValue {
                            value: s.clone(),
                            enumeration: stringify!($name),
                        }),
                    },
                    other => Err($crate::error::CoerceError::Mismatch {
                        expected: stringify!($name),
                        got: other.type_label(),
                    }),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    param_enum! {
        enum Flavor { A, B, C }
    }

    #[test]
    fn textual_values_coerce_into_primitives() {
        assert_eq!(i64::from_param(&"42".into()), Ok(42));
        assert_eq!(bool::from_param(&"true".into()), Ok(true));
        assert_eq!(f64::from_param(&"3.14".into()), Ok(3.14));
    }

    #[test]
    fn typed_values_pass_through() {
        assert_eq!(i64::from_param(&7i64.into()), Ok(7));
        assert_eq!(bool::from_param(&false.into()), Ok(false));
        assert_eq!(
            EntityRef::from_param(&EntityRef::user("99").into()),
            Ok(EntityRef::user("99"))
        );
    }

    #[test]
    fn coercion_is_one_way() {
        // An already-typed value never stringifies.
        assert!(matches!(
            String::from_param(&7i64.into()),
            Err(CoerceError::Mismatch { expected: "string", .. })
        ));
    }

    #[test]
    fn unparseable_text_is_a_parse_error() {
        assert!(matches!(
            i64::from_param(&"not-a-number".into()),
            Err(CoerceError::Parse { target: "integer", .. })
        ));
        // Boolean coercion is strict.
        assert!(matches!(
            bool::from_param(&"True".into()),
            Err(CoerceError::Parse { target: "boolean", .. })
        ));
    }

    #[test]
    fn enum_members_match_exactly() {
        assert_eq!(Flavor::from_param(&"B".into()), Ok(Flavor::B));
        assert!(matches!(
            Flavor::from_param(&"ZZZ".into()),
            Err(CoerceError::InvalidEnumValue { enumeration: "Flavor", .. })
        ));
        // Case-sensitive.
        assert!(matches!(
            Flavor::from_param(&"b".into()),
            Err(CoerceError::InvalidEnumValue { .. })
        ));
    }

    #[test]
    fn json_values_translate() {
        use serde_json::json;
        assert_eq!(
            ParamValue::try_from(&json!("hi")),
            Ok(ParamValue::Str("hi".into()))
        );
        assert_eq!(ParamValue::try_from(&json!(5)), Ok(ParamValue::Int(5)));
        assert_eq!(
            ParamValue::try_from(&json!(2.5)),
            Ok(ParamValue::Float(2.5))
        );
        assert_eq!(
            ParamValue::try_from(&json!(true)),
            Ok(ParamValue::Bool(true))
        );
        assert!(ParamValue::try_from(&json!(null)).is_err());
        assert!(ParamValue::try_from(&json!([1, 2])).is_err());
    }
}
