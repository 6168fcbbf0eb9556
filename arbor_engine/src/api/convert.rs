use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::api::{CustomValue, ScalarType, Value};

/// A conversion from a raw token into a [`Value`].
pub type ConvertFn = Arc<dyn Fn(&str) -> Result<Value, ConvertError> + Send + Sync>;

/// A raw token could not be converted to the declared type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot convert '{token}' to {type_name}.")]
pub struct ConvertError {
    /// The offending literal.
    pub token: String,
    /// The display name of the expected type.
    pub type_name: String,
}

impl ConvertError {
    /// Describe a failed conversion of `token` into `type_name`.
    pub fn new(token: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            type_name: type_name.into(),
        }
    }
}

/// Maps custom type tags to their conversion functions.
///
/// Built-in scalar types (booleans, numbers, characters, text, enumerations) need no registration.
///
/// ### Example
/// ```
/// # use arbor_engine as arbor;
/// use arbor::{ConverterRegistry, ScalarType, Value};
/// use std::net::Ipv4Addr;
///
/// let registry = ConverterRegistry::default().register::<Ipv4Addr>("ipv4");
/// let value = registry
///     .convert(&ScalarType::Custom("ipv4".to_string()), "10.0.0.1")
///     .unwrap();
///
/// assert_eq!(value.downcast_ref::<Ipv4Addr>(), Some(&Ipv4Addr::new(10, 0, 0, 1)));
/// ```
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<String, ConvertFn>,
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<&String> = self.converters.keys().collect();
        tags.sort();
        f.debug_struct("ConverterRegistry")
            .field("tags", &tags)
            .finish()
    }
}

impl ConverterRegistry {
    /// Register a string-constructible type under `tag`, using its [`FromStr`].
    /// If repeated for the same tag, only the final registration applies.
    pub fn register<T>(self, tag: impl Into<String>) -> Self
    where
        T: FromStr + std::fmt::Display + Send + Sync + 'static,
    {
        let tag = tag.into();
        let value_tag = tag.clone();
        self.register_fn(tag, move |token| {
            T::from_str(token)
                .map(|value| Value::Custom(CustomValue::new(value_tag.clone(), value)))
                .map_err(|_| ConvertError::new(token, value_tag.clone()))
        })
    }

    /// Register an arbitrary conversion function under `tag`.
    /// If repeated for the same tag, only the final registration applies.
    pub fn register_fn(
        mut self,
        tag: impl Into<String>,
        convert: impl Fn(&str) -> Result<Value, ConvertError> + Send + Sync + 'static,
    ) -> Self {
        self.converters.insert(tag.into(), Arc::new(convert));
        self
    }

    /// Whether a converter is registered under `tag`.
    pub fn contains(&self, tag: &str) -> bool {
        self.converters.contains_key(tag)
    }

    /// Convert a single raw token to the scalar type.
    pub fn convert(&self, scalar: &ScalarType, token: &str) -> Result<Value, ConvertError> {
        let invalid = || ConvertError::new(token, scalar.display_name());

        match scalar {
            ScalarType::Bool => parse_bool(token).map(Value::Bool).ok_or_else(invalid),
            ScalarType::Int => i64::from_str(token).map(Value::Int).map_err(|_| invalid()),
            ScalarType::UInt => u64::from_str(token).map(Value::UInt).map_err(|_| invalid()),
            ScalarType::Float => f64::from_str(token).map(Value::Float).map_err(|_| invalid()),
            ScalarType::Char => {
                let mut chars = token.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(invalid()),
                }
            }
            ScalarType::Text => Ok(Value::Text(token.to_string())),
            ScalarType::Enum { members, .. } => {
                if members.iter().any(|member| member == token) {
                    Ok(Value::Enum(token.to_string()))
                } else {
                    Err(invalid())
                }
            }
            ScalarType::Custom(tag) => match self.converters.get(tag) {
                Some(convert) => convert(token),
                None => Err(invalid()),
            },
        }
    }
}

/// Parse a boolean literal (`true`/`false`, case-insensitive).
pub(crate) fn parse_bool(token: &str) -> Option<bool> {
    if token.eq_ignore_ascii_case("true") {
        Some(true)
    } else if token.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::net::Ipv4Addr;

    #[rstest]
    #[case(ScalarType::Bool, "true", Value::Bool(true))]
    #[case(ScalarType::Bool, "FALSE", Value::Bool(false))]
    #[case(ScalarType::Int, "-12", Value::Int(-12))]
    #[case(ScalarType::UInt, "12", Value::UInt(12))]
    #[case(ScalarType::Float, "1.5", Value::Float(1.5))]
    #[case(ScalarType::Char, "x", Value::Char('x'))]
    #[case(ScalarType::Text, "a b", Value::Text("a b".to_string()))]
    #[case(ScalarType::Enum { name: "Color".to_string(), members: vec!["Red".to_string()] }, "Red", Value::Enum("Red".to_string()))]
    fn convert(#[case] scalar: ScalarType, #[case] token: &str, #[case] expected: Value) {
        let registry = ConverterRegistry::default();
        assert_eq!(registry.convert(&scalar, token).unwrap(), expected);
    }

    #[rstest]
    #[case(ScalarType::Bool, "yes", "Boolean")]
    #[case(ScalarType::Int, "1.5", "Integer")]
    #[case(ScalarType::UInt, "-1", "Unsigned Integer")]
    #[case(ScalarType::Float, "abc", "Decimal")]
    #[case(ScalarType::Char, "xy", "Character")]
    #[case(ScalarType::Char, "", "Character")]
    #[case(ScalarType::Enum { name: "Color".to_string(), members: vec!["Red".to_string()] }, "red", "Color")]
    #[case(ScalarType::Custom("unregistered".to_string()), "x", "unregistered")]
    fn convert_invalid(#[case] scalar: ScalarType, #[case] token: &str, #[case] type_name: &str) {
        let registry = ConverterRegistry::default();
        assert_eq!(
            registry.convert(&scalar, token).unwrap_err(),
            ConvertError::new(token, type_name)
        );
    }

    #[test]
    fn register_from_str() {
        let registry = ConverterRegistry::default().register::<Ipv4Addr>("ipv4");
        let scalar = ScalarType::Custom("ipv4".to_string());
        assert!(registry.contains("ipv4"));

        let value = registry.convert(&scalar, "10.1.2.3").unwrap();
        assert_eq!(value.downcast_ref::<Ipv4Addr>(), Some(&Ipv4Addr::new(10, 1, 2, 3)));

        let error = registry.convert(&scalar, "10.1.2").unwrap_err();
        assert_eq!(error.to_string(), "cannot convert '10.1.2' to ipv4.");
    }

    #[test]
    fn register_fn() {
        let registry = ConverterRegistry::default().register_fn("upper", |token| {
            Ok(Value::Text(token.to_uppercase()))
        });
        assert_eq!(
            registry
                .convert(&ScalarType::Custom("upper".to_string()), "abc")
                .unwrap(),
            Value::Text("ABC".to_string())
        );
    }
}
