//! Traits which, typically, may be imported without concern: `use arbor::prelude::*`.

use crate::api::Value;

/// Extract a Rust value from a bound [`Value`].
// Needs to be imported in order to implement extraction for a custom type.
pub trait FromValue: Sized {
    /// Convert, or `None` when the value has a different shape or type.
    fn from_value(value: &Value) -> Option<Self>;

    /// The value of an argument that was not bound at all (ex: an absent nullable).
    fn absent() -> Option<Self> {
        None
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            Value::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).and_then(|i| i32::try_from(i).ok())
    }
}

impl FromValue for u64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::UInt(u) => Some(*u),
            Value::Int(i) => u64::try_from(*i).ok(),
            _ => None,
        }
    }
}

impl FromValue for usize {
    fn from_value(value: &Value) -> Option<Self> {
        u64::from_value(value).and_then(|u| usize::try_from(u).ok())
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::UInt(u) => Some(*u as f64),
            _ => None,
        }
    }
}

impl FromValue for char {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(s) | Value::Enum(s) => Some(s.clone()),
            Value::List(_) => None,
            other => Some(other.to_string()),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            single => T::from_value(single).map(|item| vec![item]),
        }
    }

    fn absent() -> Option<Self> {
        Some(Vec::default())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        T::from_value(value).map(Some)
    }

    fn absent() -> Option<Self> {
        Some(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::Int(3), Some(3))]
    #[case(Value::UInt(3), Some(3))]
    #[case(Value::Text("3".to_string()), None)]
    fn from_value_i64(#[case] value: Value, #[case] expected: Option<i64>) {
        assert_eq!(i64::from_value(&value), expected);
    }

    #[test]
    fn from_value_list() {
        let value = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(Vec::<i64>::from_value(&value), Some(vec![1, 2]));
        assert_eq!(Vec::<bool>::from_value(&value), None);
        assert_eq!(Vec::<i64>::absent(), Some(vec![]));
    }

    #[test]
    fn from_value_option() {
        assert_eq!(Option::<char>::from_value(&Value::Char('x')), Some(Some('x')));
        assert_eq!(Option::<char>::absent(), Some(None));
        assert_eq!(char::absent(), None);
    }

    #[test]
    fn from_value_string() {
        assert_eq!(String::from_value(&Value::Enum("Red".to_string())), Some("Red".to_string()));
        assert_eq!(String::from_value(&Value::Int(4)), Some("4".to_string()));
    }
}
