use std::any::Any;
use std::sync::Arc;

/// The underlying (element) type of an argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// `true` or `false` (case-insensitive).
    Bool,
    /// A signed 64-bit integer.
    Int,
    /// An unsigned 64-bit integer.
    UInt,
    /// A 64-bit floating point number.
    Float,
    /// A single character.
    Char,
    /// Any text.
    Text,
    /// One of the declared member names (case-sensitive).
    Enum {
        /// The display name of the enumeration.
        name: String,
        /// The declared member names.
        members: Vec<String>,
    },
    /// A type converted by the [`ConverterRegistry`](crate::ConverterRegistry) entry registered under this tag.
    Custom(String),
}

impl ScalarType {
    /// The name used for this type in error messages.
    pub fn display_name(&self) -> &str {
        match self {
            ScalarType::Bool => "Boolean",
            ScalarType::Int => "Integer",
            ScalarType::UInt => "Unsigned Integer",
            ScalarType::Float => "Decimal",
            ScalarType::Char => "Character",
            ScalarType::Text => "Text",
            ScalarType::Enum { name, .. } => name,
            ScalarType::Custom(tag) => tag,
        }
    }
}

/// Whether a value is required, may be absent, or is a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Exactly one value.
    Scalar,
    /// Zero or one value.
    Nullable,
    /// Any number of values.
    Collection,
}

/// The declared type of an argument: a [`ScalarType`] in a [`Shape`].
///
/// ### Example
/// ```
/// # use arbor_engine as arbor;
/// use arbor::{ScalarType, Shape, ValueType};
///
/// let ports = ValueType::uint().collection();
/// assert_eq!(ports.scalar(), &ScalarType::UInt);
/// assert_eq!(ports.shape(), Shape::Collection);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValueType {
    scalar: ScalarType,
    shape: Shape,
}

impl ValueType {
    /// A scalar value type.
    pub fn new(scalar: ScalarType) -> Self {
        Self {
            scalar,
            shape: Shape::Scalar,
        }
    }

    /// Boolean scalar.
    pub fn bool() -> Self {
        Self::new(ScalarType::Bool)
    }

    /// Signed integer scalar.
    pub fn int() -> Self {
        Self::new(ScalarType::Int)
    }

    /// Unsigned integer scalar.
    pub fn uint() -> Self {
        Self::new(ScalarType::UInt)
    }

    /// Floating point scalar.
    pub fn float() -> Self {
        Self::new(ScalarType::Float)
    }

    /// Character scalar.
    pub fn char() -> Self {
        Self::new(ScalarType::Char)
    }

    /// Text scalar.
    pub fn text() -> Self {
        Self::new(ScalarType::Text)
    }

    /// Enumeration scalar, accepting exactly the given member names.
    pub fn enumeration<S: Into<String>>(
        name: impl Into<String>,
        members: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(ScalarType::Enum {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        })
    }

    /// Custom scalar, converted by the registry entry for `tag`.
    pub fn custom(tag: impl Into<String>) -> Self {
        Self::new(ScalarType::Custom(tag.into()))
    }

    /// Make this type nullable (zero or one value).
    pub fn nullable(mut self) -> Self {
        self.shape = Shape::Nullable;
        self
    }

    /// Make this type a collection (any number of values).
    pub fn collection(mut self) -> Self {
        self.shape = Shape::Collection;
        self
    }

    /// The element type.
    pub fn scalar(&self) -> &ScalarType {
        &self.scalar
    }

    /// The shape.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Whether this is a collection type.
    pub fn is_collection(&self) -> bool {
        self.shape == Shape::Collection
    }

    /// Whether this is a boolean scalar/nullable (not a collection of booleans).
    pub fn is_bool(&self) -> bool {
        self.scalar == ScalarType::Bool && !self.is_collection()
    }

    /// The name used for this type in error messages.
    pub fn display_name(&self) -> String {
        match self.shape {
            Shape::Collection => format!("{}[]", self.scalar.display_name()),
            _ => self.scalar.display_name().to_string(),
        }
    }
}

/// A bound, type-converted value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// From [`ScalarType::Bool`].
    Bool(bool),
    /// From [`ScalarType::Int`].
    Int(i64),
    /// From [`ScalarType::UInt`].
    UInt(u64),
    /// From [`ScalarType::Float`].
    Float(f64),
    /// From [`ScalarType::Char`].
    Char(char),
    /// From [`ScalarType::Text`].
    Text(String),
    /// From [`ScalarType::Enum`]: the matched member name.
    Enum(String),
    /// From [`ScalarType::Custom`].
    Custom(CustomValue),
    /// From any collection type.
    List(Vec<Value>),
}

impl Value {
    /// Borrow the custom value as `T`, if it is one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Custom(custom) => custom.inner.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// The number of elements this value contributes (lists count their elements).
    pub fn len(&self) -> usize {
        match self {
            Value::List(values) => values.len(),
            _ => 1,
        }
    }

    /// Whether this is an empty list.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::UInt(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Char(value) => write!(f, "{value}"),
            Value::Text(value) => write!(f, "{value}"),
            Value::Enum(value) => write!(f, "{value}"),
            Value::Custom(value) => write!(f, "{}", value.display),
            Value::List(values) => {
                let items: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

/// A value produced by a custom converter.
///
/// Two custom values are equal when their type tags and displays are equal.
#[derive(Clone)]
pub struct CustomValue {
    tag: String,
    display: String,
    inner: Arc<dyn Any + Send + Sync>,
}

impl CustomValue {
    /// Wrap a converted value, remembering its display form.
    pub fn new<T: std::fmt::Display + Any + Send + Sync>(tag: impl Into<String>, value: T) -> Self {
        Self {
            tag: tag.into(),
            display: value.to_string(),
            inner: Arc::new(value),
        }
    }

    /// The type tag this value was converted under.
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.display == other.display
    }
}

impl std::fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Custom[{}: {}]", self.tag, self.display)
    }
}
