use std::any::Any;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::runner::ds::function_object::ForeignFn;

/// A value crossing the bridge, in either direction.
#[derive(Clone)]
pub enum Value {
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Char(char),
    String(String),
    Bytes(Vec<u8>),
    Keyword(String),
    Symbol(String),
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Function(ForeignFn),
    Opaque(OpaqueValue),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn symbol(s: impl Into<String>) -> Self {
        Value::Symbol(s.into())
    }

    pub fn opaque<T: Any + Send + Sync>(type_name: impl Into<String>, value: T) -> Self {
        Value::Opaque(OpaqueValue::new(type_name, value))
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Nil => ValueType::Nil,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Integer(_) => ValueType::Integer,
            Value::Float(_) => ValueType::Float,
            Value::Char(_) => ValueType::Char,
            Value::String(_) => ValueType::String,
            Value::Bytes(_) => ValueType::Bytes,
            Value::Keyword(_) => ValueType::Keyword,
            Value::Symbol(_) => ValueType::Symbol,
            Value::List(_) => ValueType::List,
            Value::Map(_) => ValueType::Map,
            Value::Function(_) => ValueType::Function,
            Value::Opaque(o) => ValueType::Opaque(o.type_name().to_string()),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_function(&self) -> Option<&ForeignFn> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Symbol(s) | Value::Keyword(s) => Some(s),
            _ => None,
        }
    }

    /// Text form used by `core/str`: nil is empty and strings are unquoted.
    pub fn to_text(&self) -> String {
        match self {
            Value::Nil => String::new(),
            Value::String(s) => s.clone(),
            Value::Char(c) => c.to_string(),
            other => other.to_string(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{}", n),
            Value::Char(c) => write!(f, "\\{}", c),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Bytes(b) => write!(f, "#bytes[{}]", b.len()),
            Value::Keyword(k) => write!(f, ":{}", k),
            Value::Symbol(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Function(func) => write!(f, "#fn[{}]", func.name()),
            Value::Opaque(o) => write!(f, "#object[{}]", o.type_name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Value::Nil"),
            Value::Boolean(b) => write!(f, "Value::Boolean({})", b),
            Value::Integer(i) => write!(f, "Value::Integer({})", i),
            Value::Float(n) => write!(f, "Value::Float({})", n),
            Value::Char(c) => write!(f, "Value::Char({:?})", c),
            Value::String(s) => write!(f, "Value::String({:?})", s),
            Value::Bytes(b) => write!(f, "Value::Bytes({:?})", b),
            Value::Keyword(k) => write!(f, "Value::Keyword({:?})", k),
            Value::Symbol(s) => write!(f, "Value::Symbol({:?})", s),
            Value::List(l) => write!(f, "Value::List({:?})", l),
            Value::Map(m) => write!(f, "Value::Map({:?})", m),
            Value::Function(func) => write!(f, "Value::Function({})", func.name()),
            Value::Opaque(o) => write!(f, "Value::Opaque({})", o.type_name()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Keyword(a), Value::Keyword(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.same_fn(b),
            (Value::Opaque(a), Value::Opaque(b)) => Arc::ptr_eq(&a.inner, &b.inner),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<ForeignFn> for Value {
    fn from(f: ForeignFn) -> Self {
        Value::Function(f)
    }
}

/// A host object passed through the realm untouched (sinks, handles, ...).
#[derive(Clone)]
pub struct OpaqueValue {
    type_name: Arc<str>,
    inner: Arc<dyn Any + Send + Sync>,
}

impl OpaqueValue {
    pub fn new<T: Any + Send + Sync>(type_name: impl Into<String>, value: T) -> Self {
        OpaqueValue {
            type_name: Arc::from(type_name.into()),
            inner: Arc::new(value),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

/// Runtime type of a [`Value`], plus the abstract types a constraint set may name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Nil,
    Boolean,
    Integer,
    Float,
    /// Either an integer or a float.
    Number,
    Char,
    String,
    Bytes,
    Keyword,
    Symbol,
    List,
    Map,
    Function,
    Opaque(String),
    Any,
}

impl ValueType {
    /// Is a value of this runtime type assignable to `self`?
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueType::Any, _) => true,
            (ValueType::Number, Value::Integer(_)) | (ValueType::Number, Value::Float(_)) => true,
            (ValueType::Opaque(expected), Value::Opaque(o)) => expected == o.type_name(),
            (expected, v) => *expected == v.value_type(),
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Nil => write!(f, "nil"),
            ValueType::Boolean => write!(f, "boolean"),
            ValueType::Integer => write!(f, "integer"),
            ValueType::Float => write!(f, "float"),
            ValueType::Number => write!(f, "number"),
            ValueType::Char => write!(f, "char"),
            ValueType::String => write!(f, "string"),
            ValueType::Bytes => write!(f, "bytes"),
            ValueType::Keyword => write!(f, "keyword"),
            ValueType::Symbol => write!(f, "symbol"),
            ValueType::List => write!(f, "list"),
            ValueType::Map => write!(f, "map"),
            ValueType::Function => write!(f, "function"),
            ValueType::Opaque(name) => write!(f, "{}", name),
            ValueType::Any => write!(f, "any"),
        }
    }
}
