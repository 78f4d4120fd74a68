use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::runner::api::RuntimeAccess;
use crate::runner::ds::alias::AliasTable;
use crate::runner::ds::error::{BridgeError, Result};
use crate::runner::ds::symbol::Symbol;
use crate::runner::ds::value::{Value, ValueType};

use super::interface::{InterfaceDef, MethodDef};

/// A method resolved to its foreign function, with the parameter
/// constraints checked on every call.
#[derive(Debug)]
pub struct BoundMethod {
    pub method: String,
    /// Fully-qualified name the method resolved to.
    pub qualified: String,
    pub target: Value,
    pub constraints: Vec<Vec<ValueType>>,
}

/// Dispatch table behind a [`ForeignInterface`](super::ForeignInterface) implementation.
pub struct Proxy {
    def: Arc<InterfaceDef>,
    aliases: AliasTable,
    runtime: Arc<dyn RuntimeAccess>,
    preload: Vec<String>,
    preloaded: OnceCell<()>,
    methods: RwLock<HashMap<String, Arc<BoundMethod>>>,
}

impl Proxy {
    /// Fails with `MalformedAlias` if the interface's alias declarations are bad.
    pub fn new(def: Arc<InterfaceDef>, runtime: Arc<dyn RuntimeAccess>, preload: Vec<String>) -> Result<Self> {
        let aliases = AliasTable::parse(&def.requires)?;
        Ok(Proxy {
            def,
            aliases,
            runtime,
            preload,
            preloaded: OnceCell::new(),
            methods: RwLock::new(HashMap::new()),
        })
    }

    pub fn interface(&self) -> &InterfaceDef {
        &self.def
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Whether `method` has been resolved and cached.
    pub fn is_bound(&self, method: &str) -> bool {
        self.methods.read().contains_key(method)
    }

    /// Call a method of the interface.
    pub fn call(&self, method: &str, args: Vec<Value>) -> Result<Value> {
        self.preloaded.get_or_try_init(|| self.run_preload())?;

        let def = self.def.get_method(method).ok_or_else(|| {
            BridgeError::unresolved(format!("{}.{}", self.def.name, method))
        })?;
        let bound = self.bound_method(def)?;

        if args.len() != bound.constraints.len() {
            return Err(BridgeError::ArityMismatch {
                function: bound.qualified.clone(),
                expected: bound.constraints.len().to_string(),
                actual: args.len(),
            });
        }
        validate_args(&bound, &args)?;

        trace!(method, target = %bound.qualified, argc = args.len(), "proxy call");
        self.runtime.invoke(&bound.target, args)
    }

    /// Call a method and convert its result.
    pub fn call_as<R: FromValue>(&self, method: &str, args: Vec<Value>) -> Result<R> {
        let value = self.call(method, args)?;
        R::from_value(value).map_err(|actual| BridgeError::ReturnType {
            method: method.to_string(),
            expected: R::expected().to_string(),
            actual: actual.value_type(),
        })
    }

    fn run_preload(&self) -> Result<()> {
        for path in &self.preload {
            debug!(interface = %self.def.name, path = %path, "preload");
            self.runtime.load(path)?;
        }
        Ok(())
    }

    fn bound_method(&self, def: &MethodDef) -> Result<Arc<BoundMethod>> {
        if let Some(bound) = self.methods.read().get(&def.name) {
            return Ok(bound.clone());
        }

        let namespace = match &def.namespace {
            Some(alias) => self.aliases.lookup(alias).ok_or_else(|| {
                BridgeError::unresolved(format!("{} is not aliased to any namespace", alias))
            })?,
            None => self.runtime.default_namespace(),
        };
        let symbol = Symbol::qualified(namespace, def.name.as_str());
        let target = self.runtime.var(&symbol)?;
        debug!(interface = %self.def.name, method = %def.name, target = %symbol, "method bound");

        let bound = Arc::new(BoundMethod {
            method: def.name.clone(),
            qualified: symbol.to_string(),
            target,
            constraints: def.params.iter().map(|p| p.accepts.clone()).collect(),
        });
        Ok(self
            .methods
            .write()
            .entry(def.name.clone())
            .or_insert(bound)
            .clone())
    }
}

fn validate_args(bound: &BoundMethod, args: &[Value]) -> Result<()> {
    for (index, (arg, accepts)) in args.iter().zip(&bound.constraints).enumerate() {
        if !accepts.is_empty() && !accepts.iter().any(|t| t.accepts(arg)) {
            return Err(BridgeError::TypeConstraintViolation {
                method: bound.method.clone(),
                index,
                actual: arg.value_type(),
                expected: accepts.clone(),
            });
        }
    }
    Ok(())
}

/// Conversion of a call result into a host type.
pub trait FromValue: Sized {
    /// On mismatch, hands the value back.
    fn from_value(value: Value) -> std::result::Result<Self, Value>;

    /// Name of the expected type, for error messages.
    fn expected() -> &'static str;
}

impl FromValue for Value {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        Ok(value)
    }

    fn expected() -> &'static str {
        "any"
    }
}

impl FromValue for () {
    fn from_value(_value: Value) -> std::result::Result<Self, Value> {
        Ok(())
    }

    fn expected() -> &'static str {
        "nothing"
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(other),
        }
    }

    fn expected() -> &'static str {
        "string"
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Integer(i) => Ok(i),
            other => Err(other),
        }
    }

    fn expected() -> &'static str {
        "integer"
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Float(n) => Ok(n),
            Value::Integer(i) => Ok(i as f64),
            other => Err(other),
        }
    }

    fn expected() -> &'static str {
        "number"
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Boolean(b) => Ok(b),
            other => Err(other),
        }
    }

    fn expected() -> &'static str {
        "boolean"
    }
}

impl FromValue for Vec<Value> {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::List(items) => Ok(items),
            Value::Nil => Ok(Vec::new()),
            other => Err(other),
        }
    }

    fn expected() -> &'static str {
        "list"
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Bytes(b) => Ok(b),
            other => Err(other),
        }
    }

    fn expected() -> &'static str {
        "bytes"
    }
}

impl FromValue for Vec<(Value, Value)> {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Map(entries) => Ok(entries),
            Value::Nil => Ok(Vec::new()),
            other => Err(other),
        }
    }

    fn expected() -> &'static str {
        "map"
    }
}

/// Maps keyed by strings, keywords or symbols. Any other key rejects the map.
impl FromValue for HashMap<String, Value> {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Map(entries) if entries.iter().all(|(k, _)| k.as_str().is_some()) => Ok(entries
                .into_iter()
                .filter_map(|(k, v)| k.as_str().map(|name| (name.to_string(), v)))
                .collect()),
            Value::Nil => Ok(HashMap::new()),
            other => Err(other),
        }
    }

    fn expected() -> &'static str {
        "map with named keys"
    }
}
