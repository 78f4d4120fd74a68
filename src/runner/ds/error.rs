//! Error type shared by every layer of the bridge.

use thiserror::Error;

use crate::runner::ds::value::ValueType;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Everything that can go wrong while resolving, binding or calling into a realm.
///
/// None of these are transient: they describe programmer or configuration
/// mistakes and are raised at the point of failure without retry.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("expecting 'namespace :as alias' but found '{declaration}': {reason}")]
    MalformedAlias { declaration: String, reason: String },

    #[error("cannot redeclare '{name}' in the same let frame")]
    DuplicateBinding { name: String },

    #[error("could not resolve '{name}'")]
    UnresolvedReference { name: String },

    #[error(
        "function {method}, argument {index} (0-based) is type {actual}; expected one of: {}",
        join_types(.expected)
    )]
    TypeConstraintViolation {
        method: String,
        index: usize,
        actual: ValueType,
        expected: Vec<ValueType>,
    },

    #[error("cannot dispatch {count} arguments; at most {max} are supported")]
    UnsupportedArity { count: usize, max: usize },

    #[error("runtime instance for module '{module}' is closed")]
    InstanceClosed { module: String },

    #[error("runtime instance is not ready (state: {state})")]
    InstanceNotReady { state: String },

    #[error("failed to initialize isolated runtime for module '{module}': {reason}")]
    IsolationInit { module: String, reason: String },

    #[error("'{name}' is a {actual} and cannot be called with arguments")]
    NotCallable { name: String, actual: ValueType },

    #[error("wrong number of arguments ({actual}) passed to {function}; expected {expected}")]
    ArityMismatch {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("namespace '{namespace}' not found")]
    NamespaceNotFound { namespace: String },

    #[error("let bindings need an even number of forms, found {count}")]
    OddBindingForms { count: usize },

    #[error("{method} returned {actual}; expected {expected}")]
    ReturnType {
        method: String,
        expected: String,
        actual: ValueType,
    },

    #[error("exception calling {function}: {message}")]
    Foreign { function: String, message: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Shorthand used by native functions to report a failure.
    pub fn foreign(function: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::Foreign {
            function: function.into(),
            message: message.into(),
        }
    }

    pub fn unresolved(name: impl Into<String>) -> Self {
        BridgeError::UnresolvedReference { name: name.into() }
    }
}

fn join_types(types: &[ValueType]) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
