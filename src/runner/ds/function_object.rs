//! Foreign function objects.
//!
//! A realm function is called through a family of fixed-arity entry points
//! ([`ForeignFn::invoke`], one per argument count) or through the boxed
//! generic path [`ForeignFn::apply`]. Both end up in the same body and
//! perform the same arity check, so they are observably identical.

use std::fmt;
use std::sync::Arc;

use crate::runner::ds::error::{BridgeError, Result};
use crate::runner::ds::value::Value;

/// Function signature for compiled-in realm functions.
pub type NativeFn = fn(args: &[Value]) -> Result<Value>;

/// Boxed closure body, used when a function needs captured state.
pub type ClosureFn = dyn Fn(&[Value]) -> Result<Value> + Send + Sync;

/// Argument counts a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn any() -> Self {
        Arity::AtLeast(0)
    }

    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "{} or more", n),
        }
    }
}

enum FnBody {
    /// Direct function pointer.
    Native(NativeFn),
    /// Closure with captured state, one vtable hop.
    Closure(Box<ClosureFn>),
}

struct FnInner {
    name: String,
    arity: Arity,
    body: FnBody,
}

/// A callable living in a realm namespace. Cheap to clone.
#[derive(Clone)]
pub struct ForeignFn(Arc<FnInner>);

impl ForeignFn {
    pub fn native(name: impl Into<String>, arity: Arity, f: NativeFn) -> Self {
        ForeignFn(Arc::new(FnInner {
            name: name.into(),
            arity,
            body: FnBody::Native(f),
        }))
    }

    pub fn closure<F>(name: impl Into<String>, arity: Arity, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        ForeignFn(Arc::new(FnInner {
            name: name.into(),
            arity,
            body: FnBody::Closure(Box::new(f)),
        }))
    }

    /// Fully-qualified name, e.g. `text/replace`.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn arity(&self) -> Arity {
        self.0.arity
    }

    /// Fixed-arity entry point: the argument count is part of the call site.
    pub fn invoke<const N: usize>(&self, args: [Value; N]) -> Result<Value> {
        self.check_arity(N)?;
        self.run(&args)
    }

    /// Generic entry point taking a boxed argument list.
    pub fn apply(&self, args: Vec<Value>) -> Result<Value> {
        self.check_arity(args.len())?;
        self.run(&args)
    }

    /// Identity comparison: two handles to the same function object.
    pub fn same_fn(&self, other: &ForeignFn) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn check_arity(&self, count: usize) -> Result<()> {
        if self.0.arity.accepts(count) {
            Ok(())
        } else {
            Err(BridgeError::ArityMismatch {
                function: self.0.name.clone(),
                expected: self.0.arity.to_string(),
                actual: count,
            })
        }
    }

    fn run(&self, args: &[Value]) -> Result<Value> {
        match &self.0.body {
            FnBody::Native(f) => f(args),
            FnBody::Closure(f) => f(args),
        }
    }
}

impl fmt::Debug for ForeignFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ForeignFn({}, arity {})", self.0.name, self.0.arity)
    }
}
