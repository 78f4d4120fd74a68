//! Expression tree for the sequencing DSL.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::runner::api::RuntimeAccess;
use crate::runner::ds::alias::AliasTable;
use crate::runner::ds::error::Result;
use crate::runner::ds::value::Value;

/// Result of evaluating an expression.
pub type ValueResult = Result<Value>;

/// A `do` block: statements evaluated in order.
pub type Block = Vec<Expr>;

/// One DSL expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Reference to a function or var, by (possibly aliased) name.
    Literal(FnLiteral),
    /// Call of a named function with arguments.
    Invocation(Invocation),
    /// Local bindings plus a body evaluated under them.
    Let(Let),
    /// Evaluates to nil.
    Empty,
}

/// Symbolic reference to a function or var. Holds no resolution state, so
/// the same node can be run against any number of runtimes.
#[derive(Debug, Clone)]
pub struct FnLiteral {
    name: String,
}

impl FnLiteral {
    pub fn new(name: impl Into<String>) -> Self {
        FnLiteral { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone)]
pub struct Invocation {
    pub target: FnLiteral,
    pub args: Vec<Arg>,
}

/// An invocation argument or let value.
#[derive(Debug, Clone)]
pub enum Arg {
    /// Evaluated before the call.
    Expr(Expr),
    /// Passed through untouched.
    Value(Value),
    /// A local variable's value if the name is bound, else the string itself.
    Text(String),
}

#[derive(Debug, Clone)]
pub struct LetBinding {
    pub name: String,
    pub value: Arg,
}

#[derive(Debug, Clone)]
pub struct Let {
    pub bindings: Vec<LetBinding>,
    pub body: Block,
}

/// What an evaluation runs against: the block's aliases, the runtime and
/// the literals resolved so far. Lives for one top-level evaluation.
pub struct EvalEnv<'a> {
    pub aliases: &'a AliasTable,
    pub runtime: &'a dyn RuntimeAccess,
    // keyed by node address; the block stays borrowed while the env lives
    resolved: RefCell<HashMap<*const FnLiteral, Value>>,
}

impl<'a> EvalEnv<'a> {
    pub fn new(aliases: &'a AliasTable, runtime: &'a dyn RuntimeAccess) -> Self {
        EvalEnv {
            aliases,
            runtime,
            resolved: RefCell::new(HashMap::new()),
        }
    }

    pub fn is_resolved(&self, literal: &FnLiteral) -> bool {
        self.resolved.borrow().contains_key(&(literal as *const FnLiteral))
    }

    /// Value cached for `literal` in this evaluation, or run `resolve` and
    /// cache what it returns. Failures are not cached.
    pub(crate) fn resolve_once<F>(&self, literal: &FnLiteral, resolve: F) -> Result<Value>
    where
        F: FnOnce() -> Result<Value>,
    {
        let key = literal as *const FnLiteral;
        if let Some(value) = self.resolved.borrow().get(&key) {
            return Ok(value.clone());
        }
        let value = resolve()?;
        self.resolved.borrow_mut().insert(key, value.clone());
        Ok(value)
    }
}

impl From<FnLiteral> for Expr {
    fn from(literal: FnLiteral) -> Self {
        Expr::Literal(literal)
    }
}

impl From<Invocation> for Expr {
    fn from(invocation: Invocation) -> Self {
        Expr::Invocation(invocation)
    }
}

impl From<Let> for Expr {
    fn from(l: Let) -> Self {
        Expr::Let(l)
    }
}

impl From<Expr> for Arg {
    fn from(expr: Expr) -> Self {
        Arg::Expr(expr)
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

impl From<&str> for Arg {
    fn from(text: &str) -> Self {
        Arg::Text(text.to_string())
    }
}

impl From<String> for Arg {
    fn from(text: String) -> Self {
        Arg::Text(text)
    }
}

impl From<i64> for Arg {
    fn from(i: i64) -> Self {
        Arg::Value(Value::Integer(i))
    }
}

impl From<f64> for Arg {
    fn from(n: f64) -> Self {
        Arg::Value(Value::Float(n))
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Arg::Value(Value::Boolean(b))
    }
}

impl From<char> for Arg {
    fn from(c: char) -> Self {
        Arg::Value(Value::Char(c))
    }
}

impl From<Vec<u8>> for Arg {
    fn from(bytes: Vec<u8>) -> Self {
        Arg::Value(Value::Bytes(bytes))
    }
}

impl From<FnLiteral> for Arg {
    fn from(literal: FnLiteral) -> Self {
        Arg::Expr(Expr::Literal(literal))
    }
}

impl From<Invocation> for Arg {
    fn from(invocation: Invocation) -> Self {
        Arg::Expr(Expr::Invocation(invocation))
    }
}

impl From<Let> for Arg {
    fn from(l: Let) -> Self {
        Arg::Expr(Expr::Let(l))
    }
}
