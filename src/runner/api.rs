//! Host-facing entry points: the [`RuntimeAccess`] seam every layer talks
//! to, and [`Bridge`], which ties a runtime to alias declarations, the
//! evaluator and typed bindings.

use std::sync::Arc;

use tracing::debug;

use crate::parser::parse_program;
use crate::runner::binding::{ForeignInterface, InterfaceDef, Proxy};
use crate::runner::ds::alias::AliasTable;
use crate::runner::ds::error::Result;
use crate::runner::ds::realm::{Realm, DEFAULT_NAMESPACE};
use crate::runner::ds::symbol::Symbol;
use crate::runner::ds::value::Value;
use crate::runner::eval::expression::evaluate_block;
use crate::runner::eval::types::{Arg, Block, Expr, FnLiteral, Invocation, Let, LetBinding};
use crate::runner::isolation::RuntimeHandle;
use crate::runner::plugin::config::BridgeConfig;

/// What the evaluator and proxies need from a runtime.
pub trait RuntimeAccess: Send + Sync {
    /// Resolve a var, loading its namespace if needed.
    fn var(&self, symbol: &Symbol) -> Result<Value>;

    fn invoke(&self, callee: &Value, args: Vec<Value>) -> Result<Value>;

    /// Load a package by path, e.g. `"text"` or `"my/lib"`.
    fn load(&self, path: &str) -> Result<()>;

    /// Namespace for unqualified names.
    fn default_namespace(&self) -> &str {
        DEFAULT_NAMESPACE
    }

    /// Run `body` as one unit of work against this runtime.
    fn run_scoped(&self, body: &mut dyn FnMut() -> Result<Value>) -> Result<Value> {
        body()
    }
}

lazy_static! {
    static ref GLOBAL_BRIDGE: Bridge = Bridge::shared(Realm::with_name("global"));
}

/// A runtime plus the alias declarations applied to every block run on it.
#[derive(Clone)]
pub struct Bridge {
    runtime: Arc<dyn RuntimeAccess>,
    requires: Vec<String>,
}

impl Bridge {
    pub fn new(runtime: Arc<dyn RuntimeAccess>) -> Self {
        Bridge {
            runtime,
            requires: Vec::new(),
        }
    }

    /// Bridge over a realm shared with anything else holding it.
    pub fn shared(realm: Arc<Realm>) -> Self {
        Bridge::new(realm)
    }

    /// Bridge whose every block runs inside one call bracket of `handle`.
    pub fn isolated(handle: Arc<RuntimeHandle>) -> Self {
        Bridge::new(handle)
    }

    /// Process-wide bridge over a lazily created realm.
    pub fn global() -> &'static Bridge {
        &GLOBAL_BRIDGE
    }

    /// Fresh realm with the config's default namespace and preloads applied.
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        let realm = Realm::with_default_namespace("config", &config.default_namespace);
        for path in &config.preload {
            debug!(path = %path, "preloading");
            realm.load(path)?;
        }
        // reject bad declarations here rather than on first use
        AliasTable::parse(&config.requires)?;
        Ok(Bridge::shared(realm).with_requires(config.requires.clone()))
    }

    /// Alias declarations prepended to those of every block.
    pub fn with_requires(mut self, requires: Vec<String>) -> Self {
        self.requires = requires;
        self
    }

    pub fn requires(&self) -> &[String] {
        &self.requires
    }

    pub fn runtime(&self) -> &Arc<dyn RuntimeAccess> {
        &self.runtime
    }

    /// Evaluate `block` under `aliases`, returning the last value.
    pub fn do_all<S: AsRef<str>>(&self, aliases: &[S], block: &[Expr]) -> Result<Value> {
        let declarations: Vec<&str> = self
            .requires
            .iter()
            .map(String::as_str)
            .chain(aliases.iter().map(AsRef::as_ref))
            .collect();
        let table = AliasTable::parse(declarations)?;
        self.do_with(&table, block)
    }

    /// Evaluate `block` with no aliases beyond the bridge's own.
    pub fn do_block(&self, block: &[Expr]) -> Result<Value> {
        self.do_all::<&str>(&[], block)
    }

    pub fn do_with(&self, aliases: &AliasTable, block: &[Expr]) -> Result<Value> {
        let runtime = self.runtime.as_ref();
        runtime.run_scoped(&mut || evaluate_block(block, aliases, runtime))
    }

    /// Parse and run a script.
    pub fn run_script(&self, source: &str) -> Result<Value> {
        let program = parse_program(source)?;
        self.do_all(&program.requires, &program.body)
    }

    /// Bind a host interface to this bridge's runtime.
    pub fn define<T: ForeignInterface>(&self, preload: &[&str]) -> Result<T> {
        Ok(T::bind(self.proxy(T::interface(), preload)?))
    }

    pub fn proxy(&self, def: InterfaceDef, preload: &[&str]) -> Result<Proxy> {
        debug!(interface = %def.name, "defining proxy");
        Proxy::new(
            Arc::new(def),
            self.runtime.clone(),
            preload.iter().map(|p| p.to_string()).collect(),
        )
    }

    /// Value of a var by qualified name.
    pub fn var(&self, name: &str) -> Result<Value> {
        self.runtime.var(&Symbol::parse(name))
    }

    /// Call a function by qualified name. A var that is not a function is
    /// returned as-is when no arguments are given.
    pub fn invoke(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        let symbol = Symbol::parse(name);
        let runtime = self.runtime.as_ref();
        let mut args = Some(args);
        runtime.run_scoped(&mut || {
            let callee = runtime.var(&symbol)?;
            runtime.invoke(&callee, args.take().unwrap_or_default())
        })
    }

    /// Call a function value obtained earlier.
    pub fn invoke_fn(&self, callee: &Value, args: Vec<Value>) -> Result<Value> {
        self.runtime.invoke(callee, args)
    }

    pub fn load(&self, path: &str) -> Result<()> {
        self.runtime.load(path)
    }
}

/// Reference to a function or var by (possibly aliased) name.
pub fn literal(name: &str) -> Expr {
    Expr::Literal(FnLiteral::new(name))
}

/// Invocation of `target` with `args`.
pub fn call(target: &str, args: Vec<Arg>) -> Expr {
    Expr::Invocation(Invocation {
        target: FnLiteral::new(target),
        args,
    })
}

pub fn let_block(bindings: Vec<LetBinding>, body: Block) -> Expr {
    Expr::Let(Let { bindings, body })
}

pub fn binding(name: &str, value: impl Into<Arg>) -> LetBinding {
    LetBinding {
        name: name.to_string(),
        value: value.into(),
    }
}

/// Let bindings from `(name, value)` pairs of a single value type.
pub fn vars<N, A, I>(pairs: I) -> Vec<LetBinding>
where
    N: Into<String>,
    A: Into<Arg>,
    I: IntoIterator<Item = (N, A)>,
{
    pairs
        .into_iter()
        .map(|(name, value)| LetBinding {
            name: name.into(),
            value: value.into(),
        })
        .collect()
}

/// `call!("s/replace", x, "see", "C")` builds an invocation, converting
/// each argument with `Arg::from`.
#[macro_export]
macro_rules! call {
    ($target:expr $(, $arg:expr)* $(,)?) => {
        $crate::runner::api::call(
            $target,
            vec![$($crate::runner::eval::types::Arg::from($arg)),*],
        )
    };
}

/// `vars!("x" => "I C", "y" => call!(...))` builds let bindings of mixed
/// value types.
#[macro_export]
macro_rules! vars {
    ($($name:expr => $value:expr),* $(,)?) => {
        vec![$($crate::runner::api::binding($name, $value)),*]
    };
}
