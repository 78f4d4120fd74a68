//! Expression evaluation.
//!
//! Names are looked up in the local scope first and only then resolved in
//! the runtime through the block's alias table. Arguments are evaluated left
//! to right before the call; let values see only the enclosing scope.

use std::collections::HashSet;

use tracing::trace;

use crate::runner::api::RuntimeAccess;
use crate::runner::ds::alias::AliasTable;
use crate::runner::ds::error::{BridgeError, Result};
use crate::runner::ds::scope::{ScopeFrame, ScopeStack};
use crate::runner::ds::symbol::Symbol;
use crate::runner::ds::value::Value;

use super::types::{Arg, EvalEnv, Expr, FnLiteral, Invocation, Let, ValueResult};

/// Evaluate a `do` block against a fresh scope. Empty blocks are nil.
pub fn evaluate_block(block: &[Expr], aliases: &AliasTable, runtime: &dyn RuntimeAccess) -> ValueResult {
    let env = EvalEnv::new(aliases, runtime);
    let mut scope = ScopeStack::new();
    evaluate_sequence(block, &env, &mut scope)
}

/// Evaluate expressions in order, returning the last value.
pub fn evaluate_sequence(exprs: &[Expr], env: &EvalEnv<'_>, scope: &mut ScopeStack) -> ValueResult {
    let mut result = Value::Nil;
    for expr in exprs {
        result = evaluate_expression(expr, env, scope)?;
    }
    Ok(result)
}

/// Evaluate an expression and return its value.
pub fn evaluate_expression(expr: &Expr, env: &EvalEnv<'_>, scope: &mut ScopeStack) -> ValueResult {
    match expr {
        Expr::Literal(literal) => evaluate_literal(literal, env, scope),
        Expr::Invocation(invocation) => evaluate_invocation(invocation, env, scope),
        Expr::Let(l) => evaluate_let(l, env, scope),
        Expr::Empty => Ok(Value::Nil),
    }
}

/// Local variable if bound, otherwise the runtime var behind the name.
pub fn evaluate_literal(literal: &FnLiteral, env: &EvalEnv<'_>, scope: &ScopeStack) -> ValueResult {
    if let Some(local) = scope.lookup(literal.name()) {
        return Ok(local.clone());
    }
    env.resolve_once(literal, || resolve_symbol(literal.name(), env))
}

/// Map the alias prefix through the alias table and ask the runtime.
fn resolve_symbol(name: &str, env: &EvalEnv<'_>) -> ValueResult {
    let symbol = Symbol::parse(name);
    let qualified = match symbol.namespace() {
        Some(alias) => {
            let namespace = env
                .aliases
                .lookup(alias)
                .ok_or_else(|| BridgeError::unresolved(name))?;
            Symbol::qualified(namespace, symbol.name())
        }
        None => symbol.with_default_namespace(env.runtime.default_namespace()),
    };
    trace!(name, resolved = %qualified, "resolve literal");
    env.runtime.var(&qualified).map_err(|e| match e {
        BridgeError::UnresolvedReference { .. } => BridgeError::unresolved(name),
        other => other,
    })
}

fn evaluate_arg(arg: &Arg, env: &EvalEnv<'_>, scope: &mut ScopeStack) -> ValueResult {
    match arg {
        Arg::Expr(expr) => evaluate_expression(expr, env, scope),
        Arg::Value(value) => Ok(value.clone()),
        Arg::Text(text) => Ok(scope
            .lookup(text)
            .cloned()
            .unwrap_or_else(|| Value::String(text.clone()))),
    }
}

pub fn evaluate_invocation(invocation: &Invocation, env: &EvalEnv<'_>, scope: &mut ScopeStack) -> ValueResult {
    let mut args = Vec::with_capacity(invocation.args.len());
    for arg in &invocation.args {
        args.push(evaluate_arg(arg, env, scope)?);
    }
    let callee = evaluate_literal(&invocation.target, env, scope)?;
    env.runtime.invoke(&callee, args).map_err(|e| match e {
        BridgeError::NotCallable { actual, .. } => BridgeError::NotCallable {
            name: invocation.target.name().to_string(),
            actual,
        },
        other => other,
    })
}

pub fn evaluate_let(l: &Let, env: &EvalEnv<'_>, scope: &mut ScopeStack) -> ValueResult {
    let mut seen = HashSet::new();
    for binding in &l.bindings {
        if !seen.insert(binding.name.as_str()) {
            return Err(BridgeError::DuplicateBinding {
                name: binding.name.clone(),
            });
        }
    }

    let mut frame = ScopeFrame::new();
    for binding in &l.bindings {
        let value = match &binding.value {
            Arg::Text(text) => Value::String(text.clone()),
            other => evaluate_arg(other, env, scope)?,
        };
        frame.declare(binding.name.as_str(), value)?;
    }

    let mut inner = scope.enter(frame);
    evaluate_sequence(&l.body, env, &mut inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::function_object::{Arity, ForeignFn};
    use crate::runner::eval::dispatch::invoke_value;
    use crate::runner::eval::types::LetBinding;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn concat(args: &[Value]) -> Result<Value> {
        Ok(Value::String(args.iter().map(Value::to_text).collect()))
    }

    /// Runtime with a fixed set of vars that counts lookups.
    struct FakeRuntime {
        vars: HashMap<String, Value>,
        lookups: AtomicUsize,
    }

    impl FakeRuntime {
        fn new() -> Self {
            let mut vars = HashMap::new();
            vars.insert(
                "core/str".to_string(),
                Value::Function(ForeignFn::native("core/str", Arity::any(), concat)),
            );
            vars.insert("core/answer".to_string(), Value::Integer(42));
            FakeRuntime {
                vars,
                lookups: AtomicUsize::new(0),
            }
        }
    }

    impl RuntimeAccess for FakeRuntime {
        fn var(&self, symbol: &Symbol) -> Result<Value> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.vars
                .get(&symbol.to_string())
                .cloned()
                .ok_or_else(|| BridgeError::unresolved(symbol.to_string()))
        }

        fn invoke(&self, callee: &Value, args: Vec<Value>) -> Result<Value> {
            invoke_value(callee, args)
        }

        fn load(&self, _path: &str) -> Result<()> {
            Ok(())
        }
    }

    fn call(name: &str, args: Vec<Arg>) -> Expr {
        Expr::Invocation(Invocation {
            target: FnLiteral::new(name),
            args,
        })
    }

    fn binding(name: &str, value: Arg) -> LetBinding {
        LetBinding {
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn test_empty_block_is_nil() {
        let rt = FakeRuntime::new();
        assert_eq!(evaluate_block(&[], &AliasTable::new(), &rt).unwrap(), Value::Nil);
        assert_eq!(
            evaluate_block(&[Expr::Empty], &AliasTable::new(), &rt).unwrap(),
            Value::Nil
        );
    }

    #[test]
    fn test_literal_is_memoized() {
        let rt = FakeRuntime::new();
        let env_aliases = AliasTable::new();
        let env = EvalEnv::new(&env_aliases, &rt);
        let literal = FnLiteral::new("answer");
        let scope = ScopeStack::new();
        assert!(!env.is_resolved(&literal));
        assert_eq!(evaluate_literal(&literal, &env, &scope).unwrap(), Value::Integer(42));
        assert_eq!(evaluate_literal(&literal, &env, &scope).unwrap(), Value::Integer(42));
        assert!(env.is_resolved(&literal));
        assert_eq!(rt.lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_each_block_evaluation_resolves_again() {
        let rt = FakeRuntime::new();
        let block = vec![Expr::Literal(FnLiteral::new("answer"))];
        evaluate_block(&block, &AliasTable::new(), &rt).unwrap();
        evaluate_block(&block, &AliasTable::new(), &rt).unwrap();
        assert_eq!(rt.lookups.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_resolution_is_not_cached() {
        let rt = FakeRuntime::new();
        let aliases = AliasTable::new();
        let env = EvalEnv::new(&aliases, &rt);
        let literal = FnLiteral::new("missing");
        let scope = ScopeStack::new();
        assert!(evaluate_literal(&literal, &env, &scope).is_err());
        assert!(!env.is_resolved(&literal));
    }

    #[test]
    fn test_scope_wins_over_runtime() {
        let rt = FakeRuntime::new();
        let block = vec![Expr::Let(Let {
            bindings: vec![binding("answer", Arg::Value(Value::Integer(7)))],
            body: vec![Expr::Literal(FnLiteral::new("answer"))],
        })];
        assert_eq!(evaluate_block(&block, &AliasTable::new(), &rt).unwrap(), Value::Integer(7));
        assert_eq!(rt.lookups.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_text_arg_prefers_bound_variable() {
        let rt = FakeRuntime::new();
        let block = vec![Expr::Let(Let {
            bindings: vec![binding("x", Arg::Text("A".to_string()))],
            body: vec![call("str", vec![Arg::from("x"), Arg::from("-"), Arg::from("y")])],
        })];
        assert_eq!(
            evaluate_block(&block, &AliasTable::new(), &rt).unwrap(),
            Value::string("A-y")
        );
    }

    #[test]
    fn test_duplicate_let_names_evaluate_nothing() {
        let rt = FakeRuntime::new();
        let block = vec![Expr::Let(Let {
            bindings: vec![
                binding("x", Arg::Expr(call("str", vec![]))),
                binding("x", Arg::Expr(call("str", vec![]))),
            ],
            body: vec![],
        })];
        match evaluate_block(&block, &AliasTable::new(), &rt) {
            Err(BridgeError::DuplicateBinding { name }) => assert_eq!(name, "x"),
            other => panic!("expected DuplicateBinding, got {:?}", other),
        }
        assert_eq!(rt.lookups.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_let_values_see_enclosing_scope_only() {
        let rt = FakeRuntime::new();
        let block = vec![Expr::Let(Let {
            bindings: vec![binding("x", Arg::Value(Value::string("outer")))],
            body: vec![Expr::Let(Let {
                bindings: vec![
                    binding("x", Arg::Value(Value::string("inner"))),
                    binding("y", Arg::Expr(call("str", vec![Arg::from("x")]))),
                ],
                body: vec![Expr::Literal(FnLiteral::new("y"))],
            })],
        })];
        assert_eq!(
            evaluate_block(&block, &AliasTable::new(), &rt).unwrap(),
            Value::string("outer")
        );
    }

    #[test]
    fn test_unknown_alias_is_unresolved() {
        let rt = FakeRuntime::new();
        let block = vec![call("nope/str", vec![])];
        match evaluate_block(&block, &AliasTable::new(), &rt) {
            Err(BridgeError::UnresolvedReference { name }) => assert_eq!(name, "nope/str"),
            other => panic!("expected UnresolvedReference, got {:?}", other),
        }
    }

    #[test]
    fn test_scope_is_empty_after_failed_let() {
        let rt = FakeRuntime::new();
        let aliases = AliasTable::new();
        let env = EvalEnv::new(&aliases, &rt);
        let mut scope = ScopeStack::new();
        let failing = Expr::Let(Let {
            bindings: vec![binding("x", Arg::Value(Value::Nil))],
            body: vec![call("missing", vec![])],
        });
        assert!(evaluate_expression(&failing, &env, &mut scope).is_err());
        assert_eq!(scope.depth(), 0);
    }
}
